//! 库存本地模型定义

use serde::{Deserialize, Serialize};

/// 本地库存条目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalInventoryItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub min_quantity: i64,
    #[serde(default)]
    pub category: String,
    /// 最后更新时间（Unix 毫秒），兼做对账版本
    #[serde(default)]
    pub last_updated: i64,
}

impl LocalInventoryItem {
    /// 低库存为派生布尔，不落库
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.min_quantity
    }
}

/// 新建库存条目请求体
#[derive(Debug, Clone, Serialize)]
pub struct NewInventoryItem {
    pub name: String,
    pub quantity: i64,
    pub unit: String,
    pub min_quantity: i64,
    pub category: String,
}

/// 表未开通时的默认种子条目（与原前端的演示数据一致）
pub fn default_inventory(now_ms: i64) -> Vec<LocalInventoryItem> {
    let item = |id: &str, name: &str, quantity: i64, unit: &str, min_quantity: i64, category: &str| {
        LocalInventoryItem {
            id: id.to_string(),
            name: name.to_string(),
            quantity,
            unit: unit.to_string(),
            min_quantity,
            category: category.to_string(),
            last_updated: now_ms,
        }
    };
    vec![
        item("1", "Go'sht (Mol)", 50, "kg", 10, "Oziq-ovqat"),
        item("2", "Un", 100, "kg", 20, "Oziq-ovqat"),
        item("3", "Pishloq", 15, "kg", 5, "Sut mahsulotlari"),
        item("4", "Pomidor", 3, "kg", 5, "Sabzavotlar"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_low_stock_is_derived() {
        let seed = default_inventory(0);
        // Pomidor: 3 <= 5
        assert!(seed[3].is_low_stock());
        assert!(!seed[0].is_low_stock());

        let boundary = LocalInventoryItem {
            quantity: 5,
            min_quantity: 5,
            ..seed[0].clone()
        };
        assert!(boundary.is_low_stock());
    }
}
