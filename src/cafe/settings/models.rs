//! 店铺设置模型定义

use serde::{Deserialize, Serialize};

/// 店铺设置（远端和本地都是单行）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CafeSettings {
    pub cafe_name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub open_time: String,
    #[serde(default)]
    pub close_time: String,
    #[serde(default)]
    pub delivery_enabled: bool,
    #[serde(default)]
    pub min_order_amount: i64,
    #[serde(default)]
    pub delivery_fee: i64,
    #[serde(default)]
    pub description: String,
}

impl Default for CafeSettings {
    fn default() -> Self {
        Self {
            cafe_name: "Ajabo Coffee".to_string(),
            address: "Toshkent sh., Amir Temur ko'chasi 15".to_string(),
            phone: "+998 90 123 45 67".to_string(),
            open_time: "08:00".to_string(),
            close_time: "22:00".to_string(),
            delivery_enabled: true,
            min_order_amount: 30_000,
            delivery_fee: 10_000,
            description: "Eng mazali taomlar va ichimliklar".to_string(),
        }
    }
}

/// 设置补丁（只更新给定字段）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cafe_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_order_amount: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_fee: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl SettingsPatch {
    pub fn apply_to(&self, s: &mut CafeSettings) {
        if let Some(ref v) = self.cafe_name {
            s.cafe_name = v.clone();
        }
        if let Some(ref v) = self.address {
            s.address = v.clone();
        }
        if let Some(ref v) = self.phone {
            s.phone = v.clone();
        }
        if let Some(ref v) = self.open_time {
            s.open_time = v.clone();
        }
        if let Some(ref v) = self.close_time {
            s.close_time = v.clone();
        }
        if let Some(v) = self.delivery_enabled {
            s.delivery_enabled = v;
        }
        if let Some(v) = self.min_order_amount {
            s.min_order_amount = v;
        }
        if let Some(v) = self.delivery_fee {
            s.delivery_fee = v;
        }
        if let Some(ref v) = self.description {
            s.description = v.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_preserves_unset_fields() {
        let mut s = CafeSettings::default();
        let patch = SettingsPatch {
            min_order_amount: Some(50_000),
            delivery_enabled: Some(false),
            ..Default::default()
        };
        patch.apply_to(&mut s);

        assert_eq!(s.min_order_amount, 50_000);
        assert!(!s.delivery_enabled);
        assert_eq!(s.cafe_name, "Ajabo Coffee");
        assert_eq!(s.delivery_fee, 10_000);
    }
}
