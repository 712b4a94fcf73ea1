//! 订单本地模型定义

use crate::cafe::order::status::OrderStatus;
use serde::{Deserialize, Serialize};

/// 本地订单数据结构
///
/// 可以直接从服务器返回的 JSON 反序列化，缺失的字段使用默认值。
/// `updated_at` 是对账版本：变更事件携带的时间戳比本地旧时视为过期，不再应用。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalOrder {
    /// 订单 ID
    pub id: String,
    /// 商品名称
    pub product_name: String,
    /// 数量
    #[serde(default)]
    pub quantity: i64,
    /// 顾客姓名
    #[serde(default)]
    pub customer_name: String,
    /// 联系电话
    #[serde(default)]
    pub phone_number: String,
    /// 订单状态
    #[serde(default)]
    pub status: OrderStatus,
    /// 配送地址
    #[serde(default)]
    pub address: String,
    /// 创建时间（Unix 毫秒）
    #[serde(default)]
    pub created_at: i64,
    /// 最后更新时间（Unix 毫秒）
    #[serde(default)]
    pub updated_at: i64,
    /// 总价（苏姆，整数）
    #[serde(default)]
    pub total_price: i64,
    /// 配送员显示名
    #[serde(default)]
    pub delivery_person: Option<String>,
    /// 下单用户的 Telegram ID（机器人下单时存在）
    #[serde(default)]
    pub telegram_user_id: Option<i64>,
    /// 订单类型：delivery / takeaway / preorder
    #[serde(default)]
    pub order_type: String,
}

/// 订单补丁（只更新给定的字段）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_person: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_price: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl OrderPatch {
    /// 把补丁合并进订单，只改动给定字段
    pub fn apply_to(&self, order: &mut LocalOrder) {
        if let Some(status) = self.status {
            order.status = status;
        }
        if let Some(ref dp) = self.delivery_person {
            order.delivery_person = Some(dp.clone());
        }
        if let Some(q) = self.quantity {
            order.quantity = q;
        }
        if let Some(tp) = self.total_price {
            order.total_price = tp;
        }
        if let Some(ref addr) = self.address {
            order.address = addr.clone();
        }
    }
}

/// 订单同步器配置
pub struct OrderSyncerConfig {
    /// 员工用户 ID
    pub user_id: String,
    /// API 基础 URL
    pub api_base_url: String,
    /// Token
    pub token: String,
    /// 本地 SQLite 数据库 URL，例如 `sqlite://ajabo.db?mode=rwc`
    pub db_path: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_order() -> LocalOrder {
        LocalOrder {
            id: "o-1".to_string(),
            product_name: "Lavash".to_string(),
            quantity: 2,
            customer_name: "Aziz".to_string(),
            phone_number: "+998901112233".to_string(),
            status: OrderStatus::Pending,
            address: "Chilonzor 5".to_string(),
            created_at: 1_700_000_000_000,
            updated_at: 1_700_000_000_000,
            total_price: 56_000,
            delivery_person: None,
            telegram_user_id: Some(42),
            order_type: "delivery".to_string(),
        }
    }

    #[test]
    fn test_patch_only_touches_given_fields() {
        let mut order = sample_order();
        let patch = OrderPatch {
            status: Some(OrderStatus::Ready),
            delivery_person: Some("Bek".to_string()),
            ..Default::default()
        };
        patch.apply_to(&mut order);

        assert_eq!(order.status, OrderStatus::Ready);
        assert_eq!(order.delivery_person.as_deref(), Some("Bek"));
        // 其余字段原样保留
        assert_eq!(order.quantity, 2);
        assert_eq!(order.total_price, 56_000);
        assert_eq!(order.customer_name, "Aziz");
    }

    #[test]
    fn test_order_deserialize_with_defaults() {
        // 服务器可能只返回部分字段
        let json = r#"{"id": "o-9", "product_name": "Choy"}"#;
        let order: LocalOrder = serde_json::from_str(json).unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.quantity, 0);
        assert!(order.delivery_person.is_none());
    }
}
