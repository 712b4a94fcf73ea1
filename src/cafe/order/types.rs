//! 订单 API DTO（请求和响应结构体）

use crate::cafe::order::models::LocalOrder;
use crate::cafe::order::status::OrderStatus;
use serde::{Deserialize, Serialize};

/// 全量订单响应
#[derive(Debug, Clone, Deserialize)]
pub struct AllOrdersResp {
    pub orders: Vec<LocalOrder>,
}

/// 新建订单请求体（id 与 created_at 由服务器分配）
#[derive(Debug, Clone, Serialize)]
pub struct NewOrder {
    pub product_name: String,
    pub quantity: i64,
    pub customer_name: String,
    pub phone_number: String,
    pub status: OrderStatus,
    pub address: String,
    pub total_price: i64,
    pub order_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telegram_user_id: Option<i64>,
}

/// 新建订单响应（服务器回传完整行）
#[derive(Debug, Clone, Deserialize)]
pub struct InsertOrderResp {
    pub order: LocalOrder,
}
