//! 订单 HTTP API 客户端
//!
//! 负责所有订单相关的 HTTP 请求

use crate::cafe::order::models::{LocalOrder, OrderPatch};
use crate::cafe::order::status::OrderStatus;
use crate::cafe::order::types::{AllOrdersResp, InsertOrderResp, NewOrder};
use crate::cafe::types::handle_http_response;
use anyhow::{Context, Result};
use tracing::{debug, info};
use uuid::Uuid;

/// 订单相关的 HTTP API 客户端
pub struct OrderApi {
    client: reqwest::Client,
    api_base_url: String,
    user_id: String,
}

impl OrderApi {
    /// 创建新的订单 API 客户端
    ///
    /// `client` 应该已经在外部配置好认证拦截器
    pub fn new(client: reqwest::Client, api_base_url: String, user_id: String) -> Self {
        Self {
            client,
            api_base_url,
            user_id,
        }
    }

    /// 从服务器获取全部订单（按 created_at 倒序）
    pub async fn get_all_orders(&self) -> Result<Vec<LocalOrder>> {
        let operation_id = Uuid::new_v4().to_string();
        let url = format!("{}/orders/get_all", self.api_base_url);

        info!("[OrderAPI] 📡 请求全量订单");
        debug!(
            "[OrderAPI]   URL: {}, 用户ID: {}, 操作ID: {}",
            url, self.user_id, operation_id
        );

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("operationID", &operation_id)
            .json(&serde_json::json!({
                "userID": self.user_id,
                "orderBy": "created_at",
                "ascending": false,
            }))
            .send()
            .await
            .context("请求失败")?;

        let api_resp = handle_http_response::<AllOrdersResp>(response, "全量订单").await?;
        let resp = api_resp
            .data
            .ok_or_else(|| anyhow::anyhow!("响应中缺少 data 字段"))?;

        info!("[OrderAPI] ✅ 全量订单响应，订单数: {}", resp.orders.len());
        Ok(resp.orders)
    }

    /// 新建订单，服务器分配 id 与 created_at 并回传完整行
    pub async fn insert_order(&self, order: &NewOrder) -> Result<LocalOrder> {
        let operation_id = Uuid::new_v4().to_string();
        let url = format!("{}/orders/insert", self.api_base_url);

        info!("[OrderAPI] 📡 新建订单: {}", order.product_name);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("operationID", &operation_id)
            .json(order)
            .send()
            .await
            .context("请求失败")?;

        let api_resp = handle_http_response::<InsertOrderResp>(response, "新建订单").await?;
        let resp = api_resp
            .data
            .ok_or_else(|| anyhow::anyhow!("响应中缺少 data 字段"))?;

        info!("[OrderAPI] ✅ 订单已创建: {}", resp.order.id);
        Ok(resp.order)
    }

    /// 更新订单（远端先写，成功后由调用方做本地乐观补丁）
    pub async fn update_order(&self, order_id: &str, patch: &OrderPatch) -> Result<()> {
        let operation_id = Uuid::new_v4().to_string();
        let url = format!("{}/orders/update", self.api_base_url);

        info!("[OrderAPI] 📡 更新订单: {}", order_id);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("operationID", &operation_id)
            .json(&serde_json::json!({
                "id": order_id,
                "updates": patch,
            }))
            .send()
            .await
            .context("请求失败")?;

        handle_http_response::<serde_json::Value>(response, "更新订单").await?;
        Ok(())
    }

    /// 设置订单状态
    pub async fn set_status(&self, order_id: &str, status: OrderStatus) -> Result<()> {
        self.update_order(
            order_id,
            &OrderPatch {
                status: Some(status),
                ..Default::default()
            },
        )
        .await
    }

    /// 删除订单
    pub async fn delete_order(&self, order_id: &str) -> Result<()> {
        let operation_id = Uuid::new_v4().to_string();
        let url = format!("{}/orders/delete", self.api_base_url);

        info!("[OrderAPI] 📡 删除订单: {}", order_id);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("operationID", &operation_id)
            .json(&serde_json::json!({ "id": order_id }))
            .send()
            .await
            .context("请求失败")?;

        handle_http_response::<serde_json::Value>(response, "删除订单").await?;
        Ok(())
    }
}
