//! 库存 HTTP API 客户端

use crate::cafe::inventory::models::{LocalInventoryItem, NewInventoryItem};
use crate::cafe::types::handle_http_response;
use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;

pub struct InventoryApi {
    client: reqwest::Client,
    api_base_url: String,
}

#[derive(Debug, Deserialize)]
struct AllInventoryResp {
    items: Vec<LocalInventoryItem>,
}

#[derive(Debug, Deserialize)]
struct InsertInventoryResp {
    item: LocalInventoryItem,
}

impl InventoryApi {
    pub fn new(client: reqwest::Client, api_base_url: String) -> Self {
        Self {
            client,
            api_base_url,
        }
    }

    /// 全量库存（按名称升序）
    pub async fn get_all_items(&self) -> Result<Vec<LocalInventoryItem>> {
        let operation_id = Uuid::new_v4().to_string();
        let url = format!("{}/inventory/get_all", self.api_base_url);

        info!("[InventoryAPI] 📡 请求全量库存");
        debug!("[InventoryAPI]   URL: {}, 操作ID: {}", url, operation_id);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("operationID", &operation_id)
            .json(&serde_json::json!({
                "orderBy": "name",
                "ascending": true,
            }))
            .send()
            .await
            .context("请求失败")?;

        let api_resp = handle_http_response::<AllInventoryResp>(response, "全量库存").await?;
        let resp = api_resp
            .data
            .ok_or_else(|| anyhow::anyhow!("响应中缺少 data 字段"))?;
        Ok(resp.items)
    }

    pub async fn insert_item(&self, item: &NewInventoryItem) -> Result<LocalInventoryItem> {
        let operation_id = Uuid::new_v4().to_string();
        let url = format!("{}/inventory/insert", self.api_base_url);

        info!("[InventoryAPI] 📡 新建库存条目: {}", item.name);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("operationID", &operation_id)
            .json(item)
            .send()
            .await
            .context("请求失败")?;

        let api_resp = handle_http_response::<InsertInventoryResp>(response, "新建库存条目").await?;
        let resp = api_resp
            .data
            .ok_or_else(|| anyhow::anyhow!("响应中缺少 data 字段"))?;
        Ok(resp.item)
    }

    pub async fn update_item(&self, item: &LocalInventoryItem) -> Result<()> {
        let operation_id = Uuid::new_v4().to_string();
        let url = format!("{}/inventory/update", self.api_base_url);

        info!("[InventoryAPI] 📡 更新库存条目: {}", item.id);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("operationID", &operation_id)
            .json(item)
            .send()
            .await
            .context("请求失败")?;

        handle_http_response::<serde_json::Value>(response, "更新库存条目").await?;
        Ok(())
    }

    pub async fn delete_item(&self, item_id: &str) -> Result<()> {
        let operation_id = Uuid::new_v4().to_string();
        let url = format!("{}/inventory/delete", self.api_base_url);

        info!("[InventoryAPI] 📡 删除库存条目: {}", item_id);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("operationID", &operation_id)
            .json(&serde_json::json!({ "id": item_id }))
            .send()
            .await
            .context("请求失败")?;

        handle_http_response::<serde_json::Value>(response, "删除库存条目").await?;
        Ok(())
    }
}
