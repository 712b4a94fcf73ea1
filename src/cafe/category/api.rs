//! 分类 HTTP API 客户端

use crate::cafe::category::models::LocalCategory;
use crate::cafe::types::handle_http_response;
use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;

pub struct CategoryApi {
    client: reqwest::Client,
    api_base_url: String,
}

#[derive(Debug, Deserialize)]
struct AllCategoriesResp {
    categories: Vec<LocalCategory>,
}

#[derive(Debug, Deserialize)]
struct InsertCategoryResp {
    category: LocalCategory,
}

impl CategoryApi {
    pub fn new(client: reqwest::Client, api_base_url: String) -> Self {
        Self {
            client,
            api_base_url,
        }
    }

    pub async fn get_all_categories(&self) -> Result<Vec<LocalCategory>> {
        let operation_id = Uuid::new_v4().to_string();
        let url = format!("{}/categories/get_all", self.api_base_url);

        info!("[CategoryAPI] 📡 请求全量分类");
        debug!("[CategoryAPI]   URL: {}, 操作ID: {}", url, operation_id);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("operationID", &operation_id)
            .json(&serde_json::json!({
                "orderBy": "created_at",
                "ascending": true,
            }))
            .send()
            .await
            .context("请求失败")?;

        let api_resp = handle_http_response::<AllCategoriesResp>(response, "全量分类").await?;
        let resp = api_resp
            .data
            .ok_or_else(|| anyhow::anyhow!("响应中缺少 data 字段"))?;
        Ok(resp.categories)
    }

    pub async fn insert_category(&self, name: &str, slug: &str) -> Result<LocalCategory> {
        let operation_id = Uuid::new_v4().to_string();
        let url = format!("{}/categories/insert", self.api_base_url);

        info!("[CategoryAPI] 📡 新建分类: {} ({})", name, slug);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("operationID", &operation_id)
            .json(&serde_json::json!({ "name": name, "slug": slug }))
            .send()
            .await
            .context("请求失败")?;

        let api_resp = handle_http_response::<InsertCategoryResp>(response, "新建分类").await?;
        let resp = api_resp
            .data
            .ok_or_else(|| anyhow::anyhow!("响应中缺少 data 字段"))?;
        Ok(resp.category)
    }

    pub async fn delete_category(&self, category_id: &str) -> Result<()> {
        let operation_id = Uuid::new_v4().to_string();
        let url = format!("{}/categories/delete", self.api_base_url);

        info!("[CategoryAPI] 📡 删除分类: {}", category_id);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("operationID", &operation_id)
            .json(&serde_json::json!({ "id": category_id }))
            .send()
            .await
            .context("请求失败")?;

        handle_http_response::<serde_json::Value>(response, "删除分类").await?;
        Ok(())
    }
}
