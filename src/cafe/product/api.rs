//! 商品 HTTP API 客户端

use crate::cafe::product::models::{LocalProduct, NewProduct, ProductPatch};
use crate::cafe::types::handle_http_response;
use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;

pub struct ProductApi {
    client: reqwest::Client,
    api_base_url: String,
}

#[derive(Debug, Deserialize)]
struct AllProductsResp {
    products: Vec<LocalProduct>,
}

#[derive(Debug, Deserialize)]
struct InsertProductResp {
    product: LocalProduct,
}

impl ProductApi {
    pub fn new(client: reqwest::Client, api_base_url: String) -> Self {
        Self {
            client,
            api_base_url,
        }
    }

    /// 从服务器获取全部商品（按 created_at 升序，与菜单展示顺序一致）
    pub async fn get_all_products(&self) -> Result<Vec<LocalProduct>> {
        let operation_id = Uuid::new_v4().to_string();
        let url = format!("{}/products/get_all", self.api_base_url);

        info!("[ProductAPI] 📡 请求全量商品");
        debug!("[ProductAPI]   URL: {}, 操作ID: {}", url, operation_id);

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

        let api_resp = handle_http_response::<AllProductsResp>(response, "全量商品").await?;
        let resp = api_resp
            .data
            .ok_or_else(|| anyhow::anyhow!("响应中缺少 data 字段"))?;

        info!("[ProductAPI] ✅ 全量商品响应，商品数: {}", resp.products.len());
        Ok(resp.products)
    }

    pub async fn insert_product(&self, product: &NewProduct) -> Result<LocalProduct> {
        let operation_id = Uuid::new_v4().to_string();
        let url = format!("{}/products/insert", self.api_base_url);

        info!("[ProductAPI] 📡 新建商品: {}", product.name);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("operationID", &operation_id)
            .json(product)
            .send()
            .await
            .context("请求失败")?;

        let api_resp = handle_http_response::<InsertProductResp>(response, "新建商品").await?;
        let resp = api_resp
            .data
            .ok_or_else(|| anyhow::anyhow!("响应中缺少 data 字段"))?;
        Ok(resp.product)
    }

    pub async fn update_product(&self, product_id: &str, patch: &ProductPatch) -> Result<()> {
        let operation_id = Uuid::new_v4().to_string();
        let url = format!("{}/products/update", self.api_base_url);

        info!("[ProductAPI] 📡 更新商品: {}", product_id);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("operationID", &operation_id)
            .json(&serde_json::json!({
                "id": product_id,
                "updates": patch,
            }))
            .send()
            .await
            .context("请求失败")?;

        handle_http_response::<serde_json::Value>(response, "更新商品").await?;
        Ok(())
    }

    pub async fn delete_product(&self, product_id: &str) -> Result<()> {
        let operation_id = Uuid::new_v4().to_string();
        let url = format!("{}/products/delete", self.api_base_url);

        info!("[ProductAPI] 📡 删除商品: {}", product_id);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("operationID", &operation_id)
            .json(&serde_json::json!({ "id": product_id }))
            .send()
            .await
            .context("请求失败")?;

        handle_http_response::<serde_json::Value>(response, "删除商品").await?;
        Ok(())
    }
}
