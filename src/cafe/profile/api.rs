//! 用户资料 HTTP API 客户端

use crate::cafe::profile::models::LocalProfile;
use crate::cafe::types::handle_http_response;
use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;

pub struct ProfileApi {
    client: reqwest::Client,
    api_base_url: String,
}

#[derive(Debug, Deserialize)]
struct AllProfilesResp {
    profiles: Vec<LocalProfile>,
}

impl ProfileApi {
    pub fn new(client: reqwest::Client, api_base_url: String) -> Self {
        Self {
            client,
            api_base_url,
        }
    }

    /// 全量用户资料（注册时间倒序）
    pub async fn get_all_profiles(&self) -> Result<Vec<LocalProfile>> {
        let operation_id = Uuid::new_v4().to_string();
        let url = format!("{}/profiles/get_all", self.api_base_url);

        info!("[ProfileAPI] 📡 请求全量用户资料");
        debug!("[ProfileAPI]   URL: {}, 操作ID: {}", url, operation_id);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("operationID", &operation_id)
            .json(&serde_json::json!({
                "orderBy": "created_at",
                "ascending": false,
            }))
            .send()
            .await
            .context("请求失败")?;

        let api_resp = handle_http_response::<AllProfilesResp>(response, "全量用户资料").await?;
        let resp = api_resp
            .data
            .ok_or_else(|| anyhow::anyhow!("响应中缺少 data 字段"))?;
        Ok(resp.profiles)
    }
}
