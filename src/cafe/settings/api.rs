//! 店铺设置 HTTP API 客户端

use crate::cafe::settings::models::{CafeSettings, SettingsPatch};
use crate::cafe::types::handle_http_response;
use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;

pub struct SettingsApi {
    client: reqwest::Client,
    api_base_url: String,
}

#[derive(Debug, Deserialize)]
struct GetSettingsResp {
    settings: CafeSettings,
}

impl SettingsApi {
    pub fn new(client: reqwest::Client, api_base_url: String) -> Self {
        Self {
            client,
            api_base_url,
        }
    }

    pub async fn get_settings(&self) -> Result<CafeSettings> {
        let operation_id = Uuid::new_v4().to_string();
        let url = format!("{}/settings/get", self.api_base_url);

        info!("[SettingsAPI] 📡 请求店铺设置");
        debug!("[SettingsAPI]   URL: {}, 操作ID: {}", url, operation_id);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("operationID", &operation_id)
            .json(&serde_json::json!({}))
            .send()
            .await
            .context("请求失败")?;

        let api_resp = handle_http_response::<GetSettingsResp>(response, "店铺设置").await?;
        let resp = api_resp
            .data
            .ok_or_else(|| anyhow::anyhow!("响应中缺少 data 字段"))?;
        Ok(resp.settings)
    }

    pub async fn update_settings(&self, patch: &SettingsPatch) -> Result<()> {
        let operation_id = Uuid::new_v4().to_string();
        let url = format!("{}/settings/update", self.api_base_url);

        info!("[SettingsAPI] 📡 更新店铺设置");

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("operationID", &operation_id)
            .json(patch)
            .send()
            .await
            .context("请求失败")?;

        handle_http_response::<serde_json::Value>(response, "更新店铺设置").await?;
        Ok(())
    }
}
