//! 员工 HTTP API 客户端

use crate::cafe::staff::models::{LocalStaffMember, NewStaffMember};
use crate::cafe::types::handle_http_response;
use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;

pub struct StaffApi {
    client: reqwest::Client,
    api_base_url: String,
}

#[derive(Debug, Deserialize)]
struct AllStaffResp {
    staff: Vec<LocalStaffMember>,
}

#[derive(Debug, Deserialize)]
struct InsertStaffResp {
    member: LocalStaffMember,
}

impl StaffApi {
    pub fn new(client: reqwest::Client, api_base_url: String) -> Self {
        Self {
            client,
            api_base_url,
        }
    }

    /// 按角色拉取员工列表
    pub async fn get_staff_by_role(&self, role: &str) -> Result<Vec<LocalStaffMember>> {
        let operation_id = Uuid::new_v4().to_string();
        let url = format!("{}/staff/get_by_role", self.api_base_url);

        info!("[StaffAPI] 📡 请求员工列表，角色: {}", role);
        debug!("[StaffAPI]   URL: {}, 操作ID: {}", url, operation_id);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("operationID", &operation_id)
            .json(&serde_json::json!({ "role": role }))
            .send()
            .await
            .context("请求失败")?;

        let api_resp = handle_http_response::<AllStaffResp>(response, "员工列表").await?;
        let resp = api_resp
            .data
            .ok_or_else(|| anyhow::anyhow!("响应中缺少 data 字段"))?;
        Ok(resp.staff)
    }

    pub async fn insert_staff(&self, member: &NewStaffMember) -> Result<LocalStaffMember> {
        let operation_id = Uuid::new_v4().to_string();
        let url = format!("{}/staff/insert", self.api_base_url);

        info!("[StaffAPI] 📡 新建员工: {}", member.username);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("operationID", &operation_id)
            .json(member)
            .send()
            .await
            .context("请求失败")?;

        let api_resp = handle_http_response::<InsertStaffResp>(response, "新建员工").await?;
        let resp = api_resp
            .data
            .ok_or_else(|| anyhow::anyhow!("响应中缺少 data 字段"))?;
        Ok(resp.member)
    }

    pub async fn delete_staff(&self, staff_id: &str) -> Result<()> {
        let operation_id = Uuid::new_v4().to_string();
        let url = format!("{}/staff/delete", self.api_base_url);

        info!("[StaffAPI] 📡 删除员工: {}", staff_id);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("operationID", &operation_id)
            .json(&serde_json::json!({ "id": staff_id }))
            .send()
            .await
            .context("请求失败")?;

        handle_http_response::<serde_json::Value>(response, "删除员工").await?;
        Ok(())
    }
}
