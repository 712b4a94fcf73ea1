//! 员工登录与会话
//!
//! 原前端把登录状态以 JSON 标记写进浏览器 localStorage（无过期时间）。
//! 这里改为显式的 `Session` 对象：登录时创建，登出时销毁，由调用方持有并传递。

use crate::cafe::types::{handle_http_response, ApiResponse};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

/// 员工角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StaffRole {
    #[serde(rename = "admin")]
    Admin,
    #[serde(rename = "delivery")]
    Delivery,
}

impl StaffRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            StaffRole::Admin => "admin",
            StaffRole::Delivery => "delivery",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "admin" => Ok(StaffRole::Admin),
            "delivery" => Ok(StaffRole::Delivery),
            other => Err(anyhow::anyhow!("未知员工角色: {}", other)),
        }
    }
}

impl std::fmt::Display for StaffRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginData {
    pub token: String,
    #[serde(rename = "userID")]
    pub user_id: String,
    #[serde(rename = "displayName", default)]
    pub display_name: String,
}

/// 登录会话
///
/// 创建点：`login_async` 成功返回。销毁点：`logout`。
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: String,
    pub username: String,
    pub display_name: String,
    pub role: StaffRole,
    pub token: String,
    pub logged_in_at: DateTime<Utc>,
}

impl Session {
    /// 登出（销毁会话）
    pub fn logout(self) {
        info!(
            "[Auth] 👋 会话结束: {} ({}), 登录于 {}",
            self.username, self.role, self.logged_in_at
        );
    }
}

/// 员工登录（staff 表用户名/密码校验，由远端完成）
pub async fn login_async(
    api_base_url: &str,
    username: String,
    password: String,
    role: StaffRole,
) -> Result<Session> {
    let client = reqwest::Client::new();
    let operation_id = Uuid::new_v4().to_string();
    let url = format!("{}/auth/staff_login", api_base_url);

    info!("[Auth] 🔐 正在登录: {} ({})", username, role);
    debug!("[Auth]   URL: {}", url);
    debug!("[Auth]   OperationID: {}", operation_id);

    let login_req = LoginRequest {
        username: username.clone(),
        password,
        role: role.as_str().to_string(),
    };

    let response = client
        .post(&url)
        .header("Content-Type", "application/json")
        .header("operationID", &operation_id)
        .json(&login_req)
        .send()
        .await
        .context("登录请求失败")?;

    let api_resp: ApiResponse<LoginData> = handle_http_response(response, "员工登录").await?;
    let data = api_resp
        .data
        .ok_or_else(|| anyhow::anyhow!("登录响应中缺少 data 字段"))?;

    info!("[Auth] ✅ 登录成功: userID={}", data.user_id);

    Ok(Session {
        user_id: data.user_id,
        display_name: if data.display_name.is_empty() {
            username.clone()
        } else {
            data.display_name
        },
        username,
        role,
        token: data.token,
        logged_in_at: Utc::now(),
    })
}
