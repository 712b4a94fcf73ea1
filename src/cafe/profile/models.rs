//! Telegram 用户资料模型

use serde::{Deserialize, Serialize};

/// 机器人端注册的顾客资料
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalProfile {
    pub telegram_id: i64,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub created_at: i64,
}
