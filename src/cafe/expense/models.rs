//! 支出本地模型定义

use serde::{Deserialize, Serialize};

/// 本地支出记录（金额为苏姆整数）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalExpenseItem {
    pub id: String,
    #[serde(default)]
    pub amount: i64,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    /// 记账日期，ISO 格式（YYYY-MM-DD）
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub created_at: i64,
}

/// 新建支出请求体
#[derive(Debug, Clone, Serialize)]
pub struct NewExpenseItem {
    pub amount: i64,
    pub category: String,
    pub description: String,
    pub date: String,
}
