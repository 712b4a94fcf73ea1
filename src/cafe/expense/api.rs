//! 支出 HTTP API 客户端

use crate::cafe::expense::models::{LocalExpenseItem, NewExpenseItem};
use crate::cafe::types::handle_http_response;
use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;

pub struct ExpenseApi {
    client: reqwest::Client,
    api_base_url: String,
}

#[derive(Debug, Deserialize)]
struct AllExpensesResp {
    expenses: Vec<LocalExpenseItem>,
}

#[derive(Debug, Deserialize)]
struct InsertExpenseResp {
    expense: LocalExpenseItem,
}

impl ExpenseApi {
    pub fn new(client: reqwest::Client, api_base_url: String) -> Self {
        Self {
            client,
            api_base_url,
        }
    }

    /// 全量支出（日期倒序）
    pub async fn get_all_expenses(&self) -> Result<Vec<LocalExpenseItem>> {
        let operation_id = Uuid::new_v4().to_string();
        let url = format!("{}/expenses/get_all", self.api_base_url);

        info!("[ExpenseAPI] 📡 请求全量支出");
        debug!("[ExpenseAPI]   URL: {}, 操作ID: {}", url, operation_id);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("operationID", &operation_id)
            .json(&serde_json::json!({
                "orderBy": "date",
                "ascending": false,
            }))
            .send()
            .await
            .context("请求失败")?;

        let api_resp = handle_http_response::<AllExpensesResp>(response, "全量支出").await?;
        let resp = api_resp
            .data
            .ok_or_else(|| anyhow::anyhow!("响应中缺少 data 字段"))?;
        Ok(resp.expenses)
    }

    pub async fn insert_expense(&self, expense: &NewExpenseItem) -> Result<LocalExpenseItem> {
        let operation_id = Uuid::new_v4().to_string();
        let url = format!("{}/expenses/insert", self.api_base_url);

        info!("[ExpenseAPI] 📡 新建支出: {} so'm", expense.amount);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("operationID", &operation_id)
            .json(expense)
            .send()
            .await
            .context("请求失败")?;

        let api_resp = handle_http_response::<InsertExpenseResp>(response, "新建支出").await?;
        let resp = api_resp
            .data
            .ok_or_else(|| anyhow::anyhow!("响应中缺少 data 字段"))?;
        Ok(resp.expense)
    }

    pub async fn delete_expense(&self, expense_id: &str) -> Result<()> {
        let operation_id = Uuid::new_v4().to_string();
        let url = format!("{}/expenses/delete", self.api_base_url);

        info!("[ExpenseAPI] 📡 删除支出: {}", expense_id);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("operationID", &operation_id)
            .json(&serde_json::json!({ "id": expense_id }))
            .send()
            .await
            .context("请求失败")?;

        handle_http_response::<serde_json::Value>(response, "删除支出").await?;
        Ok(())
    }
}
