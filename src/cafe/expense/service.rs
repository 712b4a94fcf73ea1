//! 支出同步服务层
//!
//! 表未开通时降级为仅本地模式，已录入的支出保留在本地表里。

use crate::cafe::expense::api::ExpenseApi;
use crate::cafe::expense::dao::ExpenseDao;
use crate::cafe::expense::models::{LocalExpenseItem, NewExpenseItem};
use crate::cafe::types::{is_table_missing, ChangeEvent, ChangeKind};
use anyhow::{Context, Result};
use sqlx::{Pool, Sqlite};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

pub struct ExpenseSyncer {
    api: ExpenseApi,
    dao: ExpenseDao,
    table_exists: AtomicBool,
}

impl ExpenseSyncer {
    pub fn with_db(http_client: reqwest::Client, api_base_url: String, db: Arc<Pool<Sqlite>>) -> Self {
        Self {
            api: ExpenseApi::new(http_client, api_base_url),
            dao: ExpenseDao::new((*db).clone()),
            table_exists: AtomicBool::new(true),
        }
    }

    pub fn is_local_only(&self) -> bool {
        !self.table_exists.load(Ordering::Relaxed)
    }

    pub async fn initial_sync(&self) -> Result<()> {
        info!("[ExpenseSync] 🔄 开始支出初始同步...");
        match self.api.get_all_expenses().await {
            Ok(expenses) => {
                self.dao.replace_all(&expenses).await?;
                info!("[ExpenseSync] ✅ 支出初始同步完成，共 {} 条", expenses.len());
                Ok(())
            }
            Err(e) if is_table_missing(&e) => {
                warn!("[ExpenseSync] ⚠️ 支出表未开通，降级为仅本地模式");
                self.table_exists.store(false, Ordering::Relaxed);
                Ok(())
            }
            Err(e) => {
                error!("[ExpenseSync] ❌ 支出初始同步失败: {:?}", e);
                Err(e)
            }
        }
    }

    pub async fn apply_event(&self, event: &ChangeEvent) -> Result<()> {
        match event.kind {
            ChangeKind::Insert | ChangeKind::Update => {
                let v = event
                    .new
                    .as_ref()
                    .ok_or_else(|| anyhow::anyhow!("变更事件缺少 new 字段"))?;
                let expense: LocalExpenseItem =
                    serde_json::from_value(v.clone()).context("解析支出行失败")?;
                self.dao.upsert_expense(&expense).await?;
            }
            ChangeKind::Delete => {
                let id = event
                    .old
                    .as_ref()
                    .and_then(|v| v.get("id"))
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| anyhow::anyhow!("删除事件缺少 id"))?;
                self.dao.delete_expense(id).await?;
            }
        }
        Ok(())
    }

    pub async fn get_all_expenses(&self) -> Result<Vec<LocalExpenseItem>> {
        self.dao.get_all_expenses().await
    }

    pub async fn add_expense(&self, expense: NewExpenseItem) -> Result<LocalExpenseItem> {
        if self.is_local_only() {
            let local = LocalExpenseItem {
                id: Uuid::new_v4().to_string(),
                amount: expense.amount,
                category: expense.category,
                description: expense.description,
                date: expense.date,
                created_at: chrono::Utc::now().timestamp_millis(),
            };
            self.dao.upsert_expense(&local).await?;
            info!("[ExpenseSync] 💾 支出已保存（仅本地）: {}", local.id);
            return Ok(local);
        }

        let created = self.api.insert_expense(&expense).await?;
        self.dao.upsert_expense(&created).await?;
        Ok(created)
    }

    pub async fn delete_expense(&self, expense_id: &str) -> Result<()> {
        if !self.is_local_only() {
            self.api.delete_expense(expense_id).await?;
        }
        self.dao.delete_expense(expense_id).await?;
        Ok(())
    }

    /// 区间内支出总额（用于利润计算）
    pub async fn total_between(&self, from: &str, to: &str) -> Result<i64> {
        self.dao.total_between(from, to).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cafe::db::create_memory_pool;

    #[tokio::test]
    async fn test_local_only_flow() {
        let db = Arc::new(create_memory_pool().await.unwrap());
        let syncer = ExpenseSyncer::with_db(
            reqwest::Client::new(),
            "http://localhost:1".to_string(),
            db,
        );
        syncer.table_exists.store(false, Ordering::Relaxed);

        // 降级后没有种子，列表从空开始
        assert!(syncer.get_all_expenses().await.unwrap().is_empty());

        let created = syncer
            .add_expense(NewExpenseItem {
                amount: 250_000,
                category: "Ijara".to_string(),
                description: "Iyun oyi".to_string(),
                date: "2025-06-01".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(syncer.get_all_expenses().await.unwrap().len(), 1);

        syncer.delete_expense(&created.id).await.unwrap();
        assert!(syncer.get_all_expenses().await.unwrap().is_empty());
    }
}
