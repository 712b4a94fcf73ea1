//! 分类同步服务层

use crate::cafe::category::api::CategoryApi;
use crate::cafe::category::dao::CategoryDao;
use crate::cafe::category::models::{slugify, LocalCategory};
use crate::cafe::types::{ChangeEvent, ChangeKind};
use anyhow::{Context, Result};
use sqlx::{Pool, Sqlite};
use std::sync::Arc;
use tracing::{error, info};

/// 分类同步器
pub struct CategorySyncer {
    api: CategoryApi,
    dao: CategoryDao,
}

impl CategorySyncer {
    pub fn with_db(http_client: reqwest::Client, api_base_url: String, db: Arc<Pool<Sqlite>>) -> Self {
        Self {
            api: CategoryApi::new(http_client, api_base_url),
            dao: CategoryDao::new((*db).clone()),
        }
    }

    pub async fn initial_sync(&self) -> Result<()> {
        info!("[CategorySync] 🔄 开始分类初始同步...");
        let categories = match self.api.get_all_categories().await {
            Ok(categories) => categories,
            Err(e) => {
                error!("[CategorySync] ❌ 分类初始同步失败: {:?}", e);
                return Err(e);
            }
        };
        self.dao.replace_all(&categories).await?;
        info!(
            "[CategorySync] ✅ 分类初始同步完成，共 {} 条",
            categories.len()
        );
        Ok(())
    }

    pub async fn apply_event(&self, event: &ChangeEvent) -> Result<()> {
        match event.kind {
            ChangeKind::Insert | ChangeKind::Update => {
                let v = event
                    .new
                    .as_ref()
                    .ok_or_else(|| anyhow::anyhow!("变更事件缺少 new 字段"))?;
                let category: LocalCategory =
                    serde_json::from_value(v.clone()).context("解析分类行失败")?;
                self.dao.upsert_category(&category).await?;
            }
            ChangeKind::Delete => {
                let id = event
                    .old
                    .as_ref()
                    .and_then(|v| v.get("id"))
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| anyhow::anyhow!("删除事件缺少 id"))?;
                self.dao.delete_category(id).await?;
            }
        }
        Ok(())
    }

    pub async fn get_all_categories(&self) -> Result<Vec<LocalCategory>> {
        self.dao.get_all_categories().await
    }

    /// 新建分类，slug 在创建时由名称派生
    pub async fn add_category(&self, name: &str) -> Result<LocalCategory> {
        let slug = slugify(name);
        let created = self.api.insert_category(name, &slug).await?;
        self.dao.upsert_category(&created).await?;
        Ok(created)
    }

    pub async fn delete_category(&self, category_id: &str) -> Result<()> {
        self.api.delete_category(category_id).await?;
        self.dao.delete_category(category_id).await?;
        Ok(())
    }
}
