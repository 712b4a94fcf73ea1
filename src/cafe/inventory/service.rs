//! 库存同步服务层
//!
//! 首次拉取若命中"表未创建"，永久切换到仅本地模式：用默认条目做种子，
//! 之后的增删改只写本地镜像，不再访问远端。

use crate::cafe::inventory::api::InventoryApi;
use crate::cafe::inventory::dao::InventoryDao;
use crate::cafe::inventory::models::{default_inventory, LocalInventoryItem, NewInventoryItem};
use crate::cafe::types::{is_table_missing, ChangeEvent, ChangeKind};
use anyhow::{Context, Result};
use sqlx::{Pool, Sqlite};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

/// 库存同步器
pub struct InventorySyncer {
    api: InventoryApi,
    dao: InventoryDao,
    /// false 表示已降级为仅本地模式
    table_exists: AtomicBool,
}

impl InventorySyncer {
    pub fn with_db(http_client: reqwest::Client, api_base_url: String, db: Arc<Pool<Sqlite>>) -> Self {
        Self {
            api: InventoryApi::new(http_client, api_base_url),
            dao: InventoryDao::new((*db).clone()),
            table_exists: AtomicBool::new(true),
        }
    }

    /// 是否处于仅本地模式
    pub fn is_local_only(&self) -> bool {
        !self.table_exists.load(Ordering::Relaxed)
    }

    pub async fn initial_sync(&self) -> Result<()> {
        info!("[InventorySync] 🔄 开始库存初始同步...");
        match self.api.get_all_items().await {
            Ok(items) => {
                self.dao.replace_all(&items).await?;
                info!("[InventorySync] ✅ 库存初始同步完成，共 {} 条", items.len());
                Ok(())
            }
            Err(e) if is_table_missing(&e) => {
                // 远端尚未开通库存表：永久降级，种子默认条目
                warn!("[InventorySync] ⚠️ 库存表未开通，降级为仅本地模式");
                self.table_exists.store(false, Ordering::Relaxed);
                let existing = self.dao.get_all_items().await?;
                if existing.is_empty() {
                    let now = chrono::Utc::now().timestamp_millis();
                    self.dao.replace_all(&default_inventory(now)).await?;
                }
                Ok(())
            }
            Err(e) => {
                error!("[InventorySync] ❌ 库存初始同步失败: {:?}", e);
                Err(e)
            }
        }
    }

    /// 应用实时变更事件（仅本地模式下远端不会推事件，这里直接幂等处理）
    pub async fn apply_event(&self, event: &ChangeEvent) -> Result<()> {
        match event.kind {
            ChangeKind::Insert | ChangeKind::Update => {
                let v = event
                    .new
                    .as_ref()
                    .ok_or_else(|| anyhow::anyhow!("变更事件缺少 new 字段"))?;
                let item: LocalInventoryItem =
                    serde_json::from_value(v.clone()).context("解析库存行失败")?;
                self.dao.upsert_if_newer(&item).await?;
            }
            ChangeKind::Delete => {
                let id = event
                    .old
                    .as_ref()
                    .and_then(|v| v.get("id"))
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| anyhow::anyhow!("删除事件缺少 id"))?;
                self.dao.delete_item(id).await?;
            }
        }
        Ok(())
    }

    pub async fn get_all_items(&self) -> Result<Vec<LocalInventoryItem>> {
        self.dao.get_all_items().await
    }

    /// 低库存条目（quantity <= min_quantity）
    pub async fn low_stock_items(&self) -> Result<Vec<LocalInventoryItem>> {
        Ok(self
            .dao
            .get_all_items()
            .await?
            .into_iter()
            .filter(|i| i.is_low_stock())
            .collect())
    }

    pub async fn add_item(&self, item: NewInventoryItem) -> Result<LocalInventoryItem> {
        let now = chrono::Utc::now().timestamp_millis();
        if self.is_local_only() {
            let local = LocalInventoryItem {
                id: Uuid::new_v4().to_string(),
                name: item.name,
                quantity: item.quantity,
                unit: item.unit,
                min_quantity: item.min_quantity,
                category: item.category,
                last_updated: now,
            };
            self.dao.upsert_item(&local).await?;
            info!("[InventorySync] 💾 库存条目已保存（仅本地）: {}", local.id);
            return Ok(local);
        }

        let created = self.api.insert_item(&item).await?;
        self.dao.upsert_item(&created).await?;
        Ok(created)
    }

    pub async fn update_item(&self, item_id: &str, quantity: i64) -> Result<()> {
        let mut item = self
            .dao
            .get_item(item_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("库存条目不存在: {}", item_id))?;
        item.quantity = quantity;
        item.last_updated = chrono::Utc::now().timestamp_millis();

        if !self.is_local_only() {
            self.api.update_item(&item).await?;
        }
        self.dao.upsert_item(&item).await?;
        Ok(())
    }

    pub async fn delete_item(&self, item_id: &str) -> Result<()> {
        if !self.is_local_only() {
            self.api.delete_item(item_id).await?;
        }
        self.dao.delete_item(item_id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cafe::db::create_memory_pool;

    async fn local_only_syncer() -> InventorySyncer {
        let db = Arc::new(create_memory_pool().await.unwrap());
        let syncer = InventorySyncer::with_db(
            reqwest::Client::new(),
            "http://localhost:1".to_string(),
            db,
        );
        syncer.table_exists.store(false, Ordering::Relaxed);
        syncer
            .dao
            .replace_all(&default_inventory(100))
            .await
            .unwrap();
        syncer
    }

    #[tokio::test]
    async fn test_local_only_mutations() {
        let syncer = local_only_syncer().await;
        assert!(syncer.is_local_only());

        let created = syncer
            .add_item(NewInventoryItem {
                name: "Piyoz".to_string(),
                quantity: 8,
                unit: "kg".to_string(),
                min_quantity: 10,
                category: "Sabzavotlar".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(syncer.get_all_items().await.unwrap().len(), 5);

        syncer.update_item(&created.id, 30).await.unwrap();
        let item = syncer.dao.get_item(&created.id).await.unwrap().unwrap();
        assert_eq!(item.quantity, 30);
        assert!(!item.is_low_stock());

        syncer.delete_item(&created.id).await.unwrap();
        assert_eq!(syncer.get_all_items().await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_low_stock_filter() {
        let syncer = local_only_syncer().await;
        let low = syncer.low_stock_items().await.unwrap();
        // 默认种子里只有 Pomidor 低于阈值
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].name, "Pomidor");
    }
}
