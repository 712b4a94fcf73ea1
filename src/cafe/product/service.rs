//! 商品同步服务层

use crate::cafe::product::api::ProductApi;
use crate::cafe::product::dao::ProductDao;
use crate::cafe::product::listener::ProductListener;
use crate::cafe::product::models::{LocalProduct, NewProduct, ProductPatch};
use crate::cafe::types::{ChangeEvent, ChangeKind};
use anyhow::{Context, Result};
use sqlx::{Pool, Sqlite};
use std::sync::Arc;
use tracing::{debug, error, info};

/// 商品同步器
pub struct ProductSyncer {
    api: ProductApi,
    dao: ProductDao,
    listener: Arc<dyn ProductListener>,
}

impl ProductSyncer {
    pub fn with_listener_and_db(
        http_client: reqwest::Client,
        api_base_url: String,
        listener: Arc<dyn ProductListener>,
        db: Arc<Pool<Sqlite>>,
    ) -> Self {
        Self {
            api: ProductApi::new(http_client, api_base_url),
            dao: ProductDao::new((*db).clone()),
            listener,
        }
    }

    /// 初始同步：一次读全量，整表替换
    ///
    /// 原前端在首屏加载失败时刻意不打扰用户（抑制 toast），这里同样
    /// 只记日志并回调，由上层决定是否提示。
    pub async fn initial_sync(&self) -> Result<()> {
        info!("[ProductSync] 🔄 开始商品初始同步...");
        let products = match self.api.get_all_products().await {
            Ok(products) => products,
            Err(e) => {
                error!("[ProductSync] ❌ 商品初始同步失败: {:?}", e);
                self.listener.on_sync_failed(e.to_string()).await;
                return Err(e);
            }
        };
        self.dao.replace_all(&products).await?;
        info!("[ProductSync] ✅ 商品初始同步完成，共 {} 条", products.len());
        self.notify_list_changed().await?;
        Ok(())
    }

    /// 应用实时变更事件（插入/更新按 id 幂等落库，删除按 id 移除）
    pub async fn apply_event(&self, event: &ChangeEvent) -> Result<()> {
        match event.kind {
            ChangeKind::Insert | ChangeKind::Update => {
                let v = event
                    .new
                    .as_ref()
                    .ok_or_else(|| anyhow::anyhow!("变更事件缺少 new 字段"))?;
                let product: LocalProduct =
                    serde_json::from_value(v.clone()).context("解析商品行失败")?;
                debug!("[ProductSync] 商品变更: {}", product.id);
                self.dao.upsert_product(&product).await?;
            }
            ChangeKind::Delete => {
                let id = event
                    .old
                    .as_ref()
                    .and_then(|v| v.get("id"))
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| anyhow::anyhow!("删除事件缺少 id"))?;
                self.dao.delete_product(id).await?;
            }
        }
        self.notify_list_changed().await?;
        Ok(())
    }

    async fn notify_list_changed(&self) -> Result<()> {
        let products = self.dao.get_all_products().await?;
        self.listener
            .on_product_list_changed(serde_json::to_string(&products)?)
            .await;
        Ok(())
    }

    pub async fn get_all_products(&self) -> Result<Vec<LocalProduct>> {
        self.dao.get_all_products().await
    }

    /// 新建商品：远端先写，成功后乐观落库
    pub async fn add_product(&self, product: NewProduct) -> Result<LocalProduct> {
        let created = self.api.insert_product(&product).await?;
        self.dao.upsert_product(&created).await?;
        self.notify_list_changed().await?;
        Ok(created)
    }

    /// 更新商品
    pub async fn update_product(&self, product_id: &str, patch: ProductPatch) -> Result<()> {
        self.api.update_product(product_id, &patch).await?;
        if let Some(mut product) = self.dao.get_product(product_id).await? {
            patch.apply_to(&mut product);
            self.dao.upsert_product(&product).await?;
            self.notify_list_changed().await?;
        }
        Ok(())
    }

    /// 删除商品
    pub async fn delete_product(&self, product_id: &str) -> Result<()> {
        self.api.delete_product(product_id).await?;
        self.dao.delete_product(product_id).await?;
        self.notify_list_changed().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cafe::db::create_memory_pool;
    use crate::cafe::product::listener::EmptyProductListener;
    use crate::cafe::types::table;

    async fn test_syncer() -> ProductSyncer {
        let db = Arc::new(create_memory_pool().await.unwrap());
        ProductSyncer::with_listener_and_db(
            reqwest::Client::new(),
            "http://localhost:1".to_string(),
            Arc::new(EmptyProductListener),
            db,
        )
    }

    #[tokio::test]
    async fn test_apply_insert_update_delete() {
        let syncer = test_syncer().await;

        let insert = ChangeEvent {
            table: table::PRODUCTS.to_string(),
            kind: ChangeKind::Insert,
            new: Some(serde_json::json!({
                "id": "p-1", "name": "Choy", "price": 5_000, "category": "choy"
            })),
            old: None,
        };
        syncer.apply_event(&insert).await.unwrap();
        assert_eq!(syncer.get_all_products().await.unwrap().len(), 1);

        let update = ChangeEvent {
            table: table::PRODUCTS.to_string(),
            kind: ChangeKind::Update,
            new: Some(serde_json::json!({
                "id": "p-1", "name": "Kok choy", "price": 6_000, "category": "choy"
            })),
            old: None,
        };
        syncer.apply_event(&update).await.unwrap();
        let all = syncer.get_all_products().await.unwrap();
        assert_eq!(all[0].name, "Kok choy");
        assert_eq!(all[0].price, 6_000);

        let delete = ChangeEvent {
            table: table::PRODUCTS.to_string(),
            kind: ChangeKind::Delete,
            new: None,
            old: Some(serde_json::json!({ "id": "p-1" })),
        };
        syncer.apply_event(&delete).await.unwrap();
        assert!(syncer.get_all_products().await.unwrap().is_empty());
    }
}
