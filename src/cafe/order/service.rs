//! 订单同步服务层
//!
//! 同步策略（全 crate 统一）：变更操作先写远端，成功后立即做本地乐观补丁；
//! 实时通道推送的变更事件只作为对账信号，本地已是同版本或更新时为空操作。

use crate::cafe::order::api::OrderApi;
use crate::cafe::order::dao::OrderDao;
use crate::cafe::order::listener::{EmptyOrderListener, OrderListener};
use crate::cafe::order::models::{LocalOrder, OrderPatch, OrderSyncerConfig};
use crate::cafe::order::status::OrderStatus;
use crate::cafe::order::types::NewOrder;
use crate::cafe::types::{ChangeEvent, ChangeKind};
use anyhow::{Context, Result};
use sqlx::{Pool, Sqlite};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// 订单同步器
pub struct OrderSyncer {
    config: OrderSyncerConfig,
    api: OrderApi,
    dao: OrderDao,
    listener: Arc<dyn OrderListener>,
}

impl OrderSyncer {
    /// 创建新的订单同步器（使用默认空监听器，内部创建连接池）
    pub async fn new(config: OrderSyncerConfig) -> Result<Self> {
        Self::with_listener(config, Arc::new(EmptyOrderListener)).await
    }

    /// 创建新的订单同步器（带自定义监听器，内部创建连接池）
    pub async fn with_listener(
        config: OrderSyncerConfig,
        listener: Arc<dyn OrderListener>,
    ) -> Result<Self> {
        let db = crate::cafe::db::create_sqlite_pool_with_migration(&config.db_path)
            .await
            .context(format!("连接SQLite数据库失败: {}", config.db_path))?;
        Self::with_listener_and_db(config, listener, Arc::new(db)).await
    }

    /// 创建新的订单同步器（使用共享连接池）
    pub async fn with_listener_and_db(
        config: OrderSyncerConfig,
        listener: Arc<dyn OrderListener>,
        db: Arc<Pool<Sqlite>>,
    ) -> Result<Self> {
        let http_client = reqwest::ClientBuilder::new()
            .default_headers({
                let mut headers = reqwest::header::HeaderMap::new();
                headers.insert(
                    reqwest::header::HeaderName::from_static("token"),
                    reqwest::header::HeaderValue::from_str(&config.token)
                        .context("无效的 token")?,
                );
                headers
            })
            .build()
            .context("创建 HTTP 客户端失败")?;

        info!("[OrderSync] 创建订单同步器，用户ID: {}", config.user_id);

        Ok(Self {
            api: OrderApi::new(
                http_client,
                config.api_base_url.clone(),
                config.user_id.clone(),
            ),
            dao: OrderDao::new((*db).clone()),
            listener,
            config,
        })
    }

    /// 初始同步：一次读全量，成功则整表替换本地镜像
    ///
    /// 失败时保留现有本地数据（可能为空），记录日志并回调，不自动重试。
    pub async fn initial_sync(&self) -> Result<()> {
        info!(
            "[OrderSync] 🔄 开始订单初始同步，用户: {}",
            self.config.user_id
        );
        self.listener.on_sync_start().await;

        let orders = match self.api.get_all_orders().await {
            Ok(orders) => orders,
            Err(e) => {
                error!("[OrderSync] ❌ 订单初始同步失败: {:?}", e);
                self.listener.on_sync_failed(e.to_string()).await;
                return Err(e);
            }
        };

        self.dao.replace_all(&orders).await?;
        info!("[OrderSync] ✅ 订单初始同步完成，共 {} 条", orders.len());
        self.listener.on_sync_finish().await;
        Ok(())
    }

    /// 应用实时通道推送的单条变更事件
    pub async fn apply_event(&self, event: &ChangeEvent) -> Result<()> {
        match event.kind {
            ChangeKind::Insert => {
                let order = Self::parse_order(event.new.as_ref())?;
                let is_new = self.dao.get_order(&order.id).await?.is_none();
                let applied = self.dao.upsert_if_newer(&order).await?;
                if applied {
                    let json = serde_json::to_string(&order)?;
                    if is_new {
                        info!("[OrderSync] 🆕 新订单: {}", order.id);
                        self.listener.on_new_order(json).await;
                    } else {
                        // 乐观补丁已先行落库，此处只是对账
                        debug!("[OrderSync] 插入事件对账: {}", order.id);
                    }
                }
            }
            ChangeKind::Update => {
                let order = Self::parse_order(event.new.as_ref())?;
                let applied = self.dao.upsert_if_newer(&order).await?;
                if applied {
                    debug!("[OrderSync] 订单变更: {}", order.id);
                    self.listener
                        .on_order_changed(serde_json::to_string(&order)?)
                        .await;
                }
            }
            ChangeKind::Delete => {
                let old = event
                    .old
                    .as_ref()
                    .ok_or_else(|| anyhow::anyhow!("删除事件缺少 old 字段"))?;
                let id = old
                    .get("id")
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| anyhow::anyhow!("删除事件缺少 id"))?
                    .to_string();
                self.dao.delete_order(&id).await?;
                info!("[OrderSync] 🗑️ 订单删除: {}", id);
                self.listener.on_order_deleted(id).await;
            }
        }
        Ok(())
    }

    fn parse_order(value: Option<&serde_json::Value>) -> Result<LocalOrder> {
        let v = value.ok_or_else(|| anyhow::anyhow!("变更事件缺少 new 字段"))?;
        serde_json::from_value(v.clone()).context("解析订单行失败")
    }

    /// 获取本地全部订单
    pub async fn get_all_orders(&self) -> Result<Vec<LocalOrder>> {
        self.dao.get_all_orders().await
    }

    /// 按 ID 获取本地订单
    pub async fn get_order(&self, order_id: &str) -> Result<Option<LocalOrder>> {
        self.dao.get_order(order_id).await
    }

    /// 新建订单：远端先写，成功后乐观落库
    pub async fn add_order(&self, new_order: NewOrder) -> Result<LocalOrder> {
        let mut created = self.api.insert_order(&new_order).await?;
        if created.updated_at == 0 {
            created.updated_at = created.created_at;
        }
        self.dao.upsert_order(&created).await?;
        self.listener
            .on_new_order(serde_json::to_string(&created)?)
            .await;
        Ok(created)
    }

    /// 更新订单：远端先写，成功后乐观补丁本地行
    pub async fn update_order(&self, order_id: &str, patch: OrderPatch) -> Result<()> {
        self.api.update_order(order_id, &patch).await?;

        match self.dao.get_order(order_id).await? {
            Some(mut order) => {
                patch.apply_to(&mut order);
                order.updated_at = chrono::Utc::now().timestamp_millis();
                self.dao.upsert_order(&order).await?;
                self.listener
                    .on_order_changed(serde_json::to_string(&order)?)
                    .await;
            }
            None => {
                // 本地还没有这条订单，等对账事件补齐
                warn!("[OrderSync] 更新的订单本地不存在: {}", order_id);
            }
        }
        Ok(())
    }

    /// 设置订单状态（在边界处校验状态机变迁）
    pub async fn set_status(&self, order_id: &str, to: OrderStatus) -> Result<()> {
        let order = self
            .dao
            .get_order(order_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("订单不存在: {}", order_id))?;

        OrderStatus::check_transition(order.status, to)?;

        self.update_order(
            order_id,
            OrderPatch {
                status: Some(to),
                ..Default::default()
            },
        )
        .await
    }

    /// 指派配送员
    pub async fn assign_delivery_person(&self, order_id: &str, person: &str) -> Result<()> {
        self.update_order(
            order_id,
            OrderPatch {
                delivery_person: Some(person.to_string()),
                ..Default::default()
            },
        )
        .await
    }

    /// 删除订单
    pub async fn delete_order(&self, order_id: &str) -> Result<()> {
        self.api.delete_order(order_id).await?;
        self.dao.delete_order(order_id).await?;
        self.listener.on_order_deleted(order_id.to_string()).await;
        Ok(())
    }

    /// 每个配送员的已交付订单数
    pub async fn delivered_counts(&self) -> Result<HashMap<String, i64>> {
        self.dao.delivered_counts().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cafe::db::create_memory_pool;
    use crate::cafe::types::table;

    async fn test_syncer() -> OrderSyncer {
        let db = Arc::new(create_memory_pool().await.unwrap());
        let config = OrderSyncerConfig {
            user_id: "admin-1".to_string(),
            api_base_url: "http://localhost:1".to_string(),
            token: "t".to_string(),
            db_path: "sqlite::memory:".to_string(),
        };
        OrderSyncer::with_listener_and_db(config, Arc::new(EmptyOrderListener), db)
            .await
            .unwrap()
    }

    fn insert_event(id: &str, status: &str, updated_at: i64) -> ChangeEvent {
        ChangeEvent {
            table: table::ORDERS.to_string(),
            kind: ChangeKind::Insert,
            new: Some(serde_json::json!({
                "id": id,
                "product_name": "Osh",
                "quantity": 1,
                "status": status,
                "created_at": updated_at,
                "updated_at": updated_at,
                "total_price": 35_000,
                "order_type": "delivery",
            })),
            old: None,
        }
    }

    #[tokio::test]
    async fn test_apply_insert_then_stale_update_is_noop() {
        let syncer = test_syncer().await;

        syncer
            .apply_event(&insert_event("o-1", "ready", 200))
            .await
            .unwrap();
        assert_eq!(
            syncer.get_order("o-1").await.unwrap().unwrap().status,
            OrderStatus::Ready
        );

        // 迟到的过期 UPDATE 事件不回滚本地状态
        let mut stale = insert_event("o-1", "pending", 100);
        stale.kind = ChangeKind::Update;
        syncer.apply_event(&stale).await.unwrap();
        assert_eq!(
            syncer.get_order("o-1").await.unwrap().unwrap().status,
            OrderStatus::Ready
        );
    }

    #[tokio::test]
    async fn test_apply_delete_event() {
        let syncer = test_syncer().await;
        syncer
            .apply_event(&insert_event("o-2", "pending", 100))
            .await
            .unwrap();

        let delete = ChangeEvent {
            table: table::ORDERS.to_string(),
            kind: ChangeKind::Delete,
            new: None,
            old: Some(serde_json::json!({ "id": "o-2" })),
        };
        syncer.apply_event(&delete).await.unwrap();
        assert!(syncer.get_order("o-2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_status_rejects_undefined_transition() {
        let syncer = test_syncer().await;
        syncer
            .apply_event(&insert_event("o-3", "pending", 100))
            .await
            .unwrap();

        // pending -> on_way 不在变迁表内，远端写入之前就被拒绝
        let err = syncer
            .set_status("o-3", OrderStatus::OnWay)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("变迁未定义"));
        assert_eq!(
            syncer.get_order("o-3").await.unwrap().unwrap().status,
            OrderStatus::Pending
        );
    }

    #[tokio::test]
    async fn test_set_status_unknown_order() {
        let syncer = test_syncer().await;
        assert!(syncer
            .set_status("no-such", OrderStatus::Ready)
            .await
            .is_err());
    }
}
