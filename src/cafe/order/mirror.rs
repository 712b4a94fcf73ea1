//! 订单本地快照镜像
//!
//! 对应原前端的 localStorage 订单镜像：多个打开的视图共享同一份
//! 按 key 存储的 JSON 全量快照，任一视图改写后广播信号，其余视图
//! 整表重读收敛（以最后写入者的完整快照为准，不做逐条合并）。
//!
//! 浏览器里的 storage 事件在 Rust 侧用进程内广播通道 `MirrorBus` 表达；
//! 镜像实例订阅总线，收到匹配 key 的信号后从存储整体重载。

use crate::cafe::order::models::{LocalOrder, OrderPatch};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// 镜像变更信号总线（携带发生变更的存储 key）
#[derive(Clone)]
pub struct MirrorBus {
    tx: broadcast::Sender<String>,
}

impl MirrorBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(64);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.tx.subscribe()
    }

    fn notify(&self, key: &str) {
        // 没有订阅者时发送失败是正常情况
        let _ = self.tx.send(key.to_string());
    }
}

impl Default for MirrorBus {
    fn default() -> Self {
        Self::new()
    }
}

/// 订单快照镜像
pub struct OrderMirror {
    key: String,
    path: PathBuf,
    bus: MirrorBus,
    orders: Mutex<Vec<LocalOrder>>,
}

impl OrderMirror {
    /// 创建镜像：存储文件存在且可解析则从文件种子，否则用 `initial`
    ///
    /// 解析失败按损坏内容处理：记录日志后忽略，使用 `initial`。
    pub fn new(
        storage_dir: &Path,
        key: &str,
        bus: MirrorBus,
        initial: Vec<LocalOrder>,
    ) -> Self {
        let path = storage_dir.join(format!("{}.json", key));
        let orders = match Self::read_snapshot(&path) {
            Ok(Some(stored)) => {
                debug!("[Mirror] 从快照种子: {} ({} 条)", path.display(), stored.len());
                stored
            }
            Ok(None) => initial,
            Err(e) => {
                warn!("[Mirror] ⚠️ 快照解析失败，使用初始数据: {:?}", e);
                initial
            }
        };
        Self {
            key: key.to_string(),
            path,
            bus,
            orders: Mutex::new(orders),
        }
    }

    fn read_snapshot(path: &Path) -> Result<Option<Vec<LocalOrder>>> {
        if !path.exists() {
            return Ok(None);
        }
        let bytes = std::fs::read(path).context("读取快照文件失败")?;
        let orders = serde_json::from_slice(&bytes).context("解析快照 JSON 失败")?;
        Ok(Some(orders))
    }

    /// 当前内存中的订单列表（快照拷贝）
    pub fn orders(&self) -> Vec<LocalOrder> {
        self.orders.lock().expect("mirror lock poisoned").clone()
    }

    /// 合并补丁到匹配 id 的订单，整表写回存储并广播信号
    ///
    /// id 不存在时列表保持不变（与原前端行为一致，仍会写回并广播）。
    pub fn update_order(&self, order_id: &str, patch: &OrderPatch) -> Result<()> {
        let snapshot = {
            let mut orders = self.orders.lock().expect("mirror lock poisoned");
            for order in orders.iter_mut() {
                if order.id == order_id {
                    patch.apply_to(order);
                }
            }
            orders.clone()
        };

        self.write_snapshot(&snapshot)?;
        self.bus.notify(&self.key);
        Ok(())
    }

    fn write_snapshot(&self, orders: &[LocalOrder]) -> Result<()> {
        let bytes = serde_json::to_vec(orders).context("序列化快照失败")?;
        std::fs::write(&self.path, bytes)
            .context(format!("写入快照文件失败: {}", self.path.display()))?;
        Ok(())
    }

    /// 从存储整体重载（全量替换，不做逐条合并）
    ///
    /// 文件缺失或损坏时保留当前内存状态。
    pub fn reload_from_store(&self) {
        match Self::read_snapshot(&self.path) {
            Ok(Some(stored)) => {
                let mut orders = self.orders.lock().expect("mirror lock poisoned");
                *orders = stored;
            }
            Ok(None) => {}
            Err(e) => {
                warn!("[Mirror] ⚠️ 重载快照失败，保留当前状态: {:?}", e);
            }
        }
    }

    /// 监听总线并在收到匹配 key 的信号时重载（由调用方 spawn）
    pub async fn run(&self, mut rx: broadcast::Receiver<String>) {
        info!("[Mirror] 👂 开始监听镜像信号: {}", self.key);
        loop {
            match rx.recv().await {
                Ok(changed_key) => {
                    if changed_key == self.key {
                        self.reload_from_store();
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    // 信号丢失也没关系，重载本来就是全量的
                    debug!("[Mirror] 信号滞后 {} 条，直接重载", n);
                    self.reload_from_store();
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cafe::order::status::OrderStatus;

    fn order(id: &str, status: OrderStatus) -> LocalOrder {
        LocalOrder {
            id: id.to_string(),
            product_name: "Somsa".to_string(),
            quantity: 3,
            customer_name: "Dilnoza".to_string(),
            phone_number: "+998933334455".to_string(),
            status,
            address: "Yunusobod".to_string(),
            created_at: 1_700_000_000_000,
            updated_at: 1_700_000_000_000,
            total_price: 21_000,
            delivery_person: None,
            telegram_user_id: None,
            order_type: "takeaway".to_string(),
        }
    }

    #[tokio::test]
    async fn test_patch_unknown_id_leaves_list_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let mirror = OrderMirror::new(
            dir.path(),
            "delivery_orders",
            MirrorBus::new(),
            vec![order("o-1", OrderStatus::Pending)],
        );

        let before = mirror.orders();
        mirror
            .update_order(
                "no-such-id",
                &OrderPatch {
                    status: Some(OrderStatus::Ready),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(mirror.orders(), before);
    }

    #[tokio::test]
    async fn test_patch_known_id_persists_full_list() {
        let dir = tempfile::tempdir().unwrap();
        let mirror = OrderMirror::new(
            dir.path(),
            "delivery_orders",
            MirrorBus::new(),
            vec![
                order("o-1", OrderStatus::Pending),
                order("o-2", OrderStatus::Pending),
            ],
        );

        mirror
            .update_order(
                "o-1",
                &OrderPatch {
                    status: Some(OrderStatus::Ready),
                    delivery_person: Some("Bek".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        let orders = mirror.orders();
        assert_eq!(orders[0].status, OrderStatus::Ready);
        assert_eq!(orders[0].delivery_person.as_deref(), Some("Bek"));
        // 未补丁的字段和其他订单原样保留
        assert_eq!(orders[0].quantity, 3);
        assert_eq!(orders[1], order("o-2", OrderStatus::Pending));

        // 完整列表被持久化
        let bytes = std::fs::read(dir.path().join("delivery_orders.json")).unwrap();
        let stored: Vec<LocalOrder> = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(stored, orders);
    }

    #[tokio::test]
    async fn test_two_views_converge_via_bus_signal() {
        let dir = tempfile::tempdir().unwrap();
        let bus = MirrorBus::new();
        let initial = vec![order("o-1", OrderStatus::Pending)];

        // 模拟两个打开的视图
        let view_a = OrderMirror::new(dir.path(), "orders", bus.clone(), initial.clone());
        let view_b = OrderMirror::new(dir.path(), "orders", bus.clone(), initial);

        let mut rx = bus.subscribe();
        view_a
            .update_order(
                "o-1",
                &OrderPatch {
                    status: Some(OrderStatus::OnWay),
                    ..Default::default()
                },
            )
            .unwrap();

        // 第二个视图收到信号后整表重载，与存储完全一致
        let key = rx.recv().await.unwrap();
        assert_eq!(key, "orders");
        view_b.reload_from_store();
        assert_eq!(view_b.orders(), view_a.orders());
        assert_eq!(view_b.orders()[0].status, OrderStatus::OnWay);
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_falls_back_to_initial() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("orders.json"), b"{not json").unwrap();

        let mirror = OrderMirror::new(
            dir.path(),
            "orders",
            MirrorBus::new(),
            vec![order("o-7", OrderStatus::Pending)],
        );
        assert_eq!(mirror.orders().len(), 1);
        assert_eq!(mirror.orders()[0].id, "o-7");
    }
}
