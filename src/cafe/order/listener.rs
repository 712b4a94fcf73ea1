//! 订单监听器回调接口

use async_trait::async_trait;

/// 订单监听器回调接口（原前端的 toast + 新订单提示音在这里接回调）
#[async_trait]
pub trait OrderListener: Send + Sync {
    /// 初始同步开始
    async fn on_sync_start(&self);

    /// 初始同步完成
    async fn on_sync_finish(&self);

    /// 初始同步失败（操作被放弃，不自动重试）
    async fn on_sync_failed(&self, err: String);

    /// 新订单（JSON 序列化的 LocalOrder；原前端在此播放提示音）
    async fn on_new_order(&self, order: String);

    /// 订单变更（JSON 序列化的 LocalOrder）
    async fn on_order_changed(&self, order: String);

    /// 订单删除
    async fn on_order_deleted(&self, order_id: String);
}

/// 空实现（默认监听器）
pub struct EmptyOrderListener;

#[async_trait]
impl OrderListener for EmptyOrderListener {
    async fn on_sync_start(&self) {}
    async fn on_sync_finish(&self) {}
    async fn on_sync_failed(&self, _err: String) {}
    async fn on_new_order(&self, _order: String) {}
    async fn on_order_changed(&self, _order: String) {}
    async fn on_order_deleted(&self, _order_id: String) {}
}
