//! 商品监听器回调接口

use async_trait::async_trait;

#[async_trait]
pub trait ProductListener: Send + Sync {
    /// 商品列表变更（JSON 序列化的 LocalProduct 数组）
    async fn on_product_list_changed(&self, products: String);

    /// 初始同步失败（原前端在加载时静默，不弹 toast，只记日志）
    async fn on_sync_failed(&self, err: String);
}

/// 空实现（默认监听器）
pub struct EmptyProductListener;

#[async_trait]
impl ProductListener for EmptyProductListener {
    async fn on_product_list_changed(&self, _products: String) {}
    async fn on_sync_failed(&self, _err: String) {}
}
