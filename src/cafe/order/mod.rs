//! 订单模块
//!
//! 订单表的本地镜像同步、状态机校验与本地快照镜像

pub mod api;
pub mod dao;
pub mod listener;
pub mod mirror;
pub mod models;
pub mod service;
pub mod status;
pub mod types;

// 重新导出主要类型和函数
pub use api::OrderApi;
pub use dao::OrderDao;
pub use listener::{EmptyOrderListener, OrderListener};
pub use mirror::{MirrorBus, OrderMirror};
pub use models::{LocalOrder, OrderPatch, OrderSyncerConfig};
pub use service::OrderSyncer;
pub use status::OrderStatus;
pub use types::{AllOrdersResp, NewOrder};
