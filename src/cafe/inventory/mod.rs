//! 库存模块
//!
//! 库存表可能尚未在远端开通；首次拉取命中"表未创建"时，同步器永久
//! 降级为仅本地模式，并用默认条目做种子。

pub mod api;
pub mod dao;
pub mod models;
pub mod service;

pub use api::InventoryApi;
pub use dao::InventoryDao;
pub use models::{default_inventory, LocalInventoryItem, NewInventoryItem};
pub use service::InventorySyncer;
