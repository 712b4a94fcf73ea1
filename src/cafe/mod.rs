pub mod auth;
pub mod category;
pub mod client;
pub mod db;
pub mod expense;
pub mod inventory;
pub mod messaging;
pub mod order;
pub mod product;
pub mod profile;
pub mod settings;
pub mod staff;
pub mod stats;
pub mod types;

// 重新导出认证相关函数
pub use auth::login_async;

// 重新导出订单同步相关类型和函数
pub use order::{LocalOrder, OrderMirror, OrderStatus, OrderSyncer, OrderSyncerConfig};
