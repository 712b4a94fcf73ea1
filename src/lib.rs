pub mod cafe;

// 重新导出常用类型和函数，方便外部使用
pub use cafe::{
    auth::{login_async, Session, StaffRole},
    client::{AjaboClient, ClientConfig},
    order::{LocalOrder, OrderMirror, OrderStatus, OrderSyncer, OrderSyncerConfig},
};
