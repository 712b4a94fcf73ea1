//! 员工模块
//!
//! 送货员的配送量不落库，由订单镜像里 delivered 状态的分组计数派生。

pub mod api;
pub mod dao;
pub mod models;
pub mod service;

pub use api::StaffApi;
pub use dao::StaffDao;
pub use models::{LocalStaffMember, NewStaffMember};
pub use service::StaffSyncer;
