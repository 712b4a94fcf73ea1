//! Telegram 用户资料模块（只读目录，后台不修改资料）

pub mod api;
pub mod dao;
pub mod models;
pub mod service;

pub use api::ProfileApi;
pub use dao::ProfileDao;
pub use models::LocalProfile;
pub use service::ProfileSyncer;
