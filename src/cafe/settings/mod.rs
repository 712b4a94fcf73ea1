//! 店铺设置模块（单行表，id 固定为 1）

pub mod api;
pub mod dao;
pub mod models;
pub mod service;

pub use api::SettingsApi;
pub use dao::SettingsDao;
pub use models::{CafeSettings, SettingsPatch};
pub use service::SettingsSyncer;
