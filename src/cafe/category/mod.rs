//! 分类模块

pub mod api;
pub mod dao;
pub mod models;
pub mod service;

pub use api::CategoryApi;
pub use dao::CategoryDao;
pub use models::{slugify, LocalCategory};
pub use service::CategorySyncer;
