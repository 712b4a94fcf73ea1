//! 商品（菜单）模块

pub mod api;
pub mod dao;
pub mod listener;
pub mod models;
pub mod service;

pub use api::ProductApi;
pub use dao::ProductDao;
pub use listener::{EmptyProductListener, ProductListener};
pub use models::{LocalProduct, NewProduct, ProductPatch};
pub use service::ProductSyncer;
