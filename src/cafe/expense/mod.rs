//! 支出模块
//!
//! 与库存类似，支出表在远端可能尚未开通；降级后记录仅保存在本地，
//! 不做默认种子。

pub mod api;
pub mod dao;
pub mod models;
pub mod service;

pub use api::ExpenseApi;
pub use dao::ExpenseDao;
pub use models::{LocalExpenseItem, NewExpenseItem};
pub use service::ExpenseSyncer;
