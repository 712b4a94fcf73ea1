//! 统计聚合模块
//!
//! 纯函数：只处理已经拉取到内存的切片，`now` 显式传入，方便测试。

pub mod breakdown;
pub mod csv;
pub mod period;
pub mod report;
pub mod series;

pub use breakdown::{category_breakdown, top_products, TopProduct};
pub use csv::export_csv;
pub use period::{filter_by_period, period_stats, Period, PeriodStats};
pub use report::{
    filter_orders, paginate, profit_summary, summarize, ProfitSummary, ReportFilter, ReportSummary,
};
pub use series::{chart_series, SeriesPoint};
