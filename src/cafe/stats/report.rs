//! 报表：过滤、汇总、利润、分页

use crate::cafe::order::models::LocalOrder;
use crate::cafe::order::status::OrderStatus;
use chrono::{NaiveDate, TimeZone, Utc};
use std::collections::HashSet;

/// 报表过滤条件，未给定的条件不过滤
#[derive(Debug, Clone, Default)]
pub struct ReportFilter {
    /// 顾客名、商品名（不区分大小写）或电话子串
    pub search: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub order_type: Option<String>,
    pub status: Option<OrderStatus>,
}

pub fn filter_orders(orders: &[LocalOrder], filter: &ReportFilter) -> Vec<LocalOrder> {
    let start_ms = filter.start_date.map(|d| {
        Utc.from_utc_datetime(&d.and_hms_opt(0, 0, 0).unwrap_or_default())
            .timestamp_millis()
    });
    // 截止日期含当天全部（23:59:59）
    let end_ms = filter.end_date.map(|d| {
        Utc.from_utc_datetime(&d.and_hms_opt(23, 59, 59).unwrap_or_default())
            .timestamp_millis()
    });

    orders
        .iter()
        .filter(|o| {
            if let Some(ref q) = filter.search {
                let q_lower = q.to_lowercase();
                let hit = o.customer_name.to_lowercase().contains(&q_lower)
                    || o.product_name.to_lowercase().contains(&q_lower)
                    || o.phone_number.contains(q.as_str());
                if !hit {
                    return false;
                }
            }
            if let Some(start) = start_ms {
                if o.created_at < start {
                    return false;
                }
            }
            if let Some(end) = end_ms {
                if o.created_at > end {
                    return false;
                }
            }
            if let Some(ref t) = filter.order_type {
                if o.order_type != *t {
                    return false;
                }
            }
            if let Some(s) = filter.status {
                if o.status != s {
                    return false;
                }
            }
            true
        })
        .cloned()
        .collect()
}

/// 报表汇总卡片
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSummary {
    pub total: i64,
    pub revenue: i64,
    /// 去重电话数
    pub unique_customers: i64,
    /// 平均客单价（四舍五入，空集为 0）
    pub avg_check: i64,
}

pub fn summarize(orders: &[LocalOrder]) -> ReportSummary {
    let total = orders.len() as i64;
    let revenue: i64 = orders.iter().map(|o| o.total_price).sum();
    let unique_customers = orders
        .iter()
        .map(|o| o.phone_number.as_str())
        .collect::<HashSet<_>>()
        .len() as i64;
    let avg_check = if total > 0 {
        (revenue as f64 / total as f64).round() as i64
    } else {
        0
    };
    ReportSummary {
        total,
        revenue,
        unique_customers,
        avg_check,
    }
}

/// 利润汇总
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfitSummary {
    pub revenue: i64,
    pub expenses: i64,
    pub profit: i64,
}

pub fn profit_summary(revenue: i64, expenses: i64) -> ProfitSummary {
    ProfitSummary {
        revenue,
        expenses,
        profit: revenue - expenses,
    }
}

/// 固定页大小分页，page 从 1 开始；越界返回空切片
pub fn paginate<T>(items: &[T], page: usize, per_page: usize) -> &[T] {
    if per_page == 0 || page == 0 {
        return &[];
    }
    let start = (page - 1) * per_page;
    if start >= items.len() {
        return &[];
    }
    let end = (start + per_page).min(items.len());
    &items[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(id: &str, customer: &str, phone: &str, product: &str, price: i64) -> LocalOrder {
        LocalOrder {
            id: id.to_string(),
            product_name: product.to_string(),
            customer_name: customer.to_string(),
            phone_number: phone.to_string(),
            total_price: price,
            order_type: "delivery".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_search_matches_name_product_and_phone() {
        let orders = vec![
            order("a", "Aziz", "+998901112233", "Lavash", 30_000),
            order("b", "Bek", "+998907654321", "Kofe", 20_000),
        ];

        let by_name = filter_orders(
            &orders,
            &ReportFilter {
                search: Some("aziz".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(by_name.len(), 1);

        let by_phone = filter_orders(
            &orders,
            &ReportFilter {
                search: Some("765".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(by_phone[0].id, "b");
    }

    #[test]
    fn test_end_date_includes_whole_day() {
        let mut o = order("a", "Aziz", "+99890", "Kofe", 20_000);
        o.created_at = Utc
            .with_ymd_and_hms(2025, 6, 10, 22, 30, 0)
            .unwrap()
            .timestamp_millis();

        let filter = ReportFilter {
            end_date: Some(NaiveDate::from_ymd_opt(2025, 6, 10).unwrap()),
            ..Default::default()
        };
        assert_eq!(filter_orders(&[o], &filter).len(), 1);
    }

    #[test]
    fn test_summary_and_profit() {
        let orders = vec![
            order("a", "Aziz", "+99890", "Kofe", 20_000),
            order("b", "Bek", "+99891", "Choy", 10_000),
            order("c", "Aziz", "+99890", "Lavash", 35_000),
        ];
        let s = summarize(&orders);
        assert_eq!(s.total, 3);
        assert_eq!(s.revenue, 65_000);
        assert_eq!(s.unique_customers, 2);
        assert_eq!(s.avg_check, 21_667);

        assert_eq!(summarize(&[]).avg_check, 0);

        let p = profit_summary(s.revenue, 40_000);
        assert_eq!(p.profit, 25_000);
    }

    #[test]
    fn test_paginate_bounds() {
        let items: Vec<i32> = (1..=25).collect();
        assert_eq!(paginate(&items, 1, 10), &items[0..10]);
        assert_eq!(paginate(&items, 3, 10), &items[20..25]);
        assert!(paginate(&items, 4, 10).is_empty());
        assert!(paginate(&items, 0, 10).is_empty());
    }
}
