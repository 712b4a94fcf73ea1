//! 统计周期过滤

use crate::cafe::order::models::LocalOrder;
use crate::cafe::order::status::OrderStatus;
use chrono::{DateTime, Duration, Months, TimeZone, Utc};

/// 统计周期：今天 / 近 7 天 / 近一个月
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Today,
    Week,
    Month,
}

impl Period {
    /// 周期起点。今天 = 当天零点；周 = 滚动 7 天；月 = 滚动一个月
    pub fn start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Period::Today => {
                let day = now.date_naive();
                Utc.from_utc_datetime(&day.and_hms_opt(0, 0, 0).unwrap_or_default())
            }
            Period::Week => now - Duration::days(7),
            Period::Month => now
                .checked_sub_months(Months::new(1))
                .unwrap_or(now - Duration::days(30)),
        }
    }
}

/// 按周期过滤订单（created_at 为 Unix 毫秒）
pub fn filter_by_period(orders: &[LocalOrder], period: Period, now: DateTime<Utc>) -> Vec<LocalOrder> {
    let start_ms = period.start(now).timestamp_millis();
    orders
        .iter()
        .filter(|o| o.created_at >= start_ms)
        .cloned()
        .collect()
}

/// 统计卡片数据
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodStats {
    pub orders: i64,
    pub revenue: i64,
    pub delivered: i64,
    pub pending: i64,
}

pub fn period_stats(orders: &[LocalOrder]) -> PeriodStats {
    PeriodStats {
        orders: orders.len() as i64,
        revenue: orders.iter().map(|o| o.total_price).sum(),
        delivered: orders
            .iter()
            .filter(|o| o.status == OrderStatus::Delivered)
            .count() as i64,
        pending: orders
            .iter()
            .filter(|o| o.status == OrderStatus::Pending)
            .count() as i64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn order_at(id: &str, created_at: i64) -> LocalOrder {
        LocalOrder {
            id: id.to_string(),
            product_name: "Kofe".to_string(),
            created_at,
            total_price: 20_000,
            ..Default::default()
        }
    }

    #[test]
    fn test_today_membership() {
        // 2025-06-15 14:00 UTC
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 14, 0, 0).unwrap();
        let this_morning = Utc.with_ymd_and_hms(2025, 6, 15, 8, 0, 0).unwrap();
        let yesterday = Utc.with_ymd_and_hms(2025, 6, 14, 23, 59, 0).unwrap();

        let orders = vec![
            order_at("a", this_morning.timestamp_millis()),
            order_at("b", yesterday.timestamp_millis()),
        ];

        let today = filter_by_period(&orders, Period::Today, now);
        assert_eq!(today.len(), 1);
        assert_eq!(today[0].id, "a");
    }

    #[test]
    fn test_week_is_rolling_seven_days() {
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 14, 0, 0).unwrap();
        let six_days_ago = now - Duration::days(6);
        let eight_days_ago = now - Duration::days(8);

        let orders = vec![
            order_at("recent", six_days_ago.timestamp_millis()),
            order_at("old", eight_days_ago.timestamp_millis()),
        ];

        let week = filter_by_period(&orders, Period::Week, now);
        assert_eq!(week.len(), 1);
        assert_eq!(week[0].id, "recent");
    }

    #[test]
    fn test_period_stats_counts() {
        let mut delivered = order_at("d", 0);
        delivered.status = OrderStatus::Delivered;
        let pending = order_at("p", 0);

        let stats = period_stats(&[delivered, pending]);
        assert_eq!(stats.orders, 2);
        assert_eq!(stats.revenue, 40_000);
        assert_eq!(stats.delivered, 1);
        assert_eq!(stats.pending, 1);
    }
}
