//! 图表时间序列：今天按小时分桶，周/月按天分桶

use crate::cafe::order::models::LocalOrder;
use crate::cafe::stats::period::Period;
use chrono::{DateTime, Duration, TimeZone, Utc};

/// 一个图表数据点
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesPoint {
    pub label: String,
    pub orders: i64,
    pub revenue: i64,
}

/// 分桶序列。今天 = 24 个小时桶，周 = 7 个天桶，月 = 30 个天桶，
/// 全部按时间顺序预置为零，窗口外的订单忽略。
pub fn chart_series(orders: &[LocalOrder], period: Period, now: DateTime<Utc>) -> Vec<SeriesPoint> {
    match period {
        Period::Today => hourly_series(orders, now),
        Period::Week => daily_series(orders, now, 7),
        Period::Month => daily_series(orders, now, 30),
    }
}

fn hourly_series(orders: &[LocalOrder], now: DateTime<Utc>) -> Vec<SeriesPoint> {
    let mut points: Vec<SeriesPoint> = (0..24)
        .map(|h| SeriesPoint {
            label: format!("{}:00", h),
            orders: 0,
            revenue: 0,
        })
        .collect();

    let today = now.date_naive();
    for o in orders {
        let Some(ts) = Utc.timestamp_millis_opt(o.created_at).single() else {
            continue;
        };
        if ts.date_naive() != today {
            continue;
        }
        let h = chrono::Timelike::hour(&ts) as usize;
        points[h].orders += 1;
        points[h].revenue += o.total_price;
    }
    points
}

fn daily_series(orders: &[LocalOrder], now: DateTime<Utc>, days: i64) -> Vec<SeriesPoint> {
    // 从最早一天到今天，时间顺序
    let day_keys: Vec<chrono::NaiveDate> = (0..days)
        .rev()
        .map(|i| (now - Duration::days(i)).date_naive())
        .collect();

    let mut points: Vec<SeriesPoint> = day_keys
        .iter()
        .map(|d| SeriesPoint {
            label: d.format("%d.%m").to_string(),
            orders: 0,
            revenue: 0,
        })
        .collect();

    for o in orders {
        let Some(ts) = Utc.timestamp_millis_opt(o.created_at).single() else {
            continue;
        };
        if let Some(idx) = day_keys.iter().position(|d| *d == ts.date_naive()) {
            points[idx].orders += 1;
            points[idx].revenue += o.total_price;
        }
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order_at(created_at: i64, total_price: i64) -> LocalOrder {
        LocalOrder {
            id: "o".to_string(),
            product_name: "Kofe".to_string(),
            created_at,
            total_price,
            ..Default::default()
        }
    }

    #[test]
    fn test_month_series_thirty_zeroed_chronological_buckets() {
        let now = Utc.with_ymd_and_hms(2025, 6, 30, 12, 0, 0).unwrap();
        let series = chart_series(&[], Period::Month, now);

        assert_eq!(series.len(), 30);
        assert!(series.iter().all(|p| p.orders == 0 && p.revenue == 0));
        // 最早的一天在前，今天在最后
        assert_eq!(series[0].label, "01.06");
        assert_eq!(series[29].label, "30.06");
    }

    #[test]
    fn test_hourly_buckets_for_today() {
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 20, 0, 0).unwrap();
        let nine = Utc.with_ymd_and_hms(2025, 6, 15, 9, 30, 0).unwrap();
        let orders = vec![
            order_at(nine.timestamp_millis(), 20_000),
            order_at(nine.timestamp_millis(), 35_000),
        ];

        let series = chart_series(&orders, Period::Today, now);
        assert_eq!(series.len(), 24);
        assert_eq!(series[9].label, "9:00");
        assert_eq!(series[9].orders, 2);
        assert_eq!(series[9].revenue, 55_000);
        assert_eq!(series[10].orders, 0);
    }

    #[test]
    fn test_orders_outside_window_ignored() {
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
        let long_ago = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        let series = chart_series(
            &[order_at(long_ago.timestamp_millis(), 99_000)],
            Period::Week,
            now,
        );
        assert_eq!(series.len(), 7);
        assert!(series.iter().all(|p| p.orders == 0));
    }
}
