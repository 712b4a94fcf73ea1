//! 订单报表 CSV 导出

use crate::cafe::order::models::LocalOrder;
use chrono::{TimeZone, Utc};

const HEADER: &str = "ID,Mijoz,Telefon,Mahsulot,Soni,Narxi,Turi,Status,Sana";

/// 导出为 CSV 文本：表头 + 每单一行，列顺序固定为
/// `ID,Mijoz,Telefon,Mahsulot,Soni,Narxi,Turi,Status,Sana`。
/// ID 截取前 8 位，日期格式 `dd.MM.yyyy HH:mm`。
/// 含分隔符、引号或换行的字段加引号转义。
pub fn export_csv(orders: &[LocalOrder]) -> String {
    let mut lines = Vec::with_capacity(orders.len() + 1);
    lines.push(HEADER.to_string());

    for o in orders {
        let short_id: String = o.id.chars().take(8).collect();
        let date = Utc
            .timestamp_millis_opt(o.created_at)
            .single()
            .map(|t| t.format("%d.%m.%Y %H:%M").to_string())
            .unwrap_or_default();

        let fields = [
            short_id,
            o.customer_name.clone(),
            o.phone_number.clone(),
            o.product_name.clone(),
            o.quantity.to_string(),
            o.total_price.to_string(),
            o.order_type.clone(),
            o.status.as_str().to_string(),
            date,
        ];
        let row: Vec<String> = fields.iter().map(|f| escape_field(f)).collect();
        lines.push(row.join(","));
    }
    lines.join("\n")
}

fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cafe::order::status::OrderStatus;

    #[test]
    fn test_two_orders_literal_commas() {
        let at = Utc
            .with_ymd_and_hms(2025, 6, 15, 9, 30, 0)
            .unwrap()
            .timestamp_millis();
        let order = |id: &str, customer: &str, product: &str| LocalOrder {
            id: id.to_string(),
            product_name: product.to_string(),
            quantity: 2,
            customer_name: customer.to_string(),
            phone_number: "+998901112233".to_string(),
            status: OrderStatus::Delivered,
            created_at: at,
            total_price: 56_000,
            order_type: "delivery".to_string(),
            ..Default::default()
        };

        let csv = export_csv(&[
            order("aaaabbbbcccc", "Aziz", "Lavash"),
            order("ddddeeeeffff", "Bek", "Kofe"),
        ]);

        let lines: Vec<&str> = csv.split('\n').collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "ID,Mijoz,Telefon,Mahsulot,Soni,Narxi,Turi,Status,Sana");
        assert_eq!(
            lines[1],
            "aaaabbbb,Aziz,+998901112233,Lavash,2,56000,delivery,delivered,15.06.2025 09:30"
        );
        assert!(lines[2].starts_with("ddddeeee,Bek,"));
    }

    #[test]
    fn test_field_with_comma_is_quoted() {
        let o = LocalOrder {
            id: "x".to_string(),
            product_name: "Lavash, katta".to_string(),
            customer_name: "Aziz".to_string(),
            ..Default::default()
        };
        let csv = export_csv(&[o]);
        assert!(csv.contains("\"Lavash, katta\""));
    }
}
