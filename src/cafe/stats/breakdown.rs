//! 分类占比与热销商品排行

use crate::cafe::order::models::LocalOrder;
use crate::cafe::product::models::LocalProduct;

/// 按分类统计订单数。分类通过商品名在商品表里反查，
/// 查不到的归入 "Boshqa"。保持首次出现的顺序。
pub fn category_breakdown(orders: &[LocalOrder], products: &[LocalProduct]) -> Vec<(String, i64)> {
    let mut counts: Vec<(String, i64)> = Vec::new();
    for o in orders {
        let category = products
            .iter()
            .find(|p| p.name == o.product_name)
            .map(|p| p.category.clone())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| "Boshqa".to_string());

        match counts.iter_mut().find(|(name, _)| *name == category) {
            Some((_, n)) => *n += 1,
            None => counts.push((category, 1)),
        }
    }
    counts
}

/// 热销商品
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopProduct {
    pub name: String,
    pub quantity: i64,
    pub revenue: i64,
}

/// 按销量取前 5。稳定排序：同销量保持首次出现的顺序。
pub fn top_products(orders: &[LocalOrder]) -> Vec<TopProduct> {
    let mut totals: Vec<TopProduct> = Vec::new();
    for o in orders {
        match totals.iter_mut().find(|t| t.name == o.product_name) {
            Some(t) => {
                t.quantity += o.quantity;
                t.revenue += o.total_price;
            }
            None => totals.push(TopProduct {
                name: o.product_name.clone(),
                quantity: o.quantity,
                revenue: o.total_price,
            }),
        }
    }
    totals.sort_by(|a, b| b.quantity.cmp(&a.quantity));
    totals.truncate(5);
    totals
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(product: &str, quantity: i64, total_price: i64) -> LocalOrder {
        LocalOrder {
            id: "o".to_string(),
            product_name: product.to_string(),
            quantity,
            total_price,
            ..Default::default()
        }
    }

    fn product(name: &str, category: &str) -> LocalProduct {
        LocalProduct {
            id: name.to_string(),
            name: name.to_string(),
            price: 0,
            description: String::new(),
            image: String::new(),
            category: category.to_string(),
            is_available: true,
            created_at: 0,
        }
    }

    #[test]
    fn test_unknown_products_fall_into_boshqa() {
        let products = vec![product("Kofe", "kofe"), product("Choy", "choy")];
        let orders = vec![
            order("Kofe", 1, 0),
            order("Kofe", 1, 0),
            order("Lag'mon", 1, 0),
        ];

        let breakdown = category_breakdown(&orders, &products);
        assert_eq!(
            breakdown,
            vec![("kofe".to_string(), 2), ("Boshqa".to_string(), 1)]
        );
    }

    #[test]
    fn test_top_products_stable_desc_capped_at_five() {
        let orders = vec![
            order("A", 3, 30_000),
            order("B", 5, 50_000),
            order("C", 3, 33_000),
            order("D", 1, 10_000),
            order("E", 2, 20_000),
            order("F", 1, 11_000),
            order("A", 2, 20_000), // A 合计 5，与 B 并列
        ];

        let top = top_products(&orders);
        assert_eq!(top.len(), 5);
        // 并列销量按首次出现顺序：A 先于 B
        let names: Vec<&str> = top.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C", "E", "D"]);
        assert_eq!(top[0].quantity, 5);
        assert_eq!(top[0].revenue, 50_000);
        // 严格非递增
        assert!(top.windows(2).all(|w| w[0].quantity >= w[1].quantity));
    }
}
