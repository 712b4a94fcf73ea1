//! 订单数据访问层（DAO）
//!
//! 负责所有订单相关的本地数据库操作，将数据访问逻辑与业务逻辑分离。

use crate::cafe::order::models::LocalOrder;
use crate::cafe::order::status::OrderStatus;
use anyhow::{Context, Result};
use sqlx::{Pool, Row, Sqlite};
use std::collections::HashMap;
use tracing::debug;

/// 订单 DAO（基于 sqlx）
pub struct OrderDao {
    db: Pool<Sqlite>,
}

impl OrderDao {
    pub fn new(db: Pool<Sqlite>) -> Self {
        Self { db }
    }

    fn row_to_order(m: &sqlx::sqlite::SqliteRow) -> Result<LocalOrder> {
        let status_str: String = m.get("status");
        Ok(LocalOrder {
            id: m.get("id"),
            product_name: m.get("product_name"),
            quantity: m.get("quantity"),
            customer_name: m.get("customer_name"),
            phone_number: m.get("phone_number"),
            status: OrderStatus::parse(&status_str)?,
            address: m.get("address"),
            created_at: m.get("created_at"),
            updated_at: m.get("updated_at"),
            total_price: m.get("total_price"),
            delivery_person: m.get("delivery_person"),
            telegram_user_id: m.get("telegram_user_id"),
            order_type: m.get("order_type"),
        })
    }

    /// 获取本地全部订单（按创建时间倒序，与服务器排序一致）
    pub async fn get_all_orders(&self) -> Result<Vec<LocalOrder>> {
        let rows = sqlx::query(
            r#"
            SELECT
                id, product_name, quantity, customer_name, phone_number,
                status, address, created_at, updated_at, total_price,
                delivery_person, telegram_user_id, order_type
            FROM local_orders
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.db)
        .await
        .context("查询订单列表失败")?;

        let orders = rows
            .iter()
            .map(Self::row_to_order)
            .collect::<Result<Vec<_>>>()?;
        debug!("[OrderDAO] 获取本地订单列表，共 {} 条", orders.len());
        Ok(orders)
    }

    /// 按 ID 获取订单
    pub async fn get_order(&self, order_id: &str) -> Result<Option<LocalOrder>> {
        let row = sqlx::query(
            r#"
            SELECT
                id, product_name, quantity, customer_name, phone_number,
                status, address, created_at, updated_at, total_price,
                delivery_person, telegram_user_id, order_type
            FROM local_orders
            WHERE id = ?
            "#,
        )
        .bind(order_id)
        .fetch_optional(&self.db)
        .await
        .context("查询订单失败")?;

        row.as_ref().map(Self::row_to_order).transpose()
    }

    /// 插入或更新订单
    pub async fn upsert_order(&self, o: &LocalOrder) -> Result<()> {
        let sql = r#"
            INSERT INTO local_orders (
                id, product_name, quantity, customer_name, phone_number,
                status, address, created_at, updated_at, total_price,
                delivery_person, telegram_user_id, order_type
            ) VALUES (?,?,?,?,?,?,?,?,?,?,?,?,?)
            ON CONFLICT(id) DO UPDATE SET
                product_name = excluded.product_name,
                quantity = excluded.quantity,
                customer_name = excluded.customer_name,
                phone_number = excluded.phone_number,
                status = excluded.status,
                address = excluded.address,
                created_at = excluded.created_at,
                updated_at = excluded.updated_at,
                total_price = excluded.total_price,
                delivery_person = excluded.delivery_person,
                telegram_user_id = excluded.telegram_user_id,
                order_type = excluded.order_type
        "#;

        sqlx::query(sql)
            .bind(&o.id)
            .bind(&o.product_name)
            .bind(o.quantity)
            .bind(&o.customer_name)
            .bind(&o.phone_number)
            .bind(o.status.as_str())
            .bind(&o.address)
            .bind(o.created_at)
            .bind(o.updated_at)
            .bind(o.total_price)
            .bind(&o.delivery_person)
            .bind(o.telegram_user_id)
            .bind(&o.order_type)
            .execute(&self.db)
            .await
            .context("插入或更新订单失败")?;
        Ok(())
    }

    /// 仅当事件不过期时应用（本地行的 updated_at 更新则跳过）
    ///
    /// 返回 true 表示已应用，false 表示过期事件被忽略。
    pub async fn upsert_if_newer(&self, o: &LocalOrder) -> Result<bool> {
        if let Some(existing) = self.get_order(&o.id).await? {
            if existing.updated_at > o.updated_at {
                debug!(
                    "[OrderDAO] 过期事件被忽略: {} (本地 {} > 事件 {})",
                    o.id, existing.updated_at, o.updated_at
                );
                return Ok(false);
            }
        }
        self.upsert_order(o).await?;
        Ok(true)
    }

    /// 全量替换本地订单（初始同步用）
    pub async fn replace_all(&self, orders: &[LocalOrder]) -> Result<()> {
        let mut tx = self.db.begin().await.context("开启事务失败")?;
        sqlx::query("DELETE FROM local_orders")
            .execute(&mut *tx)
            .await
            .context("清空订单表失败")?;
        for o in orders {
            sqlx::query(
                r#"
                INSERT INTO local_orders (
                    id, product_name, quantity, customer_name, phone_number,
                    status, address, created_at, updated_at, total_price,
                    delivery_person, telegram_user_id, order_type
                ) VALUES (?,?,?,?,?,?,?,?,?,?,?,?,?)
                "#,
            )
            .bind(&o.id)
            .bind(&o.product_name)
            .bind(o.quantity)
            .bind(&o.customer_name)
            .bind(&o.phone_number)
            .bind(o.status.as_str())
            .bind(&o.address)
            .bind(o.created_at)
            .bind(o.updated_at)
            .bind(o.total_price)
            .bind(&o.delivery_person)
            .bind(o.telegram_user_id)
            .bind(&o.order_type)
            .execute(&mut *tx)
            .await
            .context("写入订单失败")?;
        }
        tx.commit().await.context("提交事务失败")?;
        Ok(())
    }

    /// 删除订单
    pub async fn delete_order(&self, order_id: &str) -> Result<()> {
        sqlx::query("DELETE FROM local_orders WHERE id = ?")
            .bind(order_id)
            .execute(&self.db)
            .await
            .context("删除订单失败")?;
        Ok(())
    }

    /// 每个配送员的已交付订单数（员工页的派生统计）
    pub async fn delivered_counts(&self) -> Result<HashMap<String, i64>> {
        let rows = sqlx::query(
            r#"
            SELECT delivery_person, COUNT(*) AS cnt
            FROM local_orders
            WHERE status = 'delivered' AND delivery_person IS NOT NULL
            GROUP BY delivery_person
            "#,
        )
        .fetch_all(&self.db)
        .await
        .context("统计配送数失败")?;

        Ok(rows
            .into_iter()
            .map(|m| (m.get::<String, _>("delivery_person"), m.get::<i64, _>("cnt")))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cafe::db::create_memory_pool;

    fn order(id: &str, status: OrderStatus, updated_at: i64) -> LocalOrder {
        LocalOrder {
            id: id.to_string(),
            product_name: "Lavash".to_string(),
            quantity: 1,
            customer_name: "Aziz".to_string(),
            phone_number: "+998901112233".to_string(),
            status,
            address: "".to_string(),
            created_at: updated_at,
            updated_at,
            total_price: 28_000,
            delivery_person: None,
            telegram_user_id: None,
            order_type: "delivery".to_string(),
        }
    }

    #[tokio::test]
    async fn test_upsert_and_get() {
        let dao = OrderDao::new(create_memory_pool().await.unwrap());
        dao.upsert_order(&order("o-1", OrderStatus::Pending, 100))
            .await
            .unwrap();

        let got = dao.get_order("o-1").await.unwrap().unwrap();
        assert_eq!(got.status, OrderStatus::Pending);
        assert_eq!(got.total_price, 28_000);
        assert!(dao.get_order("o-404").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_if_newer_skips_stale_event() {
        let dao = OrderDao::new(create_memory_pool().await.unwrap());
        dao.upsert_order(&order("o-1", OrderStatus::Ready, 200))
            .await
            .unwrap();

        // 迟到的过期事件不覆盖新状态
        let applied = dao
            .upsert_if_newer(&order("o-1", OrderStatus::Pending, 100))
            .await
            .unwrap();
        assert!(!applied);
        let got = dao.get_order("o-1").await.unwrap().unwrap();
        assert_eq!(got.status, OrderStatus::Ready);

        // 更新的事件正常应用
        let applied = dao
            .upsert_if_newer(&order("o-1", OrderStatus::OnWay, 300))
            .await
            .unwrap();
        assert!(applied);
        let got = dao.get_order("o-1").await.unwrap().unwrap();
        assert_eq!(got.status, OrderStatus::OnWay);
    }

    #[tokio::test]
    async fn test_replace_all_and_ordering() {
        let dao = OrderDao::new(create_memory_pool().await.unwrap());
        dao.upsert_order(&order("old", OrderStatus::Pending, 1))
            .await
            .unwrap();

        dao.replace_all(&[
            order("a", OrderStatus::Pending, 100),
            order("b", OrderStatus::Delivered, 300),
        ])
        .await
        .unwrap();

        let all = dao.get_all_orders().await.unwrap();
        assert_eq!(all.len(), 2);
        // created_at 倒序
        assert_eq!(all[0].id, "b");
        assert!(dao.get_order("old").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delivered_counts() {
        let dao = OrderDao::new(create_memory_pool().await.unwrap());
        let mut o1 = order("o-1", OrderStatus::Delivered, 100);
        o1.delivery_person = Some("Bek".to_string());
        let mut o2 = order("o-2", OrderStatus::Delivered, 200);
        o2.delivery_person = Some("Bek".to_string());
        let mut o3 = order("o-3", OrderStatus::OnWay, 300);
        o3.delivery_person = Some("Bek".to_string());
        for o in [&o1, &o2, &o3] {
            dao.upsert_order(o).await.unwrap();
        }

        let counts = dao.delivered_counts().await.unwrap();
        // 只统计已交付订单
        assert_eq!(counts.get("Bek"), Some(&2));
    }
}
