//! 商品数据访问层（DAO）

use crate::cafe::product::models::LocalProduct;
use anyhow::{Context, Result};
use sqlx::{Pool, Row, Sqlite};
use tracing::debug;

pub struct ProductDao {
    db: Pool<Sqlite>,
}

impl ProductDao {
    pub fn new(db: Pool<Sqlite>) -> Self {
        Self { db }
    }

    fn row_to_product(m: &sqlx::sqlite::SqliteRow) -> LocalProduct {
        let is_available: i64 = m.get("is_available");
        LocalProduct {
            id: m.get("id"),
            name: m.get("name"),
            price: m.get("price"),
            description: m.get("description"),
            image: m.get("image"),
            category: m.get("category"),
            is_available: is_available != 0,
            created_at: m.get("created_at"),
        }
    }

    /// 获取本地全部商品（按创建时间升序）
    pub async fn get_all_products(&self) -> Result<Vec<LocalProduct>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, price, description, image, category, is_available, created_at
            FROM local_products
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.db)
        .await
        .context("查询商品列表失败")?;

        let products: Vec<LocalProduct> = rows.iter().map(Self::row_to_product).collect();
        debug!("[ProductDAO] 获取本地商品列表，共 {} 条", products.len());
        Ok(products)
    }

    pub async fn get_product(&self, product_id: &str) -> Result<Option<LocalProduct>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, price, description, image, category, is_available, created_at
            FROM local_products
            WHERE id = ?
            "#,
        )
        .bind(product_id)
        .fetch_optional(&self.db)
        .await
        .context("查询商品失败")?;

        Ok(row.as_ref().map(Self::row_to_product))
    }

    pub async fn upsert_product(&self, p: &LocalProduct) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO local_products (
                id, name, price, description, image, category, is_available, created_at
            ) VALUES (?,?,?,?,?,?,?,?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                price = excluded.price,
                description = excluded.description,
                image = excluded.image,
                category = excluded.category,
                is_available = excluded.is_available,
                created_at = excluded.created_at
            "#,
        )
        .bind(&p.id)
        .bind(&p.name)
        .bind(p.price)
        .bind(&p.description)
        .bind(&p.image)
        .bind(&p.category)
        .bind(if p.is_available { 1 } else { 0 })
        .bind(p.created_at)
        .execute(&self.db)
        .await
        .context("插入或更新商品失败")?;
        Ok(())
    }

    pub async fn replace_all(&self, products: &[LocalProduct]) -> Result<()> {
        let mut tx = self.db.begin().await.context("开启事务失败")?;
        sqlx::query("DELETE FROM local_products")
            .execute(&mut *tx)
            .await
            .context("清空商品表失败")?;
        for p in products {
            sqlx::query(
                r#"
                INSERT INTO local_products (
                    id, name, price, description, image, category, is_available, created_at
                ) VALUES (?,?,?,?,?,?,?,?)
                "#,
            )
            .bind(&p.id)
            .bind(&p.name)
            .bind(p.price)
            .bind(&p.description)
            .bind(&p.image)
            .bind(&p.category)
            .bind(if p.is_available { 1 } else { 0 })
            .bind(p.created_at)
            .execute(&mut *tx)
            .await
            .context("写入商品失败")?;
        }
        tx.commit().await.context("提交事务失败")?;
        Ok(())
    }

    pub async fn delete_product(&self, product_id: &str) -> Result<()> {
        sqlx::query("DELETE FROM local_products WHERE id = ?")
            .bind(product_id)
            .execute(&self.db)
            .await
            .context("删除商品失败")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cafe::db::create_memory_pool;

    #[tokio::test]
    async fn test_replace_and_query() {
        let dao = ProductDao::new(create_memory_pool().await.unwrap());
        dao.replace_all(&[
            LocalProduct {
                id: "p-1".to_string(),
                name: "Cappuccino".to_string(),
                price: 25_000,
                description: "".to_string(),
                image: "".to_string(),
                category: "kofe".to_string(),
                is_available: true,
                created_at: 10,
            },
            LocalProduct {
                id: "p-2".to_string(),
                name: "Latte".to_string(),
                price: 28_000,
                description: "".to_string(),
                image: "".to_string(),
                category: "kofe".to_string(),
                is_available: false,
                created_at: 5,
            },
        ])
        .await
        .unwrap();

        let all = dao.get_all_products().await.unwrap();
        assert_eq!(all.len(), 2);
        // created_at 升序
        assert_eq!(all[0].id, "p-2");
        assert!(!all[0].is_available);
        assert_eq!(all[1].price, 25_000);
    }
}
