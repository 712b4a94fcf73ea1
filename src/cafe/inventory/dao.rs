//! 库存数据访问层（DAO）

use crate::cafe::inventory::models::LocalInventoryItem;
use anyhow::{Context, Result};
use sqlx::{Pool, Row, Sqlite};

pub struct InventoryDao {
    db: Pool<Sqlite>,
}

impl InventoryDao {
    pub fn new(db: Pool<Sqlite>) -> Self {
        Self { db }
    }

    fn row_to_item(m: &sqlx::sqlite::SqliteRow) -> LocalInventoryItem {
        LocalInventoryItem {
            id: m.get("id"),
            name: m.get("name"),
            quantity: m.get("quantity"),
            unit: m.get("unit"),
            min_quantity: m.get("min_quantity"),
            category: m.get("category"),
            last_updated: m.get("last_updated"),
        }
    }

    /// 全部库存条目（名称升序）
    pub async fn get_all_items(&self) -> Result<Vec<LocalInventoryItem>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, quantity, unit, min_quantity, category, last_updated
            FROM local_inventory
            ORDER BY name ASC
            "#,
        )
        .fetch_all(&self.db)
        .await
        .context("查询库存列表失败")?;

        Ok(rows.iter().map(Self::row_to_item).collect())
    }

    pub async fn get_item(&self, item_id: &str) -> Result<Option<LocalInventoryItem>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, quantity, unit, min_quantity, category, last_updated
            FROM local_inventory
            WHERE id = ?
            "#,
        )
        .bind(item_id)
        .fetch_optional(&self.db)
        .await
        .context("查询库存条目失败")?;

        Ok(row.as_ref().map(Self::row_to_item))
    }

    pub async fn upsert_item(&self, i: &LocalInventoryItem) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO local_inventory (
                id, name, quantity, unit, min_quantity, category, last_updated
            ) VALUES (?,?,?,?,?,?,?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                quantity = excluded.quantity,
                unit = excluded.unit,
                min_quantity = excluded.min_quantity,
                category = excluded.category,
                last_updated = excluded.last_updated
            "#,
        )
        .bind(&i.id)
        .bind(&i.name)
        .bind(i.quantity)
        .bind(&i.unit)
        .bind(i.min_quantity)
        .bind(&i.category)
        .bind(i.last_updated)
        .execute(&self.db)
        .await
        .context("插入或更新库存条目失败")?;
        Ok(())
    }

    /// 仅当事件不过期时应用（last_updated 兼做版本）
    pub async fn upsert_if_newer(&self, i: &LocalInventoryItem) -> Result<bool> {
        if let Some(existing) = self.get_item(&i.id).await? {
            if existing.last_updated > i.last_updated {
                return Ok(false);
            }
        }
        self.upsert_item(i).await?;
        Ok(true)
    }

    pub async fn replace_all(&self, items: &[LocalInventoryItem]) -> Result<()> {
        let mut tx = self.db.begin().await.context("开启事务失败")?;
        sqlx::query("DELETE FROM local_inventory")
            .execute(&mut *tx)
            .await
            .context("清空库存表失败")?;
        for i in items {
            sqlx::query(
                r#"
                INSERT INTO local_inventory (
                    id, name, quantity, unit, min_quantity, category, last_updated
                ) VALUES (?,?,?,?,?,?,?)
                "#,
            )
            .bind(&i.id)
            .bind(&i.name)
            .bind(i.quantity)
            .bind(&i.unit)
            .bind(i.min_quantity)
            .bind(&i.category)
            .bind(i.last_updated)
            .execute(&mut *tx)
            .await
            .context("写入库存条目失败")?;
        }
        tx.commit().await.context("提交事务失败")?;
        Ok(())
    }

    pub async fn delete_item(&self, item_id: &str) -> Result<()> {
        sqlx::query("DELETE FROM local_inventory WHERE id = ?")
            .bind(item_id)
            .execute(&self.db)
            .await
            .context("删除库存条目失败")?;
        Ok(())
    }
}
