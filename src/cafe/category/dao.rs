//! 分类数据访问层（DAO）

use crate::cafe::category::models::LocalCategory;
use anyhow::{Context, Result};
use sqlx::{Pool, Row, Sqlite};

pub struct CategoryDao {
    db: Pool<Sqlite>,
}

impl CategoryDao {
    pub fn new(db: Pool<Sqlite>) -> Self {
        Self { db }
    }

    pub async fn get_all_categories(&self) -> Result<Vec<LocalCategory>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, slug, created_at
            FROM local_categories
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.db)
        .await
        .context("查询分类列表失败")?;

        Ok(rows
            .into_iter()
            .map(|m| LocalCategory {
                id: m.get("id"),
                name: m.get("name"),
                slug: m.get("slug"),
                created_at: m.get("created_at"),
            })
            .collect())
    }

    pub async fn upsert_category(&self, c: &LocalCategory) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO local_categories (id, name, slug, created_at)
            VALUES (?,?,?,?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                slug = excluded.slug,
                created_at = excluded.created_at
            "#,
        )
        .bind(&c.id)
        .bind(&c.name)
        .bind(&c.slug)
        .bind(c.created_at)
        .execute(&self.db)
        .await
        .context("插入或更新分类失败")?;
        Ok(())
    }

    pub async fn replace_all(&self, categories: &[LocalCategory]) -> Result<()> {
        let mut tx = self.db.begin().await.context("开启事务失败")?;
        sqlx::query("DELETE FROM local_categories")
            .execute(&mut *tx)
            .await
            .context("清空分类表失败")?;
        for c in categories {
            sqlx::query("INSERT INTO local_categories (id, name, slug, created_at) VALUES (?,?,?,?)")
                .bind(&c.id)
                .bind(&c.name)
                .bind(&c.slug)
                .bind(c.created_at)
                .execute(&mut *tx)
                .await
                .context("写入分类失败")?;
        }
        tx.commit().await.context("提交事务失败")?;
        Ok(())
    }

    pub async fn delete_category(&self, category_id: &str) -> Result<()> {
        sqlx::query("DELETE FROM local_categories WHERE id = ?")
            .bind(category_id)
            .execute(&self.db)
            .await
            .context("删除分类失败")?;
        Ok(())
    }
}
