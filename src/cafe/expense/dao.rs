//! 支出数据访问层（DAO）

use crate::cafe::expense::models::LocalExpenseItem;
use anyhow::{Context, Result};
use sqlx::{Pool, Row, Sqlite};

pub struct ExpenseDao {
    db: Pool<Sqlite>,
}

impl ExpenseDao {
    pub fn new(db: Pool<Sqlite>) -> Self {
        Self { db }
    }

    fn row_to_expense(m: &sqlx::sqlite::SqliteRow) -> LocalExpenseItem {
        LocalExpenseItem {
            id: m.get("id"),
            amount: m.get("amount"),
            category: m.get("category"),
            description: m.get("description"),
            date: m.get("date"),
            created_at: m.get("created_at"),
        }
    }

    /// 全部支出（日期倒序，最近的在前）
    pub async fn get_all_expenses(&self) -> Result<Vec<LocalExpenseItem>> {
        let rows = sqlx::query(
            r#"
            SELECT id, amount, category, description, date, created_at
            FROM local_expenses
            ORDER BY date DESC, created_at DESC
            "#,
        )
        .fetch_all(&self.db)
        .await
        .context("查询支出列表失败")?;

        Ok(rows.iter().map(Self::row_to_expense).collect())
    }

    pub async fn upsert_expense(&self, e: &LocalExpenseItem) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO local_expenses (
                id, amount, category, description, date, created_at
            ) VALUES (?,?,?,?,?,?)
            ON CONFLICT(id) DO UPDATE SET
                amount = excluded.amount,
                category = excluded.category,
                description = excluded.description,
                date = excluded.date,
                created_at = excluded.created_at
            "#,
        )
        .bind(&e.id)
        .bind(e.amount)
        .bind(&e.category)
        .bind(&e.description)
        .bind(&e.date)
        .bind(e.created_at)
        .execute(&self.db)
        .await
        .context("插入或更新支出失败")?;
        Ok(())
    }

    pub async fn replace_all(&self, expenses: &[LocalExpenseItem]) -> Result<()> {
        let mut tx = self.db.begin().await.context("开启事务失败")?;
        sqlx::query("DELETE FROM local_expenses")
            .execute(&mut *tx)
            .await
            .context("清空支出表失败")?;
        for e in expenses {
            sqlx::query(
                r#"
                INSERT INTO local_expenses (
                    id, amount, category, description, date, created_at
                ) VALUES (?,?,?,?,?,?)
                "#,
            )
            .bind(&e.id)
            .bind(e.amount)
            .bind(&e.category)
            .bind(&e.description)
            .bind(&e.date)
            .bind(e.created_at)
            .execute(&mut *tx)
            .await
            .context("写入支出失败")?;
        }
        tx.commit().await.context("提交事务失败")?;
        Ok(())
    }

    pub async fn delete_expense(&self, expense_id: &str) -> Result<()> {
        sqlx::query("DELETE FROM local_expenses WHERE id = ?")
            .bind(expense_id)
            .execute(&self.db)
            .await
            .context("删除支出失败")?;
        Ok(())
    }

    /// 指定日期区间内的支出总额（date 为 ISO 字符串，可直接比较）
    pub async fn total_between(&self, from: &str, to: &str) -> Result<i64> {
        let row = sqlx::query(
            "SELECT COALESCE(SUM(amount), 0) AS total FROM local_expenses WHERE date >= ? AND date <= ?",
        )
        .bind(from)
        .bind(to)
        .fetch_one(&self.db)
        .await
        .context("统计支出总额失败")?;
        Ok(row.get("total"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cafe::db::create_memory_pool;

    fn expense(id: &str, amount: i64, date: &str) -> LocalExpenseItem {
        LocalExpenseItem {
            id: id.to_string(),
            amount,
            category: "Mahsulotlar".to_string(),
            description: String::new(),
            date: date.to_string(),
            created_at: 0,
        }
    }

    #[tokio::test]
    async fn test_ordering_and_total() {
        let db = create_memory_pool().await.unwrap();
        let dao = ExpenseDao::new(db);

        dao.upsert_expense(&expense("a", 50_000, "2025-06-01"))
            .await
            .unwrap();
        dao.upsert_expense(&expense("b", 120_000, "2025-06-03"))
            .await
            .unwrap();
        dao.upsert_expense(&expense("c", 30_000, "2025-06-02"))
            .await
            .unwrap();

        let all = dao.get_all_expenses().await.unwrap();
        let ids: Vec<&str> = all.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);

        let total = dao.total_between("2025-06-02", "2025-06-03").await.unwrap();
        assert_eq!(total, 150_000);
    }
}
