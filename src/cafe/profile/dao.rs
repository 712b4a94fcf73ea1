//! 用户资料数据访问层（DAO）

use crate::cafe::profile::models::LocalProfile;
use anyhow::{Context, Result};
use sqlx::{Pool, Row, Sqlite};

pub struct ProfileDao {
    db: Pool<Sqlite>,
}

impl ProfileDao {
    pub fn new(db: Pool<Sqlite>) -> Self {
        Self { db }
    }

    fn row_to_profile(m: &sqlx::sqlite::SqliteRow) -> LocalProfile {
        LocalProfile {
            telegram_id: m.get("telegram_id"),
            phone: m.get("phone"),
            full_name: m.get("full_name"),
            username: m.get("username"),
            created_at: m.get("created_at"),
        }
    }

    /// 全部用户资料（最近注册的在前）
    pub async fn get_all_profiles(&self) -> Result<Vec<LocalProfile>> {
        let rows = sqlx::query(
            r#"
            SELECT telegram_id, phone, full_name, username, created_at
            FROM local_profiles
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.db)
        .await
        .context("查询用户资料列表失败")?;

        Ok(rows.iter().map(Self::row_to_profile).collect())
    }

    pub async fn upsert_profile(&self, p: &LocalProfile) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO local_profiles (telegram_id, phone, full_name, username, created_at)
            VALUES (?,?,?,?,?)
            ON CONFLICT(telegram_id) DO UPDATE SET
                phone = excluded.phone,
                full_name = excluded.full_name,
                username = excluded.username,
                created_at = excluded.created_at
            "#,
        )
        .bind(p.telegram_id)
        .bind(&p.phone)
        .bind(&p.full_name)
        .bind(&p.username)
        .bind(p.created_at)
        .execute(&self.db)
        .await
        .context("插入或更新用户资料失败")?;
        Ok(())
    }

    pub async fn replace_all(&self, profiles: &[LocalProfile]) -> Result<()> {
        let mut tx = self.db.begin().await.context("开启事务失败")?;
        sqlx::query("DELETE FROM local_profiles")
            .execute(&mut *tx)
            .await
            .context("清空用户资料表失败")?;
        for p in profiles {
            sqlx::query(
                r#"
                INSERT INTO local_profiles (telegram_id, phone, full_name, username, created_at)
                VALUES (?,?,?,?,?)
                "#,
            )
            .bind(p.telegram_id)
            .bind(&p.phone)
            .bind(&p.full_name)
            .bind(&p.username)
            .bind(p.created_at)
            .execute(&mut *tx)
            .await
            .context("写入用户资料失败")?;
        }
        tx.commit().await.context("提交事务失败")?;
        Ok(())
    }

    pub async fn delete_profile(&self, telegram_id: i64) -> Result<()> {
        sqlx::query("DELETE FROM local_profiles WHERE telegram_id = ?")
            .bind(telegram_id)
            .execute(&self.db)
            .await
            .context("删除用户资料失败")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cafe::db::create_memory_pool;

    #[tokio::test]
    async fn test_newest_first() {
        let db = create_memory_pool().await.unwrap();
        let dao = ProfileDao::new(db);

        let p = |id: i64, created_at: i64| LocalProfile {
            telegram_id: id,
            phone: format!("+99890000000{}", id),
            full_name: format!("User {}", id),
            username: None,
            created_at,
        };
        dao.upsert_profile(&p(1, 100)).await.unwrap();
        dao.upsert_profile(&p(2, 300)).await.unwrap();
        dao.upsert_profile(&p(3, 200)).await.unwrap();

        let all = dao.get_all_profiles().await.unwrap();
        let ids: Vec<i64> = all.iter().map(|p| p.telegram_id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }
}
