//! 员工数据访问层（DAO）

use crate::cafe::staff::models::LocalStaffMember;
use anyhow::{Context, Result};
use sqlx::{Pool, Row, Sqlite};

pub struct StaffDao {
    db: Pool<Sqlite>,
}

impl StaffDao {
    pub fn new(db: Pool<Sqlite>) -> Self {
        Self { db }
    }

    fn row_to_member(m: &sqlx::sqlite::SqliteRow) -> LocalStaffMember {
        LocalStaffMember {
            id: m.get("id"),
            username: m.get("username"),
            display_name: m.get("display_name"),
            role: m.get("role"),
            active: m.get::<i64, _>("active") != 0,
        }
    }

    pub async fn get_staff_by_role(&self, role: &str) -> Result<Vec<LocalStaffMember>> {
        let rows = sqlx::query(
            r#"
            SELECT id, username, display_name, role, active
            FROM local_staff
            WHERE role = ?
            ORDER BY username ASC
            "#,
        )
        .bind(role)
        .fetch_all(&self.db)
        .await
        .context("查询员工列表失败")?;

        Ok(rows.iter().map(Self::row_to_member).collect())
    }

    pub async fn upsert_member(&self, s: &LocalStaffMember) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO local_staff (id, username, display_name, role, active)
            VALUES (?,?,?,?,?)
            ON CONFLICT(id) DO UPDATE SET
                username = excluded.username,
                display_name = excluded.display_name,
                role = excluded.role,
                active = excluded.active
            "#,
        )
        .bind(&s.id)
        .bind(&s.username)
        .bind(&s.display_name)
        .bind(&s.role)
        .bind(s.active as i64)
        .execute(&self.db)
        .await
        .context("插入或更新员工失败")?;
        Ok(())
    }

    pub async fn replace_role(&self, role: &str, members: &[LocalStaffMember]) -> Result<()> {
        let mut tx = self.db.begin().await.context("开启事务失败")?;
        sqlx::query("DELETE FROM local_staff WHERE role = ?")
            .bind(role)
            .execute(&mut *tx)
            .await
            .context("清空员工表失败")?;
        for s in members {
            sqlx::query(
                r#"
                INSERT INTO local_staff (id, username, display_name, role, active)
                VALUES (?,?,?,?,?)
                "#,
            )
            .bind(&s.id)
            .bind(&s.username)
            .bind(&s.display_name)
            .bind(&s.role)
            .bind(s.active as i64)
            .execute(&mut *tx)
            .await
            .context("写入员工失败")?;
        }
        tx.commit().await.context("提交事务失败")?;
        Ok(())
    }

    pub async fn delete_member(&self, staff_id: &str) -> Result<()> {
        sqlx::query("DELETE FROM local_staff WHERE id = ?")
            .bind(staff_id)
            .execute(&self.db)
            .await
            .context("删除员工失败")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cafe::db::create_memory_pool;

    fn member(id: &str, username: &str, role: &str) -> LocalStaffMember {
        LocalStaffMember {
            id: id.to_string(),
            username: username.to_string(),
            display_name: username.to_string(),
            role: role.to_string(),
            active: true,
        }
    }

    #[tokio::test]
    async fn test_replace_role_scoped() {
        let db = create_memory_pool().await.unwrap();
        let dao = StaffDao::new(db);

        dao.upsert_member(&member("a1", "boss", "admin")).await.unwrap();
        dao.upsert_member(&member("d1", "ali", "delivery")).await.unwrap();

        // 只替换 delivery 角色，admin 行不受影响
        dao.replace_role("delivery", &[member("d2", "vali", "delivery")])
            .await
            .unwrap();

        assert_eq!(dao.get_staff_by_role("admin").await.unwrap().len(), 1);
        let couriers = dao.get_staff_by_role("delivery").await.unwrap();
        assert_eq!(couriers.len(), 1);
        assert_eq!(couriers[0].username, "vali");
    }
}
