//! 店铺设置数据访问层（单行表，id 固定为 1）

use crate::cafe::settings::models::CafeSettings;
use anyhow::{Context, Result};
use sqlx::{Pool, Row, Sqlite};

pub struct SettingsDao {
    db: Pool<Sqlite>,
}

impl SettingsDao {
    pub fn new(db: Pool<Sqlite>) -> Self {
        Self { db }
    }

    pub async fn get_settings(&self) -> Result<Option<CafeSettings>> {
        let row = sqlx::query(
            r#"
            SELECT cafe_name, address, phone, open_time, close_time,
                   delivery_enabled, min_order_amount, delivery_fee, description
            FROM local_settings
            WHERE id = 1
            "#,
        )
        .fetch_optional(&self.db)
        .await
        .context("查询店铺设置失败")?;

        Ok(row.map(|m| CafeSettings {
            cafe_name: m.get("cafe_name"),
            address: m.get("address"),
            phone: m.get("phone"),
            open_time: m.get("open_time"),
            close_time: m.get("close_time"),
            delivery_enabled: m.get::<i64, _>("delivery_enabled") != 0,
            min_order_amount: m.get("min_order_amount"),
            delivery_fee: m.get("delivery_fee"),
            description: m.get("description"),
        }))
    }

    pub async fn upsert_settings(&self, s: &CafeSettings) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO local_settings (
                id, cafe_name, address, phone, open_time, close_time,
                delivery_enabled, min_order_amount, delivery_fee, description
            ) VALUES (1,?,?,?,?,?,?,?,?,?)
            ON CONFLICT(id) DO UPDATE SET
                cafe_name = excluded.cafe_name,
                address = excluded.address,
                phone = excluded.phone,
                open_time = excluded.open_time,
                close_time = excluded.close_time,
                delivery_enabled = excluded.delivery_enabled,
                min_order_amount = excluded.min_order_amount,
                delivery_fee = excluded.delivery_fee,
                description = excluded.description
            "#,
        )
        .bind(&s.cafe_name)
        .bind(&s.address)
        .bind(&s.phone)
        .bind(&s.open_time)
        .bind(&s.close_time)
        .bind(s.delivery_enabled as i64)
        .bind(s.min_order_amount)
        .bind(s.delivery_fee)
        .bind(&s.description)
        .execute(&self.db)
        .await
        .context("写入店铺设置失败")?;
        Ok(())
    }
}
