//! 员工同步服务层

use crate::cafe::order::dao::OrderDao;
use crate::cafe::staff::api::StaffApi;
use crate::cafe::staff::dao::StaffDao;
use crate::cafe::staff::models::{LocalStaffMember, NewStaffMember};
use crate::cafe::types::{ChangeEvent, ChangeKind};
use anyhow::{Context, Result};
use sqlx::{Pool, Sqlite};
use std::sync::Arc;
use tracing::{error, info};

pub struct StaffSyncer {
    api: StaffApi,
    dao: StaffDao,
    order_dao: OrderDao,
}

impl StaffSyncer {
    pub fn with_db(http_client: reqwest::Client, api_base_url: String, db: Arc<Pool<Sqlite>>) -> Self {
        Self {
            api: StaffApi::new(http_client, api_base_url),
            dao: StaffDao::new((*db).clone()),
            order_dao: OrderDao::new((*db).clone()),
        }
    }

    /// 拉取并镜像指定角色的员工
    pub async fn sync_role(&self, role: &str) -> Result<()> {
        info!("[StaffSync] 🔄 开始员工同步，角色: {}", role);
        match self.api.get_staff_by_role(role).await {
            Ok(members) => {
                self.dao.replace_role(role, &members).await?;
                info!("[StaffSync] ✅ 员工同步完成，共 {} 人", members.len());
                Ok(())
            }
            Err(e) => {
                error!("[StaffSync] ❌ 员工同步失败: {:?}", e);
                Err(e)
            }
        }
    }

    pub async fn apply_event(&self, event: &ChangeEvent) -> Result<()> {
        match event.kind {
            ChangeKind::Insert | ChangeKind::Update => {
                let v = event
                    .new
                    .as_ref()
                    .ok_or_else(|| anyhow::anyhow!("变更事件缺少 new 字段"))?;
                let member: LocalStaffMember =
                    serde_json::from_value(v.clone()).context("解析员工行失败")?;
                self.dao.upsert_member(&member).await?;
            }
            ChangeKind::Delete => {
                let id = event
                    .old
                    .as_ref()
                    .and_then(|v| v.get("id"))
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| anyhow::anyhow!("删除事件缺少 id"))?;
                self.dao.delete_member(id).await?;
            }
        }
        Ok(())
    }

    pub async fn get_staff_by_role(&self, role: &str) -> Result<Vec<LocalStaffMember>> {
        self.dao.get_staff_by_role(role).await
    }

    pub async fn add_staff(&self, member: NewStaffMember) -> Result<LocalStaffMember> {
        let created = self.api.insert_staff(&member).await?;
        self.dao.upsert_member(&created).await?;
        Ok(created)
    }

    pub async fn delete_staff(&self, staff_id: &str) -> Result<()> {
        self.api.delete_staff(staff_id).await?;
        self.dao.delete_member(staff_id).await?;
        Ok(())
    }

    /// 送货员完成的配送量。不落库，按订单镜像里
    /// delivered 状态的 delivery_person 分组计数，用 display_name 匹配。
    pub async fn delivery_counts(&self) -> Result<Vec<(LocalStaffMember, i64)>> {
        let counts = self.order_dao.delivered_counts().await?;
        let couriers = self.dao.get_staff_by_role("delivery").await?;
        Ok(couriers
            .into_iter()
            .map(|m| {
                let n = counts.get(&m.display_name).copied().unwrap_or(0);
                (m, n)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cafe::db::create_memory_pool;
    use crate::cafe::order::models::LocalOrder;
    use crate::cafe::order::status::OrderStatus;

    fn delivered_order(id: &str, courier: &str) -> LocalOrder {
        LocalOrder {
            id: id.to_string(),
            product_name: "Lag'mon".to_string(),
            status: OrderStatus::Delivered,
            delivery_person: Some(courier.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_delivery_counts_derived_from_orders() {
        let db = Arc::new(create_memory_pool().await.unwrap());
        let syncer = StaffSyncer::with_db(
            reqwest::Client::new(),
            "http://localhost:1".to_string(),
            db,
        );

        syncer
            .dao
            .upsert_member(&LocalStaffMember {
                id: "d1".to_string(),
                username: "ali".to_string(),
                display_name: "Ali".to_string(),
                role: "delivery".to_string(),
                active: true,
            })
            .await
            .unwrap();
        syncer
            .dao
            .upsert_member(&LocalStaffMember {
                id: "d2".to_string(),
                username: "vali".to_string(),
                display_name: "Vali".to_string(),
                role: "delivery".to_string(),
                active: true,
            })
            .await
            .unwrap();

        syncer
            .order_dao
            .upsert_order(&delivered_order("o1", "Ali"))
            .await
            .unwrap();
        syncer
            .order_dao
            .upsert_order(&delivered_order("o2", "Ali"))
            .await
            .unwrap();

        let counts = syncer.delivery_counts().await.unwrap();
        assert_eq!(counts.len(), 2);
        let ali = counts.iter().find(|(m, _)| m.display_name == "Ali").unwrap();
        assert_eq!(ali.1, 2);
        let vali = counts.iter().find(|(m, _)| m.display_name == "Vali").unwrap();
        assert_eq!(vali.1, 0);
    }
}
