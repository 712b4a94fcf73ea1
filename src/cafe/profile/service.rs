//! 用户资料同步服务层
//!
//! 目录是只读的：事件携带完整行时就地合并，否则整表重拉。

use crate::cafe::profile::api::ProfileApi;
use crate::cafe::profile::dao::ProfileDao;
use crate::cafe::profile::models::LocalProfile;
use crate::cafe::types::{ChangeEvent, ChangeKind};
use anyhow::Result;
use sqlx::{Pool, Sqlite};
use std::sync::Arc;
use tracing::{error, info, warn};

pub struct ProfileSyncer {
    api: ProfileApi,
    dao: ProfileDao,
}

impl ProfileSyncer {
    pub fn with_db(http_client: reqwest::Client, api_base_url: String, db: Arc<Pool<Sqlite>>) -> Self {
        Self {
            api: ProfileApi::new(http_client, api_base_url),
            dao: ProfileDao::new((*db).clone()),
        }
    }

    pub async fn initial_sync(&self) -> Result<()> {
        info!("[ProfileSync] 🔄 开始用户资料初始同步...");
        match self.api.get_all_profiles().await {
            Ok(profiles) => {
                self.dao.replace_all(&profiles).await?;
                info!("[ProfileSync] ✅ 用户资料初始同步完成，共 {} 条", profiles.len());
                Ok(())
            }
            Err(e) => {
                error!("[ProfileSync] ❌ 用户资料初始同步失败: {:?}", e);
                Err(e)
            }
        }
    }

    pub async fn apply_event(&self, event: &ChangeEvent) -> Result<()> {
        match event.kind {
            ChangeKind::Insert | ChangeKind::Update => {
                match event
                    .new
                    .as_ref()
                    .and_then(|v| serde_json::from_value::<LocalProfile>(v.clone()).ok())
                {
                    Some(profile) => self.dao.upsert_profile(&profile).await?,
                    None => {
                        // 行不完整时整表重拉
                        warn!("[ProfileSync] ⚠️ 资料事件行不完整，整表重拉");
                        self.initial_sync().await?;
                    }
                }
            }
            ChangeKind::Delete => {
                if let Some(id) = event
                    .old
                    .as_ref()
                    .and_then(|v| v.get("telegram_id"))
                    .and_then(|v| v.as_i64())
                {
                    self.dao.delete_profile(id).await?;
                }
            }
        }
        Ok(())
    }

    pub async fn get_all_profiles(&self) -> Result<Vec<LocalProfile>> {
        self.dao.get_all_profiles().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cafe::db::create_memory_pool;

    #[tokio::test]
    async fn test_event_upsert_and_delete() {
        let db = Arc::new(create_memory_pool().await.unwrap());
        let syncer = ProfileSyncer::with_db(
            reqwest::Client::new(),
            "http://localhost:1".to_string(),
            db,
        );

        let insert = ChangeEvent {
            table: "profiles".to_string(),
            kind: ChangeKind::Insert,
            new: Some(serde_json::json!({
                "telegram_id": 42,
                "phone": "+998901234567",
                "full_name": "Aziz Karimov",
                "created_at": 1000,
            })),
            old: None,
        };
        syncer.apply_event(&insert).await.unwrap();
        assert_eq!(syncer.get_all_profiles().await.unwrap().len(), 1);

        let delete = ChangeEvent {
            table: "profiles".to_string(),
            kind: ChangeKind::Delete,
            new: None,
            old: Some(serde_json::json!({ "telegram_id": 42 })),
        };
        syncer.apply_event(&delete).await.unwrap();
        assert!(syncer.get_all_profiles().await.unwrap().is_empty());
    }
}
