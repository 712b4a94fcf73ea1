//! 店铺设置同步服务层
//!
//! 远端无记录时回退到内置默认值；"表未创建"对设置而言是真错误，
//! 直接向上抛，不做仅本地降级。

use crate::cafe::settings::api::SettingsApi;
use crate::cafe::settings::dao::SettingsDao;
use crate::cafe::settings::models::{CafeSettings, SettingsPatch};
use crate::cafe::types::{err_code, ServerError};
use anyhow::Result;
use sqlx::{Pool, Sqlite};
use std::sync::Arc;
use tracing::{error, info};

pub struct SettingsSyncer {
    api: SettingsApi,
    dao: SettingsDao,
}

impl SettingsSyncer {
    pub fn with_db(http_client: reqwest::Client, api_base_url: String, db: Arc<Pool<Sqlite>>) -> Self {
        Self {
            api: SettingsApi::new(http_client, api_base_url),
            dao: SettingsDao::new((*db).clone()),
        }
    }

    pub async fn initial_sync(&self) -> Result<()> {
        info!("[SettingsSync] 🔄 开始设置初始同步...");
        match self.api.get_settings().await {
            Ok(settings) => {
                self.dao.upsert_settings(&settings).await?;
                info!("[SettingsSync] ✅ 设置初始同步完成");
                Ok(())
            }
            Err(e) => {
                // 行不存在不算错误，写入默认值即可
                let row_missing = e
                    .downcast_ref::<ServerError>()
                    .map(|s| s.code == err_code::ROW_NOT_FOUND)
                    .unwrap_or(false);
                if row_missing {
                    info!("[SettingsSync] 🆕 远端无设置记录，使用默认值");
                    self.dao.upsert_settings(&CafeSettings::default()).await?;
                    return Ok(());
                }
                error!("[SettingsSync] ❌ 设置初始同步失败: {:?}", e);
                Err(e)
            }
        }
    }

    /// 当前设置；本地也没有时返回内置默认值
    pub async fn get_settings(&self) -> Result<CafeSettings> {
        Ok(self.dao.get_settings().await?.unwrap_or_default())
    }

    pub async fn update_settings(&self, patch: &SettingsPatch) -> Result<CafeSettings> {
        self.api.update_settings(patch).await?;

        let mut settings = self.get_settings().await?;
        patch.apply_to(&mut settings);
        self.dao.upsert_settings(&settings).await?;
        Ok(settings)
    }

    /// 实时变更：设置是单行，整行替换
    pub async fn apply_settings_row(&self, row: &serde_json::Value) -> Result<()> {
        let settings: CafeSettings = serde_json::from_value(row.clone())?;
        self.dao.upsert_settings(&settings).await?;
        Ok(())
    }
}
