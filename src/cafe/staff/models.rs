//! 员工本地模型定义

use crate::cafe::auth::StaffRole;
use serde::{Deserialize, Serialize};

/// 本地员工记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalStaffMember {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub role: String,
    /// 远端从不写 false，保留字段以匹配行结构
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl LocalStaffMember {
    pub fn staff_role(&self) -> Option<StaffRole> {
        StaffRole::parse(&self.role).ok()
    }
}

/// 新建员工请求体（密码只在创建时上送，不落本地库）
#[derive(Debug, Clone, Serialize)]
pub struct NewStaffMember {
    pub username: String,
    pub password: String,
    pub display_name: String,
    pub role: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_defaults_true() {
        let m: LocalStaffMember =
            serde_json::from_str(r#"{"id":"s1","username":"ali","role":"delivery"}"#).unwrap();
        assert!(m.active);
        assert_eq!(m.staff_role(), Some(StaffRole::Delivery));
    }
}
