//! 分类本地模型定义

use serde::{Deserialize, Serialize};

/// 本地分类数据结构
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalCategory {
    pub id: String,
    pub name: String,
    /// 创建时由名称派生，之后不再重新校验
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub created_at: i64,
}

/// 由名称派生 slug：小写、空格转连字符、去掉其余符号
///
/// 与原前端的简易实现保持一致，不去重——重复 slug 由远端容忍。
pub fn slugify(name: &str) -> String {
    name.to_lowercase()
        .replace(' ', "-")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Issiq taomlar"), "issiq-taomlar");
        assert_eq!(slugify("Kofe"), "kofe");
        assert_eq!(slugify("Salat & Gazak"), "salat--gazak");
        assert_eq!(slugify("Choy 2"), "choy-2");
    }
}
