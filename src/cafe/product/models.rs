//! 商品本地模型定义

use serde::{Deserialize, Serialize};

/// 本地商品数据结构
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalProduct {
    pub id: String,
    pub name: String,
    /// 价格（苏姆，整数）
    #[serde(default)]
    pub price: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    /// 分类为自由文本标签，客户端不校验外键
    #[serde(default)]
    pub category: String,
    #[serde(default = "default_available")]
    pub is_available: bool,
    #[serde(default)]
    pub created_at: i64,
}

fn default_available() -> bool {
    true
}

/// 新建商品请求体（id 由服务器分配）
#[derive(Debug, Clone, Serialize)]
pub struct NewProduct {
    pub name: String,
    pub price: i64,
    pub description: String,
    pub image: String,
    pub category: String,
    pub is_available: bool,
}

/// 商品补丁
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProductPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_available: Option<bool>,
}

impl ProductPatch {
    pub fn apply_to(&self, p: &mut LocalProduct) {
        if let Some(ref v) = self.name {
            p.name = v.clone();
        }
        if let Some(v) = self.price {
            p.price = v;
        }
        if let Some(ref v) = self.description {
            p.description = v.clone();
        }
        if let Some(ref v) = self.image {
            p.image = v.clone();
        }
        if let Some(ref v) = self.category {
            p.category = v.clone();
        }
        if let Some(v) = self.is_available {
            p.is_available = v;
        }
    }
}
