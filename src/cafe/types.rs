use serde::{Deserialize, Serialize};

/// 远端表名常量
pub mod table {
    pub const ORDERS: &str = "orders";
    pub const PRODUCTS: &str = "products";
    pub const CATEGORIES: &str = "categories";
    pub const STAFF: &str = "staff";
    pub const INVENTORY: &str = "inventory";
    pub const EXPENSES: &str = "expenses";
    pub const SETTINGS: &str = "settings";
    pub const PROFILES: &str = "profiles";
}

/// 服务器错误码
pub mod err_code {
    /// 表未创建（对应原后端 "relation does not exist"）
    pub const TABLE_NOT_FOUND: i32 = 1205;
    /// 单行查询无结果
    pub const ROW_NOT_FOUND: i32 = 1116;
}

/// 表变更事件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeKind {
    #[serde(rename = "INSERT")]
    Insert,
    #[serde(rename = "UPDATE")]
    Update,
    #[serde(rename = "DELETE")]
    Delete,
}

/// 表变更事件（实时通道推送的单条记录补丁）
///
/// `new` 为 INSERT/UPDATE 时的完整行，`old` 为 DELETE 时的旧行（至少含 id）。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub table: String,
    #[serde(rename = "eventType")]
    pub kind: ChangeKind,
    #[serde(default)]
    pub new: Option<serde_json::Value>,
    #[serde(default)]
    pub old: Option<serde_json::Value>,
}

/// WebSocket 连接响应结构（文本消息）
#[derive(Debug, Deserialize)]
pub struct WebSocketConnectResp {
    #[serde(rename = "errCode")]
    pub err_code: i32,
    #[serde(rename = "errMsg")]
    pub err_msg: String,
    #[serde(rename = "errDlt", default)]
    pub err_dlt: String,
}

/// 服务器业务错误（保留错误码，便于上层识别"表未创建"等情况）
#[derive(Debug)]
pub struct ServerError {
    pub code: i32,
    pub msg: String,
}

impl std::fmt::Display for ServerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "服务器错误 {}: {}", self.code, self.msg)
    }
}

impl std::error::Error for ServerError {}

/// 判断错误是否为"表未创建"
///
/// 兼容两种形态：结构化错误码，以及老后端直接透传的消息子串。
pub fn is_table_missing(err: &anyhow::Error) -> bool {
    if let Some(se) = err.downcast_ref::<ServerError>() {
        if se.code == err_code::TABLE_NOT_FOUND {
            return true;
        }
        if se.msg.contains("does not exist") {
            return true;
        }
    }
    err.to_string().contains("does not exist")
}

/// 统一的 API 响应包装结构体（包含 errCode、errMsg、data）
/// data 字段可能为 null 或缺失，因此使用 Option<T>
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(rename = "errCode")]
    pub err_code: i32,
    #[serde(rename = "errMsg")]
    pub err_msg: String,
    pub data: Option<T>,
}

/// 通用 HTTP 响应处理函数：直接反序列化为统一的响应结构体
/// 返回 `ApiResponse<T>`，调用方可以根据需要处理 `data` 字段（可能为 None）
pub async fn handle_http_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
    operation_name: &str,
) -> anyhow::Result<ApiResponse<T>> {
    use anyhow::Context;
    use tracing::{debug, error};

    let status = response.status();

    // 读取 body bytes（只能读取一次）
    let body_bytes = response.bytes().await.context("读取响应 body 失败")?;
    let body_str = String::from_utf8_lossy(&body_bytes);

    if !status.is_success() {
        error!(
            "[HTTP] {}请求失败，HTTP状态: {}, 响应: {}",
            operation_name, status, body_str
        );
        return Err(anyhow::anyhow!("HTTP 错误 {}: {}", status, body_str));
    }
    debug!("[HTTP] {}请求成功，HTTP状态: {}", operation_name, status);

    let api_resp: ApiResponse<T> = serde_json::from_slice(&body_bytes).map_err(|e| {
        error!(
            "[HTTP] {}反序列化失败: {:?}\n原始响应: {}",
            operation_name, e, body_str
        );
        anyhow::anyhow!("反序列化响应失败: {:?}", e)
    })?;

    // 检查错误码
    if api_resp.err_code != 0 {
        error!(
            "[HTTP] {}服务器错误，错误码: {}, 错误信息: {}",
            operation_name, api_resp.err_code, api_resp.err_msg
        );
        return Err(anyhow::Error::new(ServerError {
            code: api_resp.err_code,
            msg: api_resp.err_msg,
        }));
    }

    Ok(api_resp)
}
