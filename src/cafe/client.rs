//! Ajabo 客户端核心实现模块
//!
//! 负责实时通道：WebSocket 连接鉴权、心跳、帧解压，以及把表变更
//! 事件按表名分发给各资源同步器。

use crate::cafe::category::service::CategorySyncer;
use crate::cafe::expense::service::ExpenseSyncer;
use crate::cafe::inventory::service::InventorySyncer;
use crate::cafe::order::{
    listener::{EmptyOrderListener, OrderListener},
    models::{LocalOrder, OrderPatch, OrderSyncerConfig},
    service::OrderSyncer,
    status::OrderStatus,
};
use crate::cafe::product::{
    listener::{EmptyProductListener, ProductListener},
    service::ProductSyncer,
};
use crate::cafe::profile::service::ProfileSyncer;
use crate::cafe::settings::service::SettingsSyncer;
use crate::cafe::staff::service::StaffSyncer;
use crate::cafe::types::{table, ChangeEvent, WebSocketConnectResp};
use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use std::io::{Read, Write};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::time::interval;
use tokio_tungstenite::MaybeTlsStream;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::{connect_async, tungstenite::Message as WsMessage};
use tracing::{debug, error, info, warn};

/// WebSocket 写入端类型别名
pub type WsWriter = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, WsMessage>;

/// WebSocket 读取端类型别名
pub type WsReader = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

/// 客户端配置
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// 员工用户 ID
    pub user_id: String,
    /// 认证 token
    pub token: String,
    /// 平台 ID
    pub platform_id: i32,
    /// WebSocket 服务器 URL
    pub ws_url: String,
    /// 压缩方式，例如 "gzip" 或空字符串表示不压缩
    pub compression: String,
    /// SDK 类型
    pub sdk_type: String,
    /// HTTP API 基础地址
    pub api_base_url: String,
    /// 本地 SQLite 数据库 URL
    ///
    /// 例如：`sqlite://ajabo.db?mode=rwc`
    pub db_url: String,
}

impl ClientConfig {
    /// 创建默认配置
    pub fn new(user_id: String, token: String, platform_id: i32) -> Self {
        Self {
            user_id,
            token,
            platform_id,
            ws_url: "ws://localhost:10001".to_string(),
            compression: "gzip".to_string(),
            sdk_type: "rust".to_string(),
            api_base_url: "http://localhost:10002".to_string(),
            db_url: "sqlite://ajabo.db?mode=rwc".to_string(),
        }
    }
}

/// Ajabo 客户端
///
/// 持有所有资源同步器；`connect()` 之后各本地镜像开始跟随远端。
#[derive(Clone)]
pub struct AjaboClient {
    pub(crate) config: ClientConfig,
    writer: Option<Arc<Mutex<WsWriter>>>,
    pub(crate) order_syncer: Option<Arc<OrderSyncer>>,
    pub(crate) product_syncer: Option<Arc<ProductSyncer>>,
    pub(crate) category_syncer: Option<Arc<CategorySyncer>>,
    pub(crate) inventory_syncer: Option<Arc<InventorySyncer>>,
    pub(crate) expense_syncer: Option<Arc<ExpenseSyncer>>,
    pub(crate) staff_syncer: Option<Arc<StaffSyncer>>,
    pub(crate) settings_syncer: Option<Arc<SettingsSyncer>>,
    pub(crate) profile_syncer: Option<Arc<ProfileSyncer>>,
    // 监听器需在 connect() 之前注册，连接后由同步器持有
    order_listener: Arc<dyn OrderListener>,
    product_listener: Arc<dyn ProductListener>,
    db: Option<Arc<sqlx::Pool<sqlx::Sqlite>>>,
}

impl AjaboClient {
    /// 创建新的客户端
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            writer: None,
            order_syncer: None,
            product_syncer: None,
            category_syncer: None,
            inventory_syncer: None,
            expense_syncer: None,
            staff_syncer: None,
            settings_syncer: None,
            profile_syncer: None,
            order_listener: Arc::new(EmptyOrderListener),
            product_listener: Arc::new(EmptyProductListener),
            db: None,
        }
    }

    /// 注册订单监听器（需在 connect() 之前调用）
    pub fn set_order_listener(&mut self, listener: Arc<dyn OrderListener>) {
        if self.order_syncer.is_some() {
            warn!("[Client] 连接后注册的订单监听器不会生效");
        }
        self.order_listener = listener;
    }

    /// 注册商品监听器（需在 connect() 之前调用）
    pub fn set_product_listener(&mut self, listener: Arc<dyn ProductListener>) {
        if self.product_syncer.is_some() {
            warn!("[Client] 连接后注册的商品监听器不会生效");
        }
        self.product_listener = listener;
    }

    /// 构建 WebSocket 连接 URL
    fn build_url(&self, operation_id: &str) -> String {
        let compression_param = if self.config.compression.is_empty() {
            String::new()
        } else {
            format!("&compression={}", self.config.compression)
        };

        format!(
            "{}/?token={}&sendID={}&platformID={}&operationID={}{}&sdkType={}",
            self.config.ws_url,
            self.config.token,
            self.config.user_id,
            self.config.platform_id,
            operation_id,
            compression_param,
            self.config.sdk_type
        )
    }

    /// 连接到服务器并在内部启动事件处理
    pub async fn connect(&mut self) -> Result<()> {
        let operation_id = format!("{}", chrono::Utc::now().timestamp_millis());
        let url = self.build_url(&operation_id);

        info!(
            "[Client] 🔗 连接到 Ajabo Server (user={}, platform={})",
            self.config.user_id, self.config.platform_id
        );

        let (ws_stream, response) = connect_async(&url).await?;
        info!(
            "[Client] ✅ WebSocket 连接成功, 状态: {}",
            response.status()
        );

        let (write, mut read) = ws_stream.split();
        let writer = Arc::new(Mutex::new(write));
        self.writer = Some(writer.clone());

        // 等待连接鉴权响应
        if let Some(Ok(WsMessage::Text(text))) = read.next().await {
            debug!("[Client] 📥 WebSocket 连接响应: {}", text);
            match serde_json::from_str::<WebSocketConnectResp>(&text) {
                Ok(resp) => {
                    if resp.err_code == 0 {
                        info!("[Client] ✅ 服务器连接鉴权成功");
                    } else {
                        let error_msg = if !resp.err_dlt.is_empty() {
                            format!("{} (详情: {})", resp.err_msg, resp.err_dlt)
                        } else {
                            resp.err_msg.clone()
                        };
                        error!(
                            "[Client] ❌ WebSocket 连接失败，错误码: {}, 错误信息: {}",
                            resp.err_code, error_msg
                        );
                        return Err(anyhow::anyhow!(
                            "WebSocket 连接失败，错误码: {}, 错误信息: {}",
                            resp.err_code,
                            error_msg
                        ));
                    }
                }
                Err(e) => {
                    error!(
                        "[Client] ❌ WebSocket 响应解析失败: {}, 原始响应: {}",
                        e, text
                    );
                    return Err(anyhow::anyhow!(
                        "WebSocket 响应解析失败: {}, 原始响应: {}",
                        e,
                        text
                    ));
                }
            }
        } else {
            error!("[Client] ❌ 未收到 WebSocket 连接响应");
            return Err(anyhow::anyhow!("未收到 WebSocket 连接响应"));
        }

        // 创建共享数据库连接并执行迁移
        info!("[Client] 🔗 创建共享数据库连接: {}", self.config.db_url);
        let db = Arc::new(
            crate::cafe::db::create_sqlite_pool_with_migration(&self.config.db_url)
                .await
                .context(format!("连接SQLite数据库失败: {}", self.config.db_url))?,
        );
        self.db = Some(db.clone());

        // 带认证拦截器的 HTTP 客户端（token 通过 default_headers 自动添加）
        let http_client = reqwest::ClientBuilder::new()
            .default_headers({
                let mut headers = reqwest::header::HeaderMap::new();
                headers.insert(
                    reqwest::header::HeaderName::from_static("token"),
                    reqwest::header::HeaderValue::from_str(&self.config.token)
                        .context("无效的 token")?,
                );
                headers
            })
            .build()
            .context("创建 HTTP 客户端失败")?;

        // 构建各资源同步器（共享连接池和 HTTP 客户端）
        let order_cfg = OrderSyncerConfig {
            user_id: self.config.user_id.clone(),
            api_base_url: self.config.api_base_url.clone(),
            token: self.config.token.clone(),
            db_path: self.config.db_url.clone(),
        };
        let order_syncer = Arc::new(
            OrderSyncer::with_listener_and_db(order_cfg, self.order_listener.clone(), db.clone())
                .await?,
        );
        self.order_syncer = Some(order_syncer.clone());

        let product_syncer = Arc::new(ProductSyncer::with_listener_and_db(
            http_client.clone(),
            self.config.api_base_url.clone(),
            self.product_listener.clone(),
            db.clone(),
        ));
        self.product_syncer = Some(product_syncer.clone());

        let category_syncer = Arc::new(CategorySyncer::with_db(
            http_client.clone(),
            self.config.api_base_url.clone(),
            db.clone(),
        ));
        self.category_syncer = Some(category_syncer.clone());

        let inventory_syncer = Arc::new(InventorySyncer::with_db(
            http_client.clone(),
            self.config.api_base_url.clone(),
            db.clone(),
        ));
        self.inventory_syncer = Some(inventory_syncer.clone());

        let expense_syncer = Arc::new(ExpenseSyncer::with_db(
            http_client.clone(),
            self.config.api_base_url.clone(),
            db.clone(),
        ));
        self.expense_syncer = Some(expense_syncer.clone());

        let staff_syncer = Arc::new(StaffSyncer::with_db(
            http_client.clone(),
            self.config.api_base_url.clone(),
            db.clone(),
        ));
        self.staff_syncer = Some(staff_syncer.clone());

        let settings_syncer = Arc::new(SettingsSyncer::with_db(
            http_client.clone(),
            self.config.api_base_url.clone(),
            db.clone(),
        ));
        self.settings_syncer = Some(settings_syncer.clone());

        let profile_syncer = Arc::new(ProfileSyncer::with_db(
            http_client,
            self.config.api_base_url.clone(),
            db.clone(),
        ));
        self.profile_syncer = Some(profile_syncer.clone());

        // 各表初始同步并行执行；单表失败不影响其余表
        tokio::spawn(async move {
            info!("[Client] 🔄 启动订单初始同步任务");
            match order_syncer.initial_sync().await {
                Ok(_) => info!("[Client] ✅ 订单同步完成"),
                Err(e) => error!("[Client] ❌ 订单同步失败: {e}"),
            }
        });
        tokio::spawn(async move {
            if let Err(e) = product_syncer.initial_sync().await {
                error!("[Client] ❌ 商品同步失败: {e}");
            }
        });
        tokio::spawn(async move {
            if let Err(e) = category_syncer.initial_sync().await {
                error!("[Client] ❌ 分类同步失败: {e}");
            }
        });
        tokio::spawn(async move {
            // 表未开通时内部降级为仅本地模式，不算失败
            if let Err(e) = inventory_syncer.initial_sync().await {
                error!("[Client] ❌ 库存同步失败: {e}");
            }
        });
        tokio::spawn(async move {
            if let Err(e) = expense_syncer.initial_sync().await {
                error!("[Client] ❌ 支出同步失败: {e}");
            }
        });
        tokio::spawn(async move {
            if let Err(e) = staff_syncer.sync_role("delivery").await {
                error!("[Client] ❌ 员工同步失败: {e}");
            }
        });
        tokio::spawn(async move {
            if let Err(e) = settings_syncer.initial_sync().await {
                error!("[Client] ❌ 设置同步失败: {e}");
            }
        });
        tokio::spawn(async move {
            if let Err(e) = profile_syncer.initial_sync().await {
                error!("[Client] ❌ 用户资料同步失败: {e}");
            }
        });

        // 启动心跳
        info!("[Client] 💓 启动心跳");
        let writer_for_heartbeat = writer.clone();
        tokio::spawn(async move {
            let mut ticker = interval(Duration::from_secs(25));
            loop {
                ticker.tick().await;
                let mut w = writer_for_heartbeat.lock().await;
                if w.send(WsMessage::Ping(vec![])).await.is_err() {
                    break;
                }
            }
        });

        // 在内部启动事件处理任务
        info!("[Client] 📥 开始监听服务器事件");
        let client = self.clone();
        tokio::spawn(async move {
            if let Err(e) = client.handle_messages(read).await {
                error!("事件处理错误: {}", e);
            }
        });

        Ok(())
    }

    /// 处理接收帧（事件循环）。单帧解析失败不会中断循环。
    async fn handle_messages(&self, mut read: WsReader) -> Result<()> {
        while let Some(msg_result) = read.next().await {
            match msg_result {
                Ok(WsMessage::Text(text)) => {
                    self.handle_event_payload(text.as_bytes()).await;
                }
                Ok(WsMessage::Binary(data)) => {
                    // gzip 魔数开头的帧先解压
                    let payload = if data.len() >= 2 && data[0] == 0x1f && data[1] == 0x8b {
                        match decompress_gzip(&data) {
                            Ok(d) => d,
                            Err(e) => {
                                error!("[Client] 解压失败: {}", e);
                                continue;
                            }
                        }
                    } else {
                        data
                    };
                    self.handle_event_payload(&payload).await;
                }
                Ok(WsMessage::Ping(_)) | Ok(WsMessage::Pong(_)) => {}
                Ok(WsMessage::Close(frame)) => {
                    warn!("[Client] 👋 连接关闭: {:?}", frame);
                    break;
                }
                Err(e) => {
                    error!("[Client] WebSocket 错误: {}", e);
                    break;
                }
                _ => {}
            }
        }
        Ok(())
    }

    async fn handle_event_payload(&self, payload: &[u8]) {
        let event = match serde_json::from_slice::<ChangeEvent>(payload) {
            Ok(ev) => ev,
            Err(e) => {
                error!(
                    "[Client] 变更事件解析失败: {}, 原始数据: {}",
                    e,
                    String::from_utf8_lossy(payload)
                );
                return;
            }
        };
        self.dispatch_event(&event).await;
    }

    /// 按表名把变更事件分发给对应同步器
    async fn dispatch_event(&self, event: &ChangeEvent) {
        debug!("[Client] 📥 变更事件: {} {:?}", event.table, event.kind);
        let result = match event.table.as_str() {
            table::ORDERS => match &self.order_syncer {
                Some(s) => s.apply_event(event).await,
                None => Ok(()),
            },
            table::PRODUCTS => match &self.product_syncer {
                Some(s) => s.apply_event(event).await,
                None => Ok(()),
            },
            table::CATEGORIES => match &self.category_syncer {
                Some(s) => s.apply_event(event).await,
                None => Ok(()),
            },
            table::INVENTORY => match &self.inventory_syncer {
                Some(s) => s.apply_event(event).await,
                None => Ok(()),
            },
            table::EXPENSES => match &self.expense_syncer {
                Some(s) => s.apply_event(event).await,
                None => Ok(()),
            },
            table::STAFF => match &self.staff_syncer {
                Some(s) => s.apply_event(event).await,
                None => Ok(()),
            },
            table::SETTINGS => match (&self.settings_syncer, &event.new) {
                (Some(s), Some(row)) => s.apply_settings_row(row).await,
                _ => Ok(()),
            },
            table::PROFILES => match &self.profile_syncer {
                Some(s) => s.apply_event(event).await,
                None => Ok(()),
            },
            other => {
                debug!("[Client] 未知表变更，跳过: {}", other);
                Ok(())
            }
        };
        if let Err(e) = result {
            error!("[Client] 应用 {} 变更事件失败: {}", event.table, e);
        }
    }

    // ===================== 订单相关便捷入口 =====================

    /// 获取本地全部订单
    pub async fn get_all_orders(&self) -> Result<Vec<LocalOrder>> {
        let syncer = self
            .order_syncer
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("订单同步器未初始化"))?;
        syncer.get_all_orders().await
    }

    /// 设置订单状态（经状态机校验）
    pub async fn set_order_status(&self, order_id: &str, to: OrderStatus) -> Result<()> {
        let syncer = self
            .order_syncer
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("订单同步器未初始化"))?;
        syncer.set_status(order_id, to).await
    }

    /// 更新订单
    pub async fn update_order(&self, order_id: &str, patch: OrderPatch) -> Result<()> {
        let syncer = self
            .order_syncer
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("订单同步器未初始化"))?;
        syncer.update_order(order_id, patch).await
    }
}

/// gzip 压缩
pub fn compress_gzip(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).context("gzip 压缩写入失败")?;
    encoder.finish().context("gzip 压缩失败")
}

/// gzip 解压
pub fn decompress_gzip(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = GzDecoder::new(data);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .context("gzip 解压失败")?;
    Ok(out)
}
