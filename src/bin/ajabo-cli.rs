//! Ajabo CLI 客户端（测试版）
//!
//! 非交互式 CLI，用于测试和展示后台同步功能
//! 启动时通过命令行参数指定员工账号，自动登录连接，展示接收到的变更事件

use ajabo_sdk_rust::cafe::client::{AjaboClient, ClientConfig};
use ajabo_sdk_rust::cafe::order::listener::OrderListener;
use ajabo_sdk_rust::cafe::product::listener::ProductListener;
use ajabo_sdk_rust::cafe::stats::export_csv;
use ajabo_sdk_rust::{login_async, StaffRole};
use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tokio::time::{sleep, Duration};
use tracing::{error, info};

/// Ajabo CLI 客户端
#[derive(Parser, Debug)]
#[command(name = "ajabo-cli")]
#[command(about = "Ajabo CLI 客户端 - 用于测试和展示后台同步功能", long_about = None)]
struct Args {
    /// 员工用户名
    #[arg(short, long, default_value = "admin")]
    username: String,

    /// 密码
    #[arg(short, long, default_value = "admin123")]
    password: String,

    /// 角色：admin 或 delivery
    #[arg(short, long, default_value = "admin")]
    role: String,

    /// 运行时长（秒），0 表示持续运行
    #[arg(short, long, default_value = "0")]
    duration: u64,

    /// 退出前把订单报表导出为 CSV 文件
    #[arg(long)]
    export_csv: Option<String>,

    /// 日志级别（默认: info,ajabo_sdk_rust=debug）
    #[arg(long, default_value = "info,ajabo_sdk_rust=debug")]
    log_level: String,
}

/// 初始化日志（同时输出到 stdout 和文件）
fn init_logger(log_level: &str) {
    use std::fs::OpenOptions;
    use std::io;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    // 优先使用环境变量 RUST_LOG（如果设置了），否则使用命令行参数
    let filter_layer =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")
        .expect("无法创建日志文件 debug.log");

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stdout)
        .with_file(true)
        .with_line_number(true)
        .with_target(false)
        .with_ansi(true);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(log_file)
        .with_file(true)
        .with_line_number(true)
        .with_target(false)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    info!("[CLI] 📝 日志已同时输出到控制台和文件: debug.log");
}

/// 设置监听器（输出所有接收到的事件）
fn setup_listeners(client: &mut AjaboClient) {
    struct CliOrderListener;
    #[async_trait::async_trait]
    impl OrderListener for CliOrderListener {
        async fn on_sync_start(&self) {
            info!("[CLI/Order] 🔄 订单同步开始");
        }

        async fn on_sync_finish(&self) {
            info!("[CLI/Order] ✅ 订单同步完成");
        }

        async fn on_sync_failed(&self, err: String) {
            error!("[CLI/Order] ❌ 订单同步失败: {}", err);
        }

        async fn on_new_order(&self, order_json: String) {
            // 原前端在这里播放提示音，CLI 只打印
            info!("[CLI/Order] 🔔 新订单: {}", order_json);
        }

        async fn on_order_changed(&self, order_json: String) {
            info!("[CLI/Order] 🔄 订单变更: {}", order_json);
        }

        async fn on_order_deleted(&self, order_id: String) {
            info!("[CLI/Order] 🗑️ 订单删除: {}", order_id);
        }
    }
    client.set_order_listener(Arc::new(CliOrderListener));

    struct CliProductListener;
    #[async_trait::async_trait]
    impl ProductListener for CliProductListener {
        async fn on_product_list_changed(&self, products_json: String) {
            info!("[CLI/Product] 🍔 商品列表变更: {}", products_json);
        }

        async fn on_sync_failed(&self, err: String) {
            error!("[CLI/Product] ❌ 商品同步失败: {}", err);
        }
    }
    client.set_product_listener(Arc::new(CliProductListener));
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logger(&args.log_level);

    info!("[CLI] 🚀 Ajabo CLI 客户端（测试模式）");
    info!("[CLI] 👤 用户名: {} ({})", args.username, args.role);
    info!("[CLI] ⏱️  运行时长: {} 秒（0=持续运行）", args.duration);

    // 登录
    info!("[CLI] 🔐 正在登录...");
    let role = StaffRole::parse(&args.role)?;
    let api_base_url = "http://localhost:10002";
    let platform = 5;

    let session = login_async(api_base_url, args.username.clone(), args.password.clone(), role)
        .await
        .map_err(|e| anyhow::anyhow!("登录失败: {}", e))?;

    info!("[CLI] ✅ 登录成功！用户ID: {}", session.user_id);

    // 创建客户端
    let config = ClientConfig::new(session.user_id.clone(), session.token.clone(), platform);
    let mut client = AjaboClient::new(config);

    // 设置监听器
    setup_listeners(&mut client);

    // 连接
    info!("[CLI] 🔗 正在连接服务器...");
    client
        .connect()
        .await
        .map_err(|e| anyhow::anyhow!("连接失败: {}", e))?;
    info!("[CLI] ✅ 连接成功！");

    // 等初始同步落库后展示一眼订单列表
    sleep(Duration::from_secs(2)).await;
    if let Ok(orders) = client.get_all_orders().await {
        info!("[CLI] 📋 订单列表（共 {} 条）:", orders.len());
        for order in orders.iter().take(5) {
            info!(
                "[CLI]   - #{} | {} x{} | {} so'm | {}",
                order.id.chars().take(8).collect::<String>(),
                order.product_name,
                order.quantity,
                order.total_price,
                order.status.as_str(),
            );
        }
    }

    info!("[CLI] 📥 开始监听变更事件...");
    if args.duration > 0 {
        info!("[CLI] ⏰ {} 秒后自动退出", args.duration);
        sleep(Duration::from_secs(args.duration)).await;
    } else {
        info!("[CLI] ⏰ 持续运行中，按 Ctrl+C 退出");
        loop {
            sleep(Duration::from_secs(3600)).await;
        }
    }

    // 退出前按需导出报表
    if let Some(path) = &args.export_csv {
        let orders = client.get_all_orders().await?;
        let csv = export_csv(&orders);
        std::fs::write(path, csv)?;
        info!("[CLI] 📄 报表已导出: {}（{} 条订单）", path, orders.len());
    }

    session.logout();
    info!("[CLI] 👋 程序退出");
    Ok(())
}
