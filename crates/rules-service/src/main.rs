//! 店面旅程规则服务入口
//!
//! 装配顺序：配置 → 可观测性 → 规则注册表/确认存储/引擎 →
//! 规则来源初始加载 → 可选的文件热更新 → HTTP 服务。

use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use rules_engine::{MemoryAckStore, RuleEngine, RuleStore};
use storefront_rules_service::{AppState, FileRuleSource, RuleSource, RuleWatcher};
use storefront_shared::{config::AppConfig, observability, observability::metrics};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 统一加载配置：config/{service_name}.toml 叠加环境变量
    let config = AppConfig::load("rules-service").unwrap_or_default();

    // 从 AppConfig 中提取可观测性配置并注入服务名
    let obs_config = config
        .observability
        .clone()
        .with_service_name(&config.service_name);
    let _guard = observability::init(&obs_config).await?;

    info!("Starting rules-service on {}", config.server_addr());

    // 引擎装配：进程内注册表 + 进程内确认存储
    let store = RuleStore::new();
    let acks = Arc::new(MemoryAckStore::new());
    let engine = Arc::new(RuleEngine::new(store.clone(), acks));

    // 初始规则加载：来源不可用不阻止启动，注册表以空集运行，
    // 后续可通过管理接口 reload 或文件热更新补上
    let source: Arc<dyn RuleSource> = Arc::new(FileRuleSource::new(&config.rules.file));
    match source.load_rules().await {
        Ok(rules) => match store.replace_all(rules) {
            Ok(count) => {
                metrics::set_rule_registry_size(count as f64);
                info!(source = %source.describe(), count, "初始规则集已加载");
            }
            Err(e) => warn!(error = %e, "初始规则集校验失败，以空规则集启动"),
        },
        Err(e) => warn!(error = %e, "初始规则集读取失败，以空规则集启动"),
    }

    // 规则文件热更新（可选）。句柄留在 main 作用域内，
    // 被丢弃时监听循环自动退出
    let _rule_watcher = if config.rules.watch {
        let rule_watcher = RuleWatcher::new(
            &config.rules.file,
            Duration::from_millis(config.rules.watch_debounce_ms),
            source.clone(),
            store.clone(),
        );
        match rule_watcher.start() {
            Ok(()) => Some(rule_watcher),
            Err(e) => {
                warn!(error = %e, "规则文件监听启动失败，热更新不可用");
                None
            }
        }
    } else {
        None
    };

    // CORS 配置：通过 STOREFRONT_CORS_ORIGINS 环境变量控制允许的来源
    // 默认允许本地开发地址，生产环境应设置为实际域名
    let allowed_origins = std::env::var("STOREFRONT_CORS_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:3000,http://localhost:5173".to_string());

    let cors = if allowed_origins == "*" {
        if config.is_production() {
            warn!("STOREFRONT_CORS_ORIGINS=\"*\" 在生产环境中不安全，请设置为具体域名");
        }
        info!("CORS allowed_origins: * (all origins)");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        info!("CORS allowed_origins: {}", allowed_origins);
        let origins: Vec<_> = allowed_origins
            .split(',')
            .filter_map(|s| s.trim().parse::<HeaderValue>().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let state = AppState::new(engine, source, Arc::new(config.clone()));

    let app = storefront_rules_service::app(state)
        .layer(cors)
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_seconds,
        )));

    let listener = TcpListener::bind(config.server_addr()).await?;
    info!("Listening on {}", config.server_addr());

    // 优雅关闭：收到 SIGTERM（K8s 停止 Pod）或 Ctrl+C 时，
    // 停止接收新连接并等待已有请求处理完毕
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");

    Ok(())
}

/// 监听关闭信号
///
/// K8s 通过 SIGTERM 通知 Pod 停止；本地开发通过 Ctrl+C。
/// 收到任一信号后返回，触发 axum 的优雅关闭流程。
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("注册 Ctrl+C 处理器失败");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("注册 SIGTERM 处理器失败")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown..."),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown..."),
    }
}
