//! 日志初始化模块
//!
//! 基于 tracing-subscriber：EnvFilter 控制级别，
//! 输出格式在 JSON（结构化，供日志采集）和 pretty（本地开发）间切换。

use anyhow::Result;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

use super::ObservabilityConfig;

/// Tracing 资源守卫
///
/// 当前 fmt 输出不持有需要刷新的后端，守卫只作为生命周期标记，
/// 与 ObservabilityGuard 的结构保持一致。
pub struct TracingGuard {
    _private: (),
}

/// 初始化日志
///
/// 重复初始化（典型于测试进程）不报错，保留首次安装的 subscriber。
pub fn init(config: &ObservabilityConfig) -> Result<TracingGuard> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = if config.json_logs {
        fmt::layer()
            .json()
            .with_span_events(FmtSpan::CLOSE)
            .with_target(true)
            .with_thread_ids(true)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .boxed()
    };

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init();

    Ok(TracingGuard { _private: () })
}
