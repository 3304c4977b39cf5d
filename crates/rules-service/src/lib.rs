//! 店面旅程规则服务（C端）
//!
//! 为店面前端提供旅程规则执行 REST API：
//! - `/api/rules/execute`、`/api/rules/acknowledge`：引擎操作，契约 JSON 形状
//! - `/api/admin/rules[...]`：规则管理接口，统一响应信封
//!
//! 引擎本身在 `rules_engine` crate，这里只做 HTTP 边界：
//! 请求校验、错误映射、规则来源装配和热更新。

pub mod dto;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod source;
pub mod state;
pub mod watcher;

pub use error::{Result, ServiceError};
pub use source::{FileRuleSource, RuleSource, SourceError};
pub use state::AppState;
pub use watcher::RuleWatcher;

use axum::{Json, Router, extract::State, middleware, routing::get};
use storefront_shared::observability::middleware as obs_middleware;

/// 构建完整应用 Router
///
/// main 和进程内端到端测试共用，外围的 CORS/超时层由 main 追加。
pub fn app(state: AppState) -> Router {
    Router::new()
        .nest("/api", routes::api_routes())
        .nest("/api/admin", routes::admin_routes())
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        // 可观测性中间件：请求追踪和指标收集
        .layer(middleware::from_fn(obs_middleware::http_tracing))
        .layer(middleware::from_fn(obs_middleware::request_id))
        .with_state(state)
}

/// 存活探针：服务进程正常即返回 ok
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "rules-service"
    }))
}

/// 就绪探针
///
/// 注册表是进程内存储，快照可取即就绪；附带规则数便于排查
/// 「服务起来了但规则没加载」这类问题。
async fn readiness_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "rules-service",
        "checks": {
            "rulesLoaded": state.store().len()
        }
    }))
}
