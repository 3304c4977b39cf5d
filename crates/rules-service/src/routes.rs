//! 路由配置模块
//!
//! 定义引擎执行端点和管理端点的路由映射

use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::{handlers, state::AppState};

/// 构建引擎执行路由（前端店面调用，契约 JSON 形状）
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/rules/execute", post(handlers::engine::execute_rules))
        .route("/rules/acknowledge", post(handlers::engine::acknowledge_rule))
}

/// 构建规则管理路由
///
/// 包含规则 CRUD、整体替换、来源重载和统计
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/rules", get(handlers::rule::list_rules))
        .route("/rules", post(handlers::rule::upsert_rule))
        .route("/rules", put(handlers::rule::replace_rules))
        .route("/rules/reload", post(handlers::rule::reload_rules))
        .route("/rules/stats", get(handlers::rule::stats))
        .route("/rules/{id}", get(handlers::rule::get_rule))
        .route("/rules/{id}", delete(handlers::rule::delete_rule))
}
