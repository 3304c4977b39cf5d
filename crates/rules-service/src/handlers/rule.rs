//! 规则管理 API 处理器
//!
//! 规则注册表的 CRUD、整体替换、来源重载和统计。
//! 所有写操作完成后同步更新注册表规模指标。

use axum::{
    extract::{Path, State},
    Json,
};
use rules_engine::{Rule, RuleStoreStats};
use storefront_shared::observability::metrics;
use tracing::info;

use crate::{
    dto::{ApiResponse, ReloadedResponse, ReplaceRulesRequest, ReplacedResponse, UpsertedResponse},
    error::{Result, ServiceError},
    state::AppState,
};

/// 获取全部规则（含未激活）
///
/// GET /api/admin/rules
pub async fn list_rules(State(state): State<AppState>) -> Json<ApiResponse<Vec<Rule>>> {
    let mut rules = state.store().list_all();
    rules.sort_by(|a, b| a.id.cmp(&b.id));
    Json(ApiResponse::success(rules))
}

/// 获取单条规则
///
/// GET /api/admin/rules/{id}
pub async fn get_rule(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Rule>>> {
    let rule = state
        .store()
        .get(&id)
        .ok_or(ServiceError::RuleNotFound(id))?;
    Ok(Json(ApiResponse::success(rule)))
}

/// 注册或覆盖单条规则
///
/// POST /api/admin/rules
pub async fn upsert_rule(
    State(state): State<AppState>,
    Json(rule): Json<Rule>,
) -> Result<Json<ApiResponse<UpsertedResponse>>> {
    let rule_id = rule.id.clone();
    state.store().load(rule)?;
    metrics::set_rule_registry_size(state.store().len() as f64);

    info!(rule_id = %rule_id, "规则已注册");
    Ok(Json(ApiResponse::success(UpsertedResponse { rule_id })))
}

/// 整体替换规则集
///
/// PUT /api/admin/rules
/// 任何一条规则校验失败都不换入，当前规则集原样保留。
pub async fn replace_rules(
    State(state): State<AppState>,
    Json(req): Json<ReplaceRulesRequest>,
) -> Result<Json<ApiResponse<ReplacedResponse>>> {
    let count = state.store().replace_all(req.rules)?;
    metrics::set_rule_registry_size(count as f64);

    info!(count, "规则集已整体替换");
    Ok(Json(ApiResponse::success(ReplacedResponse { count })))
}

/// 删除规则
///
/// DELETE /api/admin/rules/{id}
pub async fn delete_rule(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>> {
    state.store().delete(&id)?;
    metrics::set_rule_registry_size(state.store().len() as f64);

    info!(rule_id = %id, "规则已删除");
    Ok(Json(ApiResponse::<()>::success_empty()))
}

/// 从规则来源重载规则集
///
/// POST /api/admin/rules/reload
/// 来源读取或解析失败时保留当前规则集并返回错误。
pub async fn reload_rules(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ReloadedResponse>>> {
    let rules = state
        .source
        .load_rules()
        .await
        .map_err(|e| ServiceError::RuleSource(e.to_string()))?;

    let count = state.store().replace_all(rules)?;
    metrics::set_rule_registry_size(count as f64);

    info!(source = %state.source.describe(), count, "规则集已从来源重载");
    Ok(Json(ApiResponse::success(ReloadedResponse {
        source: state.source.describe(),
        count,
    })))
}

/// 注册表统计
///
/// GET /api/admin/rules/stats
pub async fn stats(State(state): State<AppState>) -> Json<ApiResponse<RuleStoreStats>> {
    Json(ApiResponse::success(state.store().stats()))
}
