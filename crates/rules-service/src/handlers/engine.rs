//! 引擎操作处理器
//!
//! 两个端点的 JSON 形状由外部契约固定，直接返回引擎的裸结构，
//! 不套管理接口的响应信封。阻断是领域结果而不是传输错误，
//! blocked 为 true 时仍返回 HTTP 200。

use axum::{extract::State, Json};
use rules_engine::{AckOutcome, ExecutionResult};
use tracing::info;
use validator::Validate;

use crate::{
    dto::{AcknowledgeRuleRequest, ExecuteRulesRequest},
    error::ServiceError,
    state::AppState,
};

/// 执行入口点规则
///
/// POST /api/rules/execute
pub async fn execute_rules(
    State(state): State<AppState>,
    Json(req): Json<ExecuteRulesRequest>,
) -> Result<Json<ExecutionResult>, ServiceError> {
    req.validate()?;

    let result = state.engine.execute_rules(&req.entry_point, &req.context);

    info!(
        entry_point = %req.entry_point,
        blocked = result.blocked,
        messages = result.messages.len(),
        field_errors = result.field_errors.len(),
        "executeRules 完成"
    );
    Ok(Json(result))
}

/// 记录主体对规则的确认
///
/// POST /api/rules/acknowledge
/// 存储失败返回 `{ "success": false }`（HTTP 200），调用方可直接重试。
pub async fn acknowledge_rule(
    State(state): State<AppState>,
    Json(req): Json<AcknowledgeRuleRequest>,
) -> Result<Json<AckOutcome>, ServiceError> {
    req.validate()?;

    let outcome = state.engine.acknowledge_rule(&req.subject_id, &req.rule_id);

    info!(
        subject_id = %req.subject_id,
        rule_id = %req.rule_id,
        success = outcome.success,
        "acknowledgeRule 完成"
    );
    Ok(Json(outcome))
}
