//! 请求 DTO 定义

use rules_engine::{Field, Rule};
use serde::Deserialize;
use validator::Validate;

/// executeRules 请求
///
/// 线上格式：`{ "entryPoint": "CHECKOUT_START", "context": [ ... ] }`
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteRulesRequest {
    #[validate(length(min = 1, message = "entryPoint 不能为空"))]
    pub entry_point: String,

    /// 上下文字段列表，可为空
    #[serde(default)]
    pub context: Vec<Field>,
}

/// acknowledgeRule 请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AcknowledgeRuleRequest {
    #[validate(length(min = 1, message = "subjectId 不能为空"))]
    pub subject_id: String,

    #[validate(length(min = 1, message = "ruleId 不能为空"))]
    pub rule_id: String,
}

/// 整体替换规则集请求（管理接口）
#[derive(Debug, Deserialize)]
pub struct ReplaceRulesRequest {
    pub rules: Vec<Rule>,
}
