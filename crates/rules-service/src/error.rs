//! 规则服务错误类型定义
//!
//! 引擎的评估路径本身不报错，这里的错误全部来自服务边界：
//! 请求校验、规则管理接口和规则来源。

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rules_engine::EngineError;
use serde_json::json;

/// 规则服务错误类型
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    // 请求校验
    #[error("参数验证失败: {0}")]
    Validation(String),
    #[error("规则 JSON 格式无效: {0}")]
    InvalidRuleJson(String),

    // 资源不存在
    #[error("规则不存在: {0}")]
    RuleNotFound(String),

    // 系统错误
    #[error("规则来源读取失败: {0}")]
    RuleSource(String),
    #[error("确认存储错误: {0}")]
    AckStore(String),
    #[error("内部错误: {0}")]
    Internal(String),
}

impl ServiceError {
    /// 返回对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::InvalidRuleJson(_) => StatusCode::BAD_REQUEST,
            Self::RuleNotFound(_) => StatusCode::NOT_FOUND,
            Self::RuleSource(_) | Self::AckStore(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// 返回错误码（API 契约的一部分，客户端按它做条件分支）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidRuleJson(_) => "INVALID_RULE_JSON",
            Self::RuleNotFound(_) => "RULE_NOT_FOUND",
            Self::RuleSource(_) => "RULE_SOURCE_ERROR",
            Self::AckStore(_) => "ACK_STORE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // 系统级错误只返回通用提示，详细信息仅记录日志，防止信息泄露
        let message = match &self {
            Self::RuleSource(e) => {
                tracing::error!(error = %e, "规则来源读取失败");
                "服务内部错误，请稍后重试".to_string()
            }
            Self::AckStore(e) => {
                tracing::error!(error = %e, "确认存储操作失败");
                "服务内部错误，请稍后重试".to_string()
            }
            Self::Internal(e) => {
                tracing::error!(error = %e, "内部错误");
                "服务内部错误，请稍后重试".to_string()
            }
            other => other.to_string(),
        };

        let body = json!({
            "success": false,
            "code": self.error_code(),
            "message": message,
            "data": serde_json::Value::Null
        });

        (status, axum::Json(body)).into_response()
    }
}

/// 从 validator 错误转换
impl From<validator::ValidationErrors> for ServiceError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

/// 从 JSON 序列化错误转换
impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidRuleJson(err.to_string())
    }
}

/// 从引擎错误转换
impl From<EngineError> for ServiceError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Parse(msg) => Self::InvalidRuleJson(msg),
            EngineError::Json(e) => Self::InvalidRuleJson(e.to_string()),
            EngineError::Validation(msg) => Self::Validation(msg),
            EngineError::RuleNotFound(id) => Self::RuleNotFound(id),
            EngineError::AckStore(msg) => Self::AckStore(msg),
        }
    }
}

/// 服务层 Result 类型别名
pub type Result<T> = std::result::Result<T, ServiceError>;
