//! 规则引擎错误类型
//!
//! 评估路径本身不产生错误（缺字段、类型不符一律按不匹配处理），
//! 错误只出现在注册表边界（解析/校验）与确认存储。

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("规则解析失败: {0}")]
    Parse(String),

    #[error("规则校验失败: {0}")]
    Validation(String),

    #[error("规则未找到: {0}")]
    RuleNotFound(String),

    #[error("确认存储不可用: {0}")]
    AckStore(String),

    #[error("JSON 序列化错误: {0}")]
    Json(#[from] serde_json::Error),
}

impl EngineError {
    /// 稳定的错误码，供服务层映射响应和打点使用
    pub fn code(&self) -> &'static str {
        match self {
            Self::Parse(_) => "RULE_PARSE_ERROR",
            Self::Validation(_) => "RULE_VALIDATION_ERROR",
            Self::RuleNotFound(_) => "RULE_NOT_FOUND",
            Self::AckStore(_) => "ACK_STORE_ERROR",
            Self::Json(_) => "JSON_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
