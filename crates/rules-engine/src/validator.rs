//! 必填字段校验器
//!
//! 在规则匹配之前运行。任何必填字段缺值都会让本次调用短路：
//! 不做匹配、强制 blocked，由调用方先补齐上下文。

use crate::models::{Field, FieldError};
use serde_json::Value;

/// 必填字段缺值时的错误文案，属于对外契约的一部分
pub const MISSING_REQUIRED_FIELD: &str = "Missing required field";

/// 字段校验器
pub struct FieldValidator;

impl FieldValidator {
    /// 校验上下文字段列表，错误按输入顺序返回
    ///
    /// 字段报错当且仅当 `required` 为 true 且值为 null（含线上省略）或空字符串。
    pub fn validate(fields: &[Field]) -> Vec<FieldError> {
        fields
            .iter()
            .filter(|field| field.required && Self::is_missing(&field.value))
            .map(|field| FieldError {
                field: field.key.clone(),
                error: MISSING_REQUIRED_FIELD.to_string(),
            })
            .collect()
    }

    fn is_missing(value: &Value) -> bool {
        match value {
            Value::Null => true,
            Value::String(s) => s.is_empty(),
            _ => false,
        }
    }
}
