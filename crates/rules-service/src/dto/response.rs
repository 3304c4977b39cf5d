//! 响应 DTO 定义
//!
//! 管理接口的统一响应信封和结果结构。

use serde::Serialize;

/// API 统一响应
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// 创建成功响应
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            code: "SUCCESS".to_string(),
            message: "操作成功".to_string(),
            data: Some(data),
        }
    }

    /// 创建成功响应（自定义消息）
    pub fn success_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            code: "SUCCESS".to_string(),
            message: message.into(),
            data: Some(data),
        }
    }

    /// 创建成功响应（无数据）
    pub fn success_empty() -> ApiResponse<()> {
        ApiResponse {
            success: true,
            code: "SUCCESS".to_string(),
            message: "操作成功".to_string(),
            data: None,
        }
    }
}

/// 单条规则注册结果
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertedResponse {
    pub rule_id: String,
}

/// 规则集整体替换结果
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplacedResponse {
    pub count: usize,
}

/// 从规则来源重载的结果
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReloadedResponse {
    pub source: String,
    pub count: usize,
}
