//! 规则服务 DTO 模块
//!
//! 引擎的两个对外操作返回裸契约结构（JSON 形状由外部契约固定）；
//! 管理接口使用统一响应信封。

pub mod request;
pub mod response;

pub use request::{AcknowledgeRuleRequest, ExecuteRulesRequest, ReplaceRulesRequest};
pub use response::{ApiResponse, ReloadedResponse, ReplacedResponse, UpsertedResponse};
