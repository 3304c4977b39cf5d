//! HTTP 请求处理器
//!
//! - `engine`: 引擎的两个对外操作（executeRules / acknowledgeRule）
//! - `rule`: 规则注册表的管理接口

pub mod engine;
pub mod rule;
