//! 用户旅程规则引擎
//!
//! 为店面前端的各个旅程节点（入口点）评估业务规则，决定：
//! - 向用户展示哪些消息
//! - 调用方需要执行哪些动作
//! - 是否阻断流程直到用户确认
//!
//! 评估路径（校验 → 匹配 → 分发）是纯同步函数，无 I/O、无共享可变状态；
//! 唯一的共享可变资源是规则注册表（按调用取快照）和注入的确认存储。

pub mod ack;
pub mod dispatcher;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod matcher;
pub mod models;
pub mod operators;
pub mod store;
pub mod validator;

pub use ack::{AckStore, AckStoreError, MemoryAckStore};
pub use dispatcher::ActionDispatcher;
pub use engine::RuleEngine;
pub use error::{EngineError, Result};
pub use evaluator::ConditionEvaluator;
pub use matcher::RuleMatcher;
pub use models::{
    AckOutcome, Acknowledgment, Action, ActionRecord, Condition, ConditionGroup, ConditionNode,
    EvaluationContext, ExecutionResult, Field, FieldError, Message, MessageLevel, Rule,
};
pub use operators::{Logic, Operator};
pub use store::{RuleStore, RuleStoreStats};
pub use validator::FieldValidator;

/// 已知入口点名称
///
/// 入口点对引擎是不透明字符串，这里只为两个约定名称提供常量，
/// 调用方可以注册任意新入口点。
pub mod entry_points {
    pub const HOME_PAGE_MOUNT: &str = "HOME_PAGE_MOUNT";
    pub const CHECKOUT_START: &str = "CHECKOUT_START";
}
