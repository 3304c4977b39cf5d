//! 动作分发器
//!
//! 把命中规则携带的动作聚合成一次执行结果。动作按规则顺序逐条记录，
//! 跨规则不去重（两条规则完全可以出于不同原因提示同一段文案）。
//!
//! 阻断不变式：blocked 为 true 时 messages 或 fieldErrors 必非空。
//! 静默阻断属于引擎缺陷，因此阻断类动作总会落一条消息，
//! 载荷没给文案时使用缺省文案。

use crate::ack::AckStore;
use crate::models::{Action, ActionRecord, ExecutionResult, Message, MessageLevel, Rule};
use tracing::warn;

/// BLOCK 动作未携带 reason 时的缺省文案
pub const DEFAULT_BLOCK_MESSAGE: &str = "This step is currently unavailable.";

/// REQUIRE_ACK 动作未携带 prompt 时的缺省文案
pub const DEFAULT_ACK_PROMPT: &str = "Please review and confirm to continue.";

/// 动作分发器
pub struct ActionDispatcher;

impl ActionDispatcher {
    /// 聚合命中规则的动作
    ///
    /// * `BLOCK` 无条件置 blocked
    /// * `REQUIRE_ACK` 在当前主体未确认时置 blocked；无论是否确认都会
    ///   记入 actions 并标注 acknowledged，供界面展示满足状态
    /// * `REDIRECT`/`CUSTOM` 只转发，不影响 blocked
    pub fn dispatch(
        matched: &[&Rule],
        subject_id: Option<&str>,
        acks: &dyn AckStore,
    ) -> ExecutionResult {
        let mut result = ExecutionResult::empty();

        for rule in matched {
            for action in &rule.actions {
                match action {
                    Action::Message { payload } => {
                        result.messages.push(Message {
                            rule_id: rule.id.clone(),
                            text: payload.text.clone(),
                            level: payload.level,
                        });
                        result.actions.push(Self::record(rule, action, None));
                    }
                    Action::Block { payload } => {
                        result.blocked = true;
                        result.messages.push(Message {
                            rule_id: rule.id.clone(),
                            text: payload
                                .reason
                                .clone()
                                .unwrap_or_else(|| DEFAULT_BLOCK_MESSAGE.to_string()),
                            level: MessageLevel::Error,
                        });
                        result.actions.push(Self::record(rule, action, None));
                    }
                    Action::RequireAck { payload } => {
                        let acknowledged = Self::is_acknowledged(subject_id, &rule.id, acks);
                        if !acknowledged {
                            result.blocked = true;
                            result.messages.push(Message {
                                rule_id: rule.id.clone(),
                                text: payload
                                    .prompt
                                    .clone()
                                    .unwrap_or_else(|| DEFAULT_ACK_PROMPT.to_string()),
                                level: MessageLevel::Warning,
                            });
                        }
                        result
                            .actions
                            .push(Self::record(rule, action, Some(acknowledged)));
                    }
                    Action::Redirect { .. } | Action::Custom { .. } => {
                        result.actions.push(Self::record(rule, action, None));
                    }
                }
            }
        }

        result
    }

    fn record(rule: &Rule, action: &Action, acknowledged: Option<bool>) -> ActionRecord {
        ActionRecord {
            rule_id: rule.id.clone(),
            action: action.clone(),
            acknowledged,
        }
    }

    /// 查询主体是否已确认规则
    ///
    /// 匿名主体不可能已确认；存储查询失败按未确认处理（保守失败），
    /// 只记日志不中断本次评估。
    fn is_acknowledged(subject_id: Option<&str>, rule_id: &str, acks: &dyn AckStore) -> bool {
        let Some(subject_id) = subject_id else {
            return false;
        };

        match acks.has(subject_id, rule_id) {
            Ok(acknowledged) => acknowledged,
            Err(e) => {
                warn!(subject_id, rule_id, error = %e, "确认查询失败，按未确认处理");
                false
            }
        }
    }
}
