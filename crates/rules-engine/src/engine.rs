//! 引擎门面
//!
//! 对外的唯一入口：`execute_rules` 与 `acknowledge_rule`。
//! 一次 execute_rules 是单趟确定性流程：
//! 校验 → (有字段错误则短路) → 匹配 → 分发 → 返回结果。
//! 引擎内部不做重试，重试策略属于调用方。

use crate::ack::AckStore;
use crate::dispatcher::ActionDispatcher;
use crate::matcher::RuleMatcher;
use crate::models::{AckOutcome, EvaluationContext, ExecutionResult, Field};
use crate::store::RuleStore;
use crate::validator::FieldValidator;
use std::sync::Arc;
use std::time::Instant;
use storefront_shared::observability::metrics;
use tracing::{debug, instrument, warn};

/// 规则引擎门面
///
/// 持有规则注册表和注入的确认存储。评估路径纯同步无 I/O，
/// 可被任意多个调用方并发调用，每次调用构造全新结果。
#[derive(Clone)]
pub struct RuleEngine {
    store: RuleStore,
    acks: Arc<dyn AckStore>,
}

impl RuleEngine {
    pub fn new(store: RuleStore, acks: Arc<dyn AckStore>) -> Self {
        Self { store, acks }
    }

    /// 规则注册表，供服务层的管理接口直接操作
    pub fn store(&self) -> &RuleStore {
        &self.store
    }

    /// 执行入口点下的全部规则
    ///
    /// 必填字段缺失时短路：不做任何匹配，blocked 强制为 true，
    /// fieldErrors 填充缺失项。评估期间持有注册表的同一份快照，
    /// 并发热更新不会让本次调用看到换到一半的规则集。
    #[instrument(skip(self, fields), fields(context_size = fields.len()))]
    pub fn execute_rules(&self, entry_point: &str, fields: &[Field]) -> ExecutionResult {
        let start = Instant::now();

        let field_errors = FieldValidator::validate(fields);
        if !field_errors.is_empty() {
            debug!(
                entry_point,
                missing = field_errors.len(),
                "必填字段缺失，本次调用短路阻断"
            );
            metrics::record_rule_execution(entry_point, 0, true, start.elapsed().as_secs_f64());
            return ExecutionResult::blocked_by_validation(field_errors);
        }

        let ctx = EvaluationContext::from_fields(fields);
        let snapshot = self.store.snapshot();
        let matched = RuleMatcher::select(entry_point, snapshot.values(), &ctx);

        let result = ActionDispatcher::dispatch(&matched, ctx.subject_id(), self.acks.as_ref());

        debug!(
            entry_point,
            matched = matched.len(),
            blocked = result.blocked,
            messages = result.messages.len(),
            "规则执行完成"
        );
        metrics::record_rule_execution(
            entry_point,
            matched.len(),
            result.blocked,
            start.elapsed().as_secs_f64(),
        );

        result
    }

    /// 记录主体对规则的确认
    ///
    /// 确认与规则集的生命周期解耦：规则集会独立热更新，
    /// 因此未注册的规则 id 也照常记录，只留一条告警。
    /// 存储失败返回 `success: false` 而不是抛错，调用方可以直接重试。
    #[instrument(skip(self))]
    pub fn acknowledge_rule(&self, subject_id: &str, rule_id: &str) -> AckOutcome {
        if !self.store.contains(rule_id) {
            warn!(rule_id, "确认的规则当前未注册，仍记录确认");
        }

        match self.acks.record(subject_id, rule_id) {
            Ok(_) => {
                debug!(subject_id, rule_id, "规则确认成功");
                metrics::record_acknowledgment(true);
                AckOutcome { success: true }
            }
            Err(e) => {
                warn!(subject_id, rule_id, error = %e, "确认存储写入失败");
                metrics::record_acknowledgment(false);
                AckOutcome { success: false }
            }
        }
    }
}
