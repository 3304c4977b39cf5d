//! 规则匹配器
//!
//! 从给定规则集中选出某入口点下命中的规则。入口点是大小写敏感的
//! 不透明字符串，未注册的入口点不是错误，只是空命中。

use crate::evaluator::ConditionEvaluator;
use crate::models::{EvaluationContext, Rule};
use tracing::debug;

/// 规则匹配器
pub struct RuleMatcher;

impl RuleMatcher {
    /// 选出入口点下的命中规则
    ///
    /// 过滤 `active` 且入口点一致的规则，逐条评估条件树，
    /// 再按 (priority 升序, id 升序) 排序。不改动输入规则集。
    pub fn select<'a, I>(entry_point: &str, rules: I, ctx: &EvaluationContext) -> Vec<&'a Rule>
    where
        I: IntoIterator<Item = &'a Rule>,
    {
        let mut matched: Vec<&Rule> = Vec::new();

        for rule in rules {
            if !rule.active || rule.entry_point != entry_point {
                continue;
            }
            if ConditionEvaluator::evaluate(&rule.condition, ctx) {
                debug!(rule_id = %rule.id, entry_point, "规则命中");
                matched.push(rule);
            }
        }

        matched.sort_by(|a, b| {
            a.priority
                .cmp(&b.priority)
                .then_with(|| a.id.cmp(&b.id))
        });
        matched
    }
}
