//! 规则注册表
//!
//! 读多写少：评估路径每次调用取一份完整快照，热更新通过整体换入
//! 新规则集完成，进行中的评估绝不会看到换到一半的规则集。
//! 写入走 RCU，规则集规模小、变更频率低，整表复制可以接受。

use crate::error::{EngineError, Result};
use crate::models::{ConditionNode, Rule};
use arc_swap::ArcSwap;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// 规则注册表
#[derive(Clone)]
pub struct RuleStore {
    rules: Arc<ArcSwap<HashMap<String, Rule>>>,
}

impl RuleStore {
    pub fn new() -> Self {
        Self {
            rules: Arc::new(ArcSwap::from_pointee(HashMap::new())),
        }
    }

    pub fn len(&self) -> usize {
        self.rules.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.load().is_empty()
    }

    /// 当前规则集快照，评估期间持有同一份视图
    pub fn snapshot(&self) -> Arc<HashMap<String, Rule>> {
        self.rules.load_full()
    }

    /// 注册或覆盖单条规则
    #[instrument(skip(self, rule), fields(rule_id = %rule.id, entry_point = %rule.entry_point))]
    pub fn load(&self, rule: Rule) -> Result<()> {
        Self::validate(&rule)?;
        Self::warn_on_suspect_values(&rule);

        let rule_id = rule.id.clone();
        self.rules.rcu(|current| {
            let mut next = (**current).clone();
            next.insert(rule_id.clone(), rule.clone());
            next
        });

        info!("规则已注册: {}", rule_id);
        Ok(())
    }

    /// 从 JSON 字符串注册单条规则
    #[instrument(skip(self, json))]
    pub fn load_from_json(&self, json: &str) -> Result<String> {
        let rule: Rule = serde_json::from_str(json)?;
        let rule_id = rule.id.clone();
        self.load(rule)?;
        Ok(rule_id)
    }

    /// 批量注册，逐条注册并汇总失败
    #[instrument(skip(self, rules))]
    pub fn load_batch(&self, rules: Vec<Rule>) -> Result<Vec<String>> {
        let mut loaded_ids = Vec::with_capacity(rules.len());
        let mut failed = 0usize;

        for rule in rules {
            let rule_id = rule.id.clone();
            match self.load(rule) {
                Ok(()) => loaded_ids.push(rule_id),
                Err(e) => {
                    failed += 1;
                    warn!(rule_id = %rule_id, error = %e, "规则注册失败，已跳过");
                }
            }
        }

        info!("批量注册完成: {} 成功, {} 失败", loaded_ids.len(), failed);
        Ok(loaded_ids)
    }

    /// 整体替换规则集
    ///
    /// 任何一条规则校验失败都不换入，保留当前规则集；
    /// 校验全部通过后一次性原子换入。
    #[instrument(skip(self, rules))]
    pub fn replace_all(&self, rules: Vec<Rule>) -> Result<usize> {
        for rule in &rules {
            Self::validate(rule)?;
            Self::warn_on_suspect_values(rule);
        }

        let mut next = HashMap::with_capacity(rules.len());
        for rule in rules {
            next.insert(rule.id.clone(), rule);
        }

        let count = next.len();
        let prev = self.rules.swap(Arc::new(next));
        info!("规则集已替换: {} -> {} 条", prev.len(), count);
        Ok(count)
    }

    /// 删除规则
    #[instrument(skip(self))]
    pub fn delete(&self, rule_id: &str) -> Result<()> {
        let prev = self.rules.rcu(|current| {
            let mut next = (**current).clone();
            next.remove(rule_id);
            next
        });

        if prev.contains_key(rule_id) {
            info!("规则已删除: {}", rule_id);
            Ok(())
        } else {
            warn!("删除不存在的规则: {}", rule_id);
            Err(EngineError::RuleNotFound(rule_id.to_string()))
        }
    }

    pub fn get(&self, rule_id: &str) -> Option<Rule> {
        self.rules.load().get(rule_id).cloned()
    }

    pub fn contains(&self, rule_id: &str) -> bool {
        self.rules.load().contains_key(rule_id)
    }

    pub fn list_ids(&self) -> Vec<String> {
        self.rules.load().keys().cloned().collect()
    }

    pub fn list_all(&self) -> Vec<Rule> {
        self.rules.load().values().cloned().collect()
    }

    /// 某入口点下的全部规则（含未激活，管理接口用）
    pub fn list_for_entry_point(&self, entry_point: &str) -> Vec<Rule> {
        self.rules
            .load()
            .values()
            .filter(|rule| rule.entry_point == entry_point)
            .cloned()
            .collect()
    }

    /// 清空所有规则
    #[instrument(skip(self))]
    pub fn clear(&self) {
        let prev = self.rules.swap(Arc::new(HashMap::new()));
        info!("已清空 {} 条规则", prev.len());
    }

    /// 注册表统计
    pub fn stats(&self) -> RuleStoreStats {
        let snapshot = self.rules.load();
        let mut entry_points: BTreeMap<String, usize> = BTreeMap::new();
        let mut active_rules = 0usize;

        for rule in snapshot.values() {
            *entry_points.entry(rule.entry_point.clone()).or_insert(0) += 1;
            if rule.active {
                active_rules += 1;
            }
        }

        RuleStoreStats {
            total_rules: snapshot.len(),
            active_rules,
            entry_points,
        }
    }

    /// 结构校验：id 和入口点必须非空
    fn validate(rule: &Rule) -> Result<()> {
        if rule.id.trim().is_empty() {
            return Err(EngineError::Validation("规则 id 不能为空".to_string()));
        }
        if rule.entry_point.trim().is_empty() {
            return Err(EngineError::Validation(format!(
                "规则 {} 的入口点不能为空",
                rule.id
            )));
        }
        Ok(())
    }

    /// 形状提示：操作符与条件值形状不符的规则照常接受，
    /// 运行时按不匹配处理，这里只在注册时提醒一次
    fn warn_on_suspect_values(rule: &Rule) {
        Self::walk_suspect_values(&rule.condition, &rule.id);
    }

    fn walk_suspect_values(node: &ConditionNode, rule_id: &str) {
        match node {
            ConditionNode::Condition(condition) => {
                if condition.operator.expects_array_value() && !condition.value.is_array() {
                    warn!(
                        rule_id,
                        field = %condition.field,
                        operator = %condition.operator,
                        "条件值不是数组，该条件在运行时永远不匹配"
                    );
                }
            }
            ConditionNode::Group(group) => {
                for child in &group.children {
                    Self::walk_suspect_values(child, rule_id);
                }
            }
        }
    }
}

impl Default for RuleStore {
    fn default() -> Self {
        Self::new()
    }
}

/// 注册表统计信息
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleStoreStats {
    pub total_rules: usize,
    pub active_rules: usize,
    /// 各入口点下的规则数
    pub entry_points: BTreeMap<String, usize>,
}
