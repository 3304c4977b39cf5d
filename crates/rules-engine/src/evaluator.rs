//! 条件评估器
//!
//! 对扁平上下文求值单个条件或整棵条件树。评估是纯函数：
//! 不产生副作用、不做 I/O、也从不报错，字段缺失和类型不符
//! 一律按"不匹配"处理（保守失败），保证一条畸形规则不会拖垮整次评估。

use crate::models::{Condition, ConditionGroup, ConditionNode, EvaluationContext};
use crate::operators::{Logic, Operator};
use serde_json::Value;
use tracing::debug;

/// 条件评估器
pub struct ConditionEvaluator;

impl ConditionEvaluator {
    /// 评估条件树节点
    pub fn evaluate(node: &ConditionNode, ctx: &EvaluationContext) -> bool {
        match node {
            ConditionNode::Condition(condition) => Self::evaluate_condition(condition, ctx),
            ConditionNode::Group(group) => Self::evaluate_group(group, ctx),
        }
    }

    /// 评估叶子条件
    pub fn evaluate_condition(condition: &Condition, ctx: &EvaluationContext) -> bool {
        Self::evaluate_leaf(ctx.get(&condition.field), condition.operator, &condition.value)
    }

    /// 评估逻辑组
    ///
    /// AND 在第一个 false 子节点短路，OR 在第一个 true 子节点短路；
    /// 空 children 时 AND 为 true、OR 为 false。
    pub fn evaluate_group(group: &ConditionGroup, ctx: &EvaluationContext) -> bool {
        match group.logic {
            Logic::And => group.children.iter().all(|child| Self::evaluate(child, ctx)),
            Logic::Or => group.children.iter().any(|child| Self::evaluate(child, ctx)),
        }
    }

    /// 评估单个操作符
    ///
    /// # Arguments
    /// * `field_value` - 从上下文取出的字段值，None 表示字段缺失
    /// * `operator` - 操作符
    /// * `expected` - 规则中定义的条件值
    pub fn evaluate_leaf(field_value: Option<&Value>, operator: Operator, expected: &Value) -> bool {
        // 存在性检查的语义就是看字段在不在，先于缺失短路处理
        if operator == Operator::Exists {
            return field_value.is_some_and(|v| !v.is_null());
        }

        // in/notIn 的条件值必须是数组，畸形条件一律不匹配
        if operator.expects_array_value() && !expected.is_array() {
            debug!(
                operator = %operator,
                value_type = Self::type_name(expected),
                "条件值不是数组，按不匹配处理"
            );
            return false;
        }

        let field_value = match field_value {
            Some(v) => v,
            // 字段缺失：notIn 按自身语义成立（缺失值不属于任何列表），
            // 其余操作符一律不匹配
            None => return operator == Operator::NotIn,
        };

        match operator {
            Operator::Eq => Self::eq(field_value, expected),
            Operator::Neq => !Self::eq(field_value, expected),
            Operator::Gt => Self::compare(field_value, expected, |a, b| a > b),
            Operator::Gte => Self::compare(field_value, expected, |a, b| a >= b),
            Operator::Lt => Self::compare(field_value, expected, |a, b| a < b),
            Operator::Lte => Self::compare(field_value, expected, |a, b| a <= b),
            Operator::Contains => Self::contains(field_value, expected),
            Operator::In => Self::in_list(field_value, expected),
            Operator::NotIn => !Self::in_list(field_value, expected),
            Operator::Exists => unreachable!("exists 已在前面处理"),
        }
    }

    /// 严格相等比较
    ///
    /// 整数与浮点按数值统一（100 == 100.0），但绝不做跨类型转换：
    /// 字符串 "1" 与数字 1 不相等。
    fn eq(field: &Value, expected: &Value) -> bool {
        if let (Value::Number(a), Value::Number(b)) = (field, expected) {
            if let (Some(a), Some(b)) = (a.as_f64(), b.as_f64()) {
                return (a - b).abs() < f64::EPSILON;
            }
        }
        field == expected
    }

    /// 数值比较
    ///
    /// 两侧都转为数字后比较，任一侧转不成数字按不匹配处理。
    fn compare<F>(field: &Value, expected: &Value, cmp: F) -> bool
    where
        F: Fn(f64, f64) -> bool,
    {
        match (Self::as_f64(field), Self::as_f64(expected)) {
            (Some(a), Some(b)) => cmp(a, b),
            _ => {
                debug!(
                    field_type = Self::type_name(field),
                    value_type = Self::type_name(expected),
                    "数值比较操作数无法转为数字，按不匹配处理"
                );
                false
            }
        }
    }

    /// 字符串包含检查
    ///
    /// 两侧都转为字符串做子串匹配，非标量一侧按不匹配处理。
    fn contains(field: &Value, expected: &Value) -> bool {
        match (Self::as_coerced_string(field), Self::as_coerced_string(expected)) {
            (Some(haystack), Some(needle)) => haystack.contains(&needle),
            _ => {
                debug!(
                    field_type = Self::type_name(field),
                    value_type = Self::type_name(expected),
                    "contains 操作数不是标量，按不匹配处理"
                );
                false
            }
        }
    }

    /// 列表成员检查，逐元素按严格相等比较
    fn in_list(field: &Value, expected: &Value) -> bool {
        expected
            .as_array()
            .map(|arr| arr.iter().any(|item| Self::eq(field, item)))
            .unwrap_or(false)
    }

    /// 数值转换：JSON 数字和数字形式的字符串
    fn as_f64(value: &Value) -> Option<f64> {
        match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// 字符串转换：仅标量可转
    fn as_coerced_string(value: &Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// 获取值的类型名称，用于日志
    fn type_name(value: &Value) -> &'static str {
        match value {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }
}
