//! 规则引擎领域模型
//!
//! 线上格式统一为 camelCase，与店面前端的请求/响应结构保持一致。

use crate::operators::{Logic, Operator};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

/// 规则定义
///
/// 一条规则归属唯一入口点，持有一棵条件树和零或多个动作。
/// `active = false` 的规则永远不参与匹配。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub id: String,
    /// 展示用名称，不参与任何匹配逻辑
    #[serde(default)]
    pub name: String,
    pub entry_point: String,
    #[serde(default = "default_active")]
    pub active: bool,
    /// 数值越小越先应用，相同时按 id 升序
    #[serde(default)]
    pub priority: i32,
    pub condition: ConditionNode,
    #[serde(default)]
    pub actions: Vec<Action>,
}

fn default_active() -> bool {
    true
}

impl Rule {
    pub fn new(entry_point: impl Into<String>, condition: ConditionNode) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: String::new(),
            entry_point: entry_point.into(),
            active: true,
            priority: 0,
            condition,
            actions: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_actions(mut self, actions: Vec<Action>) -> Self {
        self.actions = actions;
        self
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }
}

/// 条件树节点（叶子条件或逻辑组）
///
/// 线上格式没有显式 type 标签：带 `logic`/`children` 的对象是逻辑组，
/// 带 `field`/`operator` 的对象是叶子条件，因此用 untagged 解析，
/// Group 在前保证歧义对象优先按组解析。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionNode {
    Group(ConditionGroup),
    Condition(Condition),
}

/// 叶子条件
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Condition {
    pub field: String,
    pub operator: Operator,
    #[serde(default)]
    pub value: Value,
}

impl Condition {
    pub fn new(field: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }
}

/// 逻辑组节点
///
/// 空 children 有显式取值策略：AND 为 true，OR 为 false。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConditionGroup {
    pub logic: Logic,
    pub children: Vec<ConditionNode>,
}

impl ConditionGroup {
    pub fn new(logic: Logic, children: Vec<ConditionNode>) -> Self {
        Self { logic, children }
    }

    pub fn and(children: Vec<ConditionNode>) -> Self {
        Self::new(Logic::And, children)
    }

    pub fn or(children: Vec<ConditionNode>) -> Self {
        Self::new(Logic::Or, children)
    }
}

/// 规则动作
///
/// 线上格式 `{"type": "...", "payload": {...}}`，type 为大写蛇形标签。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    /// 向用户展示一条消息，不影响流程
    Message { payload: MessagePayload },
    /// 无条件阻断流程
    Block {
        #[serde(default)]
        payload: BlockPayload,
    },
    /// 要求用户确认后才放行，所属规则 id 由外层规则隐式携带
    RequireAck {
        #[serde(default)]
        payload: AckPayload,
    },
    /// 指示调用方跳转，不影响阻断状态
    Redirect { payload: RedirectPayload },
    /// 调用方自定义动作，引擎原样转发
    Custom { payload: CustomPayload },
}

impl Action {
    pub fn message(text: impl Into<String>) -> Self {
        Self::Message {
            payload: MessagePayload {
                text: text.into(),
                level: MessageLevel::Info,
            },
        }
    }

    pub fn message_with_level(text: impl Into<String>, level: MessageLevel) -> Self {
        Self::Message {
            payload: MessagePayload {
                text: text.into(),
                level,
            },
        }
    }

    pub fn block() -> Self {
        Self::Block {
            payload: BlockPayload::default(),
        }
    }

    pub fn block_with_reason(reason: impl Into<String>) -> Self {
        Self::Block {
            payload: BlockPayload {
                reason: Some(reason.into()),
            },
        }
    }

    pub fn require_ack() -> Self {
        Self::RequireAck {
            payload: AckPayload::default(),
        }
    }

    pub fn require_ack_with_prompt(prompt: impl Into<String>) -> Self {
        Self::RequireAck {
            payload: AckPayload {
                prompt: Some(prompt.into()),
            },
        }
    }

    pub fn redirect(url: impl Into<String>) -> Self {
        Self::Redirect {
            payload: RedirectPayload { url: url.into() },
        }
    }

    pub fn custom(name: impl Into<String>, data: impl Into<Value>) -> Self {
        Self::Custom {
            payload: CustomPayload {
                name: name.into(),
                data: data.into(),
            },
        }
    }
}

/// 消息级别
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    #[default]
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessagePayload {
    pub text: String,
    #[serde(default)]
    pub level: MessageLevel,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockPayload {
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AckPayload {
    #[serde(default)]
    pub prompt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedirectPayload {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomPayload {
    pub name: String,
    #[serde(default)]
    pub data: Value,
}

/// 调用方提交的上下文字段
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub key: String,
    /// 线上可省略，省略时按 null 处理
    #[serde(default)]
    pub value: Value,
    #[serde(default)]
    pub required: bool,
}

impl Field {
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            required: false,
        }
    }

    pub fn required(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            required: true,
        }
    }
}

/// 必填字段缺失时的结构化错误
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub error: String,
}

/// 评估上下文 - 由上下文字段归约出的扁平键值映射
///
/// 评估身份只认 `key`，不做展示标签回退；重复 key 后者覆盖前者。
#[derive(Debug, Clone, Default)]
pub struct EvaluationContext {
    data: HashMap<String, Value>,
}

impl EvaluationContext {
    /// 预留的主体身份键，REQUIRE_ACK 的确认查询按它定位主体
    pub const SUBJECT_KEY: &'static str = "subjectId";

    pub fn new() -> Self {
        Self::default()
    }

    /// 从上下文字段列表归约
    pub fn from_fields(fields: &[Field]) -> Self {
        let mut data = HashMap::with_capacity(fields.len());
        for field in fields {
            data.insert(field.key.clone(), field.value.clone());
        }
        Self { data }
    }

    /// 从 JSON 对象的顶层键值构建，非对象输入产生空上下文
    pub fn from_object(value: Value) -> Self {
        match value {
            Value::Object(map) => Self {
                data: map.into_iter().collect(),
            },
            _ => Self::default(),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.data.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn has(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// 当前主体身份；键缺失或非字符串时视为匿名
    pub fn subject_id(&self) -> Option<&str> {
        self.data.get(Self::SUBJECT_KEY).and_then(Value::as_str)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// 消息条目，rule_id 指向产生它的规则
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub rule_id: String,
    pub text: String,
    pub level: MessageLevel,
}

/// 动作记录，每个匹配的规则-动作对一条，跨规则不去重
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRecord {
    pub rule_id: String,
    pub action: Action,
    /// 仅 REQUIRE_ACK 记录携带：当前主体是否已确认
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acknowledged: Option<bool>,
}

/// 一次 executeRules 调用的完整结果，返回后不再变更
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    pub messages: Vec<Message>,
    pub actions: Vec<ActionRecord>,
    pub blocked: bool,
    pub field_errors: Vec<FieldError>,
}

impl ExecutionResult {
    /// 未命中任何规则时的空结果
    pub fn empty() -> Self {
        Self::default()
    }

    /// 必填字段校验失败时的短路结果：不进行任何匹配
    pub fn blocked_by_validation(field_errors: Vec<FieldError>) -> Self {
        Self {
            blocked: true,
            field_errors,
            ..Self::default()
        }
    }
}

/// 确认记录
///
/// 由确认存储独占持有，创建后不再变更。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Acknowledgment {
    pub subject_id: String,
    pub rule_id: String,
    pub acknowledged_at: DateTime<Utc>,
}

impl Acknowledgment {
    pub fn new(subject_id: impl Into<String>, rule_id: impl Into<String>) -> Self {
        Self {
            subject_id: subject_id.into(),
            rule_id: rule_id.into(),
            acknowledged_at: Utc::now(),
        }
    }
}

/// acknowledgeRule 的返回：存储失败时 success 为 false，而不是抛错
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AckOutcome {
    pub success: bool,
}
