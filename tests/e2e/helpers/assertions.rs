//! 响应断言辅助

use serde_json::Value;

/// 断言执行结果不阻断且无消息（未命中任何规则）
pub fn assert_empty_result(result: &Value) {
    assert_eq!(result["blocked"], Value::Bool(false), "不应阻断: {result}");
    assert_eq!(result["messages"].as_array().map(Vec::len), Some(0));
    assert_eq!(result["actions"].as_array().map(Vec::len), Some(0));
    assert_eq!(result["fieldErrors"].as_array().map(Vec::len), Some(0));
}

/// 断言管理接口的成功信封
pub fn assert_success_envelope(body: &Value) {
    assert_eq!(body["success"], Value::Bool(true), "期望成功信封: {body}");
    assert_eq!(body["code"], Value::String("SUCCESS".into()));
}

/// 断言管理接口的失败信封并返回错误码
pub fn assert_error_envelope(body: &Value) -> String {
    assert_eq!(body["success"], Value::Bool(false), "期望失败信封: {body}");
    assert!(body["data"].is_null());
    body["code"].as_str().unwrap_or_default().to_string()
}

/// 提取消息文本列表，按出现顺序
pub fn message_texts(result: &Value) -> Vec<String> {
    result["messages"]
        .as_array()
        .map(|msgs| {
            msgs.iter()
                .filter_map(|m| m["text"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

/// 提取指定类型的动作记录
pub fn actions_of_type<'a>(result: &'a Value, action_type: &str) -> Vec<&'a Value> {
    result["actions"]
        .as_array()
        .map(|actions| {
            actions
                .iter()
                .filter(|a| a["action"]["type"] == action_type)
                .collect()
        })
        .unwrap_or_default()
}
