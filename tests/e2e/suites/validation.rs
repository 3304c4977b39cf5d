//! 字段校验测试套件
//!
//! 必填字段缺失时的短路语义和请求级参数校验。

use crate::data::fixtures;
use crate::helpers::TestApp;
use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_missing_required_field_short_circuits() {
    let app = TestApp::with_rules(fixtures::checkout_rules()).await.unwrap();

    // required 字段值为 null：不做任何匹配，直接阻断并返回结构化错误
    let (status, result) = app
        .execute(
            "CHECKOUT_START",
            json!([
                { "key": "cartTotal", "value": null, "required": true },
                { "key": "region", "value": "domestic" }
            ]),
        )
        .await
        .unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["blocked"], json!(true));
    assert_eq!(
        result["fieldErrors"],
        json!([{ "field": "cartTotal", "error": "Missing required field" }])
    );
    // 短路：没有匹配发生，也就没有消息和动作
    assert_eq!(result["messages"], json!([]));
    assert_eq!(result["actions"], json!([]));
}

#[tokio::test]
async fn test_all_missing_required_fields_reported() {
    let app = TestApp::with_rules(fixtures::checkout_rules()).await.unwrap();

    let (_, result) = app
        .execute(
            "CHECKOUT_START",
            json!([
                { "key": "cartTotal", "required": true },
                { "key": "couponCode", "required": true },
                { "key": "region", "value": "domestic", "required": true }
            ]),
        )
        .await
        .unwrap();

    // 缺失项全部上报，按输入顺序
    let errors = result["fieldErrors"].as_array().unwrap();
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0]["field"], json!("cartTotal"));
    assert_eq!(errors[1]["field"], json!("couponCode"));
}

#[tokio::test]
async fn test_optional_null_field_is_fine() {
    let app = TestApp::with_rules(fixtures::checkout_rules()).await.unwrap();

    // 非必填字段为 null 不报错，正常走匹配
    let (_, result) = app
        .execute(
            "CHECKOUT_START",
            json!([
                { "key": "cartTotal", "value": 100 },
                { "key": "couponCode", "value": null }
            ]),
        )
        .await
        .unwrap();

    assert_eq!(result["blocked"], json!(false));
    assert_eq!(result["fieldErrors"], json!([]));
    assert_eq!(result["messages"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_empty_entry_point_rejected() {
    let app = TestApp::new();

    let (status, body) = app
        .post(
            "/api/rules/execute",
            json!({ "entryPoint": "", "context": [] }),
        )
        .await
        .unwrap();

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["code"], json!("VALIDATION_ERROR"));
}

#[tokio::test]
async fn test_malformed_request_body_rejected() {
    let app = TestApp::new();

    // 缺少 entryPoint 键，JSON 反序列化失败
    let (status, _) = app
        .post("/api/rules/execute", json!({ "context": [] }))
        .await
        .unwrap();

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}
