//! 管理接口测试套件
//!
//! 规则 CRUD、整体替换原子性、来源重载和统计。
//! 管理接口的响应统一走 `{success, code, message, data}` 信封。

use crate::data::fixtures;
use crate::helpers::TestApp;
use crate::helpers::assertions::*;
use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_rule_crud_lifecycle() {
    let app = TestApp::new();

    // 注册
    let (status, body) = app
        .post(
            "/api/admin/rules",
            fixtures::always_match_rule("crud-rule", "HOME_PAGE_MOUNT"),
        )
        .await
        .unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_success_envelope(&body);
    assert_eq!(body["data"]["ruleId"], json!("crud-rule"));

    // 查询单条
    let (status, body) = app.get("/api/admin/rules/crud-rule").await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], json!("crud-rule"));
    assert_eq!(body["data"]["entryPoint"], json!("HOME_PAGE_MOUNT"));

    // 列表
    let (_, body) = app.get("/api/admin/rules").await.unwrap();
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));

    // 覆盖注册（同 id upsert）
    let mut updated = fixtures::always_match_rule("crud-rule", "HOME_PAGE_MOUNT");
    updated["priority"] = json!(99);
    let (status, _) = app.post("/api/admin/rules", updated).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    let (_, body) = app.get("/api/admin/rules/crud-rule").await.unwrap();
    assert_eq!(body["data"]["priority"], json!(99));

    // 删除
    let (status, body) = app.delete("/api/admin/rules/crud-rule").await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_success_envelope(&body);
    assert_eq!(app.store().len(), 0);
}

#[tokio::test]
async fn test_get_missing_rule_returns_404() {
    let app = TestApp::new();

    let (status, body) = app.get("/api/admin/rules/no-such-rule").await.unwrap();
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(assert_error_envelope(&body), "RULE_NOT_FOUND");
}

#[tokio::test]
async fn test_delete_missing_rule_returns_404() {
    let app = TestApp::new();

    let (status, body) = app.delete("/api/admin/rules/no-such-rule").await.unwrap();
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(assert_error_envelope(&body), "RULE_NOT_FOUND");
}

#[tokio::test]
async fn test_invalid_rule_rejected() {
    let app = TestApp::new();

    // id 为空白：结构校验失败
    let (status, body) = app
        .post(
            "/api/admin/rules",
            json!({
                "id": "   ",
                "entryPoint": "HOME_PAGE_MOUNT",
                "condition": { "logic": "AND", "children": [] }
            }),
        )
        .await
        .unwrap();

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(assert_error_envelope(&body), "VALIDATION_ERROR");
    assert_eq!(app.store().len(), 0);
}

#[tokio::test]
async fn test_replace_all_is_atomic() {
    let app = TestApp::with_rules(fixtures::checkout_rules()).await.unwrap();
    assert_eq!(app.store().len(), 3);

    // 新规则集里混入一条非法规则（入口点为空），整批拒绝
    let (status, body) = app
        .put(
            "/api/admin/rules",
            json!({
                "rules": [
                    fixtures::always_match_rule("good-rule", "HOME_PAGE_MOUNT"),
                    {
                        "id": "bad-rule",
                        "entryPoint": "",
                        "condition": { "logic": "AND", "children": [] }
                    }
                ]
            }),
        )
        .await
        .unwrap();

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error_envelope(&body);
    // 当前规则集原样保留
    assert_eq!(app.store().len(), 3);
    assert!(app.store().contains("free-shipping"));
}

#[tokio::test]
async fn test_replace_all_swaps_entire_set() {
    let app = TestApp::with_rules(fixtures::checkout_rules()).await.unwrap();

    let (status, body) = app
        .put(
            "/api/admin/rules",
            json!({ "rules": [fixtures::always_match_rule("only-rule", "HOME_PAGE_MOUNT")] }),
        )
        .await
        .unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["count"], json!(1));
    assert_eq!(app.store().len(), 1);
    assert!(!app.store().contains("free-shipping"));
}

#[tokio::test]
async fn test_reload_from_source_file() {
    let app = TestApp::with_rules(fixtures::checkout_rules()).await.unwrap();

    // 写规则文件后触发 reload
    std::fs::write(&app.rules_file, fixtures::home_page_rules().to_string()).unwrap();

    let (status, body) = app
        .post("/api/admin/rules/reload", json!({}))
        .await
        .unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_success_envelope(&body);
    assert_eq!(body["data"]["count"], json!(1));
    assert!(
        body["data"]["source"]
            .as_str()
            .unwrap()
            .starts_with("file:")
    );
    assert!(app.store().contains("welcome-banner"));
    assert!(!app.store().contains("free-shipping"));
}

#[tokio::test]
async fn test_reload_missing_file_yields_empty_set() {
    // 来源文件不存在按空规则集处理，reload 把注册表清空
    let app = TestApp::with_rules(fixtures::checkout_rules()).await.unwrap();

    let (status, body) = app
        .post("/api/admin/rules/reload", json!({}))
        .await
        .unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["count"], json!(0));
    assert_eq!(app.store().len(), 0);
}

#[tokio::test]
async fn test_stats_reflect_registry() {
    let mut rules = fixtures::checkout_rules().as_array().cloned().unwrap();
    let mut inactive = fixtures::always_match_rule("dormant", "HOME_PAGE_MOUNT");
    inactive["active"] = json!(false);
    rules.push(inactive);
    let app = TestApp::with_rules(json!(rules)).await.unwrap();

    let (status, body) = app.get("/api/admin/rules/stats").await.unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["totalRules"], json!(4));
    assert_eq!(body["data"]["activeRules"], json!(3));
    assert_eq!(body["data"]["entryPoints"]["CHECKOUT_START"], json!(3));
    assert_eq!(body["data"]["entryPoints"]["HOME_PAGE_MOUNT"], json!(1));
}

#[tokio::test]
async fn test_health_and_ready_probes() {
    let app = TestApp::with_rules(fixtures::checkout_rules()).await.unwrap();

    let (status, body) = app.get("/health").await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("ok"));

    let (status, body) = app.get("/ready").await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["checks"]["rulesLoaded"], json!(3));
}
