//! 并发测试套件
//!
//! 执行、确认和热替换并发进行时，每个请求都应看到一致的规则集视图，
//! 且不会 panic 或丢失确认。

use std::sync::Arc;

use crate::data::fixtures;
use crate::helpers::TestApp;
use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_concurrent_execute_and_acknowledge() {
    let app = Arc::new(TestApp::with_rules(fixtures::checkout_rules()).await.unwrap());

    let mut handles = Vec::new();
    for i in 0..32 {
        let app = app.clone();
        handles.push(tokio::spawn(async move {
            let subject = format!("user-{}", i % 8);
            if i % 2 == 0 {
                let (status, result) = app
                    .execute(
                        "CHECKOUT_START",
                        fixtures::checkout_context(2000, "domestic", &subject),
                    )
                    .await
                    .unwrap();
                assert_eq!(status, StatusCode::OK);
                // 执行结果要么阻断（未确认）要么放行（已确认），没有中间态
                assert!(result["blocked"].is_boolean());
            } else {
                let (status, outcome) = app.acknowledge(&subject, "high-value-ack").await.unwrap();
                assert_eq!(status, StatusCode::OK);
                assert_eq!(outcome, json!({ "success": true }));
            }
        }));
    }

    for handle in handles {
        handle.await.unwrap();
    }

    // 所有主体都已确认，此后的执行一律放行
    for i in 0..8 {
        let subject = format!("user-{}", i);
        let (_, result) = app
            .execute(
                "CHECKOUT_START",
                fixtures::checkout_context(2000, "domestic", &subject),
            )
            .await
            .unwrap();
        assert_eq!(result["blocked"], json!(false), "主体 {subject} 应已放行");
    }
}

#[tokio::test]
async fn test_execute_during_hot_replace() {
    let app = Arc::new(TestApp::with_rules(fixtures::checkout_rules()).await.unwrap());

    let replacer = {
        let app = app.clone();
        tokio::spawn(async move {
            // 反复在两套规则集之间切换
            for i in 0..20 {
                let rules = if i % 2 == 0 {
                    fixtures::checkout_rules()
                } else {
                    fixtures::home_page_rules()
                };
                let (status, _) = app
                    .put("/api/admin/rules", json!({ "rules": rules }))
                    .await
                    .unwrap();
                assert_eq!(status, StatusCode::OK);
            }
        })
    };

    let mut executors = Vec::new();
    for _ in 0..4 {
        let app = app.clone();
        executors.push(tokio::spawn(async move {
            for _ in 0..20 {
                let (status, result) = app
                    .execute(
                        "CHECKOUT_START",
                        fixtures::checkout_context(120, "domestic", "user-1"),
                    )
                    .await
                    .unwrap();
                assert_eq!(status, StatusCode::OK);
                // 看到的要么是结账规则集（1 条消息）要么是首页规则集（0 条），
                // 绝不会是换到一半的状态
                let messages = result["messages"].as_array().unwrap().len();
                assert!(messages <= 1, "规则集视图不一致: {result}");
            }
        }));
    }

    replacer.await.unwrap();
    for executor in executors {
        executor.await.unwrap();
    }
}
