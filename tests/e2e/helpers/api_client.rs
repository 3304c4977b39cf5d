//! 进程内 API 客户端
//!
//! 不经过网络：直接构建服务 Router，用 tower 的 `oneshot` 派发请求。
//! 每个 TestApp 有独立的注册表、确认存储和规则文件路径，测试之间互不干扰。

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use rules_engine::{MemoryAckStore, RuleEngine, RuleStore};
use serde_json::Value;
use storefront_rules_service::{AppState, FileRuleSource};
use storefront_shared::config::AppConfig;
use tower::ServiceExt;

/// 进程内测试应用
pub struct TestApp {
    router: Router,
    store: RuleStore,
    /// 规则来源文件路径，reload 类测试直接写这个文件
    pub rules_file: PathBuf,
}

impl TestApp {
    /// 以空注册表启动
    pub fn new() -> Self {
        let rules_file =
            std::env::temp_dir().join(format!("e2e-rules-{}.json", uuid::Uuid::new_v4()));

        let store = RuleStore::new();
        let acks = Arc::new(MemoryAckStore::new());
        let engine = Arc::new(RuleEngine::new(store.clone(), acks));
        let source = Arc::new(FileRuleSource::new(&rules_file));
        let config = Arc::new(AppConfig::default());

        let state = AppState::new(engine, source, config);
        Self {
            router: storefront_rules_service::app(state),
            store,
            rules_file,
        }
    }

    /// 以给定规则集启动（走管理接口整体替换，顺带验证该入口）
    pub async fn with_rules(rules: Value) -> Result<Self> {
        let app = Self::new();
        let (status, body) = app
            .put("/api/admin/rules", serde_json::json!({ "rules": rules }))
            .await?;
        anyhow::ensure!(
            status == StatusCode::OK,
            "规则集初始化失败: {} {}",
            status,
            body
        );
        Ok(app)
    }

    /// 注册表的直接访问，用于断言内部状态
    pub fn store(&self) -> &RuleStore {
        &self.store
    }

    // ========== 引擎操作 ==========

    /// POST /api/rules/execute
    pub async fn execute(&self, entry_point: &str, context: Value) -> Result<(StatusCode, Value)> {
        self.post(
            "/api/rules/execute",
            serde_json::json!({ "entryPoint": entry_point, "context": context }),
        )
        .await
    }

    /// POST /api/rules/acknowledge
    pub async fn acknowledge(&self, subject_id: &str, rule_id: &str) -> Result<(StatusCode, Value)> {
        self.post(
            "/api/rules/acknowledge",
            serde_json::json!({ "subjectId": subject_id, "ruleId": rule_id }),
        )
        .await
    }

    // ========== 通用请求 ==========

    pub async fn get(&self, path: &str) -> Result<(StatusCode, Value)> {
        let request = Request::builder().uri(path).body(Body::empty())?;
        self.dispatch(request).await
    }

    pub async fn post(&self, path: &str, body: Value) -> Result<(StatusCode, Value)> {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))?;
        self.dispatch(request).await
    }

    pub async fn put(&self, path: &str, body: Value) -> Result<(StatusCode, Value)> {
        let request = Request::builder()
            .method("PUT")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))?;
        self.dispatch(request).await
    }

    pub async fn delete(&self, path: &str) -> Result<(StatusCode, Value)> {
        let request = Request::builder()
            .method("DELETE")
            .uri(path)
            .body(Body::empty())?;
        self.dispatch(request).await
    }

    async fn dispatch(&self, request: Request<Body>) -> Result<(StatusCode, Value)> {
        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = response.into_body().collect().await?.to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            // 非 JSON 响应体（如 axum 默认的纯文本拒绝信息）原样以字符串返回
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        Ok((status, body))
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        std::fs::remove_file(&self.rules_file).ok();
    }
}
