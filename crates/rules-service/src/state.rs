//! 应用状态定义
//!
//! Axum 路由共享的应用状态。

use crate::source::RuleSource;
use rules_engine::{RuleEngine, RuleStore};
use std::sync::Arc;
use storefront_shared::config::AppConfig;

/// Axum 应用共享状态
///
/// 引擎持有规则注册表和确认存储；规则来源用于管理接口的 reload。
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<RuleEngine>,
    pub source: Arc<dyn RuleSource>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(engine: Arc<RuleEngine>, source: Arc<dyn RuleSource>, config: Arc<AppConfig>) -> Self {
        Self {
            engine,
            source,
            config,
        }
    }

    /// 规则注册表的便捷访问
    pub fn store(&self) -> &RuleStore {
        self.engine.store()
    }
}
