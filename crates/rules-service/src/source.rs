//! 规则来源
//!
//! 规则存储是外部系统，服务只消费。`RuleSource` 是注入的抽象：
//! 默认实现从 JSON 文件读取，测试用 mock 替换，
//! 换成网络来源时引擎和服务都不需要改动。

use async_trait::async_trait;
use rules_engine::Rule;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// 规则来源错误
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("读取规则文件失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("规则文件不是合法 JSON 数组: {0}")]
    Parse(#[from] serde_json::Error),
}

/// 规则来源接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RuleSource: Send + Sync {
    /// 读取完整规则集
    async fn load_rules(&self) -> Result<Vec<Rule>, SourceError>;

    /// 来源描述，用于日志
    fn describe(&self) -> String;
}

/// 基于 JSON 文件的规则来源
///
/// 文件内容是规则对象的 JSON 数组。文件缺失按空规则集处理（告警不报错），
/// 单条规则解析失败跳过该条，不拖垮整个规则集。
pub struct FileRuleSource {
    path: PathBuf,
}

impl FileRuleSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl RuleSource for FileRuleSource {
    async fn load_rules(&self) -> Result<Vec<Rule>, SourceError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %self.path.display(), "规则文件不存在，以空规则集启动");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let rows: Vec<serde_json::Value> = serde_json::from_str(&content)?;

        let mut rules = Vec::with_capacity(rows.len());
        let mut skipped = 0usize;
        for row in rows {
            match serde_json::from_value::<Rule>(row.clone()) {
                Ok(rule) => rules.push(rule),
                Err(e) => {
                    skipped += 1;
                    warn!(error = %e, row = %row, "规则解析失败，已跳过该条");
                }
            }
        }

        info!(
            path = %self.path.display(),
            loaded = rules.len(),
            skipped,
            "规则文件读取完成"
        );
        Ok(rules)
    }

    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }
}
