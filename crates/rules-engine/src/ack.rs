//! 确认存储
//!
//! 记录"主体已确认某条规则"，按 (subjectId, ruleId) 定位。
//! 以注入的 trait 形式提供：测试替换内存实现，生产可替换联网存储，
//! 引擎不感知存储介质。

use crate::models::Acknowledgment;
use dashmap::DashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, instrument};

/// 确认存储错误
///
/// 评估路径本身不会失败，失败只可能来自存储介质。
#[derive(Debug, Error)]
pub enum AckStoreError {
    #[error("确认存储不可用: {0}")]
    Unavailable(String),
}

/// 确认存储接口
///
/// `record` 必须按键幂等：重复确认不产生新记录、不推进时间戳，
/// 并返回首次写入的记录。
#[cfg_attr(test, mockall::automock)]
pub trait AckStore: Send + Sync {
    /// 记录主体对规则的确认
    fn record(&self, subject_id: &str, rule_id: &str) -> Result<Acknowledgment, AckStoreError>;

    /// 查询主体是否已确认规则
    fn has(&self, subject_id: &str, rule_id: &str) -> Result<bool, AckStoreError>;
}

/// 内存确认存储
///
/// DashMap 的 entry 接口提供按键原子的 insert-if-absent，
/// 不同键互不阻塞，没有全局锁。
#[derive(Clone, Default)]
pub struct MemoryAckStore {
    entries: Arc<DashMap<(String, String), Acknowledgment>>,
}

impl MemoryAckStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl AckStore for MemoryAckStore {
    #[instrument(skip(self))]
    fn record(&self, subject_id: &str, rule_id: &str) -> Result<Acknowledgment, AckStoreError> {
        let key = (subject_id.to_string(), rule_id.to_string());
        let entry = self.entries.entry(key).or_insert_with(|| {
            debug!(subject_id, rule_id, "确认已记录");
            Acknowledgment::new(subject_id, rule_id)
        });
        Ok(entry.value().clone())
    }

    fn has(&self, subject_id: &str, rule_id: &str) -> Result<bool, AckStoreError> {
        let key = (subject_id.to_string(), rule_id.to_string());
        Ok(self.entries.contains_key(&key))
    }
}
