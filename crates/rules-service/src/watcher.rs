//! 规则文件热更新模块
//!
//! 使用 `notify` crate 监听规则文件变化，
//! 文件写入后经 debounce 窗口去抖，再从规则来源重载并整体替换注册表。
//!
//! 适用场景：
//! - K8s ConfigMap 挂载规则文件到容器文件系统
//! - 本地开发时手动编辑规则文件

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use rules_engine::RuleStore;
use storefront_shared::observability::metrics;
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::source::RuleSource;

/// 基于文件系统事件的规则监听器
///
/// 监听规则文件所在目录（编辑器和 ConfigMap 更新都是先写临时文件再替换，
/// 监听目录才能捕获替换事件），变更后从来源重载并原子换入新规则集。
/// 重载失败时保留当前规则集。
pub struct RuleWatcher {
    /// 监听的规则文件路径
    watch_path: PathBuf,
    /// debounce 窗口，避免文件连续写入触发多次重载
    debounce: Duration,
    /// 重载数据来源
    source: Arc<dyn RuleSource>,
    /// 重载目标注册表
    store: RuleStore,
    /// 用于通知 watcher 循环退出
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl RuleWatcher {
    pub fn new(
        watch_path: impl AsRef<Path>,
        debounce: Duration,
        source: Arc<dyn RuleSource>,
        store: RuleStore,
    ) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            watch_path: watch_path.as_ref().to_path_buf(),
            debounce,
            source,
            store,
            shutdown_tx,
            shutdown_rx,
        }
    }

    /// 启动监听
    ///
    /// watcher 在当前线程同步创建（创建失败要阻止服务按热更新模式启动），
    /// 然后 move 进 debounce 任务，与循环同生命周期。
    pub fn start(&self) -> Result<()> {
        use notify::{RecursiveMode, Watcher};

        let debounce = self.debounce;
        let source = self.source.clone();
        let store = self.store.clone();
        let mut shutdown_rx = self.shutdown_rx.clone();

        // 监听文件所在目录而不是文件本身，原子替换（rename）不会丢事件
        let watch_dir = self
            .watch_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();

        // notify 事件通过 channel 转发到 tokio 异步任务
        let (event_tx, mut event_rx) = tokio::sync::mpsc::channel::<()>(16);

        let mut watcher = notify::recommended_watcher(
            move |res: Result<notify::Event, notify::Error>| match res {
                Ok(event) => {
                    // 只关心写入/创建/删除事件
                    use notify::EventKind;
                    match event.kind {
                        EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_) => {
                            let _ = event_tx.try_send(());
                        }
                        _ => {}
                    }
                }
                Err(e) => {
                    warn!(error = %e, "规则文件监听器事件错误");
                }
            },
        )
        .context("创建规则文件监听器失败")?;

        watcher
            .watch(&watch_dir, RecursiveMode::NonRecursive)
            .context("启动规则文件监听失败")?;

        info!(path = %watch_dir.display(), "规则文件监听已启动");

        // 异步 debounce 循环：收到文件事件后等待 debounce 窗口再重载。
        // watcher 随任务存活，任务退出时一并释放。
        tokio::spawn(async move {
            let _watcher = watcher;
            loop {
                tokio::select! {
                    // 收到文件变更事件
                    Some(()) = event_rx.recv() => {
                        // Debounce：等待窗口期，丢弃窗口内的后续事件
                        tokio::time::sleep(debounce).await;
                        while event_rx.try_recv().is_ok() {}

                        match source.load_rules().await {
                            Ok(rules) => match store.replace_all(rules) {
                                Ok(count) => {
                                    metrics::set_rule_registry_size(count as f64);
                                    info!(count, "规则文件变更，规则集已重载");
                                }
                                Err(e) => {
                                    error!(error = %e, "重载规则校验失败，保留当前规则集");
                                }
                            },
                            Err(e) => {
                                error!(error = %e, "规则文件重新读取失败，保留当前规则集");
                            }
                        }
                    }
                    // 收到关闭信号；sender 被丢弃（RuleWatcher 析构）同样退出
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            info!("规则文件监听已停止");
                            break;
                        }
                    }
                }
            }
        });

        Ok(())
    }

    /// 停止监听并释放资源
    pub fn stop(&self) {
        let _ = self.shutdown_tx.send(true);
    }
}
