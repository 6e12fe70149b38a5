use super::DiscoveryService;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("discovery scheduler did not stop within {0:?}, task aborted")]
    TimedOut(Duration),

    #[error("discovery scheduler task failed: {0}")]
    Join(#[from] JoinError),
}

/// 周期性的后端发现调度器
pub struct DiscoveryScheduler;

impl DiscoveryScheduler {
    /// 启动调度任务，每隔 `interval` 执行一次探测
    ///
    /// 不执行首次探测，调用方应在接收流量前先调用一次 `DiscoveryService::sweep`。
    pub fn spawn(service: Arc<DiscoveryService>, interval: Duration) -> SchedulerHandle {
        let token = CancellationToken::new();
        let task = tokio::spawn(Self::run(service, interval, token.clone()));
        SchedulerHandle { token, task }
    }

    async fn run(service: Arc<DiscoveryService>, interval: Duration, token: CancellationToken) {
        info!("Starting discovery scheduler with interval: {:?}", interval);

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = tokio::time::sleep(interval) => {}
            }

            if token.is_cancelled() {
                break;
            }

            let report = service.sweep().await;
            debug!(
                "Scheduled sweep finished: {} routes, {} failed backends",
                report.table.len(),
                report.failures.len()
            );
        }

        info!("Discovery scheduler stopped");
    }
}

/// 调度任务句柄
pub struct SchedulerHandle {
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// 取消令牌，取消后调度器不再开始新的探测
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// 停止调度器，最多等待 `timeout`，超时后强制中止任务
    ///
    /// 正在进行的探测会被允许完成。
    pub async fn shutdown(mut self, timeout: Duration) -> Result<(), SchedulerError> {
        info!("Stopping discovery scheduler...");
        self.token.cancel();

        match tokio::time::timeout(timeout, &mut self.task).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => {
                error!("Discovery scheduler task failed: {}", e);
                Err(SchedulerError::Join(e))
            }
            Err(_) => {
                warn!(
                    "Discovery scheduler did not stop within {:?}, aborting",
                    timeout
                );
                self.task.abort();
                Err(SchedulerError::TimedOut(timeout))
            }
        }
    }
}
