// ==========================================
// 灾后修复项目管理系统 - 周期任务
// ==========================================
// tokio::time::interval + CancellationToken
// 错过的 tick 不补跑（MissedTickBehavior::Skip）
// 取消或 drop 句柄后循环退出,不遗留定时器
// ==========================================

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

// ==========================================
// PeriodicJob - 周期任务句柄
// ==========================================
#[derive(Debug)]
pub struct PeriodicJob {
    name: &'static str,
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl PeriodicJob {
    /// 启动周期任务
    ///
    /// 第一次执行在一个完整周期之后（不在启动时立即执行）
    ///
    /// # 参数
    /// - name: 任务名（日志用）
    /// - period: 周期
    /// - tick: 每个周期调用一次的异步闭包
    pub fn spawn<F, Fut>(name: &'static str, period: Duration, mut tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let handle = tokio::spawn(async move {
            tracing::info!(job = name, interval_secs = period.as_secs(), "周期任务启动");

            let start = tokio::time::Instant::now() + period;
            let mut interval = tokio::time::interval_at(start, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = token.cancelled() => {
                        tracing::info!(job = name, "周期任务停止");
                        break;
                    }
                    _ = interval.tick() => {
                        tick().await;
                    }
                }
            }
        });

        Self {
            name,
            cancel,
            handle: Some(handle),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// 取消任务（幂等）
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// 取消并等待循环退出
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                tracing::warn!(job = self.name, error = %e, "周期任务退出异常");
            }
        }
    }
}

impl Drop for PeriodicJob {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
