//! 续约任务
//!
//! 每个注册器至多持有一个续约任务。任务按固定间隔续约；
//! 租约在后端过期时就地重新发布服务（新租约、覆盖同一个键）并重置计时器。

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::{RenewalEvent, Shared};
use crate::error::RegistryError;

/// 续约任务句柄
pub(crate) struct RenewalTask {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl RenewalTask {
    /// 启动续约任务，首次续约在一个间隔之后
    pub(crate) fn spawn(shared: Arc<Shared>, period: Duration) -> Self {
        let token = CancellationToken::new();
        let first_tick = Instant::now() + period;
        let handle = tokio::spawn(run(shared, first_tick, period, token.clone()));
        Self { token, handle }
    }

    /// 停止任务并等待其退出
    ///
    /// 返回后任务不会再发起任何后端调用。
    pub(crate) async fn cancel(self) {
        self.token.cancel();
        self.handle.abort();
        let _ = self.handle.await;
    }

    /// 不等待的停止，用于 `Drop`
    pub(crate) fn abort(&self) {
        self.token.cancel();
        self.handle.abort();
    }
}

async fn run(shared: Arc<Shared>, first_tick: Instant, period: Duration, token: CancellationToken) {
    let mut ticker = interval_at(first_tick, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let Some(lease_id) = shared.lease_id() else {
            break;
        };

        match shared.client.keep_alive(lease_id).await {
            Ok(()) => {
                debug!(key = %shared.key, lease_id, "Lease renewed");
                shared.emit(RenewalEvent::Renewed { lease_id });
            }
            Err(RegistryError::LeaseNotFound(_)) => {
                warn!(key = %shared.key, lease_id, "Lease expired, re-registering service");
                match shared.publish().await {
                    Ok(new_lease) => {
                        shared.set_lease(Some(new_lease));
                        ticker.reset();
                        info!(
                            key = %shared.key,
                            old_lease_id = lease_id,
                            lease_id = new_lease,
                            "Service re-registered"
                        );
                        shared.emit(RenewalEvent::Reregistered {
                            old: lease_id,
                            new: new_lease,
                        });
                    }
                    Err(e) => {
                        error!(key = %shared.key, error = %e, "Failed to re-register service");
                        shared.emit(RenewalEvent::Failed { lease_id, error: e });
                    }
                }
            }
            Err(e) => {
                error!(key = %shared.key, lease_id, error = %e, "Lease keep-alive failed");
                shared.emit(RenewalEvent::Failed { lease_id, error: e });
            }
        }
    }

    debug!(key = %shared.key, "Renewal task stopped");
}
