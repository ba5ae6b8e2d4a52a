//! 服务注册器
//!
//! 负责单个服务实例的注册 / 续约 / 注销状态机：
//!
//! - `register()`：申请租约，以租约写入 `<namespace>/<service>/<node>`，
//!   替换续约任务（间隔为 TTL 的 4/5）
//! - 续约：租约在后端过期时自动重新注册，调用方无感知
//! - `deregister()`：先停止续约任务，再撤销租约；撤销失败被忽略，
//!   键最终由 TTL 回收

pub mod group;
mod renewal;

pub use group::ServiceRegistry;

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::config::{RegistryConfig, renew_interval, validate_ttl};
use crate::error::{RegistryError, Result};
use crate::registry::{LeaseId, RegistryClient};
use crate::service::Service;
use crate::utils::service_key;
use renewal::RenewalTask;

/// 注册状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrarState {
    Unregistered,
    Registered,
}

/// 续约任务产生的事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenewalEvent {
    /// 续约成功
    Renewed { lease_id: LeaseId },
    /// 租约过期后已重新注册
    Reregistered { old: LeaseId, new: LeaseId },
    /// 续约或重新注册失败，任务会在下一个间隔重试
    Failed { lease_id: LeaseId, error: RegistryError },
}

/// 注册器与续约任务共享的状态
pub(crate) struct Shared {
    client: Arc<dyn RegistryClient>,
    service: Service,
    key: String,
    ttl: u64,
    lease_id: Mutex<Option<LeaseId>>,
    events: broadcast::Sender<RenewalEvent>,
}

impl Shared {
    /// 申请新租约并写入服务描述
    async fn publish(&self) -> Result<LeaseId> {
        let lease_id = self.client.grant(self.ttl).await?;
        let value = self.service.to_json()?;
        self.client.put(&self.key, &value, lease_id).await?;
        Ok(lease_id)
    }

    fn lease_id(&self) -> Option<LeaseId> {
        *self.lease_id.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn set_lease(&self, lease_id: Option<LeaseId>) -> Option<LeaseId> {
        let mut guard = self.lease_id.lock().unwrap_or_else(|p| p.into_inner());
        std::mem::replace(&mut *guard, lease_id)
    }

    fn emit(&self, event: RenewalEvent) {
        // 没有订阅者时丢弃
        let _ = self.events.send(event);
    }
}

/// 服务注册器
pub struct Registrar {
    shared: Arc<Shared>,
    renewal: Option<RenewalTask>,
}

impl std::fmt::Debug for Registrar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registrar")
            .field("key", &self.shared.key)
            .field("ttl", &self.shared.ttl)
            .finish_non_exhaustive()
    }
}

impl Registrar {
    /// 创建注册器
    ///
    /// 服务必须至少有一个节点（注册键使用第一个节点的 ID），`ttl` 须在 `1..=MAX_TTL` 之内。
    pub fn new(
        client: Arc<dyn RegistryClient>,
        service: Service,
        namespace: &str,
        ttl: u64,
    ) -> Result<Self> {
        if namespace.trim().is_empty() {
            return Err(RegistryError::config("registry namespace can't be empty"));
        }
        validate_ttl(ttl)?;
        let key = service_key(namespace, &service.name, service.id()?);
        let (events, _) = broadcast::channel(32);

        Ok(Self {
            shared: Arc::new(Shared {
                client,
                service,
                key,
                ttl,
                lease_id: Mutex::new(None),
                events,
            }),
            renewal: None,
        })
    }

    /// 按注册配置创建注册器
    pub fn from_config(
        client: Arc<dyn RegistryClient>,
        service: Service,
        config: &RegistryConfig,
    ) -> Result<Self> {
        Self::new(client, service, &config.namespace, config.ttl)
    }

    /// 注册服务
    ///
    /// 后端失败直接返回给调用方，不做重试。
    pub async fn register(&mut self) -> Result<()> {
        // 旧任务可能正在重新发布，必须先停止，否则它的写入会覆盖本次写入
        self.cancel_renewal().await;
        let period = self.renew_interval();

        let lease_id = match self.shared.publish().await {
            Ok(lease_id) => lease_id,
            Err(e) => {
                // 之前的注册仍然有效，恢复对它的续约
                if self.shared.lease_id().is_some() {
                    self.renewal = Some(RenewalTask::spawn(self.shared.clone(), period));
                }
                return Err(e);
            }
        };

        self.shared.set_lease(Some(lease_id));
        self.renewal = Some(RenewalTask::spawn(self.shared.clone(), period));

        info!(
            service = %self.shared.service.name,
            key = %self.shared.key,
            lease_id,
            ttl = self.shared.ttl,
            interval_ms = period.as_millis() as u64,
            "Service registered"
        );
        Ok(())
    }

    /// 注销服务
    ///
    /// 总是在本地完成：撤销租约的错误只记录日志。
    pub async fn deregister(&mut self) {
        self.cancel_renewal().await;

        let Some(lease_id) = self.shared.set_lease(None) else {
            return;
        };
        match self.shared.client.revoke(lease_id).await {
            Ok(()) => info!(key = %self.shared.key, lease_id, "Service deregistered"),
            Err(e) => warn!(
                key = %self.shared.key,
                lease_id,
                error = %e,
                "Failed to revoke lease, key will expire with its TTL"
            ),
        }
    }

    async fn cancel_renewal(&mut self) {
        if let Some(task) = self.renewal.take() {
            task.cancel().await;
        }
    }

    pub fn state(&self) -> RegistrarState {
        if self.renewal.is_some() {
            RegistrarState::Registered
        } else {
            RegistrarState::Unregistered
        }
    }

    /// 当前租约
    pub fn lease_id(&self) -> Option<LeaseId> {
        self.shared.lease_id()
    }

    /// 注册键
    pub fn key(&self) -> &str {
        &self.shared.key
    }

    pub fn service(&self) -> &Service {
        &self.shared.service
    }

    pub fn ttl(&self) -> u64 {
        self.shared.ttl
    }

    pub fn renew_interval(&self) -> Duration {
        renew_interval(self.shared.ttl)
    }

    /// 订阅续约事件
    pub fn subscribe(&self) -> broadcast::Receiver<RenewalEvent> {
        self.shared.events.subscribe()
    }
}

impl Drop for Registrar {
    fn drop(&mut self) {
        if let Some(task) = self.renewal.take() {
            task.abort();
        }
    }
}
