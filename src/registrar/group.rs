//! 多服务注册
//!
//! 工厂为一个服务器生成多个服务，每个服务由独立的注册器维护。

use std::sync::Arc;
use tracing::{info, warn};

use super::Registrar;
use crate::config::RegistryConfig;
use crate::error::Result;
use crate::registry::RegistryClient;
use crate::service::Service;

/// 服务注册表
pub struct ServiceRegistry {
    client: Arc<dyn RegistryClient>,
    config: RegistryConfig,
    registrars: Vec<Registrar>,
}

impl ServiceRegistry {
    pub fn new(client: Arc<dyn RegistryClient>, config: RegistryConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            client,
            config,
            registrars: Vec::new(),
        })
    }

    /// 按顺序注册所有服务
    ///
    /// 任一服务注册失败时，撤销本次已注册的服务并返回该错误。
    pub async fn register_all(&mut self, services: Vec<Service>) -> Result<()> {
        let mut pending = services
            .into_iter()
            .map(|service| Registrar::from_config(self.client.clone(), service, &self.config))
            .collect::<Result<Vec<_>>>()?;

        let mut registered: Vec<Registrar> = Vec::with_capacity(pending.len());
        for mut registrar in pending.drain(..) {
            if let Err(e) = registrar.register().await {
                warn!(
                    key = %registrar.key(),
                    error = %e,
                    rollback = registered.len(),
                    "Service registration failed, rolling back"
                );
                for mut done in registered {
                    done.deregister().await;
                }
                return Err(e);
            }
            registered.push(registrar);
        }

        info!(count = registered.len(), namespace = %self.config.namespace, "Services registered");
        self.registrars.extend(registered);
        Ok(())
    }

    /// 注销所有服务
    pub async fn deregister_all(&mut self) {
        for mut registrar in self.registrars.drain(..) {
            registrar.deregister().await;
        }
    }

    pub fn registrars(&self) -> &[Registrar] {
        &self.registrars
    }

    pub fn keys(&self) -> Vec<&str> {
        self.registrars.iter().map(Registrar::key).collect()
    }
}
