//! etcd 注册中心客户端

use async_trait::async_trait;
use etcd_client::{Client, PutOptions};
use tracing::{debug, info};

use super::trait_def::{LeaseId, RegistryClient};
use crate::config::RegistryConfig;
use crate::error::conversions::map_lease_error;
use crate::error::{BackendResultExt, ErrorCode, RegistryError, Result};

/// etcd 注册中心客户端
#[derive(Clone)]
pub struct EtcdRegistryClient {
    client: Client,
}

impl EtcdRegistryClient {
    /// 连接 etcd
    pub async fn connect(config: &RegistryConfig) -> Result<Self> {
        config.validate()?;
        let client = Client::connect(&config.endpoints, None)
            .await
            .or_backend(ErrorCode::ConnectionFailed, "failed to connect to etcd")?;

        info!(endpoints = ?config.endpoints, "Connected to etcd");
        Ok(Self { client })
    }

    /// 使用已有的 etcd 客户端
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RegistryClient for EtcdRegistryClient {
    async fn grant(&self, ttl: u64) -> Result<LeaseId> {
        let ttl = i64::try_from(ttl).map_err(|_| {
            RegistryError::config(format!("lease ttl {} is out of range", ttl))
        })?;
        let mut client = self.client.clone();
        let lease = client
            .lease_grant(ttl, None)
            .await
            .or_backend(ErrorCode::LeaseGrantFailed, "failed to grant lease")?;
        debug!(lease_id = lease.id(), ttl = lease.ttl(), "Lease granted");
        Ok(lease.id())
    }

    async fn put(&self, key: &str, value: &str, lease: LeaseId) -> Result<()> {
        let mut client = self.client.clone();
        let opts = PutOptions::new().with_lease(lease);
        client
            .put(key, value, Some(opts))
            .await
            .or_backend(ErrorCode::PutFailed, format!("failed to put `{}`", key))?;
        Ok(())
    }

    async fn keep_alive(&self, lease: LeaseId) -> Result<()> {
        let mut client = self.client.clone();
        // 建立续约流时客户端会发送一次续约并读取首个响应，
        // 响应 TTL 为 0 即租约已过期
        let (_keeper, _stream) = client
            .lease_keep_alive(lease)
            .await
            .map_err(|e| map_lease_error(e, lease))?;
        Ok(())
    }

    async fn revoke(&self, lease: LeaseId) -> Result<()> {
        let mut client = self.client.clone();
        client
            .lease_revoke(lease)
            .await
            .map_err(|e| map_lease_error(e, lease))?;
        Ok(())
    }
}
