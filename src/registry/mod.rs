//! 注册中心客户端
//!
//! 注册器与分布式存储之间的唯一边界：租约申请、写入、续约、撤销。

#[cfg(feature = "etcd")]
pub mod etcd;
pub mod memory;
pub mod trait_def;

#[cfg(feature = "etcd")]
pub use etcd::EtcdRegistryClient;
pub use memory::{Call, MemoryRegistryClient};
pub use trait_def::{LeaseId, RegistryClient};

use std::sync::Arc;

use crate::config::RegistryConfig;
use crate::error::Result;

/// 根据配置创建注册中心客户端
pub async fn create_client(config: &RegistryConfig) -> Result<Arc<dyn RegistryClient>> {
    config.validate()?;

    #[cfg(feature = "etcd")]
    {
        let client = EtcdRegistryClient::connect(config).await?;
        Ok(Arc::new(client))
    }

    #[cfg(not(feature = "etcd"))]
    {
        Err(crate::error::RegistryError::config(
            "no registry backend compiled in; enable the `etcd` feature",
        ))
    }
}
