//! 注册中心客户端 Trait 定义

use async_trait::async_trait;

use crate::error::Result;

/// 租约 ID
pub type LeaseId = i64;

/// 租约 + KV 存储的最小能力集
///
/// 注册器只通过这个 trait 访问注册中心，所有方法都只挂起调用方任务。
#[async_trait]
pub trait RegistryClient: Send + Sync {
    /// 申请 TTL 租约
    async fn grant(&self, ttl: u64) -> Result<LeaseId>;

    /// 写入键值并绑定租约
    async fn put(&self, key: &str, value: &str, lease: LeaseId) -> Result<()>;

    /// 续约
    ///
    /// 租约已在后端过期时必须返回 [`RegistryError::LeaseNotFound`](crate::error::RegistryError::LeaseNotFound)。
    async fn keep_alive(&self, lease: LeaseId) -> Result<()>;

    /// 撤销租约，绑定的键随之删除
    async fn revoke(&self, lease: LeaseId) -> Result<()>;
}
