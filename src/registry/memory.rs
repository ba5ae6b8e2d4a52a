//! 进程内注册中心客户端
//!
//! 按 TTL 维护租约与绑定的键，记录每次调用，并支持注入故障。
//! 时间取自 `tokio::time::Instant`，测试中可配合暂停的时钟使用。

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

use super::trait_def::{LeaseId, RegistryClient};
use crate::config::validate_ttl;
use crate::error::{ErrorCode, RegistryError, Result};

/// 一次客户端调用
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Grant { ttl: u64, lease: LeaseId },
    Put { key: String, lease: LeaseId },
    KeepAlive { lease: LeaseId },
    Revoke { lease: LeaseId },
}

#[derive(Debug)]
struct Lease {
    ttl: Duration,
    deadline: Instant,
}

#[derive(Debug, Default)]
struct State {
    next_lease: LeaseId,
    leases: HashMap<LeaseId, Lease>,
    kvs: BTreeMap<String, (String, LeaseId)>,
    calls: Vec<Call>,
    fail_next_grant: Option<RegistryError>,
    fail_next_put: Option<RegistryError>,
    failing_keys: HashSet<String>,
    fail_next_keep_alive: Option<RegistryError>,
    fail_revoke: bool,
}

impl State {
    fn purge_expired(&mut self, now: Instant) {
        let expired: Vec<LeaseId> = self
            .leases
            .iter()
            .filter(|(_, lease)| lease.deadline <= now)
            .map(|(id, _)| *id)
            .collect();
        for id in expired {
            self.drop_lease(id);
        }
    }

    fn drop_lease(&mut self, id: LeaseId) -> bool {
        let existed = self.leases.remove(&id).is_some();
        self.kvs.retain(|_, (_, lease)| *lease != id);
        existed
    }
}

/// 进程内注册中心客户端
#[derive(Debug, Default)]
pub struct MemoryRegistryClient {
    state: Mutex<State>,
}

impl MemoryRegistryClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// 读取键值（已过期的租约先被清理）
    pub fn get(&self, key: &str) -> Option<String> {
        let mut state = self.lock();
        state.purge_expired(Instant::now());
        state.kvs.get(key).map(|(value, _)| value.clone())
    }

    /// 键当前绑定的租约
    pub fn lease_of(&self, key: &str) -> Option<LeaseId> {
        let mut state = self.lock();
        state.purge_expired(Instant::now());
        state.kvs.get(key).map(|(_, lease)| *lease)
    }

    /// 存活的租约数
    pub fn live_leases(&self) -> usize {
        let mut state = self.lock();
        state.purge_expired(Instant::now());
        state.leases.len()
    }

    /// 所有调用记录
    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn grant_count(&self) -> usize {
        self.count(|c| matches!(c, Call::Grant { .. }))
    }

    pub fn put_count(&self) -> usize {
        self.count(|c| matches!(c, Call::Put { .. }))
    }

    pub fn keep_alive_count(&self) -> usize {
        self.count(|c| matches!(c, Call::KeepAlive { .. }))
    }

    pub fn revoke_count(&self) -> usize {
        self.count(|c| matches!(c, Call::Revoke { .. }))
    }

    fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.lock().calls.iter().filter(|c| pred(c)).count()
    }

    /// 让租约立即在“后端”过期
    pub fn expire_lease(&self, lease: LeaseId) {
        self.lock().drop_lease(lease);
    }

    /// 下一次 grant 失败
    pub fn fail_next_grant(&self, err: RegistryError) {
        self.lock().fail_next_grant = Some(err);
    }

    /// 下一次 put 失败
    pub fn fail_next_put(&self, err: RegistryError) {
        self.lock().fail_next_put = Some(err);
    }

    /// 写入指定键始终失败
    pub fn fail_put_for(&self, key: impl Into<String>) {
        self.lock().failing_keys.insert(key.into());
    }

    /// 下一次 keep_alive 失败
    pub fn fail_next_keep_alive(&self, err: RegistryError) {
        self.lock().fail_next_keep_alive = Some(err);
    }

    /// revoke 始终失败（模拟注册中心不可达）
    pub fn fail_revoke(&self, fail: bool) {
        self.lock().fail_revoke = fail;
    }
}

#[async_trait]
impl RegistryClient for MemoryRegistryClient {
    async fn grant(&self, ttl: u64) -> Result<LeaseId> {
        let mut state = self.lock();
        if let Some(err) = state.fail_next_grant.take() {
            return Err(err);
        }
        validate_ttl(ttl)?;
        let now = Instant::now();
        state.purge_expired(now);
        state.next_lease += 1;
        let id = state.next_lease;
        let ttl_duration = Duration::from_secs(ttl);
        state.leases.insert(
            id,
            Lease {
                ttl: ttl_duration,
                deadline: now + ttl_duration,
            },
        );
        state.calls.push(Call::Grant { ttl, lease: id });
        Ok(id)
    }

    async fn put(&self, key: &str, value: &str, lease: LeaseId) -> Result<()> {
        let mut state = self.lock();
        state.calls.push(Call::Put {
            key: key.to_string(),
            lease,
        });
        if let Some(err) = state.fail_next_put.take() {
            return Err(err);
        }
        if state.failing_keys.contains(key) {
            return Err(RegistryError::backend(
                ErrorCode::PutFailed,
                format!("failed to put `{}`", key),
            ));
        }
        state.purge_expired(Instant::now());
        if !state.leases.contains_key(&lease) {
            return Err(RegistryError::LeaseNotFound(lease));
        }
        state
            .kvs
            .insert(key.to_string(), (value.to_string(), lease));
        Ok(())
    }

    async fn keep_alive(&self, lease: LeaseId) -> Result<()> {
        let mut state = self.lock();
        state.calls.push(Call::KeepAlive { lease });
        if let Some(err) = state.fail_next_keep_alive.take() {
            return Err(err);
        }
        let now = Instant::now();
        state.purge_expired(now);
        match state.leases.get_mut(&lease) {
            Some(entry) => {
                entry.deadline = now + entry.ttl;
                Ok(())
            }
            None => Err(RegistryError::LeaseNotFound(lease)),
        }
    }

    async fn revoke(&self, lease: LeaseId) -> Result<()> {
        let mut state = self.lock();
        state.calls.push(Call::Revoke { lease });
        if state.fail_revoke {
            return Err(RegistryError::backend(
                ErrorCode::BackendUnavailable,
                "registry unreachable",
            ));
        }
        if state.drop_lease(lease) {
            Ok(())
        } else {
            Err(RegistryError::LeaseNotFound(lease))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_key_expires_with_lease() {
        let client = MemoryRegistryClient::new();
        let lease = client.grant(5).await.unwrap();
        client.put("ns/svc/1", "{}", lease).await.unwrap();
        assert_eq!(client.get("ns/svc/1").as_deref(), Some("{}"));

        tokio::time::advance(Duration::from_secs(4)).await;
        client.keep_alive(lease).await.unwrap();
        tokio::time::advance(Duration::from_secs(4)).await;
        assert!(client.get("ns/svc/1").is_some());

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(client.get("ns/svc/1").is_none());
        assert_eq!(
            client.keep_alive(lease).await.unwrap_err(),
            RegistryError::LeaseNotFound(lease)
        );
    }

    #[tokio::test]
    async fn test_revoke_deletes_keys() {
        let client = MemoryRegistryClient::new();
        let lease = client.grant(30).await.unwrap();
        client.put("k", "v", lease).await.unwrap();
        client.revoke(lease).await.unwrap();
        assert!(client.get("k").is_none());
        assert_eq!(client.live_leases(), 0);
        assert!(client.revoke(lease).await.is_err());
    }

    #[tokio::test]
    async fn test_injected_failures_fire_once() {
        let client = MemoryRegistryClient::new();
        client.fail_next_grant(RegistryError::backend(ErrorCode::LeaseGrantFailed, "boom"));
        tokio_test::assert_err!(client.grant(5).await);
        tokio_test::assert_ok!(client.grant(5).await);
        assert_eq!(client.grant_count(), 1);
    }

    #[tokio::test]
    async fn test_grant_rejects_out_of_range_ttl() {
        let client = MemoryRegistryClient::new();
        assert!(client.grant(0).await.unwrap_err().is_config());
        assert!(client.grant(u64::MAX).await.unwrap_err().is_config());
        assert_eq!(client.grant_count(), 0);
    }
}
