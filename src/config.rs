use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::error::{RegistryError, Result};
use crate::service::Service;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub registry: RegistryConfig,
    pub service: Option<ServiceOptions>,
}

/// etcd 注册配置
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct RegistryConfig {
    #[serde(default = "default_endpoints")]
    pub endpoints: Vec<String>,
    /// 注册键前缀
    #[serde(default = "default_namespace")]
    pub namespace: String,
    /// 租约 TTL（秒）
    #[serde(default = "default_ttl")]
    pub ttl: u64,
}

fn default_endpoints() -> Vec<String> {
    vec!["http://127.0.0.1:2379".to_string()]
}

fn default_namespace() -> String {
    "/micro/registry".to_string()
}

fn default_ttl() -> u64 {
    10
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            endpoints: default_endpoints(),
            namespace: default_namespace(),
            ttl: default_ttl(),
        }
    }
}

impl RegistryConfig {
    pub fn new(endpoints: Vec<String>, namespace: impl Into<String>, ttl: u64) -> Self {
        Self {
            endpoints,
            namespace: namespace.into(),
            ttl,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.endpoints.iter().all(|e| e.trim().is_empty()) {
            return Err(RegistryError::config("registry endpoints can't be empty"));
        }
        if self.namespace.trim().is_empty() {
            return Err(RegistryError::config("registry namespace can't be empty"));
        }
        validate_ttl(self.ttl)
    }

    /// 续约间隔：TTL 的 4/5
    pub fn renew_interval(&self) -> Duration {
        renew_interval(self.ttl)
    }
}

/// etcd 允许的最大租约 TTL（秒）
pub const MAX_TTL: u64 = 9_000_000_000;

/// TTL 必须在 `1..=MAX_TTL` 之内
pub fn validate_ttl(ttl: u64) -> Result<()> {
    if ttl == 0 {
        return Err(RegistryError::config("registry ttl must be positive"));
    }
    if ttl > MAX_TTL {
        return Err(RegistryError::config(format!(
            "registry ttl {} exceeds the maximum of {} seconds",
            ttl, MAX_TTL
        )));
    }
    Ok(())
}

/// 续约间隔：`ttl × 1000 × 4 / 5` 毫秒
pub fn renew_interval(ttl: u64) -> Duration {
    Duration::from_millis(ttl.saturating_mul(1000) / 5 * 4)
}

/// 服务选项
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct ServiceOptions {
    #[serde(default)]
    pub name: String,
    pub version: Option<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl ServiceOptions {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(RegistryError::config("service name can't be empty"));
        }
        Ok(())
    }

    /// 构建不含节点的服务
    pub fn into_service(self) -> Result<Service> {
        self.validate()?;
        let mut service = Service::new(self.name, self.version);
        service.metadata = self.metadata;
        Ok(service)
    }
}

impl Config {
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.registry.validate()?;
        if let Some(service) = &config.service {
            service.validate()?;
        }
        Ok(config)
    }
}
