//! Micro Registry
//!
//! 基于 etcd 租约的微服务注册：从服务器的路由 / RPC 服务表构建服务描述，
//! 以租约发布到注册中心，周期续约，并在租约过期后自动重新注册。
//!
//! ```rust,no_run
//! use micro_registry::{RegistryConfig, ServiceFactory, ServiceRegistry, create_client};
//! # use micro_registry::service::{ListenPort, RouteTable};
//! # struct Api;
//! # impl ListenPort for Api { fn port(&self) -> u16 { 8080 } }
//! # impl RouteTable for Api { fn services(&self) -> Vec<String> { vec!["user".into()] } }
//!
//! # async fn example() -> micro_registry::Result<()> {
//! let config = RegistryConfig::default();
//! let client = create_client(&config).await?;
//!
//! let services = ServiceFactory::new().create_services_from_api(&Api, None, "micro.api", None)?;
//! let mut registry = ServiceRegistry::new(client, config)?;
//! registry.register_all(services).await?;
//!
//! // ... serve traffic ...
//!
//! registry.deregister_all().await;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod factory;
pub mod logging;
pub mod registrar;
pub mod registry;
pub mod service;
pub mod utils;

// Re-exports
pub use config::{Config, RegistryConfig, ServiceOptions};
pub use error::{ErrorCategory, ErrorCode, RegistryError, Result};
pub use factory::ServiceFactory;
pub use registrar::{Registrar, RegistrarState, RenewalEvent, ServiceRegistry};
pub use registry::{LeaseId, MemoryRegistryClient, RegistryClient, create_client};
#[cfg(feature = "etcd")]
pub use registry::EtcdRegistryClient;
pub use service::{Endpoint, Node, Request, Response, Service, Value};
