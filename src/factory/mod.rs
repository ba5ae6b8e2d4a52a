//! 服务工厂
//!
//! 在注册时读取服务器的路由表 / RPC 服务表，构建待发布的 [`Service`] 列表。
//! 每个服务只生成一个节点（一个进程即一个节点）。

use std::net::IpAddr;
use tracing::debug;

use crate::error::{RegistryError, Result};
use crate::service::{ListenPort, Node, RouteTable, RpcServiceTable, ServerKind, Service};
use crate::utils::{join_host_port, local_ip};

/// API 服务默认命名空间
pub const DEFAULT_API_NAMESPACE: &str = "micro.api";

/// Web 服务默认命名空间
pub const DEFAULT_WEB_NAMESPACE: &str = "micro.web";

/// 节点元数据中的注册中心标识
pub const REGISTRY_NAME: &str = "etcd";

/// 服务工厂
#[derive(Debug, Clone, Default)]
pub struct ServiceFactory {
    host: Option<IpAddr>,
}

impl ServiceFactory {
    /// 创建工厂，节点地址使用本机 IP
    pub fn new() -> Self {
        Self::default()
    }

    /// 指定节点地址使用的 IP
    pub fn with_host(mut self, host: IpAddr) -> Self {
        self.host = Some(host);
        self
    }

    /// 创建服务
    pub fn create_service(&self, name: impl Into<String>, version: Option<&str>) -> Service {
        Service::new(name, version.map(str::to_string))
    }

    /// 从 HTTP 服务器创建服务（JSON API）
    pub fn create_services_from_api<S>(
        &self,
        server: &S,
        router: Option<&dyn RouteTable>,
        namespace: &str,
        version: Option<&str>,
    ) -> Result<Vec<Service>>
    where
        S: ListenPort + RouteTable,
    {
        self.create_services_from_http(ServerKind::Api, server, router, namespace, version)
    }

    /// 从 HTTP 服务器创建服务（HTML Web）
    pub fn create_services_from_web<S>(
        &self,
        server: &S,
        router: Option<&dyn RouteTable>,
        namespace: &str,
        version: Option<&str>,
    ) -> Result<Vec<Service>>
    where
        S: ListenPort + RouteTable,
    {
        self.create_services_from_http(ServerKind::Web, server, router, namespace, version)
    }

    /// 从 HTTP 服务器创建服务
    ///
    /// 路由器存在时读取路由器的服务名，否则读取服务器自身的；
    /// 每个名字生成一个名为 `<namespace>.<name>` 的服务。
    pub fn create_services_from_http<S>(
        &self,
        kind: ServerKind,
        server: &S,
        router: Option<&dyn RouteTable>,
        namespace: &str,
        version: Option<&str>,
    ) -> Result<Vec<Service>>
    where
        S: ListenPort + RouteTable,
    {
        if !matches!(kind, ServerKind::Api | ServerKind::Web) {
            return Err(RegistryError::config(format!(
                "{:?} is not an HTTP server kind",
                kind
            )));
        }

        let names = match router {
            Some(router) => router.services(),
            None => server.services(),
        };
        let address = self.address(server.port())?;

        let services = names
            .iter()
            .map(|name| {
                let service =
                    self.create_service(format!("{}.{}", namespace, name), version);
                service.with_added_node(node(kind, name, &address))
            })
            .collect::<Vec<_>>();

        debug!(
            kind = ?kind,
            namespace = %namespace,
            count = services.len(),
            "Services created from HTTP server"
        );
        Ok(services)
    }

    /// 从 gRPC 服务器创建服务
    ///
    /// 每个公开方法生成带请求 / 响应描述的端点；任一实现类缺少 `NAME`
    /// 或方法缺少消息描述都会使整个调用失败。
    pub fn create_services_from_grpc<S>(&self, server: &S, version: Option<&str>) -> Result<Vec<Service>>
    where
        S: ListenPort + RpcServiceTable,
    {
        self.create_rpc_services(ServerKind::Grpc, server, version)
    }

    /// 从 JSON-RPC 服务器创建服务，端点只记录名称
    pub fn create_services_from_json_rpc<S>(
        &self,
        server: &S,
        version: Option<&str>,
    ) -> Result<Vec<Service>>
    where
        S: ListenPort + RpcServiceTable,
    {
        self.create_rpc_services(ServerKind::JsonRpc, server, version)
    }

    fn create_rpc_services<S>(
        &self,
        kind: ServerKind,
        server: &S,
        version: Option<&str>,
    ) -> Result<Vec<Service>>
    where
        S: ListenPort + RpcServiceTable,
    {
        let address = self.address(server.port())?;
        let mut services = Vec::new();

        for (name, classes) in server.services() {
            let mut service = self.create_service(name.as_str(), version);
            for class in &classes {
                let endpoints = match kind {
                    ServerKind::Grpc => class.typed_endpoints()?,
                    _ => class.named_endpoints()?,
                };
                for endpoint in endpoints {
                    service = service.with_added_endpoint(endpoint);
                }
            }
            services.push(service.with_added_node(node(kind, &name, &address)));
        }

        debug!(kind = ?kind, count = services.len(), "Services created from RPC server");
        Ok(services)
    }

    fn address(&self, port: u16) -> Result<String> {
        let ip = match self.host {
            Some(ip) => ip,
            None => local_ip()?,
        };
        Ok(join_host_port(ip, port))
    }
}

fn node(kind: ServerKind, name: &str, address: &str) -> Node {
    Node::generate(name, address)
        .with_metadata("registry", REGISTRY_NAME)
        .with_metadata("protocol", kind.protocol())
        .with_metadata("server", kind.server())
        .with_metadata("transport", kind.transport())
}
