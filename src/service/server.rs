//! 服务器 / 路由协作方接口
//!
//! 工厂只通过这些 trait 读取服务器状态：路由名、RPC 服务表与监听端口。

use super::schema::ServiceClass;

/// 暴露监听端口的服务器
pub trait ListenPort {
    fn port(&self) -> u16;
}

/// 路由表：列出对外暴露的服务 / 路由名
pub trait RouteTable {
    fn services(&self) -> Vec<String>;
}

/// RPC 服务表：服务名 → 实现类列表（保持声明顺序）
pub trait RpcServiceTable {
    fn services(&self) -> Vec<(String, Vec<ServiceClass>)>;
}

/// 服务器类型，决定节点元数据
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerKind {
    /// JSON over HTTP
    Api,
    /// HTML over HTTP
    Web,
    /// gRPC over HTTP/2
    Grpc,
    /// JSON-RPC over TCP
    JsonRpc,
}

impl ServerKind {
    pub fn protocol(&self) -> &'static str {
        match self {
            ServerKind::Api | ServerKind::JsonRpc => "json",
            ServerKind::Web => "html",
            ServerKind::Grpc => "grpc",
        }
    }

    pub fn server(&self) -> &'static str {
        self.protocol()
    }

    pub fn transport(&self) -> &'static str {
        match self {
            ServerKind::JsonRpc => "tcp",
            _ => "http",
        }
    }
}
