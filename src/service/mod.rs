//! 服务模型
//!
//! 服务 / 节点 / 端点的数据结构、静态接口描述，以及工厂所需的服务器接口。

pub mod model;
pub mod schema;
pub mod server;

pub use model::{Endpoint, Node, Request, Response, Service, Value};
pub use schema::{
    DescribeService, FieldDescriptor, Message, MessageDescriptor, MethodDescriptor, ServiceClass,
};
pub use server::{ListenPort, RouteTable, RpcServiceTable, ServerKind};
