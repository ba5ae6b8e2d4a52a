//! 服务描述定义
//!
//! 发布到注册中心的 JSON 结构：服务 → 节点 / 端点 → 请求 / 响应 → 字段。

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{ErrorCode, RegistryError, Result};

/// 请求 / 响应中的一个字段（可递归嵌套）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Value {
    pub name: String,

    #[serde(rename = "type")]
    pub type_name: String,

    /// 复合类型的子字段，标量为 `None`
    #[serde(default)]
    pub values: Option<Vec<Value>>,
}

impl Value {
    /// 创建标量字段
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            values: None,
        }
    }

    /// 追加子字段
    pub fn with_added_value(mut self, value: Value) -> Self {
        self.values.get_or_insert_with(Vec::new).push(value);
        self
    }
}

/// RPC 请求描述
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Request {
    pub name: String,

    #[serde(rename = "type")]
    pub type_name: String,

    #[serde(default)]
    pub values: Vec<Value>,
}

impl Request {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            values: Vec::new(),
        }
    }

    pub fn with_added_value(mut self, value: Value) -> Self {
        self.values.push(value);
        self
    }
}

/// RPC 响应描述
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Response {
    pub name: String,

    #[serde(rename = "type")]
    pub type_name: String,

    #[serde(default)]
    pub values: Vec<Value>,
}

impl Response {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            values: Vec::new(),
        }
    }

    pub fn with_added_value(mut self, value: Value) -> Self {
        self.values.push(value);
        self
    }
}

/// 一个可调用的 RPC 方法
///
/// 名称格式为 `<ClassName>.<Method>`。JSON-RPC 端点不携带请求 / 响应描述。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Endpoint {
    pub name: String,

    #[serde(default)]
    pub request: Option<Request>,

    #[serde(default)]
    pub response: Option<Response>,
}

impl Endpoint {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            request: None,
            response: None,
        }
    }

    pub fn with_request(mut self, request: Request) -> Self {
        self.request = Some(request);
        self
    }

    pub fn with_response(mut self, response: Response) -> Self {
        self.response = Some(response);
        self
    }
}

/// 服务的一个可访问实例
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Node {
    /// 节点 ID（在同一服务内唯一）
    pub id: String,

    /// `host:port`
    pub address: String,

    /// 元数据：`registry` / `protocol` / `server` / `transport`
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl Node {
    pub fn new(id: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            address: address.into(),
            metadata: BTreeMap::new(),
        }
    }

    /// 以 `<name>-<uuid>` 生成节点 ID
    pub fn generate(name: &str, address: impl Into<String>) -> Self {
        Self::new(format!("{}-{}", name, uuid::Uuid::new_v4()), address)
    }

    /// 设置元数据（同名键覆盖）
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// 一个逻辑微服务
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Service {
    pub name: String,

    #[serde(default)]
    pub version: Option<String>,

    #[serde(default)]
    pub metadata: BTreeMap<String, String>,

    #[serde(default)]
    pub nodes: Vec<Node>,

    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
}

impl Service {
    /// 创建新的服务
    pub fn new(name: impl Into<String>, version: Option<String>) -> Self {
        Self {
            name: name.into(),
            version,
            metadata: BTreeMap::new(),
            nodes: Vec::new(),
            endpoints: Vec::new(),
        }
    }

    /// 设置元数据
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// 添加节点
    pub fn with_added_node(mut self, node: Node) -> Self {
        self.nodes.push(node);
        self
    }

    /// 添加端点
    pub fn with_added_endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoints.push(endpoint);
        self
    }

    /// 服务实例 ID，即第一个节点的 ID
    pub fn id(&self) -> Result<&str> {
        self.nodes.first().map(|node| node.id.as_str()).ok_or_else(|| {
            RegistryError::config_with(
                ErrorCode::NodeMissing,
                format!("service `{}` has no node", self.name),
            )
        })
    }

    /// 规范 JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(data: &str) -> Result<Self> {
        serde_json::from_str(data).map_err(|e| {
            RegistryError::Serialization(format!("invalid service descriptor: {}", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn greeter() -> Service {
        let request = Request::new("request", "php.micro.grpc.greeter.Request").with_added_value(
            Value::new("name", "string"),
        );
        let response = Response::new("Response", "php.micro.grpc.greeter.Response")
            .with_added_value(
                Value::new("user", "User")
                    .with_added_value(Value::new("id", "int64"))
                    .with_added_value(Value::new("tags", "string")),
            );

        Service::new("go.micro.srv.greeter", Some("latest".to_string()))
            .with_metadata("owner", "im")
            .with_added_node(
                Node::new("greeter-1", "10.0.0.5:9595")
                    .with_metadata("registry", "etcd")
                    .with_metadata("protocol", "grpc")
                    .with_metadata("server", "grpc")
                    .with_metadata("transport", "http"),
            )
            .with_added_node(Node::new("greeter-2", "10.0.0.6:9595"))
            .with_added_endpoint(
                Endpoint::new("Say.Hello")
                    .with_request(request)
                    .with_response(response),
            )
            .with_added_endpoint(Endpoint::new("Say.Stream"))
    }

    #[test]
    fn test_json_round_trip_preserves_service() {
        let service = greeter();
        let json = service.to_json().unwrap();
        let decoded = Service::from_json(&json).unwrap();
        assert_eq!(decoded, service);
        assert_eq!(decoded.nodes[1].id, "greeter-2");
        assert_eq!(decoded.endpoints[1].name, "Say.Stream");
    }

    #[test]
    fn test_json_field_names_are_stable() {
        let json: serde_json::Value =
            serde_json::from_str(&greeter().to_json().unwrap()).unwrap();
        assert_eq!(json["name"], "go.micro.srv.greeter");
        assert_eq!(json["version"], "latest");
        assert_eq!(json["nodes"][0]["address"], "10.0.0.5:9595");
        assert_eq!(json["nodes"][0]["metadata"]["registry"], "etcd");
        let request = &json["endpoints"][0]["request"];
        assert_eq!(request["type"], "php.micro.grpc.greeter.Request");
        assert_eq!(request["values"][0]["name"], "name");
        assert!(request["values"][0]["values"].is_null());
        assert_eq!(
            json["endpoints"][0]["response"]["values"][0]["values"][1]["name"],
            "tags"
        );
        assert!(json["endpoints"][1]["request"].is_null());
    }

    #[test]
    fn test_service_id_is_first_node() {
        let service = greeter();
        assert_eq!(service.id().unwrap(), "greeter-1");

        let bare = Service::new("empty", None);
        let err = bare.id().unwrap_err();
        assert_eq!(err.code(), ErrorCode::NodeMissing);
    }

    #[test]
    fn test_generated_node_id_prefix() {
        let a = Node::generate("greeter", "127.0.0.1:80");
        let b = Node::generate("greeter", "127.0.0.1:80");
        assert!(a.id.starts_with("greeter-"));
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_metadata_keys_unique() {
        let node = Node::new("n", "h:1")
            .with_metadata("protocol", "json")
            .with_metadata("protocol", "grpc");
        assert_eq!(node.metadata.len(), 1);
        assert_eq!(node.metadata["protocol"], "grpc");
    }
}
