//! 静态接口描述
//!
//! 服务实现随代码声明自己的方法与消息结构，工厂在注册时读取并校验，
//! 不做运行时反射。

use super::model::{Endpoint, Request, Response, Value};
use crate::error::{ErrorCode, RegistryError, Result};

/// 消息中的一个字段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    pub type_name: String,
    /// 复合类型的子字段
    pub fields: Vec<FieldDescriptor>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            fields: Vec::new(),
        }
    }

    /// 以消息类型作为字段类型，子字段取自该消息
    pub fn message<M: Message>(name: impl Into<String>) -> Self {
        let descriptor = M::descriptor();
        Self {
            name: name.into(),
            type_name: descriptor.type_name,
            fields: descriptor.fields,
        }
    }

    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// 转换为 [`Value`]，叶子字段的 `values` 为空
    pub fn to_value(&self) -> Value {
        Value {
            name: self.name.clone(),
            type_name: self.type_name.clone(),
            values: if self.fields.is_empty() {
                None
            } else {
                Some(self.fields.iter().map(FieldDescriptor::to_value).collect())
            },
        }
    }
}

/// 一个请求或响应消息的结构
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDescriptor {
    /// 完整类型名，如 `php.micro.grpc.greeter.Request`
    pub type_name: String,
    pub fields: Vec<FieldDescriptor>,
}

impl MessageDescriptor {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// 类型名的最后一段
    pub fn short_name(&self) -> &str {
        last_segment(&self.type_name)
    }

    fn values(&self) -> Vec<Value> {
        self.fields.iter().map(FieldDescriptor::to_value).collect()
    }

    /// 作为请求描述，`param` 为方法中请求参数的名称
    pub fn to_request(&self, param: &str) -> Request {
        Request {
            name: param.to_string(),
            type_name: self.type_name.clone(),
            values: self.values(),
        }
    }

    /// 作为响应描述
    pub fn to_response(&self) -> Response {
        Response {
            name: self.short_name().to_string(),
            type_name: self.type_name.clone(),
            values: self.values(),
        }
    }
}

/// 可描述自身结构的消息类型
pub trait Message {
    fn descriptor() -> MessageDescriptor;
}

/// 一个对外暴露的方法
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub name: String,
    /// `(参数名, 消息结构)`
    pub request: Option<(String, MessageDescriptor)>,
    pub response: Option<MessageDescriptor>,
}

impl MethodDescriptor {
    /// 只有名称的方法（JSON-RPC）
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            request: None,
            response: None,
        }
    }

    /// 一元 RPC 方法，请求参数名为 `request`
    pub fn unary<Req: Message, Resp: Message>(name: impl Into<String>) -> Self {
        Self::new(name)
            .with_request("request", Req::descriptor())
            .with_response(Resp::descriptor())
    }

    pub fn with_request(mut self, param: impl Into<String>, message: MessageDescriptor) -> Self {
        self.request = Some((param.into(), message));
        self
    }

    pub fn with_response(mut self, message: MessageDescriptor) -> Self {
        self.response = Some(message);
        self
    }

    /// 以下划线开头的方法视为内部方法，不对外注册
    pub fn is_private(&self) -> bool {
        self.name.starts_with('_')
    }
}

/// 一个服务实现类的描述
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceClass {
    /// 类的 `NAME` 标识，如 `php.micro.grpc.greeter.Say`
    pub name: String,
    pub methods: Vec<MethodDescriptor>,
}

impl ServiceClass {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            methods: Vec::new(),
        }
    }

    pub fn with_method(mut self, method: MethodDescriptor) -> Self {
        self.methods.push(method);
        self
    }

    /// 端点前缀：`NAME` 的最后一段，`NAME` 为空时报配置错误
    pub fn endpoint_prefix(&self) -> Result<&str> {
        let prefix = last_segment(self.name.trim());
        if prefix.is_empty() {
            return Err(RegistryError::service_name_missing(&self.name));
        }
        Ok(prefix)
    }

    /// 公开方法
    pub fn public_methods(&self) -> impl Iterator<Item = &MethodDescriptor> {
        self.methods.iter().filter(|m| !m.is_private())
    }

    /// 生成只有名称的端点（JSON-RPC）
    pub fn named_endpoints(&self) -> Result<Vec<Endpoint>> {
        let prefix = self.endpoint_prefix()?;
        Ok(self
            .public_methods()
            .map(|method| Endpoint::new(format!("{}.{}", prefix, method.name)))
            .collect())
    }

    /// 生成带请求 / 响应描述的端点（gRPC），缺少描述的方法报配置错误
    pub fn typed_endpoints(&self) -> Result<Vec<Endpoint>> {
        let prefix = self.endpoint_prefix()?;
        let mut endpoints = Vec::new();
        for method in self.public_methods() {
            let name = format!("{}.{}", prefix, method.name);
            let (param, request) = method.request.as_ref().ok_or_else(|| {
                RegistryError::config_with(
                    ErrorCode::SchemaMissing,
                    format!("method `{}` declares no request message", name),
                )
            })?;
            let response = method.response.as_ref().ok_or_else(|| {
                RegistryError::config_with(
                    ErrorCode::SchemaMissing,
                    format!("method `{}` declares no response message", name),
                )
            })?;
            endpoints.push(
                Endpoint::new(name)
                    .with_request(request.to_request(param))
                    .with_response(response.to_response()),
            );
        }
        Ok(endpoints)
    }
}

/// 服务实现类型声明自己的 `NAME` 与方法表
///
/// ```rust
/// use micro_registry::service::{DescribeService, MethodDescriptor};
///
/// struct Say;
///
/// impl DescribeService for Say {
///     const NAME: &'static str = "php.micro.jsonrpc.calculator.Say";
///
///     fn methods() -> Vec<MethodDescriptor> {
///         vec![MethodDescriptor::new("Hello")]
///     }
/// }
///
/// assert_eq!(Say::class().endpoint_prefix().unwrap(), "Say");
/// ```
pub trait DescribeService {
    const NAME: &'static str;

    fn methods() -> Vec<MethodDescriptor>;

    fn class() -> ServiceClass {
        ServiceClass {
            name: Self::NAME.to_string(),
            methods: Self::methods(),
        }
    }
}

fn last_segment(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}
