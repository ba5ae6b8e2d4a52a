//! 错误类型转换实现

use super::{ErrorCode, RegistryError};
use std::io;

impl From<io::Error> for RegistryError {
    fn from(err: io::Error) -> Self {
        RegistryError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for RegistryError {
    fn from(err: serde_json::Error) -> Self {
        RegistryError::Serialization(format!("JSON error: {}", err))
    }
}

impl From<toml::de::Error> for RegistryError {
    fn from(err: toml::de::Error) -> Self {
        RegistryError::config(format!("invalid TOML: {}", err))
    }
}

#[cfg(feature = "etcd")]
impl From<etcd_client::Error> for RegistryError {
    fn from(err: etcd_client::Error) -> Self {
        match err {
            etcd_client::Error::GRpcStatus(status) => {
                let message = status.message().to_string();
                let code = match status.code() {
                    tonic::Code::Unavailable => ErrorCode::BackendUnavailable,
                    tonic::Code::DeadlineExceeded => ErrorCode::ConnectionTimeout,
                    _ => ErrorCode::GeneralError,
                };
                RegistryError::backend(code, message)
            }
            etcd_client::Error::TransportError(e) => {
                RegistryError::backend(ErrorCode::ConnectionFailed, e.to_string())
            }
            etcd_client::Error::IoError(e) => RegistryError::Io(e.to_string()),
            other => RegistryError::backend(ErrorCode::UnknownError, other.to_string()),
        }
    }
}

/// 将 etcd 错误映射为注册中心错误，识别租约不存在的状态
///
/// etcd 在租约过期后：续约响应的 TTL 为 0（客户端报 `LeaseKeepAliveError`），
/// 撤销则返回 `NotFound` 状态 "etcdserver: requested lease not found"。
#[cfg(feature = "etcd")]
pub(crate) fn map_lease_error(err: etcd_client::Error, lease_id: i64) -> RegistryError {
    let lease_gone = match &err {
        etcd_client::Error::LeaseKeepAliveError(msg) => msg.contains("not found"),
        etcd_client::Error::GRpcStatus(status) => {
            status.code() == tonic::Code::NotFound && status.message().contains("lease")
        }
        _ => false,
    };
    if lease_gone {
        return RegistryError::LeaseNotFound(lease_id);
    }
    RegistryError::from(err)
}
