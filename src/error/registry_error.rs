//! 注册中心统一错误类型

use super::code::ErrorCode;
use thiserror::Error;

/// 注册中心统一错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// 配置错误（致命，不重试）
    #[error("configuration error [{code}]: {reason}")]
    Config { code: ErrorCode, reason: String },

    /// 续约时发现租约已在后端过期
    #[error("lease {0} not found")]
    LeaseNotFound(i64),

    /// 后端调用失败
    #[error("registry backend error [{code}]: {reason}")]
    Backend { code: ErrorCode, reason: String },

    /// 序列化错误
    #[error("serialization error: {0}")]
    Serialization(String),

    /// IO 错误
    #[error("IO error: {0}")]
    Io(String),
}

impl RegistryError {
    /// 创建配置错误
    pub fn config(reason: impl Into<String>) -> Self {
        Self::config_with(ErrorCode::ConfigurationError, reason)
    }

    /// 创建指定代码的配置错误
    pub fn config_with(code: ErrorCode, reason: impl Into<String>) -> Self {
        RegistryError::Config {
            code,
            reason: reason.into(),
        }
    }

    /// 创建后端错误
    pub fn backend(code: ErrorCode, reason: impl Into<String>) -> Self {
        RegistryError::Backend {
            code,
            reason: reason.into(),
        }
    }

    /// 服务类缺少 NAME 标识
    pub fn service_name_missing(class: impl AsRef<str>) -> Self {
        Self::config_with(
            ErrorCode::ServiceNameMissing,
            format!("NAME of service class `{}` can't be empty", class.as_ref()),
        )
    }

    /// 获取错误代码
    pub fn code(&self) -> ErrorCode {
        match self {
            RegistryError::Config { code, .. } | RegistryError::Backend { code, .. } => *code,
            RegistryError::LeaseNotFound(_) => ErrorCode::LeaseNotFound,
            RegistryError::Serialization(_) => ErrorCode::SerializationError,
            RegistryError::Io(_) => ErrorCode::ConnectionFailed,
        }
    }

    /// 获取错误原因
    pub fn reason(&self) -> String {
        match self {
            RegistryError::Config { reason, .. } | RegistryError::Backend { reason, .. } => {
                reason.clone()
            }
            RegistryError::LeaseNotFound(id) => format!("lease {} not found", id),
            RegistryError::Serialization(msg) | RegistryError::Io(msg) => msg.clone(),
        }
    }

    /// 是否为租约过期
    pub fn is_lease_not_found(&self) -> bool {
        matches!(self, RegistryError::LeaseNotFound(_))
    }

    /// 是否为配置错误
    pub fn is_config(&self) -> bool {
        matches!(self, RegistryError::Config { .. })
    }

    /// 判断是否为可重试的错误
    pub fn is_retryable(&self) -> bool {
        self.code().is_retryable()
    }
}

/// 结果类型别名
pub type Result<T> = std::result::Result<T, RegistryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_name_missing_is_config_error() {
        let err = RegistryError::service_name_missing("GreeterHandler");
        assert!(err.is_config());
        assert_eq!(err.code(), ErrorCode::ServiceNameMissing);
        assert!(err.to_string().contains("GreeterHandler"));
    }

    #[test]
    fn test_lease_not_found() {
        let err = RegistryError::LeaseNotFound(7);
        assert!(err.is_lease_not_found());
        assert!(!err.is_retryable());
        assert_eq!(err.to_string(), "lease 7 not found");
    }

    #[test]
    fn test_backend_error_retryable() {
        let err = RegistryError::backend(ErrorCode::BackendUnavailable, "etcd down");
        assert!(err.is_retryable());
        assert_eq!(err.reason(), "etcd down");
    }
}
