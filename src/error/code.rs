//! 错误代码和错误类别定义

use serde::{Deserialize, Serialize};
use std::fmt;

/// 错误代码枚举
///
/// 错误代码按类别分组，每个类别占用1000个代码范围：
/// - 1000-1999: 配置相关错误
/// - 2000-2999: 租约相关错误
/// - 3000-3999: 注册中心后端 / 连接相关错误
/// - 4000-4999: 序列化相关错误
/// - 9000-9999: 通用错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u32)]
pub enum ErrorCode {
    // ============================================================
    // 配置相关错误 (1000-1999)
    // ============================================================
    ConfigurationError = 1000,
    ServiceNameMissing = 1001,
    SchemaMissing = 1002,
    NodeMissing = 1003,

    // ============================================================
    // 租约相关错误 (2000-2999)
    // ============================================================
    LeaseNotFound = 2000,
    LeaseGrantFailed = 2001,
    LeaseKeepAliveFailed = 2002,
    LeaseRevokeFailed = 2003,

    // ============================================================
    // 后端相关错误 (3000-3999)
    // ============================================================
    ConnectionFailed = 3000,
    ConnectionTimeout = 3001,
    BackendUnavailable = 3002,
    PutFailed = 3003,
    LocalAddressUnavailable = 3004,

    // ============================================================
    // 序列化相关错误 (4000-4999)
    // ============================================================
    SerializationError = 4000,
    DeserializationError = 4001,

    // ============================================================
    // 通用错误 (9000-9999)
    // ============================================================
    GeneralError = 9000,
    UnknownError = 9999,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ErrorCode {
    /// 获取错误代码的数字值
    #[inline]
    pub fn as_u32(&self) -> u32 {
        *self as u32
    }

    /// 从数字值创建错误代码
    pub fn from_u32(code: u32) -> Option<Self> {
        match code {
            1000 => Some(ErrorCode::ConfigurationError),
            1001 => Some(ErrorCode::ServiceNameMissing),
            1002 => Some(ErrorCode::SchemaMissing),
            1003 => Some(ErrorCode::NodeMissing),
            2000 => Some(ErrorCode::LeaseNotFound),
            2001 => Some(ErrorCode::LeaseGrantFailed),
            2002 => Some(ErrorCode::LeaseKeepAliveFailed),
            2003 => Some(ErrorCode::LeaseRevokeFailed),
            3000 => Some(ErrorCode::ConnectionFailed),
            3001 => Some(ErrorCode::ConnectionTimeout),
            3002 => Some(ErrorCode::BackendUnavailable),
            3003 => Some(ErrorCode::PutFailed),
            3004 => Some(ErrorCode::LocalAddressUnavailable),
            4000 => Some(ErrorCode::SerializationError),
            4001 => Some(ErrorCode::DeserializationError),
            9000 => Some(ErrorCode::GeneralError),
            9999 => Some(ErrorCode::UnknownError),
            _ => None,
        }
    }

    /// 获取错误代码的英文标识符
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ConfigurationError => "CONFIGURATION_ERROR",
            ErrorCode::ServiceNameMissing => "SERVICE_NAME_MISSING",
            ErrorCode::SchemaMissing => "SCHEMA_MISSING",
            ErrorCode::NodeMissing => "NODE_MISSING",
            ErrorCode::LeaseNotFound => "LEASE_NOT_FOUND",
            ErrorCode::LeaseGrantFailed => "LEASE_GRANT_FAILED",
            ErrorCode::LeaseKeepAliveFailed => "LEASE_KEEP_ALIVE_FAILED",
            ErrorCode::LeaseRevokeFailed => "LEASE_REVOKE_FAILED",
            ErrorCode::ConnectionFailed => "CONNECTION_FAILED",
            ErrorCode::ConnectionTimeout => "CONNECTION_TIMEOUT",
            ErrorCode::BackendUnavailable => "BACKEND_UNAVAILABLE",
            ErrorCode::PutFailed => "PUT_FAILED",
            ErrorCode::LocalAddressUnavailable => "LOCAL_ADDRESS_UNAVAILABLE",
            ErrorCode::SerializationError => "SERIALIZATION_ERROR",
            ErrorCode::DeserializationError => "DESERIALIZATION_ERROR",
            ErrorCode::GeneralError => "GENERAL_ERROR",
            ErrorCode::UnknownError => "UNKNOWN_ERROR",
        }
    }

    /// 获取错误代码的类别
    pub fn category(&self) -> ErrorCategory {
        match self.as_u32() {
            1000..=1999 => ErrorCategory::Configuration,
            2000..=2999 => ErrorCategory::Lease,
            3000..=3999 => ErrorCategory::Backend,
            4000..=4999 => ErrorCategory::Serialization,
            _ => ErrorCategory::General,
        }
    }

    /// 判断是否为可重试的错误
    ///
    /// 租约丢失不在此列：它由注册器内部通过重新注册处理。
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ErrorCode::ConnectionFailed
                | ErrorCode::ConnectionTimeout
                | ErrorCode::BackendUnavailable
                | ErrorCode::LeaseGrantFailed
                | ErrorCode::PutFailed
        )
    }
}

/// 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    Configuration,
    Lease,
    Backend,
    Serialization,
    General,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Configuration => write!(f, "CONFIGURATION"),
            ErrorCategory::Lease => write!(f, "LEASE"),
            ErrorCategory::Backend => write!(f, "BACKEND"),
            ErrorCategory::Serialization => write!(f, "SERIALIZATION"),
            ErrorCategory::General => write!(f, "GENERAL"),
        }
    }
}
