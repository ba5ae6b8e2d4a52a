//! 错误处理模块
//!
//! 区分四类错误：配置错误（致命）、租约过期（注册器内部恢复）、
//! 后端错误（抛给调用方）、清理错误（注销时静默丢弃）。

pub mod code;
pub mod conversions;
pub mod registry_error;

pub use code::{ErrorCategory, ErrorCode};
pub use registry_error::{RegistryError, Result};

/// 将任意错误转换为指定代码的后端错误
pub fn map_backend_error<E, S>(error: E, code: ErrorCode, message: S) -> RegistryError
where
    E: std::fmt::Display,
    S: Into<String>,
{
    RegistryError::backend(code, format!("{}: {}", message.into(), error))
}

/// `Result` 的辅助扩展，用于把外部错误快速转换为后端错误
pub trait BackendResultExt<T> {
    fn or_backend<S>(self, code: ErrorCode, message: S) -> Result<T>
    where
        S: Into<String>;
}

impl<T, E> BackendResultExt<T> for std::result::Result<T, E>
where
    E: std::fmt::Display,
{
    fn or_backend<S>(self, code: ErrorCode, message: S) -> Result<T>
    where
        S: Into<String>,
    {
        self.map_err(|err| map_backend_error(err, code, message))
    }
}
