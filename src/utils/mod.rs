//! 工具函数模块

use std::net::{IpAddr, SocketAddr};

use crate::error::{BackendResultExt, ErrorCode, Result};

/// 本机对外 IP（默认路由所在网卡）
pub fn local_ip() -> Result<IpAddr> {
    local_ip_address::local_ip().or_backend(
        ErrorCode::LocalAddressUnavailable,
        "failed to resolve local IP",
    )
}

/// 拼接 `host:port`，IPv6 地址带方括号
pub fn join_host_port(ip: IpAddr, port: u16) -> String {
    SocketAddr::new(ip, port).to_string()
}

/// 拼接注册键：`<namespace>/<service>/<node>`
pub fn service_key(namespace: &str, service: &str, node_id: &str) -> String {
    format!("{}/{}/{}", namespace, service, node_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    #[test]
    fn test_join_host_port() {
        assert_eq!(
            join_host_port(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 5)), 9501),
            "10.0.0.5:9501"
        );
        assert_eq!(join_host_port(IpAddr::V6(Ipv6Addr::LOCALHOST), 80), "[::1]:80");
    }

    #[test]
    fn test_service_key() {
        assert_eq!(
            service_key("go.micro.srv", "greeter", "greeter-1"),
            "go.micro.srv/greeter/greeter-1"
        );
    }
}
