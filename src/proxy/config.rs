use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::proxy::common::utils::generate_random_secret;

/// 监听协议
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ListenProtocol {
    #[default]
    #[serde(alias = "HTTP")]
    Http,
    #[serde(alias = "HTTPS")]
    Https,
}

/// 反代服务监听配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// 监听协议 (http / https)
    pub protocol: ListenProtocol,

    /// 是否允许局域网访问
    /// - false: 仅本机访问 127.0.0.1
    /// - true: 允许局域网访问 0.0.0.0（默认，门禁终端需要从局域网调用）
    pub allow_lan_access: bool,

    /// 监听端口
    pub port: u16,

    /// HTTPS 证书 (相对路径基于程序目录)
    pub cert_file: PathBuf,

    /// HTTPS 私钥
    pub key_file: PathBuf,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            protocol: ListenProtocol::Http,
            allow_lan_access: true,
            port: 8000,
            cert_file: PathBuf::from("cert.pem"),
            key_file: PathBuf::from("key.pem"),
        }
    }
}

impl ProxyConfig {
    /// 获取实际的监听地址
    /// - allow_lan_access = false: 返回 "127.0.0.1"
    /// - allow_lan_access = true: 返回 "0.0.0.0"
    pub fn get_bind_address(&self) -> &str {
        if self.allow_lan_access {
            "0.0.0.0"
        } else {
            "127.0.0.1"
        }
    }
}

/// 上游 VMS (Artemis) 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// 上游地址, 包含网关前缀, 例如 https://192.168.1.100:443/artemis
    pub host: String,

    /// 单次上游请求超时时间(秒)
    pub request_timeout_secs: u64,

    /// 跳过上游 TLS 证书校验。
    /// VMS 一体机通常使用自签名证书, 需由运维显式开启。
    pub accept_invalid_certs: bool,

    /// 上游代理配置
    pub proxy: UpstreamProxyConfig,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            host: "https://192.168.1.100:443/artemis".to_string(),
            request_timeout_secs: default_request_timeout(),
            accept_invalid_certs: false,
            proxy: UpstreamProxyConfig::default(),
        }
    }
}

/// 上游代理配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct UpstreamProxyConfig {
    /// 是否启用
    pub enabled: bool,
    /// 代理地址 (http://, https://, socks5://)
    pub url: String,
}

/// 会话令牌配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// HS256 签名密钥
    pub jwt_secret: String,

    /// 令牌有效期(分钟)
    pub token_ttl_minutes: i64,

    /// 登录用户名
    pub username: String,

    /// 登录口令
    pub password: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            jwt_secret: generate_random_secret(48),
            token_ttl_minutes: 30,
            username: "vms_admin".to_string(),
            password: generate_random_secret(16),
        }
    }
}

fn default_request_timeout() -> u64 {
    5 // 一个不可达的候选路径不能拖住整个请求
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_address() {
        let mut config = ProxyConfig::default();
        assert_eq!(config.get_bind_address(), "0.0.0.0");
        config.allow_lan_access = false;
        assert_eq!(config.get_bind_address(), "127.0.0.1");
    }

    #[test]
    fn test_protocol_accepts_upper_case() {
        let config: ProxyConfig = serde_json::from_str(r#"{"protocol":"HTTPS"}"#).unwrap();
        assert_eq!(config.protocol, ListenProtocol::Https);
        assert_eq!(config.port, 8000);
    }

    #[test]
    fn test_upstream_defaults_verify_tls() {
        let config: UpstreamConfig = serde_json::from_str("{}").unwrap();
        assert!(!config.accept_invalid_certs);
        assert_eq!(config.request_timeout_secs, 5);
    }

    #[test]
    fn test_session_defaults_are_random() {
        let a = SessionConfig::default();
        let b = SessionConfig::default();
        assert_ne!(a.jwt_secret, b.jwt_secret);
        assert_eq!(a.password.len(), 16);
    }
}
