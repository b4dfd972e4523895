//! Connector configuration module / 连接器配置模块
//!
//! Resolves the connection settings once, at construction time, from explicit
//! overrides and an injectable variable lookup (the process environment by default).
//! 在构造时一次性解析连接配置

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utils::endpoint_url;

pub const ENV_ENDPOINT: &str = "MINIO_ENDPOINT";
pub const ENV_ACCESS_KEY: &str = "MINIO_ACCESS_KEY";
pub const ENV_SECRET_KEY: &str = "MINIO_SECRET_KEY";
pub const ENV_SECURE: &str = "MINIO_SECURE";
pub const ENV_REGION: &str = "MINIO_REGION";

pub const DEFAULT_ENDPOINT: &str = "localhost:9000";
pub const DEFAULT_ACCESS_KEY: &str = "admin";
pub const DEFAULT_SECRET_KEY: &str = "password123";
pub const DEFAULT_REGION: &str = "us-east-1";

/// Explicit overrides; anything left `None` (or empty) falls back to the environment
/// 显式配置项，未设置时回退到环境变量
#[derive(Debug, Clone, Default)]
pub struct ConnectorOptions {
    pub endpoint: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub secure: Option<bool>,
    pub region: Option<String>,
}

impl ConnectorOptions {
    pub fn endpoint(mut self, val: &str) -> Self {
        self.endpoint = Some(val.to_string());
        self
    }

    pub fn credentials(mut self, access_key: &str, secret_key: &str) -> Self {
        self.access_key = Some(access_key.to_string());
        self.secret_key = Some(secret_key.to_string());
        self
    }

    pub fn secure(mut self, val: bool) -> Self {
        self.secure = Some(val);
        self
    }

    pub fn region(mut self, val: &str) -> Self {
        self.region = Some(val.to_string());
        self
    }
}

/// Resolved connection configuration / 解析后的连接配置
#[derive(Clone, Serialize, Deserialize)]
pub struct ConnectorConfig {
    /// host:port of the storage service / 存储服务地址
    pub endpoint: String,
    /// Access key / 访问密钥ID
    pub access_key: String,
    /// Secret key, never serialized / 访问密钥
    #[serde(skip_serializing, default)]
    pub secret_key: String,
    /// Use TLS / 是否启用TLS
    #[serde(default)]
    pub secure: bool,
    #[serde(default = "default_region")]
    pub region: String,
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self::resolve(ConnectorOptions::default(), |_| None)
    }
}

impl fmt::Debug for ConnectorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectorConfig")
            .field("endpoint", &self.endpoint)
            .field("access_key", &self.access_key)
            .field("secret_key", &"***")
            .field("secure", &self.secure)
            .field("region", &self.region)
            .finish()
    }
}

impl ConnectorConfig {
    /// Resolve from overrides and a variable lookup / 从显式配置和变量查找函数解析
    pub fn resolve<F>(options: ConnectorOptions, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let pick = |explicit: Option<String>, var: &str, default: &str| -> String {
            explicit
                .filter(|v| !v.is_empty())
                .or_else(|| lookup(var))
                .unwrap_or_else(|| default.to_string())
        };

        let endpoint = pick(options.endpoint, ENV_ENDPOINT, DEFAULT_ENDPOINT);
        let access_key = pick(options.access_key, ENV_ACCESS_KEY, DEFAULT_ACCESS_KEY);
        let secret_key = pick(options.secret_key, ENV_SECRET_KEY, DEFAULT_SECRET_KEY);
        let region = pick(options.region, ENV_REGION, DEFAULT_REGION);
        let secure = match options.secure {
            Some(secure) => secure,
            None => lookup(ENV_SECURE)
                .map(|v| v.trim().eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        };

        Self {
            endpoint,
            access_key,
            secret_key,
            secure,
            region,
        }
    }

    /// Resolve against the process environment / 从进程环境变量解析
    pub fn from_env(options: ConnectorOptions) -> Self {
        Self::resolve(options, |key| std::env::var(key).ok())
    }

    /// Full endpoint URL including the scheme / 包含协议的完整端点URL
    pub fn endpoint_url(&self) -> String {
        endpoint_url(&self.endpoint, self.secure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ConnectorConfig::resolve(ConnectorOptions::default(), env(&[]));
        assert_eq!(config.endpoint, "localhost:9000");
        assert_eq!(config.access_key, "admin");
        assert_eq!(config.secret_key, "password123");
        assert!(!config.secure);
        assert_eq!(config.region, "us-east-1");
        assert_eq!(config.endpoint_url(), "http://localhost:9000");
    }

    #[test]
    fn test_environment_overrides_defaults() {
        let lookup = env(&[
            (ENV_ENDPOINT, "minio.internal:9100"),
            (ENV_ACCESS_KEY, "ak"),
            (ENV_SECRET_KEY, "sk"),
            (ENV_SECURE, "TRUE"),
        ]);
        let config = ConnectorConfig::resolve(ConnectorOptions::default(), lookup);
        assert_eq!(config.endpoint, "minio.internal:9100");
        assert_eq!(config.access_key, "ak");
        assert_eq!(config.secret_key, "sk");
        assert!(config.secure);
        assert_eq!(config.endpoint_url(), "https://minio.internal:9100");
    }

    #[test]
    fn test_explicit_wins_and_empty_falls_back() {
        let lookup = env(&[(ENV_ENDPOINT, "from-env:9000"), (ENV_SECURE, "true")]);
        let options = ConnectorOptions::default()
            .endpoint("")
            .credentials("explicit", "secret")
            .secure(false);
        let config = ConnectorConfig::resolve(options, lookup);
        assert_eq!(config.endpoint, "from-env:9000");
        assert_eq!(config.access_key, "explicit");
        assert!(!config.secure);
    }

    #[test]
    fn test_secure_flag_only_true_enables() {
        for value in ["false", "1", "yes", ""] {
            let config = ConnectorConfig::resolve(ConnectorOptions::default(), env(&[(ENV_SECURE, value)]));
            assert!(!config.secure, "value {:?} must not enable TLS", value);
        }
    }

    #[test]
    fn test_debug_hides_secret() {
        let config = ConnectorConfig::default();
        let printed = format!("{:?}", config);
        assert!(!printed.contains("password123"));
    }
}
