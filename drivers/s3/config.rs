//! S3驱动配置

use crate::config::ConnectorConfig;

/// S3配置
#[derive(Clone)]
pub struct S3Config {
    /// 完整端点URL（含协议）
    /// MinIO: http://localhost:9000
    pub endpoint: String,
    /// 区域
    pub region: String,
    /// Access Key ID
    pub access_key_id: String,
    /// Secret Access Key
    pub secret_access_key: String,
    /// 强制使用路径风格（而非虚拟主机风格）
    /// MinIO等需要设置为true
    pub force_path_style: bool,
}

impl From<&ConnectorConfig> for S3Config {
    fn from(config: &ConnectorConfig) -> Self {
        Self {
            endpoint: config.endpoint_url(),
            region: config.region.clone(),
            access_key_id: config.access_key.clone(),
            secret_access_key: config.secret_key.clone(),
            force_path_style: true,
        }
    }
}
