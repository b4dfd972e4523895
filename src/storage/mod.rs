use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use crate::config::ConnectorConfig;

/// Object metadata snapshot (fetched fresh on every request) / 对象元数据快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectMetadata {
    /// Object key / 对象键
    pub name: String,
    /// Size in bytes / 大小（字节）
    pub size: u64,
    /// Last modified time / 最后修改时间
    pub last_modified: Option<DateTime<Utc>>,
    /// Content type / 内容类型
    pub content_type: Option<String>,
    /// Integrity tag (ETag) / 完整性标签
    pub etag: Option<String>,
    /// Custom user metadata / 自定义元数据
    #[serde(default)]
    pub custom: BTreeMap<String, String>,
}

/// Storage session interface (only remote primitives, no validation) / 存储会话接口
///
/// Every method is one call against the storage service. Errors are returned as-is;
/// translating them into [`crate::error::StorageError`] is the connector's job.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store name / 存储名称
    fn name(&self) -> &str;

    /// List bucket names in service order / 列出存储桶
    async fn list_buckets(&self) -> Result<Vec<String>>;

    /// Check whether a bucket exists / 检查存储桶是否存在
    async fn bucket_exists(&self, bucket: &str) -> Result<bool>;

    /// Create a bucket / 创建存储桶
    async fn make_bucket(&self, bucket: &str) -> Result<()>;

    /// Upload a local file, returns the stored key / 上传本地文件
    async fn put_object_from_file(&self, bucket: &str, key: &str, file: &Path) -> Result<String>;

    /// List keys at the top level of a bucket / 列出存储桶顶层对象
    async fn list_objects(&self, bucket: &str) -> Result<Vec<String>>;

    /// Write an object into a local file / 下载对象到本地文件
    async fn get_object_to_file(&self, bucket: &str, key: &str, file: &Path) -> Result<()>;

    /// Fetch object metadata / 获取对象元数据
    async fn stat_object(&self, bucket: &str, key: &str) -> Result<ObjectMetadata>;

    /// Delete an object / 删除对象
    async fn remove_object(&self, bucket: &str, key: &str) -> Result<()>;

    /// Delete a bucket / 删除存储桶
    async fn remove_bucket(&self, bucket: &str) -> Result<()>;

    /// Signed GET URL valid for `expiry_secs` / 生成预签名下载URL
    async fn presigned_get(&self, bucket: &str, key: &str, expiry_secs: u32) -> Result<String>;
}

/// Store factory trait / 存储工厂 trait
pub trait StoreFactory: Send + Sync {
    /// Store type name / 存储类型名称
    fn store_type(&self) -> &'static str;

    /// Open a session for the given configuration (no network activity) / 创建会话
    fn create_store(&self, config: &ConnectorConfig) -> Result<Arc<dyn ObjectStore>>;
}

pub mod memory;

pub use memory::{MemoryStore, MemoryStoreFactory};
