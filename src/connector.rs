//! MinIO connector facade / MinIO 连接器
//!
//! Validates arguments locally, checks the session and bucket, delegates the remote
//! call to the [`ObjectStore`] and translates failures into [`StorageError`].
//! 本地校验参数，委托给存储会话并转换错误

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{ConnectorConfig, ConnectorOptions};
use crate::drivers::s3::S3StoreFactory;
use crate::error::{Result, StorageError};
use crate::storage::{ObjectMetadata, ObjectStore, StoreFactory};
use crate::utils::object_key_from_path;

/// Default lifetime of a presigned URL (hours) / 预签名URL默认有效期（小时）
pub const DEFAULT_EXPIRATION_HOURS: i64 = 1;
/// S3 caps presigned URLs at 7 days / 预签名URL最长7天
pub const MAX_EXPIRATION_HOURS: i64 = 7 * 24;

/// Storage connector / 存储连接器
pub struct MinioConnector {
    config: ConnectorConfig,
    factory: Box<dyn StoreFactory>,
    session: Option<Arc<dyn ObjectStore>>,
}

impl MinioConnector {
    /// Resolve configuration from overrides and the environment, S3 driver
    /// 从显式配置和环境变量构造，使用S3驱动
    pub fn new(options: ConnectorOptions) -> Self {
        Self::with_config(ConnectorConfig::from_env(options))
    }

    pub fn with_config(config: ConnectorConfig) -> Self {
        Self::with_factory(config, Box::new(S3StoreFactory))
    }

    /// Use any store implementation / 使用指定的存储实现
    pub fn with_factory(config: ConnectorConfig, factory: Box<dyn StoreFactory>) -> Self {
        Self {
            config,
            factory,
            session: None,
        }
    }

    pub fn config(&self) -> &ConnectorConfig {
        &self.config
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    /// Current session, `NotConnected` before `connect()` / 当前会话
    pub fn session(&self) -> Result<&Arc<dyn ObjectStore>> {
        self.session.as_ref().ok_or(StorageError::NotConnected)
    }

    /// Open a session and verify it with a bucket listing / 建立连接并验证
    ///
    /// A failed attempt leaves any previous session in place.
    pub async fn connect(&mut self) -> Result<Arc<dyn ObjectStore>> {
        let endpoint = self.config.endpoint_url();
        tracing::info!("Connecting to {} storage at {}...", self.factory.store_type(), endpoint);

        let store = self
            .factory
            .create_store(&self.config)
            .map_err(|source| StorageError::ConnectionFailure {
                message: format!("Failed to set up storage client for {}", endpoint),
                source,
            })?;

        if let Err(source) = store.list_buckets().await {
            tracing::error!("Connection to {} failed: {:#}", endpoint, source);
            return Err(StorageError::ConnectionFailure {
                message: format!(
                    "Failed to connect to {}; check that the server is running and the access keys are valid",
                    endpoint
                ),
                source,
            });
        }

        tracing::info!("Connection established ({})", store.name());
        self.session = Some(store.clone());
        Ok(store)
    }

    /// Create a bucket if it does not exist yet / 创建存储桶（已存在则跳过）
    pub async fn create_bucket(&self, bucket: &str) -> Result<()> {
        require(bucket, "bucket name")?;
        let store = self.session()?;

        let exists = store
            .bucket_exists(bucket)
            .await
            .map_err(|e| StorageError::connection(format!("Failed to create bucket '{}'", bucket), e))?;
        if exists {
            tracing::warn!("Bucket '{}' already exists; nothing to do", bucket);
            return Ok(());
        }

        store
            .make_bucket(bucket)
            .await
            .map_err(|e| StorageError::connection(format!("Failed to create bucket '{}'", bucket), e))?;
        tracing::info!("Bucket '{}' created", bucket);
        Ok(())
    }

    /// Upload a local file, returns the object key / 上传本地文件，返回对象键
    ///
    /// Without an explicit key the file's base name is used.
    pub async fn upload_file(&self, bucket: &str, path: &str, object_key: Option<&str>) -> Result<String> {
        let store = self.session()?;
        require(bucket, "bucket name")?;
        require(path, "file path")?;

        let key = match object_key.filter(|k| !k.is_empty()) {
            Some(key) => key.to_string(),
            None => object_key_from_path(path)
                .ok_or_else(|| StorageError::invalid(format!("file path '{}' has no file name", path)))?,
        };

        self.ensure_bucket(store.as_ref(), bucket).await?;

        let stored = store
            .put_object_from_file(bucket, &key, Path::new(path))
            .await
            .map_err(|e| StorageError::connection(format!("Failed to upload '{}' to bucket '{}'", path, bucket), e))?;
        tracing::info!("Uploaded '{}' to bucket '{}' as '{}'", path, bucket, stored);
        Ok(stored)
    }

    /// Bucket names in service order / 列出存储桶
    pub async fn list_buckets(&self) -> Result<Vec<String>> {
        let store = self.session()?;
        let buckets = store
            .list_buckets()
            .await
            .map_err(|e| StorageError::connection("Failed to list buckets", e))?;

        if buckets.is_empty() {
            tracing::warn!("No buckets found");
        } else {
            tracing::info!("Buckets: {}", buckets.join(", "));
        }
        Ok(buckets)
    }

    /// Object keys at the top level of a bucket / 列出存储桶中的文件
    pub async fn list_files(&self, bucket: &str) -> Result<Vec<String>> {
        let store = self.session()?;
        require(bucket, "bucket name")?;
        self.ensure_bucket(store.as_ref(), bucket).await?;

        let files = store
            .list_objects(bucket)
            .await
            .map_err(|e| StorageError::connection(format!("Failed to list files of bucket '{}'", bucket), e))?;

        if files.is_empty() {
            tracing::warn!("Bucket '{}' is empty", bucket);
        } else {
            tracing::info!("Files in bucket '{}': {}", bucket, files.join(", "));
        }
        Ok(files)
    }

    /// Download an object to `dest_path`, returns `dest_path` / 下载对象到本地
    ///
    /// Data lands in a sibling `.part` file first and is renamed into place on success.
    pub async fn download_file(&self, bucket: &str, object_key: &str, dest_path: &str) -> Result<String> {
        let store = self.session()?;
        require(bucket, "bucket name")?;
        require(object_key, "object key")?;
        require(dest_path, "destination path")?;
        self.ensure_bucket(store.as_ref(), bucket).await?;

        let dest = Path::new(dest_path);
        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let part = part_path(dest);
        if let Err(e) = store.get_object_to_file(bucket, object_key, &part).await {
            let _ = tokio::fs::remove_file(&part).await;
            return Err(StorageError::connection(
                format!("Failed to download '{}' from bucket '{}'", object_key, bucket),
                e,
            ));
        }
        tokio::fs::rename(&part, dest).await?;

        tracing::info!("Downloaded '{}' from bucket '{}' to '{}'", object_key, bucket, dest_path);
        Ok(dest_path.to_string())
    }

    /// Time limited signed GET URL / 生成临时下载链接
    pub async fn generate_presigned_url(&self, bucket: &str, object_key: &str, expiration_hours: i64) -> Result<String> {
        let store = self.session()?;
        require(bucket, "bucket name")?;
        require(object_key, "object key")?;
        if expiration_hours <= 0 {
            return Err(StorageError::invalid("expiration must be a positive number of hours"));
        }
        if expiration_hours > MAX_EXPIRATION_HOURS {
            return Err(StorageError::invalid(format!(
                "expiration must not exceed {} hours",
                MAX_EXPIRATION_HOURS
            )));
        }
        self.ensure_bucket(store.as_ref(), bucket).await?;

        let expiry_secs = (expiration_hours * 3600) as u32;
        let url = store
            .presigned_get(bucket, object_key, expiry_secs)
            .await
            .map_err(|e| StorageError::connection(format!("Failed to generate link for '{}'", object_key), e))?;
        tracing::info!("Temporary link for '{}' (valid {}h): {}", object_key, expiration_hours, url);
        Ok(url)
    }

    /// Fetch object metadata / 获取文件元数据
    pub async fn get_file_metadata(&self, bucket: &str, object_key: &str) -> Result<ObjectMetadata> {
        let store = self.session()?;
        require(bucket, "bucket name")?;
        require(object_key, "object key")?;
        self.ensure_bucket(store.as_ref(), bucket).await?;

        let meta = store
            .stat_object(bucket, object_key)
            .await
            .map_err(|e| StorageError::connection(format!("Failed to get metadata of '{}'", object_key), e))?;

        tracing::info!("Metadata of '{}':", object_key);
        tracing::info!("  name: {}", meta.name);
        tracing::info!("  size_bytes: {}", meta.size);
        tracing::info!("  last_modified: {:?}", meta.last_modified);
        tracing::info!("  content_type: {:?}", meta.content_type);
        tracing::info!("  etag: {:?}", meta.etag);
        tracing::info!("  custom: {:?}", meta.custom);
        Ok(meta)
    }

    /// Delete an object / 删除文件
    pub async fn delete_file(&self, bucket: &str, object_key: &str) -> Result<()> {
        let store = self.session()?;
        require(bucket, "bucket name")?;
        require(object_key, "object key")?;
        self.ensure_bucket(store.as_ref(), bucket).await?;

        store.remove_object(bucket, object_key).await.map_err(|e| {
            StorageError::connection(
                format!("Failed to delete '{}' from bucket '{}'", object_key, bucket),
                e,
            )
        })?;
        tracing::info!("Deleted '{}' from bucket '{}'", object_key, bucket);
        Ok(())
    }

    /// Delete a bucket; a non-empty bucket is rejected by the service / 删除存储桶
    pub async fn delete_bucket(&self, bucket: &str) -> Result<()> {
        let store = self.session()?;
        require(bucket, "bucket name")?;
        self.ensure_bucket(store.as_ref(), bucket).await?;

        store
            .remove_bucket(bucket)
            .await
            .map_err(|e| StorageError::connection(format!("Failed to delete bucket '{}'", bucket), e))?;
        tracing::info!("Bucket '{}' deleted", bucket);
        Ok(())
    }

    async fn ensure_bucket(&self, store: &dyn ObjectStore, bucket: &str) -> Result<()> {
        let exists = store
            .bucket_exists(bucket)
            .await
            .map_err(|e| StorageError::connection(format!("Failed to check bucket '{}'", bucket), e))?;
        if !exists {
            return Err(StorageError::bucket_not_found(bucket));
        }
        Ok(())
    }
}

fn require(value: &str, what: &str) -> Result<()> {
    if value.is_empty() {
        return Err(StorageError::invalid(format!("{} must not be empty", what)));
    }
    Ok(())
}

fn part_path(dest: &Path) -> PathBuf {
    let mut name: OsString = dest.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}
