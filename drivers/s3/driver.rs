//! S3驱动核心实现
//!
//! 设计原则：
//! - 每个方法只对应一次S3调用，不做参数校验
//! - 不启用fail-on-err，非2xx状态码在这里转换为错误
//! - 预签名URL在本地计算，不访问网络

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use s3::bucket::Bucket;
use s3::creds::Credentials;
use s3::{BucketConfiguration, Region};
use tokio::io::AsyncWriteExt;

use super::config::S3Config;
use crate::storage::{ObjectMetadata, ObjectStore};
use crate::utils::{guess_content_type, is_success, parse_http_date};

const USER_METADATA_PREFIX: &str = "x-amz-meta-";

/// S3驱动
pub struct S3Store {
    config: S3Config,
    region: Region,
    credentials: Credentials,
}

impl S3Store {
    /// 创建新的S3会话（不访问网络）
    pub fn new(config: S3Config) -> Result<Self> {
        url::Url::parse(&config.endpoint)
            .map_err(|e| anyhow!("S3端点地址无效 '{}': {}", config.endpoint, e))?;

        let credentials = Credentials::new(
            Some(&config.access_key_id),
            Some(&config.secret_access_key),
            None,
            None,
            None,
        )
        .context("创建S3凭证失败")?;

        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
        };

        Ok(Self {
            config,
            region,
            credentials,
        })
    }

    /// 获取指定存储桶的客户端
    fn bucket(&self, name: &str) -> Result<Box<Bucket>> {
        let bucket = Bucket::new(name, self.region.clone(), self.credentials.clone())
            .with_context(|| format!("创建S3 Bucket失败: {}", name))?;

        Ok(if self.config.force_path_style {
            bucket.with_path_style()
        } else {
            bucket
        })
    }
}

/// 用户自定义元数据，去掉 x-amz-meta- 前缀，键统一小写
fn user_metadata(metadata: Option<HashMap<String, String>>) -> BTreeMap<String, String> {
    metadata
        .unwrap_or_default()
        .into_iter()
        .map(|(k, v)| {
            let k = k.to_lowercase();
            let k = k.strip_prefix(USER_METADATA_PREFIX).map(str::to_string).unwrap_or(k);
            (k, v)
        })
        .collect()
}

/// 非2xx状态码转换为错误
fn check_status(op: &str, code: u16) -> Result<()> {
    if !is_success(code) {
        bail!("S3 {}失败, 状态码: {}", op, code);
    }
    Ok(())
}

#[async_trait]
impl ObjectStore for S3Store {
    fn name(&self) -> &str {
        "S3"
    }

    async fn list_buckets(&self) -> Result<Vec<String>> {
        let response = Bucket::list_buckets(self.region.clone(), self.credentials.clone())
            .await
            .context("列出S3存储桶失败")?;
        Ok(response.bucket_names().collect())
    }

    async fn bucket_exists(&self, bucket: &str) -> Result<bool> {
        self.bucket(bucket)?
            .exists()
            .await
            .with_context(|| format!("检查S3存储桶是否存在失败: {}", bucket))
    }

    async fn make_bucket(&self, bucket: &str) -> Result<()> {
        let config = BucketConfiguration::default();
        let response = if self.config.force_path_style {
            Bucket::create_with_path_style(bucket, self.region.clone(), self.credentials.clone(), config).await
        } else {
            Bucket::create(bucket, self.region.clone(), self.credentials.clone(), config).await
        }
        .with_context(|| format!("创建S3存储桶失败: {}", bucket))?;

        if !response.success() {
            bail!(
                "创建S3存储桶失败, 状态码: {}: {}",
                response.response_code,
                response.response_text
            );
        }
        tracing::debug!("S3 CreateBucket: bucket={}", bucket);
        Ok(())
    }

    async fn put_object_from_file(&self, bucket: &str, key: &str, file: &Path) -> Result<String> {
        // 本地IO错误原样返回，由连接器区分
        let data = tokio::fs::read(file).await?;
        let content_type = guess_content_type(file);

        tracing::debug!("S3 PutObject: bucket={}, key={}, size={}, type={}", bucket, key, data.len(), content_type);

        let response = self
            .bucket(bucket)?
            .put_object_with_content_type(key, &data, &content_type)
            .await
            .with_context(|| format!("上传S3对象失败: {}/{}", bucket, key))?;
        check_status("PutObject", response.status_code())?;
        Ok(key.to_string())
    }

    async fn list_objects(&self, bucket: &str) -> Result<Vec<String>> {
        let results = self
            .bucket(bucket)?
            .list(String::new(), Some("/".to_string()))
            .await
            .with_context(|| format!("列出S3对象失败: {}", bucket))?;

        let mut keys = Vec::new();
        for result in results {
            // 先文件后公共前缀，与服务端分页顺序一致
            keys.extend(result.contents.into_iter().map(|obj| obj.key));
            keys.extend(
                result
                    .common_prefixes
                    .unwrap_or_default()
                    .into_iter()
                    .map(|cp| cp.prefix),
            );
        }
        Ok(keys)
    }

    async fn get_object_to_file(&self, bucket: &str, key: &str, file: &Path) -> Result<()> {
        let mut out = tokio::fs::File::create(file).await?;
        let code = self
            .bucket(bucket)?
            .get_object_to_writer(key, &mut out)
            .await
            .with_context(|| format!("获取S3对象失败: {}/{}", bucket, key))?;
        out.flush().await?;
        check_status("GetObject", code)
    }

    async fn stat_object(&self, bucket: &str, key: &str) -> Result<ObjectMetadata> {
        let (head, code) = self
            .bucket(bucket)?
            .head_object(key)
            .await
            .with_context(|| format!("获取S3对象元数据失败: {}/{}", bucket, key))?;
        check_status("HeadObject", code)?;

        Ok(ObjectMetadata {
            name: key.to_string(),
            size: head.content_length.unwrap_or(0).max(0) as u64,
            last_modified: head.last_modified.as_deref().and_then(parse_http_date),
            content_type: head.content_type,
            etag: head.e_tag.map(|t| t.trim_matches('"').to_string()),
            custom: user_metadata(head.metadata),
        })
    }

    async fn remove_object(&self, bucket: &str, key: &str) -> Result<()> {
        let response = self
            .bucket(bucket)?
            .delete_object(key)
            .await
            .with_context(|| format!("删除S3对象失败: {}/{}", bucket, key))?;
        check_status("DeleteObject", response.status_code())
    }

    async fn remove_bucket(&self, bucket: &str) -> Result<()> {
        let code = self
            .bucket(bucket)?
            .delete()
            .await
            .with_context(|| format!("删除S3存储桶失败: {}", bucket))?;
        check_status("DeleteBucket", code)
    }

    async fn presigned_get(&self, bucket: &str, key: &str, expiry_secs: u32) -> Result<String> {
        self.bucket(bucket)?
            .presign_get(key, expiry_secs, None)
            .await
            .with_context(|| format!("生成预签名URL失败: {}/{}", bucket, key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConnectorConfig, ConnectorOptions};

    fn local_config() -> S3Config {
        let config = ConnectorConfig::resolve(
            ConnectorOptions::default().endpoint("localhost:9000"),
            |_| None,
        );
        S3Config::from(&config)
    }

    #[tokio::test]
    async fn test_presign_is_path_style_and_offline() {
        let store = S3Store::new(local_config()).unwrap();
        let url = store.presigned_get("grupo-10", "doc.pdf", 3600).await.unwrap();
        assert!(url.starts_with("http://localhost:9000/grupo-10/doc.pdf?"), "{}", url);
        assert!(url.contains("X-Amz-Expires=3600"));
        assert!(url.contains("X-Amz-Signature="));
    }

    #[test]
    fn test_invalid_endpoint_rejected() {
        let mut config = local_config();
        config.endpoint = "http://bad host:9000".to_string();
        assert!(S3Store::new(config).is_err());
    }

    #[test]
    fn test_user_metadata() {
        let mut headers = HashMap::new();
        headers.insert("x-amz-meta-owner".to_string(), "grupo-10".to_string());
        headers.insert("X-Amz-Meta-Course".to_string(), "redes".to_string());
        headers.insert("project".to_string(), "minio".to_string());

        let custom = user_metadata(Some(headers));
        assert_eq!(custom.len(), 3);
        assert_eq!(custom.get("owner").map(String::as_str), Some("grupo-10"));
        assert_eq!(custom.get("course").map(String::as_str), Some("redes"));
        assert_eq!(custom.get("project").map(String::as_str), Some("minio"));

        assert!(user_metadata(None).is_empty());
    }

    #[test]
    fn test_check_status() {
        assert!(check_status("HeadObject", 200).is_ok());
        assert!(check_status("DeleteObject", 204).is_ok());
        let err = check_status("HeadObject", 404).unwrap_err();
        assert_eq!(err.to_string(), "S3 HeadObject失败, 状态码: 404");
    }
}
