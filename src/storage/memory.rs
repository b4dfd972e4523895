//! In-memory object store / 内存对象存储
//!
//! Keeps buckets and objects in process memory and records every remote call,
//! so the connector can be exercised without a running service.
//! 记录每一次远程调用，便于在没有服务的情况下测试连接器

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Arc;

use super::{ObjectMetadata, ObjectStore, StoreFactory};
use crate::config::ConnectorConfig;
use crate::utils::guess_content_type;

#[derive(Debug, Clone)]
struct StoredObject {
    data: Bytes,
    content_type: String,
    modified: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct MemoryState {
    /// Buckets in creation order / 按创建顺序保存的存储桶
    buckets: Vec<(String, BTreeMap<String, StoredObject>)>,
    calls: Vec<String>,
    unreachable: bool,
}

impl MemoryState {
    fn bucket(&self, name: &str) -> Option<&BTreeMap<String, StoredObject>> {
        self.buckets.iter().find(|(n, _)| n == name).map(|(_, o)| o)
    }

    fn bucket_mut(&mut self, name: &str) -> Option<&mut BTreeMap<String, StoredObject>> {
        self.buckets.iter_mut().find(|(n, _)| n == name).map(|(_, o)| o)
    }
}

/// In-memory store / 内存存储
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of the remote calls issued so far, in order / 已发出的远程调用
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().calls.clone()
    }

    /// Number of recorded calls with the given name / 指定调用的次数
    pub fn call_count(&self, name: &str) -> usize {
        self.state.lock().calls.iter().filter(|c| c.as_str() == name).count()
    }

    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    /// Make every call fail as if the service was down / 模拟服务不可达
    pub fn set_unreachable(&self, unreachable: bool) {
        self.state.lock().unreachable = unreachable;
    }

    /// Create a bucket with objects without recording calls / 预置存储桶
    pub fn seed_bucket(&self, bucket: &str, objects: &[(&str, &[u8])]) {
        let mut state = self.state.lock();
        if state.bucket(bucket).is_none() {
            state.buckets.push((bucket.to_string(), BTreeMap::new()));
        }
        if let Some(map) = state.bucket_mut(bucket) {
            for (key, data) in objects {
                map.insert(
                    key.to_string(),
                    StoredObject {
                        data: Bytes::copy_from_slice(data),
                        content_type: guess_content_type(Path::new(key)),
                        modified: Utc::now(),
                    },
                );
            }
        }
    }

    /// Stored bytes of an object / 对象内容
    pub fn object_bytes(&self, bucket: &str, key: &str) -> Option<Bytes> {
        let state = self.state.lock();
        state.bucket(bucket)?.get(key).map(|o| o.data.clone())
    }

    /// Record the call and fail when unreachable / 记录调用
    fn record(&self, call: &str) -> Result<()> {
        let mut state = self.state.lock();
        state.calls.push(call.to_string());
        if state.unreachable {
            return Err(anyhow!("memory store unreachable: {}", call));
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn list_buckets(&self) -> Result<Vec<String>> {
        self.record("list_buckets")?;
        let state = self.state.lock();
        Ok(state.buckets.iter().map(|(n, _)| n.clone()).collect())
    }

    async fn bucket_exists(&self, bucket: &str) -> Result<bool> {
        self.record("bucket_exists")?;
        Ok(self.state.lock().bucket(bucket).is_some())
    }

    async fn make_bucket(&self, bucket: &str) -> Result<()> {
        self.record("make_bucket")?;
        let mut state = self.state.lock();
        if state.bucket(bucket).is_some() {
            return Err(anyhow!("BucketAlreadyOwnedByYou: {}", bucket));
        }
        state.buckets.push((bucket.to_string(), BTreeMap::new()));
        Ok(())
    }

    async fn put_object_from_file(&self, bucket: &str, key: &str, file: &Path) -> Result<String> {
        self.record("put_object")?;
        let data = tokio::fs::read(file).await?;
        let mut state = self.state.lock();
        let objects = state
            .bucket_mut(bucket)
            .ok_or_else(|| anyhow!("NoSuchBucket: {}", bucket))?;
        objects.insert(
            key.to_string(),
            StoredObject {
                data: Bytes::from(data),
                content_type: guess_content_type(file),
                modified: Utc::now(),
            },
        );
        Ok(key.to_string())
    }

    async fn list_objects(&self, bucket: &str) -> Result<Vec<String>> {
        self.record("list_objects")?;
        let state = self.state.lock();
        let objects = state
            .bucket(bucket)
            .ok_or_else(|| anyhow!("NoSuchBucket: {}", bucket))?;

        let mut keys = Vec::new();
        let mut prefixes = BTreeSet::new();
        for key in objects.keys() {
            match key.find('/') {
                Some(pos) => {
                    prefixes.insert(key[..=pos].to_string());
                }
                None => keys.push(key.clone()),
            }
        }
        keys.extend(prefixes);
        Ok(keys)
    }

    async fn get_object_to_file(&self, bucket: &str, key: &str, file: &Path) -> Result<()> {
        self.record("get_object")?;
        let data = {
            let state = self.state.lock();
            state
                .bucket(bucket)
                .ok_or_else(|| anyhow!("NoSuchBucket: {}", bucket))?
                .get(key)
                .map(|o| o.data.clone())
                .ok_or_else(|| anyhow!("NoSuchKey: {}", key))?
        };
        tokio::fs::write(file, &data).await?;
        Ok(())
    }

    async fn stat_object(&self, bucket: &str, key: &str) -> Result<ObjectMetadata> {
        self.record("stat_object")?;
        let state = self.state.lock();
        let object = state
            .bucket(bucket)
            .ok_or_else(|| anyhow!("NoSuchBucket: {}", bucket))?
            .get(key)
            .ok_or_else(|| anyhow!("NoSuchKey: {}", key))?;
        Ok(ObjectMetadata {
            name: key.to_string(),
            size: object.data.len() as u64,
            last_modified: Some(object.modified),
            content_type: Some(object.content_type.clone()),
            etag: Some(format!("{:x}", md5::compute(&object.data))),
            custom: BTreeMap::new(),
        })
    }

    async fn remove_object(&self, bucket: &str, key: &str) -> Result<()> {
        self.record("remove_object")?;
        let mut state = self.state.lock();
        let objects = state
            .bucket_mut(bucket)
            .ok_or_else(|| anyhow!("NoSuchBucket: {}", bucket))?;
        // S3 delete is idempotent for missing keys
        objects.remove(key);
        Ok(())
    }

    async fn remove_bucket(&self, bucket: &str) -> Result<()> {
        self.record("remove_bucket")?;
        let mut state = self.state.lock();
        let pos = state
            .buckets
            .iter()
            .position(|(n, _)| n == bucket)
            .ok_or_else(|| anyhow!("NoSuchBucket: {}", bucket))?;
        if !state.buckets[pos].1.is_empty() {
            return Err(anyhow!("BucketNotEmpty: {}", bucket));
        }
        state.buckets.remove(pos);
        Ok(())
    }

    async fn presigned_get(&self, bucket: &str, key: &str, expiry_secs: u32) -> Result<String> {
        self.record("presigned_get")?;
        Ok(format!("memory://{}/{}?X-Amz-Expires={}", bucket, key, expiry_secs))
    }
}

/// Factory handing out one shared memory store / 内存存储工厂
#[derive(Clone, Default)]
pub struct MemoryStoreFactory {
    store: Arc<MemoryStore>,
}

impl MemoryStoreFactory {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> Arc<MemoryStore> {
        self.store.clone()
    }
}

impl StoreFactory for MemoryStoreFactory {
    fn store_type(&self) -> &'static str {
        "memory"
    }

    fn create_store(&self, _config: &ConnectorConfig) -> Result<Arc<dyn ObjectStore>> {
        Ok(self.store.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_list_objects_is_top_level() {
        let store = MemoryStore::new();
        store.seed_bucket("docs", &[("b.txt", b"b"), ("a.txt", b"a"), ("dir/x.txt", b"x"), ("dir/y.txt", b"y")]);
        let keys = store.list_objects("docs").await.unwrap();
        assert_eq!(keys, vec!["a.txt", "b.txt", "dir/"]);
    }

    #[tokio::test]
    async fn test_remove_bucket_requires_empty() {
        let store = MemoryStore::new();
        store.seed_bucket("full", &[("a", b"1")]);
        assert!(store.remove_bucket("full").await.is_err());
        store.remove_object("full", "a").await.unwrap();
        store.remove_bucket("full").await.unwrap();
        assert!(store.list_buckets().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stat_etag_is_body_md5() {
        let store = MemoryStore::new();
        store.seed_bucket("b", &[("k", b"hello")]);
        let meta = store.stat_object("b", "k").await.unwrap();
        assert_eq!(meta.etag.as_deref(), Some("5d41402abc4b2a76b9719d911017c592"));
        assert_eq!(meta.size, 5);
    }

    #[tokio::test]
    async fn test_unreachable_records_and_fails() {
        let store = MemoryStore::new();
        store.set_unreachable(true);
        assert!(store.list_buckets().await.is_err());
        assert_eq!(store.calls(), vec!["list_buckets"]);
    }
}
