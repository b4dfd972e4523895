//! S3驱动工厂

use anyhow::Result;
use std::sync::Arc;

use crate::config::ConnectorConfig;
use crate::storage::{ObjectStore, StoreFactory};
use super::config::S3Config;
use super::driver::S3Store;

/// S3驱动工厂
pub struct S3StoreFactory;

impl StoreFactory for S3StoreFactory {
    fn store_type(&self) -> &'static str {
        "s3"
    }

    fn create_store(&self, config: &ConnectorConfig) -> Result<Arc<dyn ObjectStore>> {
        let store = S3Store::new(S3Config::from(config))?;
        Ok(Arc::new(store))
    }
}
