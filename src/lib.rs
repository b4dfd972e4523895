pub mod config;
pub mod connector;
pub mod error;
pub mod storage;
pub mod utils;

// Driver modules (point to project root drivers via path attribute) / 驱动模块
#[path = "../drivers/mod.rs"]
pub mod drivers;

pub use config::{ConnectorConfig, ConnectorOptions};
pub use connector::{MinioConnector, DEFAULT_EXPIRATION_HOURS};
pub use error::{ErrorKind, Result, StorageError};
pub use storage::{ObjectMetadata, ObjectStore, StoreFactory};
