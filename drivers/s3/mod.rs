//! S3 compatible object storage driver (MinIO, AWS, ...) / S3兼容对象存储驱动

mod config;
mod driver;
mod factory;

pub use config::S3Config;
pub use driver::S3Store;
pub use factory::S3StoreFactory;
