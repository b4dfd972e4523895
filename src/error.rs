//! Connector error types / 连接器错误类型

use thiserror::Error;

/// Result alias used by the connector / 连接器结果类型
pub type Result<T> = std::result::Result<T, StorageError>;

/// Error category, for callers that branch on the kind only / 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    NotConnected,
    NotFound,
    ConnectionFailure,
    Io,
}

/// Storage connector error / 存储连接器错误
#[derive(Error, Debug)]
pub enum StorageError {
    /// Empty name or path, or an out-of-range number / 参数无效
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Operation invoked before `connect()` succeeded / 尚未连接
    #[error("Not connected: call connect() first")]
    NotConnected,

    /// Bucket does not exist on the remote service / 存储桶不存在
    #[error("Not found: {0}")]
    NotFound(String),

    /// Protocol or transport failure, cause preserved / 协议或网络错误
    #[error("{message}")]
    ConnectionFailure {
        message: String,
        #[source]
        source: anyhow::Error,
    },

    /// Local file failure while uploading or downloading / 本地文件错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        StorageError::InvalidArgument(msg.into())
    }

    pub fn bucket_not_found(bucket: &str) -> Self {
        StorageError::NotFound(format!("bucket '{}' does not exist", bucket))
    }

    /// Wrap a remote failure. Local I/O errors surfaced by a store keep their own kind.
    /// 包装远程错误，本地IO错误保持原类别
    pub fn connection(message: impl Into<String>, source: anyhow::Error) -> Self {
        match source.downcast::<std::io::Error>() {
            Ok(io) => StorageError::Io(io),
            Err(source) => StorageError::ConnectionFailure {
                message: message.into(),
                source,
            },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            StorageError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            StorageError::NotConnected => ErrorKind::NotConnected,
            StorageError::NotFound(_) => ErrorKind::NotFound,
            StorageError::ConnectionFailure { .. } => ErrorKind::ConnectionFailure,
            StorageError::Io(_) => ErrorKind::Io,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_connection_keeps_source() {
        let err = StorageError::connection("Failed to list buckets", anyhow::anyhow!("connection refused"));
        assert_eq!(err.kind(), ErrorKind::ConnectionFailure);
        assert_eq!(err.to_string(), "Failed to list buckets");
        let source = err.source().expect("source should be attached");
        assert_eq!(source.to_string(), "connection refused");
    }

    #[test]
    fn test_connection_separates_local_io() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = StorageError::connection("Failed to upload", anyhow::Error::new(io));
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
