use bytes::Bytes;

use crate::domain::StoragePath;

#[async_trait::async_trait]
pub trait AudioStore: Send + Sync {
    /// Uploads `data` and returns the URL clients can fetch it from.
    async fn put(
        &self,
        path: &StoragePath,
        data: Bytes,
        content_type: &str,
    ) -> Result<String, AudioStoreError>;

    async fn fetch(&self, path: &StoragePath) -> Result<Vec<u8>, AudioStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AudioStoreError {
    #[error("upload failed: {0}")]
    UploadFailed(String),
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("download failed: {0}")]
    DownloadFailed(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
