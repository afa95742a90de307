use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use object_store::local::LocalFileSystem;
use object_store::path::Path as StorePath;
use object_store::{ObjectStore, PutPayload};

use crate::application::ports::{AudioStore, AudioStoreError};
use crate::domain::StoragePath;

pub const LOCAL_MEDIA_ROUTE: &str = "/media";

/// Readbacks on disk, served back by the router's `/media` mount.
pub struct LocalAudioStore {
    inner: Arc<LocalFileSystem>,
    root: PathBuf,
    public_base_url: String,
}

impl LocalAudioStore {
    pub fn new(base_path: PathBuf, public_base_url: Option<String>) -> Result<Self, AudioStoreError> {
        std::fs::create_dir_all(&base_path)?;
        let fs = LocalFileSystem::new_with_prefix(&base_path)
            .map_err(|e| AudioStoreError::UploadFailed(e.to_string()))?;
        Ok(Self {
            inner: Arc::new(fs),
            root: base_path,
            public_base_url: public_base_url
                .unwrap_or_else(|| LOCAL_MEDIA_ROUTE.to_string())
                .trim_end_matches('/')
                .to_string(),
        })
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }
}

#[async_trait::async_trait]
impl AudioStore for LocalAudioStore {
    async fn put(
        &self,
        path: &StoragePath,
        data: Bytes,
        _content_type: &str,
    ) -> Result<String, AudioStoreError> {
        let store_path = StorePath::from(path.as_str());
        self.inner
            .put(&store_path, PutPayload::from(data))
            .await
            .map_err(|e| AudioStoreError::UploadFailed(e.to_string()))?;

        Ok(format!("{}/{}", self.public_base_url, path))
    }

    async fn fetch(&self, path: &StoragePath) -> Result<Vec<u8>, AudioStoreError> {
        let store_path = StorePath::from(path.as_str());
        let result = self
            .inner
            .get(&store_path)
            .await
            .map_err(|e| AudioStoreError::NotFound(e.to_string()))?;

        let bytes = result
            .bytes()
            .await
            .map_err(|e| AudioStoreError::DownloadFailed(e.to_string()))?;

        Ok(bytes.to_vec())
    }
}
