use std::sync::Arc;

use bytes::Bytes;
use object_store::azure::MicrosoftAzureBuilder;
use object_store::path::Path as StorePath;
use object_store::{Attribute, Attributes, ObjectStore, PutOptions, PutPayload};

use crate::application::ports::{AudioStore, AudioStoreError};
use crate::domain::StoragePath;

pub struct AzureAudioStore {
    inner: Arc<dyn ObjectStore>,
    public_base_url: String,
}

impl AzureAudioStore {
    pub fn new(
        account: &str,
        access_key: &str,
        container: &str,
        public_base_url: Option<String>,
    ) -> Result<Self, AudioStoreError> {
        let store = MicrosoftAzureBuilder::new()
            .with_account(account)
            .with_access_key(access_key)
            .with_container_name(container)
            .build()
            .map_err(|e| AudioStoreError::UploadFailed(e.to_string()))?;

        let public_base_url = public_base_url
            .unwrap_or_else(|| format!("https://{account}.blob.core.windows.net/{container}"))
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            inner: Arc::new(store),
            public_base_url,
        })
    }
}

#[async_trait::async_trait]
impl AudioStore for AzureAudioStore {
    async fn put(
        &self,
        path: &StoragePath,
        data: Bytes,
        content_type: &str,
    ) -> Result<String, AudioStoreError> {
        let store_path = StorePath::from(path.as_str());
        let options = PutOptions {
            attributes: Attributes::from_iter([(Attribute::ContentType, content_type.to_string())]),
            ..Default::default()
        };

        self.inner
            .put_opts(&store_path, PutPayload::from(data), options)
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
