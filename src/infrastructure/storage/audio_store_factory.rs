use std::path::PathBuf;
use std::sync::Arc;

use crate::application::ports::{AudioStore, AudioStoreError};
use crate::presentation::config::{StorageProviderSetting, StorageSettings};

use super::azure_audio_store::AzureAudioStore;
use super::local_audio_store::LocalAudioStore;

pub struct AudioStoreFactory;

impl AudioStoreFactory {
    pub fn create(settings: &StorageSettings) -> Result<Arc<dyn AudioStore>, AudioStoreError> {
        match settings.provider {
            StorageProviderSetting::Local => {
                let store = LocalAudioStore::new(
                    PathBuf::from(&settings.local_path),
                    settings.public_base_url.clone(),
                )?;
                Ok(Arc::new(store))
            }
            StorageProviderSetting::Azure => {
                let account = settings.azure_account.as_deref().ok_or_else(|| {
                    AudioStoreError::UploadFailed("azure_account required".into())
                })?;
                let key = settings.azure_access_key.as_deref().ok_or_else(|| {
                    AudioStoreError::UploadFailed("azure_access_key required".into())
                })?;
                let container = settings.azure_container.as_deref().ok_or_else(|| {
                    AudioStoreError::UploadFailed("azure_container required".into())
                })?;
                let store =
                    AzureAudioStore::new(account, key, container, settings.public_base_url.clone())?;
                Ok(Arc::new(store))
            }
        }
    }
}
