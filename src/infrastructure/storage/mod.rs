mod audio_store_factory;
mod azure_audio_store;
mod local_audio_store;

pub use audio_store_factory::AudioStoreFactory;
pub use azure_audio_store::AzureAudioStore;
pub use local_audio_store::{LOCAL_MEDIA_ROUTE, LocalAudioStore};
