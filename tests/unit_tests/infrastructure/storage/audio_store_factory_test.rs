use radio_coach::infrastructure::storage::AudioStoreFactory;
use radio_coach::presentation::config::{StorageProviderSetting, StorageSettings};

#[test]
fn given_local_settings_when_creating_store_then_directory_is_created() {
    let dir = tempfile::TempDir::new().unwrap();
    let media = dir.path().join("media");
    let settings = StorageSettings {
        local_path: media.display().to_string(),
        ..StorageSettings::default()
    };

    let store = AudioStoreFactory::create(&settings);

    assert!(store.is_ok());
    assert!(media.is_dir());
}

#[test]
fn given_azure_without_credentials_when_creating_store_then_error() {
    let settings = StorageSettings {
        provider: StorageProviderSetting::Azure,
        azure_account: Some("account".to_string()),
        ..StorageSettings::default()
    };

    assert!(AudioStoreFactory::create(&settings).is_err());
}
