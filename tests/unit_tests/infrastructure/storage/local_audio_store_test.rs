use bytes::Bytes;

use radio_coach::application::ports::{AudioStore, AudioStoreError};
use radio_coach::domain::{SessionId, StoragePath};
use radio_coach::infrastructure::storage::LocalAudioStore;

fn create_test_store(public_base_url: Option<&str>) -> (tempfile::TempDir, LocalAudioStore) {
    let dir = tempfile::TempDir::new().unwrap();
    let store =
        LocalAudioStore::new(dir.path().to_path_buf(), public_base_url.map(String::from)).unwrap();
    (dir, store)
}

#[tokio::test]
async fn given_readback_when_storing_then_media_url_is_returned() {
    let (dir, store) = create_test_store(None);
    let path = StoragePath::readback(&SessionId::new());

    let url = store
        .put(&path, Bytes::from_static(b"RIFF"), "audio/wav")
        .await
        .unwrap();

    assert_eq!(url, format!("/media/{path}"));
    assert!(dir.path().join(path.as_str()).exists());
}

#[tokio::test]
async fn given_public_base_url_when_storing_then_url_uses_it() {
    let (_dir, store) = create_test_store(Some("https://coach.example.test/media/"));
    let path = StoragePath::from_raw("sessions/abc/readback-1.wav");

    let url = store
        .put(&path, Bytes::from_static(b"data"), "audio/wav")
        .await
        .unwrap();

    assert_eq!(url, "https://coach.example.test/media/sessions/abc/readback-1.wav");
}

#[tokio::test]
async fn given_stored_readback_when_fetching_then_bytes_match_original() {
    let (_dir, store) = create_test_store(None);
    let path = StoragePath::readback(&SessionId::new());

    store
        .put(&path, Bytes::from_static(b"wav bytes"), "audio/wav")
        .await
        .unwrap();
    let fetched = store.fetch(&path).await.unwrap();

    assert_eq!(fetched, b"wav bytes");
}

#[tokio::test]
async fn given_nonexistent_path_when_fetching_then_returns_not_found() {
    let (_dir, store) = create_test_store(None);
    let path = StoragePath::from_raw("sessions/missing/readback.wav");

    let result = store.fetch(&path).await;

    assert!(matches!(result, Err(AudioStoreError::NotFound(_))));
}
