use axum::Router;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use radio_coach::application::ports::{TranscriptionEngine, TranscriptionError};
use radio_coach::domain::AudioFormat;
use radio_coach::infrastructure::audio::AzureWhisperEngine;

async fn start_mock_azure_server(
    response_status: u16,
    response_body: &'static str,
) -> (String, oneshot::Sender<()>) {
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let app = Router::new().route(
        "/openai/deployments/my-deployment/audio/transcriptions",
        post(move |headers: HeaderMap| async move {
            if headers.get("api-key").and_then(|v| v.to_str().ok()) != Some("test-key") {
                return (StatusCode::UNAUTHORIZED, "missing api-key").into_response();
            }
            let status = StatusCode::from_u16(response_status).unwrap();
            (status, response_body).into_response()
        }),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{}", addr);

    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            })
            .await
            .ok();
    });

    (base_url, shutdown_tx)
}

fn engine(base_url: &str, api_key: &str) -> AzureWhisperEngine {
    AzureWhisperEngine::new(
        base_url,
        "my-deployment",
        api_key,
        "2024-06-01",
        Some("es".to_string()),
    )
}

#[tokio::test]
async fn given_valid_audio_when_azure_transcribes_then_returns_trimmed_text() {
    let (base_url, shutdown_tx) =
        start_mock_azure_server(200, r#"{"text": " Torre, TI-ABC listo para despegar "}"#).await;

    let result = engine(&base_url, "test-key")
        .transcribe(b"fake audio bytes", AudioFormat::Mpeg)
        .await;

    assert_eq!(result.unwrap(), "Torre, TI-ABC listo para despegar");
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_azure_error_status_when_transcribing_then_returns_api_error() {
    let (base_url, shutdown_tx) =
        start_mock_azure_server(400, r#"{"error": {"code": "InvalidRequest"}}"#).await;

    let result = engine(&base_url, "test-key")
        .transcribe(b"bad audio", AudioFormat::M4a)
        .await;

    assert!(matches!(result, Err(TranscriptionError::ApiRequestFailed(_))));
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_wrong_key_when_transcribing_then_returns_api_error() {
    let (base_url, shutdown_tx) = start_mock_azure_server(200, r#"{"text": "unused"}"#).await;

    let result = engine(&base_url, "other-key")
        .transcribe(b"audio", AudioFormat::Mpeg)
        .await;

    assert!(matches!(result, Err(TranscriptionError::ApiRequestFailed(_))));
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_non_json_body_when_transcribing_then_returns_transcription_failed() {
    let (base_url, shutdown_tx) = start_mock_azure_server(200, "plain text").await;

    let result = engine(&base_url, "test-key")
        .transcribe(b"audio", AudioFormat::Mpeg)
        .await;

    assert!(matches!(result, Err(TranscriptionError::TranscriptionFailed(_))));
    shutdown_tx.send(()).ok();
}
