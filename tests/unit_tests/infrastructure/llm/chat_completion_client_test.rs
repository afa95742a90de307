use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::RawQuery;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use bytes::Bytes;
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use radio_coach::application::ports::{LlmClient, LlmClientError};
use radio_coach::infrastructure::llm::{create_chat_completion_client, create_cleaning_client};
use radio_coach::presentation::config::{LlmSettings, TranscriptCleaningSettings};

const COMPLETION_BODY: &str =
    r#"{"choices":[{"message":{"role":"assistant","content":"{\"intent\":\"x\"}"}}]}"#;

#[derive(Default)]
struct CapturedRequest {
    headers: HeaderMap,
    query: Option<String>,
    body: Value,
}

async fn start_mock_llm_server(
    route: &'static str,
    response_status: u16,
    response_body: &'static str,
) -> (String, Arc<Mutex<CapturedRequest>>, oneshot::Sender<()>) {
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let captured = Arc::new(Mutex::new(CapturedRequest::default()));
    let sink = captured.clone();

    let app = Router::new().route(
        route,
        post(move |RawQuery(query): RawQuery, headers: HeaderMap, body: Bytes| {
            let sink = sink.clone();
            async move {
                let mut request = sink.lock().unwrap();
                request.headers = headers;
                request.query = query;
                request.body = serde_json::from_slice(&body).unwrap_or(Value::Null);
                let status = StatusCode::from_u16(response_status).unwrap();
                (status, response_body).into_response()
            }
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

    (base_url, captured, shutdown_tx)
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn openai_settings(base_url: &str) -> LlmSettings {
    LlmSettings {
        api_key: "sk-test".to_string(),
        base_url: Some(format!("{base_url}/v1")),
        ..LlmSettings::default()
    }
}

#[tokio::test]
async fn given_json_mode_when_completing_then_request_carries_prompts_and_format() {
    let (base_url, captured, shutdown_tx) =
        start_mock_llm_server("/v1/chat/completions", 200, COMPLETION_BODY).await;
    let client = create_chat_completion_client(&openai_settings(&base_url))
        .unwrap()
        .with_json_mode(true);

    let reply = client.complete("eres torre", "TI-ABC listo").await.unwrap();

    assert_eq!(reply, r#"{"intent":"x"}"#);
    let request = captured.lock().unwrap();
    assert_eq!(header(&request.headers, "authorization"), Some("Bearer sk-test"));
    assert_eq!(request.body["model"], "gpt-4o-mini");
    assert_eq!(request.body["messages"][0]["role"], "system");
    assert_eq!(request.body["messages"][0]["content"], "eres torre");
    assert_eq!(request.body["messages"][1]["content"], "TI-ABC listo");
    assert_eq!(request.body["response_format"]["type"], "json_object");
    assert_eq!(request.body["max_tokens"], 800);
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_cleaning_client_when_completing_then_deterministic_without_json_mode() {
    let (base_url, captured, shutdown_tx) =
        start_mock_llm_server("/v1/chat/completions", 200, COMPLETION_BODY).await;
    let cleaning = TranscriptCleaningSettings {
        enabled: true,
        model: Some("gpt-4o".to_string()),
        max_tokens: 120,
    };
    let client = create_cleaning_client(&openai_settings(&base_url), &cleaning).unwrap();

    client.complete("limpia", "pista 10").await.unwrap();

    let request = captured.lock().unwrap();
    assert_eq!(client.model(), "gpt-4o");
    assert_eq!(request.body["model"], "gpt-4o");
    assert_eq!(request.body["temperature"], 0.0);
    assert_eq!(request.body["max_tokens"], 120);
    assert!(request.body.get("response_format").is_none());
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_azure_provider_when_completing_then_deployment_path_and_api_key_header() {
    let (base_url, captured, shutdown_tx) = start_mock_llm_server(
        "/openai/deployments/gpt-4o-mini/chat/completions",
        200,
        COMPLETION_BODY,
    )
    .await;
    let settings = LlmSettings {
        provider: "azure".to_string(),
        api_key: "azure-key".to_string(),
        azure_endpoint: Some(format!("{base_url}/")),
        ..LlmSettings::default()
    };
    let client = create_chat_completion_client(&settings).unwrap();

    client.complete("s", "u").await.unwrap();

    let request = captured.lock().unwrap();
    assert_eq!(header(&request.headers, "api-key"), Some("azure-key"));
    assert!(request.headers.get("authorization").is_none());
    assert_eq!(request.query.as_deref(), Some("api-version=2024-06-01"));
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_rate_limit_when_completing_then_rate_limited_error() {
    let (base_url, _captured, shutdown_tx) =
        start_mock_llm_server("/v1/chat/completions", 429, "slow down").await;
    let client = create_chat_completion_client(&openai_settings(&base_url)).unwrap();

    let result = client.complete("s", "u").await;

    assert!(matches!(result, Err(LlmClientError::RateLimited)));
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_server_error_when_completing_then_api_request_failed() {
    let (base_url, _captured, shutdown_tx) =
        start_mock_llm_server("/v1/chat/completions", 503, "unavailable").await;
    let client = create_chat_completion_client(&openai_settings(&base_url)).unwrap();

    let result = client.complete("s", "u").await;

    assert!(matches!(result, Err(LlmClientError::ApiRequestFailed(_))));
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_empty_choices_when_completing_then_invalid_response() {
    let (base_url, _captured, shutdown_tx) =
        start_mock_llm_server("/v1/chat/completions", 200, r#"{"choices":[]}"#).await;
    let client = create_chat_completion_client(&openai_settings(&base_url)).unwrap();

    let result = client.complete("s", "u").await;

    assert!(matches!(result, Err(LlmClientError::InvalidResponse(_))));
    shutdown_tx.send(()).ok();
}

#[test]
fn given_lmstudio_without_base_url_when_creating_client_then_error() {
    let settings = LlmSettings {
        provider: "lmstudio".to_string(),
        ..LlmSettings::default()
    };

    assert!(matches!(
        create_chat_completion_client(&settings),
        Err(LlmClientError::Configuration(_))
    ));
}

#[test]
fn given_unknown_provider_when_creating_client_then_error() {
    let settings = LlmSettings {
        provider: "mystery".to_string(),
        ..LlmSettings::default()
    };

    assert!(matches!(
        create_chat_completion_client(&settings),
        Err(LlmClientError::Configuration(_))
    ));
}

#[test]
fn given_azure_without_endpoint_when_creating_client_then_configuration_error() {
    let settings = LlmSettings {
        provider: "azure".to_string(),
        azure_endpoint: None,
        ..LlmSettings::default()
    };

    assert!(matches!(
        create_chat_completion_client(&settings),
        Err(LlmClientError::Configuration(_))
    ));
}
