use axum::Json;
use axum::extract::multipart::Field;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use serde::Serialize;

use crate::application::services::{Transmission, TransmissionError, TransmissionResult};
use crate::domain::{AudioFormat, SessionId};
use crate::presentation::state::AppState;

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub session_id: String,
    pub frequency: String,
    pub audio_url: Option<String>,
    pub controller_text: Option<String>,
    pub feedback: String,
}

impl From<TransmissionResult> for AnalyzeResponse {
    fn from(result: TransmissionResult) -> Self {
        Self {
            session_id: result.session_id.to_string(),
            frequency: result.frequency,
            audio_url: result.audio_url,
            controller_text: result.controller_text,
            feedback: result.feedback,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

struct AudioUpload {
    data: Bytes,
    content_type: Option<String>,
    filename: Option<String>,
}

#[derive(Default)]
struct AnalyzeForm {
    session_id: Option<String>,
    frequency: Option<String>,
    audio: Option<AudioUpload>,
}

async fn read_text(field: Field<'_>) -> Result<String, Response> {
    field.text().await.map_err(|e| {
        tracing::warn!(error = %e, "Failed to read form field");
        error_response(StatusCode::BAD_REQUEST, "Malformed multipart form")
    })
}

async fn read_form(multipart: &mut Multipart) -> Result<AnalyzeForm, Response> {
    let mut form = AnalyzeForm::default();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read multipart");
                return Err(error_response(
                    StatusCode::BAD_REQUEST,
                    "Malformed multipart form",
                ));
            }
        };

        match field.name() {
            Some("session_id") => form.session_id = Some(read_text(field).await?),
            Some("frequency") => form.frequency = Some(read_text(field).await?),
            Some("audio_file") => {
                let content_type = field.content_type().map(str::to_string);
                let filename = field.file_name().map(str::to_string);
                let data = field.bytes().await.map_err(|e| {
                    tracing::warn!(error = %e, "Failed to read audio bytes");
                    error_response(StatusCode::BAD_REQUEST, "Could not read audio_file")
                })?;
                form.audio = Some(AudioUpload {
                    data,
                    content_type,
                    filename,
                });
            }
            other => tracing::debug!(field = ?other, "Ignoring unexpected form field"),
        }
    }

    Ok(form)
}

fn into_transmission(form: AnalyzeForm) -> Result<Transmission, Response> {
    let raw_session_id = form
        .session_id
        .ok_or_else(|| error_response(StatusCode::BAD_REQUEST, "session_id is required"))?;
    let session_id: SessionId = raw_session_id
        .trim()
        .parse()
        .map_err(|_| error_response(StatusCode::BAD_REQUEST, "session_id must be a UUID"))?;

    let frequency = form
        .frequency
        .ok_or_else(|| error_response(StatusCode::BAD_REQUEST, "frequency is required"))?;

    let audio = form
        .audio
        .ok_or_else(|| error_response(StatusCode::BAD_REQUEST, "audio_file is required"))?;
    if audio.data.is_empty() {
        return Err(error_response(StatusCode::BAD_REQUEST, "audio_file is empty"));
    }

    let format = AudioFormat::resolve(audio.content_type.as_deref(), audio.filename.as_deref())
        .map_err(|mime| {
            tracing::warn!(content_type = %mime, "Unsupported audio type");
            error_response(
                StatusCode::BAD_REQUEST,
                format!("Unsupported audio type: {mime}"),
            )
        })?;

    Ok(Transmission {
        session_id,
        frequency,
        audio: audio.data,
        format,
    })
}

fn transmission_error_response(error: &TransmissionError) -> Response {
    let (status, message) = match error {
        TransmissionError::EmptyAudio => (StatusCode::BAD_REQUEST, "audio_file is empty"),
        TransmissionError::PhaseResolution(_) => {
            return error_response(StatusCode::CONFLICT, error.to_string());
        }
        TransmissionError::Transcription(_) => {
            (StatusCode::BAD_GATEWAY, "Transcription service failed")
        }
        TransmissionError::Contract(_) => {
            (StatusCode::BAD_GATEWAY, "Controller response was not usable")
        }
        TransmissionError::Speech(_) => (StatusCode::BAD_GATEWAY, "Readback synthesis failed"),
        TransmissionError::SessionStore(_) | TransmissionError::ScoreStore(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "Session could not be stored")
        }
    };

    if status.is_server_error() {
        tracing::error!(error = %error, status = status.as_u16(), "Transmission failed");
    } else {
        tracing::warn!(error = %error, status = status.as_u16(), "Transmission rejected");
    }

    error_response(status, message)
}

/// `POST /audio/analyze`: one student radio call in, the controller's answer out.
#[tracing::instrument(skip(state, multipart))]
pub async fn analyze_handler(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let form = match read_form(&mut multipart).await {
        Ok(form) => form,
        Err(response) => return response,
    };

    let transmission = match into_transmission(form) {
        Ok(transmission) => transmission,
        Err(response) => return response,
    };

    tracing::debug!(
        session_id = %transmission.session_id,
        bytes = transmission.audio.len(),
        mime = transmission.format.as_mime(),
        "Transmission received"
    );

    match state.transmission_service.process(transmission).await {
        Ok(result) => (StatusCode::OK, Json(AnalyzeResponse::from(result))).into_response(),
        Err(error) => transmission_error_response(&error),
    }
}
