use std::sync::Arc;

use bytes::Bytes;
use serde_json::{Map, Value};

use crate::application::ports::{
    PhaseScoreRepository, RepositoryError, SessionRepository, TranscriptionEngine,
    TranscriptionError,
};
use crate::domain::{AudioFormat, FrequencyCheck, PhaseScore, SessionId, SessionState, Turn};

use super::phase_transition::{TransitionSignal, next_phase};
use super::prompt_sanitizer::sanitize_prompt;
use super::{
    ContractError, ControllerLlm, PhaseResolutionError, PromptAssembler, PromptInput,
    RadioSpeechError, RadioSpeechService, ScenarioResolver, SessionLocks, TranscriptCleaner,
};

const DEFAULT_FEEDBACK: &str = "Colación recibida.";

/// Target for the per-turn transcript lines, so they can be filtered
/// independently, e.g. `RUST_LOG=info,transcript=off`. Text goes through
/// [`sanitize_prompt`] like every other logged transcript.
pub const TRANSCRIPT_TARGET: &str = "transcript";

/// One uploaded student radio call.
#[derive(Debug, Clone)]
pub struct Transmission {
    pub session_id: SessionId,
    pub frequency: String,
    pub audio: Bytes,
    pub format: AudioFormat,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransmissionResult {
    pub session_id: SessionId,
    pub frequency: String,
    pub audio_url: Option<String>,
    pub controller_text: Option<String>,
    pub feedback: String,
}

#[derive(Debug, thiserror::Error)]
pub enum TransmissionError {
    #[error("uploaded audio is empty")]
    EmptyAudio,
    #[error(transparent)]
    PhaseResolution(#[from] PhaseResolutionError),
    #[error("transcription: {0}")]
    Transcription(TranscriptionError),
    #[error("controller response: {0}")]
    Contract(ContractError),
    #[error("readback: {0}")]
    Speech(RadioSpeechError),
    #[error("session store: {0}")]
    SessionStore(RepositoryError),
    #[error("score store: {0}")]
    ScoreStore(RepositoryError),
}

/// What the controller side decided for this turn.
struct ControllerReply {
    allow_response: bool,
    controller_text: String,
    feedback: String,
    intent: String,
    confidence: Option<f64>,
    score: Option<f64>,
    metadata: Map<String, Value>,
    llm_raw: Option<String>,
}

/// Runs one student transmission through the whole turn pipeline.
pub struct TransmissionService {
    sessions: Arc<dyn SessionRepository>,
    scores: Arc<dyn PhaseScoreRepository>,
    transcription: Arc<dyn TranscriptionEngine>,
    cleaner: Option<TranscriptCleaner>,
    resolver: ScenarioResolver,
    prompts: PromptAssembler,
    controller: ControllerLlm,
    speech: RadioSpeechService,
    locks: SessionLocks,
}

impl TransmissionService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        scores: Arc<dyn PhaseScoreRepository>,
        transcription: Arc<dyn TranscriptionEngine>,
        cleaner: Option<TranscriptCleaner>,
        resolver: ScenarioResolver,
        prompts: PromptAssembler,
        controller: ControllerLlm,
        speech: RadioSpeechService,
    ) -> Self {
        Self {
            sessions,
            scores,
            transcription,
            cleaner,
            resolver,
            prompts,
            controller,
            speech,
            locks: SessionLocks::new(),
        }
    }

    #[tracing::instrument(skip(self, transmission), fields(session_id = %transmission.session_id, frequency = %transmission.frequency))]
    pub async fn process(
        &self,
        transmission: Transmission,
    ) -> Result<TransmissionResult, TransmissionError> {
        if transmission.audio.is_empty() {
            return Err(TransmissionError::EmptyAudio);
        }

        let session_id = transmission.session_id;
        let frequency = transmission.frequency.trim().to_string();
        let _turn_guard = self.locks.acquire(session_id).await;

        let mut state = self
            .sessions
            .load(session_id)
            .await
            .map_err(TransmissionError::SessionStore)?
            .unwrap_or_default();
        state.ensure_dynamic_assignments(&mut rand::rng());

        let context = self.resolver.resolve(session_id, &state);
        let active = context.require_active_phase().inspect_err(|e| {
            tracing::error!(error = %e, "Cannot process transmission without an active phase");
        })?;
        state.scenario_id.get_or_insert_with(|| context.scenario_id.clone());
        state.phase_id = Some(active.phase.id.clone());

        let transcript = self.transcribe(&transmission).await?;
        tracing::info!(transcript = %sanitize_prompt(&transcript), "Transcript received");
        tracing::info!(
            target: TRANSCRIPT_TARGET,
            "student | session={} | frequency={} | text={}",
            session_id,
            frequency,
            sanitize_prompt(&transcript)
        );

        let mut student_turn = Turn::student(transcript.clone(), frequency.clone());
        student_turn.meteo = state.meteo.clone();
        student_turn.route = state.route.clone();
        self.save_turn(session_id, &mut state, student_turn).await?;

        let group = context.active_frequency_group.clone();
        let check = FrequencyCheck::evaluate(&frequency, context.expected_frequency(&group));
        state.active_frequency_group = Some(group.clone());
        tracing::info!(
            phase_id = %active.phase.id,
            intent = %active.intent,
            frequency_group = %group,
            frequency_valid = check.is_valid,
            "Active phase resolved"
        );

        let reply = if check.is_valid {
            let mut phase = active.phase.clone();
            if let Some(expected) = check.expected.clone().or_else(|| {
                context.expected_frequency(&group).map(str::to_string)
            }) {
                phase.extra.entry("expected_frequency").or_insert(Value::String(expected));
            }
            if !frequency.is_empty() {
                phase
                    .extra
                    .entry("received_frequency")
                    .or_insert(Value::String(check.display_received()));
            }

            let bundle = self.prompts.assemble(&PromptInput {
                transcript: &transcript,
                intent: &active.intent,
                frequency: &frequency,
                frequency_group: &group,
                airport: &context.airport,
                scenario: &context.scenario,
                phase: &phase,
                turn_history: &state.turns,
                difficulty: state.difficulty(),
            });
            tracing::debug!(
                system = %sanitize_prompt(&bundle.system_prompt),
                user = %sanitize_prompt(&bundle.user_prompt),
                "Prompts assembled"
            );

            let outcome = self
                .controller
                .invoke(&bundle)
                .await
                .map_err(TransmissionError::Contract)?;
            let response = outcome.response;
            let feedback = response.feedback_text.trim();
            ControllerReply {
                allow_response: response.allow_response,
                controller_text: response
                    .controller_text
                    .as_deref()
                    .unwrap_or_default()
                    .trim()
                    .to_string(),
                feedback: if feedback.is_empty() {
                    DEFAULT_FEEDBACK.to_string()
                } else {
                    feedback.to_string()
                },
                intent: if response.intent.is_empty() {
                    active.intent.clone()
                } else {
                    response.intent.clone()
                },
                confidence: response.confidence,
                score: response.score,
                metadata: response.metadata,
                llm_raw: Some(outcome.raw_response),
            }
        } else {
            let message = check.mismatch_feedback(group.as_str());
            tracing::info!(
                expected = %check.display_expected(group.as_str()),
                received = %check.display_received(),
                "Frequency mismatch, skipping controller model"
            );

            let mut metadata = Map::new();
            metadata.insert("frequency_valid".into(), Value::Bool(false));
            if check.has_expected() {
                metadata.insert(
                    "expected_frequency".into(),
                    Value::String(check.display_expected(group.as_str())),
                );
            }
            metadata.insert("received_frequency".into(), Value::String(check.display_received()));
            metadata.insert("expected_frequency_group".into(), Value::String(group.to_string()));

            ControllerReply {
                allow_response: false,
                controller_text: message.clone(),
                feedback: message,
                intent: active.intent.clone(),
                confidence: None,
                score: Some(0.0),
                metadata,
                llm_raw: None,
            }
        };

        let signal = TransitionSignal::new(&reply.metadata, reply.allow_response);
        if let Some(next) = next_phase(&active.phase, signal, &context.phase_map) {
            tracing::info!(from = %active.phase.id, to = %next.id, "Phase transition");
            state.advance_to(&next.id, next.frequency_group());
        }

        let mut controller_turn = Turn::controller(
            reply.controller_text.clone(),
            reply.feedback.clone(),
            reply.allow_response,
        );
        controller_turn.phase_id = state.phase_id.clone();
        controller_turn.intent = Some(reply.intent.clone());
        controller_turn.confidence = reply.confidence;
        controller_turn.score = reply.score;
        controller_turn.metadata = reply.metadata.clone();
        controller_turn.llm_raw = reply.llm_raw.clone();
        self.save_turn(session_id, &mut state, controller_turn).await?;

        if let Some(score) = reply.score {
            let record = if check.is_valid {
                PhaseScore::new(
                    session_id,
                    state.user_id,
                    active.phase.id.clone(),
                    score,
                    Some(reply.feedback.clone()),
                )
            } else {
                PhaseScore::frequency_usage_error(session_id, state.user_id, Some(reply.feedback.clone()))
            };
            self.scores
                .record(&record)
                .await
                .map_err(TransmissionError::ScoreStore)?;
            tracing::info!(phase_id = %record.phase_id, score = record.score, "Phase score recorded");
        }

        tracing::info!(
            target: TRANSCRIPT_TARGET,
            "controller | session={} | frequency={} | intent={} | phase={} | allow_response={} | text={}",
            session_id,
            frequency,
            reply.intent,
            state.phase_id.as_deref().unwrap_or("unknown"),
            reply.allow_response,
            sanitize_prompt(&reply.controller_text)
        );

        let speaks = reply.allow_response && !reply.controller_text.is_empty();
        let audio_url = if speaks {
            Some(
                self.speech
                    .publish_readback(session_id, &reply.controller_text)
                    .await
                    .map_err(TransmissionError::Speech)?,
            )
        } else {
            None
        };

        Ok(TransmissionResult {
            session_id,
            frequency: transmission.frequency,
            audio_url,
            controller_text: speaks.then_some(reply.controller_text),
            feedback: reply.feedback,
        })
    }

    async fn transcribe(&self, transmission: &Transmission) -> Result<String, TransmissionError> {
        let raw = self
            .transcription
            .transcribe(&transmission.audio, transmission.format)
            .await
            .map_err(TransmissionError::Transcription)?;

        match &self.cleaner {
            Some(cleaner) => Ok(cleaner.clean(&raw).await),
            None => Ok(raw),
        }
    }

    async fn save_turn(
        &self,
        session_id: SessionId,
        state: &mut SessionState,
        turn: Turn,
    ) -> Result<(), TransmissionError> {
        state.record_turn(turn);
        self.sessions
            .save(session_id, state)
            .await
            .map_err(TransmissionError::SessionStore)
    }
}
