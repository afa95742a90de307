mod controller_llm;
mod phase_transition;
mod prompt_assembler;
mod prompt_sanitizer;
mod radio_effects;
mod radio_speech_service;
mod response_contract;
mod scenario_resolver;
mod session_locks;
mod transcript_cleaner;
mod transmission_service;
mod wav_encoding;

pub use controller_llm::{ContractError, ControllerLlm, DEFAULT_CONTRACT_RETRIES, LlmOutcome};
pub use phase_transition::{TransitionSignal, next_phase, next_phase_hint};
pub use prompt_assembler::{
    PROMPT_TURN_TAIL, PromptAssembler, PromptBundle, PromptInput, format_turn_history,
    persona_for, strictness_instruction, substitute_placeholders,
};
pub use prompt_sanitizer::sanitize_prompt;
pub use radio_effects::{RadioEffectChain, RadioEffectError, RadioEffectSettings};
pub use radio_speech_service::{
    READBACK_MEDIA_TYPE, RadioSpeechError, RadioSpeechService, Readback, VoiceSettings,
    build_ssml,
};
pub use response_contract::{ContractViolation, StructuredResponse, extract_json_payload};
pub use scenario_resolver::{ActivePhase, PhaseResolutionError, ScenarioResolver, SessionContext};
pub use session_locks::SessionLocks;
pub use transcript_cleaner::TranscriptCleaner;
pub use transmission_service::{
    TRANSCRIPT_TARGET, Transmission, TransmissionError, TransmissionResult, TransmissionService,
};
pub use wav_encoding::{encode_wav, pcm16_to_f32};
