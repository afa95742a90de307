use std::collections::HashMap;

use config::{Config, File, FileFormat};

use radio_coach::application::services::RadioEffectSettings;
use radio_coach::presentation::config::{
    SessionStoreProvider, Settings, StorageProviderSetting, TranscriptionProviderSetting,
};

fn load(file: &str, env: &[(&str, &str)]) -> Settings {
    let vars: HashMap<String, String> = env
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    Config::builder()
        .add_source(File::from_str(file, FileFormat::Json))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .source(Some(vars)),
        )
        .build()
        .unwrap()
        .try_deserialize()
        .unwrap()
}

#[test]
fn given_empty_sources_when_loading_then_defaults_apply() {
    let settings = load("{}", &[]);

    assert_eq!(settings.server.port, 3000);
    assert_eq!(settings.session_store.provider, SessionStoreProvider::Postgres);
    assert_eq!(settings.scenarios.default_scenario_id, "mrpv_full_flight");
    assert_eq!(settings.transcription.provider, TranscriptionProviderSetting::OpenAi);
    assert_eq!(settings.transcription.language.as_deref(), Some("es"));
    assert_eq!(settings.llm.contract_retries, 2);
    assert!(!settings.transcript_cleaning.enabled);
    assert_eq!(settings.storage.provider, StorageProviderSetting::Local);
    assert_eq!(
        RadioEffectSettings::from(&settings.radio),
        RadioEffectSettings::default()
    );
}

#[test]
fn given_settings_file_when_loading_then_sections_are_read() {
    let settings = load(
        r#"{
            "session_store": { "provider": "memory" },
            "transcription": { "provider": "azure", "azure_deployment": "whisper" },
            "speech": { "voice": "es-CR-MariaNeural", "rate": 1.0 },
            "radio": { "tail_ms": 120 }
        }"#,
        &[],
    );

    assert_eq!(settings.session_store.provider, SessionStoreProvider::Memory);
    assert_eq!(settings.transcription.provider, TranscriptionProviderSetting::Azure);
    assert_eq!(settings.transcription.azure_deployment.as_deref(), Some("whisper"));
    let voice = settings.speech.voice_settings();
    assert_eq!(voice.voice, "es-CR-MariaNeural");
    assert_eq!(voice.rate, 1.0);
    assert_eq!(RadioEffectSettings::from(&settings.radio).tail_ms, 120);
}

#[test]
fn given_env_vars_when_loading_then_they_override_the_file() {
    let settings = load(
        r#"{ "llm": { "chat_model": "from-file", "api_key": "file-key" } }"#,
        &[
            ("APP_LLM__CHAT_MODEL", "gpt-4o"),
            ("APP_SERVER__PORT", "8080"),
            ("APP_TRANSCRIPT_CLEANING__ENABLED", "true"),
        ],
    );

    assert_eq!(settings.llm.chat_model, "gpt-4o");
    assert_eq!(settings.llm.api_key, "file-key");
    assert_eq!(settings.server.port, 8080);
    assert!(settings.transcript_cleaning.enabled);
}
