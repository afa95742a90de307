mod environment;
mod settings;

pub use environment::Environment;
pub use settings::{
    DatabaseSettings, LlmSettings, LoggingSettings, RadioSettings, ScenarioSettings,
    ServerSettings, SessionStoreProvider, SessionStoreSettings, Settings, SpeechSettings,
    StorageProviderSetting, StorageSettings, TranscriptCleaningSettings,
    TranscriptionProviderSetting, TranscriptionSettings,
};
