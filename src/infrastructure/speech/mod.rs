mod azure_speech_synthesizer;

pub use azure_speech_synthesizer::AzureSpeechSynthesizer;
