use std::sync::Arc;

use bytes::Bytes;

use crate::application::ports::{
    AudioStore, AudioStoreError, SpeechMarkup, SpeechSynthesizer, SynthesisError,
};
use crate::domain::{SessionId, StoragePath};

use super::wav_encoding::{encode_wav, pcm16_to_f32};
use super::{RadioEffectChain, RadioEffectError};

pub const READBACK_MEDIA_TYPE: &str = "audio/wav";

#[derive(Debug, Clone, PartialEq)]
pub struct VoiceSettings {
    pub voice: String,
    pub language: String,
    /// Speaking rate as a fraction of normal speed.
    pub rate: f64,
    /// Pitch shift in percent.
    pub pitch: i32,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            voice: "es-CR-JuanNeural".to_string(),
            language: "es-CR".to_string(),
            rate: 0.9,
            pitch: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Readback {
    pub audio: Bytes,
    pub media_type: &'static str,
    pub voice: String,
    pub sample_rate: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum RadioSpeechError {
    #[error("speech synthesis failed: {0}")]
    Synthesis(#[from] SynthesisError),
    #[error("audio encoding failed: {0}")]
    Encoding(String),
    #[error("radio effects unavailable: {0}")]
    Effects(#[from] RadioEffectError),
    #[error("audio upload failed: {0}")]
    Storage(#[from] AudioStoreError),
}

/// Controller readbacks: synthesis, radio effects, WAV encoding and upload.
pub struct RadioSpeechService {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    audio_store: Arc<dyn AudioStore>,
    effects: Arc<RadioEffectChain>,
    voice: VoiceSettings,
}

impl RadioSpeechService {
    pub fn new(
        synthesizer: Arc<dyn SpeechSynthesizer>,
        audio_store: Arc<dyn AudioStore>,
        effects: RadioEffectChain,
        voice: VoiceSettings,
    ) -> Self {
        Self {
            synthesizer,
            audio_store,
            effects: Arc::new(effects),
            voice,
        }
    }

    pub fn markup(&self, text: &str) -> SpeechMarkup {
        SpeechMarkup {
            ssml: build_ssml(text, &self.voice),
            voice: self.voice.voice.clone(),
        }
    }

    #[tracing::instrument(skip(self, text), fields(voice = %self.voice.voice, chars = text.chars().count()))]
    pub async fn synthesize_readback(&self, text: &str) -> Result<Readback, RadioSpeechError> {
        let markup = self.markup(text);
        let pcm = self.synthesizer.synthesize(&markup).await?;
        if pcm.is_empty() {
            return Err(SynthesisError::EmptyAudio.into());
        }

        let sample_rate = self.synthesizer.sample_rate();
        let effects = if self.effects.settings().sample_rate == sample_rate {
            Arc::clone(&self.effects)
        } else {
            Arc::new(self.effects.for_rate(sample_rate)?)
        };
        let wav = tokio::task::spawn_blocking(move || {
            let speech = pcm16_to_f32(&pcm);
            let processed = effects.apply(&speech, &mut rand::rng());
            encode_wav(&processed, sample_rate)
        })
        .await
        .map_err(|e| RadioSpeechError::Encoding(e.to_string()))?
        .map_err(|e| RadioSpeechError::Encoding(e.to_string()))?;

        tracing::debug!(bytes = wav.len(), sample_rate, "Readback synthesized");

        Ok(Readback {
            audio: Bytes::from(wav),
            media_type: READBACK_MEDIA_TYPE,
            voice: markup.voice,
            sample_rate,
        })
    }

    /// Synthesizes `text` and uploads it, returning the public URL.
    pub async fn publish_readback(
        &self,
        session_id: SessionId,
        text: &str,
    ) -> Result<String, RadioSpeechError> {
        let readback = self.synthesize_readback(text).await?;
        let path = StoragePath::readback(&session_id);
        let url = self
            .audio_store
            .put(&path, readback.audio, readback.media_type)
            .await?;
        tracing::info!(session_id = %session_id, path = %path, "Readback uploaded");
        Ok(url)
    }
}

/// SSML envelope with prosody only when rate or pitch differ from neutral.
pub fn build_ssml(text: &str, voice: &VoiceSettings) -> String {
    let rate_pct = ((voice.rate * 100.0).round() as i64).clamp(60, 140);
    let pitch = voice.pitch.clamp(-50, 50);

    let mut prosody = Vec::new();
    if rate_pct != 100 {
        prosody.push(format!("rate=\"{rate_pct}%\""));
    }
    if pitch != 0 {
        prosody.push(format!("pitch=\"{pitch}%\""));
    }

    let escaped = xml_escape(text);
    let body = if prosody.is_empty() {
        escaped
    } else {
        format!("<prosody {}>{}</prosody>", prosody.join(" "), escaped)
    };

    format!(
        "<speak version=\"1.0\" xmlns=\"http://www.w3.org/2001/10/synthesis\" xml:lang=\"{}\"><voice name=\"{}\">{}</voice></speak>",
        xml_escape(&voice.language),
        xml_escape(&voice.voice),
        body
    )
}

fn xml_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            other => out.push(other),
        }
    }
    out
}
