use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use config::{Config, File};
use tokio::net::TcpListener;

use radio_coach::application::ports::{
    LlmClient, PhaseScoreRepository, SessionRepository, SpeechSynthesizer,
};
use radio_coach::application::services::{
    ControllerLlm, PromptAssembler, RadioEffectChain, RadioSpeechService, ScenarioResolver,
    TranscriptCleaner, TransmissionService,
};
use radio_coach::infrastructure::audio::TranscriptionEngineFactory;
use radio_coach::infrastructure::llm::{create_chat_completion_client, create_cleaning_client};
use radio_coach::infrastructure::observability::{TracingConfig, init_tracing};
use radio_coach::infrastructure::persistence::{
    InMemoryPhaseScoreRepository, InMemorySessionRepository, PgPhaseScoreRepository,
    PgSessionRepository, create_pool, run_migrations,
};
use radio_coach::infrastructure::scenarios::FileScenarioCatalog;
use radio_coach::infrastructure::speech::AzureSpeechSynthesizer;
use radio_coach::infrastructure::storage::AudioStoreFactory;
use radio_coach::presentation::config::{
    RadioSettings, SessionStoreProvider, Settings, StorageProviderSetting,
};
use radio_coach::presentation::{AppState, Environment, create_router};

fn load_settings() -> anyhow::Result<(Environment, Settings)> {
    dotenvy::dotenv().ok();

    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(anyhow::Error::msg)?;

    let settings = Config::builder()
        .add_source(File::with_name(&environment.settings_file()).required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?
        .try_deserialize::<Settings>()
        .context("invalid configuration")?;

    Ok((environment, settings))
}

async fn build_repositories(
    settings: &Settings,
) -> anyhow::Result<(Arc<dyn SessionRepository>, Arc<dyn PhaseScoreRepository>)> {
    match settings.session_store.provider {
        SessionStoreProvider::Memory => {
            tracing::warn!("Using in-memory session store; sessions are lost on restart");
            Ok((
                Arc::new(InMemorySessionRepository::new()),
                Arc::new(InMemoryPhaseScoreRepository::new()),
            ))
        }
        SessionStoreProvider::Postgres => {
            let pool = create_pool(&settings.database.url, settings.database.max_connections)
                .await
                .context("failed to connect to PostgreSQL")?;
            run_migrations(&pool).await?;
            Ok((
                Arc::new(PgSessionRepository::new(pool.clone())),
                Arc::new(PgPhaseScoreRepository::new(pool)),
            ))
        }
    }
}

/// The effect chain has to be designed for the rate the synthesizer emits.
fn radio_effects_for(radio: &RadioSettings, synthesizer_rate: u32) -> anyhow::Result<RadioEffectChain> {
    let configured = RadioEffectChain::new(radio.into()).context("invalid radio effect settings")?;
    if radio.sample_rate == synthesizer_rate {
        return Ok(configured);
    }
    tracing::warn!(
        configured = radio.sample_rate,
        synthesizer = synthesizer_rate,
        "Radio sample rate differs from the synthesizer output, using the synthesizer rate"
    );
    configured
        .for_rate(synthesizer_rate)
        .context("radio effect settings do not fit the synthesizer sample rate")
}

async fn build_transmission_service(settings: &Settings) -> anyhow::Result<TransmissionService> {
    let (sessions, scores) = build_repositories(settings).await?;

    let catalog = Arc::new(FileScenarioCatalog::load(&settings.scenarios)?);
    let transcription = TranscriptionEngineFactory::create(&settings.transcription)?;

    let controller_client: Arc<dyn LlmClient> =
        Arc::new(create_chat_completion_client(&settings.llm)?.with_json_mode(true));
    let cleaner = if settings.transcript_cleaning.enabled {
        let client = create_cleaning_client(&settings.llm, &settings.transcript_cleaning)?;
        tracing::info!(model = %client.model(), "Transcript cleaning enabled");
        Some(TranscriptCleaner::new(Arc::new(client)))
    } else {
        None
    };

    let synthesizer = Arc::new(AzureSpeechSynthesizer::from_settings(&settings.speech));
    let audio_store = AudioStoreFactory::create(&settings.storage)?;
    let effects = radio_effects_for(&settings.radio, synthesizer.sample_rate())?;
    let speech = RadioSpeechService::new(
        synthesizer,
        audio_store,
        effects,
        settings.speech.voice_settings(),
    );

    Ok(TransmissionService::new(
        sessions,
        scores,
        transcription,
        cleaner,
        ScenarioResolver::new(catalog),
        PromptAssembler::new(),
        ControllerLlm::new(controller_client, settings.llm.contract_retries),
        speech,
    ))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (environment, settings) = load_settings()?;

    init_tracing(
        &TracingConfig::from_settings(&environment, &settings.logging),
        settings.server.port,
    );

    let transmission_service = Arc::new(build_transmission_service(&settings).await?);

    let media_root = (settings.storage.provider == StorageProviderSetting::Local)
        .then(|| PathBuf::from(&settings.storage.local_path));

    let state = AppState {
        transmission_service,
        media_root,
        max_upload_bytes: settings.server.max_upload_bytes,
    };

    let router = create_router(state);

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .context("invalid server host/port")?;
    tracing::info!(%addr, "Listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
