//! # alttext
//!
//! Host-embedding entry point. [`start`] loads settings, installs logging,
//! builds the chat-completions client once and hands back a scanned
//! [`Workbench`] for the host's operator surface.

use std::sync::Arc;
use std::time::Duration;

use alttext_core::canvas::CanvasGateway;
use alttext_core::errors::GeneratorError;
use alttext_core::security::ApiKey;
use alttext_llm::converter::SamplingParams;
use alttext_llm::{ChatCompletionsProvider, ProviderConfig};
use alttext_settings::{AltTextSettings, GeneratorSettings, LoggingSettings, SettingsError};
use alttext_telemetry::{TelemetryConfig, TelemetryError};

pub use alttext_core::{CanvasNode, ImageAttachment, ImageItem, ItemStatus, NodeId, RegistryEvent};
pub use alttext_engine::{
    ApplyOutcome, Discovery, EngineError, GenerateOutcome, GenerationConfig, ItemView,
    MemoryCanvas, ScanOutcome, Workbench,
};

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("failed to build generator client: {0}")]
    Generator(#[from] GeneratorError),
}

/// Start with settings from `~/.alttext/settings.json` and the environment.
pub async fn start(canvas: Arc<dyn CanvasGateway>) -> Result<Workbench, StartupError> {
    let settings = alttext_settings::load_settings()?;
    start_with_settings(canvas, &settings).await
}

pub async fn start_with_settings(
    canvas: Arc<dyn CanvasGateway>,
    settings: &AltTextSettings,
) -> Result<Workbench, StartupError> {
    init_logging(&settings.logging);
    let api_key = ApiKey::from_env(&settings.generator.api_key_env);
    assemble(canvas, &settings.generator, api_key).await
}

async fn assemble(
    canvas: Arc<dyn CanvasGateway>,
    settings: &GeneratorSettings,
    api_key: Option<ApiKey>,
) -> Result<Workbench, StartupError> {
    if api_key.is_none() {
        tracing::warn!(
            env = %settings.api_key_env,
            "no API key found; generation will fail until one is set"
        );
    }
    let provider = ChatCompletionsProvider::new(provider_config(settings), api_key)?;
    tracing::info!(endpoint = provider.endpoint(), model = %settings.model, "generator ready");

    let workbench = Workbench::new(canvas, Arc::new(provider), generation_config(settings));
    workbench.scan().await;
    Ok(workbench)
}

pub fn provider_config(settings: &GeneratorSettings) -> ProviderConfig {
    ProviderConfig {
        base_url: settings.base_url.clone(),
        model: settings.model.clone(),
        sampling: SamplingParams {
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            top_p: settings.top_p,
        },
        request_timeout: Duration::from_secs(settings.request_timeout_secs),
    }
}

pub fn generation_config(settings: &GeneratorSettings) -> GenerationConfig {
    GenerationConfig {
        instruction: settings.instruction.clone(),
        placeholder: settings.placeholder_text.clone(),
    }
}

/// A host that already installed a subscriber keeps it.
fn init_logging(settings: &LoggingSettings) {
    let modules = settings
        .module_levels
        .iter()
        .map(|(module, level)| (module.as_str(), level.as_str()));
    let config = TelemetryConfig::from_levels(&settings.level, modules, settings.json)
        .unwrap_or_else(|e| {
            eprintln!("alttext: {e}, falling back to default log levels");
            TelemetryConfig {
                json: settings.json,
                ..TelemetryConfig::default()
            }
        });

    match alttext_telemetry::init_telemetry(&config) {
        Ok(()) | Err(TelemetryError::AlreadyInitialised) => {}
        Err(e) => eprintln!("alttext: {e}"),
    }
}
