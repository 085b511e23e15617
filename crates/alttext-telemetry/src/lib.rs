use std::str::FromStr;

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TelemetryError {
    #[error("a global tracing subscriber is already installed")]
    AlreadyInitialised,
    #[error("invalid log level: {0}")]
    InvalidLevel(String),
}

/// Configuration for the tracing subscriber.
#[derive(Clone, Debug)]
pub struct TelemetryConfig {
    /// Default log level. Overridden by RUST_LOG env var.
    pub log_level: Level,
    /// Per-module level overrides (e.g. "alttext_llm" => DEBUG).
    pub module_levels: Vec<(String, Level)>,
    /// JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: Level::INFO,
            module_levels: Vec::new(),
            json: false,
        }
    }
}

impl TelemetryConfig {
    /// Build from textual levels such as `"info"` or `"DEBUG"`.
    pub fn from_levels<'a>(
        level: &str,
        module_levels: impl IntoIterator<Item = (&'a str, &'a str)>,
        json: bool,
    ) -> Result<Self, TelemetryError> {
        let module_levels = module_levels
            .into_iter()
            .map(|(module, lvl)| Ok((module.to_string(), parse_level(lvl)?)))
            .collect::<Result<Vec<_>, TelemetryError>>()?;
        Ok(Self {
            log_level: parse_level(level)?,
            module_levels,
            json,
        })
    }

    /// `EnvFilter` directives, e.g. `info,alttext_llm=debug`.
    pub fn filter_directives(&self) -> String {
        let mut filter = self.log_level.to_string().to_lowercase();
        for (module, level) in &self.module_levels {
            filter.push_str(&format!(",{}={}", module, level.to_string().to_lowercase()));
        }
        filter
    }
}

pub fn parse_level(level: &str) -> Result<Level, TelemetryError> {
    Level::from_str(level.trim()).map_err(|_| TelemetryError::InvalidLevel(level.to_string()))
}

/// Install the global subscriber. Call once at startup; later calls return
/// [`TelemetryError::AlreadyInitialised`] and leave the first one in place.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.filter_directives()));

    let json_layer = config.json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_span_list(true)
    });
    let text_layer = (!config.json).then(|| tracing_subscriber::fmt::layer().with_target(true));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .try_init()
        .map_err(|_| TelemetryError::AlreadyInitialised)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_include_module_levels() {
        let config = TelemetryConfig {
            log_level: Level::WARN,
            module_levels: vec![("alttext_llm".into(), Level::DEBUG)],
            json: false,
        };
        assert_eq!(config.filter_directives(), "warn,alttext_llm=debug");
    }

    #[test]
    fn from_levels_parses_case_insensitively() {
        let config = TelemetryConfig::from_levels("INFO", [("alttext_engine", "trace")], true).unwrap();
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.module_levels, vec![("alttext_engine".to_string(), Level::TRACE)]);
        assert!(config.json);
    }

    #[test]
    fn rejects_unknown_level() {
        let err = TelemetryConfig::from_levels("loud", std::iter::empty(), false).unwrap_err();
        assert_eq!(err, TelemetryError::InvalidLevel("loud".into()));
    }

    #[test]
    fn second_init_reports_already_initialised() {
        let config = TelemetryConfig::default();
        let _ = init_telemetry(&config);
        assert_eq!(init_telemetry(&config), Err(TelemetryError::AlreadyInitialised));
    }
}
