//! Settings types. Every struct is `#[serde(default)]`, so a settings file
//! may name only the fields it changes.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use alttext_core::generator::{
    DEFAULT_BASE_URL, DEFAULT_INSTRUCTION, DEFAULT_MODEL, PLACEHOLDER_DRAFT,
};
use alttext_core::security::env_vars;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AltTextSettings {
    pub generator: GeneratorSettings,
    pub logging: LoggingSettings,
}

/// Remote vision model and the fixed prompt sent with every image.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneratorSettings {
    /// OpenAI-compatible API root; `/chat/completions` is appended.
    pub base_url: String,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub top_p: f64,
    pub instruction: String,
    /// Name of the environment variable holding the bearer token.
    pub api_key_env: String,
    pub request_timeout_secs: u64,
    /// Draft stored when the model answers with nothing.
    pub placeholder_text: String,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            max_tokens: 200,
            top_p: 1.0,
            instruction: DEFAULT_INSTRUCTION.to_string(),
            api_key_env: env_vars::GROQ_API_KEY.to_string(),
            request_timeout_secs: 60,
            placeholder_text: PLACEHOLDER_DRAFT.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    pub level: String,
    pub json: bool,
    /// Per-target overrides, e.g. `{"alttext_llm": "debug"}`.
    pub module_levels: HashMap<String, String>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            module_levels: HashMap::new(),
        }
    }
}
