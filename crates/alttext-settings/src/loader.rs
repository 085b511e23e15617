//! Loading flow:
//! 1. compiled [`AltTextSettings::default()`]
//! 2. `~/.alttext/settings.json`, deep-merged over the defaults
//! 3. `ALTTEXT_*` environment overrides
//!
//! Merge rules: objects merge recursively, arrays and primitives are
//! replaced, nulls in the file are skipped.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::errors::Result;
use crate::types::AltTextSettings;

pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".alttext").join("settings.json")
}

pub fn load_settings() -> Result<AltTextSettings> {
    load_settings_from_path(&settings_path())
}

/// Missing file means defaults; unreadable or malformed JSON is an error.
pub fn load_settings_from_path(path: &Path) -> Result<AltTextSettings> {
    let defaults = serde_json::to_value(AltTextSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    let mut settings: AltTextSettings = serde_json::from_value(merged)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = match target_map.remove(&key) {
                    Some(target_val) => deep_merge(target_val, source_val),
                    None => source_val,
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

pub fn apply_env_overrides(settings: &mut AltTextSettings) {
    apply_overrides(settings, |name| std::env::var(name).ok());
}

/// Invalid values are ignored with a warning and the file/default value kept.
fn apply_overrides(settings: &mut AltTextSettings, lookup: impl Fn(&str) -> Option<String>) {
    let env = EnvReader { lookup };

    if let Some(v) = env.string("ALTTEXT_BASE_URL") {
        settings.generator.base_url = v;
    }
    if let Some(v) = env.string("ALTTEXT_MODEL") {
        settings.generator.model = v;
    }
    if let Some(v) = env.parsed("ALTTEXT_MAX_TOKENS", |s| parse_u32_range(s, 1, 4096)) {
        settings.generator.max_tokens = v;
    }
    if let Some(v) = env.parsed("ALTTEXT_TEMPERATURE", |s| parse_f64_range(s, 0.0, 2.0)) {
        settings.generator.temperature = v;
    }
    if let Some(v) = env.string("ALTTEXT_LOG_LEVEL") {
        settings.logging.level = v;
    }
    if let Some(v) = env.parsed("ALTTEXT_LOG_JSON", parse_bool) {
        settings.logging.json = v;
    }
}

/// Accepts (case-insensitive) `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

pub fn parse_u32_range(val: &str, min: u32, max: u32) -> Option<u32> {
    let n: u32 = val.trim().parse().ok()?;
    (min..=max).contains(&n).then_some(n)
}

pub fn parse_f64_range(val: &str, min: f64, max: f64) -> Option<f64> {
    let n: f64 = val.trim().parse().ok()?;
    (n.is_finite() && (min..=max).contains(&n)).then_some(n)
}

struct EnvReader<F> {
    lookup: F,
}

impl<F: Fn(&str) -> Option<String>> EnvReader<F> {
    fn string(&self, name: &str) -> Option<String> {
        (self.lookup)(name).filter(|v| !v.is_empty())
    }

    fn parsed<T>(&self, name: &str, parse: impl Fn(&str) -> Option<T>) -> Option<T> {
        let val = self.string(name)?;
        let result = parse(&val);
        if result.is_none() {
            tracing::warn!(key = name, value = %val, "invalid env var, ignoring");
        }
        result
    }
}
