//! # alttext-settings
//!
//! Compiled defaults, then `~/.alttext/settings.json` deep-merged over them,
//! then `ALTTEXT_*` environment overrides.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{deep_merge, load_settings, load_settings_from_path, settings_path};
pub use types::*;
