//! Operator-facing item messages. Fixed strings; fault detail goes to logs.

pub const NO_IMAGE_SOURCE: &str = "No image source";
pub const GENERATION_FAILED: &str = "Failed to generate alt text";
pub const APPLY_FAILED: &str = "Failed to apply alt text";

pub use alttext_core::generator::{DEFAULT_INSTRUCTION, PLACEHOLDER_DRAFT};
