use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::GeneratorError;

/// OpenAI-compatible API root used when none is configured (Groq).
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "meta-llama/llama-4-scout-17b-16e-instruct";
/// Fixed prompt sent with every image.
pub const DEFAULT_INSTRUCTION: &str = "Generate a concise and helpful alt text for accessibility:";
/// Draft stored when the model answers with nothing usable.
pub const PLACEHOLDER_DRAFT: &str = "No alt text generated";

/// A single description request. Carries nothing about any other item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescribeRequest {
    pub image_url: String,
    pub instruction: String,
}

impl DescribeRequest {
    pub fn new(image_url: impl Into<String>, instruction: impl Into<String>) -> Self {
        Self {
            image_url: image_url.into(),
            instruction: instruction.into(),
        }
    }
}

/// Remote service that describes an image in natural language.
///
/// One call is one attempt. Implementations must not retry; an empty
/// string is a valid (degraded) answer and is not an error.
#[async_trait]
pub trait AltTextGenerator: Send + Sync {
    fn name(&self) -> &str;
    fn model(&self) -> &str;

    async fn describe(&self, request: &DescribeRequest) -> Result<String, GeneratorError>;
}
