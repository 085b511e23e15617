use std::sync::Arc;

use tracing::instrument;

use alttext_core::generator::{AltTextGenerator, DescribeRequest};
use alttext_core::ids::NodeId;

use crate::error::EngineError;
use crate::messages;
use crate::registry::ImageRegistry;

/// Fixed prompt and the draft substituted for an empty answer.
#[derive(Clone, Debug)]
pub struct GenerationConfig {
    pub instruction: String,
    pub placeholder: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            instruction: messages::DEFAULT_INSTRUCTION.to_string(),
            placeholder: messages::PLACEHOLDER_DRAFT.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GenerateOutcome {
    /// A draft was stored. `degraded` means the placeholder was used.
    Drafted { text: String, degraded: bool },
    /// The generator faulted; the item is in `Error`.
    Failed,
    /// The item has no source; no remote call was made.
    NoSource,
    /// The item left the working set, or now shows a different image,
    /// while generating; result discarded.
    Stale,
}

/// Drives one item through generation. Calls for different items share
/// nothing but the registry and may overlap freely.
pub struct GenerationOrchestrator {
    registry: Arc<ImageRegistry>,
    generator: Arc<dyn AltTextGenerator>,
    config: GenerationConfig,
}

impl GenerationOrchestrator {
    pub fn new(
        registry: Arc<ImageRegistry>,
        generator: Arc<dyn AltTextGenerator>,
        config: GenerationConfig,
    ) -> Self {
        Self {
            registry,
            generator,
            config,
        }
    }

    #[instrument(skip(self), fields(node_id = %id, generator = self.generator.name()))]
    pub async fn generate(&self, id: &NodeId) -> Result<GenerateOutcome, EngineError> {
        let (ticket, source) = self.registry.update_current(id, |item| {
            if item.is_generating() {
                return Err(EngineError::Busy(item.id.clone()));
            }
            if !item.has_source() {
                item.fail(messages::NO_IMAGE_SOURCE);
                return Ok(None);
            }
            item.begin_generation();
            Ok(Some(item.source_url.clone()))
        })?;

        let Some(source_url) = source else {
            tracing::debug!("image has no source, skipping generation");
            return Ok(GenerateOutcome::NoSource);
        };

        let request = DescribeRequest::new(source_url, self.config.instruction.as_str());
        let result = self.generator.describe(&request).await;

        let outcome = match result {
            Ok(text) => {
                let trimmed = text.trim();
                let degraded = trimmed.is_empty();
                let draft = if degraded {
                    self.config.placeholder.clone()
                } else {
                    trimmed.to_string()
                };
                if degraded {
                    tracing::info!("generator returned no usable text, using placeholder");
                }

                match self
                    .registry
                    .update_same_image(&ticket, |item| item.finish_generation(draft.clone()))
                {
                    Some(_) => GenerateOutcome::Drafted {
                        text: draft,
                        degraded,
                    },
                    None => GenerateOutcome::Stale,
                }
            }
            Err(e) => {
                tracing::warn!(error_kind = e.error_kind(), error = %e, "alt text generation failed");
                match self
                    .registry
                    .update_same_image(&ticket, |item| item.fail(messages::GENERATION_FAILED))
                {
                    Some(_) => GenerateOutcome::Failed,
                    None => GenerateOutcome::Stale,
                }
            }
        };

        if outcome == GenerateOutcome::Stale {
            tracing::debug!(scan_id = %ticket.scan_id(), "discarding stale generation result");
        }
        Ok(outcome)
    }
}
