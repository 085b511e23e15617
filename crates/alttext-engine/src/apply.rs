use std::sync::Arc;

use tracing::instrument;

use alttext_core::canvas::{CanvasGateway, NodeAttributes};
use alttext_core::errors::CanvasError;
use alttext_core::ids::NodeId;

use crate::error::EngineError;
use crate::messages;
use crate::registry::ImageRegistry;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The canvas now carries `text`, and so does `committed_text`.
    Committed { text: String },
    /// The write did not happen; `committed_text` is unchanged.
    Failed,
    /// The item left the working set while writing; registry untouched.
    Stale,
}

/// Commits an item's chosen text back onto its canvas object.
pub struct ApplyOrchestrator {
    canvas: Arc<dyn CanvasGateway>,
    registry: Arc<ImageRegistry>,
}

impl ApplyOrchestrator {
    pub fn new(canvas: Arc<dyn CanvasGateway>, registry: Arc<ImageRegistry>) -> Self {
        Self { canvas, registry }
    }

    #[instrument(skip(self), fields(node_id = %id))]
    pub async fn apply(&self, id: &NodeId) -> Result<ApplyOutcome, EngineError> {
        let (ticket, text) = self.registry.update_current(id, |item| {
            if item.is_generating() {
                return Err(EngineError::Busy(item.id.clone()));
            }
            Ok(item.effective_text())
        })?;

        let outcome = match self.write_alt_text(id, &text).await {
            Ok(()) => {
                let landed = self.registry.update(&ticket, |item| {
                    if item.is_generating() {
                        item.committed_text = text.clone();
                    } else {
                        item.mark_commit(text.clone());
                    }
                });
                match landed {
                    Some(_) => ApplyOutcome::Committed { text },
                    None => ApplyOutcome::Stale,
                }
            }
            Err(e) => {
                tracing::warn!(error_kind = e.error_kind(), error = %e, "apply failed");
                // A generation started meanwhile owns the status; it carries no error.
                let landed = self.registry.update(&ticket, |item| {
                    if !item.is_generating() {
                        item.fail(messages::APPLY_FAILED);
                    }
                });
                match landed {
                    Some(_) => ApplyOutcome::Failed,
                    None => ApplyOutcome::Stale,
                }
            }
        };

        if outcome == ApplyOutcome::Stale {
            tracing::debug!(scan_id = %ticket.scan_id(), "discarding stale apply result");
        }
        Ok(outcome)
    }

    /// Rewrite the live node's attachment with only the alt text replaced.
    async fn write_alt_text(&self, id: &NodeId, text: &str) -> Result<(), CanvasError> {
        let node = self
            .canvas
            .node(id)
            .await?
            .ok_or_else(|| CanvasError::NodeNotFound(id.clone()))?;

        if !node.supports_attribute_mutation() {
            return Err(CanvasError::NotMutable(id.clone()));
        }
        let attachment = node
            .image
            .as_ref()
            .ok_or_else(|| CanvasError::NotMutable(id.clone()))?;

        let patch = NodeAttributes::image_attachment(attachment.clone_with_alt_text(text));
        self.canvas.set_attributes(id, patch).await
    }
}
