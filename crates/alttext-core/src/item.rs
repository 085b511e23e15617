//! Per-image accessibility-text record and its status machine.
//!
//! ```text
//! Idle ----generate----> Generating
//! Generating --ok------> Idle   (draft set)
//! Generating --fault---> Error
//! Error ----generate---> Generating
//! Idle/Error --apply ok----> Idle  (committed text updated)
//! Idle/Error --apply fault-> Error
//! ```

use serde::{Deserialize, Serialize};

use crate::canvas::CanvasNode;
use crate::ids::NodeId;

/// Item status. The error message lives inside `Error`, so an item can
/// never be generating and failed at the same time.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ItemStatus {
    #[default]
    Idle,
    Generating,
    Error {
        message: String,
    },
}

impl ItemStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Generating => "generating",
            Self::Error { .. } => "error",
        }
    }
}

/// One discovered image.
///
/// `id` is also the handle back into the canvas: the item keeps no copy of
/// the host object, so writes always go through the gateway's live node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageItem {
    pub id: NodeId,
    pub display_name: String,
    pub source_url: String,
    /// Alt text on the canvas as last read or last successfully applied.
    pub committed_text: String,
    pub draft_text: Option<String>,
    pub status: ItemStatus,
}

impl ImageItem {
    pub fn new(id: NodeId, source_url: impl Into<String>) -> Self {
        Self {
            display_name: default_display_name(&id),
            id,
            source_url: source_url.into(),
            committed_text: String::new(),
            draft_text: None,
            status: ItemStatus::Idle,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    pub fn with_committed_text(mut self, text: impl Into<String>) -> Self {
        self.committed_text = text.into();
        self
    }

    /// Build a fresh item from a scanned node. `None` if the node has no
    /// usable image source (ineligible, not an error).
    pub fn from_node(node: &CanvasNode) -> Option<Self> {
        let attachment = node.image.as_ref()?;
        let url = attachment.resolvable_url()?;

        let mut item = Self::new(node.id.clone(), url);
        if let Some(name) = node.name.as_deref().filter(|n| !n.trim().is_empty()) {
            item.display_name = name.to_string();
        }
        item.committed_text = attachment.alt_text.clone().unwrap_or_default();
        Some(item)
    }

    pub fn last_error(&self) -> Option<&str> {
        match &self.status {
            ItemStatus::Error { message } => Some(message),
            _ => None,
        }
    }

    pub fn is_generating(&self) -> bool {
        matches!(self.status, ItemStatus::Generating)
    }

    pub fn has_source(&self) -> bool {
        !self.source_url.trim().is_empty()
    }

    /// Text an apply would commit: the trimmed draft if non-empty, else the
    /// trimmed committed text.
    pub fn effective_text(&self) -> String {
        self.draft_text
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| self.committed_text.trim())
            .to_string()
    }

    pub fn begin_generation(&mut self) {
        self.status = ItemStatus::Generating;
    }

    pub fn finish_generation(&mut self, draft: String) {
        self.draft_text = Some(draft);
        self.status = ItemStatus::Idle;
    }

    pub fn mark_commit(&mut self, text: String) {
        self.committed_text = text;
        self.status = ItemStatus::Idle;
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = ItemStatus::Error {
            message: message.into(),
        };
    }

    /// Manual edit. Never touches status.
    pub fn edit_draft(&mut self, text: impl Into<String>) {
        self.draft_text = Some(text.into());
    }
}

fn default_display_name(id: &NodeId) -> String {
    format!("Image {id}")
}
