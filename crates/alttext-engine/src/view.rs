use serde::Serialize;

use alttext_core::ids::NodeId;
use alttext_core::item::ImageItem;

/// Render-ready projection of one [`ImageItem`] for the operator list.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemView {
    pub id: NodeId,
    pub display_name: String,
    pub preview_url: String,
    pub committed_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draft_text: Option<String>,
    pub status: &'static str,
    pub generate_label: &'static str,
    pub can_generate: bool,
    pub can_apply: bool,
    pub shows_draft_editor: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&ImageItem> for ItemView {
    fn from(item: &ImageItem) -> Self {
        let generating = item.is_generating();
        Self {
            id: item.id.clone(),
            display_name: item.display_name.clone(),
            preview_url: item.source_url.clone(),
            committed_text: item.committed_text.clone(),
            draft_text: item.draft_text.clone(),
            status: item.status.label(),
            generate_label: if generating { "Generating..." } else { "Generate" },
            can_generate: !generating,
            can_apply: !generating,
            shows_draft_editor: item.draft_text.is_some(),
            error: item.last_error().map(str::to_string),
        }
    }
}
