use std::sync::Arc;

use tracing::instrument;

use alttext_core::canvas::{CanvasGateway, CanvasNode};
use alttext_core::errors::CanvasError;
use alttext_core::ids::ScanId;
use alttext_core::item::ImageItem;

use crate::registry::{ImageRegistry, RegistrySnapshot};

/// Where a scan's candidates came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Discovery {
    /// Enumerated background-image objects.
    Enumerated,
    /// Nothing enumerable; fell back to the active selection.
    Selection,
    /// Neither source produced a candidate.
    Nothing,
    /// The host call failed; the set was emptied.
    Failed,
}

/// Result of one scan. `scan_id` and `items` describe the working set the
/// registry holds once the scan is done.
#[derive(Clone, Debug)]
pub struct ScanOutcome {
    pub scan_id: ScanId,
    pub items: Vec<ImageItem>,
    pub discovery: Discovery,
    /// Candidates skipped for having no usable image source.
    pub ineligible: usize,
    /// A scan issued later finished first; this scan's findings were
    /// dropped and `items` is that newer set.
    pub superseded: bool,
}

/// Populates the registry from the canvas host.
pub struct Scanner {
    canvas: Arc<dyn CanvasGateway>,
    registry: Arc<ImageRegistry>,
}

impl Scanner {
    pub fn new(canvas: Arc<dyn CanvasGateway>, registry: Arc<ImageRegistry>) -> Self {
        Self { canvas, registry }
    }

    /// Discover images and replace the working set in one step. Never
    /// fails: a host fault degrades to an empty set.
    #[instrument(skip(self))]
    pub async fn scan(&self) -> ScanOutcome {
        let seq = self.registry.begin_scan();
        let (candidates, discovery) = match self.discover().await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(error_kind = e.error_kind(), error = %e, "image scan failed");
                (Vec::new(), Discovery::Failed)
            }
        };

        let total = candidates.len();
        let items: Vec<ImageItem> = candidates.iter().filter_map(ImageItem::from_node).collect();
        let ineligible = total - items.len();

        let (RegistrySnapshot { scan_id, items }, superseded) =
            match self.registry.replace_from_scan(seq, items) {
                Some(snapshot) => (snapshot, false),
                None => {
                    tracing::debug!("newer scan already landed, dropping result");
                    (self.registry.snapshot(), true)
                }
            };
        tracing::info!(
            scan_id = %scan_id,
            found = items.len(),
            ineligible,
            discovery = ?discovery,
            superseded,
            "scan complete"
        );

        ScanOutcome {
            scan_id,
            items,
            discovery,
            ineligible,
            superseded,
        }
    }

    async fn discover(&self) -> Result<(Vec<CanvasNode>, Discovery), CanvasError> {
        let nodes = self.canvas.list_image_nodes().await?;
        if !nodes.is_empty() {
            return Ok((nodes, Discovery::Enumerated));
        }

        tracing::debug!("no image nodes found, trying selected image");
        match self.canvas.selected_image().await? {
            Some(node) => Ok((vec![node], Discovery::Selection)),
            None => Ok((Vec::new(), Discovery::Nothing)),
        }
    }
}
