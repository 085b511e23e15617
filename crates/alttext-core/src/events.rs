use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{NodeId, ScanId};
use crate::item::ItemStatus;

/// Registry change notifications for the operator surface.
/// Each event is emitted after the mutation it describes is complete.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RegistryEvent {
    /// The whole working set was swapped for a new scan result.
    Replaced {
        scan_id: ScanId,
        item_count: usize,
        at: DateTime<Utc>,
    },

    ItemChanged {
        scan_id: ScanId,
        node_id: NodeId,
        status: ItemStatus,
    },
}

impl RegistryEvent {
    pub fn scan_id(&self) -> &ScanId {
        match self {
            Self::Replaced { scan_id, .. } | Self::ItemChanged { scan_id, .. } => scan_id,
        }
    }
}
