use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use parking_lot::RwLock;
use tokio::sync::broadcast;

use alttext_core::events::RegistryEvent;
use alttext_core::ids::{NodeId, ScanId};
use alttext_core::item::{ImageItem, ItemStatus};

use crate::error::EngineError;

const EVENT_CAPACITY: usize = 256;

/// Handle for landing the result of suspended work on one item.
///
/// Work that suspends (a remote call, a canvas write) holds a ticket and
/// lands its result through [`ImageRegistry::update`] or
/// [`ImageRegistry::update_same_image`]. A rescan does not invalidate a
/// ticket; removing the item from the working set does.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ticket {
    scan_id: ScanId,
    node_id: NodeId,
    source_url: String,
}

impl Ticket {
    /// Scan the item was read from when the work started.
    pub fn scan_id(&self) -> &ScanId {
        &self.scan_id
    }

    pub fn node_id(&self) -> &NodeId {
        &self.node_id
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }
}

/// Issue order of a scan. A scan only installs its result if no scan
/// issued after it has landed first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct ScanSeq(u64);

/// Consistent copy of the whole working set.
#[derive(Clone, Debug, PartialEq)]
pub struct RegistrySnapshot {
    pub scan_id: ScanId,
    pub items: Vec<ImageItem>,
}

struct RegistryState {
    scan_id: ScanId,
    items: Vec<ImageItem>,
    landed: ScanSeq,
}

impl RegistryState {
    fn find(&self, id: &NodeId) -> Option<&ImageItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    fn find_mut(&mut self, id: &NodeId) -> Option<&mut ImageItem> {
        self.items.iter_mut().find(|item| &item.id == id)
    }
}

/// The current working set of discovered images.
///
/// Every method takes the lock for one short synchronous step and never
/// across an await, so each mutation is observed whole or not at all.
pub struct ImageRegistry {
    state: RwLock<RegistryState>,
    events: broadcast::Sender<RegistryEvent>,
    scans_issued: AtomicU64,
}

impl ImageRegistry {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            state: RwLock::new(RegistryState {
                scan_id: ScanId::new(),
                items: Vec::new(),
                landed: ScanSeq(0),
            }),
            events,
            scans_issued: AtomicU64::new(0),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RegistryEvent> {
        self.events.subscribe()
    }

    pub fn scan_id(&self) -> ScanId {
        self.state.read().scan_id.clone()
    }

    pub fn snapshot(&self) -> RegistrySnapshot {
        let state = self.state.read();
        RegistrySnapshot {
            scan_id: state.scan_id.clone(),
            items: state.items.clone(),
        }
    }

    pub fn items(&self) -> Vec<ImageItem> {
        self.state.read().items.clone()
    }

    pub fn get(&self, id: &NodeId) -> Option<ImageItem> {
        self.state.read().find(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.state.read().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().items.is_empty()
    }

    /// Reserve a position for a scan about to read the canvas.
    pub fn begin_scan(&self) -> ScanSeq {
        ScanSeq(self.scans_issued.fetch_add(1, Ordering::AcqRel) + 1)
    }

    /// Swap in a complete new result set unconditionally.
    pub fn replace_all(&self, items: Vec<ImageItem>) -> RegistrySnapshot {
        let seq = self.begin_scan();
        let mut state = self.state.write();
        self.install(&mut state, seq, items)
    }

    /// Install the result of scan `seq`, or return `None` when a scan issued
    /// later already replaced the set.
    pub fn replace_from_scan(
        &self,
        seq: ScanSeq,
        items: Vec<ImageItem>,
    ) -> Option<RegistrySnapshot> {
        let mut state = self.state.write();
        if seq < state.landed {
            return None;
        }
        Some(self.install(&mut state, seq, items))
    }

    /// Later duplicates of an id are dropped. An item whose generation is
    /// still in flight for the same image stays `Generating`, so that
    /// generation remains the only draft writer.
    fn install(
        &self,
        state: &mut RegistryState,
        seq: ScanSeq,
        items: Vec<ImageItem>,
    ) -> RegistrySnapshot {
        let mut seen = HashSet::new();
        let mut items: Vec<ImageItem> = items
            .into_iter()
            .filter(|item| seen.insert(item.id.clone()))
            .collect();

        for item in &mut items {
            let in_flight = state
                .find(&item.id)
                .is_some_and(|prev| prev.is_generating() && prev.source_url == item.source_url);
            if in_flight {
                item.status = ItemStatus::Generating;
            }
        }

        let scan_id = ScanId::new();
        state.scan_id = scan_id.clone();
        state.items = items;
        state.landed = state.landed.max(seq);

        let _ = self.events.send(RegistryEvent::Replaced {
            scan_id: scan_id.clone(),
            item_count: state.items.len(),
            at: Utc::now(),
        });
        RegistrySnapshot {
            scan_id,
            items: state.items.clone(),
        }
    }

    /// Run `f` against the current record for `id` and hand back a ticket
    /// for completing work on it later. Nothing changes if `f` errors.
    pub fn update_current<R>(
        &self,
        id: &NodeId,
        f: impl FnOnce(&mut ImageItem) -> Result<R, EngineError>,
    ) -> Result<(Ticket, R), EngineError> {
        let mut state = self.state.write();
        let scan_id = state.scan_id.clone();
        let item = state
            .find_mut(id)
            .ok_or_else(|| EngineError::UnknownItem(id.clone()))?;

        let mut working = item.clone();
        let result = f(&mut working)?;
        let source_url = working.source_url.clone();
        if working != *item {
            *item = working;
            let _ = self.events.send(RegistryEvent::ItemChanged {
                scan_id: scan_id.clone(),
                node_id: id.clone(),
                status: item.status.clone(),
            });
        }

        Ok((
            Ticket {
                scan_id,
                node_id: id.clone(),
                source_url,
            },
            result,
        ))
    }

    /// Land a completion on the ticket's item in whatever set is current.
    /// Returns the updated item, or `None` when the item is no longer in the
    /// working set and nothing was written.
    pub fn update(&self, ticket: &Ticket, f: impl FnOnce(&mut ImageItem)) -> Option<ImageItem> {
        self.land(ticket, false, f)
    }

    /// Like [`Self::update`], but also treats the ticket as stale when the
    /// item now points at a different image.
    pub fn update_same_image(
        &self,
        ticket: &Ticket,
        f: impl FnOnce(&mut ImageItem),
    ) -> Option<ImageItem> {
        self.land(ticket, true, f)
    }

    fn land(
        &self,
        ticket: &Ticket,
        same_image: bool,
        f: impl FnOnce(&mut ImageItem),
    ) -> Option<ImageItem> {
        let mut state = self.state.write();
        let scan_id = state.scan_id.clone();
        let item = state.find_mut(&ticket.node_id)?;
        if same_image && item.source_url != ticket.source_url {
            return None;
        }
        if scan_id != ticket.scan_id {
            tracing::debug!(
                node_id = %ticket.node_id,
                from_scan = %ticket.scan_id,
                to_scan = %scan_id,
                "completion carried across rescan"
            );
        }
        f(item);
        let updated = item.clone();

        let _ = self.events.send(RegistryEvent::ItemChanged {
            scan_id,
            node_id: ticket.node_id.clone(),
            status: updated.status.clone(),
        });
        Some(updated)
    }
}

impl Default for ImageRegistry {
    fn default() -> Self {
        Self::new()
    }
}
