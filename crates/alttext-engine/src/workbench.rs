use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::broadcast;

use alttext_core::canvas::CanvasGateway;
use alttext_core::events::RegistryEvent;
use alttext_core::generator::AltTextGenerator;
use alttext_core::ids::NodeId;

use crate::apply::{ApplyOrchestrator, ApplyOutcome};
use crate::error::EngineError;
use crate::generate::{GenerateOutcome, GenerationConfig, GenerationOrchestrator};
use crate::registry::ImageRegistry;
use crate::scan::{ScanOutcome, Scanner};
use crate::view::ItemView;

/// Everything the operator surface drives: scan, per-item generate and
/// apply, draft edits, and read-only views of the working set.
///
/// All methods take `&self`; wrap in an `Arc` and call from as many tasks
/// as needed.
pub struct Workbench {
    registry: Arc<ImageRegistry>,
    scanner: Scanner,
    generation: GenerationOrchestrator,
    apply: ApplyOrchestrator,
    scans_in_flight: AtomicUsize,
}

impl Workbench {
    pub fn new(
        canvas: Arc<dyn CanvasGateway>,
        generator: Arc<dyn AltTextGenerator>,
        config: GenerationConfig,
    ) -> Self {
        let registry = Arc::new(ImageRegistry::new());
        Self {
            scanner: Scanner::new(Arc::clone(&canvas), Arc::clone(&registry)),
            generation: GenerationOrchestrator::new(Arc::clone(&registry), generator, config),
            apply: ApplyOrchestrator::new(canvas, Arc::clone(&registry)),
            registry,
            scans_in_flight: AtomicUsize::new(0),
        }
    }

    pub async fn scan(&self) -> ScanOutcome {
        let _guard = ScanGuard::enter(&self.scans_in_flight);
        self.scanner.scan().await
    }

    pub fn is_scanning(&self) -> bool {
        self.scans_in_flight.load(Ordering::Acquire) > 0
    }

    pub async fn generate(&self, id: &NodeId) -> Result<GenerateOutcome, EngineError> {
        self.generation.generate(id).await
    }

    pub async fn apply(&self, id: &NodeId) -> Result<ApplyOutcome, EngineError> {
        self.apply.apply(id).await
    }

    /// Replace an item's draft with operator input. Allowed in any status.
    /// An edit made while the item is generating is replaced by the
    /// generated draft when it arrives.
    pub fn edit_draft(&self, id: &NodeId, text: impl Into<String>) -> Result<ItemView, EngineError> {
        let text = text.into();
        let (_, view) = self.registry.update_current(id, |item| {
            item.edit_draft(text);
            Ok(ItemView::from(&*item))
        })?;
        Ok(view)
    }

    pub fn items(&self) -> Vec<ItemView> {
        self.registry.items().iter().map(ItemView::from).collect()
    }

    pub fn item(&self, id: &NodeId) -> Option<ItemView> {
        self.registry.get(id).as_ref().map(ItemView::from)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RegistryEvent> {
        self.registry.subscribe()
    }

    pub fn registry(&self) -> &Arc<ImageRegistry> {
        &self.registry
    }
}

/// Counts a scan as in flight until dropped, including on cancellation.
struct ScanGuard<'a>(&'a AtomicUsize);

impl<'a> ScanGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::AcqRel);
        Self(counter)
    }
}

impl Drop for ScanGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}
