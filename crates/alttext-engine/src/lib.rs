//! Image discovery, alt-text generation and apply orchestration.
//!
//! [`ImageRegistry`] is the single mutable working set. [`Scanner`],
//! [`GenerationOrchestrator`] and [`ApplyOrchestrator`] are the only code
//! that mutates it, always addressing one item by id. [`Workbench`] wires
//! them together for an operator surface.

pub mod apply;
pub mod canvas;
pub mod error;
pub mod generate;
pub mod messages;
pub mod registry;
pub mod scan;
pub mod view;
pub mod workbench;

pub use apply::{ApplyOrchestrator, ApplyOutcome};
pub use canvas::MemoryCanvas;
pub use error::EngineError;
pub use generate::{GenerateOutcome, GenerationConfig, GenerationOrchestrator};
pub use registry::{ImageRegistry, RegistrySnapshot, ScanSeq, Ticket};
pub use scan::{Discovery, ScanOutcome, Scanner};
pub use view::ItemView;
pub use workbench::Workbench;
