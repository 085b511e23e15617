pub mod canvas;
pub mod errors;
pub mod events;
pub mod generator;
pub mod ids;
pub mod item;
pub mod security;

pub use canvas::{CanvasGateway, CanvasNode, ImageAttachment, NodeAttributes};
pub use errors::{CanvasError, GeneratorError};
pub use events::RegistryEvent;
pub use generator::{AltTextGenerator, DescribeRequest};
pub use ids::{NodeId, ScanId};
pub use item::{ImageItem, ItemStatus};
