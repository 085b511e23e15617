use alttext_core::ids::NodeId;

/// Caller mistakes. Collaborator faults never surface here; they are
/// recorded on the item instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("no image with id {0} in the current scan")]
    UnknownItem(NodeId),

    #[error("image {0} is still generating")]
    Busy(NodeId),
}
