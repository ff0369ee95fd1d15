//! Error types for scroll synchronization

use thiserror::Error;

use crate::tree::NodeId;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, SyncError>;

/// Consistency violations between the document tree and the rendered view.
///
/// Degenerate geometry (inverted ranges, out-of-range offsets) is not an
/// error; computations saturate instead. These variants only cover trees the
/// host handed over in a malformed state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SyncError {
    /// The document root has no bound view element
    #[error("document root has no bound view element")]
    UnboundRoot,

    /// A node reached during anchor collapse has no bound view element
    #[error("no view element bound to node {0:?}")]
    UnboundNode(NodeId),

    /// Document and view trees disagree on child structure under a container
    #[error("view tree out of step with document tree at node {0:?}")]
    TreeDesync(NodeId),
}
