//! Mdscroll Core - Scroll synchronization between a markdown source and its preview
//!
//! This crate maps scroll offsets between the two panes of a split editor,
//! independent of any parser or rendering concerns:
//! - Document tree with 1-based source spans, supplied by the host parser
//! - View tree of positioned elements, optionally bound to document nodes
//! - Rope-based source buffer carrying per-line pixel heights
//! - Anchor resolution and offset interpolation in both directions

pub mod buffer;
pub mod error;
pub mod height;
pub mod offset;
pub mod resolve;
pub mod sync;
pub mod tree;
pub mod view;

// Re-export commonly used types
pub use buffer::{LineMetrics, LineRecord, MeasuredBuffer};
pub use error::{Result, SyncError};
pub use height::source_range_height;
pub use offset::{element_at_offset, interpolate_offset, total_offset_top};
pub use resolve::{resolve_anchor, ScrollAnchor};
pub use sync::SyncContext;
pub use tree::{DocTree, NodeId, NodeKind, SourcePos, SourceSpan};
pub use view::{is_nestable_tag, ElementId, ViewElement, ViewTree, NESTABLE_TAGS};
