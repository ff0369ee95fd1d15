//! Resolution of a document node to the view element anchoring it

use log::debug;

use crate::error::{Result, SyncError};
use crate::tree::{DocTree, NodeId, NodeKind};
use crate::view::{ElementId, ViewTree};

/// A document node paired with the element anchoring it in the view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollAnchor {
    pub node: NodeId,
    pub element: ElementId,
}

/// Resolve the element that anchors scroll computations for `node`.
///
/// Three phases:
/// 1. Ascend parent links until a node with a bound element is found. The
///    document root must be bound, so running past it is a malformed view.
/// 2. While the node is table substructure or starts on the same line as its
///    parent, step to the parent. Table internals and same-line wrappers
///    never mark an independent scroll boundary; unbound ancestors may be
///    crossed on the way, only the node the collapse settles on needs a
///    binding.
/// 3. While the node is a container kind, step to its first child and the
///    element's first child in lockstep. A missing child on either side
///    means the trees are out of step.
pub fn resolve_anchor(doc: &DocTree, view: &ViewTree, node: NodeId) -> Result<ScrollAnchor> {
    let mut node = node;
    while view.element_of(node).is_none() {
        node = doc.parent(node).ok_or(SyncError::UnboundRoot)?;
    }

    while doc.kind(node).is_table_part() || has_same_line_parent(doc, node) {
        match doc.parent(node) {
            Some(parent) => node = parent,
            None => break,
        }
    }
    let mut element = view.element_of(node).ok_or(SyncError::UnboundNode(node))?;

    while doc.kind(node).is_container() {
        let child = doc.first_child(node).ok_or(SyncError::TreeDesync(node))?;
        let child_el = view.first_child(element).ok_or(SyncError::TreeDesync(node))?;
        node = child;
        element = child_el;
    }

    debug!("anchor resolved to node {:?}, element {:?}", node, element);
    Ok(ScrollAnchor { node, element })
}

/// True when the parent starts on the node's own start line.
///
/// The document root never counts, and only start lines are compared; nodes
/// whose end lines coincide are not collapsed.
fn has_same_line_parent(doc: &DocTree, node: NodeId) -> bool {
    match doc.parent(node) {
        Some(parent) => {
            doc.kind(parent) != NodeKind::Document
                && doc.start_line(parent) == doc.start_line(node)
        }
        None => false,
    }
}
