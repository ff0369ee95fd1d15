//! Pixel height of a node's source-line range

use log::debug;

use crate::buffer::LineMetrics;
use crate::tree::{DocTree, NodeId};

/// Pixel height occupied by `node`'s source range starting at `start_line`.
///
/// The range ends at the last line of the node's deepest last descendant.
/// Blank lines in [start_line, end_line) are subtracted from the range; the
/// end line itself is never subtracted. A non-positive result falls back to
/// `fallback_height`, the single-line height at `start_line`.
pub fn source_range_height<M: LineMetrics>(
    doc: &DocTree,
    node: NodeId,
    start_line: u32,
    metrics: &M,
    fallback_height: f64,
) -> f64 {
    let end_line = doc.end_line(doc.last_leaf(node));
    let raw = metrics.height_through(end_line)
        - metrics.height_through(start_line)
        - empty_line_height(doc, node, start_line, end_line, metrics);

    if raw > 0.0 {
        raw
    } else {
        debug!(
            "degenerate source range {}..{}, falling back to single-line height",
            start_line, end_line
        );
        fallback_height
    }
}

/// Total height of the blank lines in [start, end)
fn empty_line_height<M: LineMetrics>(
    doc: &DocTree,
    node: NodeId,
    start: u32,
    end: u32,
    metrics: &M,
) -> f64 {
    let mut total = 0.0;
    for line in start..end {
        if let Some(record) = metrics.line(line) {
            if doc.is_empty_source_line(&record.text, node) {
                total += record.height;
            }
        }
    }
    total
}
