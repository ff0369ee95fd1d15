//! Bidirectional scroll-offset mapping between editor and preview

use log::debug;

use crate::buffer::LineMetrics;
use crate::error::{Result, SyncError};
use crate::height::source_range_height;
use crate::offset::{element_at_offset, interpolate_offset, total_offset_top};
use crate::resolve::resolve_anchor;
use crate::tree::{DocTree, NodeId};
use crate::view::{ElementId, ViewTree};

/// Borrowed snapshot of the structures one sync computation reads.
///
/// The host captures its trees and metrics once per scroll event and asks
/// for the matching offset in the other pane. Nothing is cached between
/// calls; a stale event just yields a result the host may discard.
pub struct SyncContext<'a, M: LineMetrics> {
    pub doc: &'a DocTree,
    pub view: &'a ViewTree,
    pub metrics: &'a M,
}

impl<'a, M: LineMetrics> SyncContext<'a, M> {
    pub fn new(doc: &'a DocTree, view: &'a ViewTree, metrics: &'a M) -> Self {
        Self { doc, view, metrics }
    }

    /// Preview offset matching an editor scroll position.
    ///
    /// The first visible source line picks the anchoring node. Multi-line
    /// kinds scroll proportionally inside their rendered box; every other
    /// kind snaps to its element's top edge. A blank line between two
    /// blocks rides with the block above it unless the following block
    /// leads with media.
    pub fn preview_offset(&self, editor_top: f64) -> Result<f64> {
        if editor_top <= 0.0 {
            return Ok(0.0);
        }

        let line = self.metrics.line_at_height(editor_top);
        let node = match self.node_for_line(line) {
            Some(node) => node,
            None => return Ok(0.0),
        };
        let node = self.blank_gap_anchor(line, node);
        let anchor = resolve_anchor(self.doc, self.view, node)?;

        let root = self.view.root();
        let mut target = total_offset_top(self.view, anchor.element, root);
        if self.doc.kind(anchor.node).is_multi_line() {
            let start = self.doc.start_line(anchor.node);
            let span_top = self.metrics.height_before(start);
            let span_height = source_range_height(
                self.doc,
                anchor.node,
                start,
                self.metrics,
                self.metrics.line_height(start),
            );
            let shift = interpolate_offset(
                editor_top,
                span_top,
                span_height,
                self.view.height(anchor.element),
            );
            // A position ahead of the span pins the box top
            target += shift.max(0.0);
        }

        debug!(
            "editor {:.1} -> preview {:.1} (node {:?})",
            editor_top, target, anchor.node
        );
        Ok(target.max(0.0))
    }

    /// Editor offset matching a preview scroll position.
    ///
    /// The element at the offset picks the anchoring node through its
    /// nearest bound ancestor. Multi-line kinds scroll proportionally
    /// across their source lines; every other kind snaps to the top of the
    /// node's start line.
    pub fn editor_offset(&self, preview_top: f64) -> Result<f64> {
        if preview_top <= 0.0 {
            return Ok(0.0);
        }

        let root = self.view.root();
        let element = match element_at_offset(self.view, preview_top, root) {
            Some(el) => el,
            None => return Ok(0.0),
        };
        let node = self.bound_node_for(element)?;
        let anchor = resolve_anchor(self.doc, self.view, node)?;

        let start = self.doc.start_line(anchor.node);
        let mut target = self.metrics.height_before(start);
        if self.doc.kind(anchor.node).is_multi_line() {
            let span_height = source_range_height(
                self.doc,
                anchor.node,
                start,
                self.metrics,
                self.metrics.line_height(start),
            );
            target += interpolate_offset(
                preview_top,
                total_offset_top(self.view, anchor.element, root),
                self.view.height(anchor.element),
                span_height,
            );
        }

        debug!(
            "preview {:.1} -> editor {:.1} (node {:?})",
            preview_top, target, anchor.node
        );
        Ok(target.max(0.0))
    }

    /// Node anchoring `line`, or the last block once past the content
    fn node_for_line(&self, line: u32) -> Option<NodeId> {
        self.doc
            .node_at_line(line)
            .or_else(|| self.doc.last_child(self.doc.root()))
    }

    /// Anchor for a line in the gap ahead of `node`'s span.
    ///
    /// A blank gap line re-anchors on the deepest tail of the block above
    /// it; when the following block leads with media the forward anchor is
    /// kept. Lines inside a span pass through unchanged.
    fn blank_gap_anchor(&self, line: u32, node: NodeId) -> NodeId {
        if self.doc.start_line(node) <= line {
            return node;
        }
        let blank = self
            .metrics
            .line(line)
            .map(|record| self.doc.is_empty_source_line(&record.text, node))
            .unwrap_or(false);
        if !blank {
            return node;
        }
        match self.doc.previous_sibling(node) {
            Some(prev) => self.doc.last_leaf(prev),
            None => node,
        }
    }

    /// Nearest self-or-ancestor element carrying a node binding
    fn bound_node_for(&self, element: ElementId) -> Result<NodeId> {
        let mut cur = Some(element);
        while let Some(el) = cur {
            if let Some(node) = self.view.node_of(el) {
                return Ok(node);
            }
            cur = self.view.parent(el);
        }
        Err(SyncError::UnboundRoot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::MeasuredBuffer;
    use crate::tree::{NodeKind, SourceSpan};

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    /// Title, two-line paragraph and fenced code block.
    ///
    /// Line heights are 20 except the blank line 2 at 18, so cumulative
    /// heights are 20, 38, 58, 78, 98, 118, 138, 158, 178.
    fn fixture() -> (DocTree, ViewTree, MeasuredBuffer) {
        let mut doc = DocTree::new();
        let root = doc.root();
        let heading = doc.add_node(root, NodeKind::Heading, SourceSpan::lines(1, 1));
        doc.add_node(heading, NodeKind::Text, SourceSpan::lines(1, 1));
        let para = doc.add_node(root, NodeKind::Paragraph, SourceSpan::lines(3, 4));
        doc.add_node(para, NodeKind::Text, SourceSpan::lines(3, 4));
        let code = doc.add_node(root, NodeKind::CodeBlock, SourceSpan::lines(6, 8));

        let mut view = ViewTree::new("div");
        let vroot = view.root();
        let h1 = view.add_element(vroot, "h1", 0.0, 24.0);
        view.bind(h1, heading);
        let p = view.add_element(vroot, "p", 30.0, 50.0);
        view.bind(p, para);
        let pre = view.add_element(vroot, "pre", 90.0, 66.0);
        view.bind(pre, code);
        view.bind(vroot, root);

        let text = "# Title\n\nFirst paragraph\nsecond line\n\n```rust\nlet x = 1;\n```\n";
        let mut buf = MeasuredBuffer::from_text(text, 20.0);
        buf.set_line_height(2, 18.0);

        (doc, view, buf)
    }

    #[test]
    fn test_preview_offset_zero_guard() {
        let (doc, view, buf) = fixture();
        let ctx = SyncContext::new(&doc, &view, &buf);

        assert_eq!(ctx.preview_offset(0.0).unwrap(), 0.0);
        assert_eq!(ctx.preview_offset(-12.0).unwrap(), 0.0);
    }

    #[test]
    fn test_heading_snaps_to_element_top() {
        let (doc, view, buf) = fixture();
        let ctx = SyncContext::new(&doc, &view, &buf);

        // Line 1 anchors on the heading, which never interpolates
        assert_eq!(ctx.preview_offset(10.0).unwrap(), 0.0);
    }

    #[test]
    fn test_paragraph_interpolates() {
        let (doc, view, buf) = fixture();
        let ctx = SyncContext::new(&doc, &view, &buf);

        // Editor 40 is 2px into the paragraph span (top 38, height 20),
        // so the preview moves a tenth into the 50px box under its top 30
        let offset = ctx.preview_offset(40.0).unwrap();
        assert!(close(offset, 35.0));
    }

    #[test]
    fn test_paragraph_saturates_at_span_end() {
        let (doc, view, buf) = fixture();
        let ctx = SyncContext::new(&doc, &view, &buf);

        // Editor 58 reaches line 4, a full span past the paragraph top
        let offset = ctx.preview_offset(58.0).unwrap();
        assert!(close(offset, 80.0));
    }

    #[test]
    fn test_code_block_interpolates() {
        let (doc, view, buf) = fixture();
        let ctx = SyncContext::new(&doc, &view, &buf);

        // Editor 118 is halfway through the code span (top 98, height 40)
        let offset = ctx.preview_offset(118.0).unwrap();
        assert!(close(offset, 90.0 + 33.0));
    }

    #[test]
    fn test_past_content_saturates() {
        let (doc, view, buf) = fixture();
        let ctx = SyncContext::new(&doc, &view, &buf);

        // Line 9 is past every block; the last block absorbs the position
        let offset = ctx.preview_offset(170.0).unwrap();
        assert!(close(offset, 156.0));
    }

    #[test]
    fn test_blank_gap_rides_previous_block() {
        let (doc, view, buf) = fixture();
        let ctx = SyncContext::new(&doc, &view, &buf);

        // The blank line 2 keeps the heading's anchor
        assert_eq!(ctx.preview_offset(25.0).unwrap(), 0.0);

        // The first paragraph line then takes over at its box top
        assert!(close(ctx.preview_offset(38.0).unwrap(), 30.0));
    }

    #[test]
    fn test_blank_gap_before_code_pins_its_box_top() {
        let (doc, view, buf) = fixture();
        let ctx = SyncContext::new(&doc, &view, &buf);

        // The paragraph saturates at its box bottom on line 4
        assert!(close(ctx.preview_offset(77.9).unwrap(), 80.0));

        // Line 5 is blank ahead of the code block, which leads with media
        // and keeps the forward anchor at its box top
        assert!(close(ctx.preview_offset(78.0).unwrap(), 90.0));
        assert!(close(ctx.preview_offset(97.9).unwrap(), 90.0));
    }

    #[test]
    fn test_preview_offset_never_regresses() {
        let (doc, view, buf) = fixture();
        let ctx = SyncContext::new(&doc, &view, &buf);

        let mut last = 0.0;
        let mut top = 0.0;
        while top <= 180.0 {
            let offset = ctx.preview_offset(top).unwrap();
            assert!(
                offset >= last,
                "preview offset regressed at editor {}: {} < {}",
                top,
                offset,
                last
            );
            last = offset;
            top += 1.0;
        }
    }

    #[test]
    fn test_editor_offset_zero_guard() {
        let (doc, view, buf) = fixture();
        let ctx = SyncContext::new(&doc, &view, &buf);

        assert_eq!(ctx.editor_offset(0.0).unwrap(), 0.0);
        assert_eq!(ctx.editor_offset(-1.0).unwrap(), 0.0);
    }

    #[test]
    fn test_editor_offset_snaps_to_heading_line() {
        let (doc, view, buf) = fixture();
        let ctx = SyncContext::new(&doc, &view, &buf);

        assert_eq!(ctx.editor_offset(5.0).unwrap(), 0.0);
    }

    #[test]
    fn test_editor_offset_maps_paragraph() {
        let (doc, view, buf) = fixture();
        let ctx = SyncContext::new(&doc, &view, &buf);

        // Preview 35 is a tenth into the paragraph box, editor lands 2px
        // below the span top 38
        let offset = ctx.editor_offset(35.0).unwrap();
        assert!(close(offset, 40.0));
    }

    #[test]
    fn test_editor_offset_maps_code_block() {
        let (doc, view, buf) = fixture();
        let ctx = SyncContext::new(&doc, &view, &buf);

        let offset = ctx.editor_offset(100.0).unwrap();
        assert!(close(offset, 98.0 + (10.0 / 66.0) * 40.0));
    }

    #[test]
    fn test_editor_offset_before_content() {
        let mut doc = DocTree::new();
        let root = doc.root();
        let para = doc.add_node(root, NodeKind::Paragraph, SourceSpan::lines(1, 1));

        let mut view = ViewTree::new("div");
        let vroot = view.root();
        let p = view.add_element(vroot, "p", 10.0, 20.0);
        view.bind(p, para);
        view.bind(vroot, root);

        let buf = MeasuredBuffer::from_text("only line", 20.0);
        let ctx = SyncContext::new(&doc, &view, &buf);

        // Preview 5 precedes the first element's top edge
        assert_eq!(ctx.editor_offset(5.0).unwrap(), 0.0);
    }

    #[test]
    fn test_unbound_view_errors() {
        let mut doc = DocTree::new();
        let root = doc.root();
        doc.add_node(root, NodeKind::Paragraph, SourceSpan::lines(1, 1));

        let mut view = ViewTree::new("div");
        let vroot = view.root();
        view.add_element(vroot, "p", 0.0, 20.0);

        let buf = MeasuredBuffer::from_text("text", 20.0);
        let ctx = SyncContext::new(&doc, &view, &buf);

        assert_eq!(ctx.preview_offset(5.0).unwrap_err(), SyncError::UnboundRoot);
        assert_eq!(ctx.editor_offset(5.0).unwrap_err(), SyncError::UnboundRoot);
    }

    #[test]
    fn test_desync_propagates() {
        let mut doc = DocTree::new();
        let root = doc.root();
        let list = doc.add_node(root, NodeKind::List, SourceSpan::lines(1, 2));
        doc.add_node(list, NodeKind::ListItem, SourceSpan::lines(1, 1));
        doc.add_node(list, NodeKind::ListItem, SourceSpan::lines(2, 2));

        // The rendered list is empty, so container descent cannot align
        let mut view = ViewTree::new("div");
        let vroot = view.root();
        let ul = view.add_element(vroot, "ul", 0.0, 40.0);
        view.bind(ul, list);
        view.bind(vroot, root);

        let buf = MeasuredBuffer::from_text("- a\n- b", 20.0);
        let ctx = SyncContext::new(&doc, &view, &buf);

        assert_eq!(
            ctx.preview_offset(10.0).unwrap_err(),
            SyncError::TreeDesync(list)
        );
    }

    #[test]
    fn test_empty_document_maps_to_top() {
        let doc = DocTree::new();
        let view = ViewTree::new("div");
        let buf = MeasuredBuffer::from_text("", 20.0);
        let ctx = SyncContext::new(&doc, &view, &buf);

        assert_eq!(ctx.preview_offset(50.0).unwrap(), 0.0);
        assert_eq!(ctx.editor_offset(50.0).unwrap(), 0.0);
    }
}
