//! Arena-backed document tree with source spans and node-kind classification

use serde::{Deserialize, Serialize};

/// Stable identifier of a node in a [`DocTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

/// A position in the source buffer (1-based line and column)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourcePos {
    pub line: u32,
    pub column: u32,
}

impl SourcePos {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// Source range covered by a node, both endpoints inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpan {
    pub start: SourcePos,
    pub end: SourcePos,
}

impl SourceSpan {
    pub fn new(start: SourcePos, end: SourcePos) -> Self {
        Self { start, end }
    }

    /// Span covering whole lines, with columns pinned to 1
    pub fn lines(start_line: u32, end_line: u32) -> Self {
        Self {
            start: SourcePos::new(start_line, 1),
            end: SourcePos::new(end_line, 1),
        }
    }
}

/// The closed set of document node kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    Document,
    Heading,
    Paragraph,
    Text,
    List,
    ListItem,
    BlockQuote,
    CodeBlock,
    HtmlBlock,
    HtmlInline,
    Image,
    Link,
    Table,
    TableRow,
    TableHeaderCell,
    TableBody,
    TableCell,
    ThematicBreak,
}

impl NodeKind {
    /// Container kinds whose rendering occupies no scroll geometry of its own
    pub fn is_container(self) -> bool {
        matches!(self, NodeKind::List | NodeKind::BlockQuote)
    }

    /// Raw-markup kinds passed through to the rendered view
    pub fn is_embedded_markup(self) -> bool {
        matches!(self, NodeKind::HtmlBlock | NodeKind::HtmlInline)
    }

    /// Kinds whose rendered box scrolls proportionally across several lines
    pub fn is_multi_line(self) -> bool {
        matches!(self, NodeKind::CodeBlock | NodeKind::Paragraph)
    }

    /// Media kinds whose rendered height is unrelated to source-line height
    pub fn is_media(self) -> bool {
        matches!(self, NodeKind::Image | NodeKind::CodeBlock)
    }

    /// Internal structure of a rendered table (never a scroll anchor)
    pub fn is_table_part(self) -> bool {
        matches!(
            self,
            NodeKind::TableRow
                | NodeKind::TableHeaderCell
                | NodeKind::TableBody
                | NodeKind::TableCell
        )
    }
}

/// A single node record in the arena
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocNode {
    pub kind: NodeKind,
    pub span: SourceSpan,
    pub parent: Option<NodeId>,
    pub first_child: Option<NodeId>,
    pub last_child: Option<NodeId>,
    pub next_sibling: Option<NodeId>,
}

/// Document tree handed over by the host parser.
///
/// Nodes live in an arena and link to each other by id, so navigation is O(1)
/// and the tree is freely cloneable. Ids are only valid for the tree that
/// created them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocTree {
    nodes: Vec<DocNode>,
    root: NodeId,
}

impl DocTree {
    /// Create a tree holding only the document root
    pub fn new() -> Self {
        let root = DocNode {
            kind: NodeKind::Document,
            span: SourceSpan::lines(1, 1),
            parent: None,
            first_child: None,
            last_child: None,
            next_sibling: None,
        };
        Self {
            nodes: vec![root],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Access a node record directly
    pub fn node(&self, id: NodeId) -> &DocNode {
        &self.nodes[id.0 as usize]
    }

    /// Append a node as the last child of `parent`.
    ///
    /// Ancestor spans are widened as needed so that every span keeps
    /// containing the spans of its children.
    pub fn add_node(&mut self, parent: NodeId, kind: NodeKind, span: SourceSpan) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(DocNode {
            kind,
            span,
            parent: Some(parent),
            first_child: None,
            last_child: None,
            next_sibling: None,
        });

        if let Some(prev) = self.node(parent).last_child {
            self.nodes[prev.0 as usize].next_sibling = Some(id);
        } else {
            self.nodes[parent.0 as usize].first_child = Some(id);
        }
        self.nodes[parent.0 as usize].last_child = Some(id);

        // Keep the containment invariant
        let mut cur = Some(parent);
        while let Some(p) = cur {
            let node = &mut self.nodes[p.0 as usize];
            if span.start < node.span.start {
                node.span.start = span.start;
            }
            if span.end > node.span.end {
                node.span.end = span.end;
            }
            cur = node.parent;
        }

        id
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.node(id).kind
    }

    pub fn span(&self, id: NodeId) -> SourceSpan {
        self.node(id).span
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).first_child
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).last_child
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).next_sibling
    }

    /// Sibling immediately before `id`, found by scanning from the parent's
    /// first child
    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let mut cur = self.first_child(parent)?;
        if cur == id {
            return None;
        }
        while let Some(next) = self.next_sibling(cur) {
            if next == id {
                return Some(cur);
            }
            cur = next;
        }
        None
    }

    /// First source line of the node's span
    pub fn start_line(&self, id: NodeId) -> u32 {
        self.node(id).span.start.line
    }

    /// Last source line of the node's span
    pub fn end_line(&self, id: NodeId) -> u32 {
        self.node(id).span.end.line
    }

    /// Deepest last descendant, following last-child links
    pub fn last_leaf(&self, id: NodeId) -> NodeId {
        let mut cur = id;
        while let Some(child) = self.node(cur).last_child {
            cur = child;
        }
        cur
    }

    /// True if an image or code block sits on the leftmost-descendant chain.
    ///
    /// Only first-child links are followed, starting at the node itself.
    /// Media anywhere else in the subtree is not detected; a line is only
    /// treated as media-backed when the media leads its block.
    pub fn has_leading_media(&self, id: NodeId) -> bool {
        let mut cur = Some(id);
        while let Some(node) = cur {
            if self.kind(node).is_media() {
                return true;
            }
            cur = self.node(node).first_child;
        }
        false
    }

    /// True if `text` is blank and `node` does not lead with media content
    pub fn is_empty_source_line(&self, text: &str, node: NodeId) -> bool {
        text.trim().is_empty() && !self.has_leading_media(node)
    }

    /// Find the node anchoring a source line.
    ///
    /// Returns the deepest node whose span contains the line. A line falling
    /// between two top-level blocks resolves to the following block; a line
    /// inside a block but between its children resolves to the block itself.
    /// Returns None for lines past the last block.
    pub fn node_at_line(&self, line: u32) -> Option<NodeId> {
        let mut found: Option<NodeId> = None;
        let mut cur = self.root;
        loop {
            let mut child = self.node(cur).first_child;
            let mut containing = None;
            while let Some(c) = child {
                let span = self.node(c).span;
                if span.start.line <= line && line <= span.end.line {
                    containing = Some(c);
                    break;
                }
                if span.start.line > line {
                    // The line sits in a gap before this child
                    if found.is_none() {
                        return Some(c);
                    }
                    break;
                }
                child = self.node(c).next_sibling;
            }
            match containing {
                Some(c) => {
                    found = Some(c);
                    cur = c;
                }
                None => break,
            }
        }
        found
    }
}

impl Default for DocTree {
    fn default() -> Self {
        Self::new()
    }
}
