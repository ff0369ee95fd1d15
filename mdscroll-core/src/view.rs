//! Arena-backed rendered view tree with document-node bindings

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::tree::NodeId;

/// Tags of nestable container elements, excluded from offset accumulation
pub const NESTABLE_TAGS: [&str; 3] = ["UL", "OL", "BLOCKQUOTE"];

/// True for tags whose own offset is already represented by their children
pub fn is_nestable_tag(tag: &str) -> bool {
    NESTABLE_TAGS.iter().any(|t| t.eq_ignore_ascii_case(tag))
}

/// Stable identifier of an element in a [`ViewTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementId(pub u32);

/// A positioned element in the rendered view
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewElement {
    pub tag: String,
    /// Pixel offset from the element's positioned parent
    pub offset_top: f64,
    /// Rendered pixel height of the element's box
    pub height: f64,
    /// Document node this element renders, if any
    pub node: Option<NodeId>,
    pub parent: Option<ElementId>,
    pub first_child: Option<ElementId>,
    pub last_child: Option<ElementId>,
    pub next_sibling: Option<ElementId>,
}

/// Rendered view tree handed over by the host renderer.
///
/// Elements live in an arena like [`crate::tree::DocTree`] nodes. The
/// node-to-element binding is kept as an explicit map maintained through
/// [`ViewTree::bind`], so lookups need no global document query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewTree {
    elements: Vec<ViewElement>,
    root: ElementId,
    bindings: HashMap<NodeId, ElementId>,
}

impl ViewTree {
    /// Create a view tree holding only the root container
    pub fn new(tag: &str) -> Self {
        let root = ViewElement {
            tag: tag.to_string(),
            offset_top: 0.0,
            height: 0.0,
            node: None,
            parent: None,
            first_child: None,
            last_child: None,
            next_sibling: None,
        };
        Self {
            elements: vec![root],
            root: ElementId(0),
            bindings: HashMap::new(),
        }
    }

    pub fn root(&self) -> ElementId {
        self.root
    }

    /// Access an element record directly
    pub fn element(&self, id: ElementId) -> &ViewElement {
        &self.elements[id.0 as usize]
    }

    /// Append an element as the last child of `parent`
    pub fn add_element(
        &mut self,
        parent: ElementId,
        tag: &str,
        offset_top: f64,
        height: f64,
    ) -> ElementId {
        let id = ElementId(self.elements.len() as u32);
        self.elements.push(ViewElement {
            tag: tag.to_string(),
            offset_top,
            height,
            node: None,
            parent: Some(parent),
            first_child: None,
            last_child: None,
            next_sibling: None,
        });

        if let Some(prev) = self.element(parent).last_child {
            self.elements[prev.0 as usize].next_sibling = Some(id);
        } else {
            self.elements[parent.0 as usize].first_child = Some(id);
        }
        self.elements[parent.0 as usize].last_child = Some(id);

        id
    }

    /// Bind an element to the document node it renders.
    ///
    /// A node binds to at most one element; binding again replaces the
    /// earlier entry.
    pub fn bind(&mut self, element: ElementId, node: NodeId) {
        self.elements[element.0 as usize].node = Some(node);
        self.bindings.insert(node, element);
    }

    /// Element bound to a document node, if the renderer produced one
    pub fn element_of(&self, node: NodeId) -> Option<ElementId> {
        self.bindings.get(&node).copied()
    }

    pub fn tag(&self, id: ElementId) -> &str {
        &self.element(id).tag
    }

    pub fn offset_top(&self, id: ElementId) -> f64 {
        self.element(id).offset_top
    }

    pub fn height(&self, id: ElementId) -> f64 {
        self.element(id).height
    }

    pub fn node_of(&self, id: ElementId) -> Option<NodeId> {
        self.element(id).node
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.element(id).parent
    }

    pub fn first_child(&self, id: ElementId) -> Option<ElementId> {
        self.element(id).first_child
    }

    pub fn next_sibling(&self, id: ElementId) -> Option<ElementId> {
        self.element(id).next_sibling
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_element_links() {
        let mut view = ViewTree::new("div");
        let root = view.root();

        let a = view.add_element(root, "h1", 0.0, 30.0);
        let b = view.add_element(root, "p", 40.0, 50.0);
        let inner = view.add_element(b, "span", 5.0, 20.0);

        assert_eq!(view.first_child(root), Some(a));
        assert_eq!(view.next_sibling(a), Some(b));
        assert_eq!(view.next_sibling(b), None);
        assert_eq!(view.parent(inner), Some(b));
        assert_eq!(view.first_child(b), Some(inner));
        assert_eq!(view.tag(inner), "span");
        assert_eq!(view.offset_top(b), 40.0);
        assert_eq!(view.height(b), 50.0);
    }

    #[test]
    fn test_binding_lookup() {
        let mut view = ViewTree::new("div");
        let root = view.root();
        let el = view.add_element(root, "p", 0.0, 20.0);

        let node = NodeId(3);
        assert_eq!(view.element_of(node), None);
        assert_eq!(view.node_of(el), None);

        view.bind(el, node);
        assert_eq!(view.element_of(node), Some(el));
        assert_eq!(view.node_of(el), Some(node));
    }

    #[test]
    fn test_rebinding_replaces() {
        let mut view = ViewTree::new("div");
        let root = view.root();
        let a = view.add_element(root, "p", 0.0, 20.0);
        let b = view.add_element(root, "p", 30.0, 20.0);

        let node = NodeId(1);
        view.bind(a, node);
        view.bind(b, node);
        assert_eq!(view.element_of(node), Some(b));
    }

    #[test]
    fn test_nestable_tags() {
        assert!(is_nestable_tag("UL"));
        assert!(is_nestable_tag("ol"));
        assert!(is_nestable_tag("BlockQuote"));
        assert!(!is_nestable_tag("LI"));
        assert!(!is_nestable_tag("div"));
        assert!(!is_nestable_tag("table"));
    }
}
