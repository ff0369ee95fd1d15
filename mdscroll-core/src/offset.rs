//! Offset accumulation, scroll-target location and proportional mapping

use crate::view::{is_nestable_tag, ElementId, ViewTree};

/// Cumulative pixel offset of `element` measured from `root`.
///
/// Walks parent links up to (excluding) the root, summing each element's own
/// offset on the way. Nestable container elements are skipped; their
/// position is already carried by their children's offsets. Returns 0 when
/// `element` is the root itself.
pub fn total_offset_top(view: &ViewTree, element: ElementId, root: ElementId) -> f64 {
    let mut total = 0.0;
    let mut cur = element;
    while cur != root {
        if !is_nestable_tag(view.tag(cur)) {
            total += view.offset_top(cur);
        }
        match view.parent(cur) {
            Some(parent) => cur = parent,
            None => break,
        }
    }
    total
}

/// Deepest element whose box starts strictly above `target`.
///
/// Descends level by level. At each level the children of the current
/// element are scanned in order; the scan keeps the last sibling of the
/// leading run whose top edge lies above `target` and stops at the first
/// one that does not. A level without a match ends the descent. Returns
/// None when no element under `root` starts above `target`, which callers
/// treat as the top of the document.
pub fn element_at_offset(view: &ViewTree, target: f64, root: ElementId) -> Option<ElementId> {
    let mut deepest = root;
    loop {
        let base = total_offset_top(view, deepest, root);
        match last_sibling_above(view, view.first_child(deepest), target, base) {
            Some(next) => deepest = next,
            None => break,
        }
    }

    if deepest == root {
        None
    } else {
        Some(deepest)
    }
}

/// Last element of the leading run of siblings starting above `target`.
///
/// The comparison is strict: a top edge exactly at `target` does not count.
fn last_sibling_above(
    view: &ViewTree,
    first: Option<ElementId>,
    target: f64,
    base: f64,
) -> Option<ElementId> {
    let mut found = None;
    let mut cur = first;
    while let Some(el) = cur {
        if target > base + view.offset_top(el) {
            found = Some(el);
            cur = view.next_sibling(el);
        } else {
            break;
        }
    }
    found
}

/// Map a scroll position inside a reference span onto a target span.
///
/// The position's fraction of the reference span is applied to the target
/// span's height. Fractions at or past 1 clamp to the full target height.
pub fn interpolate_offset(
    scroll: f64,
    reference_offset: f64,
    reference_height: f64,
    target_height: f64,
) -> f64 {
    let ratio = (scroll - reference_offset) / reference_height;
    if ratio < 1.0 {
        ratio * target_height
    } else {
        target_height
    }
}
