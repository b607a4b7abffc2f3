#![forbid(unsafe_code)]

//! Stored-order merge law.
//!
//! Applying a stored order to a container:
//!
//! 1. Walk the stored list; every id that names a live item (and has not
//!    already been placed) is appended to the working list.
//! 2. Every live item the stored list did not mention is appended after
//!    that, in its current document order.
//! 3. Stored ids that name no live item are dropped silently.
//!
//! `merge_order(current, stored)` is therefore always a permutation of
//! `current`.

use rustc_hash::FxHashSet;

use crate::id::ItemId;
use crate::viewport::{ViewportAdapter, ViewportError};

/// Signature used to detect order changes (`a|b|c`).
#[must_use]
pub fn order_signature(order: &[ItemId]) -> String {
    let mut signature = String::new();
    for (i, id) in order.iter().enumerate() {
        if i > 0 {
            signature.push('|');
        }
        signature.push_str(id.as_str());
    }
    signature
}

/// Merge `stored` into the live `current` order.
#[must_use]
pub fn merge_order(current: &[ItemId], stored: &[ItemId]) -> Vec<ItemId> {
    let live: FxHashSet<&ItemId> = current.iter().collect();
    let mut placed: FxHashSet<&ItemId> = FxHashSet::default();
    let mut merged = Vec::with_capacity(current.len());
    for id in stored {
        if let Some(live_id) = live.get(id)
            && placed.insert(*live_id)
        {
            merged.push((*live_id).clone());
        }
    }
    for id in current {
        if placed.insert(id) {
            merged.push(id.clone());
        }
    }
    merged
}

/// Result of applying a stored order to a viewport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderApplication {
    /// Item order after the pass.
    pub order: Vec<ItemId>,
    /// Whether any item was moved.
    pub moved: bool,
}

/// Apply `stored` to the viewport using [`merge_order`].
///
/// The viewport is only touched when the merged order differs from the
/// current one, so re-applying an unchanged order performs no mutation.
pub fn apply_order<V: ViewportAdapter + ?Sized>(
    viewport: &mut V,
    stored: &[ItemId],
) -> Result<OrderApplication, ViewportError> {
    let current = viewport.item_ids();
    let merged = merge_order(&current, stored);
    if merged == current {
        return Ok(OrderApplication {
            order: current,
            moved: false,
        });
    }
    viewport.reorder(&merged)?;
    Ok(OrderApplication {
        order: viewport.item_ids(),
        moved: true,
    })
}

#[cfg(test)]
mod tests {
    use super::{apply_order, merge_order, order_signature};
    use crate::harness::MemoryViewport;
    use crate::id::ids;
    use crate::viewport::ViewportAdapter;

    #[test]
    fn unknown_ids_are_dropped_and_rest_keep_document_order() {
        let merged = merge_order(&ids(["A", "B", "C", "D"]), &ids(["Z", "A"]));
        assert_eq!(merged, ids(["A", "B", "C", "D"]));
    }

    #[test]
    fn full_permutation_is_applied_verbatim() {
        let merged = merge_order(&ids(["A", "B", "C", "D"]), &ids(["C", "A", "D", "B"]));
        assert_eq!(merged, ids(["C", "A", "D", "B"]));
    }

    #[test]
    fn partial_order_places_unmentioned_items_last() {
        let merged = merge_order(&ids(["A", "B", "C", "D"]), &ids(["D", "B"]));
        assert_eq!(merged, ids(["D", "B", "A", "C"]));
    }

    #[test]
    fn duplicate_stored_ids_are_placed_once() {
        let merged = merge_order(&ids(["A", "B", "C"]), &ids(["C", "C", "A", "C"]));
        assert_eq!(merged, ids(["C", "A", "B"]));
    }

    #[test]
    fn signature_joins_with_pipe() {
        assert_eq!(order_signature(&ids(["a", "b", "c"])), "a|b|c");
        assert_eq!(order_signature(&[]), "");
    }

    #[test]
    fn apply_is_a_no_op_when_order_already_matches() {
        let mut viewport = MemoryViewport::grid(["A", "B", "C"], 3, 100.0, 100.0, 10.0);
        let before = viewport.mutation_count();
        let applied = apply_order(&mut viewport, &ids(["A", "B"])).expect("apply");
        assert!(!applied.moved);
        assert_eq!(viewport.mutation_count(), before);

        let applied = apply_order(&mut viewport, &ids(["C", "A", "B"])).expect("apply");
        assert!(applied.moved);
        assert_eq!(applied.order, ids(["C", "A", "B"]));
        assert_eq!(viewport.item_ids(), ids(["C", "A", "B"]));
    }
}
