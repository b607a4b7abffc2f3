#![forbid(unsafe_code)]

//! Hidden-set application with exact display restoration.
//!
//! Hiding an item records its inline `display` value once (the first time
//! it is hidden), sets `display: none`, and marks it `aria-hidden`.
//! Un-hiding writes the recorded value back verbatim, including the empty
//! string, and removes `aria-hidden`.
//!
//! # Invariants
//!
//! 1. hide then unhide reproduces the pre-hide inline `display` exactly.
//! 2. Re-applying the same hidden set performs no viewport writes.
//! 3. Hidden items keep their position in the container order.

use std::collections::BTreeSet;

use rustc_hash::FxHashMap;

use crate::id::ItemId;
use crate::viewport::{StyleProp, ViewportAdapter};

/// Set of hidden item ids. Ordered so it serializes sorted.
pub type HiddenSet = BTreeSet<ItemId>;

const HIDDEN_DISPLAY: &str = "none";

/// Counts of writes performed by one visibility pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VisibilityPass {
    pub hidden: usize,
    pub restored: usize,
    pub cleared: usize,
    pub failed_writes: usize,
}

impl VisibilityPass {
    /// Whether the pass wrote anything.
    #[must_use]
    pub const fn changed(&self) -> bool {
        self.hidden + self.restored + self.cleared > 0
    }
}

/// Applies a [`HiddenSet`] to a viewport, remembering prior display values.
#[derive(Debug, Clone, Default)]
pub struct VisibilityApplier {
    remembered: FxHashMap<ItemId, String>,
}

impl VisibilityApplier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inline display recorded when `id` was hidden.
    #[must_use]
    pub fn remembered_display(&self, id: &ItemId) -> Option<&str> {
        self.remembered.get(id).map(String::as_str)
    }

    /// Apply `hidden` to every live item.
    pub fn apply<V: ViewportAdapter + ?Sized>(
        &mut self,
        viewport: &mut V,
        hidden: &HiddenSet,
    ) -> VisibilityPass {
        let mut pass = VisibilityPass::default();
        for id in viewport.item_ids() {
            if hidden.contains(&id) {
                self.hide(viewport, &id, &mut pass);
            } else {
                self.show(viewport, &id, &mut pass);
            }
        }
        if pass.changed() {
            tracing::debug!(
                hidden = pass.hidden,
                restored = pass.restored,
                cleared = pass.cleared,
                "visibility applied"
            );
        }
        pass
    }

    fn hide<V: ViewportAdapter + ?Sized>(
        &mut self,
        viewport: &mut V,
        id: &ItemId,
        pass: &mut VisibilityPass,
    ) {
        if !self.remembered.contains_key(id) {
            let prior = viewport.inline_style(id, StyleProp::Display);
            self.remembered.insert(id.clone(), prior);
        }
        let mut wrote = false;
        if viewport.inline_style(id, StyleProp::Display) != HIDDEN_DISPLAY {
            wrote = true;
            if let Err(err) = viewport.set_inline_style(id, StyleProp::Display, HIDDEN_DISPLAY) {
                tracing::warn!(item = %id, error = %err, "failed to hide item");
                pass.failed_writes += 1;
            }
        }
        if !viewport.is_aria_hidden(id) {
            wrote = true;
            if let Err(err) = viewport.set_aria_hidden(id, true) {
                tracing::warn!(item = %id, error = %err, "failed to mark item aria-hidden");
                pass.failed_writes += 1;
            }
        }
        if wrote {
            pass.hidden += 1;
        }
    }

    fn show<V: ViewportAdapter + ?Sized>(
        &mut self,
        viewport: &mut V,
        id: &ItemId,
        pass: &mut VisibilityPass,
    ) {
        if let Some(prior) = self.remembered.remove(id) {
            if let Err(err) = viewport.set_inline_style(id, StyleProp::Display, &prior) {
                tracing::warn!(item = %id, error = %err, "failed to restore item display");
                pass.failed_writes += 1;
            }
            if let Err(err) = viewport.set_aria_hidden(id, false) {
                tracing::warn!(item = %id, error = %err, "failed to clear aria-hidden");
                pass.failed_writes += 1;
            }
            pass.restored += 1;
        } else if viewport.is_aria_hidden(id) {
            if let Err(err) = viewport.set_aria_hidden(id, false) {
                tracing::warn!(item = %id, error = %err, "failed to clear aria-hidden");
                pass.failed_writes += 1;
            }
            pass.cleared += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{HiddenSet, VisibilityApplier};
    use crate::harness::MemoryViewport;
    use crate::id::ItemId;
    use crate::viewport::{StyleProp, ViewportAdapter};

    fn id(raw: &str) -> ItemId {
        ItemId::new(raw).expect("non-blank")
    }

    fn set(raw: &[&str]) -> HiddenSet {
        raw.iter().map(|r| id(r)).collect()
    }

    #[test]
    fn hide_then_unhide_restores_exact_display() {
        let mut viewport = MemoryViewport::grid(["a", "b", "c"], 3, 100.0, 100.0, 0.0);
        viewport
            .set_inline_style(&id("a"), StyleProp::Display, "grid")
            .expect("style");
        let mut applier = VisibilityApplier::new();

        applier.apply(&mut viewport, &set(&["a", "b"]));
        assert_eq!(viewport.inline_style(&id("a"), StyleProp::Display), "none");
        assert_eq!(viewport.inline_style(&id("b"), StyleProp::Display), "none");
        assert!(viewport.is_aria_hidden(&id("b")));
        assert_eq!(applier.remembered_display(&id("a")), Some("grid"));
        assert_eq!(applier.remembered_display(&id("b")), Some(""));

        applier.apply(&mut viewport, &HiddenSet::new());
        assert_eq!(viewport.inline_style(&id("a"), StyleProp::Display), "grid");
        assert_eq!(viewport.inline_style(&id("b"), StyleProp::Display), "");
        assert!(!viewport.is_aria_hidden(&id("a")));
        assert!(!viewport.is_aria_hidden(&id("b")));
    }

    #[test]
    fn prior_display_is_remembered_only_once() {
        let mut viewport = MemoryViewport::grid(["a", "b"], 2, 100.0, 100.0, 0.0);
        viewport
            .set_inline_style(&id("a"), StyleProp::Display, "flex")
            .expect("style");
        let mut applier = VisibilityApplier::new();
        applier.apply(&mut viewport, &set(&["a"]));
        applier.apply(&mut viewport, &set(&["a"]));
        assert_eq!(applier.remembered_display(&id("a")), Some("flex"));
        applier.apply(&mut viewport, &set(&[]));
        assert_eq!(viewport.inline_style(&id("a"), StyleProp::Display), "flex");
    }

    #[test]
    fn reapplying_same_set_is_write_free() {
        let mut viewport = MemoryViewport::grid(["a", "b"], 2, 100.0, 100.0, 0.0);
        let mut applier = VisibilityApplier::new();
        applier.apply(&mut viewport, &set(&["b"]));
        let before = viewport.mutation_count();
        let pass = applier.apply(&mut viewport, &set(&["b"]));
        assert!(!pass.changed());
        assert_eq!(viewport.mutation_count(), before);
    }

    #[test]
    fn stray_aria_hidden_is_cleared_for_visible_items() {
        let mut viewport = MemoryViewport::grid(["a"], 1, 100.0, 100.0, 0.0);
        viewport.set_aria_hidden(&id("a"), true).expect("aria");
        let pass = VisibilityApplier::new().apply(&mut viewport, &HiddenSet::new());
        assert_eq!(pass.cleared, 1);
        assert!(!viewport.is_aria_hidden(&id("a")));
    }
}
