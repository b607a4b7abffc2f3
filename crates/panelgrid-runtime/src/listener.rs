#![forbid(unsafe_code)]

//! Attach-once listener registry.
//!
//! Each controller owns one registry. A subscription is identified by its
//! target and a logical key; attaching the same `(target, key)` again is a
//! no-op, so re-running initialization never doubles a handler. There is no
//! detach: subscriptions live as long as the registry.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

/// Where a subscription listens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListenerTarget {
    /// The panel container itself.
    Container,
    /// The surrounding window (pointer tails, storage notifications).
    Window,
}

/// Host event categories a subscription can receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    PointerDown,
    PointerMove,
    PointerUp,
    PointerCancel,
    StorageChange,
}

/// Subscriptions keyed by `(target, key)`, dispatched by `(target, kind)`.
#[derive(Debug, Clone)]
pub struct ListenerRegistry<H> {
    flags: FxHashSet<(ListenerTarget, String)>,
    routes: FxHashMap<(ListenerTarget, EventKind), Vec<H>>,
    count: usize,
}

impl<H> Default for ListenerRegistry<H> {
    fn default() -> Self {
        Self {
            flags: FxHashSet::default(),
            routes: FxHashMap::default(),
            count: 0,
        }
    }
}

impl<H> ListenerRegistry<H> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `kind` on `target` unless `key` is already
    /// attached there. Returns whether a subscription was added.
    pub fn attach_once(
        &mut self,
        target: ListenerTarget,
        kind: EventKind,
        handler: H,
        key: &str,
    ) -> bool {
        if !self.flags.insert((target, key.to_owned())) {
            return false;
        }
        self.routes.entry((target, kind)).or_default().push(handler);
        self.count += 1;
        tracing::debug!(?target, ?kind, key, listeners = self.count, "listener attached");
        true
    }

    #[must_use]
    pub fn is_attached(&self, target: ListenerTarget, key: &str) -> bool {
        self.flags.contains(&(target, key.to_owned()))
    }

    /// Handlers for `kind` on `target`, in attach order.
    #[must_use]
    pub fn handlers(&self, target: ListenerTarget, kind: EventKind) -> &[H] {
        self.routes
            .get(&(target, kind))
            .map_or(&[][..], Vec::as_slice)
    }

    /// Number of unique subscriptions ever attached.
    #[must_use]
    pub const fn listener_count(&self) -> usize {
        self.count
    }
}

#[cfg(test)]
mod tests {
    use super::{EventKind, ListenerRegistry, ListenerTarget};

    #[test]
    fn repeated_attach_counts_once() {
        let mut registry = ListenerRegistry::new();
        let mut added = 0;
        for _ in 0..5 {
            if registry.attach_once(ListenerTarget::Window, EventKind::StorageChange, 7u8, "sync") {
                added += 1;
            }
        }
        assert_eq!(added, 1);
        assert_eq!(registry.listener_count(), 1);
        assert_eq!(
            registry.handlers(ListenerTarget::Window, EventKind::StorageChange),
            &[7]
        );
    }

    #[test]
    fn same_key_on_other_target_is_distinct() {
        let mut registry = ListenerRegistry::new();
        assert!(registry.attach_once(ListenerTarget::Container, EventKind::PointerUp, 1, "up"));
        assert!(registry.attach_once(ListenerTarget::Window, EventKind::PointerUp, 2, "up"));
        assert!(registry.is_attached(ListenerTarget::Window, "up"));
        assert_eq!(registry.listener_count(), 2);
        assert!(
            registry
                .handlers(ListenerTarget::Container, EventKind::PointerDown)
                .is_empty()
        );
    }
}
