//! Drop-position placeholder bookkeeping.
//!
//! One placeholder exists per container. Its style is created on the first
//! drag and resized on every later one; it is mounted only while a session
//! is active and always unmounted when the session ends.

use serde::{Deserialize, Serialize};

use crate::geometry::Rect;
use crate::id::ItemId;
use crate::viewport::{Anchor, ComputedBox, ViewportAdapter, ViewportError};

/// Visual properties of the placeholder element.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlaceholderStyle {
    /// Rounded width in pixels, at least 1.
    pub width: f64,
    /// Rounded height in pixels, at least 1.
    pub height: f64,
    /// Margin copied from the dragged item.
    pub margin: String,
    /// Border radius copied from the dragged item.
    pub border_radius: String,
}

/// Tracks the placeholder's style and its index among non-dragged items.
#[derive(Debug, Clone, Default)]
pub struct PlaceholderManager {
    style: Option<PlaceholderStyle>,
    index: Option<usize>,
    sessions: u64,
}

impl PlaceholderManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Size the placeholder to `rect`, copying margin and radius from
    /// `computed`. Creates the style on first use and reuses it afterwards.
    pub fn prepare(&mut self, rect: Rect, computed: Option<&ComputedBox>) -> &PlaceholderStyle {
        let style = self.style.get_or_insert_with(PlaceholderStyle::default);
        style.width = rect.width.round().max(1.0);
        style.height = rect.height.round().max(1.0);
        if let Some(computed) = computed {
            style.margin.clone_from(&computed.margin);
            style.border_radius.clone_from(&computed.border_radius);
        }
        self.sessions = self.sessions.saturating_add(1);
        style
    }

    /// Current style, if a drag has ever prepared one.
    #[must_use]
    pub fn style(&self) -> Option<&PlaceholderStyle> {
        self.style.as_ref()
    }

    /// Number of sessions that prepared (and so reused) this placeholder.
    #[must_use]
    pub const fn sessions(&self) -> u64 {
        self.sessions
    }

    /// Index among non-dragged items while mounted.
    #[must_use]
    pub const fn index(&self) -> Option<usize> {
        self.index
    }

    /// Mount the placeholder immediately before `item`, recording `index`.
    pub fn attach<V: ViewportAdapter + ?Sized>(
        &mut self,
        viewport: &mut V,
        item: &ItemId,
        index: usize,
    ) -> Result<(), ViewportError> {
        let style = self.style.clone().unwrap_or_default();
        viewport.mount_placeholder(&style, &Anchor::Before(item.clone()))?;
        self.index = Some(index);
        Ok(())
    }

    /// Move the placeholder so it sits before `remaining[index]`, or at the
    /// end when `index >= remaining.len()`.
    ///
    /// Returns `Ok(false)` when the clamped index equals the current one.
    pub fn move_to<V: ViewportAdapter + ?Sized>(
        &mut self,
        viewport: &mut V,
        remaining: &[ItemId],
        index: usize,
    ) -> Result<bool, ViewportError> {
        let clamped = index.min(remaining.len());
        if self.index == Some(clamped) {
            return Ok(false);
        }
        let anchor = remaining
            .get(clamped)
            .map_or(Anchor::End, |id| Anchor::Before(id.clone()));
        let style = self.style.clone().unwrap_or_default();
        viewport.mount_placeholder(&style, &anchor)?;
        self.index = Some(clamped);
        Ok(true)
    }

    /// Unmount the placeholder and forget its index.
    pub fn detach<V: ViewportAdapter + ?Sized>(&mut self, viewport: &mut V) {
        viewport.unmount_placeholder();
        self.index = None;
    }
}

#[cfg(test)]
mod tests {
    use super::PlaceholderManager;
    use crate::geometry::Rect;
    use crate::harness::{MemoryNode, MemoryViewport};
    use crate::id::{ItemId, ids};
    use crate::viewport::{ComputedBox, ViewportAdapter};

    fn id(raw: &str) -> ItemId {
        ItemId::new(raw).expect("non-blank")
    }

    #[test]
    fn prepare_rounds_and_copies_box_details() {
        let mut manager = PlaceholderManager::new();
        let computed = ComputedBox {
            margin: "8px".into(),
            border_radius: "12px".into(),
            ..ComputedBox::default()
        };
        let style = manager.prepare(Rect::new(0.0, 0.0, 319.6, 0.2), Some(&computed));
        assert_eq!(style.width, 320.0);
        assert_eq!(style.height, 1.0);
        assert_eq!(style.margin, "8px");
        assert_eq!(style.border_radius, "12px");

        manager.prepare(Rect::new(0.0, 0.0, 100.0, 50.0), None);
        assert_eq!(manager.sessions(), 2);
        assert_eq!(manager.style().map(|s| s.width), Some(100.0));
    }

    #[test]
    fn move_to_clamps_and_reports_changes() {
        let mut viewport = MemoryViewport::grid(["a", "b", "c"], 3, 100.0, 100.0, 0.0);
        let mut manager = PlaceholderManager::new();
        manager.prepare(Rect::new(0.0, 0.0, 100.0, 100.0), None);
        manager.attach(&mut viewport, &id("a"), 0).expect("attach");
        assert!(viewport.placeholder_mounted());

        let remaining = ids(["b", "c"]);
        assert!(!manager.move_to(&mut viewport, &remaining, 0).expect("move"));
        assert!(manager.move_to(&mut viewport, &remaining, 9).expect("move"));
        assert_eq!(manager.index(), Some(2));
        assert_eq!(viewport.nodes().last(), Some(&MemoryNode::Placeholder));

        manager.detach(&mut viewport);
        assert!(!viewport.placeholder_mounted());
        assert_eq!(manager.index(), None);
    }
}
