#![forbid(unsafe_code)]

//! Host seam for geometry reads and element mutation.
//!
//! Every call the engine makes into the host UI goes through
//! [`ViewportAdapter`]. A browser host maps these onto DOM reads/writes and
//! `setPointerCapture()`; a native toolkit maps them onto its widget tree.
//! The engine never creates or destroys items; it only moves them, edits a
//! fixed set of inline style properties, and mounts one placeholder.
//!
//! # Failure Modes
//!
//! Mutating calls return [`ViewportError`]. The engine treats every error as
//! advisory: it logs and continues, so a host that cannot capture pointers or
//! refuses a style write still gets a usable (if less polished) drag.

use serde::{Deserialize, Serialize};

use crate::geometry::Rect;
use crate::id::ItemId;
use crate::placeholder::PlaceholderStyle;

/// Inline style properties the engine reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StyleProp {
    Position,
    Left,
    Top,
    Width,
    Height,
    Margin,
    Transition,
    PointerEvents,
    ZIndex,
    BoxShadow,
    Transform,
    Opacity,
    WillChange,
    Display,
}

impl StyleProp {
    /// CSS property name.
    #[must_use]
    pub const fn css_name(self) -> &'static str {
        match self {
            Self::Position => "position",
            Self::Left => "left",
            Self::Top => "top",
            Self::Width => "width",
            Self::Height => "height",
            Self::Margin => "margin",
            Self::Transition => "transition",
            Self::PointerEvents => "pointer-events",
            Self::ZIndex => "z-index",
            Self::BoxShadow => "box-shadow",
            Self::Transform => "transform",
            Self::Opacity => "opacity",
            Self::WillChange => "will-change",
            Self::Display => "display",
        }
    }
}

/// Computed container `position` that cannot anchor absolutely positioned
/// items; a drag lifts it to [`DRAG_CONTAINER_POSITION`] while it runs.
pub const STATIC_POSITION: &str = "static";

/// Inline container `position` written for the duration of a drag.
pub const DRAG_CONTAINER_POSITION: &str = "relative";

/// Properties snapshotted at drag start and restored on commit/cancel.
pub const DRAG_SNAPSHOT_PROPS: [StyleProp; 13] = [
    StyleProp::Position,
    StyleProp::Left,
    StyleProp::Top,
    StyleProp::Width,
    StyleProp::Height,
    StyleProp::Margin,
    StyleProp::Transition,
    StyleProp::PointerEvents,
    StyleProp::ZIndex,
    StyleProp::BoxShadow,
    StyleProp::Transform,
    StyleProp::Opacity,
    StyleProp::WillChange,
];

/// Insertion point for a move within the container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Anchor {
    /// Immediately before the given item.
    Before(ItemId),
    /// After every other child.
    End,
}

/// Computed (resolved) box values for one item.
///
/// Numeric fields are `None` when the host cannot resolve them; string
/// fields carry the raw CSS value so the placeholder can copy it verbatim.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComputedBox {
    pub margin_right: Option<f64>,
    pub margin_bottom: Option<f64>,
    pub row_gap: Option<f64>,
    pub column_gap: Option<f64>,
    pub margin: String,
    pub border_radius: String,
}

/// Host-side failure for one viewport operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ViewportError {
    #[error("unknown item `{0}`")]
    UnknownItem(ItemId),
    #[error("pointer capture is not supported by this host")]
    CaptureUnsupported,
    #[error("pointer {pointer_id} is not captured")]
    NotCaptured { pointer_id: u32 },
    #[error("placeholder is not mounted")]
    PlaceholderNotMounted,
    #[error("host rejected the operation: {0}")]
    Host(String),
}

/// Geometry and mutation interface implemented by the embedding UI.
///
/// Item order reported by [`item_ids`](Self::item_ids) is document order and
/// never includes the placeholder.
pub trait ViewportAdapter {
    /// Bounding rect of the container.
    fn container_rect(&self) -> Rect;

    /// Live item ids in document order.
    fn item_ids(&self) -> Vec<ItemId>;

    /// Bounding rect of one item, `None` when it is not in the container.
    fn item_rect(&self, id: &ItemId) -> Option<Rect>;

    /// Bounding rect of the item's drag handle, if it designates one.
    fn handle_rect(&self, id: &ItemId) -> Option<Rect>;

    /// Resolved margins, gaps, and border radius of one item.
    fn computed_box(&self, id: &ItemId) -> Option<ComputedBox>;

    /// Current inline value (empty string when unset).
    fn inline_style(&self, id: &ItemId, prop: StyleProp) -> String;

    /// Write an inline value; an empty string clears the property.
    fn set_inline_style(
        &mut self,
        id: &ItemId,
        prop: StyleProp,
        value: &str,
    ) -> Result<(), ViewportError>;

    /// Move an item within the container.
    fn move_item(&mut self, id: &ItemId, anchor: &Anchor) -> Result<(), ViewportError>;

    /// Insert the placeholder (or move it when already mounted).
    fn mount_placeholder(
        &mut self,
        style: &PlaceholderStyle,
        anchor: &Anchor,
    ) -> Result<(), ViewportError>;

    /// Move an item to the placeholder's position (immediately before it).
    fn move_item_to_placeholder(&mut self, id: &ItemId) -> Result<(), ViewportError>;

    /// Remove the placeholder from the container. No-op when unmounted.
    fn unmount_placeholder(&mut self);

    /// Whether the placeholder is currently in the container.
    fn placeholder_mounted(&self) -> bool;

    /// Route further events for `pointer_id` to `id`.
    fn capture_pointer(&mut self, id: &ItemId, pointer_id: u32) -> Result<(), ViewportError>;

    /// Release a capture previously acquired with [`capture_pointer`](Self::capture_pointer).
    fn release_pointer(&mut self, id: &ItemId, pointer_id: u32) -> Result<(), ViewportError>;

    /// Whether the item carries `aria-hidden="true"`.
    fn is_aria_hidden(&self, id: &ItemId) -> bool;

    /// Set or remove `aria-hidden`.
    fn set_aria_hidden(&mut self, id: &ItemId, hidden: bool) -> Result<(), ViewportError>;

    /// Computed `position` of the container (`"static"`, `"relative"`, ...).
    fn container_position(&self) -> String;

    /// Inline `position` of the container (empty string when unset).
    fn container_inline_position(&self) -> String;

    /// Write the container's inline `position`; an empty string clears it.
    fn set_container_position(&mut self, value: &str) -> Result<(), ViewportError>;

    /// Turn document text selection off (`user-select: none`) or restore the
    /// value it had before it was turned off.
    fn set_selection_suppressed(&mut self, suppressed: bool) -> Result<(), ViewportError>;

    /// Position an item absolutely at `rect` (container-relative pixels).
    fn set_absolute_position(&mut self, id: &ItemId, rect: Rect) -> Result<(), ViewportError> {
        self.set_inline_style(id, StyleProp::Position, "absolute")?;
        self.set_inline_style(id, StyleProp::Left, &px(rect.x))?;
        self.set_inline_style(id, StyleProp::Top, &px(rect.y))?;
        self.set_inline_style(id, StyleProp::Width, &px(rect.width.round().max(1.0)))?;
        self.set_inline_style(id, StyleProp::Height, &px(rect.height.round().max(1.0)))
    }

    /// Move every listed item to the end, in list order.
    ///
    /// Ids not present in the container are skipped.
    fn reorder(&mut self, order: &[ItemId]) -> Result<(), ViewportError> {
        for id in order {
            match self.move_item(id, &Anchor::End) {
                Ok(()) | Err(ViewportError::UnknownItem(_)) => {}
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }
}

/// Format a pixel length, normalizing negative zero.
#[must_use]
pub fn px(value: f64) -> String {
    format!("{}px", value + 0.0)
}

#[cfg(test)]
mod tests {
    use super::{DRAG_SNAPSHOT_PROPS, StyleProp, px};

    #[test]
    fn px_normalizes_negative_zero() {
        assert_eq!(px(-0.0), "0px");
        assert_eq!(px(336.0), "336px");
        assert_eq!(px(-12.5), "-12.5px");
    }

    #[test]
    fn snapshot_never_covers_display() {
        assert!(!DRAG_SNAPSHOT_PROPS.contains(&StyleProp::Display));
        assert_eq!(StyleProp::PointerEvents.css_name(), "pointer-events");
    }
}
