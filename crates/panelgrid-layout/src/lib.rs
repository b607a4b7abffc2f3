#![forbid(unsafe_code)]

//! Grid metrics, order merging, visibility, and drag sessions.
//!
//! This crate holds everything about a panel container that does not touch
//! persistence: it reads geometry and mutates items through
//! [`ViewportAdapter`], and reports what it did as plain values.

pub mod drag;
pub mod geometry;
#[cfg(any(test, feature = "test-helpers"))]
pub mod harness;
pub mod id;
pub mod metrics;
pub mod order;
pub mod placeholder;
pub mod viewport;
pub mod visibility;

pub use drag::{
    DragCancelReason, DragConfig, DragDiagnostics, DragEffect, DragEngine, DragIgnoredReason,
    DragPhase, DragSession, DragTransition, LiftStyle, PointerButton, PointerInput, PointerKind,
    PointerTarget,
};
pub use geometry::{Point, Rect};
pub use id::{ItemId, ids};
pub use metrics::{
    DEFAULT_COL_WIDTH, DEFAULT_GAP, DEFAULT_ROW_HEIGHT, GridCell, GridMetrics, GridOptions,
    GridOptionsError, compute_metrics,
};
pub use order::{OrderApplication, apply_order, merge_order, order_signature};
pub use placeholder::{PlaceholderManager, PlaceholderStyle};
pub use viewport::{
    Anchor, ComputedBox, DRAG_CONTAINER_POSITION, STATIC_POSITION, StyleProp, ViewportAdapter,
    ViewportError,
};
pub use visibility::{HiddenSet, VisibilityApplier, VisibilityPass};
