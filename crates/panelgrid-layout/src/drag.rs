#![forbid(unsafe_code)]

//! Drag session state machine for one container.
//!
//! ```text
//! Idle -> Dragging -> (Committed | Cancelled) -> Idle
//!    \-> Armed -> Dragging          (only with a positive drag threshold)
//!          \----> Idle              (released before the threshold)
//! ```
//!
//! The engine is host-driven: the embedding UI forwards pointer signals and
//! the engine mutates the container through a [`ViewportAdapter`]. Each call
//! returns a [`DragTransition`] describing what happened, including explicit
//! ignore reasons for signals that were dropped.
//!
//! # Invariants
//!
//! 1. At most one session is active; pointer-down while active is ignored.
//! 2. The placeholder is mounted only while a session is active.
//! 3. Cancel restores the start order and every snapshotted inline style
//!    before returning.
//! 4. Commit restores inline styles but leaves the item where the
//!    placeholder was.
//! 5. Pointer capture is advisory: failing to acquire it never aborts a drag.
//! 6. A static container is made `relative` for the session and text
//!    selection is suppressed; both are restored on commit and on cancel.

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Rect};
use crate::id::ItemId;
use crate::metrics::{GridCell, GridMetrics, GridOptions, compute_metrics};
use crate::order::{OrderApplication, apply_order, order_signature};
use crate::placeholder::PlaceholderManager;
use crate::viewport::{
    DRAG_CONTAINER_POSITION, DRAG_SNAPSHOT_PROPS, STATIC_POSITION, StyleProp, ViewportAdapter, px,
};

/// Visual treatment applied to the item while it is lifted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiftStyle {
    pub z_index: String,
    pub box_shadow: String,
    pub opacity: String,
}

impl Default for LiftStyle {
    fn default() -> Self {
        Self {
            z_index: "50".to_owned(),
            box_shadow: "0 22px 44px rgba(15,23,42,0.18)".to_owned(),
            opacity: "0.72".to_owned(),
        }
    }
}

/// Drag behaviour configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DragConfig {
    /// Pointer travel (px, either axis) required before a drag starts.
    /// `0` starts the drag on pointer-down.
    pub drag_threshold: f64,
    pub lift: LiftStyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerKind {
    Mouse,
    Touch,
    Pen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerButton {
    Primary,
    Secondary,
    Auxiliary,
}

/// One pointer sample forwarded by the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerInput {
    pub pointer_id: u32,
    pub kind: PointerKind,
    pub button: PointerButton,
    pub position: Point,
}

impl PointerInput {
    /// Primary-button mouse sample.
    #[must_use]
    pub const fn mouse(pointer_id: u32, position: Point) -> Self {
        Self {
            pointer_id,
            kind: PointerKind::Mouse,
            button: PointerButton::Primary,
            position,
        }
    }

    /// Touch sample.
    #[must_use]
    pub const fn touch(pointer_id: u32, position: Point) -> Self {
        Self {
            pointer_id,
            kind: PointerKind::Touch,
            button: PointerButton::Primary,
            position,
        }
    }

    #[must_use]
    pub const fn with_button(mut self, button: PointerButton) -> Self {
        self.button = button;
        self
    }
}

/// What the host resolved under a pointer-down.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PointerTarget {
    /// Item containing the event target, if any.
    pub item: Option<ItemId>,
    /// True when the target is an interactive control (button, link,
    /// input, editable region...). Presses on those never start a drag.
    pub interactive: bool,
}

impl PointerTarget {
    #[must_use]
    pub fn item(id: ItemId) -> Self {
        Self {
            item: Some(id),
            interactive: false,
        }
    }

    #[must_use]
    pub fn interactive(mut self) -> Self {
        self.interactive = true;
        self
    }
}

/// Coarse lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragPhase {
    Idle,
    Armed,
    Dragging,
}

/// Why a pointer signal was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragIgnoredReason {
    Disabled,
    SessionActive,
    ButtonNotAllowed,
    InteractiveTarget,
    NoItem,
    UnknownItem,
    NotOnHandle,
    SingleItem,
    NoActivePointer,
    PointerMismatch,
    ThresholdNotReached,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragCancelReason {
    PointerCancel,
    Disabled,
    Programmatic,
}

/// Effect of one lifecycle step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum DragEffect {
    Armed {
        item: ItemId,
        pointer_id: u32,
    },
    Started {
        item: ItemId,
        pointer_id: u32,
        start_index: usize,
        metrics: GridMetrics,
        pointer_captured: bool,
    },
    Moved {
        item: ItemId,
        translate: Point,
        cell: GridCell,
        target_index: usize,
        placeholder_moved: bool,
    },
    Disarmed {
        item: ItemId,
        pointer_id: u32,
    },
    Committed {
        item: ItemId,
        pointer_id: u32,
        order: Vec<ItemId>,
        /// Whether the order signature differs from the last known one.
        changed: bool,
    },
    Cancelled {
        item: ItemId,
        pointer_id: u32,
        reason: DragCancelReason,
    },
    Ignored {
        reason: DragIgnoredReason,
    },
}

/// One state-machine step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DragTransition {
    pub from: DragPhase,
    pub to: DragPhase,
    pub effect: DragEffect,
}

impl DragTransition {
    fn ignored(phase: DragPhase, reason: DragIgnoredReason) -> Self {
        Self {
            from: phase,
            to: phase,
            effect: DragEffect::Ignored { reason },
        }
    }

    /// Reason the signal was dropped, if it was.
    #[must_use]
    pub const fn ignored_reason(&self) -> Option<DragIgnoredReason> {
        match self.effect {
            DragEffect::Ignored { reason } => Some(reason),
            _ => None,
        }
    }
}

/// Counters for debugging drag behaviour in the field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DragDiagnostics {
    pub drag_starts: u64,
    /// Placeholder moves.
    pub swaps: u64,
    /// Committed drags.
    pub drag_ends: u64,
    pub cancels: u64,
    /// Column count of the most recent session.
    pub columns: u32,
    /// Item order after the most recent order-affecting operation.
    pub widgets: Vec<ItemId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct StyleSnapshot(Vec<(StyleProp, String)>);

impl StyleSnapshot {
    fn capture<V: ViewportAdapter + ?Sized>(viewport: &V, id: &ItemId) -> Self {
        Self(
            DRAG_SNAPSHOT_PROPS
                .iter()
                .map(|prop| (*prop, viewport.inline_style(id, *prop)))
                .collect(),
        )
    }

    fn restore<V: ViewportAdapter + ?Sized>(&self, viewport: &mut V, id: &ItemId) {
        for (prop, value) in &self.0 {
            write_style(viewport, id, *prop, value);
        }
    }
}

/// State of an active drag.
#[derive(Debug, Clone)]
pub struct DragSession {
    pointer_id: u32,
    item: ItemId,
    start_order: Vec<ItemId>,
    start_index: usize,
    metrics: GridMetrics,
    /// Item rect at drag start, container-relative.
    start_rect: Rect,
    origin: Point,
    target_index: usize,
    snapshot: StyleSnapshot,
    pointer_captured: bool,
    /// Inline container `position` to restore, when the session set one.
    container_position: Option<String>,
    selection_suppressed: bool,
}

impl DragSession {
    #[must_use]
    pub const fn pointer_id(&self) -> u32 {
        self.pointer_id
    }

    #[must_use]
    pub fn item(&self) -> &ItemId {
        &self.item
    }

    #[must_use]
    pub fn start_order(&self) -> &[ItemId] {
        &self.start_order
    }

    #[must_use]
    pub const fn start_index(&self) -> usize {
        self.start_index
    }

    #[must_use]
    pub const fn metrics(&self) -> GridMetrics {
        self.metrics
    }

    #[must_use]
    pub const fn start_rect(&self) -> Rect {
        self.start_rect
    }

    /// Index among non-dragged items where the item will land.
    #[must_use]
    pub const fn target_index(&self) -> usize {
        self.target_index
    }

    #[must_use]
    pub const fn pointer_captured(&self) -> bool {
        self.pointer_captured
    }

    /// Whether the session positioned a static container.
    #[must_use]
    pub const fn positioned_container(&self) -> bool {
        self.container_position.is_some()
    }

    #[must_use]
    pub const fn selection_suppressed(&self) -> bool {
        self.selection_suppressed
    }
}

#[derive(Debug, Clone)]
struct ArmedDrag {
    item: ItemId,
    pointer_id: u32,
    origin: Point,
}

#[derive(Debug, Clone)]
enum SessionState {
    Idle,
    Armed(ArmedDrag),
    Dragging(Box<DragSession>),
}

/// Per-container drag engine.
#[derive(Debug, Clone)]
pub struct DragEngine {
    config: DragConfig,
    grid: GridOptions,
    enabled: bool,
    state: SessionState,
    placeholder: PlaceholderManager,
    last_signature: Option<String>,
    diagnostics: DragDiagnostics,
}

impl Default for DragEngine {
    fn default() -> Self {
        Self::new(DragConfig::default(), GridOptions::default())
    }
}

impl DragEngine {
    #[must_use]
    pub fn new(config: DragConfig, grid: GridOptions) -> Self {
        Self {
            config,
            grid,
            enabled: true,
            state: SessionState::Idle,
            placeholder: PlaceholderManager::new(),
            last_signature: None,
            diagnostics: DragDiagnostics::default(),
        }
    }

    #[must_use]
    pub const fn phase(&self) -> DragPhase {
        match self.state {
            SessionState::Idle => DragPhase::Idle,
            SessionState::Armed(_) => DragPhase::Armed,
            SessionState::Dragging(_) => DragPhase::Dragging,
        }
    }

    /// Active session, if dragging.
    #[must_use]
    pub fn session(&self) -> Option<&DragSession> {
        match &self.state {
            SessionState::Dragging(session) => Some(session),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    /// Stop accepting pointer-downs, cancelling any in-flight session.
    pub fn disable<V: ViewportAdapter + ?Sized>(
        &mut self,
        viewport: &mut V,
    ) -> Option<DragTransition> {
        let transition = self.cancel(viewport, DragCancelReason::Disabled);
        self.enabled = false;
        transition
    }

    /// Replace the grid overrides used by later sessions.
    pub fn set_grid(&mut self, grid: GridOptions) {
        self.grid = grid;
    }

    #[must_use]
    pub const fn grid(&self) -> &GridOptions {
        &self.grid
    }

    #[must_use]
    pub const fn diagnostics(&self) -> &DragDiagnostics {
        &self.diagnostics
    }

    #[must_use]
    pub const fn placeholder(&self) -> &PlaceholderManager {
        &self.placeholder
    }

    /// Signature of the last applied or committed order.
    #[must_use]
    pub fn last_signature(&self) -> Option<&str> {
        self.last_signature.as_deref()
    }

    /// Apply a stored order to the container.
    ///
    /// Skipped while dragging. Without `force`, a stored order whose
    /// signature matches the last known one is not re-applied. Returns
    /// `None` when nothing was applied.
    pub fn apply_stored_order<V: ViewportAdapter + ?Sized>(
        &mut self,
        viewport: &mut V,
        stored: &[ItemId],
        force: bool,
    ) -> Option<OrderApplication> {
        if matches!(self.state, SessionState::Dragging(_)) {
            tracing::debug!("stored order skipped while dragging");
            return None;
        }
        if stored.is_empty() {
            if force {
                let current = viewport.item_ids();
                self.last_signature = Some(order_signature(&current));
                self.diagnostics.widgets = current;
            }
            return None;
        }
        if !force && self.last_signature.as_deref() == Some(order_signature(stored).as_str()) {
            return None;
        }
        match apply_order(viewport, stored) {
            Ok(applied) => {
                self.last_signature = Some(order_signature(&applied.order));
                self.diagnostics.widgets.clone_from(&applied.order);
                Some(applied)
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to apply stored order");
                None
            }
        }
    }

    /// Handle pointer-down on the container.
    pub fn pointer_down<V: ViewportAdapter + ?Sized>(
        &mut self,
        viewport: &mut V,
        target: &PointerTarget,
        input: PointerInput,
    ) -> DragTransition {
        let phase = self.phase();
        if !self.enabled {
            return DragTransition::ignored(phase, DragIgnoredReason::Disabled);
        }
        if phase != DragPhase::Idle {
            return DragTransition::ignored(phase, DragIgnoredReason::SessionActive);
        }
        if input.kind == PointerKind::Mouse && input.button != PointerButton::Primary {
            return DragTransition::ignored(phase, DragIgnoredReason::ButtonNotAllowed);
        }
        if target.interactive {
            return DragTransition::ignored(phase, DragIgnoredReason::InteractiveTarget);
        }
        let Some(item) = target.item.clone() else {
            return DragTransition::ignored(phase, DragIgnoredReason::NoItem);
        };
        let items = viewport.item_ids();
        if !items.contains(&item) {
            return DragTransition::ignored(phase, DragIgnoredReason::UnknownItem);
        }
        let handle = viewport
            .handle_rect(&item)
            .or_else(|| viewport.item_rect(&item));
        if !handle.is_some_and(|rect| rect.contains(input.position)) {
            return DragTransition::ignored(phase, DragIgnoredReason::NotOnHandle);
        }
        if items.len() <= 1 {
            return DragTransition::ignored(phase, DragIgnoredReason::SingleItem);
        }

        if self.config.drag_threshold > 0.0 {
            self.state = SessionState::Armed(ArmedDrag {
                item: item.clone(),
                pointer_id: input.pointer_id,
                origin: input.position,
            });
            return DragTransition {
                from: phase,
                to: DragPhase::Armed,
                effect: DragEffect::Armed {
                    item,
                    pointer_id: input.pointer_id,
                },
            };
        }
        self.begin(viewport, item, input.pointer_id, input.position, &items)
    }

    /// Handle pointer-move for the active pointer.
    pub fn pointer_move<V: ViewportAdapter + ?Sized>(
        &mut self,
        viewport: &mut V,
        input: PointerInput,
    ) -> DragTransition {
        let phase = self.phase();
        match &mut self.state {
            SessionState::Idle => {
                DragTransition::ignored(phase, DragIgnoredReason::NoActivePointer)
            }
            SessionState::Armed(armed) => {
                if armed.pointer_id != input.pointer_id {
                    return DragTransition::ignored(phase, DragIgnoredReason::PointerMismatch);
                }
                let (dx, dy) = input.position.delta_from(armed.origin);
                let threshold = self.config.drag_threshold;
                if dx.abs() < threshold && dy.abs() < threshold {
                    return DragTransition::ignored(phase, DragIgnoredReason::ThresholdNotReached);
                }
                let armed = armed.clone();
                self.state = SessionState::Idle;
                let items = viewport.item_ids();
                let started = self.begin(viewport, armed.item, armed.pointer_id, armed.origin, &items);
                if let SessionState::Dragging(session) = &mut self.state {
                    track(
                        session,
                        &mut self.placeholder,
                        &mut self.diagnostics,
                        viewport,
                        input.position,
                    );
                }
                DragTransition {
                    from: DragPhase::Armed,
                    ..started
                }
            }
            SessionState::Dragging(session) => {
                if session.pointer_id != input.pointer_id {
                    return DragTransition::ignored(phase, DragIgnoredReason::PointerMismatch);
                }
                let effect = track(
                    session,
                    &mut self.placeholder,
                    &mut self.diagnostics,
                    viewport,
                    input.position,
                );
                DragTransition {
                    from: phase,
                    to: phase,
                    effect,
                }
            }
        }
    }

    /// Handle pointer-up: commits an active drag.
    pub fn pointer_up<V: ViewportAdapter + ?Sized>(
        &mut self,
        viewport: &mut V,
        pointer_id: u32,
    ) -> DragTransition {
        let phase = self.phase();
        let Some(active_pointer) = self.active_pointer() else {
            return DragTransition::ignored(phase, DragIgnoredReason::NoActivePointer);
        };
        if active_pointer != pointer_id {
            return DragTransition::ignored(phase, DragIgnoredReason::PointerMismatch);
        }
        if phase == DragPhase::Armed {
            self.disarm()
        } else {
            self.finish(viewport, None)
        }
    }

    /// Handle pointer-cancel: cancels an active drag.
    ///
    /// `pointer_id` is `None` when the host cannot attribute the cancel to a
    /// pointer; it then applies to whatever session is active.
    pub fn pointer_cancel<V: ViewportAdapter + ?Sized>(
        &mut self,
        viewport: &mut V,
        pointer_id: Option<u32>,
    ) -> DragTransition {
        let phase = self.phase();
        let Some(active_pointer) = self.active_pointer() else {
            return DragTransition::ignored(phase, DragIgnoredReason::NoActivePointer);
        };
        if pointer_id.is_some_and(|id| id != active_pointer) {
            return DragTransition::ignored(phase, DragIgnoredReason::PointerMismatch);
        }
        self.cancel(viewport, DragCancelReason::PointerCancel)
            .unwrap_or_else(|| DragTransition::ignored(phase, DragIgnoredReason::NoActivePointer))
    }

    /// Cancel whatever session is active. `None` when idle.
    pub fn cancel<V: ViewportAdapter + ?Sized>(
        &mut self,
        viewport: &mut V,
        reason: DragCancelReason,
    ) -> Option<DragTransition> {
        match self.state {
            SessionState::Idle => None,
            SessionState::Armed(_) => Some(self.disarm()),
            SessionState::Dragging(_) => Some(self.finish(viewport, Some(reason))),
        }
    }

    /// Pointer owning the armed or dragging session.
    #[must_use]
    pub fn active_pointer(&self) -> Option<u32> {
        match &self.state {
            SessionState::Idle => None,
            SessionState::Armed(armed) => Some(armed.pointer_id),
            SessionState::Dragging(session) => Some(session.pointer_id),
        }
    }

    fn disarm(&mut self) -> DragTransition {
        let phase = self.phase();
        match std::mem::replace(&mut self.state, SessionState::Idle) {
            SessionState::Armed(armed) => DragTransition {
                from: phase,
                to: DragPhase::Idle,
                effect: DragEffect::Disarmed {
                    item: armed.item,
                    pointer_id: armed.pointer_id,
                },
            },
            other => {
                self.state = other;
                DragTransition::ignored(phase, DragIgnoredReason::NoActivePointer)
            }
        }
    }

    fn begin<V: ViewportAdapter + ?Sized>(
        &mut self,
        viewport: &mut V,
        item: ItemId,
        pointer_id: u32,
        origin: Point,
        items: &[ItemId],
    ) -> DragTransition {
        let phase = self.phase();
        let Some(start_index) = items.iter().position(|id| *id == item) else {
            return DragTransition::ignored(phase, DragIgnoredReason::UnknownItem);
        };
        let Some(item_rect) = viewport.item_rect(&item) else {
            return DragTransition::ignored(phase, DragIgnoredReason::UnknownItem);
        };
        let container = viewport.container_rect();
        let metrics = compute_metrics(viewport, &self.grid);
        let start_rect = item_rect.relative_to(&container);
        let snapshot = StyleSnapshot::capture(viewport, &item);

        let container_position = position_container(viewport);
        let selection_suppressed = match viewport.set_selection_suppressed(true) {
            Ok(()) => true,
            Err(err) => {
                tracing::debug!(item = %item, error = %err, "text selection not suppressed");
                false
            }
        };

        let computed = viewport.computed_box(&item);
        self.placeholder.prepare(item_rect, computed.as_ref());
        if let Err(err) = self.placeholder.attach(viewport, &item, start_index) {
            tracing::warn!(item = %item, error = %err, "failed to mount placeholder");
        }
        self.lift(viewport, &item, start_rect);

        let pointer_captured = match viewport.capture_pointer(&item, pointer_id) {
            Ok(()) => true,
            Err(err) => {
                tracing::debug!(item = %item, pointer_id, error = %err, "pointer capture unavailable");
                false
            }
        };

        self.diagnostics.drag_starts += 1;
        self.diagnostics.columns = metrics.columns;
        tracing::debug!(
            item = %item,
            pointer_id,
            start_index,
            columns = metrics.columns,
            "drag started"
        );
        self.state = SessionState::Dragging(Box::new(DragSession {
            pointer_id,
            item: item.clone(),
            start_order: items.to_vec(),
            start_index,
            metrics,
            start_rect,
            origin,
            target_index: start_index,
            snapshot,
            pointer_captured,
            container_position,
            selection_suppressed,
        }));
        DragTransition {
            from: phase,
            to: DragPhase::Dragging,
            effect: DragEffect::Started {
                item,
                pointer_id,
                start_index,
                metrics,
                pointer_captured,
            },
        }
    }

    fn lift<V: ViewportAdapter + ?Sized>(&self, viewport: &mut V, item: &ItemId, rect: Rect) {
        if let Err(err) = viewport.set_absolute_position(item, rect) {
            tracing::warn!(item = %item, error = %err, "failed to position dragged item");
        }
        let lift = &self.config.lift;
        write_style(viewport, item, StyleProp::Margin, "0");
        write_style(viewport, item, StyleProp::Transition, "none");
        write_style(viewport, item, StyleProp::PointerEvents, "none");
        write_style(viewport, item, StyleProp::ZIndex, &lift.z_index);
        write_style(viewport, item, StyleProp::WillChange, "transform");
        write_style(viewport, item, StyleProp::BoxShadow, &lift.box_shadow);
        write_style(viewport, item, StyleProp::Opacity, &lift.opacity);
    }

    /// End the active session: commit when `cancel` is `None`.
    fn finish<V: ViewportAdapter + ?Sized>(
        &mut self,
        viewport: &mut V,
        cancel: Option<DragCancelReason>,
    ) -> DragTransition {
        let phase = self.phase();
        let session = match std::mem::replace(&mut self.state, SessionState::Idle) {
            SessionState::Dragging(session) => *session,
            other => {
                self.state = other;
                return DragTransition::ignored(phase, DragIgnoredReason::NoActivePointer);
            }
        };

        if session.pointer_captured
            && let Err(err) = viewport.release_pointer(&session.item, session.pointer_id)
        {
            tracing::debug!(item = %session.item, error = %err, "pointer release failed");
        }
        if session.selection_suppressed
            && let Err(err) = viewport.set_selection_suppressed(false)
        {
            tracing::warn!(item = %session.item, error = %err, "failed to restore text selection");
        }
        session.snapshot.restore(viewport, &session.item);
        if let Some(prior) = &session.container_position
            && let Err(err) = viewport.set_container_position(prior)
        {
            tracing::warn!(error = %err, "failed to restore container position");
        }

        let effect = match cancel {
            None => {
                if viewport.placeholder_mounted()
                    && let Err(err) = viewport.move_item_to_placeholder(&session.item)
                {
                    tracing::warn!(item = %session.item, error = %err, "failed to drop item at placeholder");
                }
                self.placeholder.detach(viewport);
                let order = viewport.item_ids();
                let signature = order_signature(&order);
                let changed = self.last_signature.as_deref() != Some(signature.as_str());
                if changed {
                    self.last_signature = Some(signature);
                }
                self.diagnostics.drag_ends += 1;
                self.diagnostics.widgets.clone_from(&order);
                tracing::debug!(item = %session.item, changed, "drag committed");
                DragEffect::Committed {
                    item: session.item,
                    pointer_id: session.pointer_id,
                    order,
                    changed,
                }
            }
            Some(reason) => {
                self.placeholder.detach(viewport);
                match apply_order(viewport, &session.start_order) {
                    Ok(applied) => self.diagnostics.widgets = applied.order,
                    Err(err) => {
                        tracing::warn!(item = %session.item, error = %err, "failed to restore start order");
                    }
                }
                self.diagnostics.cancels += 1;
                tracing::debug!(item = %session.item, ?reason, "drag cancelled");
                DragEffect::Cancelled {
                    item: session.item,
                    pointer_id: session.pointer_id,
                    reason,
                }
            }
        };
        DragTransition {
            from: phase,
            to: DragPhase::Idle,
            effect,
        }
    }
}

/// Make a static container anchor the lifted item. Returns the inline value
/// to restore, or `None` when the container was left alone.
fn position_container<V: ViewportAdapter + ?Sized>(viewport: &mut V) -> Option<String> {
    if viewport.container_position() != STATIC_POSITION {
        return None;
    }
    let prior = viewport.container_inline_position();
    match viewport.set_container_position(DRAG_CONTAINER_POSITION) {
        Ok(()) => Some(prior),
        Err(err) => {
            tracing::warn!(error = %err, "failed to position container for drag");
            None
        }
    }
}

/// Follow the pointer: snap the visual offset and move the placeholder.
fn track<V: ViewportAdapter + ?Sized>(
    session: &mut DragSession,
    placeholder: &mut PlaceholderManager,
    diagnostics: &mut DragDiagnostics,
    viewport: &mut V,
    position: Point,
) -> DragEffect {
    let (dx, dy) = position.delta_from(session.origin);
    let raw = Point::new(session.start_rect.x + dx, session.start_rect.y + dy);
    let snapped = session.metrics.snap(raw);
    let translate = Point::new(
        snapped.x - session.start_rect.x + 0.0,
        snapped.y - session.start_rect.y + 0.0,
    );
    write_style(
        viewport,
        &session.item,
        StyleProp::Transform,
        &format!("translate({}, {})", px(translate.x), px(translate.y)),
    );

    let cell = session
        .metrics
        .cell_at(raw, session.start_rect.width, session.start_rect.height);
    let remaining: Vec<ItemId> = viewport
        .item_ids()
        .into_iter()
        .filter(|id| *id != session.item)
        .collect();
    let placeholder_moved = match placeholder.move_to(viewport, &remaining, cell.index) {
        Ok(moved) => moved,
        Err(err) => {
            tracing::warn!(item = %session.item, error = %err, "failed to move placeholder");
            false
        }
    };
    if placeholder_moved {
        diagnostics.swaps += 1;
        tracing::debug!(item = %session.item, index = cell.index, "placeholder moved");
    }
    if let Some(index) = placeholder.index() {
        session.target_index = index;
    }
    DragEffect::Moved {
        item: session.item.clone(),
        translate,
        cell,
        target_index: session.target_index,
        placeholder_moved,
    }
}

fn write_style<V: ViewportAdapter + ?Sized>(
    viewport: &mut V,
    id: &ItemId,
    prop: StyleProp,
    value: &str,
) {
    if let Err(err) = viewport.set_inline_style(id, prop, value) {
        tracing::warn!(item = %id, property = prop.css_name(), error = %err, "failed to write inline style");
    }
}
