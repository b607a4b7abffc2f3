#![forbid(unsafe_code)]

//! Layout controller: one container, its preferences, and its drag engine.
//!
//! The controller is host-driven and never returns errors. Hosts:
//!
//! 1. construct it with a viewport, a storage backend, and a config,
//! 2. call [`init`](LayoutController::init) once the container exists,
//! 3. forward events with [`dispatch`](LayoutController::dispatch),
//! 4. drive late reflow with the `on_*` hooks, and
//! 5. drain [`LayoutNotification`]s to update sibling UI.
//!
//! # Invariants
//!
//! 1. Listeners are attached at most once per controller, however often
//!    `init` runs.
//! 2. Re-applying unchanged stored state performs no viewport mutation.
//! 3. A committed drag whose order differs from the last known order is
//!    persisted, announced, and offered to preference sync, in that order.
//! 4. Storage and sync failures are logged and never block a user action.
//! 5. A committed order whose write failed stays authoritative: later layout
//!    passes retry the write and re-apply that order instead of the stale
//!    stored one, until a write succeeds or another tab writes an order.

use panelgrid_layout::{
    DragDiagnostics, DragEffect, DragEngine, DragPhase, DragTransition,
    GridOptions, HiddenSet, ItemId, ViewportAdapter, VisibilityApplier,
};
use panelgrid_store::{KeyKind, KeyValueStore, LayoutStore, LegacyAliases, ResetReport};

use crate::config::LayoutConfig;
use crate::event::{ChangeSource, HostEvent, LayoutNotification};
use crate::listener::{EventKind, ListenerRegistry, ListenerTarget};
use crate::reflow::{ReflowHandle, ReflowScheduler};
use crate::sync::PreferenceSync;

/// Target of the best-effort diagnostic events.
pub const DIAGNOSTICS_TARGET: &str = "panelgrid::diagnostics";

/// Internal handler attached through the listener registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    DragStart,
    DragMove,
    DragEnd,
    DragCancel,
    StorageSync,
}

const ROUTES: [(ListenerTarget, EventKind, Route, &str); 5] = [
    (ListenerTarget::Container, EventKind::PointerDown, Route::DragStart, "drag:pointerdown"),
    (ListenerTarget::Window, EventKind::PointerMove, Route::DragMove, "drag:pointermove"),
    (ListenerTarget::Window, EventKind::PointerUp, Route::DragEnd, "drag:pointerup"),
    (ListenerTarget::Window, EventKind::PointerCancel, Route::DragCancel, "drag:pointercancel"),
    (ListenerTarget::Window, EventKind::StorageChange, Route::StorageSync, "layout:storage"),
];

/// Result of one [`LayoutController::dispatch`] call.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DispatchOutcome {
    /// Number of registry routes that received the event.
    pub routes: usize,
    /// Drag engine step, when a drag route handled the event.
    pub transition: Option<DragTransition>,
}

/// Orchestrates one container.
pub struct LayoutController<V, S> {
    viewport: V,
    store: LayoutStore<S>,
    engine: DragEngine,
    visibility: VisibilityApplier,
    hidden: HiddenSet,
    layout_mode: bool,
    registry: ListenerRegistry<Route>,
    reflow: ReflowScheduler,
    notifications: Vec<LayoutNotification>,
    sync: Option<Box<dyn PreferenceSync>>,
    /// Committed order the store refused.
    unsaved_order: Option<Vec<ItemId>>,
    initialized: bool,
}

impl<V, S> std::fmt::Debug for LayoutController<V, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutController")
            .field("layout_mode", &self.layout_mode)
            .field("hidden", &self.hidden)
            .field("phase", &self.engine.phase())
            .field("listeners", &self.registry.listener_count())
            .field("pending_reflows", &self.reflow.pending_count())
            .field("unsaved_order", &self.unsaved_order.is_some())
            .field("initialized", &self.initialized)
            .finish_non_exhaustive()
    }
}

impl<V: ViewportAdapter, S: KeyValueStore> LayoutController<V, S> {
    pub fn new(viewport: V, backend: S, config: LayoutConfig) -> Self {
        let LayoutConfig { keys, grid, drag } = config;
        Self {
            viewport,
            store: LayoutStore::new(backend, keys),
            engine: DragEngine::new(drag, grid),
            visibility: VisibilityApplier::new(),
            hidden: HiddenSet::new(),
            layout_mode: false,
            registry: ListenerRegistry::new(),
            reflow: ReflowScheduler::new(),
            notifications: Vec::new(),
            sync: None,
            unsaved_order: None,
            initialized: false,
        }
    }

    /// Mirror orders to the legacy short-name key using `aliases`.
    #[must_use]
    pub fn with_legacy_aliases(mut self, aliases: LegacyAliases) -> Self {
        self.store.set_aliases(aliases);
        self
    }

    #[must_use]
    pub fn with_preference_sync(mut self, sync: Box<dyn PreferenceSync>) -> Self {
        self.sync = Some(sync);
        self
    }

    /// Initialize, or re-apply stored state if already initialized.
    pub fn init(&mut self) {
        if self.initialized {
            tracing::debug!("layout already initialized; re-applying stored state");
            self.refresh();
            return;
        }
        self.initialized = true;

        let mode = self.store.read_mode();
        self.apply_mode(mode);
        self.hidden = self.store.read_hidden();
        self.apply_layout(true);

        for (target, kind, route, key) in ROUTES {
            self.registry.attach_once(target, kind, route, key);
        }
        self.schedule_late_reflow("init", true);

        tracing::info!(
            target: DIAGNOSTICS_TARGET,
            listeners = self.registry.listener_count(),
            layout_mode = self.layout_mode,
            hidden = self.hidden.len(),
            "layout initialized"
        );
    }

    /// Re-read the hidden set and re-apply stored order and visibility.
    pub fn refresh(&mut self) {
        self.hidden = self.store.read_hidden();
        self.apply_layout(true);
    }

    /// Apply layout now and schedule a late reflow.
    pub fn request_layout_pass(&mut self, reason: &str) -> ReflowHandle {
        self.schedule_late_reflow(reason, false)
    }

    pub fn cancel_reflow(&mut self, handle: ReflowHandle) -> bool {
        self.reflow.cancel(handle)
    }

    /// Toggle edit mode. Disabling mid-drag cancels the drag. Returns
    /// whether the mode changed.
    pub fn set_layout_mode(&mut self, enabled: bool) -> bool {
        if enabled == self.layout_mode {
            return false;
        }
        if let Err(err) = self.store.write_mode(enabled) {
            tracing::warn!(enabled, error = %err, "failed to persist layout mode");
        }
        self.apply_mode(enabled);
        self.notifications.push(LayoutNotification::ModeChanged {
            enabled,
            source: ChangeSource::Local,
        });
        true
    }

    /// Replace the hidden set. Only a changed set triggers a write and a
    /// visibility pass. Returns whether it changed.
    pub fn apply_hidden<I>(&mut self, ids: I) -> bool
    where
        I: IntoIterator<Item = ItemId>,
    {
        let next: HiddenSet = ids.into_iter().collect();
        if next == self.hidden {
            return false;
        }
        if let Err(err) = self.store.write_hidden(&next) {
            tracing::warn!(error = %err, "failed to persist hidden set");
        }
        self.hidden = next;
        self.visibility.apply(&mut self.viewport, &self.hidden);
        self.notify_hidden(ChangeSource::Local);
        true
    }

    /// Remove every persisted key, un-hide every item, and leave edit mode.
    pub fn reset_layout_state(&mut self, skip_layout_pass: bool) -> ResetReport {
        self.unsaved_order = None;
        let report = self.store.reset();
        if self.layout_mode {
            self.apply_mode(false);
            self.notifications.push(LayoutNotification::ModeChanged {
                enabled: false,
                source: ChangeSource::Reset,
            });
        }
        if !self.hidden.is_empty() {
            self.hidden.clear();
            self.visibility.apply(&mut self.viewport, &self.hidden);
            self.notify_hidden(ChangeSource::Reset);
        }
        self.notifications.push(LayoutNotification::LayoutReset {
            removed_keys: report.removed_keys.clone(),
        });
        tracing::info!(
            target: DIAGNOSTICS_TARGET,
            removed = report.removed_keys.len(),
            failed = report.failed_keys.len(),
            "layout state reset"
        );
        if !skip_layout_pass {
            self.request_layout_pass("reset");
        }
        report
    }

    /// Replace grid overrides for later drags.
    pub fn set_grid_options(&mut self, grid: GridOptions) {
        self.engine.set_grid(grid);
    }

    /// Route a host event through the listener registry.
    pub fn dispatch(&mut self, target: ListenerTarget, event: HostEvent) -> DispatchOutcome {
        let routes: Vec<Route> = self.registry.handlers(target, event.kind()).to_vec();
        let mut outcome = DispatchOutcome {
            routes: routes.len(),
            transition: None,
        };
        for route in routes {
            if let Some(transition) = self.handle(route, &event) {
                outcome.transition = Some(transition);
            }
        }
        outcome
    }

    /// Handle a storage change made elsewhere. `None` means storage was
    /// cleared wholesale.
    pub fn on_storage_change(&mut self, key: Option<&str>) {
        let kind = self.store.keys().classify(key);
        if matches!(kind, KeyKind::Mode | KeyKind::All) {
            let mode = self.store.read_mode();
            if mode != self.layout_mode {
                self.apply_mode(mode);
                self.notifications.push(LayoutNotification::ModeChanged {
                    enabled: mode,
                    source: ChangeSource::Remote,
                });
            }
        }
        if matches!(kind, KeyKind::Hidden | KeyKind::All) {
            let hidden = self.store.read_hidden();
            if hidden != self.hidden {
                self.hidden = hidden;
                self.visibility.apply(&mut self.viewport, &self.hidden);
                self.notify_hidden(ChangeSource::Remote);
            }
        }
        if matches!(kind, KeyKind::Order | KeyKind::All) {
            if self.unsaved_order.take().is_some() {
                tracing::debug!("unsaved order superseded by a newer stored order");
            }
            let stored = self.store.read_order();
            if let Some(applied) = self
                .engine
                .apply_stored_order(&mut self.viewport, &stored, false)
                && applied.moved
            {
                self.notifications.push(LayoutNotification::OrderChanged {
                    order: applied.order,
                    source: ChangeSource::Remote,
                });
            }
        }
        if kind == KeyKind::Other {
            tracing::trace!(?key, "ignoring unrelated storage change");
        }
    }

    /// Animation-frame tick. Returns whether layout was re-applied.
    pub fn on_animation_frame(&mut self) -> bool {
        let fired = self.reflow.on_animation_frame();
        self.reflow_if(!fired.is_empty(), "animation frame")
    }

    /// Zero-delay timer tick. Returns whether layout was re-applied.
    pub fn on_timer(&mut self) -> bool {
        let fired = self.reflow.on_timer();
        self.reflow_if(!fired.is_empty(), "timer")
    }

    /// The container's children changed. Returns whether layout was
    /// re-applied.
    pub fn on_content_mounted(&mut self) -> bool {
        let fired = self.reflow.on_content_mounted();
        self.reflow_if(!fired.is_empty(), "content mounted")
    }

    /// Take queued notifications.
    pub fn drain_notifications(&mut self) -> Vec<LayoutNotification> {
        std::mem::take(&mut self.notifications)
    }

    /// Committed order still waiting for a successful write.
    #[must_use]
    pub fn unsaved_order(&self) -> Option<&[ItemId]> {
        self.unsaved_order.as_deref()
    }

    #[must_use]
    pub const fn listener_count(&self) -> usize {
        self.registry.listener_count()
    }

    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }

    #[must_use]
    pub const fn layout_mode(&self) -> bool {
        self.layout_mode
    }

    #[must_use]
    pub const fn hidden(&self) -> &HiddenSet {
        &self.hidden
    }

    #[must_use]
    pub const fn drag_phase(&self) -> DragPhase {
        self.engine.phase()
    }

    #[must_use]
    pub const fn diagnostics(&self) -> &DragDiagnostics {
        self.engine.diagnostics()
    }

    #[must_use]
    pub const fn reflow(&self) -> &ReflowScheduler {
        &self.reflow
    }

    #[must_use]
    pub const fn viewport(&self) -> &V {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut V {
        &mut self.viewport
    }

    #[must_use]
    pub const fn store(&self) -> &LayoutStore<S> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut LayoutStore<S> {
        &mut self.store
    }

    fn handle(&mut self, route: Route, event: &HostEvent) -> Option<DragTransition> {
        let transition = match (route, event) {
            (Route::DragStart, HostEvent::PointerDown { target, input }) => {
                self.engine.pointer_down(&mut self.viewport, target, *input)
            }
            (Route::DragMove, HostEvent::PointerMove(input)) => {
                self.engine.pointer_move(&mut self.viewport, *input)
            }
            (Route::DragEnd, HostEvent::PointerUp(input)) => {
                self.engine.pointer_up(&mut self.viewport, input.pointer_id)
            }
            (Route::DragCancel, HostEvent::PointerCancel { pointer_id }) => {
                self.engine.pointer_cancel(&mut self.viewport, *pointer_id)
            }
            (Route::StorageSync, HostEvent::StorageChange { key }) => {
                self.on_storage_change(key.as_deref());
                return None;
            }
            _ => return None,
        };
        self.after_transition(&transition);
        Some(transition)
    }

    fn after_transition(&mut self, transition: &DragTransition) {
        match &transition.effect {
            DragEffect::Committed {
                order,
                changed: true,
                ..
            } => self.persist_order(order),
            DragEffect::Committed { changed: false, .. } | DragEffect::Cancelled { .. } => {
                self.log_drag_summary();
            }
            _ => {}
        }
    }

    fn persist_order(&mut self, order: &[ItemId]) {
        match self.store.write_order(order) {
            Ok(()) => self.unsaved_order = None,
            Err(err) => {
                tracing::warn!(error = %err, "failed to persist committed order; layout kept");
                self.unsaved_order = Some(order.to_vec());
            }
        }
        self.notifications.push(LayoutNotification::OrderChanged {
            order: order.to_vec(),
            source: ChangeSource::Local,
        });
        if let Some(sync) = self.sync.as_mut()
            && let Err(err) = sync.order_changed(order)
        {
            tracing::warn!(error = %err, "preference sync failed");
        }
        self.log_drag_summary();
    }

    fn notify_hidden(&mut self, source: ChangeSource) {
        self.notifications.push(LayoutNotification::HiddenChanged {
            hidden: self.hidden.iter().cloned().collect(),
            source,
        });
    }

    fn log_drag_summary(&self) {
        let diagnostics = self.engine.diagnostics();
        tracing::info!(
            target: DIAGNOSTICS_TARGET,
            drag_starts = diagnostics.drag_starts,
            swaps = diagnostics.swaps,
            drag_ends = diagnostics.drag_ends,
            cancels = diagnostics.cancels,
            columns = diagnostics.columns,
            widgets = diagnostics.widgets.len(),
            placeholder_gone = !self.viewport.placeholder_mounted(),
            "drag summary"
        );
    }

    fn apply_mode(&mut self, enabled: bool) {
        self.layout_mode = enabled;
        if enabled {
            self.engine.enable();
        } else if let Some(transition) = self.engine.disable(&mut self.viewport) {
            tracing::debug!(?transition.effect, "drag cancelled by leaving layout mode");
            self.log_drag_summary();
        }
    }

    fn apply_layout(&mut self, force: bool) {
        let order = match self.unsaved_order.take() {
            Some(unsaved) => self.retry_unsaved(unsaved),
            None => self.store.read_order(),
        };
        self.engine
            .apply_stored_order(&mut self.viewport, &order, force);
        self.visibility.apply(&mut self.viewport, &self.hidden);
    }

    /// Retry the refused write. The unsaved order is applied either way and
    /// kept for the next pass if the store still refuses it.
    fn retry_unsaved(&mut self, unsaved: Vec<ItemId>) -> Vec<ItemId> {
        match self.store.write_order(&unsaved) {
            Ok(()) => tracing::debug!(count = unsaved.len(), "unsaved order written on retry"),
            Err(err) => {
                tracing::debug!(error = %err, "unsaved order still not writable");
                self.unsaved_order = Some(unsaved.clone());
            }
        }
        unsaved
    }

    fn schedule_late_reflow(&mut self, reason: &str, skip_immediate: bool) -> ReflowHandle {
        if !skip_immediate {
            self.apply_layout(true);
        }
        self.reflow.schedule(reason)
    }

    fn reflow_if(&mut self, fired: bool, tick: &str) -> bool {
        if fired {
            tracing::debug!(tick, "late reflow pass");
            self.apply_layout(true);
        }
        fired
    }
}
