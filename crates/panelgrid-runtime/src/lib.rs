#![forbid(unsafe_code)]

//! Layout controller for panelgrid containers.
//!
//! Ties a [`ViewportAdapter`](panelgrid_layout::ViewportAdapter), a
//! [`KeyValueStore`](panelgrid_store::KeyValueStore), and the drag engine
//! together: one-time initialization, edit-mode toggling, late reflow for
//! content that mounts after init, and cross-tab sync through storage-change
//! events.

pub mod config;
pub mod controller;
pub mod event;
pub mod listener;
pub mod reflow;
pub mod sync;

pub use config::{ConfigError, LayoutConfig};
pub use controller::{DIAGNOSTICS_TARGET, DispatchOutcome, LayoutController};
pub use event::{ChangeSource, HostEvent, LayoutNotification};
pub use listener::{EventKind, ListenerRegistry, ListenerTarget};
pub use reflow::{MAX_PENDING_REFLOWS, MUTATION_WATCH_FRAMES, ReflowHandle, ReflowScheduler};
pub use sync::{PreferenceSync, SyncError};
