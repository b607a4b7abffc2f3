#![forbid(unsafe_code)]

//! panelgrid public facade crate.
//!
//! Re-exports the layout, store, and runtime crates and adds the glue most
//! hosts want: a crate-wide [`Error`], and constructors that wire a
//! controller to a file-backed store.
//!
//! ```ignore
//! use panelgrid::prelude::*;
//!
//! let mut controller = panelgrid::open_file_controller(
//!     viewport,
//!     "layout.json",
//!     LayoutConfig::default(),
//! )?;
//! controller.init();
//! ```

use std::path::PathBuf;

// --- Layout re-exports -----------------------------------------------------

pub use panelgrid_layout::{
    Anchor, ComputedBox, DragCancelReason, DragConfig, DragDiagnostics, DragEffect, DragEngine,
    DragIgnoredReason, DragPhase, DragTransition, GridMetrics, GridOptions, HiddenSet, ItemId,
    Point, PointerButton, PointerInput, PointerKind, PointerTarget, Rect, StyleProp,
    ViewportAdapter, ViewportError,
};

// --- Store re-exports ------------------------------------------------------

pub use panelgrid_store::{
    JsonFileStore, KeyValueStore, LayoutStore, LegacyAliases, MemoryStore, ResetReport,
    StorageKeys, StoreError,
};

// --- Runtime re-exports ----------------------------------------------------

pub use panelgrid_runtime::{
    ChangeSource, ConfigError, DispatchOutcome, HostEvent, LayoutConfig, LayoutController,
    LayoutNotification, ListenerTarget, PreferenceSync, ReflowHandle, SyncError,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error for hosts wiring panelgrid together.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Standard result type for panelgrid APIs.
pub type Result<T> = std::result::Result<T, Error>;

/// Controller persisting to a JSON file.
pub type FileController<V> = LayoutController<V, JsonFileStore>;

/// Validate `config` and build a controller over the JSON file at `path`.
///
/// A missing file starts empty. A corrupt or future-version file is an
/// error; the caller decides whether to delete it or fall back to
/// [`MemoryStore`].
pub fn open_file_controller<V: ViewportAdapter>(
    viewport: V,
    path: impl Into<PathBuf>,
    config: LayoutConfig,
) -> Result<FileController<V>> {
    config.validate()?;
    let store = JsonFileStore::open(path)?;
    Ok(LayoutController::new(viewport, store, config))
}

/// Validate `config` and build a controller over a fresh in-memory store.
pub fn memory_controller<V: ViewportAdapter>(
    viewport: V,
    config: LayoutConfig,
) -> Result<LayoutController<V, MemoryStore>> {
    config.validate()?;
    Ok(LayoutController::new(viewport, MemoryStore::new(), config))
}

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        ChangeSource, Error, HostEvent, ItemId, KeyValueStore, LayoutConfig, LayoutController,
        LayoutNotification, ListenerTarget, Point, PointerInput, PointerTarget, Result,
        ViewportAdapter,
    };

    pub use crate::{layout, runtime, store};
}

pub use panelgrid_layout as layout;
pub use panelgrid_runtime as runtime;
pub use panelgrid_store as store;

#[cfg(test)]
mod tests {
    use panelgrid_layout::harness::MemoryViewport;

    use super::{Error, LayoutConfig, memory_controller};

    #[test]
    fn invalid_config_is_rejected_before_construction() {
        let mut config = LayoutConfig::default();
        config.drag.drag_threshold = -1.0;
        let viewport = MemoryViewport::grid(["a", "b"], 2, 100.0, 100.0, 10.0);
        assert!(matches!(
            memory_controller(viewport, config),
            Err(Error::Config(_))
        ));
    }
}
