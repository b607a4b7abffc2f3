//! Best-effort preference sync.
//!
//! A host may forward committed orders to an external settings service.
//! Failures are logged by the controller and never affect layout.

use panelgrid_layout::ItemId;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    #[error("preference sync is unavailable")]
    Unavailable,
    #[error("preference sync rejected the update: {0}")]
    Rejected(String),
}

/// Receiver for committed order changes.
pub trait PreferenceSync {
    fn order_changed(&mut self, order: &[ItemId]) -> Result<(), SyncError>;
}

impl<F> PreferenceSync for F
where
    F: FnMut(&[ItemId]) -> Result<(), SyncError>,
{
    fn order_changed(&mut self, order: &[ItemId]) -> Result<(), SyncError> {
        self(order)
    }
}
