//! Host events in, layout notifications out.

use panelgrid_layout::{ItemId, PointerInput, PointerTarget};
use serde::{Deserialize, Serialize};

use crate::listener::EventKind;

/// Event forwarded by the host to [`LayoutController::dispatch`].
///
/// [`LayoutController::dispatch`]: crate::LayoutController::dispatch
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    PointerDown {
        target: PointerTarget,
        input: PointerInput,
    },
    PointerMove(PointerInput),
    PointerUp(PointerInput),
    /// `pointer_id` is `None` when the host cannot attribute the cancel.
    PointerCancel { pointer_id: Option<u32> },
    /// Another tab changed storage. `key` is `None` when storage was
    /// cleared wholesale.
    StorageChange { key: Option<String> },
}

impl HostEvent {
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::PointerDown { .. } => EventKind::PointerDown,
            Self::PointerMove(_) => EventKind::PointerMove,
            Self::PointerUp(_) => EventKind::PointerUp,
            Self::PointerCancel { .. } => EventKind::PointerCancel,
            Self::StorageChange { .. } => EventKind::StorageChange,
        }
    }
}

/// Who caused a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeSource {
    /// A user action in this controller.
    Local,
    /// A storage change made elsewhere (another tab).
    Remote,
    /// A layout-state reset.
    Reset,
}

/// Structured change notification for sibling UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayoutNotification {
    OrderChanged {
        order: Vec<ItemId>,
        source: ChangeSource,
    },
    HiddenChanged {
        hidden: Vec<ItemId>,
        source: ChangeSource,
    },
    ModeChanged {
        enabled: bool,
        source: ChangeSource,
    },
    LayoutReset {
        removed_keys: Vec<String>,
    },
}

#[cfg(test)]
mod tests {
    use panelgrid_layout::ids;

    use super::{ChangeSource, LayoutNotification};

    #[test]
    fn notifications_serialize_tagged() {
        let note = LayoutNotification::OrderChanged {
            order: ids(["b", "a"]),
            source: ChangeSource::Remote,
        };
        assert_eq!(
            serde_json::to_string(&note).unwrap(),
            r#"{"kind":"order_changed","order":["b","a"],"source":"remote"}"#
        );
    }
}
