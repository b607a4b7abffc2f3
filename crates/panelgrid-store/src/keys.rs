//! Namespaced storage keys for one layout target.

use serde::{Deserialize, Serialize};

/// Namespace used by [`StorageKeys::default`].
pub const DEFAULT_NAMESPACE: &str = "dash";

/// Key holding the legacy short-name order.
pub const LEGACY_ORDER_KEY: &str = "dashboard.widgets.order";

/// Keys for the persisted preferences of one layout target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageKeys {
    pub order: String,
    /// `None` disables the legacy mirror entirely.
    pub legacy_order: Option<String>,
    pub hidden: String,
    pub mode: String,
}

impl StorageKeys {
    /// Keys for `namespace`: `{ns}:layout:order:v1`, `{ns}:layout:hidden:v1`,
    /// and `{ns}:layoutMode:v1`.
    ///
    /// Only the [`DEFAULT_NAMESPACE`] target mirrors its order to
    /// [`LEGACY_ORDER_KEY`]; that key belongs to the dashboard.
    #[must_use]
    pub fn for_target(namespace: &str) -> Self {
        let legacy_order =
            (namespace == DEFAULT_NAMESPACE).then(|| LEGACY_ORDER_KEY.to_owned());
        Self {
            order: format!("{namespace}:layout:order:v1"),
            legacy_order,
            hidden: format!("{namespace}:layout:hidden:v1"),
            mode: format!("{namespace}:layoutMode:v1"),
        }
    }

    #[must_use]
    pub fn without_legacy(mut self) -> Self {
        self.legacy_order = None;
        self
    }

    /// Every key, in removal order for a reset.
    #[must_use]
    pub fn all(&self) -> Vec<&str> {
        let mut keys = vec![self.order.as_str()];
        if let Some(legacy) = &self.legacy_order {
            keys.push(legacy.as_str());
        }
        keys.push(self.hidden.as_str());
        keys.push(self.mode.as_str());
        keys
    }

    /// Classify a storage-change key. `None` means the whole store was
    /// cleared.
    #[must_use]
    pub fn classify(&self, key: Option<&str>) -> KeyKind {
        match key {
            None => KeyKind::All,
            Some(key) if key == self.order => KeyKind::Order,
            Some(key) if self.legacy_order.as_deref() == Some(key) => KeyKind::Order,
            Some(key) if key == self.hidden => KeyKind::Hidden,
            Some(key) if key == self.mode => KeyKind::Mode,
            Some(_) => KeyKind::Other,
        }
    }
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self::for_target(DEFAULT_NAMESPACE)
    }
}

/// Which preference a storage key belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    Order,
    Hidden,
    Mode,
    /// Storage was cleared wholesale.
    All,
    Other,
}
