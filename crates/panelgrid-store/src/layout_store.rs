#![forbid(unsafe_code)]

//! Typed access to the order, hidden set, and layout mode of one target.
//!
//! Reads never fail: a missing key, malformed JSON, or a backend error all
//! read as "absent" (empty order, nothing hidden, mode off). Writes return
//! the backend error so the caller can log it; an empty value removes its
//! key instead of storing an empty array.

use panelgrid_layout::{HiddenSet, ItemId};
use serde_json::Value;

use crate::backend::{KeyValueStore, StoreError};
use crate::keys::StorageKeys;
use crate::legacy::LegacyAliases;

const MODE_ON: &str = "1";
const MODE_OFF: &str = "0";

/// Keys removed by [`LayoutStore::reset`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResetReport {
    /// Keys that held a value and were removed.
    pub removed_keys: Vec<String>,
    /// Keys whose removal failed.
    pub failed_keys: Vec<String>,
}

/// Preference store for one layout target.
#[derive(Debug, Clone)]
pub struct LayoutStore<S> {
    backend: S,
    keys: StorageKeys,
    aliases: LegacyAliases,
}

impl<S: KeyValueStore> LayoutStore<S> {
    /// Store over `backend`. Keys with a legacy order key start with the
    /// dashboard alias table, others with none.
    pub fn new(backend: S, keys: StorageKeys) -> Self {
        let aliases = if keys.legacy_order.is_some() {
            LegacyAliases::dashboard_defaults()
        } else {
            LegacyAliases::new()
        };
        Self {
            backend,
            keys,
            aliases,
        }
    }

    #[must_use]
    pub fn with_aliases(mut self, aliases: LegacyAliases) -> Self {
        self.aliases = aliases;
        self
    }

    pub fn set_aliases(&mut self, aliases: LegacyAliases) {
        self.aliases = aliases;
    }

    #[must_use]
    pub const fn keys(&self) -> &StorageKeys {
        &self.keys
    }

    #[must_use]
    pub const fn aliases(&self) -> &LegacyAliases {
        &self.aliases
    }

    #[must_use]
    pub const fn backend(&self) -> &S {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut S {
        &mut self.backend
    }

    pub fn into_backend(self) -> S {
        self.backend
    }

    /// Stored order, falling back to the legacy key when the canonical one
    /// yields nothing.
    pub fn read_order(&self) -> Vec<ItemId> {
        let canonical = self
            .read_raw(&self.keys.order)
            .map(|raw| parse_id_list(&self.keys.order, &raw))
            .unwrap_or_default();
        if !canonical.is_empty() {
            return canonical;
        }
        let Some(legacy_key) = self.keys.legacy_order.as_deref() else {
            return canonical;
        };
        let Some(raw) = self.read_raw(legacy_key) else {
            return canonical;
        };
        let entries = parse_string_list(legacy_key, &raw);
        let resolved = self
            .aliases
            .resolve_all(entries.iter().map(String::as_str));
        if !resolved.is_empty() {
            tracing::debug!(key = legacy_key, count = resolved.len(), "order read from legacy key");
        }
        resolved
    }

    /// Persist `order` under the canonical key and mirror its aliased ids to
    /// the legacy key. An empty order removes the canonical key. The legacy
    /// key is left untouched when no id maps to a short-name, so orders that
    /// older consumers cannot read never erase theirs.
    pub fn write_order(&mut self, order: &[ItemId]) -> Result<(), StoreError> {
        if order.is_empty() {
            self.backend.remove(&self.keys.order)?;
        } else {
            let json = to_json(order)?;
            self.backend.set(&self.keys.order, &json)?;
        }
        let Some(legacy_key) = self.keys.legacy_order.clone() else {
            return Ok(());
        };
        let aliases = self.aliases.to_aliases(order);
        if aliases.is_empty() {
            tracing::trace!(key = %legacy_key, "no aliased ids; legacy order left as is");
            return Ok(());
        }
        let json = to_json(&aliases)?;
        self.backend.set(&legacy_key, &json)
    }

    pub fn read_hidden(&self) -> HiddenSet {
        self.read_raw(&self.keys.hidden)
            .map(|raw| parse_id_list(&self.keys.hidden, &raw))
            .unwrap_or_default()
            .into_iter()
            .collect()
    }

    /// Persist `hidden` as a sorted JSON array. An empty set removes the key.
    pub fn write_hidden(&mut self, hidden: &HiddenSet) -> Result<(), StoreError> {
        if hidden.is_empty() {
            self.backend.remove(&self.keys.hidden)?;
            return Ok(());
        }
        let sorted: Vec<&ItemId> = hidden.iter().collect();
        let json = to_json(&sorted)?;
        self.backend.set(&self.keys.hidden, &json)
    }

    /// Layout mode: on only for exactly `"1"` or `"true"`.
    pub fn read_mode(&self) -> bool {
        self.read_raw(&self.keys.mode)
            .is_some_and(|raw| parse_mode(&raw))
    }

    pub fn write_mode(&mut self, enabled: bool) -> Result<(), StoreError> {
        let value = if enabled { MODE_ON } else { MODE_OFF };
        self.backend.set(&self.keys.mode, value)
    }

    /// Remove every key of this target.
    pub fn reset(&mut self) -> ResetReport {
        let keys: Vec<String> = self.keys.all().into_iter().map(str::to_owned).collect();
        let mut report = ResetReport::default();
        for key in keys {
            match self.backend.remove(&key) {
                Ok(true) => report.removed_keys.push(key),
                Ok(false) => {}
                Err(err) => {
                    tracing::warn!(key = %key, error = %err, "failed to remove layout key");
                    report.failed_keys.push(key);
                }
            }
        }
        report
    }

    fn read_raw(&self, key: &str) -> Option<String> {
        match self.backend.get(key) {
            Ok(value) => value.filter(|raw| !raw.is_empty()),
            Err(err) => {
                tracing::warn!(key, error = %err, "layout key unreadable; treating as absent");
                None
            }
        }
    }
}

/// `"1"` and `"true"` are on; everything else is off.
#[must_use]
pub fn parse_mode(raw: &str) -> bool {
    matches!(raw, "1" | "true")
}

/// Parse a JSON array of ids. Numbers are accepted as their decimal text;
/// other entries and blank ids are dropped. Anything but an array reads as
/// empty.
#[must_use]
pub fn parse_id_list(key: &str, raw: &str) -> Vec<ItemId> {
    parse_string_list(key, raw)
        .into_iter()
        .filter_map(ItemId::new)
        .collect()
}

fn parse_string_list(key: &str, raw: &str) -> Vec<String> {
    let value: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(err) => {
            tracing::debug!(key, error = %err, "malformed layout value; treating as absent");
            return Vec::new();
        }
    };
    let Value::Array(entries) = value else {
        tracing::debug!(key, "layout value is not an array; treating as absent");
        return Vec::new();
    };
    entries
        .into_iter()
        .filter_map(|entry| match entry {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .collect()
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, StoreError> {
    serde_json::to_string(value).map_err(|err| StoreError::Serialize(err.to_string()))
}
