//! Stable item identifiers.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable string identifier of one panel within a container.
///
/// Ids are trimmed on construction and never empty. Uniqueness within a
/// container is the container provider's responsibility.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Normalize `raw` into an id; `None` when it is blank.
    #[must_use]
    pub fn new(raw: impl AsRef<str>) -> Option<Self> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_owned()))
        }
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ItemId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ItemId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Build a list of ids from string slices, dropping blanks.
///
/// Convenience for hosts and tests that hold plain strings.
#[must_use]
pub fn ids<I, T>(raw: I) -> Vec<ItemId>
where
    I: IntoIterator<Item = T>,
    T: AsRef<str>,
{
    raw.into_iter().filter_map(ItemId::new).collect()
}

#[cfg(test)]
mod tests {
    use super::{ItemId, ids};

    #[test]
    fn blank_ids_are_rejected() {
        assert_eq!(ItemId::new(""), None);
        assert_eq!(ItemId::new("   "), None);
    }

    #[test]
    fn ids_are_trimmed() {
        let id = ItemId::new("  goal-progress-card ").expect("non-blank");
        assert_eq!(id.as_str(), "goal-progress-card");
        assert_eq!(id.to_string(), "goal-progress-card");
    }

    #[test]
    fn ids_helper_skips_blanks() {
        let list = ids(["a", " ", "b"]);
        assert_eq!(list.len(), 2);
        assert_eq!(list[1].as_str(), "b");
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = ItemId::new("kpis").expect("non-blank");
        assert_eq!(serde_json::to_string(&id).expect("serialize"), "\"kpis\"");
    }
}
