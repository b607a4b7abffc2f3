//! Short-name aliases for the legacy order key.
//!
//! Older consumers store the dashboard order as semantic short-names
//! (`"kpis"`, `"goalProgress"`) instead of item ids. Reads accept either a
//! short-name or an id, case-insensitively; entries the table does not know
//! pass through as raw ids. Writes emit short-names only.

use std::collections::BTreeMap;

use panelgrid_layout::ItemId;

const DASHBOARD_ALIASES: [(&str, &str); 20] = [
    ("focus", "dashboard-focus"),
    ("filters", "dashboard-filters"),
    ("kpis", "dashboard-kpis"),
    ("pipeline", "dashboard-pipeline-overview"),
    ("today", "dashboard-today"),
    ("leaderboard", "referral-leaderboard"),
    ("stale", "dashboard-stale"),
    ("goalProgress", "goal-progress-card"),
    ("numbersPortfolio", "numbers-portfolio-card"),
    ("numbersReferrals", "numbers-referrals-card"),
    ("numbersMomentum", "numbers-momentum-card"),
    ("pipelineCalendar", "pipeline-calendar-card"),
    ("priorityActions", "priority-actions-card"),
    ("milestones", "milestones-card"),
    ("docPulse", "doc-pulse-card"),
    ("relationshipOpportunities", "rel-opps-card"),
    ("clientCareRadar", "nurture-card"),
    ("closingWatch", "closing-watch-card"),
    ("docCenter", "doc-center-card"),
    ("statusStack", "dashboard-status-stack"),
];

/// Bidirectional short-name to item id table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegacyAliases {
    /// Lowercased alias to id.
    by_alias: BTreeMap<String, ItemId>,
    /// Lowercased id to (alias, id).
    by_id: BTreeMap<String, (String, ItemId)>,
}

impl LegacyAliases {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The CRM dashboard widget table.
    #[must_use]
    pub fn dashboard_defaults() -> Self {
        let mut aliases = Self::new();
        for (alias, id) in DASHBOARD_ALIASES {
            aliases.insert(alias, id);
        }
        aliases
    }

    /// Register `alias` for `id`. Blank inputs are ignored.
    pub fn insert(&mut self, alias: &str, id: &str) {
        let alias = alias.trim();
        let Some(id) = ItemId::new(id) else {
            return;
        };
        if alias.is_empty() {
            return;
        }
        self.by_alias.insert(alias.to_lowercase(), id.clone());
        self.by_id
            .insert(id.as_str().to_lowercase(), (alias.to_owned(), id));
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_alias.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_alias.len()
    }

    /// Short-name for `id`, if it has one.
    #[must_use]
    pub fn alias_for(&self, id: &ItemId) -> Option<&str> {
        self.by_id
            .get(&id.as_str().to_lowercase())
            .map(|(alias, _)| alias.as_str())
    }

    /// Item id for a stored legacy entry (short-name or id).
    #[must_use]
    pub fn resolve(&self, entry: &str) -> Option<ItemId> {
        let lower = entry.trim().to_lowercase();
        if lower.is_empty() {
            return None;
        }
        self.by_alias
            .get(&lower)
            .or_else(|| self.by_id.get(&lower).map(|(_, id)| id))
            .cloned()
    }

    /// Translate a legacy list into item ids. Known short-names and ids map
    /// through the table, anything else is kept as a raw id (the order merge
    /// drops ids with no live item). Blank entries and duplicates are
    /// dropped.
    #[must_use]
    pub fn resolve_all<'a, I>(&self, entries: I) -> Vec<ItemId>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut out: Vec<ItemId> = Vec::new();
        for entry in entries {
            if let Some(id) = self.resolve(entry).or_else(|| ItemId::new(entry))
                && !out.contains(&id)
            {
                out.push(id);
            }
        }
        out
    }

    /// Translate an order into short-names, skipping ids with no alias.
    #[must_use]
    pub fn to_aliases(&self, order: &[ItemId]) -> Vec<String> {
        order
            .iter()
            .filter_map(|id| self.alias_for(id))
            .map(str::to_owned)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::LegacyAliases;
    use panelgrid_layout::ids;

    #[test]
    fn resolves_aliases_and_ids_case_insensitively() {
        let aliases = LegacyAliases::dashboard_defaults();
        assert_eq!(aliases.len(), 20);
        assert_eq!(
            aliases.resolve("GOALPROGRESS").map(|id| id.into_string()),
            Some("goal-progress-card".to_owned())
        );
        assert_eq!(
            aliases.resolve("Nurture-Card").map(|id| id.into_string()),
            Some("nurture-card".to_owned())
        );
        assert_eq!(aliases.resolve("unknown"), None);
        assert_eq!(aliases.resolve("  "), None);
    }

    #[test]
    fn resolve_all_keeps_raw_ids_and_drops_duplicates() {
        let aliases = LegacyAliases::dashboard_defaults();
        let resolved = aliases.resolve_all(["kpis", "dashboard-kpis", "custom", " ", "focus"]);
        assert_eq!(resolved, ids(["dashboard-kpis", "custom", "dashboard-focus"]));
    }

    #[test]
    fn empty_table_passes_ids_through() {
        let aliases = LegacyAliases::new();
        let resolved = aliases.resolve_all(["dashboard-focus", "dashboard-kpis", "dashboard-focus"]);
        assert_eq!(resolved, ids(["dashboard-focus", "dashboard-kpis"]));
    }

    #[test]
    fn writes_only_aliased_ids() {
        let aliases = LegacyAliases::dashboard_defaults();
        let out = aliases.to_aliases(&ids(["custom-card", "dashboard-today", "rel-opps-card"]));
        assert_eq!(out, vec!["today", "relationshipOpportunities"]);
    }
}
