//! Controller configuration.
//!
//! ```json
//! {
//!   "keys": { "order": "dash:layout:order:v1", "legacy_order": null },
//!   "grid": { "max_columns": 4 },
//!   "drag": { "drag_threshold": 5.0 }
//! }
//! ```
//!
//! Every section and field is optional.

use panelgrid_layout::{DragConfig, GridOptions, GridOptionsError};
use panelgrid_store::StorageKeys;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid layout config: {0}")]
    Parse(String),
    #[error(transparent)]
    Grid(#[from] GridOptionsError),
    #[error("drag threshold must be finite and non-negative, got {0}")]
    DragThreshold(f64),
}

/// Everything a [`LayoutController`](crate::LayoutController) is built from.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub keys: StorageKeys,
    pub grid: GridOptions,
    pub drag: DragConfig,
}

impl LayoutConfig {
    /// Default config for the keys of `namespace`.
    #[must_use]
    pub fn for_target(namespace: &str) -> Self {
        Self {
            keys: StorageKeys::for_target(namespace),
            ..Self::default()
        }
    }

    /// Parse and validate a JSON config.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(raw).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.grid.validate()?;
        let threshold = self.drag.drag_threshold;
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(ConfigError::DragThreshold(threshold));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, LayoutConfig};

    #[test]
    fn partial_json_fills_defaults() {
        let config = LayoutConfig::from_json(
            r#"{ "keys": { "legacy_order": null }, "grid": { "max_columns": 4 }, "drag": { "drag_threshold": 5.0 } }"#,
        )
        .unwrap();
        assert_eq!(config.keys.order, "dash:layout:order:v1");
        assert_eq!(config.keys.legacy_order, None);
        assert_eq!(config.grid.max_columns, Some(4));
        assert_eq!(config.drag.drag_threshold, 5.0);
        assert_eq!(config.drag.lift.z_index, "50");
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            LayoutConfig::from_json(r#"{ "drag": { "drag_threshold": -1.0 } }"#),
            Err(ConfigError::DragThreshold(_))
        ));
        assert!(matches!(
            LayoutConfig::from_json(r#"{ "grid": { "col_width": 0.0 } }"#),
            Err(ConfigError::Grid(_))
        ));
        assert!(matches!(
            LayoutConfig::from_json("[]"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn namespace_config_uses_target_keys() {
        let config = LayoutConfig::for_target("pipeline");
        assert_eq!(config.keys.hidden, "pipeline:layout:hidden:v1");
        assert_eq!(config.keys.legacy_order, None);
    }
}
