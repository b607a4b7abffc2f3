#![forbid(unsafe_code)]

//! Grid metrics: column width, row height, gap, and column count.
//!
//! Metrics are derived from the first item's rect and the container width
//! every time a drag starts; nothing is cached between sessions.
//!
//! # Invariants
//!
//! 1. `columns >= 1`.
//! 2. `col_width > 0`, `row_height > 0`, `gap >= 0`.
//! 3. Without explicit overrides,
//!    `columns = max(1, floor((container_width + gap) / (col_width + gap)))`.
//! 4. Cell math clamps `col` into `0..columns` and `row` to `>= 0`.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;
use crate::viewport::{ComputedBox, ViewportAdapter};

/// Column width used when no reference item exists.
pub const DEFAULT_COL_WIDTH: f64 = 320.0;
/// Row height used when no reference item exists.
pub const DEFAULT_ROW_HEIGHT: f64 = 260.0;
/// Gap used when no reference item exists or its gap cannot be read.
pub const DEFAULT_GAP: f64 = 16.0;

/// Optional per-container overrides for metric derivation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GridOptions {
    pub col_width: Option<f64>,
    pub row_height: Option<f64>,
    pub gap: Option<f64>,
    /// Fixed column count; replaces the width-derived count.
    pub columns: Option<u32>,
    pub min_columns: Option<u32>,
    pub max_columns: Option<u32>,
}

/// Invalid [`GridOptions`] value.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GridOptionsError {
    #[error("{field} must be a positive finite number, got {value}")]
    NonPositiveSize { field: &'static str, value: f64 },
    #[error("gap must be a non-negative finite number, got {value}")]
    InvalidGap { value: f64 },
    #[error("{field} must be at least 1")]
    ZeroColumns { field: &'static str },
    #[error("min_columns {min} exceeds max_columns {max}")]
    ColumnRangeInverted { min: u32, max: u32 },
}

impl GridOptions {
    /// Validate every present override.
    pub fn validate(&self) -> Result<(), GridOptionsError> {
        for (field, value) in [("col_width", self.col_width), ("row_height", self.row_height)] {
            if let Some(value) = value
                && !(value.is_finite() && value > 0.0)
            {
                return Err(GridOptionsError::NonPositiveSize { field, value });
            }
        }
        if let Some(value) = self.gap
            && !(value.is_finite() && value >= 0.0)
        {
            return Err(GridOptionsError::InvalidGap { value });
        }
        for (field, value) in [
            ("columns", self.columns),
            ("min_columns", self.min_columns),
            ("max_columns", self.max_columns),
        ] {
            if value == Some(0) {
                return Err(GridOptionsError::ZeroColumns { field });
            }
        }
        if let (Some(min), Some(max)) = (self.min_columns, self.max_columns)
            && min > max
        {
            return Err(GridOptionsError::ColumnRangeInverted { min, max });
        }
        Ok(())
    }
}

/// One grid cell addressed by column/row plus its linear index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridCell {
    pub col: u32,
    pub row: u32,
    pub index: usize,
}

/// Resolved grid geometry for one drag session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridMetrics {
    pub col_width: f64,
    pub row_height: f64,
    pub gap: f64,
    pub columns: u32,
}

impl Default for GridMetrics {
    fn default() -> Self {
        Self {
            col_width: DEFAULT_COL_WIDTH,
            row_height: DEFAULT_ROW_HEIGHT,
            gap: DEFAULT_GAP,
            columns: 1,
        }
    }
}

impl GridMetrics {
    /// Horizontal distance between column origins.
    #[must_use]
    pub fn step_x(&self) -> f64 {
        positive_or_one(self.col_width + self.gap)
    }

    /// Vertical distance between row origins.
    #[must_use]
    pub fn step_y(&self) -> f64 {
        positive_or_one(self.row_height + self.gap)
    }

    /// Snap a container-relative position to the nearest grid step.
    #[must_use]
    pub fn snap(&self, raw: Point) -> Point {
        Point::new(snap_to_step(raw.x, self.step_x()), snap_to_step(raw.y, self.step_y()))
    }

    /// Grid cell under an item whose top-left is at `position` and whose
    /// size is `width` x `height`.
    ///
    /// Uses the item's center: `col = clamp(round((x + w/2) / step_x), 0,
    /// columns - 1)`, `row = max(0, round((y + h/2) / step_y))`.
    #[must_use]
    pub fn cell_at(&self, position: Point, width: f64, height: f64) -> GridCell {
        let columns = self.columns.max(1);
        let col_raw = ((position.x + width / 2.0) / self.step_x()).round();
        let row_raw = ((position.y + height / 2.0) / self.step_y()).round();
        let col = clamp_to_u32(col_raw, 0, columns - 1);
        let row = clamp_to_u32(row_raw, 0, u32::MAX);
        let index = (row as usize)
            .saturating_mul(columns as usize)
            .saturating_add(col as usize);
        GridCell { col, row, index }
    }
}

/// Round `raw` to the nearest multiple of `step`.
#[must_use]
pub fn snap_to_step(raw: f64, step: f64) -> f64 {
    let step = positive_or_one(step);
    (raw / step).round() * step + 0.0
}

/// Largest non-negative gap among margins and gaps, or [`DEFAULT_GAP`].
#[must_use]
pub fn infer_gap(computed: Option<&ComputedBox>) -> f64 {
    let Some(computed) = computed else {
        return DEFAULT_GAP;
    };
    [
        computed.margin_right,
        computed.margin_bottom,
        computed.row_gap,
        computed.column_gap,
    ]
    .into_iter()
    .flatten()
    .filter(|value| value.is_finite() && *value >= 0.0)
    .reduce(f64::max)
    .unwrap_or(DEFAULT_GAP)
}

/// Derive metrics from the container's first item and the container width.
#[must_use]
pub fn compute_metrics<V: ViewportAdapter + ?Sized>(
    viewport: &V,
    options: &GridOptions,
) -> GridMetrics {
    let first = viewport.item_ids().into_iter().next();
    let reference = first
        .as_ref()
        .and_then(|id| viewport.item_rect(id).map(|rect| (id, rect)))
        .filter(|(_, rect)| !rect.is_empty());

    let (base_width, base_height, base_gap) = match reference {
        Some((id, rect)) => (
            rect.width,
            rect.height,
            infer_gap(viewport.computed_box(id).as_ref()),
        ),
        None => (DEFAULT_COL_WIDTH, DEFAULT_ROW_HEIGHT, DEFAULT_GAP),
    };

    let col_width = positive_override(options.col_width).unwrap_or(base_width);
    let row_height = positive_override(options.row_height).unwrap_or(base_height);
    let gap = options
        .gap
        .filter(|gap| gap.is_finite() && *gap >= 0.0)
        .unwrap_or(base_gap);

    let container_width = viewport.container_rect().width;
    let step_x = positive_or_one(col_width + gap);
    let mut columns = if container_width.is_finite() {
        clamp_to_u32(((container_width + gap) / step_x).floor(), 1, u32::MAX)
    } else {
        1
    };
    if let Some(fixed) = options.columns.filter(|c| *c > 0) {
        columns = fixed;
    }
    if let Some(max) = options.max_columns.filter(|c| *c > 0) {
        columns = columns.min(max);
    }
    if let Some(min) = options.min_columns.filter(|c| *c > 0) {
        columns = columns.max(min);
    }

    let metrics = GridMetrics {
        col_width,
        row_height,
        gap,
        columns: columns.max(1),
    };
    tracing::debug!(
        col_width = metrics.col_width,
        row_height = metrics.row_height,
        gap = metrics.gap,
        columns = metrics.columns,
        "grid metrics derived"
    );
    metrics
}

fn positive_override(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

fn positive_or_one(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        1.0
    }
}

fn clamp_to_u32(value: f64, min: u32, max: u32) -> u32 {
    if value.is_nan() || value <= f64::from(min) {
        min
    } else if value >= f64::from(max) {
        max
    } else {
        value as u32
    }
}
