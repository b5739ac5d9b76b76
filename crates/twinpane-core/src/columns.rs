//! Proportional listing column widths and the header resize gesture.

use serde::{Deserialize, Serialize};

/// Default column widths in percent: name, extension, size, modified, created.
pub const DEFAULT_COLUMN_WIDTHS: [f64; 5] = [30.0, 15.0, 15.0, 20.0, 20.0];

/// Allowed deviation of the width sum from 100 before renormalizing.
const SUM_TOLERANCE: f64 = 0.1;

/// Column widths in percent of the listing width.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnWidths(Vec<f64>);

impl Default for ColumnWidths {
    fn default() -> Self {
        Self(DEFAULT_COLUMN_WIDTHS.to_vec())
    }
}

impl ColumnWidths {
    /// Parse stored widths.
    ///
    /// Returns `None` for anything that is not a JSON array of exactly
    /// [`DEFAULT_COLUMN_WIDTHS`]`.len()` numbers.
    pub fn parse(raw: &str) -> Option<Self> {
        let widths: Vec<f64> = serde_json::from_str(raw).ok()?;
        (widths.len() == DEFAULT_COLUMN_WIDTHS.len()).then(|| Self::sanitized(&widths))
    }

    /// Replace invalid or negative entries with an equal share, then normalize.
    pub fn sanitized(widths: &[f64]) -> Self {
        if widths.is_empty() {
            return Self::default();
        }
        let share = 100.0 / widths.len() as f64;
        let cleaned = widths
            .iter()
            .map(|&w| if w.is_finite() && w >= 0.0 { w } else { share })
            .collect();
        Self(cleaned).normalized()
    }

    /// Scale so the widths sum to 100 when they drift beyond tolerance.
    pub fn normalized(self) -> Self {
        let sum = self.sum();
        if sum <= 0.0 {
            let share = 100.0 / self.0.len().max(1) as f64;
            return Self(vec![share; self.0.len()]);
        }
        if (sum - 100.0).abs() <= SUM_TOLERANCE {
            return self;
        }
        let factor = 100.0 / sum;
        Self(self.0.into_iter().map(|w| w * factor).collect())
    }

    /// Widths for `count` columns, falling back to an equal split on mismatch.
    pub fn for_columns(&self, count: usize) -> Vec<f64> {
        if self.0.len() == count {
            self.0.clone()
        } else {
            vec![100.0 / count.max(1) as f64; count]
        }
    }

    /// Sum of all widths.
    pub fn sum(&self) -> f64 {
        self.0.iter().sum()
    }

    /// Widths as a slice.
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Serialized form for the preference store.
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.0).unwrap_or_else(|_| "[]".to_string())
    }

    /// Split `total` cells between the columns. The last column takes
    /// whatever the others leave, so the cells always add up to `total`.
    pub fn to_cells(&self, total: u16) -> Vec<u16> {
        let Some((_, leading)) = self.0.split_last() else {
            return Vec::new();
        };
        let mut used = 0u16;
        let mut cells: Vec<u16> = leading
            .iter()
            .map(|w| {
                let cell = (((w / 100.0) * f64::from(total)).floor() as u16).min(total - used);
                used += cell;
                cell
            })
            .collect();
        cells.push(total - used);
        cells
    }
}

/// Drag state for resizing the boundary between two adjacent columns.
///
/// Widths are tracked in pixels while the gesture is live and converted to
/// percentages on release.
#[derive(Debug, Clone)]
pub struct ColumnResize {
    /// Index of the column left of the dragged boundary.
    left: usize,
    /// Pointer x when the gesture started.
    start_x: f64,
    /// Pixel widths when the gesture started.
    start_px: Vec<f64>,
    /// Current pixel widths.
    current_px: Vec<f64>,
    /// Minimum width of either column.
    min_px: f64,
}

impl ColumnResize {
    /// Start resizing the boundary right of column `left`.
    ///
    /// Returns `None` when there is no column to the right.
    pub fn begin(widths_px: Vec<f64>, left: usize, start_x: f64, min_px: f64) -> Option<Self> {
        if left + 1 >= widths_px.len() {
            return None;
        }
        Some(Self {
            left,
            start_x,
            start_px: widths_px.clone(),
            current_px: widths_px,
            min_px,
        })
    }

    /// Index of the column left of the boundary.
    pub fn left_column(&self) -> usize {
        self.left
    }

    /// Move the boundary to pointer position `x`.
    ///
    /// The pair keeps its combined width; whichever column would shrink
    /// below the minimum is pinned there and the other absorbs the rest.
    pub fn drag_to(&mut self, x: f64) {
        let right = self.left + 1;
        let start_left = self.start_px[self.left];
        let start_right = self.start_px[right];
        let pair = start_left + start_right;
        let delta = x - self.start_x;

        let mut new_left = start_left + delta;
        let mut new_right = start_right - delta;
        if new_left < self.min_px {
            new_left = self.min_px;
            new_right = pair - self.min_px;
        } else if new_right < self.min_px {
            new_right = self.min_px;
            new_left = pair - self.min_px;
        }

        self.current_px[self.left] = new_left;
        self.current_px[right] = new_right;
    }

    /// Current pixel widths.
    pub fn widths_px(&self) -> &[f64] {
        &self.current_px
    }

    /// Finish the gesture, converting to percentages of `bar_width`.
    ///
    /// A zero-width bar (hidden pane) keeps `fallback`.
    pub fn finish(self, bar_width: f64, fallback: &ColumnWidths) -> ColumnWidths {
        if bar_width <= 0.0 || !bar_width.is_finite() {
            return fallback.clone();
        }
        let percents: Vec<f64> = self
            .current_px
            .iter()
            .map(|px| px / bar_width * 100.0)
            .collect();
        ColumnWidths::sanitized(&percents)
    }
}
