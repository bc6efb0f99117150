//! Grid geometry and font metrics.
//!
//! Every field has a default matching the classic 1000x1000 grid painted
//! with a 12x24 monospace font, so a config file only needs the values it
//! changes.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::PaintError;
use crate::format::{Cell, CodepointLayout, GridHeader};

pub const DEFAULT_COLS: usize = 1000;
pub const DEFAULT_ROWS: usize = 1000;
pub const DEFAULT_FONT_WIDTH: u32 = 12;
pub const DEFAULT_FONT_HEIGHT: u32 = 24;
pub const DEFAULT_BASELINE: f64 = 0.8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Cells per row.
    pub cols: usize,
    /// Rows in the grid.
    pub rows: usize,
    /// Cell width in surface units.
    pub font_width: u32,
    /// Cell height in surface units; also the font size.
    pub font_height: u32,
    /// Glyph baseline as a fraction of the cell height, from the cell top.
    pub baseline: f64,
    pub font_family: String,
    pub layout: CodepointLayout,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cols: DEFAULT_COLS,
            rows: DEFAULT_ROWS,
            font_width: DEFAULT_FONT_WIDTH,
            font_height: DEFAULT_FONT_HEIGHT,
            baseline: DEFAULT_BASELINE,
            font_family: "monospace".to_string(),
            layout: CodepointLayout::Legacy,
        }
    }
}

impl GridConfig {
    pub fn with_size(cols: usize, rows: usize) -> Self {
        Self {
            cols,
            rows,
            ..Self::default()
        }
    }

    /// Load a JSON config file. Missing fields keep their defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: GridConfig = serde_json::from_str(&text)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn cell_count(&self) -> usize {
        self.cols * self.rows
    }

    /// Bytes a buffer must hold for this grid.
    pub fn buffer_len(&self) -> usize {
        self.cell_count() * Cell::SIZE
    }

    /// CSS-style font shorthand, e.g. `24px monospace`.
    pub fn font(&self) -> String {
        format!("{}px {}", self.font_height, self.font_family)
    }

    pub fn validate(&self) -> Result<(), PaintError> {
        if self.cols == 0 || self.rows == 0 {
            return Err(PaintError::InvalidConfig(format!(
                "grid must have at least one cell, got {}x{}",
                self.cols, self.rows
            )));
        }
        if self.font_width == 0 || self.font_height == 0 {
            return Err(PaintError::InvalidConfig(format!(
                "font metrics must be non-zero, got {}x{}",
                self.font_width, self.font_height
            )));
        }
        if !self.baseline.is_finite() {
            return Err(PaintError::InvalidConfig(format!("baseline must be finite, got {}", self.baseline)));
        }
        self.cols
            .checked_mul(self.rows)
            .and_then(|n| n.checked_mul(Cell::SIZE))
            .ok_or_else(|| {
                PaintError::InvalidConfig(format!("{}x{} grid overflows the address space", self.cols, self.rows))
            })?;
        Ok(())
    }

    /// Header describing a snapshot of this grid. Fails if a dimension
    /// does not fit the header's 16-bit fields.
    pub fn header(&self) -> Result<GridHeader, PaintError> {
        let narrow = |name: &str, v: u64| {
            u16::try_from(v).map_err(|_| PaintError::InvalidConfig(format!("{name} {v} does not fit a snapshot header")))
        };
        Ok(GridHeader {
            cols: narrow("cols", self.cols as u64)?,
            rows: narrow("rows", self.rows as u64)?,
            font_width: narrow("font width", u64::from(self.font_width))?,
            font_height: narrow("font height", u64::from(self.font_height))?,
            layout: self.layout,
        })
    }
}

impl GridHeader {
    /// The config this snapshot was produced for; font family and baseline
    /// are not stored and take their defaults.
    pub fn config(&self) -> GridConfig {
        GridConfig {
            cols: self.cols as usize,
            rows: self.rows as usize,
            font_width: u32::from(self.font_width),
            font_height: u32::from(self.font_height),
            layout: self.layout,
            ..GridConfig::default()
        }
    }
}
