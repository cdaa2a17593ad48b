//! Pyramid geometry.
//!
//! A pyramid is a stack of rows, row `r` (0-indexed from the top) holding
//! `r + 1` slots. Positions are numbered left to right, top row first,
//! starting at 0. A layout built from a head count instead of a row count
//! may end in a partial row.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Upper bound on pyramid rows. 20 rows is 210 positions, well past any
/// chart that still fits on a page.
pub const MAX_ROWS: usize = 20;

/// Largest head count accepted by [`PyramidLayout::with_capacity`].
pub const MAX_POSITIONS: usize = MAX_ROWS * (MAX_ROWS + 1) / 2;

/// Errors from constructing a layout.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("pyramid must have between 1 and {MAX_ROWS} rows, got {0}")]
    InvalidRowCount(usize),

    #[error("pyramid must hold between 1 and {MAX_POSITIONS} people, got {0}")]
    InvalidCapacity(usize),

    #[error("malformed row widths: {0:?}")]
    MalformedRows(Vec<usize>),
}

/// One addressable slot in the pyramid, numbered left to right from the top.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Position(pub usize);

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for Position {
    fn from(index: usize) -> Self {
        Position(index)
    }
}

/// Row structure of a pyramid, top to bottom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PyramidLayout {
    widths: Vec<usize>,
}

impl PyramidLayout {
    /// A complete pyramid of `rows` rows, `rows * (rows + 1) / 2` positions.
    pub fn new(rows: usize) -> Result<Self, LayoutError> {
        if rows == 0 || rows > MAX_ROWS {
            return Err(LayoutError::InvalidRowCount(rows));
        }
        Ok(Self {
            widths: (1..=rows).collect(),
        })
    }

    /// A pyramid sized to hold exactly `people` positions.
    ///
    /// Rows grow 1, 2, 3, … and the final row holds whatever remains, so it
    /// may be partial.
    pub fn with_capacity(people: usize) -> Result<Self, LayoutError> {
        if people == 0 || people > MAX_POSITIONS {
            return Err(LayoutError::InvalidCapacity(people));
        }
        let mut widths = Vec::new();
        let mut remaining = people;
        let mut row = 1;
        while remaining > 0 {
            let width = row.min(remaining);
            widths.push(width);
            remaining -= width;
            row += 1;
        }
        Ok(Self { widths })
    }

    /// Rebuild a layout from persisted row widths.
    ///
    /// Accepts exactly the shapes the constructors produce: widths `1, 2, 3,
    /// …` with at most the final row shorter than its row number.
    pub fn from_row_widths(widths: Vec<usize>) -> Result<Self, LayoutError> {
        if widths.is_empty() || widths.len() > MAX_ROWS {
            return Err(LayoutError::MalformedRows(widths));
        }
        for (row, &width) in widths.iter().enumerate() {
            let full = row + 1;
            let is_last = row == widths.len() - 1;
            let valid = if is_last {
                width >= 1 && width <= full
            } else {
                width == full
            };
            if !valid {
                return Err(LayoutError::MalformedRows(widths));
            }
        }
        Ok(Self { widths })
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.widths.len()
    }

    /// Slot count per row, top to bottom.
    pub fn row_widths(&self) -> &[usize] {
        &self.widths
    }

    /// Total number of positions.
    pub fn total_positions(&self) -> usize {
        self.widths.iter().sum()
    }

    /// Whether `position` addresses a slot in this layout.
    pub fn contains(&self, position: Position) -> bool {
        position.0 < self.total_positions()
    }

    /// Row and column of a position, or `None` if out of range.
    pub fn locate(&self, position: Position) -> Option<(usize, usize)> {
        let mut index = position.0;
        for (row, &width) in self.widths.iter().enumerate() {
            if index < width {
                return Some((row, index));
            }
            index -= width;
        }
        None
    }

    /// Position at a row and column, or `None` if out of range.
    pub fn position_at(&self, row: usize, column: usize) -> Option<Position> {
        if row >= self.widths.len() || column >= self.widths[row] {
            return None;
        }
        let offset: usize = self.widths[..row].iter().sum();
        Some(Position(offset + column))
    }
}

impl fmt::Display for PyramidLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} rows, {} positions",
            self.rows(),
            self.total_positions()
        )
    }
}
