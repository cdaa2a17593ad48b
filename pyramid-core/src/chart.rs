//! The assignment store: which person stands in which position.
//!
//! People are referenced by name; photo paths resolve through the
//! [`Roster`](crate::Roster) at render time. The store enforces the one
//! invariant the chart has: a person occupies at most one position.

use crate::layout::{Position, PyramidLayout};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors from assignment operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChartError {
    #[error("position {position} is out of range: this pyramid has {total} positions")]
    InvalidPosition { position: Position, total: usize },
}

/// A pyramid chart: a layout plus the positions people currently occupy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chart {
    layout: PyramidLayout,
    occupants: BTreeMap<Position, String>,
}

impl Chart {
    /// An empty chart over `layout`.
    pub fn new(layout: PyramidLayout) -> Self {
        Self {
            layout,
            occupants: BTreeMap::new(),
        }
    }

    pub fn layout(&self) -> &PyramidLayout {
        &self.layout
    }

    /// Put `name` at `position`, replacing any current occupant of that slot.
    ///
    /// If the person already stands elsewhere, that slot is vacated first so
    /// a person never occupies two positions. Returns the vacated position,
    /// if any.
    pub fn assign(
        &mut self,
        position: Position,
        name: impl Into<String>,
    ) -> Result<Option<Position>, ChartError> {
        self.check(position)?;
        let name = name.into();
        let vacated = self.position_of(&name).filter(|&prior| prior != position);
        if let Some(prior) = vacated {
            self.occupants.remove(&prior);
        }
        self.occupants.insert(position, name);
        Ok(vacated)
    }

    /// Empty a position. Returns the name that stood there, if any.
    pub fn unassign(&mut self, position: Position) -> Result<Option<String>, ChartError> {
        self.check(position)?;
        Ok(self.occupants.remove(&position))
    }

    /// Occupant of a position, `None` when empty or out of range.
    pub fn get(&self, position: Position) -> Option<&str> {
        self.occupants.get(&position).map(String::as_str)
    }

    /// The position a person currently occupies, if any.
    pub fn position_of(&self, name: &str) -> Option<Position> {
        self.occupants
            .iter()
            .find(|(_, occupant)| occupant.as_str() == name)
            .map(|(&position, _)| position)
    }

    /// Filled positions in position order.
    pub fn assignments(&self) -> impl Iterator<Item = (Position, &str)> {
        self.occupants
            .iter()
            .map(|(&position, name)| (position, name.as_str()))
    }

    pub fn assigned_count(&self) -> usize {
        self.occupants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.occupants.is_empty()
    }

    /// Remove every assignment, keeping the layout.
    pub fn clear(&mut self) {
        self.occupants.clear();
    }

    fn check(&self, position: Position) -> Result<(), ChartError> {
        if self.layout.contains(position) {
            Ok(())
        } else {
            Err(ChartError::InvalidPosition {
                position,
                total: self.layout.total_positions(),
            })
        }
    }
}
