//! Pyramid chart engine.
//!
//! This crate provides everything needed to build organizational pyramid
//! charts without a GUI:
//! - Pyramid geometry (rows, positions, layout math)
//! - A roster of known people and their photo paths
//! - The chart itself: a position-to-person assignment store with a
//!   one-position-per-person invariant
//! - Versioned JSON persistence of chart + roster
//! - One-shot PDF export with per-slot missing-image degradation
//!
//! # Quick Start
//!
//! ```
//! use pyramid_core::{Chart, Position, PyramidLayout, Roster};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let layout = PyramidLayout::new(3)?; // 6 positions
//! let mut chart = Chart::new(layout);
//!
//! let mut roster = Roster::new();
//! roster.add("Alice", Some("photos/alice.png".into()));
//!
//! chart.assign(Position(0), "Alice")?;
//! assert_eq!(chart.get(Position(0)), Some("Alice"));
//! # Ok(())
//! # }
//! ```

pub mod chart;
pub mod export;
pub mod layout;
pub mod persist;
pub mod roster;

// Primary public API
pub use chart::{Chart, ChartError};
pub use export::{render_text, ExportError, ExportReport, ExportWarning, PdfExporter};
pub use layout::{LayoutError, Position, PyramidLayout, MAX_ROWS};
pub use persist::{list_saves, ChartMetadata, PersistError, SaveInfo, SavedChart};
pub use roster::{Person, Roster, RosterError};
