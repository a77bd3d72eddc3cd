//! Tempo map and beat-grid engine for the medley timeline editor.
//!
//! Converts between wall-clock seconds and beat positions under a
//! piecewise-constant tempo, derives a density-bounded grid of beat lines
//! for a visible window, and snaps dragged times onto that grid.

pub mod config;
pub mod grid;
pub mod time;

pub use crate::grid::{BeatUnit, GridDensity, GridLine, SnapOptions};
pub use crate::time::{TempoChange, TempoMap, TempoTrack};
