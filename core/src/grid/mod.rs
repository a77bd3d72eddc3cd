pub mod advisor;
pub mod lines;
pub mod snap;
pub mod unit;

pub use self::advisor::{recommended_unit, recommended_unit_by_bpm, UnitAdvisor};
pub use self::lines::{generate_grid_lines, generate_grid_times, GridDensity, GridError, GridLine};
pub use self::snap::{snap_to_grid, SnapOptions};
pub use self::unit::{BeatUnit, UnitParseError};
