pub mod bars;
pub mod edit;
pub mod tap;
pub mod tempo;
pub mod tempo_change;
pub mod tempo_map;

pub use self::bars::BarsTime;
pub use self::edit::EditLimits;
pub use self::tap::TapTempo;
pub use self::tempo::Tempo;
pub use self::tempo_change::{TempoChange, TempoTrack};
pub use self::tempo_map::{DuplicatePolicy, TempoMap, TempoMapBuilder, TempoMapError, TempoSegment};

pub type Seconds = f64;
pub type Beats = f64;
