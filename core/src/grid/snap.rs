use log::trace;

use crate::grid::BeatUnit;
use crate::time::{Seconds, TempoMap};

pub const DEFAULT_SNAP_THRESHOLD: Seconds = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapOptions {
  pub unit: BeatUnit,
  /// Farthest a time may be pulled, in seconds.
  pub threshold: Seconds,
  pub enabled: bool,
}

impl Default for SnapOptions {
  fn default() -> SnapOptions {
    SnapOptions {
      unit: BeatUnit::One,
      threshold: DEFAULT_SNAP_THRESHOLD,
      enabled: true,
    }
  }
}

/// Pulls `time` onto the nearest grid instant when it lies within the
/// threshold; otherwise, or with snapping disabled, returns it unchanged.
pub fn snap_to_grid(tempo_map: &TempoMap, time: Seconds, options: &SnapOptions) -> Seconds {
  if !options.enabled {
    return time;
  }

  let fraction = options.unit.fraction();
  let beats = tempo_map.time_to_beats(time);
  let grid_beats = (beats / fraction).round() * fraction;
  let snapped = tempo_map.beats_to_time(grid_beats);

  if (snapped - time).abs() <= options.threshold {
    trace!("Snapped {}s to {}s (beat {})", time, snapped, grid_beats);
    snapped
  } else {
    time
  }
}
