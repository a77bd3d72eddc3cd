use failure::Fail;
use log::{trace, warn};

use serde_derive::Serialize;

use crate::grid::BeatUnit;
use crate::time::{Beats, Seconds, TempoMap};

pub const DEFAULT_MAX_LINES: usize = 30;
pub const DEFAULT_LADDER: [Beats; 9] = [0.0625, 0.125, 0.25, 0.5, 1.0, 2.0, 4.0, 8.0, 16.0];
pub const DEFAULT_BEATS_PER_BAR: Beats = 4.0;

// Lines sitting exactly on the window edges survive conversion round-off.
const TIME_TOLERANCE: Seconds = 1e-9;
const BEAT_TOLERANCE: Beats = 1e-9;
const BAR_TOLERANCE: Beats = 1e-3;

// Past 2^53 consecutive line indices stop mapping to distinct beats.
const MAX_LINE_INDEX: f64 = 9_007_199_254_740_992.0;

#[derive(Debug, Fail, PartialEq)]
pub enum GridError {
  #[fail(display = "The grid needs room for at least one line")]
  ZeroBudget,

  #[fail(display = "The coarsening ladder is empty")]
  EmptyLadder,

  #[fail(display = "Invalid ladder step: {} beats", step)]
  InvalidStep { step: Beats },

  #[fail(display = "Invalid bar length: {} beats", beats)]
  InvalidBar { beats: Beats },
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct GridLine {
  pub time: Seconds,
  pub is_major: bool,
  pub beat_number: i64,
}

/// How many lines a window may hold and which coarser spacings to fall back
/// to when the requested unit would exceed that.
#[derive(Debug, Clone, PartialEq)]
pub struct GridDensity {
  max_lines: usize,
  ladder: Vec<Beats>,
  beats_per_bar: Beats,
}

impl Default for GridDensity {
  fn default() -> GridDensity {
    GridDensity {
      max_lines: DEFAULT_MAX_LINES,
      ladder: DEFAULT_LADDER.to_vec(),
      beats_per_bar: DEFAULT_BEATS_PER_BAR,
    }
  }
}

impl GridDensity {
  pub fn new(
    max_lines: usize,
    mut ladder: Vec<Beats>,
    beats_per_bar: Beats,
  ) -> Result<GridDensity, GridError> {
    if max_lines == 0 {
      return Err(GridError::ZeroBudget);
    }
    if ladder.is_empty() {
      return Err(GridError::EmptyLadder);
    }
    if let Some(step) = ladder.iter().find(|step| !step.is_finite() || **step <= 0.0) {
      return Err(GridError::InvalidStep { step: *step });
    }
    if !beats_per_bar.is_finite() || beats_per_bar <= 0.0 {
      return Err(GridError::InvalidBar {
        beats: beats_per_bar,
      });
    }

    ladder.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    ladder.dedup();

    Ok(GridDensity {
      max_lines,
      ladder,
      beats_per_bar,
    })
  }

  pub fn max_lines(&self) -> usize {
    self.max_lines
  }

  pub fn ladder(&self) -> &[Beats] {
    self.ladder.as_slice()
  }

  pub fn beats_per_bar(&self) -> Beats {
    self.beats_per_bar
  }

  /// Spacing to draw `beat_range` beats with: `fraction` itself if it fits
  /// the budget, otherwise the finest ladder step that does (or the
  /// coarsest step when none does).
  pub fn fit(&self, fraction: Beats, beat_range: Beats) -> Beats {
    let estimated = (beat_range / fraction).ceil();
    if estimated <= self.max_lines as f64 {
      return fraction;
    }

    let target = beat_range / self.max_lines as f64;
    let fitted = self
      .ladder
      .iter()
      .cloned()
      .find(|step| *step >= target)
      .or_else(|| self.ladder.last().cloned())
      .unwrap_or(fraction);

    trace!(
      "Coarsening grid from {} to {} beats ({} lines estimated)",
      fraction,
      fitted,
      estimated
    );
    fitted
  }

  fn is_bar_line(&self, beat: Beats) -> bool {
    let offset = beat.rem_euclid(self.beats_per_bar);
    offset < BAR_TOLERANCE || self.beats_per_bar - offset < BAR_TOLERANCE
  }
}

/// Beat lines to draw across `[visible_start, visible_start + visible_duration]`,
/// spaced in beats so they follow tempo changes.
pub fn generate_grid_lines(
  tempo_map: &TempoMap,
  visible_start: Seconds,
  visible_duration: Seconds,
  unit: BeatUnit,
  density: &GridDensity,
) -> Vec<GridLine> {
  if !visible_start.is_finite() || !visible_duration.is_finite() {
    warn!(
      "Ignoring grid request for window {}s + {}s",
      visible_start, visible_duration
    );
    return Vec::new();
  }
  if visible_duration <= 0.0 {
    return Vec::new();
  }

  let visible_end = visible_start + visible_duration;
  let start_beats = tempo_map.time_to_beats(visible_start);
  let end_beats = tempo_map.time_to_beats(visible_end);
  if !start_beats.is_finite() || !end_beats.is_finite() {
    warn!(
      "Window {}s + {}s is out of the beat range",
      visible_start, visible_duration
    );
    return Vec::new();
  }

  let fraction = density.fit(unit.fraction(), end_beats - start_beats);
  let major_only = fraction >= density.beats_per_bar;

  let first_index = (start_beats / fraction).ceil();
  if first_index > MAX_LINE_INDEX {
    warn!(
      "Window {}s + {}s is out of the beat range",
      visible_start, visible_duration
    );
    return Vec::new();
  }

  let mut lines = Vec::with_capacity(density.max_lines);
  let mut index = first_index as i64;

  while lines.len() < density.max_lines {
    let beat = index as f64 * fraction;
    if beat > end_beats + BEAT_TOLERANCE {
      break;
    }

    let time = tempo_map.beats_to_time(beat);
    if time >= visible_start - TIME_TOLERANCE && time <= visible_end + TIME_TOLERANCE {
      lines.push(GridLine {
        time,
        is_major: major_only || density.is_bar_line(beat),
        beat_number: beat.round() as i64,
      });
    }
    index += 1;
  }

  lines
}

/// Only the times of [`generate_grid_lines`].
pub fn generate_grid_times(
  tempo_map: &TempoMap,
  visible_start: Seconds,
  visible_duration: Seconds,
  unit: BeatUnit,
  density: &GridDensity,
) -> Vec<Seconds> {
  generate_grid_lines(tempo_map, visible_start, visible_duration, unit, density)
    .into_iter()
    .map(|line| line.time)
    .collect()
}
