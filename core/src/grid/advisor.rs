use crate::grid::BeatUnit;
use crate::time::{Seconds, Tempo};

pub const DEFAULT_RECOMMENDED_LINES: f64 = 10.0;

/// Suggests a grid unit for the unit picker. Advisory only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitAdvisor {
  target_lines: f64,
}

impl Default for UnitAdvisor {
  fn default() -> UnitAdvisor {
    UnitAdvisor {
      target_lines: DEFAULT_RECOMMENDED_LINES,
    }
  }
}

impl UnitAdvisor {
  pub fn new(target_lines: f64) -> UnitAdvisor {
    UnitAdvisor { target_lines }
  }

  pub fn target_lines(&self) -> f64 {
    self.target_lines
  }

  /// With a visible duration, picks the unit closest to spreading about
  /// `target_lines` lines over it; without one, falls back to tempo alone.
  pub fn recommend(&self, bpm: f64, visible_duration: Option<Seconds>) -> BeatUnit {
    match visible_duration {
      Some(duration) if duration.is_finite() && duration > 0.0 && self.target_lines > 0.0 => {
        let target_interval = duration / self.target_lines;
        let target_beats = target_interval / Tempo::new(bpm).seconds_per_beat();

        let mut best = BeatUnit::Four;
        let mut best_diff = std::f64::INFINITY;
        for unit in BeatUnit::ALL.iter().cloned() {
          let diff = (unit.fraction() - target_beats).abs();
          if diff < best_diff {
            best_diff = diff;
            best = unit;
          }
        }
        best
      }
      _ => recommended_unit_by_bpm(bpm),
    }
  }
}

pub fn recommended_unit(bpm: f64, visible_duration: Option<Seconds>) -> BeatUnit {
  UnitAdvisor::default().recommend(bpm, visible_duration)
}

/// Slow songs get bar lines, fast ones get every beat.
pub fn recommended_unit_by_bpm(bpm: f64) -> BeatUnit {
  if bpm < 80.0 {
    BeatUnit::Four
  } else if bpm < 120.0 {
    BeatUnit::Two
  } else {
    BeatUnit::One
  }
}
