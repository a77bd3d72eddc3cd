use log::trace;

use crate::time::Seconds;

const DEFAULT_MAX_TAPS: usize = 8;
const DEFAULT_RESET_AFTER: Seconds = 3.0;
const DEFAULT_MIN_BPM: f64 = 30.0;
const DEFAULT_MAX_BPM: f64 = 300.0;

/// Tempo from the mean interval between the latest taps.
///
/// Timestamps come from the caller, in seconds on any monotonic clock.
#[derive(Debug, Clone)]
pub struct TapTempo {
  max_taps: usize,
  reset_after: Seconds,
  min_bpm: f64,
  max_bpm: f64,

  taps: Vec<Seconds>,
  bpm: Option<f64>,
}

impl Default for TapTempo {
  fn default() -> TapTempo {
    TapTempo::new(
      DEFAULT_MAX_TAPS,
      DEFAULT_RESET_AFTER,
      DEFAULT_MIN_BPM,
      DEFAULT_MAX_BPM,
    )
  }
}

impl TapTempo {
  pub fn new(max_taps: usize, reset_after: Seconds, min_bpm: f64, max_bpm: f64) -> TapTempo {
    TapTempo {
      max_taps: max_taps.max(2),
      reset_after,
      min_bpm,
      max_bpm,
      taps: Vec::with_capacity(max_taps.max(2) + 1),
      bpm: None,
    }
  }

  pub fn tap(&mut self, now: Seconds) -> Option<f64> {
    if let Some(&last) = self.taps.last() {
      if now < last || now - last > self.reset_after {
        self.reset();
      }
    }

    self.taps.push(now);
    if self.taps.len() > self.max_taps {
      let excess = self.taps.len() - self.max_taps;
      self.taps.drain(..excess);
    }

    if let (Some(first), Some(last)) = (self.taps.first(), self.taps.last()) {
      if self.taps.len() >= 2 {
        let mean_interval = (last - first) / (self.taps.len() - 1) as f64;
        let bpm = (60.0 / mean_interval).round();
        trace!("Tap {}: {} BPM", self.taps.len(), bpm);
        if bpm >= self.min_bpm && bpm <= self.max_bpm {
          self.bpm = Some(bpm);
        }
      }
    }

    self.bpm
  }

  pub fn bpm(&self) -> Option<f64> {
    self.bpm
  }

  pub fn tap_count(&self) -> usize {
    self.taps.len()
  }

  pub fn reset(&mut self) {
    self.taps.clear();
    self.bpm = None;
  }
}
