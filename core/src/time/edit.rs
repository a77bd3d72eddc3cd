//! Breakpoint edits made from the tempo lane.
//!
//! Edits never touch the map they are given: each one rebuilds and returns a
//! new [`TempoMap`], so the caller decides when to swap it in. Indices refer
//! to [`TempoMap::changes`], which is in time order.

use log::debug;

use crate::time::{DuplicatePolicy, Seconds, TempoChange, TempoMap, TempoMapError};

/// Bounds and resolution applied to user-entered breakpoints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditLimits {
  pub min_bpm: f64,
  pub max_bpm: f64,
  pub time_resolution: Seconds,
  pub min_time: Seconds,
  pub proximity: Seconds,
}

impl Default for EditLimits {
  fn default() -> EditLimits {
    EditLimits {
      min_bpm: 30.0,
      max_bpm: 300.0,
      time_resolution: 0.1,
      min_time: 0.1,
      proximity: 0.1,
    }
  }
}

impl EditLimits {
  /// Typed tempos keep their fraction.
  pub fn clamp_bpm(&self, bpm: f64) -> f64 {
    bpm.max(self.min_bpm).min(self.max_bpm)
  }

  /// Tempos picked with the pointer land on whole BPM.
  pub fn round_bpm(&self, bpm: f64) -> f64 {
    self.clamp_bpm(bpm.round())
  }

  pub fn clamp_time(&self, time: Seconds) -> Seconds {
    let time = if self.time_resolution > 0.0 {
      let steps_per_second = self.time_resolution.recip();
      (time * steps_per_second).round() / steps_per_second
    } else {
      time
    };
    time.max(self.min_time)
  }
}

/// Nearest multiple of `step`, e.g. 5 BPM steps for tapped tempos.
pub fn quantize_bpm(bpm: f64, step: f64) -> f64 {
  if step > 0.0 {
    (bpm / step).round() * step
  } else {
    bpm
  }
}

pub fn add_change(
  map: &TempoMap,
  time: Seconds,
  bpm: f64,
  limits: &EditLimits,
) -> Result<TempoMap, TempoMapError> {
  let time = limits.clamp_time(time);
  let bpm = limits.round_bpm(bpm);

  if map
    .changes()
    .iter()
    .any(|change| (change.time - time).abs() < limits.proximity)
  {
    return Err(TempoMapError::TooCloseToExisting { time });
  }

  debug!("Adding tempo change at {}s: {} BPM", time, bpm);
  TempoMap::builder(map.initial_bpm())
    .changes(map.changes().iter().cloned())
    .change(time, bpm)
    .build()
}

pub fn set_change_bpm(
  map: &TempoMap,
  index: usize,
  bpm: f64,
  limits: &EditLimits,
) -> Result<TempoMap, TempoMapError> {
  check_index(map, index)?;
  let bpm = limits.clamp_bpm(bpm);
  let changes = map.changes().iter().enumerate().map(|(i, change)| {
    if i == index {
      TempoChange::new(change.time, bpm)
    } else {
      *change
    }
  });
  TempoMap::new(map.initial_bpm(), changes)
}

/// Drags may pass over other breakpoints; the dragged one wins a collision.
pub fn move_change(
  map: &TempoMap,
  index: usize,
  time: Seconds,
  bpm: f64,
  limits: &EditLimits,
) -> Result<TempoMap, TempoMapError> {
  check_index(map, index)?;
  let moved = TempoChange::new(limits.clamp_time(time), limits.round_bpm(bpm));
  let others = map
    .changes()
    .iter()
    .enumerate()
    .filter(|(i, _)| *i != index)
    .map(|(_, change)| *change);
  TempoMap::builder(map.initial_bpm())
    .changes(others)
    .changes(Some(moved))
    .duplicates(DuplicatePolicy::LastWins)
    .build()
}

pub fn remove_change(map: &TempoMap, index: usize) -> Result<TempoMap, TempoMapError> {
  check_index(map, index)?;
  debug!("Removing tempo change {} at {}s", index, map.changes()[index].time);
  let changes = map
    .changes()
    .iter()
    .enumerate()
    .filter(|(i, _)| *i != index)
    .map(|(_, change)| *change);
  TempoMap::new(map.initial_bpm(), changes)
}

pub fn set_initial_bpm(
  map: &TempoMap,
  bpm: f64,
  limits: &EditLimits,
) -> Result<TempoMap, TempoMapError> {
  TempoMap::new(limits.clamp_bpm(bpm), map.changes().iter().cloned())
}

fn check_index(map: &TempoMap, index: usize) -> Result<(), TempoMapError> {
  if index < map.len() {
    Ok(())
  } else {
    Err(TempoMapError::IndexOutOfRange {
      index,
      len: map.len(),
    })
  }
}
