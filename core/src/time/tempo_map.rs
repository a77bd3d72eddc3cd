use failure::Fail;
use log::{debug, warn};

use serde_derive::Deserialize;

use crate::time::{Beats, Seconds, Tempo, TempoChange};

#[derive(Debug, Fail, PartialEq)]
pub enum TempoMapError {
  #[fail(display = "Invalid initial tempo: {} BPM", bpm)]
  InvalidInitialTempo { bpm: f64 },

  #[fail(display = "Invalid tempo for change {}: {} BPM", index, bpm)]
  InvalidTempo { index: usize, bpm: f64 },

  #[fail(display = "Invalid time for change {}: {}s", index, time)]
  InvalidTime { index: usize, time: Seconds },

  #[fail(display = "More than one tempo change at {}s", time)]
  DuplicateTime { time: Seconds },

  #[fail(display = "A tempo change already exists near {}s", time)]
  TooCloseToExisting { time: Seconds },

  #[fail(display = "Tempo change index {} out of range ({} changes)", index, len)]
  IndexOutOfRange { index: usize, len: usize },
}

/// What to do with breakpoints that share the same time.
///
/// The medley editor itself resolves duplicates as `LastWins`; tracks it saved
/// need `editing.duplicates = "last_wins"` to load unchanged.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicatePolicy {
  #[serde(rename = "reject")]
  Reject,
  /// Of the changes sharing a time, the one supplied last is kept.
  #[serde(rename = "last_wins")]
  LastWins,
}

impl Default for DuplicatePolicy {
  fn default() -> DuplicatePolicy {
    DuplicatePolicy::Reject
  }
}

/// A span of constant tempo.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TempoSegment {
  pub start: Seconds,
  pub end: Seconds,
  pub bpm: f64,
}

/// Piecewise-constant tempo over time.
///
/// Only built through [`TempoMapBuilder`], which validates every value and
/// stores the breakpoints ordered by time, so the conversions never re-sort.
#[derive(Debug, Clone, PartialEq)]
pub struct TempoMap {
  initial_bpm: f64,
  changes: Vec<TempoChange>,
}

impl TempoMap {
  pub fn builder(initial_bpm: f64) -> TempoMapBuilder {
    TempoMapBuilder::new(initial_bpm)
  }

  /// Shorthand for a builder with the default duplicate policy.
  pub fn new<I>(initial_bpm: f64, changes: I) -> Result<TempoMap, TempoMapError>
  where
    I: IntoIterator<Item = TempoChange>,
  {
    TempoMapBuilder::new(initial_bpm).changes(changes).build()
  }

  /// Constant tempo, no breakpoints.
  pub fn constant(initial_bpm: f64) -> Result<TempoMap, TempoMapError> {
    TempoMapBuilder::new(initial_bpm).build()
  }

  pub fn initial_bpm(&self) -> f64 {
    self.initial_bpm
  }

  /// Breakpoints in time order.
  pub fn changes(&self) -> &[TempoChange] {
    self.changes.as_slice()
  }

  pub fn len(&self) -> usize {
    self.changes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.changes.is_empty()
  }

  /// Tempo in effect at `time`: the latest change at or before it, or the
  /// initial tempo. Negative times behave as zero.
  pub fn bpm_at(&self, time: Seconds) -> f64 {
    let time = time.max(0.0);
    let upto = self.changes.partition_point(|change| change.time <= time);
    match upto {
      0 => self.initial_bpm,
      n => self.changes[n - 1].bpm,
    }
  }

  pub fn tempo_at(&self, time: Seconds) -> Tempo {
    Tempo::new(self.bpm_at(time))
  }

  /// Beats elapsed from zero up to `time`.
  pub fn time_to_beats(&self, time: Seconds) -> Beats {
    if time.is_nan() || time <= 0.0 {
      return 0.0;
    }

    let mut beats = 0.0;
    let mut last_time = 0.0;
    let mut tempo = Tempo::new(self.initial_bpm);

    for change in self.changes.iter().take_while(|change| change.time < time) {
      beats += tempo.beats_in(change.time - last_time);
      last_time = change.time;
      tempo = Tempo::new(change.bpm);
    }

    beats + tempo.beats_in(time - last_time)
  }

  /// Seconds from zero at which `beats` beats have elapsed.
  pub fn beats_to_time(&self, beats: Beats) -> Seconds {
    if beats.is_nan() || beats <= 0.0 {
      return 0.0;
    }

    let mut elapsed_beats = 0.0;
    let mut last_time = 0.0;
    let mut tempo = Tempo::new(self.initial_bpm);

    for change in self.changes.iter() {
      let segment_beats = tempo.beats_in(change.time - last_time);
      if elapsed_beats + segment_beats >= beats {
        return last_time + tempo.duration_of(beats - elapsed_beats);
      }
      elapsed_beats += segment_beats;
      last_time = change.time;
      tempo = Tempo::new(change.bpm);
    }

    last_time + tempo.duration_of(beats - elapsed_beats)
  }

  /// Constant-tempo spans clipped to `[start, end)`.
  pub fn segments(&self, start: Seconds, end: Seconds) -> Vec<TempoSegment> {
    let start = start.max(0.0);
    if end.is_nan() || end <= start {
      return Vec::new();
    }

    let mut segments = Vec::new();
    let mut segment_start = start;
    let mut bpm = self.bpm_at(start);

    for change in self.changes.iter() {
      if change.time <= start {
        continue;
      }
      if change.time >= end {
        break;
      }
      segments.push(TempoSegment {
        start: segment_start,
        end: change.time,
        bpm,
      });
      segment_start = change.time;
      bpm = change.bpm;
    }

    segments.push(TempoSegment {
      start: segment_start,
      end,
      bpm,
    });
    segments
  }

  /// Slowest and fastest tempo anywhere in the map.
  pub fn bpm_range(&self) -> (f64, f64) {
    self
      .changes
      .iter()
      .fold((self.initial_bpm, self.initial_bpm), |(min, max), change| {
        (min.min(change.bpm), max.max(change.bpm))
      })
  }
}

pub struct TempoMapBuilder {
  initial_bpm: f64,
  changes: Vec<TempoChange>,
  duplicates: DuplicatePolicy,
}

impl TempoMapBuilder {
  pub fn new(initial_bpm: f64) -> TempoMapBuilder {
    TempoMapBuilder {
      initial_bpm,
      changes: Vec::new(),
      duplicates: DuplicatePolicy::default(),
    }
  }

  pub fn change(mut self, time: Seconds, bpm: f64) -> Self {
    self.changes.push(TempoChange::new(time, bpm));
    self
  }

  pub fn changes<I>(mut self, changes: I) -> Self
  where
    I: IntoIterator<Item = TempoChange>,
  {
    self.changes.extend(changes);
    self
  }

  pub fn duplicates(mut self, policy: DuplicatePolicy) -> Self {
    self.duplicates = policy;
    self
  }

  pub fn build(self) -> Result<TempoMap, TempoMapError> {
    let TempoMapBuilder {
      initial_bpm,
      mut changes,
      duplicates,
    } = self;

    if !Tempo::new(initial_bpm).is_valid() {
      warn!("Rejecting tempo map with initial tempo {}", initial_bpm);
      return Err(TempoMapError::InvalidInitialTempo { bpm: initial_bpm });
    }

    for (index, change) in changes.iter().enumerate() {
      if !change.time.is_finite() || change.time < 0.0 {
        warn!("Rejecting tempo change {} at {}s", index, change.time);
        return Err(TempoMapError::InvalidTime {
          index,
          time: change.time,
        });
      }
      if !Tempo::new(change.bpm).is_valid() {
        warn!("Rejecting tempo change {} with {} BPM", index, change.bpm);
        return Err(TempoMapError::InvalidTempo {
          index,
          bpm: change.bpm,
        });
      }
    }

    // stable: equal times keep their input order
    changes.sort_by(|a, b| a.time.partial_cmp(&b.time).unwrap_or(std::cmp::Ordering::Equal));

    match duplicates {
      DuplicatePolicy::Reject => {
        if let Some(pair) = changes.windows(2).find(|pair| pair[0].time == pair[1].time) {
          warn!("Rejecting tempo map with duplicate change at {}s", pair[0].time);
          return Err(TempoMapError::DuplicateTime { time: pair[0].time });
        }
      }
      DuplicatePolicy::LastWins => {
        let before = changes.len();
        changes.reverse();
        changes.dedup_by(|a, b| a.time == b.time);
        changes.reverse();
        if changes.len() != before {
          debug!("Dropped {} shadowed tempo changes", before - changes.len());
        }
      }
    }

    debug!(
      "Built tempo map at {} BPM with {} changes",
      initial_bpm,
      changes.len()
    );

    Ok(TempoMap {
      initial_bpm,
      changes,
    })
  }
}

#[cfg(test)]
mod test {

  use super::{DuplicatePolicy, TempoMap, TempoMapError, TempoSegment};
  use crate::time::TempoChange;

  const EPSILON: f64 = 1e-9;

  fn assert_close(actual: f64, expected: f64) {
    assert!(
      (actual - expected).abs() < EPSILON,
      "expected {}, got {}",
      expected,
      actual
    );
  }

  fn two_changes() -> TempoMap {
    TempoMap::builder(120.0)
      .change(30.0, 60.0)
      .change(10.0, 240.0)
      .build()
      .unwrap()
  }

  #[test]
  pub fn build_sorts_changes() {
    let map = two_changes();
    assert_eq!(
      map.changes(),
      &[TempoChange::new(10.0, 240.0), TempoChange::new(30.0, 60.0)]
    );
    assert_eq!(map.len(), 2);
  }

  #[test]
  pub fn build_rejects_invalid_initial_tempo() {
    assert_eq!(
      TempoMap::constant(0.0),
      Err(TempoMapError::InvalidInitialTempo { bpm: 0.0 })
    );
    assert!(TempoMap::constant(std::f64::INFINITY).is_err());
  }

  #[test]
  pub fn build_rejects_invalid_changes() {
    let result = TempoMap::builder(120.0).change(5.0, -10.0).build();
    assert_eq!(
      result,
      Err(TempoMapError::InvalidTempo {
        index: 0,
        bpm: -10.0
      })
    );

    let result = TempoMap::builder(120.0)
      .change(5.0, 100.0)
      .change(-1.0, 100.0)
      .build();
    assert_eq!(
      result,
      Err(TempoMapError::InvalidTime {
        index: 1,
        time: -1.0
      })
    );

    let result = TempoMap::builder(120.0).change(std::f64::NAN, 100.0).build();
    assert!(result.is_err());
  }

  #[test]
  pub fn build_rejects_duplicates_by_default() {
    let result = TempoMap::builder(120.0)
      .change(8.0, 100.0)
      .change(8.0, 140.0)
      .build();
    assert_eq!(result, Err(TempoMapError::DuplicateTime { time: 8.0 }));
  }

  #[test]
  pub fn build_keeps_last_duplicate() {
    let map = TempoMap::builder(120.0)
      .change(8.0, 100.0)
      .change(2.0, 90.0)
      .change(8.0, 140.0)
      .duplicates(DuplicatePolicy::LastWins)
      .build()
      .unwrap();
    assert_eq!(
      map.changes(),
      &[TempoChange::new(2.0, 90.0), TempoChange::new(8.0, 140.0)]
    );
  }

  #[test]
  pub fn bpm_at() {
    let map = two_changes();
    assert_eq!(map.bpm_at(0.0), 120.0);
    assert_eq!(map.bpm_at(-4.0), 120.0);
    assert_eq!(map.bpm_at(9.99), 120.0);
    assert_eq!(map.bpm_at(10.0), 240.0);
    assert_eq!(map.bpm_at(29.0), 240.0);
    assert_eq!(map.bpm_at(30.0), 60.0);
    assert_eq!(map.bpm_at(1000.0), 60.0);
  }

  #[test]
  pub fn bpm_at_without_changes() {
    let map = TempoMap::constant(97.0).unwrap();
    assert_eq!(map.bpm_at(123.0), 97.0);
    assert_eq!(map.tempo_at(123.0).get_value(), 97.0);
  }

  #[test]
  pub fn time_to_beats_constant() {
    let map = TempoMap::constant(120.0).unwrap();
    assert_close(map.time_to_beats(30.0), 60.0);
    assert_eq!(map.time_to_beats(0.0), 0.0);
    assert_eq!(map.time_to_beats(-3.0), 0.0);
  }

  #[test]
  pub fn time_to_beats_across_changes() {
    let map = two_changes();
    // 10s at 120 + 20s at 240 + 4s at 60
    assert_close(map.time_to_beats(10.0), 20.0);
    assert_close(map.time_to_beats(30.0), 100.0);
    assert_close(map.time_to_beats(34.0), 104.0);
  }

  #[test]
  pub fn beats_to_time_across_changes() {
    let map = two_changes();
    assert_close(map.beats_to_time(20.0), 10.0);
    assert_close(map.beats_to_time(60.0), 20.0);
    assert_close(map.beats_to_time(104.0), 34.0);
    assert_eq!(map.beats_to_time(0.0), 0.0);
    assert_eq!(map.beats_to_time(-8.0), 0.0);
  }

  #[test]
  pub fn beats_to_time_with_change_at_zero() {
    let map = TempoMap::builder(120.0).change(0.0, 60.0).build().unwrap();
    assert_eq!(map.bpm_at(0.0), 60.0);
    assert_close(map.time_to_beats(4.0), 4.0);
    assert_close(map.beats_to_time(4.0), 4.0);
  }

  #[test]
  pub fn segments() {
    let map = two_changes();
    assert_eq!(
      map.segments(5.0, 40.0),
      vec![
        TempoSegment {
          start: 5.0,
          end: 10.0,
          bpm: 120.0
        },
        TempoSegment {
          start: 10.0,
          end: 30.0,
          bpm: 240.0
        },
        TempoSegment {
          start: 30.0,
          end: 40.0,
          bpm: 60.0
        },
      ]
    );
    assert_eq!(
      map.segments(12.0, 20.0),
      vec![TempoSegment {
        start: 12.0,
        end: 20.0,
        bpm: 240.0
      }]
    );
    assert!(map.segments(20.0, 20.0).is_empty());
  }

  #[test]
  pub fn bpm_range() {
    assert_eq!(two_changes().bpm_range(), (60.0, 240.0));
    assert_eq!(TempoMap::constant(90.0).unwrap().bpm_range(), (90.0, 90.0));
  }
}
