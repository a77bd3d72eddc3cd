use crate::time::{Beats, Seconds};

const SECONDS_PER_MINUTE: f64 = 60.0;

/// Tempo in beats per minute.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Tempo(f64);

impl Tempo {
  pub fn new(bpm: f64) -> Tempo {
    Tempo(bpm)
  }

  pub fn get_value(&self) -> f64 {
    self.0
  }

  /// A usable tempo is finite and strictly positive.
  pub fn is_valid(&self) -> bool {
    self.0.is_finite() && self.0 > 0.0
  }

  pub fn beats_per_second(&self) -> f64 {
    self.0 / SECONDS_PER_MINUTE
  }

  pub fn seconds_per_beat(&self) -> Seconds {
    SECONDS_PER_MINUTE / self.0
  }

  pub fn beats_in(&self, duration: Seconds) -> Beats {
    duration * self.beats_per_second()
  }

  pub fn duration_of(&self, beats: Beats) -> Seconds {
    beats * self.seconds_per_beat()
  }
}

impl From<Tempo> for f64 {
  fn from(item: Tempo) -> Self {
    item.0
  }
}

impl From<f64> for Tempo {
  fn from(bpm: f64) -> Self {
    Tempo(bpm)
  }
}

#[cfg(test)]
mod test {

  use super::Tempo;

  #[test]
  pub fn tempo_new() {
    let tempo = Tempo::new(120.0);
    assert_eq!(tempo.get_value(), 120.0);
  }

  #[test]
  pub fn beat_length() {
    let tempo = Tempo::new(120.0);
    assert_eq!(tempo.beats_per_second(), 2.0);
    assert_eq!(tempo.seconds_per_beat(), 0.5);
    assert_eq!(tempo.beats_in(30.0), 60.0);
    assert_eq!(tempo.duration_of(60.0), 30.0);
  }

  #[test]
  pub fn validity() {
    assert!(Tempo::new(90.0).is_valid());
    assert!(!Tempo::new(0.0).is_valid());
    assert!(!Tempo::new(-60.0).is_valid());
    assert!(!Tempo::new(std::f64::NAN).is_valid());
    assert!(!Tempo::new(std::f64::INFINITY).is_valid());
  }

  #[test]
  pub fn f64_from() {
    assert_eq!(f64::from(Tempo::new(98.5)), 98.5);
  }
}
