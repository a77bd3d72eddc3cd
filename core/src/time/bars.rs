use std::fmt;

use crate::time::Beats;

const SIXTEENTHS_PER_BEAT: u32 = 4;

/// Musical position of a beat count, 0-based, printed 1-based.
#[derive(PartialEq, Clone, Copy)]
pub struct BarsTime {
  bars: u32,
  beats: u32,
  sixteenths: u32,
}

impl BarsTime {
  pub fn new(bars: u32, beats: u32, sixteenths: u32) -> BarsTime {
    BarsTime {
      bars,
      beats,
      sixteenths,
    }
  }

  /// Negative beat counts land on the first bar.
  pub fn from_beats(beats: Beats, beats_per_bar: u32) -> BarsTime {
    let beats_per_bar = beats_per_bar.max(1) as u64;
    let total_sixteenths = (beats.max(0.0) * SIXTEENTHS_PER_BEAT as f64 + 1e-6).floor() as u64;
    let total_beats = total_sixteenths / SIXTEENTHS_PER_BEAT as u64;
    BarsTime {
      bars: (total_beats / beats_per_bar) as u32,
      beats: (total_beats % beats_per_bar) as u32,
      sixteenths: (total_sixteenths % SIXTEENTHS_PER_BEAT as u64) as u32,
    }
  }

  pub fn get_bars(&self) -> u32 {
    self.bars
  }

  pub fn get_beats(&self) -> u32 {
    self.beats
  }

  pub fn get_sixteenths(&self) -> u32 {
    self.sixteenths
  }

  pub fn to_beats(&self, beats_per_bar: u32) -> Beats {
    (self.bars as u64 * beats_per_bar.max(1) as u64 + self.beats as u64) as f64
      + self.sixteenths as f64 / SIXTEENTHS_PER_BEAT as f64
  }
}

impl fmt::Debug for BarsTime {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(
      f,
      "{:05}:{:02}:{:02}",
      self.bars + 1,
      self.beats + 1,
      self.sixteenths + 1
    )
  }
}

impl fmt::Display for BarsTime {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{}.{}.{}", self.bars + 1, self.beats + 1, self.sixteenths + 1)
  }
}

#[cfg(test)]
mod test {

  use super::BarsTime;

  #[test]
  pub fn new() {
    let time = BarsTime::new(10, 1, 2);
    assert_eq!(time.get_bars(), 10);
    assert_eq!(time.get_beats(), 1);
    assert_eq!(time.get_sixteenths(), 2);
  }

  #[test]
  pub fn from_beats() {
    // 10 bars of 3, 2 beats, 1 sixteenth
    let time = BarsTime::from_beats(30.0 + 2.0 + 0.25, 3);
    assert_eq!(time.get_bars(), 10);
    assert_eq!(time.get_beats(), 2);
    assert_eq!(time.get_sixteenths(), 1);
  }

  #[test]
  pub fn from_negative_beats() {
    assert!(BarsTime::from_beats(-3.5, 4) == BarsTime::new(0, 0, 0));
  }

  #[test]
  pub fn to_beats() {
    let time = BarsTime::from_beats(77.75, 4);
    assert_eq!(time.to_beats(4), 77.75);
  }

  #[test]
  pub fn format() {
    let time = BarsTime::from_beats(17.5, 4);
    assert_eq!(format!("{:?}", time), "00005:02:03");
    assert_eq!(format!("{}", time), "5.2.3");
  }
}
