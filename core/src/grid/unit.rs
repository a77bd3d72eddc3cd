use std::fmt;
use std::str::FromStr;

use failure::Fail;

use serde_derive::{Deserialize, Serialize};

use crate::time::Beats;

#[derive(Debug, Fail, PartialEq)]
#[fail(display = "Unknown beat unit: {}", unit)]
pub struct UnitParseError {
  unit: String,
}

/// Grid spacing in beats, from two bars down to a sixteenth of a beat.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BeatUnit {
  #[serde(rename = "8")]
  Eight,
  #[serde(rename = "4")]
  Four,
  #[serde(rename = "2")]
  Two,
  #[serde(rename = "1")]
  One,
  #[serde(rename = "1/2")]
  Half,
  #[serde(rename = "1/4")]
  Quarter,
  #[serde(rename = "1/8")]
  Eighth,
  #[serde(rename = "1/16")]
  Sixteenth,
}

impl BeatUnit {
  /// Coarsest first.
  pub const ALL: [BeatUnit; 8] = [
    BeatUnit::Eight,
    BeatUnit::Four,
    BeatUnit::Two,
    BeatUnit::One,
    BeatUnit::Half,
    BeatUnit::Quarter,
    BeatUnit::Eighth,
    BeatUnit::Sixteenth,
  ];

  pub fn fraction(self) -> Beats {
    match self {
      BeatUnit::Eight => 8.0,
      BeatUnit::Four => 4.0,
      BeatUnit::Two => 2.0,
      BeatUnit::One => 1.0,
      BeatUnit::Half => 0.5,
      BeatUnit::Quarter => 0.25,
      BeatUnit::Eighth => 0.125,
      BeatUnit::Sixteenth => 0.0625,
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      BeatUnit::Eight => "8",
      BeatUnit::Four => "4",
      BeatUnit::Two => "2",
      BeatUnit::One => "1",
      BeatUnit::Half => "1/2",
      BeatUnit::Quarter => "1/4",
      BeatUnit::Eighth => "1/8",
      BeatUnit::Sixteenth => "1/16",
    }
  }

  /// Label for the unit picker.
  pub fn display_name(self) -> String {
    match self {
      BeatUnit::One => "1 beat".to_string(),
      BeatUnit::Eight | BeatUnit::Four | BeatUnit::Two => format!("{} beats", self.as_str()),
      _ => format!("{} beat", self.as_str()),
    }
  }
}

impl Default for BeatUnit {
  fn default() -> BeatUnit {
    BeatUnit::Four
  }
}

impl fmt::Display for BeatUnit {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for BeatUnit {
  type Err = UnitParseError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let unit = s.trim();
    BeatUnit::ALL
      .iter()
      .cloned()
      .find(|candidate| candidate.as_str() == unit)
      .ok_or_else(|| UnitParseError {
        unit: unit.to_string(),
      })
  }
}
