use failure::Error;

use serde_derive::{Deserialize, Serialize};

use crate::config::read_toml;
use crate::time::{DuplicatePolicy, Seconds, TempoMap};

/// From `time` onward the tempo is `bpm`, until the next change.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct TempoChange {
  pub time: Seconds,
  pub bpm: f64,
}

impl TempoChange {
  pub fn new(time: Seconds, bpm: f64) -> TempoChange {
    TempoChange { time, bpm }
  }
}

/// Persisted tempo of a medley: the opening tempo plus its breakpoints,
/// in whatever order storage hands them back.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TempoTrack {
  pub initial_bpm: f64,
  #[serde(default)]
  pub tempo_changes: Vec<TempoChange>,
}

impl TempoTrack {
  pub fn from_file<'a, T>(path: T) -> Result<TempoTrack, Error>
  where
    T: Into<&'a str>,
  {
    read_toml(path.into())
  }

  pub fn from_str<'a, T>(content: T) -> Result<TempoTrack, Error>
  where
    T: Into<&'a str>,
  {
    let track: TempoTrack = toml::from_str(content.into())?;
    Ok(track)
  }

  pub fn to_tempo_map(&self, duplicates: DuplicatePolicy) -> Result<TempoMap, Error> {
    let map = TempoMap::builder(self.initial_bpm)
      .changes(self.tempo_changes.iter().cloned())
      .duplicates(duplicates)
      .build()?;
    Ok(map)
  }
}

impl From<&TempoMap> for TempoTrack {
  fn from(map: &TempoMap) -> Self {
    TempoTrack {
      initial_bpm: map.initial_bpm(),
      tempo_changes: map.changes().to_vec(),
    }
  }
}
