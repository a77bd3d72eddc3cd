use failure;
use failure::Error;

use serde::de::DeserializeOwned;
use serde_derive::Deserialize;

use std::fs::File;
use std::io::Read;

use crate::grid::{
  lines::{DEFAULT_BEATS_PER_BAR, DEFAULT_LADDER, DEFAULT_MAX_LINES},
  advisor::DEFAULT_RECOMMENDED_LINES,
  snap::DEFAULT_SNAP_THRESHOLD,
  BeatUnit, GridDensity, GridError, SnapOptions, UnitAdvisor,
};
use crate::time::{DuplicatePolicy, EditLimits, TapTempo};

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Grid {
  pub max_lines: usize,
  pub ladder: Vec<f64>,
  pub beats_per_bar: f64,
  pub recommended_lines: f64,
}

impl Default for Grid {
  fn default() -> Grid {
    Grid {
      max_lines: DEFAULT_MAX_LINES,
      ladder: DEFAULT_LADDER.to_vec(),
      beats_per_bar: DEFAULT_BEATS_PER_BAR,
      recommended_lines: DEFAULT_RECOMMENDED_LINES,
    }
  }
}

impl Grid {
  pub fn density(&self) -> Result<GridDensity, GridError> {
    GridDensity::new(self.max_lines, self.ladder.clone(), self.beats_per_bar)
  }

  pub fn advisor(&self) -> UnitAdvisor {
    UnitAdvisor::new(self.recommended_lines)
  }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Snap {
  pub unit: BeatUnit,
  pub threshold: f64,
  pub enabled: bool,
}

impl Default for Snap {
  fn default() -> Snap {
    Snap {
      unit: BeatUnit::One,
      threshold: DEFAULT_SNAP_THRESHOLD,
      enabled: true,
    }
  }
}

impl Snap {
  pub fn options(&self) -> SnapOptions {
    SnapOptions {
      unit: self.unit,
      threshold: self.threshold,
      enabled: self.enabled,
    }
  }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Editing {
  pub min_bpm: f64,
  pub max_bpm: f64,
  pub time_resolution: f64,
  pub min_time: f64,
  pub proximity: f64,
  pub duplicates: DuplicatePolicy,
}

impl Default for Editing {
  fn default() -> Editing {
    let limits = EditLimits::default();
    Editing {
      min_bpm: limits.min_bpm,
      max_bpm: limits.max_bpm,
      time_resolution: limits.time_resolution,
      min_time: limits.min_time,
      proximity: limits.proximity,
      duplicates: DuplicatePolicy::default(),
    }
  }
}

impl Editing {
  pub fn limits(&self) -> EditLimits {
    EditLimits {
      min_bpm: self.min_bpm,
      max_bpm: self.max_bpm,
      time_resolution: self.time_resolution,
      min_time: self.min_time,
      proximity: self.proximity,
    }
  }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Tap {
  pub max_taps: usize,
  pub reset_after: f64,
  pub min_bpm: f64,
  pub max_bpm: f64,
}

impl Default for Tap {
  fn default() -> Tap {
    Tap {
      max_taps: 8,
      reset_after: 3.0,
      min_bpm: 30.0,
      max_bpm: 300.0,
    }
  }
}

impl Tap {
  pub fn tap_tempo(&self) -> TapTempo {
    TapTempo::new(self.max_taps, self.reset_after, self.min_bpm, self.max_bpm)
  }
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Config {
  pub grid: Grid,
  pub snap: Snap,
  pub editing: Editing,
  pub tap: Tap,
}

impl Config {
  pub fn from_file<'a, T>(path: T) -> Result<Config, Error>
  where
    T: Into<&'a str>,
  {
    read_toml(path.into())
  }

  pub fn from_str<'a, T>(content: T) -> Result<Config, Error>
  where
    T: Into<&'a str>,
  {
    let config: Config = toml::from_str(content.into())?;
    Ok(config)
  }
}

pub(crate) fn read_toml<T>(path: &str) -> Result<T, Error>
where
  T: DeserializeOwned,
{
  let mut content = String::new();
  let mut file = File::open(path)?;
  file.read_to_string(&mut content)?;
  let value: T = toml::from_str(&content)?;
  Ok(value)
}

#[cfg(test)]
mod test {

  use super::Config;
  use crate::grid::{BeatUnit, GridDensity, SnapOptions};
  use crate::time::{DuplicatePolicy, EditLimits};

  #[test]
  pub fn defaults() {
    let config = Config::from_str("").unwrap();
    assert_eq!(config.grid.density().unwrap(), GridDensity::default());
    assert_eq!(config.snap.options(), SnapOptions::default());
    assert_eq!(config.editing.limits(), EditLimits::default());
    assert_eq!(config.editing.duplicates, DuplicatePolicy::Reject);
    assert_eq!(config.grid.advisor().target_lines(), 10.0);
  }

  #[test]
  pub fn partial_sections() {
    let config = Config::from_str(
      r#"
[grid]
max_lines = 48
ladder = [0.5, 1.0, 4.0]

[snap]
unit = "1/4"
enabled = false

[editing]
duplicates = "last_wins"
"#,
    )
    .unwrap();

    let density = config.grid.density().unwrap();
    assert_eq!(density.max_lines(), 48);
    assert_eq!(density.ladder(), &[0.5, 1.0, 4.0]);
    assert_eq!(density.beats_per_bar(), 4.0);

    let snap = config.snap.options();
    assert_eq!(snap.unit, BeatUnit::Quarter);
    assert_eq!(snap.threshold, 0.1);
    assert!(!snap.enabled);

    assert_eq!(config.editing.duplicates, DuplicatePolicy::LastWins);
    assert_eq!(config.tap.max_taps, 8);
  }

  #[test]
  pub fn invalid_grid() {
    let config = Config::from_str("[grid]\nladder = []").unwrap();
    assert!(config.grid.density().is_err());
  }

  #[test]
  pub fn from_file() {
    let path = std::env::temp_dir().join("medley-tempo-config-from-file.toml");
    std::fs::write(&path, "[tap]\nmax_taps = 4\n").unwrap();
    let config = Config::from_file(path.to_str().unwrap()).unwrap();
    assert_eq!(config.tap.max_taps, 4);
    assert_eq!(config.tap.reset_after, 3.0);
    std::fs::remove_file(&path).unwrap();
  }

  #[test]
  pub fn from_missing_file() {
    assert!(Config::from_file("does/not/exist/tempo.toml").is_err());
  }

  #[test]
  pub fn unknown_unit() {
    assert!(Config::from_str("[snap]\nunit = \"3\"").is_err());
  }
}
