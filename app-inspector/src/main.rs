use log::{debug, info};

use failure;
use failure::{Error, Fail};

use medley_tempo_core::{
  config::Config,
  grid::{generate_grid_lines, snap_to_grid, BeatUnit},
  time::{BarsTime, Seconds, TempoMap, TempoTrack},
};

const MEDLEY_TEMPO_CONFIG: &'static str = "MEDLEY_TEMPO_CONFIG";
const DEFAULT_MEDLEY_TEMPO_CONFIG: &'static str = "tempo.toml";

const MEDLEY_TEMPO_LOG_CONFIG: &'static str = "MEDLEY_TEMPO_LOG_CONFIG";
const DEFAULT_MEDLEY_TEMPO_LOG_CONFIG: &'static str = "log4rs.yaml";

const DEFAULT_VISIBLE_DURATION: Seconds = 30.0;

const USAGE: &'static str = "app-inspector <track.toml> [start] [duration] [unit]";

#[derive(Debug, Fail)]
enum MainError {
  #[fail(display = "Failed to init logging: {}", cause)]
  LoggingInit { cause: String },

  #[fail(display = "Missing tempo track. Usage: {}", usage)]
  MissingTrack { usage: &'static str },

  #[fail(display = "Invalid {}: {}", name, value)]
  InvalidArgument { name: &'static str, value: String },
}

struct Window {
  start: Seconds,
  duration: Seconds,
  unit: Option<BeatUnit>,
}

fn main() -> Result<(), Error> {
  init_logging()?;

  let config = init_config()?;

  let args: Vec<String> = std::env::args().skip(1).collect();
  let track_path = args
    .get(0)
    .ok_or(MainError::MissingTrack { usage: USAGE })?;
  let window = parse_window(&args[1..])?;

  let tempo_map = load_tempo_map(track_path.as_str(), &config)?;

  inspect(&tempo_map, &window, &config)?;

  Ok(())
}

fn init_logging() -> Result<(), Error> {
  let log_config_path = std::env::var(MEDLEY_TEMPO_LOG_CONFIG)
    .unwrap_or_else(|_| DEFAULT_MEDLEY_TEMPO_LOG_CONFIG.to_string());

  log4rs::init_file(log_config_path.as_str(), Default::default()).map_err(|err| {
    MainError::LoggingInit {
      cause: err.to_string(),
    }
  })?;

  Ok(())
}

fn init_config() -> Result<Config, Error> {
  let config_path =
    std::env::var(MEDLEY_TEMPO_CONFIG).unwrap_or_else(|_| DEFAULT_MEDLEY_TEMPO_CONFIG.to_string());

  info!("Loading tempo configuration from {} ...", config_path);
  let config = Config::from_file(config_path.as_str())?;
  debug!("{:#?}", config);

  Ok(config)
}

fn parse_window(args: &[String]) -> Result<Window, Error> {
  let start = match args.get(0) {
    Some(value) => parse_seconds("start", value)?,
    None => 0.0,
  };
  let duration = match args.get(1) {
    Some(value) => parse_seconds("duration", value)?,
    None => DEFAULT_VISIBLE_DURATION,
  };
  let unit = match args.get(2) {
    Some(value) => Some(value.parse::<BeatUnit>()?),
    None => None,
  };
  Ok(Window {
    start,
    duration,
    unit,
  })
}

fn parse_seconds(name: &'static str, value: &str) -> Result<Seconds, Error> {
  value
    .parse::<Seconds>()
    .ok()
    .filter(|seconds| seconds.is_finite())
    .ok_or_else(|| {
      MainError::InvalidArgument {
        name,
        value: value.to_string(),
      }
      .into()
    })
}

fn load_tempo_map(path: &str, config: &Config) -> Result<TempoMap, Error> {
  info!("Loading tempo track from {} ...", path);
  let track = TempoTrack::from_file(path)?;
  let tempo_map = track.to_tempo_map(config.editing.duplicates)?;
  debug!("{:#?}", tempo_map);
  Ok(tempo_map)
}

fn inspect(tempo_map: &TempoMap, window: &Window, config: &Config) -> Result<(), Error> {
  let density = config.grid.density()?;
  let advisor = config.grid.advisor();
  let beats_per_bar = density.beats_per_bar().round().max(1.0) as u32;
  let end = window.start + window.duration;

  let (min_bpm, max_bpm) = tempo_map.bpm_range();
  info!("Tempo between {} and {} BPM", min_bpm, max_bpm);
  for segment in tempo_map.segments(window.start, end) {
    info!(
      "  {:>9.3}s .. {:>9.3}s  {} BPM",
      segment.start, segment.end, segment.bpm
    );
  }

  let unit = window.unit.unwrap_or_else(|| {
    advisor.recommend(tempo_map.bpm_at(window.start), Some(window.duration))
  });
  info!(
    "Grid for {}s + {}s at {}",
    window.start,
    window.duration,
    unit.display_name()
  );

  let snap = config.snap.options();
  for line in generate_grid_lines(tempo_map, window.start, window.duration, unit, &density) {
    let beats = tempo_map.time_to_beats(line.time);
    info!(
      "{} {:>9.3}s  beat {:>5}  {:?}",
      if line.is_major { "|" } else { ":" },
      line.time,
      line.beat_number,
      BarsTime::from_beats(beats, beats_per_bar)
    );
  }

  let midpoint = window.start + window.duration / 2.0;
  info!(
    "Snapping {:.3}s with {} gives {:.3}s",
    midpoint,
    snap.unit,
    snap_to_grid(tempo_map, midpoint, &snap)
  );

  Ok(())
}
