use std::path::PathBuf;
use std::time::Duration;

use crate::quiz::spawner::MIN_WAVE_SIZE;

const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_LOADING_MS: u64 = 2000;
const DEFAULT_WAVE_SIZE: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory holding `userdata.json`, `attempts.json` and `admindata.json`.
    pub data_dir: PathBuf,
    /// Replaces the built-in levels when set.
    pub levels_file: Option<PathBuf>,
    /// How long the loading screen takes to fill.
    pub loading: Duration,
    /// Fruits per question.
    pub wave_size: usize,
    /// Fixes the fruit waves, for reproducible sessions.
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            levels_file: None,
            loading: Duration::from_millis(DEFAULT_LOADING_MS),
            wave_size: DEFAULT_WAVE_SIZE,
            seed: None,
        }
    }
}

impl Config {
    /// Loads `.env` from the working directory, then reads the `FRUITMATH_*` variables.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            data_dir: lookup("FRUITMATH_DATA_DIR")
                .filter(|dir| !dir.trim().is_empty())
                .map_or(defaults.data_dir, PathBuf::from),
            levels_file: lookup("FRUITMATH_LEVELS_FILE")
                .filter(|file| !file.trim().is_empty())
                .map(PathBuf::from),
            loading: parse_var(&lookup, "FRUITMATH_LOADING_MS")
                .map_or(defaults.loading, Duration::from_millis),
            wave_size: parse_var(&lookup, "FRUITMATH_WAVE_SIZE")
                .map_or(defaults.wave_size, |size: usize| {
                    if size < MIN_WAVE_SIZE {
                        log::warn!("FRUITMATH_WAVE_SIZE={size} is too small, using {MIN_WAVE_SIZE}");
                    }
                    size.max(MIN_WAVE_SIZE)
                }),
            seed: parse_var(&lookup, "FRUITMATH_SEED"),
        }
    }
}

/// Parses `key` if it is set. Unparsable values are ignored with a warning.
fn parse_var<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;

    raw.trim()
        .parse()
        .inspect_err(|_| log::warn!("{key} is not a valid number ('{raw}'), using the default"))
        .ok()
}
