use chord_core::{DEFAULT_MODE, DEFAULT_PLAY_INTERVAL};
use color_eyre::eyre::eyre;
use dotenv::dotenv;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Location of the dataset when neither `--data` nor `CHORD_DATA_PATH` is set.
pub const DEFAULT_DATA_PATH: &str = "data/chart4_chord_all.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_path: PathBuf,
    pub mode: String,
    pub play_interval: Duration,
    pub debug: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            mode: DEFAULT_MODE.to_string(),
            play_interval: DEFAULT_PLAY_INTERVAL,
            debug: false,
        }
    }
}

/// Initializes the application configuration from `.env` and the environment
pub fn init_app_config() -> color_eyre::eyre::Result<AppConfig> {
    // Load environment variables from .env file
    dotenv().ok();

    AppConfig::from_lookup(|key| env::var(key).ok())
}

impl AppConfig {
    /// Resolves every setting through `lookup`, falling back to defaults.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> color_eyre::eyre::Result<Self> {
        let defaults = Self::default();

        let data_path = lookup("CHORD_DATA_PATH").map_or(defaults.data_path, PathBuf::from);
        let mode = lookup("CHORD_MODE")
            .filter(|mode| !mode.trim().is_empty())
            .unwrap_or(defaults.mode);

        let play_interval = match lookup("CHORD_PLAY_INTERVAL_MS") {
            Some(raw) => parse_interval(&raw)?,
            None => defaults.play_interval,
        };

        let debug = lookup("DEBUG").is_some_and(|value| matches!(value.trim(), "1" | "true"));

        Ok(Self {
            data_path,
            mode,
            play_interval,
            debug,
        })
    }
}

fn parse_interval(raw: &str) -> color_eyre::eyre::Result<Duration> {
    let millis: u64 = raw
        .trim()
        .parse()
        .map_err(|_| eyre!("CHORD_PLAY_INTERVAL_MS must be a whole number of milliseconds, got {raw:?}"))?;

    if millis == 0 {
        return Err(eyre!("CHORD_PLAY_INTERVAL_MS must be greater than zero"));
    }

    Ok(Duration::from_millis(millis))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_without_environment() -> color_eyre::eyre::Result<()> {
        let config = AppConfig::from_lookup(lookup(&[]))?;
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.play_interval, Duration::from_millis(1200));
        Ok(())
    }

    #[test]
    fn environment_overrides_defaults() -> color_eyre::eyre::Result<()> {
        let config = AppConfig::from_lookup(lookup(&[
            ("CHORD_DATA_PATH", "/tmp/flows.json"),
            ("CHORD_MODE", "country_country"),
            ("CHORD_PLAY_INTERVAL_MS", "500"),
            ("DEBUG", "1"),
        ]))?;

        assert_eq!(config.data_path, PathBuf::from("/tmp/flows.json"));
        assert_eq!(config.mode, "country_country");
        assert_eq!(config.play_interval, Duration::from_millis(500));
        assert!(config.debug);
        Ok(())
    }

    #[test]
    fn invalid_interval_is_rejected() {
        assert!(AppConfig::from_lookup(lookup(&[("CHORD_PLAY_INTERVAL_MS", "fast")])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[("CHORD_PLAY_INTERVAL_MS", "0")])).is_err());
    }
}
