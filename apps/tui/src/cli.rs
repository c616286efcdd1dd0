use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "chord-flows", version, about = "Cross-border flows chord diagram")]
pub struct CliArgs {
    /// Print the selected chart as text and exit
    #[arg(long)]
    pub headless: bool,

    /// Print headless output as JSON
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Override dataset path
    #[arg(long, value_name = "PATH")]
    pub data: Option<String>,

    /// Mode to open (region_region, country_region, country_country)
    #[arg(long, value_name = "NAME")]
    pub mode: Option<String>,

    /// Entity to focus; "all" for none
    #[arg(long, value_name = "NAME")]
    pub entity: Option<String>,

    /// Period index to open (defaults to the latest period)
    #[arg(long, value_name = "INDEX")]
    pub period: Option<usize>,

    /// Playback interval in milliseconds
    #[arg(long = "interval-ms", value_name = "MS")]
    pub interval_ms: Option<u64>,
}

impl CliArgs {
    pub fn apply_env_overrides(&self) {
        if let Some(path) = &self.data {
            std::env::set_var("CHORD_DATA_PATH", path);
        }
        if let Some(mode) = &self.mode {
            std::env::set_var("CHORD_MODE", mode);
        }
        if let Some(interval) = self.interval_ms {
            std::env::set_var("CHORD_PLAY_INTERVAL_MS", interval.to_string());
        }
        if self.debug {
            std::env::set_var("DEBUG", "1");
        }
    }
}
