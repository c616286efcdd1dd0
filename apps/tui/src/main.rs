mod app;
mod cli;
mod event;
mod terminal;
mod ui;

use app::App;
use chord_core::FocalEntity;
use chord_flows_tui::{config, loader, logging, PlaybackTimer};
use clap::Parser;
use cli::CliArgs;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;

#[tokio::main]
async fn main() -> Result<()> {
    // Setup error handling
    color_eyre::install()?;

    let args = CliArgs::parse();
    args.apply_env_overrides();

    let config = config::init_app_config()?;
    logging::init(config.debug);
    tracing::debug!(?config, "configuration resolved");

    // Without data there is nothing to show, so a failed load ends the run.
    let dataset = loader::load(&config.data_path)
        .await
        .wrap_err_with(|| format!("loading chord data from {}", config.data_path.display()))?;

    let (playback, mut ticks) = PlaybackTimer::new(config.play_interval);
    let mut app = App::new(dataset, &config, playback)?;

    if let Some(entity) = args.entity.as_deref() {
        app.select_entity(FocalEntity::parse(entity));
    }
    if let Some(period) = args.period {
        app.set_period(period);
    }

    if args.headless || !is_terminal() {
        return event::run_headless(&app, args.json);
    }

    let mut terminal = terminal::setup_terminal()?;
    let result = event::run(&mut terminal, &mut app, &mut ticks).await;
    terminal::cleanup_terminal_state(true, true);

    result
}

// Check if we're running in a terminal
fn is_terminal() -> bool {
    atty::is(atty::Stream::Stdout)
}
