use color_eyre::Result;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io::Stdout;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::app::{handle_input, App};
use crate::ui;
use chord_flows_tui::PlaybackTick;

const EVENT_POLL_TIMEOUT: Duration = Duration::from_millis(50);

pub async fn run(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    ticks: &mut UnboundedReceiver<PlaybackTick>,
) -> Result<()> {
    loop {
        while let Ok(tick) = ticks.try_recv() {
            app.on_playback_tick(tick);
        }

        if let Err(e) = terminal.draw(|f| ui::ui(app, f)) {
            return Err(color_eyre::eyre::eyre!("Terminal draw error: {e}"));
        }

        // Polling blocks this thread, so give the playback task a turn first.
        tokio::task::yield_now().await;

        if matches!(event::poll(EVENT_POLL_TIMEOUT), Ok(true)) {
            match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    handle_input(app, key.code);
                    if !app.running {
                        break;
                    }
                }
                Ok(Event::Resize(_, _)) => {
                    if terminal.draw(|f| ui::ui(app, f)).is_err() {
                        // Non-fatal redraw error
                    }
                }
                Ok(_) | Err(_) => {}
            }
        }
    }

    app.stop_playback();
    Ok(())
}
