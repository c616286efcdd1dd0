mod fetch;
mod state;
mod view;

use std::cell::RefCell;
use std::io;
use std::rc::Rc;

use ratzilla::event::{KeyCode, KeyEvent};
use ratzilla::ratatui::Terminal;
use ratzilla::{DomBackend, WebRenderer};
use wasm_bindgen_futures::spawn_local;

use state::{Command, WebState};

fn main() -> io::Result<()> {
    let state = Rc::new(RefCell::new(WebState::default()));

    spawn_local({
        let state = state.clone();
        async move {
            let result = fetch::load_dataset().await;
            if let Err(error) = &result {
                web_sys::console::error_1(&format!("Failed to load chord data: {error}").into());
            }
            state.borrow_mut().on_loaded(result);
        }
    });

    let backend = DomBackend::new()?;
    let mut terminal = Terminal::new(backend)?;

    terminal.on_key_event({
        let state = state.clone();
        move |event| {
            if let Some(command) = command_for(&event) {
                state.borrow_mut().apply(command);
            }
        }
    });

    terminal.draw_web(move |f| {
        let mut state = state.borrow_mut();
        if state.dashboard().is_some() {
            state.on_frame(js_sys::Date::now() / 1000.0);
        }
        view::render(&state, f);
    });

    Ok(())
}

fn command_for(event: &KeyEvent) -> Option<Command> {
    let command = match event.code {
        KeyCode::Char('m') => Command::NextMode,
        KeyCode::Char('M') => Command::PrevMode,
        KeyCode::Char('e') => Command::NextEntity,
        KeyCode::Char('E') => Command::PrevEntity,
        KeyCode::Char('a') => Command::AllEntities,
        KeyCode::Left | KeyCode::Char('[') => Command::StepPeriod(-1),
        KeyCode::Right | KeyCode::Char(']') => Command::StepPeriod(1),
        KeyCode::Home => Command::FirstPeriod,
        KeyCode::End => Command::LastPeriod,
        KeyCode::Char(' ' | 'p') => Command::TogglePlay,
        KeyCode::Up => Command::ScrollFlows(-1),
        KeyCode::Down => Command::ScrollFlows(1),
        KeyCode::PageUp => Command::ScrollFlows(-10),
        KeyCode::PageDown => Command::ScrollFlows(10),
        KeyCode::Char('?' | 'h') => Command::ToggleHelp,
        _ => return None,
    };
    Some(command)
}
