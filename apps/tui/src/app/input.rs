use crate::app::state::{App, ControlFocus};
use chord_core::FocalEntity;
use crossterm::event::KeyCode;

/// Rows moved by PageUp/PageDown in the flow table.
const FLOW_PAGE: isize = 10;

pub fn handle_input(app: &mut App, key: KeyCode) {
    if app.show_help {
        handle_help_input(app, key);
    } else if app.search.is_some() {
        handle_search_input(app, key);
    } else {
        handle_main_input(app, key);
    }
}

fn handle_help_input(app: &mut App, key: KeyCode) {
    match key {
        KeyCode::Char('q') => app.running = false,
        KeyCode::Esc | KeyCode::Char('?' | 'h') | KeyCode::Enter => app.show_help = false,
        _ => {}
    }
}

fn handle_search_input(app: &mut App, key: KeyCode) {
    match key {
        KeyCode::Esc => app.search = None,
        KeyCode::Enter => app.confirm_search(),
        KeyCode::Up | KeyCode::Down => {
            let matches = app.search_match_count();
            if let Some(search) = app.search.as_mut() {
                search.move_selection(key == KeyCode::Down, matches);
            }
        }
        KeyCode::Backspace => {
            if let Some(search) = app.search.as_mut() {
                search.pop();
            }
        }
        KeyCode::Char(c) => {
            if let Some(search) = app.search.as_mut() {
                search.push(c);
            }
        }
        _ => {}
    }
}

fn handle_main_input(app: &mut App, key: KeyCode) {
    match key {
        KeyCode::Char('q') | KeyCode::Esc => {
            app.stop_playback();
            app.running = false;
        }
        KeyCode::Char('?' | 'h') => app.show_help = true,
        KeyCode::Tab => app.focus = app.focus.next(),
        KeyCode::BackTab => app.focus = app.focus.prev(),
        KeyCode::Left => adjust_focused(app, false),
        KeyCode::Right => adjust_focused(app, true),
        KeyCode::Enter if app.focus == ControlFocus::Play => app.toggle_playback(),
        KeyCode::Char(' ' | 'p') => app.toggle_playback(),
        KeyCode::Char('m') => app.cycle_mode(true),
        KeyCode::Char('M') => app.cycle_mode(false),
        KeyCode::Char('e') => app.cycle_entity(true),
        KeyCode::Char('E') => app.cycle_entity(false),
        KeyCode::Char('a') => app.select_entity(FocalEntity::All),
        KeyCode::Char('/') => app.open_search(),
        KeyCode::Char('[') => app.step_period(-1),
        KeyCode::Char(']') => app.step_period(1),
        KeyCode::Home => app.set_period(0),
        KeyCode::End => app.last_period(),
        KeyCode::Up => app.scroll_flows(-1),
        KeyCode::Down => app.scroll_flows(1),
        KeyCode::PageUp => app.scroll_flows(-FLOW_PAGE),
        KeyCode::PageDown => app.scroll_flows(FLOW_PAGE),
        _ => {}
    }
}

fn adjust_focused(app: &mut App, forward: bool) {
    match app.focus {
        ControlFocus::Mode => app.cycle_mode(forward),
        ControlFocus::Entity => app.cycle_entity(forward),
        ControlFocus::Period => app.step_period(if forward { 1 } else { -1 }),
        ControlFocus::Play => app.toggle_playback(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chord_core::{Dataset, ModeData};
    use chord_flows_tui::{AppConfig, PlaybackTimer};
    use std::collections::{BTreeMap, HashMap};
    use std::sync::Arc;
    use std::time::Duration;

    fn app() -> color_eyre::Result<App> {
        let mode = ModeData {
            nodes: vec!["Asia".to_string(), "Europe".to_string()],
            dates: vec!["2020-03".to_string(), "2020-06".to_string(), "2020-09".to_string()],
            matrices: ["2020-03", "2020-06", "2020-09"]
                .iter()
                .map(|p| ((*p).to_string(), vec![vec![0.0, 1.0], vec![2.0, 0.0]]))
                .collect::<HashMap<_, _>>(),
        };
        let dataset = Dataset {
            meta: None,
            modes: BTreeMap::from([("region_region".to_string(), mode)]),
        };
        let (timer, _ticks) = PlaybackTimer::new(Duration::from_millis(1200));
        App::new(Arc::new(dataset), &AppConfig::default(), timer)
    }

    #[tokio::test]
    async fn arrows_drive_the_focused_control() -> color_eyre::Result<()> {
        let mut app = app()?;
        app.focus = ControlFocus::Period;
        handle_input(&mut app, KeyCode::Left);
        handle_input(&mut app, KeyCode::Left);
        assert_eq!(app.controls.selection().period_index, 0);
        handle_input(&mut app, KeyCode::Left);
        assert_eq!(app.controls.selection().period_index, 0);

        handle_input(&mut app, KeyCode::BackTab);
        assert_eq!(app.focus, ControlFocus::Entity);
        handle_input(&mut app, KeyCode::Right);
        assert_eq!(app.controls.selection().focal_entity.as_str(), "Asia");
        Ok(())
    }

    #[tokio::test]
    async fn space_toggles_playback() -> color_eyre::Result<()> {
        let mut app = app()?;
        handle_input(&mut app, KeyCode::Char(' '));
        assert!(app.playback.is_active());
        handle_input(&mut app, KeyCode::Char(' '));
        assert!(!app.playback.is_active());
        Ok(())
    }

    #[tokio::test]
    async fn search_prompt_captures_keys() -> color_eyre::Result<()> {
        let mut app = app()?;
        handle_input(&mut app, KeyCode::Char('/'));
        handle_input(&mut app, KeyCode::Char('e'));
        handle_input(&mut app, KeyCode::Char('u'));
        assert_eq!(app.controls.selection().focal_entity, FocalEntity::All);

        handle_input(&mut app, KeyCode::Enter);
        assert_eq!(app.controls.selection().focal_entity.as_str(), "Europe");
        Ok(())
    }

    #[tokio::test]
    async fn quit_stops_playback() -> color_eyre::Result<()> {
        let mut app = app()?;
        handle_input(&mut app, KeyCode::Char('p'));
        handle_input(&mut app, KeyCode::Char('q'));
        assert!(!app.running);
        assert!(!app.playback.is_active());
        Ok(())
    }
}
