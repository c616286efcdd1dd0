use std::fmt;
use std::rc::Rc;

use chord_core::{
    ChartScene, Controls, Dataset, FocalEntity, PlaybackClock, PlaybackMode,
    DEFAULT_MODE, DEFAULT_PLAY_INTERVAL,
};

/// Something the page was asked to do, already decoded from the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    NextMode,
    PrevMode,
    NextEntity,
    PrevEntity,
    AllEntities,
    StepPeriod(isize),
    FirstPeriod,
    LastPeriod,
    TogglePlay,
    ScrollFlows(isize),
    ToggleHelp,
}

/// A loaded dataset with the controls and chart over it.
#[derive(Debug)]
pub struct Dashboard {
    pub dataset: Rc<Dataset>,
    pub controls: Controls,
    pub scene: Option<ChartScene>,
    pub status: String,
}

impl Dashboard {
    fn new(dataset: Rc<Dataset>) -> Result<Self, String> {
        let controls = Controls::new(&dataset, DEFAULT_MODE).map_err(|e| e.to_string())?;
        let mut dashboard = Self {
            dataset,
            controls,
            scene: None,
            status: String::new(),
        };
        dashboard.render();
        Ok(dashboard)
    }

    /// Rebuilds the chart; a failed build keeps the previous one on screen.
    fn render(&mut self) {
        match ChartScene::from_dataset(self.controls.selection(), &self.dataset) {
            Ok(scene) => {
                self.scene = Some(scene);
                self.status.clear();
            }
            Err(e) => self.status = format!("Error: {e}"),
        }
    }
}

#[derive(Debug)]
pub enum LoadState {
    Loading,
    Ready(Box<Dashboard>),
    Failed(String),
}

#[derive(Debug)]
pub struct WebState {
    pub load: LoadState,
    pub clock: PlaybackClock,
    pub flow_offset: usize,
    pub show_help: bool,
}

impl Default for WebState {
    fn default() -> Self {
        Self {
            load: LoadState::Loading,
            clock: PlaybackClock::new(DEFAULT_PLAY_INTERVAL),
            flow_offset: 0,
            show_help: false,
        }
    }
}

impl WebState {
    pub fn on_loaded<E: fmt::Display>(&mut self, result: Result<Rc<Dataset>, E>) {
        self.load = match result.map_err(|e| e.to_string()).and_then(Dashboard::new) {
            Ok(dashboard) => LoadState::Ready(Box::new(dashboard)),
            Err(message) => LoadState::Failed(message),
        };
    }

    pub fn dashboard(&self) -> Option<&Dashboard> {
        match &self.load {
            LoadState::Ready(dashboard) => Some(&**dashboard),
            LoadState::Loading | LoadState::Failed(_) => None,
        }
    }

    pub fn playback_mode(&self) -> PlaybackMode {
        self.clock.mode()
    }

    /// Applies a key command. Ignored until the data has loaded.
    pub fn apply(&mut self, command: Command) {
        if command == Command::ToggleHelp {
            self.show_help = !self.show_help;
            return;
        }
        let LoadState::Ready(dashboard) = &mut self.load else {
            return;
        };

        match command {
            Command::NextMode | Command::PrevMode => {
                let forward = command == Command::NextMode;
                if let Err(e) = dashboard.controls.cycle_mode(&dashboard.dataset, forward) {
                    dashboard.status = format!("Error: {e}");
                    return;
                }
                self.flow_offset = 0;
            }
            Command::NextEntity => dashboard.controls.cycle_entity(true),
            Command::PrevEntity => dashboard.controls.cycle_entity(false),
            Command::AllEntities => dashboard.controls.select_entity(FocalEntity::All),
            Command::StepPeriod(delta) => dashboard.controls.step_period(delta),
            Command::FirstPeriod => dashboard.controls.set_period(0),
            Command::LastPeriod => {
                let last = dashboard.controls.bounds().max;
                dashboard.controls.set_period(last);
            }
            Command::TogglePlay => {
                self.clock.toggle();
                return;
            }
            Command::ScrollFlows(delta) => {
                let rows = dashboard
                    .scene
                    .as_ref()
                    .map_or(0, |scene| scene.ranked_ribbons().len());
                self.flow_offset = self
                    .flow_offset
                    .saturating_add_signed(delta)
                    .min(rows.saturating_sub(1));
                return;
            }
            Command::ToggleHelp => return,
        }
        if matches!(
            command,
            Command::NextEntity | Command::PrevEntity | Command::AllEntities
        ) {
            self.flow_offset = 0;
        }
        dashboard.render();
    }

    /// Called once per animation frame with the wall clock in seconds.
    pub fn on_frame(&mut self, now_seconds: f64) {
        let ticks = self.clock.advance(now_seconds);
        if ticks == 0 {
            return;
        }
        if let LoadState::Ready(dashboard) = &mut self.load {
            for _ in 0..ticks {
                dashboard.controls.advance_playback();
            }
            dashboard.render();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chord_core::{DatasetError, LoadError};

    const DOCUMENT: &str = r#"{
        "meta": {"units": "USD tn"},
        "modes": {
            "region_region": {
                "nodes": ["Asia", "Europe", "Americas"],
                "dates": ["2021-03", "2021-06", "2021-09"],
                "matrices": {
                    "2021-03": [[0, 2, 1], [3, 0, 0], [1, 1, 0]],
                    "2021-06": [[0, 2, 2], [3, 0, 1], [1, 1, 0]],
                    "2021-09": [[0, 4, 1], [3, 0, 0], [0, 1, 0]]
                }
            },
            "country_country": {
                "nodes": ["Japan", "Germany"],
                "dates": ["2021-09"],
                "matrices": {"2021-09": [[0, 1], [2, 0]]}
            }
        }
    }"#;

    fn ready() -> WebState {
        let mut state = WebState::default();
        state.on_loaded(Dataset::from_json(DOCUMENT).map(Rc::new));
        state
    }

    fn period(state: &WebState) -> Option<String> {
        state
            .dashboard()
            .and_then(|d| d.scene.as_ref())
            .map(|scene| scene.period.clone())
    }

    #[test]
    fn commands_before_load_are_ignored() {
        let mut state = WebState::default();
        state.apply(Command::NextMode);
        state.apply(Command::TogglePlay);
        assert!(matches!(state.load, LoadState::Loading));
        assert_eq!(state.playback_mode(), PlaybackMode::Stopped);
    }

    #[test]
    fn load_failure_is_reported() {
        let mut state = WebState::default();
        state.on_loaded(Err(LoadError::Invalid(DatasetError::RowCount {
            mode: "region_region".to_string(),
            period: "2021-03".to_string(),
            expected: 3,
            found: 2,
        })));
        let LoadState::Failed(message) = &state.load else {
            panic!("expected a failed load");
        };
        assert!(message.contains("2021-03"));
    }

    #[test]
    fn opens_default_mode_at_latest_period() {
        let state = ready();
        assert_eq!(period(&state).as_deref(), Some("2021-09"));
        let mode = state.dashboard().map(|d| d.controls.mode().to_string());
        assert_eq!(mode.as_deref(), Some("region_region"));
    }

    #[test]
    fn frames_advance_playback_and_wrap() {
        let mut state = ready();
        state.apply(Command::TogglePlay);
        state.on_frame(100.0);
        state.on_frame(101.0);
        assert_eq!(period(&state).as_deref(), Some("2021-09"));

        state.on_frame(101.3);
        assert_eq!(period(&state).as_deref(), Some("2021-03"));

        state.apply(Command::TogglePlay);
        state.on_frame(110.0);
        assert_eq!(period(&state).as_deref(), Some("2021-03"));
    }

    #[test]
    fn mode_switch_keeps_valid_period_range() {
        let mut state = ready();
        state.apply(Command::StepPeriod(-2));
        assert_eq!(period(&state).as_deref(), Some("2021-03"));

        state.apply(Command::PrevMode);
        let dashboard = state.dashboard();
        assert_eq!(dashboard.map(|d| d.controls.mode()), Some("country_country"));
        assert_eq!(period(&state).as_deref(), Some("2021-09"));
    }

    #[test]
    fn entity_focus_and_scrolling() {
        let mut state = ready();
        state.apply(Command::NextEntity);
        let focus = state.dashboard().and_then(|d| d.scene.as_ref()).and_then(|s| s.focus);
        assert!(focus.is_some());

        state.apply(Command::ScrollFlows(50));
        let rows = state
            .dashboard()
            .and_then(|d| d.scene.as_ref())
            .map_or(0, |s| s.ranked_ribbons().len());
        assert_eq!(state.flow_offset, rows - 1);

        state.apply(Command::AllEntities);
        assert_eq!(state.flow_offset, 0);
        let focus = state.dashboard().and_then(|d| d.scene.as_ref()).and_then(|s| s.focus);
        assert_eq!(focus, None);
    }

    #[test]
    fn help_toggles_in_any_state() {
        let mut state = WebState::default();
        state.apply(Command::ToggleHelp);
        assert!(state.show_help);
        state.apply(Command::ToggleHelp);
        assert!(!state.show_help);
    }
}
