use chord_core::{ChartScene, Controls, Dataset, FocalEntity, PeriodLabels, PlaybackMode};
use chord_flows_tui::search::{rank_entities, EntitySearch};
use chord_flows_tui::{AppConfig, PlaybackTick, PlaybackTimer};
use color_eyre::Result;
use std::sync::Arc;

/// Which control the arrow keys currently drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlFocus {
    Mode,
    Entity,
    Period,
    Play,
}

impl ControlFocus {
    pub const ALL: [Self; 4] = [Self::Mode, Self::Entity, Self::Period, Self::Play];

    pub const fn next(self) -> Self {
        match self {
            Self::Mode => Self::Entity,
            Self::Entity => Self::Period,
            Self::Period => Self::Play,
            Self::Play => Self::Mode,
        }
    }

    pub const fn prev(self) -> Self {
        match self {
            Self::Mode => Self::Play,
            Self::Entity => Self::Mode,
            Self::Period => Self::Entity,
            Self::Play => Self::Period,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Mode => "Mode",
            Self::Entity => "Entity",
            Self::Period => "Period",
            Self::Play => "Playback",
        }
    }
}

#[derive(Debug)]
pub struct App {
    pub running: bool,
    pub dataset: Arc<Dataset>,
    pub controls: Controls,
    pub scene: Option<ChartScene>,
    pub focus: ControlFocus,
    pub playback: PlaybackTimer,
    pub search: Option<EntitySearch>,
    pub status_message: String,
    pub show_help: bool,
    pub flow_offset: usize,
}

impl App {
    pub fn new(dataset: Arc<Dataset>, config: &AppConfig, playback: PlaybackTimer) -> Result<Self> {
        let controls = Controls::new(&dataset, &config.mode)?;
        if controls.mode() != config.mode {
            tracing::warn!(
                requested = %config.mode,
                opened = controls.mode(),
                "mode not found in chord data, opened the first mode instead"
            );
        }

        let mut app = Self {
            running: true,
            dataset,
            controls,
            scene: None,
            focus: ControlFocus::Mode,
            playback,
            search: None,
            status_message: String::new(),
            show_help: false,
            flow_offset: 0,
        };
        app.render_chart();
        Ok(app)
    }

    /// Rebuilds the chart for the current selection.
    ///
    /// On failure the previous chart stays on screen and the reason goes to the
    /// status line. A successful build clears an earlier error.
    pub fn render_chart(&mut self) {
        match ChartScene::from_dataset(self.controls.selection(), &self.dataset) {
            Ok(scene) => {
                self.scene = Some(scene);
                self.clamp_flow_offset();
                if self.status_message.starts_with("Error") {
                    self.status_message.clear();
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "chart not rendered");
                self.status_message = format!("Error: {e}");
            }
        }
    }

    pub fn period_labels(&self) -> PeriodLabels {
        self.controls.period_labels(&self.dataset)
    }

    pub fn playback_mode(&self) -> PlaybackMode {
        self.playback.mode()
    }

    pub fn change_mode(&mut self, mode: &str) {
        match self.controls.change_mode(&self.dataset, mode) {
            Ok(()) => {
                tracing::debug!(mode, "mode changed");
                self.status_message.clear();
                self.render_chart();
            }
            Err(e) => {
                tracing::warn!(error = %e, "mode change rejected");
                self.status_message = format!("Error: {e}");
            }
        }
    }

    pub fn cycle_mode(&mut self, forward: bool) {
        match self.controls.neighbour_mode(&self.dataset, forward) {
            Ok(mode) => self.change_mode(&mode),
            Err(e) => self.status_message = format!("Error: {e}"),
        }
    }

    pub fn select_entity(&mut self, entity: FocalEntity) {
        self.controls.select_entity(entity);
        self.flow_offset = 0;
        self.render_chart();
    }

    pub fn cycle_entity(&mut self, forward: bool) {
        self.controls.cycle_entity(forward);
        self.flow_offset = 0;
        self.render_chart();
    }

    pub fn step_period(&mut self, delta: isize) {
        self.controls.step_period(delta);
        self.render_chart();
    }

    pub fn set_period(&mut self, index: usize) {
        self.controls.set_period(index);
        self.render_chart();
    }

    pub fn last_period(&mut self) {
        self.set_period(self.controls.bounds().max);
    }

    pub fn toggle_playback(&mut self) {
        let mode = self.playback.toggle();
        self.status_message = match mode {
            PlaybackMode::Running => "Playing".to_string(),
            PlaybackMode::Stopped => "Paused".to_string(),
        };
    }

    pub fn stop_playback(&mut self) {
        if self.playback.stop() {
            self.status_message = "Paused".to_string();
        }
    }

    /// Applies a timer tick; ticks from a stopped or replaced run are dropped.
    pub fn on_playback_tick(&mut self, tick: PlaybackTick) {
        if !self.playback.accepts(tick) {
            return;
        }
        self.controls.advance_playback();
        self.render_chart();
    }

    pub fn open_search(&mut self) {
        self.search = Some(EntitySearch::default());
    }

    /// Focuses the highlighted search match and closes the prompt.
    pub fn confirm_search(&mut self) {
        let Some(search) = self.search.take() else {
            return;
        };
        let chosen = search
            .chosen(self.controls.entity_options())
            .map(|option| option.value.clone());
        match chosen {
            Some(entity) => self.select_entity(entity),
            None => self.status_message = format!("No entity matches {:?}", search.query),
        }
    }

    pub fn search_match_count(&self) -> usize {
        self.search.as_ref().map_or(0, |search| {
            rank_entities(self.controls.entity_options(), &search.query).len()
        })
    }

    pub fn scroll_flows(&mut self, delta: isize) {
        self.flow_offset = self.flow_offset.saturating_add_signed(delta);
        self.clamp_flow_offset();
    }

    fn clamp_flow_offset(&mut self) {
        let rows = self
            .scene
            .as_ref()
            .map_or(0, |scene| scene.ranked_ribbons().len());
        self.flow_offset = self.flow_offset.min(rows.saturating_sub(1));
    }
}
