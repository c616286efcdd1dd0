use std::time::Duration;

/// Time between playback ticks.
pub const DEFAULT_PLAY_INTERVAL: Duration = Duration::from_millis(1200);

const MAX_FRAME_DELTA: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackMode {
    Running,
    Stopped,
}

impl PlaybackMode {
    /// Label of the play toggle while in this mode.
    pub const fn toggle_label(self) -> &'static str {
        match self {
            Self::Running => "Pause",
            Self::Stopped => "Play",
        }
    }
}

/// Frame-driven playback: fed wall-clock seconds, reports how many ticks fell due.
///
/// Surfaces without a timer task (the browser frame loop) poll this once per
/// frame. Starting always discards leftover time from an earlier run.
#[derive(Debug, Clone)]
pub struct PlaybackClock {
    interval: f64,
    mode: PlaybackMode,
    elapsed: f64,
    last_tick: Option<f64>,
}

impl PlaybackClock {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.as_secs_f64().max(f64::EPSILON),
            mode: PlaybackMode::Stopped,
            elapsed: 0.0,
            last_tick: None,
        }
    }

    pub const fn mode(&self) -> PlaybackMode {
        self.mode
    }

    pub fn is_running(&self) -> bool {
        self.mode == PlaybackMode::Running
    }

    pub fn start(&mut self) {
        self.mode = PlaybackMode::Running;
        self.elapsed = 0.0;
        self.last_tick = None;
    }

    /// Stops; a no-op when already stopped.
    pub fn stop(&mut self) {
        self.mode = PlaybackMode::Stopped;
        self.elapsed = 0.0;
        self.last_tick = None;
    }

    pub fn toggle(&mut self) -> PlaybackMode {
        match self.mode {
            PlaybackMode::Running => self.stop(),
            PlaybackMode::Stopped => self.start(),
        }
        self.mode
    }

    /// Advances to `now_seconds` and returns the number of ticks due.
    ///
    /// Gaps longer than a couple of seconds (a hidden tab) are clamped so a
    /// returning viewer does not skip through many periods at once.
    pub fn advance(&mut self, now_seconds: f64) -> u32 {
        if self.mode == PlaybackMode::Stopped {
            return 0;
        }

        let delta = self
            .last_tick
            .map_or(0.0, |last| (now_seconds - last).clamp(0.0, MAX_FRAME_DELTA));
        self.last_tick = Some(now_seconds);
        self.elapsed += delta;

        let mut ticks = 0;
        while self.elapsed >= self.interval {
            self.elapsed -= self.interval;
            ticks += 1;
        }
        ticks
    }
}
