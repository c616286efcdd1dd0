use chord_core::PlaybackMode;
use std::time::Duration;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// One playback step, stamped with the run that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackTick {
    pub generation: u64,
}

/// Single-owner handle to the repeating playback task.
///
/// At most one task runs at a time: `start` aborts the previous task before
/// spawning a new one, and ticks from an older run are refused by
/// [`PlaybackTimer::accepts`].
#[derive(Debug)]
pub struct PlaybackTimer {
    interval: Duration,
    sender: UnboundedSender<PlaybackTick>,
    task: Option<JoinHandle<()>>,
    generation: u64,
}

impl PlaybackTimer {
    pub fn new(interval: Duration) -> (Self, UnboundedReceiver<PlaybackTick>) {
        let (sender, receiver) = unbounded_channel();
        let timer = Self {
            interval,
            sender,
            task: None,
            generation: 0,
        };
        (timer, receiver)
    }

    pub const fn interval(&self) -> Duration {
        self.interval
    }

    pub const fn is_active(&self) -> bool {
        self.task.is_some()
    }

    pub const fn mode(&self) -> PlaybackMode {
        if self.is_active() {
            PlaybackMode::Running
        } else {
            PlaybackMode::Stopped
        }
    }

    /// Starts ticking every interval, replacing any running task.
    pub fn start(&mut self) {
        self.stop();
        self.generation += 1;

        let generation = self.generation;
        let period = self.interval;
        let sender = self.sender.clone();

        self.task = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if sender.send(PlaybackTick { generation }).is_err() {
                    break;
                }
            }
        }));

        tracing::debug!(generation, interval_ms = period.as_millis(), "playback started");
    }

    /// Cancels the running task. Returns whether one was running.
    pub fn stop(&mut self) -> bool {
        let Some(task) = self.task.take() else {
            return false;
        };
        task.abort();
        tracing::debug!(generation = self.generation, "playback stopped");
        true
    }

    pub fn toggle(&mut self) -> PlaybackMode {
        if self.is_active() {
            self.stop();
        } else {
            self.start();
        }
        self.mode()
    }

    /// Whether `tick` belongs to the run that is active right now.
    pub const fn accepts(&self, tick: PlaybackTick) -> bool {
        self.is_active() && tick.generation == self.generation
    }
}

impl Drop for PlaybackTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTERVAL: Duration = Duration::from_millis(1200);

    fn drain(receiver: &mut UnboundedReceiver<PlaybackTick>) -> Vec<PlaybackTick> {
        let mut ticks = Vec::new();
        while let Ok(tick) = receiver.try_recv() {
            ticks.push(tick);
        }
        ticks
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_interval() {
        let (mut timer, mut ticks) = PlaybackTimer::new(INTERVAL);
        timer.start();

        tokio::time::sleep(Duration::from_millis(3700)).await;
        let received = drain(&mut ticks);
        assert_eq!(received.len(), 3);
        assert!(received.iter().all(|tick| timer.accepts(*tick)));
    }

    #[tokio::test(start_paused = true)]
    async fn starting_twice_keeps_a_single_timer() {
        let (mut timer, mut ticks) = PlaybackTimer::new(INTERVAL);
        timer.start();
        timer.start();
        assert!(timer.is_active());

        tokio::time::sleep(Duration::from_millis(3700)).await;
        let received = drain(&mut ticks);
        assert_eq!(received.len(), 3);
        assert!(received.iter().all(|tick| tick.generation == 2));
    }

    #[tokio::test(start_paused = true)]
    async fn stop_cancels_further_ticks() {
        let (mut timer, mut ticks) = PlaybackTimer::new(INTERVAL);
        timer.start();
        tokio::time::sleep(Duration::from_millis(1300)).await;
        assert_eq!(drain(&mut ticks).len(), 1);

        assert!(timer.stop());
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(drain(&mut ticks).is_empty());
        assert_eq!(timer.mode(), PlaybackMode::Stopped);
    }

    #[tokio::test]
    async fn stopping_when_idle_is_a_no_op() {
        let (mut timer, _ticks) = PlaybackTimer::new(INTERVAL);
        assert!(!timer.stop());
        assert!(!timer.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn stale_ticks_are_refused_after_restart() {
        let (mut timer, _ticks) = PlaybackTimer::new(INTERVAL);
        timer.start();
        let old = PlaybackTick { generation: 1 };
        assert!(timer.accepts(old));

        assert_eq!(timer.toggle(), PlaybackMode::Stopped);
        assert!(!timer.accepts(old));
        assert_eq!(timer.toggle(), PlaybackMode::Running);
        assert!(!timer.accepts(old));
        assert!(timer.accepts(PlaybackTick { generation: 2 }));
    }
}
