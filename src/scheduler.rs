//! # Frame Scheduling
//!
//! The simulation clock only knows how to `tick(delta_seconds)`. This module
//! turns a stream of frame timestamps into those deltas and provides a
//! cancellable playback loop on top of a tokio interval.
//!
//! ## Frame Deltas
//! - **First frame**: delta 0, the ticker only records the timestamp
//! - **Steady state**: delta is the time since the previous frame
//! - **Long gaps**: clamped to [`MAX_FRAME_DELTA`] so a stalled or backgrounded
//!   host does not make the moon jump
//! - **Reset**: after a pause the next frame starts from delta 0 again
//!
//! Everything runs on one thread. The playback loop holds the only mutable
//! borrow of the clock for its whole run and performs at most one tick per
//! frame, so no locking is needed.

use crate::clock::SimulationClock;
use log::{debug, info};
use std::ops::ControlFlow;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{interval, Instant, MissedTickBehavior};

/// Largest wall-clock step applied in a single frame, in seconds.
pub const MAX_FRAME_DELTA: f64 = 0.1;

/// Host-driven frame ticker.
///
/// Feed it monotonic timestamps (seconds, any origin) from whatever drives the
/// frames: a GUI toolkit, a terminal loop, or a test.
#[derive(Clone, Debug, Default)]
pub struct FrameTicker {
    last_frame: Option<f64>,
}

impl FrameTicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run exactly one clock tick for a frame at `now_seconds`.
    ///
    /// Returns the delta that was applied. Timestamps going backwards give 0.
    pub fn on_frame(&mut self, now_seconds: f64, clock: &mut SimulationClock) -> f64 {
        let delta = match self.last_frame {
            Some(last) => (now_seconds - last).clamp(0.0, MAX_FRAME_DELTA),
            None => 0.0,
        };
        self.last_frame = Some(now_seconds);
        clock.tick(delta);
        delta
    }

    /// Forget the previous timestamp so a resumed playback starts fresh.
    pub fn reset(&mut self) {
        self.last_frame = None;
    }

    /// True once a frame has been seen since construction or the last reset.
    pub fn is_primed(&self) -> bool {
        self.last_frame.is_some()
    }
}

/// Cancels a running [`Playback`]. Dropping the handle cancels it too.
#[derive(Debug)]
pub struct PlaybackHandle {
    stop: watch::Sender<bool>,
}

impl PlaybackHandle {
    pub fn cancel(&self) {
        self.stop.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.stop.borrow()
    }
}

/// Repeating frame loop that drives a [`SimulationClock`].
#[derive(Debug)]
pub struct Playback {
    ticker: FrameTicker,
    frame_interval: Duration,
    stop: watch::Receiver<bool>,
}

/// Create a playback loop and the handle that stops it.
pub fn playback(frame_interval: Duration) -> (Playback, PlaybackHandle) {
    let (stop_tx, stop_rx) = watch::channel(false);
    let playback = Playback {
        ticker: FrameTicker::new(),
        frame_interval,
        stop: stop_rx,
    };
    (playback, PlaybackHandle { stop: stop_tx })
}

impl Playback {
    pub fn frame_interval(&self) -> Duration {
        self.frame_interval
    }

    /// Run frames until cancelled or until `on_frame` breaks.
    ///
    /// Each frame ticks the clock once if it is playing, otherwise resets the
    /// ticker. `on_frame` then sees the clock and may change it (pause, presets,
    /// slider input) before the next frame. Returns the number of frames run.
    pub async fn run<F>(&mut self, clock: &mut SimulationClock, mut on_frame: F) -> u64
    where
        F: FnMut(&mut SimulationClock) -> ControlFlow<()>,
    {
        let origin = Instant::now();
        let mut frames = interval(self.frame_interval);
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut count = 0u64;

        info!(
            "Playback started ({} ms frames, speed {})",
            self.frame_interval.as_millis(),
            clock.speed()
        );

        loop {
            if *self.stop.borrow() {
                break;
            }

            tokio::select! {
                frame_at = frames.tick() => {
                    if clock.is_playing() {
                        let now = frame_at.duration_since(origin).as_secs_f64();
                        let delta = self.ticker.on_frame(now, clock);
                        debug!("frame {}: +{:.3}s, hour {:.3}", count, delta, clock.hour());
                    } else if self.ticker.is_primed() {
                        debug!("frame {}: paused, ticker reset", count);
                        self.ticker.reset();
                    }

                    count += 1;
                    if on_frame(clock).is_break() {
                        break;
                    }
                }
                changed = self.stop.changed() => {
                    if changed.is_err() || *self.stop.borrow() {
                        break;
                    }
                }
            }
        }

        self.ticker.reset();
        info!("Playback stopped after {} frames", count);
        count
    }
}
