// Position polling
//
// The primitive's own progress notifications are too coarse to drive a
// slider, so the controller samples it on a short fixed period instead.

use crate::error::Result;
use crate::media::MediaHandle;
use crate::state::PlayerState;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Default sampling period
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Result of one poll tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// No primitive attached; nothing read
    Unbound,
    /// End-of-stream observed; position reset and playing cleared
    Ended {
        was_playing: bool,
        previous_position: f64,
    },
    /// Live position differed from the cache and was copied over
    Advanced { from: f64, to: f64 },
    /// Cache already matched the primitive
    Unchanged,
}

impl TickOutcome {
    /// Whether this tick changed the state
    pub fn changed(&self) -> bool {
        match self {
            TickOutcome::Unbound | TickOutcome::Unchanged => false,
            TickOutcome::Advanced { .. } => true,
            TickOutcome::Ended {
                was_playing,
                previous_position,
            } => *was_playing || *previous_position != 0.0,
        }
    }
}

/// Reconciles `PlayerState` with the primitive's ground truth.
///
/// Only position and playing are derived here. Volume and rate are
/// write-through and never polled.
#[derive(Debug, Default)]
pub struct PositionPoller {
    ticks: u64,
}

impl PositionPoller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of ticks run so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn tick(&mut self, state: &mut PlayerState, media: &MediaHandle) -> TickOutcome {
        self.ticks += 1;

        let (Some(ended), Some(live)) = (media.ended(), media.current_time()) else {
            return TickOutcome::Unbound;
        };

        if ended {
            let outcome = TickOutcome::Ended {
                was_playing: state.playing,
                previous_position: state.position,
            };
            state.position = 0.0;
            state.playing = false;
            return outcome;
        }

        // Some engines report NaN before metadata arrives
        if !live.is_finite() {
            return TickOutcome::Unchanged;
        }
        let live = live.max(0.0);

        if live != state.position {
            let from = state.position;
            state.position = live;
            return TickOutcome::Advanced { from, to: live };
        }

        TickOutcome::Unchanged
    }
}

/// Cancellable recurring task running a tick closure at a fixed period.
///
/// Started once, stopped once. `Drop` stops and joins the thread so a
/// discarded task can never keep ticking against a detached primitive.
pub struct PollerTask {
    interval: Duration,
    stop_flag: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl PollerTask {
    pub fn spawn<F>(interval: Duration, mut tick: F) -> Result<Self>
    where
        F: FnMut() + Send + 'static,
    {
        let stop_flag = Arc::new(AtomicBool::new(false));
        let stop = stop_flag.clone();

        log::info!("[poller] starting with period {:?}", interval);
        let handle = thread::Builder::new()
            .name("mps-position-poller".to_string())
            .spawn(move || {
                while !stop.load(Ordering::SeqCst) {
                    thread::sleep(interval);
                    if stop.load(Ordering::SeqCst) {
                        break;
                    }
                    tick();
                }
                log::debug!("[poller] loop exited");
            })?;

        Ok(Self {
            interval,
            stop_flag,
            handle: Some(handle),
        })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Stop the task and wait for the in-flight tick to finish. Idempotent.
    pub fn stop(&mut self) {
        self.stop_flag.store(true, Ordering::SeqCst);

        let Some(handle) = self.handle.take() else {
            return;
        };
        // Stopping from inside a tick cannot join its own thread; the flag
        // alone ends the loop once the tick returns.
        if handle.thread().id() == thread::current().id() {
            return;
        }
        if handle.join().is_err() {
            log::error!("[poller] tick thread panicked");
        }
        log::info!("[poller] stopped");
    }
}

impl Drop for PollerTask {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for PollerTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollerTask")
            .field("interval", &self.interval)
            .field("running", &self.is_running())
            .finish()
    }
}
