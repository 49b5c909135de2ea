// In-memory playback primitive
//
// Behaves like a media element without producing sound: the playhead only
// moves when `advance` is called. Used by hosts that drive their own clock
// and by tests.

use crate::media::PlaybackPrimitive;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug)]
struct SimInner {
    source: Option<String>,
    current_time: f64,
    duration: f64,
    ended: bool,
    playing: bool,
    volume: f32,
    rate: f32,
    play_calls: u32,
    pause_calls: u32,
    seek_calls: u32,
}

/// Clock-driven primitive. Clones share the same underlying element, so a
/// test can keep one clone for inspection after handing another to a
/// `MediaHandle`.
#[derive(Debug, Clone)]
pub struct SimulatedPrimitive {
    inner: Arc<Mutex<SimInner>>,
}

impl SimulatedPrimitive {
    /// Create a primitive holding a stream of `duration` seconds.
    /// Pass a non-finite value for "duration unknown".
    pub fn new(duration: f64) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SimInner {
                source: None,
                current_time: 0.0,
                duration,
                ended: false,
                playing: false,
                volume: 1.0,
                rate: 1.0,
                play_calls: 0,
                pause_calls: 0,
                seek_calls: 0,
            })),
        }
    }

    /// Advance the playhead by `elapsed` wall time, scaled by the playback rate.
    /// Reaching the duration stops playback and raises the ended flag.
    pub fn advance(&self, elapsed: Duration) {
        let mut inner = self.inner.lock();
        if !inner.playing {
            return;
        }
        let next = inner.current_time + elapsed.as_secs_f64() * inner.rate as f64;
        if inner.duration.is_finite() && next >= inner.duration {
            inner.current_time = inner.duration;
            inner.ended = true;
            inner.playing = false;
        } else {
            inner.current_time = next;
        }
    }

    /// Jump straight to the end of the stream
    pub fn finish(&self) {
        let mut inner = self.inner.lock();
        if inner.duration.is_finite() {
            inner.current_time = inner.duration;
        }
        inner.ended = true;
        inner.playing = false;
    }

    /// Duration becomes known (metadata arrived)
    pub fn set_duration(&self, duration: f64) {
        self.inner.lock().duration = duration;
    }

    pub fn is_playing(&self) -> bool {
        self.inner.lock().playing
    }

    pub fn current_time_secs(&self) -> f64 {
        self.inner.lock().current_time
    }

    pub fn source(&self) -> Option<String> {
        self.inner.lock().source.clone()
    }

    pub fn play_calls(&self) -> u32 {
        self.inner.lock().play_calls
    }

    pub fn pause_calls(&self) -> u32 {
        self.inner.lock().pause_calls
    }

    pub fn seek_calls(&self) -> u32 {
        self.inner.lock().seek_calls
    }
}

impl PlaybackPrimitive for SimulatedPrimitive {
    fn load_source(&mut self, url: &str) {
        let mut inner = self.inner.lock();
        inner.source = Some(url.to_string());
        inner.current_time = 0.0;
        inner.ended = false;
        inner.playing = false;
    }

    fn play(&mut self) {
        let mut inner = self.inner.lock();
        inner.play_calls += 1;
        if inner.ended {
            // A finished element restarts from the top
            inner.current_time = 0.0;
            inner.ended = false;
        }
        inner.playing = true;
    }

    fn pause(&mut self) {
        let mut inner = self.inner.lock();
        inner.pause_calls += 1;
        inner.playing = false;
    }

    fn set_current_time(&mut self, seconds: f64) {
        let mut inner = self.inner.lock();
        inner.seek_calls += 1;
        let mut target = seconds.max(0.0);
        if inner.duration.is_finite() {
            target = target.min(inner.duration);
        }
        inner.current_time = target;
        inner.ended = inner.duration.is_finite() && target >= inner.duration;
    }

    fn current_time(&self) -> f64 {
        self.inner.lock().current_time
    }

    fn duration(&self) -> f64 {
        self.inner.lock().duration
    }

    fn ended(&self) -> bool {
        self.inner.lock().ended
    }

    fn volume(&self) -> f32 {
        self.inner.lock().volume
    }

    fn set_volume(&mut self, gain: f32) {
        self.inner.lock().volume = gain;
    }

    fn playback_rate(&self) -> f32 {
        self.inner.lock().rate
    }

    fn set_playback_rate(&mut self, rate: f32) {
        self.inner.lock().rate = rate;
    }
}
