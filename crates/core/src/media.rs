// Media handle wrapping the opaque playback primitive

use crate::speed::PlaybackSpeed;

/// The external engine that actually decodes and renders audio.
///
/// The controller treats it as a black box. Implementations are expected to
/// clamp out-of-range seeks themselves.
pub trait PlaybackPrimitive: Send {
    /// Point the primitive at a new audio source
    fn load_source(&mut self, url: &str);

    /// Start or resume playback
    fn play(&mut self);

    /// Pause playback
    fn pause(&mut self);

    /// Move the playhead (seconds)
    fn set_current_time(&mut self, seconds: f64);

    /// Live playhead position (seconds)
    fn current_time(&self) -> f64;

    /// Total duration in seconds. Non-finite while unknown.
    fn duration(&self) -> f64;

    /// Whether playback reached the end of the stream
    fn ended(&self) -> bool;

    /// Output gain (0.0 - 1.0)
    fn volume(&self) -> f32;

    fn set_volume(&mut self, gain: f32);

    /// Playback rate (1.0 = normal speed)
    fn playback_rate(&self) -> f32;

    fn set_playback_rate(&mut self, rate: f32);
}

/// Thin capability wrapper around at most one primitive.
///
/// Every operation on an unbound handle is a no-op and every read returns
/// `None`. The handle never writes player state: position and playing are
/// derived by the poller.
#[derive(Default)]
pub struct MediaHandle {
    primitive: Option<Box<dyn PlaybackPrimitive>>,
}

impl MediaHandle {
    /// An unbound handle
    pub fn new() -> Self {
        Self { primitive: None }
    }

    pub fn with_primitive(primitive: Box<dyn PlaybackPrimitive>) -> Self {
        Self {
            primitive: Some(primitive),
        }
    }

    /// Attach a primitive, replacing any previous one
    pub fn bind(&mut self, primitive: Box<dyn PlaybackPrimitive>) {
        if self.primitive.is_some() {
            log::warn!("MediaHandle rebound; previous primitive dropped");
        }
        self.primitive = Some(primitive);
    }

    /// Detach and return the primitive
    pub fn unbind(&mut self) -> Option<Box<dyn PlaybackPrimitive>> {
        self.primitive.take()
    }

    pub fn is_bound(&self) -> bool {
        self.primitive.is_some()
    }

    pub fn load_source(&mut self, url: &str) {
        if let Some(p) = self.primitive.as_mut() {
            log::info!("Loading source: {}", url);
            p.load_source(url);
        }
    }

    pub fn play(&mut self) {
        if let Some(p) = self.primitive.as_mut() {
            p.play();
        }
    }

    pub fn pause(&mut self) {
        if let Some(p) = self.primitive.as_mut() {
            p.pause();
        }
    }

    /// Set the playhead. Range clamping is left to the primitive; only
    /// negative and NaN positions are normalized to zero.
    pub fn seek(&mut self, seconds: f64) {
        if let Some(p) = self.primitive.as_mut() {
            let seconds = if seconds.is_nan() || seconds < 0.0 {
                0.0
            } else {
                seconds
            };
            p.set_current_time(seconds);
        }
    }

    /// Write the output gain. Expects `gain` in `[0.0, 1.0]`.
    pub fn set_volume_gain(&mut self, gain: f32) {
        if let Some(p) = self.primitive.as_mut() {
            p.set_volume(gain.clamp(0.0, 1.0));
        }
    }

    pub fn volume_gain(&self) -> Option<f32> {
        self.primitive.as_ref().map(|p| p.volume())
    }

    pub fn set_playback_rate(&mut self, speed: PlaybackSpeed) {
        if let Some(p) = self.primitive.as_mut() {
            p.set_playback_rate(speed.rate());
        }
    }

    pub fn playback_rate(&self) -> Option<f32> {
        self.primitive.as_ref().map(|p| p.playback_rate())
    }

    pub fn current_time(&self) -> Option<f64> {
        self.primitive.as_ref().map(|p| p.current_time())
    }

    /// Duration in seconds, `None` when unbound or not yet known
    pub fn duration(&self) -> Option<f64> {
        self.primitive
            .as_ref()
            .map(|p| p.duration())
            .filter(|d| d.is_finite() && *d > 0.0)
    }

    pub fn ended(&self) -> Option<bool> {
        self.primitive.as_ref().map(|p| p.ended())
    }
}

impl std::fmt::Debug for MediaHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaHandle")
            .field("bound", &self.is_bound())
            .finish()
    }
}
