// Listener mechanism for player state changes
// Position updates arrive every poll tick, so they are throttled per listener

use crate::speed::PlaybackSpeed;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Player event types
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    /// Playing flag flipped (by an intent or by end-of-stream)
    PlayingChanged { playing: bool },

    /// Cached position moved
    PositionChanged { position: f64, duration: Option<f64> },

    /// The poller observed end-of-stream
    PlaybackEnded,

    /// Volume changed (0 - 100)
    VolumeChanged { volume: u8 },

    /// Playback rate changed
    RateChanged { rate: PlaybackSpeed },

    /// Speed menu opened or closed
    SpeedMenuChanged { open: bool },

    /// Volume panel shown or hidden
    VolumePanelChanged { open: bool },

    /// Drawer panel expanded or collapsed
    PanelChanged { open: bool },
}

/// Player listener trait
///
/// Events are delivered after the controller lock is released, so a listener
/// may read player state. Calling intents from inside `on_event` is allowed
/// but their events arrive in a later batch.
pub trait PlayerListener: Send + Sync {
    fn on_event(&self, event: &PlayerEvent);
}

/// How an event reaches throttled listeners
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Position events may be dropped inside the listener's throttle window
    Throttled,
    /// Always delivered; used for jumps the poller will not report again
    Immediate,
}

/// Throttled listener wrapper
pub struct ThrottledListener {
    inner: Arc<dyn PlayerListener>,
    last_position_update: Mutex<Option<Instant>>,
    position_update_interval: Duration,
}

impl ThrottledListener {
    pub fn new(listener: Arc<dyn PlayerListener>, update_interval: Duration) -> Self {
        Self {
            inner: listener,
            last_position_update: Mutex::new(None),
            position_update_interval: update_interval,
        }
    }

    pub fn dispatch(&self, event: &PlayerEvent) {
        self.deliver(event, Delivery::Throttled);
    }

    pub fn deliver(&self, event: &PlayerEvent, delivery: Delivery) {
        match event {
            PlayerEvent::PositionChanged { .. } => {
                let mut last_update = self.last_position_update.lock();
                let due = delivery == Delivery::Immediate
                    || last_update
                        .map(|t| t.elapsed() >= self.position_update_interval)
                        .unwrap_or(true);
                if due {
                    *last_update = Some(Instant::now());
                    drop(last_update);
                    self.inner.on_event(event);
                }
            }
            _ => self.inner.on_event(event),
        }
    }
}

/// Registry of listeners attached to one controller
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: Mutex<Vec<Arc<ThrottledListener>>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(&self, listener: Arc<dyn PlayerListener>, throttle: Duration) {
        self.listeners
            .lock()
            .push(Arc::new(ThrottledListener::new(listener, throttle)));
    }

    pub fn clear(&self) {
        self.listeners.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.listeners.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dispatch(&self, event: PlayerEvent) {
        self.deliver(&event, Delivery::Throttled);
    }

    pub fn deliver(&self, event: &PlayerEvent, delivery: Delivery) {
        log::trace!("dispatch {:?} ({:?})", event, delivery);
        // Snapshot so a listener may register another without deadlocking
        let listeners = self.listeners.lock().clone();
        for listener in listeners {
            listener.deliver(event, delivery);
        }
    }
}

/// Events queued while the controller was locked, delivered once it is not
#[derive(Debug)]
pub struct PendingEvents {
    listeners: Arc<ListenerRegistry>,
    events: Vec<(PlayerEvent, Delivery)>,
}

impl PendingEvents {
    pub fn new(listeners: Arc<ListenerRegistry>, events: Vec<(PlayerEvent, Delivery)>) -> Self {
        Self { listeners, events }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Hand every queued event to the listeners, in order
    pub fn deliver(self) {
        for (event, delivery) in &self.events {
            self.listeners.deliver(event, *delivery);
        }
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.len())
            .finish()
    }
}

/// Listener that records every event, for tests
#[cfg(test)]
pub(crate) struct RecordingListener {
    events: Mutex<Vec<PlayerEvent>>,
}

#[cfg(test)]
impl RecordingListener {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn events(&self) -> Vec<PlayerEvent> {
        self.events.lock().clone()
    }

    pub fn count(&self, pred: impl Fn(&PlayerEvent) -> bool) -> usize {
        self.events.lock().iter().filter(|e| pred(e)).count()
    }
}

#[cfg(test)]
impl PlayerListener for RecordingListener {
    fn on_event(&self, event: &PlayerEvent) {
        self.events.lock().push(event.clone());
    }
}
