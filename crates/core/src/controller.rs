// Player controller: intent handlers and poll reconciliation
//
// One controller owns one PlayerState and one MediaHandle. Intent handlers
// write through to the primitive; the poller is the only writer of derived
// position and end-of-stream state.

use crate::callback::{Delivery, ListenerRegistry, PendingEvents, PlayerEvent, PlayerListener};
use crate::media::{MediaHandle, PlaybackPrimitive};
use crate::poller::{PositionPoller, TickOutcome};
use crate::seek::SeekEncoding;
use crate::speed::PlaybackSpeed;
use crate::state::{Anchor, PlayerState, PresentationMode};
use std::sync::Arc;
use std::time::Duration;

/// Highest value on the volume slider
pub const MAX_VOLUME: u8 = 100;

#[derive(Debug)]
pub struct PlayerController {
    mode: PresentationMode,
    state: PlayerState,
    media: MediaHandle,
    poller: PositionPoller,
    listeners: Arc<ListenerRegistry>,
    // When set, events wait in `pending` until the owner releases its lock
    defer_events: bool,
    pending: Vec<(PlayerEvent, Delivery)>,
}

impl PlayerController {
    /// A controller with an unbound media handle
    pub fn new(mode: PresentationMode) -> Self {
        log::debug!("PlayerController::new ({:?})", mode);
        Self {
            mode,
            state: PlayerState::for_mode(mode),
            media: MediaHandle::new(),
            poller: PositionPoller::new(),
            listeners: Arc::new(ListenerRegistry::new()),
            defer_events: false,
            pending: Vec::new(),
        }
    }

    /// Attach the primitive and point it at `src`.
    ///
    /// Volume and rate are write-through, so the current state values are
    /// pushed to the fresh primitive.
    pub fn bind(&mut self, primitive: Box<dyn PlaybackPrimitive>, src: &str) {
        self.media.bind(primitive);
        self.media.load_source(src);
        self.media.set_volume_gain(self.state.volume_gain());
        self.media.set_playback_rate(self.state.rate);
    }

    /// Detach the primitive. Later intents still update state but reach
    /// nothing.
    pub fn unbind(&mut self) -> Option<Box<dyn PlaybackPrimitive>> {
        if self.state.playing {
            self.media.pause();
        }
        self.media.unbind()
    }

    pub fn is_bound(&self) -> bool {
        self.media.is_bound()
    }

    pub fn mode(&self) -> PresentationMode {
        self.mode
    }

    pub fn seek_encoding(&self) -> SeekEncoding {
        self.mode.seek_encoding()
    }

    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    pub fn snapshot(&self) -> PlayerState {
        self.state.clone()
    }

    pub fn media(&self) -> &MediaHandle {
        &self.media
    }

    /// Known duration of the bound source
    pub fn duration(&self) -> Option<f64> {
        self.media.duration()
    }

    /// Position on the slider's own scale
    pub fn slider_value(&self) -> f64 {
        self.seek_encoding()
            .slider_value(self.state.position, self.duration())
    }

    pub fn listeners(&self) -> Arc<ListenerRegistry> {
        self.listeners.clone()
    }

    pub fn add_listener(&self, listener: Arc<dyn PlayerListener>, throttle: Duration) {
        self.listeners.add_listener(listener, throttle);
    }

    /// Queue events instead of delivering them inline. Owners that share the
    /// controller behind a lock turn this on and deliver `take_events()`
    /// after unlocking.
    pub fn defer_events(&mut self, defer: bool) {
        self.defer_events = defer;
    }

    /// Drain the queued events
    pub fn take_events(&mut self) -> PendingEvents {
        PendingEvents::new(self.listeners.clone(), std::mem::take(&mut self.pending))
    }

    fn emit(&mut self, event: PlayerEvent, delivery: Delivery) {
        if self.defer_events {
            self.pending.push((event, delivery));
        } else {
            self.listeners.deliver(&event, delivery);
        }
    }

    fn notify(&mut self, event: PlayerEvent) {
        self.emit(event, Delivery::Throttled);
    }

    // Position jumps the poller will not report again bypass the throttle
    fn notify_now(&mut self, event: PlayerEvent) {
        self.emit(event, Delivery::Immediate);
    }

    fn set_playing(&mut self, playing: bool) {
        if self.state.playing != playing {
            self.state.playing = playing;
            self.notify(PlayerEvent::PlayingChanged { playing });
        }
    }

    /// Play intent. Repeating it while playing only re-sends the request.
    pub fn play(&mut self) {
        log::debug!("play intent");
        self.set_playing(true);
        self.media.play();
    }

    /// Pause intent. Repeating it while paused only re-sends the request.
    pub fn pause(&mut self) {
        log::debug!("pause intent");
        self.set_playing(false);
        self.media.pause();
    }

    /// The single play/pause button
    pub fn toggle_play(&mut self) {
        if self.state.playing {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Seek intent with a raw slider value. Returns false if the value could
    /// not be decoded (percentage before the duration is known).
    pub fn seek(&mut self, slider_value: f64) -> bool {
        let duration = self.duration();
        let Some(position) = self.seek_encoding().to_position(slider_value, duration) else {
            log::debug!("seek to {} dropped: duration unknown", slider_value);
            return false;
        };

        self.state.position = position;
        self.media.seek(position);
        self.notify_now(PlayerEvent::PositionChanged { position, duration });
        true
    }

    /// Volume slider change, 0 - 100. Written through immediately.
    pub fn set_volume(&mut self, volume: u8) {
        let volume = volume.min(MAX_VOLUME);
        self.state.volume = volume;
        self.media.set_volume_gain(volume as f32 / 100.0);
        self.notify(PlayerEvent::VolumeChanged { volume });
    }

    pub fn open_speed_menu(&mut self, anchor: Anchor) {
        let was_open = self.state.speed_menu_open;
        self.state.speed_menu_open = true;
        self.state.speed_menu_anchor = Some(anchor);
        if !was_open {
            self.notify(PlayerEvent::SpeedMenuChanged { open: true });
        }
    }

    pub fn close_speed_menu(&mut self) {
        let was_open = self.state.speed_menu_open;
        self.state.speed_menu_open = false;
        self.state.speed_menu_anchor = None;
        if was_open {
            self.notify(PlayerEvent::SpeedMenuChanged { open: false });
        }
    }

    /// Pick a preset: writes the rate through and dismisses the menu
    pub fn select_speed(&mut self, speed: PlaybackSpeed) {
        log::debug!("select speed {}", speed);
        self.media.set_playback_rate(speed);
        if self.state.rate != speed {
            self.state.rate = speed;
            self.notify(PlayerEvent::RateChanged { rate: speed });
        }
        self.close_speed_menu();
    }

    pub fn set_volume_panel(&mut self, open: bool) {
        if self.state.volume_panel_open != open {
            self.state.volume_panel_open = open;
            self.notify(PlayerEvent::VolumePanelChanged { open });
        }
    }

    pub fn toggle_volume_panel(&mut self) {
        let open = !self.state.volume_panel_open;
        self.set_volume_panel(open);
    }

    pub fn set_panel(&mut self, open: bool) {
        if self.state.panel_open != open {
            self.state.panel_open = open;
            self.notify(PlayerEvent::PanelChanged { open });
        }
    }

    pub fn toggle_panel(&mut self) {
        let open = !self.state.panel_open;
        self.set_panel(open);
    }

    /// One poll tick: reconcile state with the primitive and notify listeners
    pub fn tick(&mut self) -> TickOutcome {
        let outcome = self.poller.tick(&mut self.state, &self.media);
        match outcome {
            TickOutcome::Advanced { to, .. } => {
                let duration = self.media.duration();
                self.notify(PlayerEvent::PositionChanged {
                    position: to,
                    duration,
                });
            }
            TickOutcome::Ended {
                was_playing,
                previous_position,
            } => {
                if was_playing {
                    log::info!("playback ended");
                    self.notify(PlayerEvent::PlayingChanged { playing: false });
                }
                if previous_position != 0.0 {
                    let duration = self.media.duration();
                    self.notify_now(PlayerEvent::PositionChanged {
                        position: 0.0,
                        duration,
                    });
                }
                if outcome.changed() {
                    self.notify(PlayerEvent::PlaybackEnded);
                }
            }
            TickOutcome::Unbound | TickOutcome::Unchanged => {}
        }
        outcome
    }

    /// Ticks run so far
    pub fn ticks(&self) -> u64 {
        self.poller.ticks()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callback::RecordingListener;
    use crate::sim::SimulatedPrimitive;

    fn mounted(mode: PresentationMode, duration: f64) -> (SimulatedPrimitive, PlayerController) {
        let sim = SimulatedPrimitive::new(duration);
        let mut controller = PlayerController::new(mode);
        controller.bind(Box::new(sim.clone()), "https://example.test/a.mp3");
        (sim, controller)
    }

    #[test]
    fn test_bind_loads_source_and_writes_defaults() {
        let (sim, controller) = mounted(PresentationMode::Bar, 60.0);
        assert!(controller.is_bound());
        assert_eq!(sim.source().as_deref(), Some("https://example.test/a.mp3"));
        assert_eq!(controller.media().volume_gain(), Some(1.0));
        assert_eq!(controller.media().playback_rate(), Some(1.0));
    }

    #[test]
    fn test_playing_follows_latest_intent() {
        let (sim, mut controller) = mounted(PresentationMode::Bar, 60.0);
        let intents = [true, false, false, true, true, false, true];
        for want in intents {
            if want {
                controller.play();
            } else {
                controller.pause();
            }
            assert_eq!(controller.state().playing, want);
            assert_eq!(sim.is_playing(), want);
        }
    }

    #[test]
    fn test_redundant_play_only_repeats_request() {
        let (sim, mut controller) = mounted(PresentationMode::Bar, 60.0);
        let recorder = Arc::new(RecordingListener::new());
        controller.add_listener(recorder.clone(), Duration::ZERO);

        controller.play();
        let before = controller.snapshot();
        controller.play();

        assert_eq!(controller.snapshot(), before);
        assert_eq!(sim.play_calls(), 2);
        assert_eq!(
            recorder.count(|e| matches!(e, PlayerEvent::PlayingChanged { .. })),
            1
        );

        controller.pause();
        controller.pause();
        assert!(!controller.state().playing);
        assert_eq!(sim.pause_calls(), 2);
    }

    #[test]
    fn test_toggle_play() {
        let (sim, mut controller) = mounted(PresentationMode::Bar, 60.0);
        controller.toggle_play();
        assert!(controller.state().playing);
        assert!(sim.is_playing());
        controller.toggle_play();
        assert!(!controller.state().playing);
        assert!(!sim.is_playing());
    }

    #[test]
    fn test_end_of_stream_overrides_play_intent() {
        let (sim, mut controller) = mounted(PresentationMode::Bar, 30.0);
        let recorder = Arc::new(RecordingListener::new());
        controller.add_listener(recorder.clone(), Duration::ZERO);

        controller.play();
        sim.advance(Duration::from_secs(12));
        controller.tick();
        assert_eq!(controller.state().position, 12.0);

        sim.advance(Duration::from_secs(60));
        controller.tick();
        assert!(!controller.state().playing);
        assert_eq!(controller.state().position, 0.0);

        controller.tick();
        controller.tick();
        assert_eq!(recorder.count(|e| *e == PlayerEvent::PlaybackEnded), 1);
    }

    fn last_position(recorder: &RecordingListener) -> Option<f64> {
        recorder.events().iter().rev().find_map(|e| match e {
            PlayerEvent::PositionChanged { position, .. } => Some(*position),
            _ => None,
        })
    }

    #[test]
    fn test_paused_seeks_reach_throttled_listener() {
        let (_sim, mut controller) = mounted(PresentationMode::Bar, 300.0);
        let recorder = Arc::new(RecordingListener::new());
        controller.add_listener(recorder.clone(), Duration::from_millis(250));

        controller.seek(10.0);
        controller.seek(120.0);
        for _ in 0..50 {
            controller.tick();
        }

        assert_eq!(controller.state().position, 120.0);
        assert_eq!(last_position(&recorder), Some(120.0));
    }

    #[test]
    fn test_end_of_stream_reset_reaches_throttled_listener() {
        let (sim, mut controller) = mounted(PresentationMode::Bar, 30.0);
        let recorder = Arc::new(RecordingListener::new());
        controller.add_listener(recorder.clone(), Duration::from_secs(10));

        controller.play();
        sim.advance(Duration::from_secs(5));
        controller.tick();
        sim.finish();
        controller.tick();

        assert_eq!(last_position(&recorder), Some(0.0));
    }

    #[test]
    fn test_deferred_events_wait_for_delivery() {
        let (_sim, mut controller) = mounted(PresentationMode::Bar, 60.0);
        let recorder = Arc::new(RecordingListener::new());
        controller.add_listener(recorder.clone(), Duration::ZERO);
        controller.defer_events(true);

        controller.play();
        controller.set_volume(40);
        assert!(recorder.events().is_empty());

        let pending = controller.take_events();
        assert_eq!(pending.len(), 2);
        pending.deliver();
        assert_eq!(
            recorder.events(),
            vec![
                PlayerEvent::PlayingChanged { playing: true },
                PlayerEvent::VolumeChanged { volume: 40 },
            ]
        );
        assert!(controller.take_events().is_empty());
    }

    #[test]
    fn test_volume_round_trip() {
        let (_sim, mut controller) = mounted(PresentationMode::Bar, 60.0);
        for v in [0u8, 1, 33, 50, 99, 100] {
            controller.set_volume(v);
            assert_eq!(controller.state().volume, v);
            assert_eq!(controller.media().volume_gain(), Some(v as f32 / 100.0));
        }
        controller.set_volume(250);
        assert_eq!(controller.state().volume, 100);
    }

    #[test]
    fn test_select_speed_closes_menu() {
        let (_sim, mut controller) = mounted(PresentationMode::Bar, 60.0);
        controller.open_speed_menu(Anchor { x: 10.0, y: 4.0 });
        assert!(controller.state().speed_menu_open);
        assert!(controller.state().speed_menu_anchor.is_some());

        controller.select_speed(PlaybackSpeed::OneAndThreeQuarters);
        assert_eq!(controller.media().playback_rate(), Some(1.75));
        assert_eq!(controller.state().rate, PlaybackSpeed::OneAndThreeQuarters);
        assert!(!controller.state().speed_menu_open);
        assert!(controller.state().speed_menu_anchor.is_none());
    }

    #[test]
    fn test_percent_seek_in_drawer() {
        let (sim, mut controller) = mounted(PresentationMode::Drawer, 200.0);
        controller.play();
        assert!(controller.seek(50.0));
        assert_eq!(controller.state().position, 100.0);
        assert_eq!(sim.current_time_secs(), 100.0);
        assert!(controller.state().playing);
        assert_eq!(controller.slider_value(), 50.0);
    }

    #[test]
    fn test_absolute_seek_in_bar() {
        let (sim, mut controller) = mounted(PresentationMode::Bar, 200.0);
        assert!(controller.seek(50.0));
        assert_eq!(controller.state().position, 50.0);
        assert_eq!(sim.current_time_secs(), 50.0);
        assert!(!controller.state().playing);
    }

    #[test]
    fn test_percent_seek_before_duration_known() {
        let (sim, mut controller) = mounted(PresentationMode::Drawer, f64::NAN);
        assert!(!controller.seek(50.0));
        assert_eq!(controller.state().position, 0.0);
        assert_eq!(sim.seek_calls(), 0);
    }

    #[test]
    fn test_panel_toggles() {
        let (_sim, mut controller) = mounted(PresentationMode::Drawer, 60.0);
        assert!(controller.state().volume_panel_open);
        controller.toggle_volume_panel();
        assert!(!controller.state().volume_panel_open);
        controller.toggle_panel();
        assert!(controller.state().panel_open);
        controller.set_panel(false);
        assert!(!controller.state().panel_open);
    }

    #[test]
    fn test_unbound_controller_never_fails() {
        let mut controller = PlayerController::new(PresentationMode::Bar);
        controller.play();
        controller.seek(10.0);
        controller.set_volume(20);
        controller.select_speed(PlaybackSpeed::Half);
        assert_eq!(controller.tick(), TickOutcome::Unbound);
        assert!(controller.state().playing);
        assert_eq!(controller.state().volume, 20);
    }

    #[test]
    fn test_unbind_pauses_primitive() {
        let (sim, mut controller) = mounted(PresentationMode::Bar, 60.0);
        controller.play();
        assert!(controller.unbind().is_some());
        assert!(!sim.is_playing());
        controller.play();
        assert_eq!(sim.play_calls(), 1);
    }
}
