use mps_config::{HostConfig, OverrideChain, SourceOrigin, StaticOverrides, DEFAULT_SOURCE};
use mps_core::{
    Anchor, PlaybackPrimitive, PlaybackSpeed, PlayerController, PlayerEvent, PlayerListener,
    SimulatedPrimitive,
};
use mps_i18n::{DirLanguageSource, EmbeddedLanguageSource, LabelKey, LoadStatus};
use mps_player::Player;
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

// Generous relative to the 10 ms poll period
const SETTLE: Duration = Duration::from_millis(100);

fn mount(
    config: &HostConfig,
    chain: &OverrideChain,
    duration: f64,
) -> (SimulatedPrimitive, Player) {
    let sim = SimulatedPrimitive::new(duration);
    let player = Player::mount(
        config,
        chain,
        Box::new(sim.clone()),
        Arc::new(EmbeddedLanguageSource),
    )
    .unwrap();
    (sim, player)
}

#[test]
fn test_mount_binds_resolved_source() {
    let config = HostConfig {
        src: Some("host.mp3".to_string()),
        ..HostConfig::default()
    };
    let chain = OverrideChain::new()
        .push(StaticOverrides::new("page"))
        .push(StaticOverrides::new("parent").with_source("parent.mp3"));

    let (sim, player) = mount(&config, &chain, 60.0);
    assert_eq!(sim.source().as_deref(), Some("parent.mp3"));
    assert_eq!(player.source().origin, SourceOrigin::Override("parent".to_string()));
    assert!(player.is_mounted());
}

#[test]
fn test_mount_without_any_source_uses_sample() {
    let (sim, player) = mount(&HostConfig::default(), &OverrideChain::new(), 60.0);
    assert_eq!(sim.source().as_deref(), Some(DEFAULT_SOURCE));
    assert_eq!(player.source().origin, SourceOrigin::Default);
}

#[test]
fn test_poller_tracks_position() {
    let (sim, player) = mount(&HostConfig::default(), &OverrideChain::new(), 300.0);

    player.with_controller(|c| c.play());
    sim.advance(Duration::from_secs(42));
    thread::sleep(SETTLE);
    assert_eq!(player.state().position, 42.0);

    sim.advance(Duration::from_secs(3));
    thread::sleep(SETTLE);
    assert_eq!(player.state().position, 45.0);
    assert!(player.state().playing);
}

#[test]
fn test_poller_observes_end_of_stream() {
    let (sim, player) = mount(&HostConfig::default(), &OverrideChain::new(), 30.0);

    player.with_controller(|c| c.play());
    sim.advance(Duration::from_secs(10));
    thread::sleep(SETTLE);
    sim.finish();
    thread::sleep(SETTLE);

    let state = player.state();
    assert!(!state.playing);
    assert_eq!(state.position, 0.0);

    // A new play cycle starts from the top
    player.with_controller(|c| c.play());
    assert!(sim.is_playing());
    assert_eq!(sim.current_time_secs(), 0.0);
}

#[test]
fn test_unmount_stops_polling() {
    let (sim, mut player) = mount(&HostConfig::default(), &OverrideChain::new(), 30.0);
    thread::sleep(SETTLE);

    player.unmount();
    assert!(!player.is_mounted());
    let controller = player.controller();
    let ticks = controller.lock().ticks();
    assert!(ticks > 0);
    assert!(!controller.lock().is_bound());

    thread::sleep(SETTLE);
    assert_eq!(controller.lock().ticks(), ticks);

    // Intents after teardown reach nothing
    player.with_controller(|c| c.play());
    assert_eq!(sim.play_calls(), 0);

    player.unmount();
}

#[test]
fn test_drawer_seek_and_snapshot() {
    let config = HostConfig::from_json(r#"{ "useDrawer": true }"#).unwrap();
    let (sim, player) = mount(&config, &OverrideChain::new(), 200.0);

    let snapshot = player.snapshot();
    assert!(snapshot.state.volume_panel_open);
    assert_eq!(snapshot.slider_max, 100.0);

    player.with_controller(|c| c.seek(50.0));
    assert_eq!(sim.current_time_secs(), 100.0);
    thread::sleep(SETTLE);

    let snapshot = player.snapshot();
    assert_eq!(snapshot.state.position, 100.0);
    assert_eq!(snapshot.slider_value, 50.0);
    assert_eq!(snapshot.duration, Some(200.0));
}

#[test]
fn test_speed_and_volume_intents() {
    let (sim, player) = mount(&HostConfig::default(), &OverrideChain::new(), 60.0);

    player.with_controller(|c| {
        c.open_speed_menu(Anchor { x: 0.0, y: 0.0 });
        c.select_speed(PlaybackSpeed::OneAndThreeQuarters);
        c.set_volume(35);
    });

    let state = player.state();
    assert!(!state.speed_menu_open);
    assert_eq!(state.rate, PlaybackSpeed::OneAndThreeQuarters);
    assert_eq!(state.volume, 35);

    assert_eq!(sim.playback_rate(), 1.75);
    assert_eq!(sim.volume(), 0.35);
}

#[test]
fn test_language_override_loads_labels() {
    let chain = OverrideChain::new().push(StaticOverrides::new("page").with_language("fr-ca"));
    let (_sim, mut player) = mount(&HostConfig::default(), &chain, 60.0);

    assert_eq!(player.wait_for_labels(), LoadStatus::Loaded);
    assert_eq!(player.locale().code, "fr-ca");
    assert_eq!(player.toggle_label().as_deref(), Some("Lire l'audio"));

    player.with_controller(|c| c.play());
    assert_eq!(
        player.toggle_label().as_deref(),
        Some("Mettre l'audio en pause")
    );
}

#[test]
fn test_unsupported_language_falls_back() {
    let chain = OverrideChain::new().push(StaticOverrides::new("page").with_language("xx"));
    let (_sim, mut player) = mount(&HostConfig::default(), &chain, 60.0);

    assert_eq!(player.locale().code, "en");
    assert_eq!(player.wait_for_labels(), LoadStatus::Loaded);
    assert_eq!(player.label(LabelKey::Volume).as_deref(), Some("Volume"));
}

#[test]
fn test_missing_language_file_uses_builtin_labels() {
    let missing = std::env::temp_dir().join(format!("mps-player-missing-{}", std::process::id()));
    let sim = SimulatedPrimitive::new(60.0);
    let mut player = Player::mount(
        &HostConfig::default(),
        &OverrideChain::new(),
        Box::new(sim),
        Arc::new(DirLanguageSource::new(missing)),
    )
    .unwrap();

    assert_eq!(player.wait_for_labels(), LoadStatus::Fallback);
    assert_eq!(player.label(LabelKey::Play).as_deref(), Some("Play"));

    // Playback is unaffected by the localization failure
    player.with_controller(|c| c.play());
    assert!(player.state().playing);
}

/// Reads the controller back from inside its callback, as a reactive UI would
struct StateReader {
    controller: Arc<Mutex<PlayerController>>,
    positions: Mutex<Vec<f64>>,
}

impl PlayerListener for StateReader {
    fn on_event(&self, event: &PlayerEvent) {
        if let PlayerEvent::PositionChanged { .. } = event {
            let position = self.controller.lock().state().position;
            self.positions.lock().push(position);
        }
    }
}

#[test]
fn test_listener_can_read_state() {
    let (sim, player) = mount(&HostConfig::default(), &OverrideChain::new(), 300.0);
    let reader = Arc::new(StateReader {
        controller: player.controller(),
        positions: Mutex::new(Vec::new()),
    });
    player.add_listener(reader.clone(), Duration::ZERO);

    player.with_controller(|c| c.play());
    sim.advance(Duration::from_secs(2));
    thread::sleep(SETTLE);
    player.with_controller(|c| c.seek(7.0));
    thread::sleep(SETTLE);

    let positions = reader.positions.lock().clone();
    assert!(positions.contains(&2.0));
    assert_eq!(positions.last(), Some(&7.0));
    assert_eq!(player.state().position, 7.0);
}
