// C ABI for embedding hosts
//
// The host owns the playback primitive and hands it over as a table of
// callbacks. Players live in a process-wide registry keyed by id.

use mps_config::HostConfig;
use mps_core::{Anchor, PlaybackPrimitive, PlaybackSpeed, PlayerError, Result};
use mps_i18n::LabelKey;
use mps_player::Player;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::ffi::{c_void, CStr, CString};
use std::os::raw::c_char;
use std::sync::Once;

/// Callbacks into the host's playback primitive.
///
/// Every entry is optional. Missing setters are no-ops; missing getters
/// report a stopped element with unknown duration.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct MpsPrimitiveVTable {
    pub user_data: *mut c_void,
    pub load_source: Option<extern "C" fn(*mut c_void, *const c_char)>,
    pub play: Option<extern "C" fn(*mut c_void)>,
    pub pause: Option<extern "C" fn(*mut c_void)>,
    pub set_current_time: Option<extern "C" fn(*mut c_void, f64)>,
    pub current_time: Option<extern "C" fn(*mut c_void) -> f64>,
    pub duration: Option<extern "C" fn(*mut c_void) -> f64>,
    pub ended: Option<extern "C" fn(*mut c_void) -> bool>,
    pub volume: Option<extern "C" fn(*mut c_void) -> f32>,
    pub set_volume: Option<extern "C" fn(*mut c_void, f32)>,
    pub playback_rate: Option<extern "C" fn(*mut c_void) -> f32>,
    pub set_playback_rate: Option<extern "C" fn(*mut c_void, f32)>,
    /// Called once when the player lets go of the primitive
    pub release: Option<extern "C" fn(*mut c_void)>,
}

/// Host primitive reached through the callback table
struct HostPrimitive {
    vtable: MpsPrimitiveVTable,
}

// The host guarantees its callbacks may be invoked from the poller thread.
unsafe impl Send for HostPrimitive {}

impl PlaybackPrimitive for HostPrimitive {
    fn load_source(&mut self, url: &str) {
        let Some(f) = self.vtable.load_source else {
            return;
        };
        match CString::new(url) {
            Ok(c_url) => f(self.vtable.user_data, c_url.as_ptr()),
            Err(e) => log::error!("Source URL contains NUL: {}", e),
        }
    }

    fn play(&mut self) {
        if let Some(f) = self.vtable.play {
            f(self.vtable.user_data);
        }
    }

    fn pause(&mut self) {
        if let Some(f) = self.vtable.pause {
            f(self.vtable.user_data);
        }
    }

    fn set_current_time(&mut self, seconds: f64) {
        if let Some(f) = self.vtable.set_current_time {
            f(self.vtable.user_data, seconds);
        }
    }

    fn current_time(&self) -> f64 {
        self.vtable
            .current_time
            .map_or(0.0, |f| f(self.vtable.user_data))
    }

    fn duration(&self) -> f64 {
        self.vtable
            .duration
            .map_or(f64::NAN, |f| f(self.vtable.user_data))
    }

    fn ended(&self) -> bool {
        self.vtable.ended.map_or(false, |f| f(self.vtable.user_data))
    }

    fn volume(&self) -> f32 {
        self.vtable.volume.map_or(1.0, |f| f(self.vtable.user_data))
    }

    fn set_volume(&mut self, gain: f32) {
        if let Some(f) = self.vtable.set_volume {
            f(self.vtable.user_data, gain);
        }
    }

    fn playback_rate(&self) -> f32 {
        self.vtable
            .playback_rate
            .map_or(1.0, |f| f(self.vtable.user_data))
    }

    fn set_playback_rate(&mut self, rate: f32) {
        if let Some(f) = self.vtable.set_playback_rate {
            f(self.vtable.user_data, rate);
        }
    }
}

impl Drop for HostPrimitive {
    fn drop(&mut self) {
        if let Some(f) = self.vtable.release {
            f(self.vtable.user_data);
        }
    }
}

static PLAYER_REGISTRY: Lazy<Mutex<HashMap<i64, Player>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));
static NEXT_PLAYER_ID: Lazy<Mutex<i64>> = Lazy::new(|| Mutex::new(1));
static INIT_LOGGER: Once = Once::new();

fn init_logging() {
    INIT_LOGGER.call_once(|| {
        let _ = env_logger::builder()
            .is_test(false)
            .filter_level(log::LevelFilter::Info)
            .parse_default_env()
            .try_init();
    });
}

fn register_player(player: Player) -> i64 {
    let mut next = NEXT_PLAYER_ID.lock();
    let id = *next;
    *next += 1;
    drop(next);

    PLAYER_REGISTRY.lock().insert(id, player);
    id
}

fn with_player<R>(id: i64, f: impl FnOnce(&Player) -> Result<R>) -> Result<R> {
    let registry = PLAYER_REGISTRY.lock();
    let player = registry
        .get(&id)
        .ok_or_else(|| PlayerError::InvalidState(format!("Invalid player ID: {}", id)))?;
    f(player)
}

fn to_code(result: Result<()>) -> i32 {
    match result {
        Ok(_) => 0,
        Err(err) => {
            log::error!("FFI error: {}", err);
            -1
        }
    }
}

/// Read an optional C string. Null maps to `None`.
unsafe fn opt_str<'a>(ptr: *const c_char) -> Result<Option<&'a str>> {
    if ptr.is_null() {
        return Ok(None);
    }
    CStr::from_ptr(ptr)
        .to_str()
        .map(Some)
        .map_err(|e| PlayerError::Ffi(format!("Invalid UTF-8: {}", e)))
}

fn into_c_string(s: String) -> *mut c_char {
    match CString::new(s) {
        Ok(c) => c.into_raw(),
        Err(e) => {
            log::error!("String contains NUL: {}", e);
            std::ptr::null_mut()
        }
    }
}

fn create(config_json: *const c_char, vtable: MpsPrimitiveVTable) -> Result<i64> {
    let config = match unsafe { opt_str(config_json) }? {
        Some(json) => HostConfig::from_json(json)?,
        None => HostConfig::default(),
    };
    let player = Player::mount_with_config(&config, Box::new(HostPrimitive { vtable }))?;
    Ok(register_player(player))
}

// -------------------------------
// C ABI
// -------------------------------

/// Mount a player over the host primitive.
/// `config_json` may be null. Returns: player ID (>0) on success, -1 on error
#[no_mangle]
pub extern "C" fn mps_player_create(
    config_json: *const c_char,
    vtable: MpsPrimitiveVTable,
) -> i64 {
    init_logging();
    match create(config_json, vtable) {
        Ok(id) => {
            log::info!("Created player with ID: {}", id);
            id
        }
        Err(e) => {
            log::error!("Failed to create player: {}", e);
            -1
        }
    }
}

#[no_mangle]
pub extern "C" fn mps_player_play(player_id: i64) -> i32 {
    to_code(with_player(player_id, |p| Ok(p.with_controller(|c| c.play()))))
}

#[no_mangle]
pub extern "C" fn mps_player_pause(player_id: i64) -> i32 {
    to_code(with_player(player_id, |p| Ok(p.with_controller(|c| c.pause()))))
}

#[no_mangle]
pub extern "C" fn mps_player_toggle_play(player_id: i64) -> i32 {
    to_code(with_player(player_id, |p| {
        Ok(p.with_controller(|c| c.toggle_play()))
    }))
}

/// Seek with a raw slider value (seconds for the bar, percent for the drawer).
/// Returns: 0 if applied, 1 if dropped (duration unknown), -1 on error
#[no_mangle]
pub extern "C" fn mps_player_seek(player_id: i64, slider_value: f64) -> i32 {
    match with_player(player_id, |p| Ok(p.with_controller(|c| c.seek(slider_value)))) {
        Ok(true) => 0,
        Ok(false) => 1,
        Err(e) => {
            log::error!("FFI error: {}", e);
            -1
        }
    }
}

/// Volume on the 0 - 100 scale
#[no_mangle]
pub extern "C" fn mps_player_set_volume(player_id: i64, volume: i32) -> i32 {
    let volume = volume.clamp(0, 100) as u8;
    to_code(with_player(player_id, |p| {
        Ok(p.with_controller(|c| c.set_volume(volume)))
    }))
}

/// Select a speed preset by its rate. Off-preset rates are rejected.
#[no_mangle]
pub extern "C" fn mps_player_select_speed(player_id: i64, rate: f32) -> i32 {
    to_code(with_player(player_id, |p| {
        let speed = PlaybackSpeed::from_rate(rate)
            .ok_or_else(|| PlayerError::InvalidState(format!("Unsupported rate: {}", rate)))?;
        p.with_controller(|c| c.select_speed(speed));
        Ok(())
    }))
}

#[no_mangle]
pub extern "C" fn mps_player_open_speed_menu(
    player_id: i64,
    anchor_x: f32,
    anchor_y: f32,
) -> i32 {
    let anchor = Anchor {
        x: anchor_x,
        y: anchor_y,
    };
    to_code(with_player(player_id, |p| {
        Ok(p.with_controller(|c| c.open_speed_menu(anchor)))
    }))
}

#[no_mangle]
pub extern "C" fn mps_player_close_speed_menu(player_id: i64) -> i32 {
    to_code(with_player(player_id, |p| {
        Ok(p.with_controller(|c| c.close_speed_menu()))
    }))
}

#[no_mangle]
pub extern "C" fn mps_player_toggle_volume_panel(player_id: i64) -> i32 {
    to_code(with_player(player_id, |p| {
        Ok(p.with_controller(|c| c.toggle_volume_panel()))
    }))
}

#[no_mangle]
pub extern "C" fn mps_player_toggle_panel(player_id: i64) -> i32 {
    to_code(with_player(player_id, |p| {
        Ok(p.with_controller(|c| c.toggle_panel()))
    }))
}

/// Cached position in seconds, -1 on error
#[no_mangle]
pub extern "C" fn mps_player_get_position(player_id: i64) -> f64 {
    match with_player(player_id, |p| Ok(p.state().position)) {
        Ok(pos) => pos,
        Err(err) => {
            log::error!("Failed to get position: {}", err);
            -1.0
        }
    }
}

/// Returns: 1 playing, 0 not playing, -1 on error
#[no_mangle]
pub extern "C" fn mps_player_is_playing(player_id: i64) -> i32 {
    match with_player(player_id, |p| Ok(p.state().playing)) {
        Ok(playing) => playing as i32,
        Err(err) => {
            log::error!("Failed to get state: {}", err);
            -1
        }
    }
}

/// Full snapshot as JSON. Free with `mps_string_free`. Null on error.
#[no_mangle]
pub extern "C" fn mps_player_state_json(player_id: i64) -> *mut c_char {
    let json = with_player(player_id, |p| {
        serde_json::to_string(&p.snapshot()).map_err(PlayerError::from)
    });
    match json {
        Ok(json) => into_c_string(json),
        Err(err) => {
            log::error!("Failed to serialize state: {}", err);
            std::ptr::null_mut()
        }
    }
}

/// Label text for a resource key. Null while loading, for unknown keys, or on
/// error. Free with `mps_string_free`.
#[no_mangle]
pub extern "C" fn mps_player_label(player_id: i64, key: *const c_char) -> *mut c_char {
    let label = with_player(player_id, |p| {
        let key = unsafe { opt_str(key) }?
            .ok_or_else(|| PlayerError::Ffi("Null label key".to_string()))?;
        Ok(LabelKey::from_key(key).and_then(|k| p.label(k)))
    });
    match label {
        Ok(Some(text)) => into_c_string(text),
        Ok(None) => std::ptr::null_mut(),
        Err(err) => {
            log::error!("Failed to get label: {}", err);
            std::ptr::null_mut()
        }
    }
}

/// Release a string returned by this library
#[no_mangle]
pub extern "C" fn mps_string_free(s: *mut c_char) {
    if !s.is_null() {
        unsafe {
            drop(CString::from_raw(s));
        }
    }
}

/// Unmount and release a player
#[no_mangle]
pub extern "C" fn mps_player_destroy(player_id: i64) -> i32 {
    let removed = PLAYER_REGISTRY.lock().remove(&player_id);
    match removed {
        Some(mut player) => {
            player.unmount();
            log::info!("Destroyed player {}", player_id);
            0
        }
        None => {
            log::error!("Invalid player ID: {}", player_id);
            -1
        }
    }
}
