// Reactive player state

use crate::seek::SeekEncoding;
use crate::speed::PlaybackSpeed;
use serde::{Deserialize, Serialize};

/// Presentation variant of the control surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PresentationMode {
    /// Always-visible control bar
    #[default]
    Bar,
    /// Controls hidden inside a collapsible panel
    Drawer,
}

impl PresentationMode {
    pub fn from_use_drawer(use_drawer: bool) -> Self {
        if use_drawer {
            PresentationMode::Drawer
        } else {
            PresentationMode::Bar
        }
    }

    /// The drawer's position slider is a percentage, the bar's is seconds
    pub fn seek_encoding(self) -> SeekEncoding {
        match self {
            PresentationMode::Bar => SeekEncoding::Seconds,
            PresentationMode::Drawer => SeekEncoding::Percent,
        }
    }
}

/// UI anchor recorded when the speed menu opens
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub x: f32,
    pub y: f32,
}

/// Player state
///
/// `position` tracks the primitive within one poll interval. `speed_menu_open`
/// always equals `speed_menu_anchor.is_some()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
    /// Whether playback was requested and has not ended
    pub playing: bool,
    /// Cached playhead position in seconds
    pub position: f64,
    /// Volume on the UI scale (0 - 100)
    pub volume: u8,
    /// Current playback rate preset
    pub rate: PlaybackSpeed,
    pub panel_open: bool,
    pub speed_menu_open: bool,
    pub speed_menu_anchor: Option<Anchor>,
    pub volume_panel_open: bool,
}

impl PlayerState {
    /// Initial state at mount for the given presentation
    pub fn for_mode(mode: PresentationMode) -> Self {
        Self {
            volume_panel_open: mode == PresentationMode::Drawer,
            ..Self::default()
        }
    }

    /// Volume as an output gain
    pub fn volume_gain(&self) -> f32 {
        self.volume as f32 / 100.0
    }
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            playing: false,
            position: 0.0,
            volume: 100,
            rate: PlaybackSpeed::Normal,
            panel_open: false,
            speed_menu_open: false,
            speed_menu_anchor: None,
            volume_panel_open: false,
        }
    }
}
