// Playback speed presets

use crate::error::PlayerError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported playback rates, in menu order.
///
/// The UI can only reach these values, so the rate is modelled as a closed
/// set rather than a free float. Serialized as the rate itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "f32", try_from = "f32")]
pub enum PlaybackSpeed {
    Quarter,
    Half,
    ThreeQuarters,
    #[default]
    Normal,
    OneAndQuarter,
    OneAndHalf,
    OneAndThreeQuarters,
    Double,
}

impl PlaybackSpeed {
    /// All presets in ascending order
    pub const PRESETS: [PlaybackSpeed; 8] = [
        PlaybackSpeed::Quarter,
        PlaybackSpeed::Half,
        PlaybackSpeed::ThreeQuarters,
        PlaybackSpeed::Normal,
        PlaybackSpeed::OneAndQuarter,
        PlaybackSpeed::OneAndHalf,
        PlaybackSpeed::OneAndThreeQuarters,
        PlaybackSpeed::Double,
    ];

    /// Rate multiplier written to the primitive
    pub fn rate(self) -> f32 {
        match self {
            PlaybackSpeed::Quarter => 0.25,
            PlaybackSpeed::Half => 0.50,
            PlaybackSpeed::ThreeQuarters => 0.75,
            PlaybackSpeed::Normal => 1.00,
            PlaybackSpeed::OneAndQuarter => 1.25,
            PlaybackSpeed::OneAndHalf => 1.50,
            PlaybackSpeed::OneAndThreeQuarters => 1.75,
            PlaybackSpeed::Double => 2.00,
        }
    }

    /// Look up a preset by its exact rate. Anything off-grid is rejected.
    pub fn from_rate(rate: f32) -> Option<Self> {
        Self::PRESETS.iter().copied().find(|p| p.rate() == rate)
    }

    /// Menu label for this preset
    pub fn label(self) -> &'static str {
        match self {
            PlaybackSpeed::Quarter => "0.25",
            PlaybackSpeed::Half => "0.50",
            PlaybackSpeed::ThreeQuarters => "0.75",
            PlaybackSpeed::Normal => "Normal",
            PlaybackSpeed::OneAndQuarter => "1.25",
            PlaybackSpeed::OneAndHalf => "1.50",
            PlaybackSpeed::OneAndThreeQuarters => "1.75",
            PlaybackSpeed::Double => "x2",
        }
    }
}

impl From<PlaybackSpeed> for f32 {
    fn from(speed: PlaybackSpeed) -> Self {
        speed.rate()
    }
}

impl TryFrom<f32> for PlaybackSpeed {
    type Error = PlayerError;

    fn try_from(rate: f32) -> Result<Self, Self::Error> {
        Self::from_rate(rate)
            .ok_or_else(|| PlayerError::Parse(format!("Unsupported playback rate: {}", rate)))
    }
}

impl fmt::Display for PlaybackSpeed {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:.2}", self.rate())
    }
}
