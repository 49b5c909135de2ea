// Language packs

use mps_core::Result;
use std::collections::HashMap;

/// Label identifiers the control surface asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelKey {
    AudioPosition,
    PlaybackSpeed,
    Pause,
    Play,
    VolumeSettings,
    Volume,
    AudioSettings,
}

impl LabelKey {
    pub const ALL: [LabelKey; 7] = [
        LabelKey::AudioPosition,
        LabelKey::PlaybackSpeed,
        LabelKey::Pause,
        LabelKey::Play,
        LabelKey::VolumeSettings,
        LabelKey::Volume,
        LabelKey::AudioSettings,
    ];

    /// Key used in the resource files
    pub fn as_str(self) -> &'static str {
        match self {
            // Misspelling is part of the published resource format
            LabelKey::AudioPosition => "audioPosistion",
            LabelKey::PlaybackSpeed => "playbackSpeed",
            LabelKey::Pause => "pause",
            LabelKey::Play => "play",
            LabelKey::VolumeSettings => "volumeSettings",
            LabelKey::Volume => "volume",
            LabelKey::AudioSettings => "audioSettings",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.as_str() == key)
    }
}

/// Flat key to text mapping for one language. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LanguagePack {
    code: String,
    labels: HashMap<String, String>,
}

impl LanguagePack {
    pub fn new(code: impl Into<String>, labels: HashMap<String, String>) -> Self {
        Self {
            code: code.into(),
            labels,
        }
    }

    /// Parse a resource file body
    pub fn from_json(code: impl Into<String>, json: &str) -> Result<Self> {
        let labels: HashMap<String, String> = serde_json::from_str(json)?;
        let pack = Self::new(code, labels);
        let missing: Vec<&str> = LabelKey::ALL
            .iter()
            .filter(|k| !pack.labels.contains_key(k.as_str()))
            .map(|k| k.as_str())
            .collect();
        if !missing.is_empty() {
            log::warn!("Language pack '{}' is missing {:?}", pack.code, missing);
        }
        Ok(pack)
    }

    /// Minimal English labels used when no resource could be loaded
    pub fn builtin() -> Self {
        let labels = [
            (LabelKey::AudioPosition, "Audio position"),
            (LabelKey::PlaybackSpeed, "Playback speed"),
            (LabelKey::Pause, "Pause"),
            (LabelKey::Play, "Play"),
            (LabelKey::VolumeSettings, "Volume settings"),
            (LabelKey::Volume, "Volume"),
            (LabelKey::AudioSettings, "Audio settings"),
        ]
        .into_iter()
        .map(|(k, v)| (k.as_str().to_string(), v.to_string()))
        .collect();
        Self::new("en", labels)
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }

    pub fn label(&self, key: LabelKey) -> Option<&str> {
        self.get(key.as_str())
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json() {
        let pack = LanguagePack::from_json("en", r#"{ "play": "Play it", "extra": "x" }"#).unwrap();
        assert_eq!(pack.code(), "en");
        assert_eq!(pack.label(LabelKey::Play), Some("Play it"));
        assert_eq!(pack.label(LabelKey::Pause), None);
        assert_eq!(pack.get("extra"), Some("x"));
    }

    #[test]
    fn test_rejects_nested_values() {
        assert!(LanguagePack::from_json("en", r#"{ "play": { "a": 1 } }"#).is_err());
    }

    #[test]
    fn test_builtin_covers_every_key() {
        let pack = LanguagePack::builtin();
        for key in LabelKey::ALL {
            assert!(pack.label(key).is_some(), "missing {:?}", key);
        }
    }

    #[test]
    fn test_key_names() {
        assert_eq!(LabelKey::AudioPosition.as_str(), "audioPosistion");
        assert_eq!(LabelKey::from_key("volumeSettings"), Some(LabelKey::VolumeSettings));
        assert_eq!(LabelKey::from_key("audioPosition"), None);
    }
}
