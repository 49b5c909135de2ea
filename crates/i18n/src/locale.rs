// Language code resolution

use mps_config::{OverrideChain, OverrideKey};
use serde::Serialize;

/// Language codes with a bundled resource file
pub const SUPPORTED_LANGUAGES: [&str; 2] = ["en", "fr-ca"];

/// Code used when no valid override is present
pub const DEFAULT_LANGUAGE: &str = "en";

/// How the language code was chosen
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LocaleOrigin {
    /// A supported override, by provider name
    Override(String),
    /// An override was present but unsupported
    Fallback,
    /// No override present
    Default,
}

/// Language chosen at startup
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedLocale {
    pub code: String,
    pub origin: LocaleOrigin,
    /// The raw override, when one was present
    pub requested: Option<String>,
}

/// Normalize a code and check it against the supported set
pub fn supported_code(code: &str) -> Option<&'static str> {
    let code = code.trim();
    SUPPORTED_LANGUAGES
        .iter()
        .copied()
        .find(|supported| supported.eq_ignore_ascii_case(code))
}

/// Resolve the language from the override chain. Never fails: an
/// unsupported override logs a warning and falls back to the default.
pub fn resolve_language(chain: &OverrideChain) -> ResolvedLocale {
    let Some((requested, provider)) = chain.resolve(OverrideKey::Language) else {
        return ResolvedLocale {
            code: DEFAULT_LANGUAGE.to_string(),
            origin: LocaleOrigin::Default,
            requested: None,
        };
    };

    match supported_code(&requested) {
        Some(code) => {
            log::info!("Language override '{}' from {}", code, provider);
            ResolvedLocale {
                code: code.to_string(),
                origin: LocaleOrigin::Override(provider),
                requested: Some(requested),
            }
        }
        None => {
            log::warn!(
                "Unsupported language '{}' from {}; using '{}'",
                requested,
                provider,
                DEFAULT_LANGUAGE
            );
            ResolvedLocale {
                code: DEFAULT_LANGUAGE.to_string(),
                origin: LocaleOrigin::Fallback,
                requested: Some(requested),
            }
        }
    }
}
