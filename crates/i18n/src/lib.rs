// Localization for the control surface labels

pub mod fetch;
pub mod loader;
pub mod locale;
pub mod pack;

pub use fetch::{DirLanguageSource, EmbeddedLanguageSource, HttpLanguageSource, LanguageSource};
pub use loader::{LoadHandle, LoadStatus, LocalizationLoader};
pub use locale::{
    resolve_language, supported_code, LocaleOrigin, ResolvedLocale, DEFAULT_LANGUAGE,
    SUPPORTED_LANGUAGES,
};
pub use pack::{LabelKey, LanguagePack};

use mps_config::HostConfig;
use std::sync::Arc;

/// Pick the resource source a host configuration asks for: an HTTP base URL
/// first, then a local directory, then the bundled files.
pub fn language_source(config: &HostConfig) -> Arc<dyn LanguageSource> {
    if let Some(base) = config.language_base_url.as_deref().filter(|b| !b.is_empty()) {
        Arc::new(HttpLanguageSource::new(base))
    } else if let Some(dir) = &config.language_dir {
        Arc::new(DirLanguageSource::new(dir))
    } else {
        Arc::new(EmbeddedLanguageSource)
    }
}
