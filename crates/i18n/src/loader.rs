// Localization loader
//
// The language resource is fetched on a background thread. Lookups return
// None until it lands; if the fetch fails the built-in English labels are
// installed instead of leaving the controls unlabeled.

use crate::fetch::LanguageSource;
use crate::locale::{supported_code, ResolvedLocale, DEFAULT_LANGUAGE};
use crate::pack::{LabelKey, LanguagePack};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

/// Progress of the current load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LoadStatus {
    /// No fetch started yet, or one is in flight
    Pending,
    /// The requested language pack is installed
    Loaded,
    /// The fetch failed; built-in labels are installed
    Fallback,
}

struct LoaderInner {
    source: Arc<dyn LanguageSource>,
    code: RwLock<String>,
    pack: RwLock<Option<Arc<LanguagePack>>>,
    status: RwLock<LoadStatus>,
    // Bumped on every load so a slow, superseded fetch cannot overwrite a newer one
    generation: AtomicU64,
}

impl LoaderInner {
    fn install(&self, generation: u64, pack: Arc<LanguagePack>, status: LoadStatus) {
        if self.generation.load(Ordering::SeqCst) != generation {
            log::debug!("Discarding superseded language pack '{}'", pack.code());
            return;
        }
        *self.pack.write() = Some(pack);
        *self.status.write() = status;
    }

    fn run(&self, generation: u64, code: &str) {
        let result = self
            .source
            .fetch(code)
            .and_then(|body| LanguagePack::from_json(code, &body));
        match result {
            Ok(pack) => {
                log::info!("Language pack '{}' loaded ({} labels)", code, pack.len());
                self.install(generation, Arc::new(pack), LoadStatus::Loaded);
            }
            Err(e) => {
                log::warn!(
                    "Language pack '{}' unavailable from {}: {}; using built-in labels",
                    code,
                    self.source.describe(),
                    e
                );
                self.install(
                    generation,
                    Arc::new(LanguagePack::builtin()),
                    LoadStatus::Fallback,
                );
            }
        }
    }
}

/// Resolves labels for the control surface
#[derive(Clone)]
pub struct LocalizationLoader {
    inner: Arc<LoaderInner>,
}

impl LocalizationLoader {
    pub fn new(locale: &ResolvedLocale, source: Arc<dyn LanguageSource>) -> Self {
        Self {
            inner: Arc::new(LoaderInner {
                source,
                code: RwLock::new(locale.code.clone()),
                pack: RwLock::new(None),
                status: RwLock::new(LoadStatus::Pending),
                generation: AtomicU64::new(0),
            }),
        }
    }

    /// Begin fetching the resolved language
    pub fn start(&self) -> LoadHandle {
        let code = self.inner.code.read().clone();
        self.spawn_load(code)
    }

    /// Load another language, replacing the current pack wholesale once the
    /// fetch completes. Unsupported codes fall back to the default.
    pub fn reload(&self, code: &str) -> LoadHandle {
        let code = match supported_code(code) {
            Some(code) => code.to_string(),
            None => {
                log::warn!("Unsupported language '{}'; using '{}'", code, DEFAULT_LANGUAGE);
                DEFAULT_LANGUAGE.to_string()
            }
        };
        *self.inner.code.write() = code.clone();
        self.spawn_load(code)
    }

    fn spawn_load(&self, code: String) -> LoadHandle {
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        *self.inner.status.write() = LoadStatus::Pending;

        let inner = self.inner.clone();
        let thread_code = code.clone();
        let spawned = thread::Builder::new()
            .name("mps-i18n-fetch".to_string())
            .spawn(move || inner.run(generation, &thread_code));

        let handle = match spawned {
            Ok(handle) => Some(handle),
            Err(e) => {
                log::error!("Failed to spawn language fetch for '{}': {}", code, e);
                self.inner.install(
                    generation,
                    Arc::new(LanguagePack::builtin()),
                    LoadStatus::Fallback,
                );
                None
            }
        };

        LoadHandle {
            inner: self.inner.clone(),
            handle,
        }
    }

    /// Language code currently requested
    pub fn code(&self) -> String {
        self.inner.code.read().clone()
    }

    pub fn status(&self) -> LoadStatus {
        *self.inner.status.read()
    }

    pub fn pack(&self) -> Option<Arc<LanguagePack>> {
        self.inner.pack.read().clone()
    }

    /// Text for a label, `None` while loading or if the pack lacks the key
    pub fn label(&self, key: LabelKey) -> Option<String> {
        self.get(key.as_str())
    }

    /// Text for a raw resource key
    pub fn get(&self, key: &str) -> Option<String> {
        self.inner
            .pack
            .read()
            .as_ref()
            .and_then(|pack| pack.get(key).map(str::to_string))
    }
}

impl std::fmt::Debug for LocalizationLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalizationLoader")
            .field("code", &self.code())
            .field("status", &self.status())
            .finish()
    }
}

/// Handle to an in-flight fetch
pub struct LoadHandle {
    inner: Arc<LoaderInner>,
    handle: Option<thread::JoinHandle<()>>,
}

impl LoadHandle {
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }

    /// Block until the fetch settles and report the loader's status
    pub fn wait(mut self) -> LoadStatus {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Language fetch thread panicked");
            }
        }
        *self.inner.status.read()
    }
}
