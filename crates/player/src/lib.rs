// Player façade: wires configuration, localization, controller and poller
// together for one mounted control surface.

use mps_config::{override_chain, HostConfig, OverrideChain, ResolvedSource, SourceResolver};
use mps_core::{
    PlaybackPrimitive, PlayerController, PlayerListener, PlayerState, PollerTask, Result,
};
use mps_i18n::{
    language_source, resolve_language, LabelKey, LanguageSource, LoadHandle, LoadStatus,
    LocalizationLoader, ResolvedLocale,
};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

pub use mps_config as config;
pub use mps_core as core;
pub use mps_i18n as i18n;

/// Everything a UI layer needs to render one frame
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSnapshot {
    pub state: PlayerState,
    pub duration: Option<f64>,
    pub slider_value: f64,
    pub slider_max: f64,
    pub source: ResolvedSource,
    pub language: String,
    pub labels_status: LoadStatus,
}

/// A mounted player. Dropping it tears the poller down.
pub struct Player {
    controller: Arc<Mutex<PlayerController>>,
    poller: Option<PollerTask>,
    source: ResolvedSource,
    locale: ResolvedLocale,
    localization: LocalizationLoader,
    pending_labels: Option<LoadHandle>,
}

impl Player {
    /// Mount using the chain and language source the config describes
    pub fn mount_with_config(
        config: &HostConfig,
        primitive: Box<dyn PlaybackPrimitive>,
    ) -> Result<Self> {
        let chain = override_chain(config);
        Self::mount(config, &chain, primitive, language_source(config))
    }

    /// Resolve the source and language once, bind the primitive, start the
    /// language fetch and the position poller.
    pub fn mount(
        config: &HostConfig,
        chain: &OverrideChain,
        primitive: Box<dyn PlaybackPrimitive>,
        languages: Arc<dyn LanguageSource>,
    ) -> Result<Self> {
        let source = SourceResolver::new(chain).resolve(config.src.as_deref());
        let locale = resolve_language(chain);

        let mut controller = PlayerController::new(config.presentation());
        controller.defer_events(true);
        controller.bind(primitive, &source.url);
        let controller = Arc::new(Mutex::new(controller));

        let localization = LocalizationLoader::new(&locale, languages);
        let pending_labels = Some(localization.start());

        let poller = Self::start_poller(&controller, config.poll_interval())?;
        log::info!(
            "Player mounted: {} ({:?}, lang {})",
            source.url,
            config.presentation(),
            locale.code
        );

        Ok(Self {
            controller,
            poller: Some(poller),
            source,
            locale,
            localization,
            pending_labels,
        })
    }

    fn start_poller(
        controller: &Arc<Mutex<PlayerController>>,
        interval: Duration,
    ) -> Result<PollerTask> {
        let target = controller.clone();
        PollerTask::spawn(interval, move || {
            // The lock spans the whole tick so it never interleaves with an intent
            let pending = {
                let mut controller = target.lock();
                controller.tick();
                controller.take_events()
            };
            pending.deliver();
        })
    }

    /// Shared controller. Events raised through it directly are queued and
    /// go out with the next poll tick; prefer `with_controller`.
    pub fn controller(&self) -> Arc<Mutex<PlayerController>> {
        self.controller.clone()
    }

    /// Run an intent against the controller, then deliver its events with the
    /// lock released
    pub fn with_controller<R>(&self, f: impl FnOnce(&mut PlayerController) -> R) -> R {
        let (result, pending) = {
            let mut controller = self.controller.lock();
            let result = f(&mut controller);
            (result, controller.take_events())
        };
        pending.deliver();
        result
    }

    /// Subscribe to state changes. Listeners may read the player from
    /// `on_event`.
    pub fn add_listener(&self, listener: Arc<dyn PlayerListener>, throttle: Duration) {
        self.controller.lock().add_listener(listener, throttle);
    }

    pub fn state(&self) -> PlayerState {
        self.controller.lock().snapshot()
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        let controller = self.controller.lock();
        let duration = controller.duration();
        PlayerSnapshot {
            state: controller.snapshot(),
            duration,
            slider_value: controller.slider_value(),
            slider_max: controller.seek_encoding().slider_max(duration),
            source: self.source.clone(),
            language: self.localization.code(),
            labels_status: self.localization.status(),
        }
    }

    pub fn source(&self) -> &ResolvedSource {
        &self.source
    }

    pub fn locale(&self) -> &ResolvedLocale {
        &self.locale
    }

    pub fn localization(&self) -> &LocalizationLoader {
        &self.localization
    }

    /// Label text; `None` while the language pack is still loading
    pub fn label(&self, key: LabelKey) -> Option<String> {
        self.localization.label(key)
    }

    /// Label for the play/pause button in its current state
    pub fn toggle_label(&self) -> Option<String> {
        let key = if self.controller.lock().state().playing {
            LabelKey::Pause
        } else {
            LabelKey::Play
        };
        self.label(key)
    }

    /// Block until the initial language fetch has settled
    pub fn wait_for_labels(&mut self) -> LoadStatus {
        match self.pending_labels.take() {
            Some(handle) => handle.wait(),
            None => self.localization.status(),
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.poller.is_some()
    }

    /// Stop polling and release the primitive. Idempotent.
    pub fn unmount(&mut self) {
        let Some(mut poller) = self.poller.take() else {
            return;
        };
        poller.stop();
        let pending = {
            let mut controller = self.controller.lock();
            controller.unbind();
            controller.take_events()
        };
        pending.deliver();
        log::info!("Player unmounted: {}", self.source.url);
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl std::fmt::Debug for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Player")
            .field("source", &self.source)
            .field("locale", &self.locale)
            .field("mounted", &self.is_mounted())
            .finish()
    }
}
