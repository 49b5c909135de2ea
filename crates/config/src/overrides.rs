// Override providers and chain resolution
//
// The hosting page can override the audio source and the language from its
// own global scope or, when embedded in an iframe, from its parent's. Those
// scopes are modelled as injected providers consulted in order.

use serde::Deserialize;

/// Values a provider may override
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverrideKey {
    Source,
    Language,
}

/// One scope that may carry overrides
pub trait OverrideProvider: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &str;

    /// The override for `key`, if this scope exposes one
    fn get(&self, key: OverrideKey) -> Option<String>;
}

/// In-memory override scope
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StaticOverrides {
    #[serde(skip)]
    name: String,
    #[serde(default, alias = "src")]
    source: Option<String>,
    #[serde(default, alias = "lang")]
    language: Option<String>,
}

impl StaticOverrides {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_source(mut self, url: impl Into<String>) -> Self {
        self.source = Some(url.into());
        self
    }

    pub fn with_language(mut self, code: impl Into<String>) -> Self {
        self.language = Some(code.into());
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl OverrideProvider for StaticOverrides {
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self, key: OverrideKey) -> Option<String> {
        match key {
            OverrideKey::Source => self.source.clone(),
            OverrideKey::Language => self.language.clone(),
        }
    }
}

/// Overrides read from `<PREFIX>_SRC` and `<PREFIX>_LANG` environment variables
#[derive(Debug, Clone)]
pub struct EnvOverrides {
    prefix: String,
}

/// Default environment prefix
pub const ENV_PREFIX: &str = "MPS_PLAYER";

impl EnvOverrides {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    fn var_name(&self, key: OverrideKey) -> String {
        match key {
            OverrideKey::Source => format!("{}_SRC", self.prefix),
            OverrideKey::Language => format!("{}_LANG", self.prefix),
        }
    }
}

impl Default for EnvOverrides {
    fn default() -> Self {
        Self::new(ENV_PREFIX)
    }
}

impl OverrideProvider for EnvOverrides {
    fn name(&self) -> &str {
        "environment"
    }

    fn get(&self, key: OverrideKey) -> Option<String> {
        std::env::var(self.var_name(key)).ok()
    }
}

/// Ordered list of override scopes; the first present value wins
#[derive(Default)]
pub struct OverrideChain {
    providers: Vec<Box<dyn OverrideProvider>>,
}

impl OverrideChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a provider with lower precedence than those already present
    pub fn push(mut self, provider: impl OverrideProvider + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    pub fn push_boxed(&mut self, provider: Box<dyn OverrideProvider>) {
        self.providers.push(provider);
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// First non-blank value for `key`, with the name of the provider that
    /// supplied it
    pub fn resolve(&self, key: OverrideKey) -> Option<(String, String)> {
        self.providers.iter().find_map(|p| {
            p.get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .map(|v| (v, p.name().to_string()))
        })
    }
}

impl std::fmt::Debug for OverrideChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.providers.iter().map(|p| p.name()))
            .finish()
    }
}
