// Audio source resolution

use crate::overrides::{OverrideChain, OverrideKey};
use serde::Serialize;

/// Sample source bound when nothing else supplies one
pub const DEFAULT_SOURCE: &str = "media/sample.mp3";

/// Where the resolved source came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "provider")]
pub enum SourceOrigin {
    /// An override scope, by provider name
    Override(String),
    /// The `src` passed by the host at construction
    Host,
    /// The built-in sample
    Default,
}

/// Audio source chosen at startup; never re-resolved during the session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedSource {
    pub url: String,
    pub origin: SourceOrigin,
}

/// Picks the audio URL: override scopes in chain order, then the host's
/// `src`, then the built-in sample.
#[derive(Debug)]
pub struct SourceResolver<'a> {
    chain: &'a OverrideChain,
    fallback: &'a str,
}

impl<'a> SourceResolver<'a> {
    pub fn new(chain: &'a OverrideChain) -> Self {
        Self {
            chain,
            fallback: DEFAULT_SOURCE,
        }
    }

    /// Replace the built-in sample
    pub fn with_fallback(mut self, fallback: &'a str) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn resolve(&self, host_src: Option<&str>) -> ResolvedSource {
        let resolved = if let Some((url, provider)) = self.chain.resolve(OverrideKey::Source) {
            ResolvedSource {
                url,
                origin: SourceOrigin::Override(provider),
            }
        } else if let Some(src) = host_src.map(str::trim).filter(|s| !s.is_empty()) {
            ResolvedSource {
                url: src.to_string(),
                origin: SourceOrigin::Host,
            }
        } else {
            ResolvedSource {
                url: self.fallback.to_string(),
                origin: SourceOrigin::Default,
            }
        };

        log::info!(
            "Resolved audio source {} ({:?})",
            resolved.url,
            resolved.origin
        );
        resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overrides::StaticOverrides;

    fn chain(page: Option<&str>, parent: Option<&str>) -> OverrideChain {
        let mut page_scope = StaticOverrides::new("page");
        if let Some(url) = page {
            page_scope = page_scope.with_source(url);
        }
        let mut parent_scope = StaticOverrides::new("parent");
        if let Some(url) = parent {
            parent_scope = parent_scope.with_source(url);
        }
        OverrideChain::new().push(page_scope).push(parent_scope)
    }

    #[test]
    fn test_page_override_beats_everything() {
        let chain = chain(Some("page.mp3"), Some("parent.mp3"));
        let resolved = SourceResolver::new(&chain).resolve(Some("host.mp3"));
        assert_eq!(resolved.url, "page.mp3");
        assert_eq!(resolved.origin, SourceOrigin::Override("page".to_string()));
    }

    #[test]
    fn test_falls_through_in_order() {
        let chain_parent = chain(None, Some("parent.mp3"));
        let resolved = SourceResolver::new(&chain_parent).resolve(Some("host.mp3"));
        assert_eq!(resolved.url, "parent.mp3");
        assert_eq!(resolved.origin, SourceOrigin::Override("parent".to_string()));

        let chain_none = chain(None, None);
        let resolved = SourceResolver::new(&chain_none).resolve(Some("host.mp3"));
        assert_eq!(resolved.url, "host.mp3");
        assert_eq!(resolved.origin, SourceOrigin::Host);

        let resolved = SourceResolver::new(&chain_none).resolve(None);
        assert_eq!(resolved.url, DEFAULT_SOURCE);
        assert_eq!(resolved.origin, SourceOrigin::Default);
    }

    #[test]
    fn test_missing_parent_context() {
        // An iframe-less page has no parent scope at all
        let chain = OverrideChain::new().push(StaticOverrides::new("page"));
        let resolved = SourceResolver::new(&chain).resolve(Some("host.mp3"));
        assert_eq!(resolved.origin, SourceOrigin::Host);
    }

    #[test]
    fn test_blank_host_src_uses_fallback() {
        let chain = OverrideChain::new();
        let resolved = SourceResolver::new(&chain)
            .with_fallback("other.mp3")
            .resolve(Some(""));
        assert_eq!(resolved.url, "other.mp3");
    }
}
