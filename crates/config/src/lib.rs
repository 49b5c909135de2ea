// Startup configuration: host settings and override resolution

pub mod host;
pub mod overrides;
pub mod source;

pub use host::{HostConfig, OverrideScopes};
pub use overrides::{
    EnvOverrides, OverrideChain, OverrideKey, OverrideProvider, StaticOverrides, ENV_PREFIX,
};
pub use source::{ResolvedSource, SourceOrigin, SourceResolver, DEFAULT_SOURCE};

/// Build the override chain for a host configuration: page scope, then parent
/// scope. The process environment is consulted last, and only when the host
/// opts in with `envOverrides`.
pub fn override_chain(config: &HostConfig) -> OverrideChain {
    let mut chain = OverrideChain::new();
    if let Some(page) = &config.overrides.page {
        chain.push_boxed(Box::new(page.clone().named("page")));
    }
    if let Some(parent) = &config.overrides.parent {
        chain.push_boxed(Box::new(parent.clone().named("parent")));
    }
    if config.env_overrides {
        chain.push_boxed(Box::new(EnvOverrides::default()));
    }
    chain
}
