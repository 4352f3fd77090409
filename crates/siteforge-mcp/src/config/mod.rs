//! Configuration loading and resolution.

use siteforge::AgentConfig;

/// Resolve the effective configuration: environment first, CLI flags on top.
pub fn resolve_config(region: Option<&str>, build_timeout_secs: Option<u64>) -> AgentConfig {
    let mut config = AgentConfig::from_env();

    if let Some(region) = region {
        config.default_region = region.to_string();
    }
    if let Some(timeout) = build_timeout_secs {
        config.build_timeout_secs = timeout;
    }

    config
}
