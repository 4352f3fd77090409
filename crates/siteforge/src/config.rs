//! Runtime configuration, sourced from the environment with per-call
//! overrides applied at the tool layer.

use crate::types::{SiteError, SiteResult, StorageCredentials};

pub const DEFAULT_REGION: &str = "nyc3";

/// Configuration shared by every pipeline run.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Storage access key. Absence is fine until a deploy actually needs it.
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    /// Region used when a deploy request does not name one.
    pub default_region: String,
    /// Container build timeout in seconds.
    pub build_timeout_secs: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            access_key: None,
            secret_key: None,
            default_region: DEFAULT_REGION.to_string(),
            build_timeout_secs: crate::container::DEFAULT_BUILD_TIMEOUT_SECS,
        }
    }
}

impl AgentConfig {
    /// Read configuration from the environment. Credentials accept both the
    /// Spaces-specific names and the generic AWS names.
    pub fn from_env() -> Self {
        let access_key = env_first(&["SPACES_ACCESS_KEY", "AWS_ACCESS_KEY_ID"]);
        let secret_key = env_first(&["SPACES_SECRET_KEY", "AWS_SECRET_ACCESS_KEY"]);
        let default_region = std::env::var("SITEFORGE_REGION")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_REGION.to_string());
        let build_timeout_secs = std::env::var("SITEFORGE_BUILD_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(crate::container::DEFAULT_BUILD_TIMEOUT_SECS);

        Self {
            access_key,
            secret_key,
            default_region,
            build_timeout_secs,
        }
    }

    /// Resolve credentials, preferring per-call overrides over configured
    /// values. Missing credentials fail here, at the point of use, so
    /// generation and builds keep working without them.
    pub fn credentials(
        &self,
        access_override: Option<&str>,
        secret_override: Option<&str>,
    ) -> SiteResult<StorageCredentials> {
        let access_key = access_override
            .map(|s| s.to_string())
            .or_else(|| self.access_key.clone());
        let secret_key = secret_override
            .map(|s| s.to_string())
            .or_else(|| self.secret_key.clone());
        match (access_key, secret_key) {
            (Some(a), Some(s)) if !a.is_empty() && !s.is_empty() => Ok(StorageCredentials {
                access_key: a,
                secret_key: s,
            }),
            _ => Err(SiteError::Authentication(
                "storage credentials are not configured; set SPACES_ACCESS_KEY and \
                 SPACES_SECRET_KEY (or AWS_ACCESS_KEY_ID/AWS_SECRET_ACCESS_KEY) or pass \
                 them with the request"
                    .to_string(),
            )),
        }
    }
}

fn env_first(names: &[&str]) -> Option<String> {
    names
        .iter()
        .find_map(|n| std::env::var(n).ok().filter(|v| !v.trim().is_empty()))
}
