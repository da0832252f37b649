use super::errors::ConfigError;
use super::trust_policy::TrustPolicy;
use crate::upstream_endpoint::{UpstreamEndpoint, UrlScheme};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The single DoH upstream. Read-only once the process has started.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_url")]
    pub url: String,

    /// Wall-clock bound for one whole exchange (connect, request, body).
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_pool_max_idle_per_host")]
    pub pool_max_idle_per_host: usize,

    #[serde(default)]
    pub tls: TrustPolicy,
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn endpoint(&self) -> Result<UpstreamEndpoint, ConfigError> {
        self.url
            .parse::<UpstreamEndpoint>()
            .map_err(ConfigError::Validation)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let endpoint = self.endpoint()?;

        if self.timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "Upstream timeout cannot be 0".to_string(),
            ));
        }

        if endpoint.scheme() == UrlScheme::Http && !endpoint.is_ip_literal() {
            return Err(ConfigError::Validation(format!(
                "Plain http:// upstream '{}' is only allowed for IP literals",
                self.url
            )));
        }

        match &self.tls {
            TrustPolicy::InsecureIpLiteral if !endpoint.is_ip_literal() => {
                Err(ConfigError::Validation(format!(
                    "Trust policy 'insecure_ip_literal' requires an IP literal host, got '{}'",
                    endpoint.host()
                )))
            }
            TrustPolicy::PinnedPublicKey { pins } if pins.is_empty() => Err(
                ConfigError::Validation("Trust policy 'pinned_public_key' has no pins".to_string()),
            ),
            _ => Ok(()),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            timeout_ms: default_timeout_ms(),
            pool_max_idle_per_host: default_pool_max_idle_per_host(),
            tls: TrustPolicy::default(),
        }
    }
}

// Mullvad DoH by address, so no other resolver is needed to reach it.
fn default_url() -> String {
    "https://194.242.2.2/dns-query".to_string()
}

fn default_timeout_ms() -> u64 {
    7_000
}

fn default_pool_max_idle_per_host() -> usize {
    4
}
