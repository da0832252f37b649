//! Ferrous DoH Domain Layer
pub mod config;
pub mod dns_query;
pub mod errors;
pub mod upstream_endpoint;

pub use config::{
    CliOverrides, Config, ConfigError, LoggingConfig, PublicKeyPin, ServerConfig, TrustPolicy,
    UpstreamConfig,
};
pub use dns_query::DnsQuery;
pub use errors::DomainError;
pub use upstream_endpoint::UpstreamEndpoint;
