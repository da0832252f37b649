pub mod errors;
pub mod logging;
pub mod root;
pub mod server;
pub mod trust_policy;
pub mod upstream;

pub use errors::ConfigError;
pub use logging::LoggingConfig;
pub use root::{CliOverrides, Config};
pub use server::ServerConfig;
pub use trust_policy::{PublicKeyPin, TrustPolicy};
pub use upstream::UpstreamConfig;
