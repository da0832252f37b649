use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Malformed DNS query: {0}")]
    MalformedQuery(String),

    #[error("Failed to encode DNS message: {0}")]
    EncodeFailure(String),

    #[error("Invalid DNS response: {0}")]
    InvalidDnsResponse(String),

    #[error("Transport timeout after {timeout_ms}ms talking to {server}")]
    TransportTimeout { server: String, timeout_ms: u64 },

    #[error("Transport connection to {server} failed: {reason}")]
    TransportConnection { server: String, reason: String },

    #[error("Upstream {server} returned HTTP {status}")]
    UpstreamHttpStatus { server: String, status: u16 },

    #[error("Failed to read response body from {server}: {reason}")]
    TransportBody { server: String, reason: String },

    #[error("TLS configuration error: {0}")]
    TlsConfig(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    IoError(String),
}

impl DomainError {
    /// True for failures of the upstream exchange itself (connect, status, timeout, body).
    pub fn is_transport_error(&self) -> bool {
        matches!(
            self,
            Self::TransportTimeout { .. }
                | Self::TransportConnection { .. }
                | Self::UpstreamHttpStatus { .. }
                | Self::TransportBody { .. }
        )
    }

    /// Short label used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedQuery(_) => "malformed_query",
            Self::EncodeFailure(_) => "encode",
            Self::InvalidDnsResponse(_) => "decode",
            Self::TransportTimeout { .. } => "timeout",
            Self::TransportConnection { .. } => "connection",
            Self::UpstreamHttpStatus { .. } => "http_status",
            Self::TransportBody { .. } => "body",
            Self::TlsConfig(_) => "tls_config",
            Self::ConfigError(_) => "config",
            Self::IoError(_) => "io",
        }
    }
}

impl From<std::io::Error> for DomainError {
    fn from(e: std::io::Error) -> Self {
        Self::IoError(e.to_string())
    }
}
