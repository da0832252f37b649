use async_trait::async_trait;
use ferrous_doh_domain::DomainError;

/// One request/response exchange with the upstream resolver.
///
/// Takes a DNS message in wire format and returns the upstream's wire-format
/// answer. Implementations own their timeout; every failure comes back as an
/// `Err`, never as a panic.
#[async_trait]
pub trait UpstreamTransport: Send + Sync {
    async fn exchange(&self, message_bytes: &[u8]) -> Result<Vec<u8>, DomainError>;

    /// Where queries go, for logs.
    fn endpoint(&self) -> &str;
}
