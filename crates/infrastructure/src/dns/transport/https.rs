//! HTTPS transport for DNS queries: DNS-over-HTTPS (RFC 8484)
//!
//! Sends DNS queries as HTTP POST requests with `application/dns-message` content type.
//! The request body is the raw DNS wire format message, and the response body
//! contains the raw DNS wire format response.
//!
//! Wire format (HTTP):
//! ```text
//! POST /dns-query HTTP/2
//! Content-Type: application/dns-message
//! Accept: application/dns-message
//!
//! <raw DNS message bytes>
//! ```

use super::tls::build_client_config;
use async_trait::async_trait;
use ferrous_doh_application::ports::UpstreamTransport;
use ferrous_doh_domain::{DomainError, UpstreamConfig};
use std::time::Duration;
use tracing::debug;

/// Media type for DNS-over-HTTPS requests and responses (RFC 8484 §6)
const DNS_MESSAGE_CONTENT_TYPE: &str = "application/dns-message";

/// Longest slice of a non-2xx body kept for the debug log.
const ERROR_BODY_PREVIEW: usize = 200;

/// DNS-over-HTTPS transport (RFC 8484)
///
/// The `reqwest::Client` inside is built once from the upstream config and
/// shared by every query; it pools connections per host.
pub struct HttpsTransport {
    url: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpsTransport {
    pub fn new(config: &UpstreamConfig) -> Result<Self, DomainError> {
        let endpoint = config
            .endpoint()
            .map_err(|e| DomainError::ConfigError(e.to_string()))?;
        let tls_config = build_client_config(&config.tls)?;

        let client = reqwest::Client::builder()
            .use_preconfigured_tls(tls_config)
            .timeout(config.timeout())
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .build()
            .map_err(|e| DomainError::TlsConfig(format!("Failed to build HTTPS client: {}", e)))?;

        Ok(Self {
            url: endpoint.url().to_string(),
            client,
            timeout: config.timeout(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn map_request_error(&self, e: reqwest::Error) -> DomainError {
        if e.is_timeout() {
            DomainError::TransportTimeout {
                server: self.url.clone(),
                timeout_ms: self.timeout.as_millis() as u64,
            }
        } else {
            DomainError::TransportConnection {
                server: self.url.clone(),
                reason: error_chain(&e),
            }
        }
    }

    async fn post(&self, message_bytes: &[u8]) -> Result<Vec<u8>, DomainError> {
        // POST with application/dns-message (RFC 8484 §4.1)
        let response = self
            .client
            .post(&self.url)
            .header(reqwest::header::CONTENT_TYPE, DNS_MESSAGE_CONTENT_TYPE)
            .header(reqwest::header::ACCEPT, DNS_MESSAGE_CONTENT_TYPE)
            .body(message_bytes.to_vec())
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(
                url = %self.url,
                status = status.as_u16(),
                body = %body.chars().take(ERROR_BODY_PREVIEW).collect::<String>(),
                "DoH server returned an error status"
            );
            return Err(DomainError::UpstreamHttpStatus {
                server: self.url.clone(),
                status: status.as_u16(),
            });
        }

        if let Some(content_type) = response.headers().get(reqwest::header::CONTENT_TYPE) {
            if content_type.as_bytes() != DNS_MESSAGE_CONTENT_TYPE.as_bytes() {
                debug!(url = %self.url, content_type = ?content_type, "Unexpected DoH content type");
            }
        }

        let version = response.version();
        let response_bytes = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                self.map_request_error(e)
            } else {
                DomainError::TransportBody {
                    server: self.url.clone(),
                    reason: error_chain(&e),
                }
            }
        })?;

        debug!(
            url = %self.url,
            http_version = ?version,
            response_len = response_bytes.len(),
            "DoH response received"
        );

        Ok(response_bytes.to_vec())
    }
}

#[async_trait]
impl UpstreamTransport for HttpsTransport {
    async fn exchange(&self, message_bytes: &[u8]) -> Result<Vec<u8>, DomainError> {
        debug!(
            url = %self.url,
            message_len = message_bytes.len(),
            "Sending DoH query"
        );

        // One deadline for connect, request and body together.
        tokio::time::timeout(self.timeout, self.post(message_bytes))
            .await
            .map_err(|_| DomainError::TransportTimeout {
                server: self.url.clone(),
                timeout_ms: self.timeout.as_millis() as u64,
            })?
    }

    fn endpoint(&self) -> &str {
        &self.url
    }
}

/// reqwest errors hide the interesting part (TLS, refused) in their sources.
fn error_chain(e: &(dyn std::error::Error + 'static)) -> String {
    let mut message = e.to_string();
    let mut source = e.source();
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}
