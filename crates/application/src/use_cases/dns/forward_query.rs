use crate::ports::UpstreamTransport;
use crate::services::build_error_response;
use ferrous_doh_domain::DomainError;
use hickory_proto::op::{Message, ResponseCode};
use hickory_proto::serialize::binary::BinEncodable;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Forwards one query to the DoH upstream and always yields exactly one response.
///
/// Holds no per-query state: a single instance is shared by every in-flight
/// query task.
pub struct ForwardQueryUseCase {
    transport: Arc<dyn UpstreamTransport>,
}

impl ForwardQueryUseCase {
    pub fn new(transport: Arc<dyn UpstreamTransport>) -> Self {
        Self { transport }
    }

    /// Forwards `query` and returns the upstream answer, or a synthesized
    /// error response when any step fails.
    pub async fn execute(&self, query: &Message) -> Message {
        let start = Instant::now();

        match self.try_forward(query).await {
            Ok(response) => {
                debug!(
                    id = query.id(),
                    rcode = ?response.response_code(),
                    answers = response.answers().len(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Upstream answered"
                );
                response
            }
            Err(e) => {
                let code = Self::response_code_for(&e);
                warn!(
                    id = query.id(),
                    upstream = %self.transport.endpoint(),
                    kind = e.kind(),
                    error = %e,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Forwarding failed, answering {}",
                    code
                );
                build_error_response(query, code)
            }
        }
    }

    /// The fallible pipeline: validate, encode, exchange, decode, correlate.
    pub async fn try_forward(&self, query: &Message) -> Result<Message, DomainError> {
        if query.queries().is_empty() {
            return Err(DomainError::MalformedQuery(
                "query has no question records".to_string(),
            ));
        }

        let message_bytes = query
            .to_vec()
            .map_err(|e| DomainError::EncodeFailure(e.to_string()))?;

        let response_bytes = self.transport.exchange(&message_bytes).await?;

        let mut response = Message::from_vec(&response_bytes)
            .map_err(|e| DomainError::InvalidDnsResponse(e.to_string()))?;

        // Upstreams may rewrite the id (RFC 8484 suggests 0); the client needs its own back.
        response.set_id(query.id());
        Ok(response)
    }

    pub fn response_code_for(error: &DomainError) -> ResponseCode {
        match error {
            DomainError::MalformedQuery(_) => ResponseCode::FormErr,
            _ => ResponseCode::ServFail,
        }
    }
}
