use crate::dns::wire_response;
use ferrous_doh_application::services::{build_error_response, summarize_query};
use ferrous_doh_application::use_cases::ForwardQueryUseCase;
use hickory_proto::op::{Message, MessageType, ResponseCode};
use hickory_proto::serialize::binary::BinEncodable;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Turns one inbound datagram into the bytes to send back, if any.
///
/// Cheap to clone; every clone shares the same forwarder.
#[derive(Clone)]
pub struct DnsServerHandler {
    forwarder: Arc<ForwardQueryUseCase>,
}

impl DnsServerHandler {
    pub fn new(forwarder: Arc<ForwardQueryUseCase>) -> Self {
        Self { forwarder }
    }

    /// Returns `None` only when nothing sensible can be sent: the datagram is
    /// shorter than a DNS header, or it is a response rather than a query.
    pub async fn handle_datagram(&self, datagram: &[u8], client: SocketAddr) -> Option<Vec<u8>> {
        let query = match Message::from_vec(datagram) {
            Ok(message) => message,
            Err(e) => {
                debug!(client = %client, len = datagram.len(), error = %e, "Undecodable DNS query");
                return wire_response::build_header_error_response(datagram, ResponseCode::FormErr)
                    .map(|header| header.to_vec());
            }
        };

        if query.message_type() == MessageType::Response {
            debug!(client = %client, id = query.id(), "Ignoring DNS response sent to listener");
            return None;
        }

        let Some(summary) = summarize_query(&query) else {
            debug!(client = %client, id = query.id(), "Query without questions, answering FORMERR");
            let response = build_error_response(&query, ResponseCode::FormErr);
            return Self::encode(&response, &query);
        };

        info!(
            domain = %summary.display_domain(),
            record_type = %summary.record_type,
            client = %client,
            id = summary.id,
            "DNS query received"
        );

        let response = self.forwarder.execute(&query).await;
        Self::encode(&response, &query)
    }

    fn encode(response: &Message, query: &Message) -> Option<Vec<u8>> {
        match response.to_vec() {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                error!(id = query.id(), error = %e, "Failed to encode response, answering SERVFAIL");
                build_error_response(query, ResponseCode::ServFail)
                    .to_vec()
                    .ok()
            }
        }
    }
}
