use ferrous_doh_application::use_cases::ForwardQueryUseCase;
use ferrous_doh_domain::Config;
use ferrous_doh_infrastructure::dns::{DnsServerHandler, HttpsTransport};
use std::sync::Arc;
use tracing::info;

pub struct DnsServices {
    pub handler: DnsServerHandler,
}

impl DnsServices {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let transport = Arc::new(HttpsTransport::new(&config.upstream)?);
        info!(url = transport.url(), "DoH transport ready");

        let forwarder = Arc::new(ForwardQueryUseCase::new(transport));
        let handler = DnsServerHandler::new(forwarder);

        Ok(Self { handler })
    }
}
