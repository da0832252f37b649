pub mod https;
pub mod tls;

pub use https::HttpsTransport;
pub use tls::{build_client_config, spki_sha256};
