#![allow(dead_code)]

mod builders;

pub use builders::{a_record, cname_record, query_message};
pub use mock_transport::{MockBehavior, MockUpstreamTransport};
