#![allow(dead_code)]

mod builders;
mod mock_doh_server;

pub use builders::{a_record, query_bytes, query_message, upstream_config};
pub use mock_doh_server::{DohBehavior, MockDohServer, RecordedRequest};
