pub mod error_response;
pub mod query_summary;

pub use error_response::build_error_response;
pub use query_summary::summarize_query;
