use std::fmt;
use std::sync::Arc;

/// Summary of an inbound query, used for logging and correlation.
///
/// The full message stays in wire/codec form; this only carries what the
/// listener reports about each request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsQuery {
    pub id: u16,
    pub domain: Arc<str>,
    pub record_type: Arc<str>,
    pub record_class: Arc<str>,
    pub question_count: usize,
}

impl DnsQuery {
    pub fn new(
        id: u16,
        domain: impl Into<Arc<str>>,
        record_type: impl Into<Arc<str>>,
        record_class: impl Into<Arc<str>>,
        question_count: usize,
    ) -> Self {
        Self {
            id,
            domain: domain.into(),
            record_type: record_type.into(),
            record_class: record_class.into(),
            question_count,
        }
    }

    /// Domain without the trailing root dot, as shown in logs.
    pub fn display_domain(&self) -> &str {
        let trimmed = self.domain.trim_end_matches('.');
        if trimmed.is_empty() {
            "."
        } else {
            trimmed
        }
    }
}

impl fmt::Display for DnsQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} (id={})",
            self.display_domain(),
            self.record_class,
            self.record_type,
            self.id
        )
    }
}
