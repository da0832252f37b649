use ferrous_doh_domain::DnsQuery;
use hickory_proto::op::Message;

/// Summary of the first question, or `None` when the message has no questions.
pub fn summarize_query(message: &Message) -> Option<DnsQuery> {
    let question = message.queries().first()?;
    Some(DnsQuery::new(
        message.id(),
        question.name().to_utf8(),
        question.query_type().to_string(),
        question.query_class().to_string(),
        message.queries().len(),
    ))
}
