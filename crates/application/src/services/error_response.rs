use hickory_proto::op::{Message, ResponseCode};

/// Synthesizes an answerless response to `query` carrying `code`.
///
/// Keeps the transaction id, opcode, RD/CD flags and the question section so
/// the client can correlate it like any other reply.
pub fn build_error_response(query: &Message, code: ResponseCode) -> Message {
    let mut response = Message::error_msg(query.id(), query.op_code(), code);
    response
        .set_recursion_desired(query.recursion_desired())
        .set_checking_disabled(query.checking_disabled())
        .set_recursion_available(true);
    response.add_queries(query.queries().iter().cloned());
    response
}
