use ferrous_doh_domain::{TrustPolicy, UpstreamConfig};
use hickory_proto::op::{Message, MessageType, OpCode, Query};
use hickory_proto::rr::rdata::A;
use hickory_proto::rr::{Name, RData, Record, RecordType};
use hickory_proto::serialize::binary::BinEncodable;
use std::net::Ipv4Addr;
use std::str::FromStr;

pub fn query_message(id: u16, domain: &str, record_type: RecordType) -> Message {
    let mut message = Message::new();
    message
        .set_id(id)
        .set_message_type(MessageType::Query)
        .set_op_code(OpCode::Query)
        .set_recursion_desired(true);
    message.add_query(Query::query(Name::from_str(domain).unwrap(), record_type));
    message
}

pub fn query_bytes(id: u16, domain: &str, record_type: RecordType) -> Vec<u8> {
    query_message(id, domain, record_type).to_vec().unwrap()
}

pub fn a_record(domain: &str, ip: Ipv4Addr, ttl: u32) -> Record {
    Record::from_rdata(Name::from_str(domain).unwrap(), ttl, RData::A(A(ip)))
}

pub fn upstream_config(url: String, timeout_ms: u64, tls: TrustPolicy) -> UpstreamConfig {
    UpstreamConfig {
        url,
        timeout_ms,
        tls,
        ..UpstreamConfig::default()
    }
}
