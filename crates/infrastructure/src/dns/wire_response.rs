use hickory_proto::op::ResponseCode;

const HEADER_LEN: usize = 12;
const QR_BIT: u8 = 0x80;
const OPCODE_MASK: u8 = 0x78;
const RD_BIT: u8 = 0x01;
const RA_BIT: u8 = 0x80;

/// Builds a header-only error response straight from the raw query bytes.
///
/// Used when the datagram is too broken for the codec but still carries a
/// full header, so the client gets its transaction id back instead of a
/// timeout. Echoes ID, OPCODE and RD; all section counts are zero.
///
/// Returns `None` when the buffer is shorter than a header or is itself a
/// response (QR set).
pub fn build_header_error_response(query_buf: &[u8], code: ResponseCode) -> Option<[u8; HEADER_LEN]> {
    if query_buf.len() < HEADER_LEN || query_buf[2] & QR_BIT != 0 {
        return None;
    }

    let mut buf = [0u8; HEADER_LEN];
    buf[0] = query_buf[0];
    buf[1] = query_buf[1];
    buf[2] = QR_BIT | (query_buf[2] & (OPCODE_MASK | RD_BIT));
    buf[3] = RA_BIT | (u16::from(code) & 0x0F) as u8;

    Some(buf)
}
