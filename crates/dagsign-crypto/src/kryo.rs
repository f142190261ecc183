// Kryo-compatible string framing
//
// Layout: 0x03 string marker, optional 0x01 reference flag (v1 only),
// variable-length `chars + 1`, then the UTF-8 bytes.

const STRING_MARKER: u8 = 0x03;
const REFERENCE_FLAG: u8 = 0x01;

/// Frames `message` the way Kryo writes a string.
///
/// Currency transactions use v2 framing (`set_references = false`).
pub fn kryo_serialize(message: &str, set_references: bool) -> Vec<u8> {
    let bytes = message.as_bytes();
    let mut out = Vec::with_capacity(bytes.len() + 7);

    out.push(STRING_MARKER);
    if set_references {
        out.push(REFERENCE_FLAG);
    }
    // length counts characters, not bytes
    write_length(&mut out, message.chars().count() as u64 + 1);
    out.extend_from_slice(bytes);
    out
}

/// The first byte holds 6 bits, flagged with 0x80 and, when more bytes
/// follow, 0x40. The remainder is 7-bit groups, 0x80 on all but the last.
fn write_length(out: &mut Vec<u8>, value: u64) {
    if value < 1 << 6 {
        out.push(value as u8 | 0x80);
        return;
    }

    out.push((value & 0x3F) as u8 | 0xC0);
    let mut rest = value >> 6;
    while rest >= 0x80 {
        out.push((rest & 0x7F) as u8 | 0x80);
        rest >>= 7;
    }
    out.push(rest as u8);
}
