//! Message and bundle encoding.

use super::Argument;

/// Bundle header string, NUL-padded to 8 bytes on the wire
pub const BUNDLE_TAG: &str = "#bundle";

/// The special OSC timetag meaning "process immediately"
pub const IMMEDIATELY: u64 = 1;

fn write_padded_str(buf: &mut Vec<u8>, s: &str) {
    buf.extend_from_slice(s.as_bytes());
    // At least one NUL, then pad to a 4-byte boundary
    let pad = 4 - (s.len() % 4);
    buf.extend(std::iter::repeat(0u8).take(pad));
}

/// Encode one OSC message.
///
/// Callers guarantee that `path` and string arguments contain no NUL.
pub fn encode_message(path: &str, args: &[Argument]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(path.len() + 8 + args.len() * 8);
    write_padded_str(&mut buf, path);

    let mut tags = String::with_capacity(args.len() + 1);
    tags.push(',');
    tags.extend(args.iter().map(Argument::tag));
    write_padded_str(&mut buf, &tags);

    for arg in args {
        match arg {
            Argument::Int(v) => buf.extend_from_slice(&v.to_be_bytes()),
            Argument::Long(v) => buf.extend_from_slice(&v.to_be_bytes()),
            Argument::Float(v) => buf.extend_from_slice(&v.to_be_bytes()),
            Argument::Str(v) => write_padded_str(&mut buf, v),
            Argument::Bool(_) => {}
        }
    }
    buf
}

/// Encode a bundle of already-encoded elements, tagged for immediate delivery.
///
/// Elements keep their own encoding and are written in the given order, each
/// behind a big-endian 32-bit size prefix.
pub fn encode_bundle<'a, I>(elements: I) -> Vec<u8>
where
    I: IntoIterator<Item = &'a [u8]>,
{
    let mut buf = Vec::with_capacity(16);
    write_padded_str(&mut buf, BUNDLE_TAG);
    buf.extend_from_slice(&IMMEDIATELY.to_be_bytes());
    for element in elements {
        buf.extend_from_slice(&(element.len() as i32).to_be_bytes());
        buf.extend_from_slice(element);
    }
    buf
}
