//! Packet decoding, used to inspect resolved payloads.

use super::encode::BUNDLE_TAG;
use super::Argument;
use crate::error::DecodeError;
use serde::Serialize;
use std::fmt;

/// A decoded OSC packet
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "packet", rename_all = "lowercase")]
pub enum Packet {
    Message { path: String, args: Vec<Argument> },
    Bundle { timetag: u64, elements: Vec<Packet> },
}

impl Packet {
    /// Flatten to the messages in wire order, descending into nested bundles
    pub fn messages(&self) -> Vec<(&str, &[Argument])> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(packet) = stack.pop() {
            match packet {
                Packet::Message { path, args } => out.push((path.as_str(), args.as_slice())),
                Packet::Bundle { elements, .. } => stack.extend(elements.iter().rev()),
            }
        }
        out
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Packet::Message { path, args } => {
                write!(f, "{}", path)?;
                for arg in args {
                    write!(f, " {}", arg)?;
                }
                Ok(())
            }
            Packet::Bundle { elements, .. } => {
                write!(f, "[")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", element)?;
                }
                write!(f, "]")
            }
        }
    }
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.bytes.len())
            .ok_or(DecodeError::Truncated(self.pos))?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn padded_str(&mut self) -> Result<String, DecodeError> {
        let start = self.pos;
        let rest = &self.bytes[start..];
        let nul = rest
            .iter()
            .position(|b| *b == 0)
            .ok_or(DecodeError::UnterminatedString(start))?;
        let s = std::str::from_utf8(&rest[..nul])
            .map_err(|_| DecodeError::InvalidUtf8(start))?
            .to_string();
        let padded = (nul / 4 + 1) * 4;
        self.take(padded)?;
        Ok(s)
    }

    fn is_empty(&self) -> bool {
        self.pos >= self.bytes.len()
    }
}

/// Decode a message or bundle packet
pub fn decode_packet(bytes: &[u8]) -> Result<Packet, DecodeError> {
    match bytes.first() {
        Some(b'/') => decode_message(bytes),
        Some(b'#') => decode_bundle(bytes),
        _ => Err(DecodeError::UnknownPacket),
    }
}

fn decode_message(bytes: &[u8]) -> Result<Packet, DecodeError> {
    let mut reader = Reader { bytes, pos: 0 };
    let path = reader.padded_str()?;
    let tags = reader.padded_str()?;
    let tags = tags.strip_prefix(',').ok_or(DecodeError::MissingTypeTags)?;

    let mut args = Vec::with_capacity(tags.len());
    for tag in tags.chars() {
        let arg = match tag {
            'i' => Argument::Int(i32::from_be_bytes(reader.array()?)),
            'h' => Argument::Long(i64::from_be_bytes(reader.array()?)),
            'f' => Argument::Float(f32::from_be_bytes(reader.array()?)),
            's' => Argument::Str(reader.padded_str()?),
            'T' => Argument::Bool(true),
            'F' => Argument::Bool(false),
            other => return Err(DecodeError::UnsupportedTag(other)),
        };
        args.push(arg);
    }
    Ok(Packet::Message { path, args })
}

fn decode_bundle(bytes: &[u8]) -> Result<Packet, DecodeError> {
    let mut reader = Reader { bytes, pos: 0 };
    if reader.padded_str()? != BUNDLE_TAG {
        return Err(DecodeError::UnknownPacket);
    }
    let timetag = u64::from_be_bytes(reader.array()?);

    let mut elements = Vec::new();
    while !reader.is_empty() {
        let offset = reader.pos;
        let size = i32::from_be_bytes(reader.array()?);
        if size <= 0 || size % 4 != 0 {
            return Err(DecodeError::InvalidElementSize { offset, size });
        }
        let element = reader.take(size as usize)?;
        elements.push(decode_packet(element)?);
    }
    Ok(Packet::Bundle { timetag, elements })
}
