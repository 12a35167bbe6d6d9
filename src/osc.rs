//! OSC 1.0 wire codec
//!
//! Encodes messages and bundles into the byte form sent over UDP, and decodes
//! them back for inspection. Only the argument types the configuration can
//! express are supported: `i`, `h`, `f`, `s`, `T` and `F`.

mod argument;
mod decode;
mod encode;

pub use argument::Argument;
pub use decode::{decode_packet, Packet};
pub use encode::{encode_bundle, encode_message, BUNDLE_TAG, IMMEDIATELY};
