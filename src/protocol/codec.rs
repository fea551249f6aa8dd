//! Binary-safe reply codec
//!
//! Packs arbitrary (key, value) byte pairs into one flat, delimited reply.
//!
//! ## Encoding
//! ```text
//! 'A'-'Z' 'a'-'z' '0'-'9' '-' '_' '.'   → unchanged
//! ' '                                   → '+'
//! any other byte                        → '%' HEX HEX   (uppercase)
//! ```
//!
//! ## Aggregated reply
//! ```text
//! enc(k1) '=' enc(v1) '&' enc(k2) '=' enc(v2) ... enc(kn) '=' enc(vn)
//! ```
//!
//! Encoded fields never contain `=` or `&`, so a client can split on them.
//! Only encoding lives here; nothing in this crate decodes a reply.

use bytes::{BufMut, Bytes, BytesMut};

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Separates a key from its value
pub const PAIR_SEPARATOR: u8 = b'=';

/// Separates one pair from the next
pub const FIELD_SEPARATOR: u8 = b'&';

/// Upper bound on the encoded length of `len` input bytes, plus one slot
/// for a terminator
pub const fn encoded_len_bound(len: usize) -> usize {
    3 * len + 1
}

#[inline]
fn passes_through(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.')
}

/// Append the encoding of `input` to `out`
pub fn encode_into(out: &mut BytesMut, input: &[u8]) {
    out.reserve(encoded_len_bound(input.len()));
    for &byte in input {
        if byte == b' ' {
            out.put_u8(b'+');
        } else if passes_through(byte) {
            out.put_u8(byte);
        } else {
            out.put_u8(b'%');
            out.put_u8(HEX_DIGITS[(byte >> 4) as usize]);
            out.put_u8(HEX_DIGITS[(byte & 0x0f) as usize]);
        }
    }
}

/// Encode `input` into a fresh buffer
pub fn encode(input: &[u8]) -> Vec<u8> {
    let mut out = BytesMut::with_capacity(encoded_len_bound(input.len()));
    encode_into(&mut out, input);
    out.to_vec()
}

/// Accumulates encoded pairs into one reply.
///
/// Pairs whose value is empty are skipped, never emitted as `key=`.
#[derive(Debug, Default)]
pub struct Aggregator {
    buf: BytesMut,
    pairs: usize,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `enc(key)=enc(value)&`. Returns false if the pair was skipped.
    pub fn push(&mut self, key: &[u8], value: &[u8]) -> bool {
        if value.is_empty() {
            return false;
        }
        encode_into(&mut self.buf, key);
        self.buf.put_u8(PAIR_SEPARATOR);
        encode_into(&mut self.buf, value);
        self.buf.put_u8(FIELD_SEPARATOR);
        self.pairs += 1;
        true
    }

    /// Number of pairs emitted so far
    pub fn len(&self) -> usize {
        self.pairs
    }

    pub fn is_empty(&self) -> bool {
        self.pairs == 0
    }

    /// Finish the reply with the trailing separator removed.
    ///
    /// `None` when no pair was emitted.
    pub fn finish(mut self) -> Option<Bytes> {
        if self.pairs == 0 {
            return None;
        }
        self.buf.truncate(self.buf.len() - 1);
        Some(self.buf.freeze())
    }
}
