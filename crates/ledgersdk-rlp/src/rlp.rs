//! Recursive-length-prefix encoding and decoding.
//!
//! A single byte below `0x80` is itself. A string of length `n < 56` is
//! prefixed with `0x80+n`; longer strings get `0xb7+len(n)` then big-endian
//! `n` then the bytes. Lists follow the same two-tier scheme with base
//! `0xc0`/`0xf7`. Decoding rejects truncated input, oversized length
//! prefixes, and non-canonical length encodings.

use crate::error::RlpError;

/// A decoded (or to-be-encoded) RLP item: either a byte string or a list of
/// items. This is the shape both the ABI writer's raw fields and the
/// Ethereum transaction fields are built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RlpItem {
    String(Vec<u8>),
    List(Vec<RlpItem>),
}

impl RlpItem {
    /// Convenience constructor for a big-endian scalar, stripped of leading
    /// zero bytes (the canonical RLP encoding of an integer).
    pub fn from_u64(value: u64) -> Self {
        let bytes = value.to_be_bytes();
        let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len() - 1);
        RlpItem::String(bytes[start..].to_vec())
    }

    /// Convenience constructor for a big-endian scalar from an arbitrary
    /// byte buffer, stripping leading zero bytes.
    pub fn from_be_bytes(bytes: &[u8]) -> Self {
        let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
        RlpItem::String(bytes[start..].to_vec())
    }

    /// Decodes this item as an unsigned big-endian integer, erroring if it
    /// isn't a string.
    pub fn as_u64(&self) -> Result<u64, RlpError> {
        match self {
            RlpItem::String(bytes) => {
                if bytes.len() > 8 {
                    return Err(RlpError::OversizedLength);
                }
                let mut buf = [0u8; 8];
                buf[8 - bytes.len()..].copy_from_slice(bytes);
                Ok(u64::from_be_bytes(buf))
            }
            RlpItem::List(_) => Err(RlpError::UnexpectedShape),
        }
    }

    pub fn as_bytes(&self) -> Result<&[u8], RlpError> {
        match self {
            RlpItem::String(bytes) => Ok(bytes),
            RlpItem::List(_) => Err(RlpError::UnexpectedShape),
        }
    }

    pub fn as_list(&self) -> Result<&[RlpItem], RlpError> {
        match self {
            RlpItem::List(items) => Ok(items),
            RlpItem::String(_) => Err(RlpError::UnexpectedShape),
        }
    }

    /// Encodes this item and everything it contains.
    pub fn encode(&self) -> Vec<u8> {
        match self {
            RlpItem::String(data) => encode_bytes(data),
            RlpItem::List(items) => {
                let encoded: Vec<Vec<u8>> = items.iter().map(RlpItem::encode).collect();
                encode_payload_with_list_header(&encoded)
            }
        }
    }

    /// Decodes a single item from `input`, requiring it to consume the
    /// entire buffer.
    pub fn decode(input: &[u8]) -> Result<Self, RlpError> {
        let (item, rest) = Self::decode_prefix(input)?;
        if !rest.is_empty() {
            return Err(RlpError::TrailingBytes(rest.len()));
        }
        Ok(item)
    }

    /// Decodes a single item from the front of `input`, returning it along
    /// with whatever bytes follow it.
    fn decode_prefix(input: &[u8]) -> Result<(Self, &[u8]), RlpError> {
        let &first = input.first().ok_or(RlpError::Truncated { expected: 1, available: 0 })?;
        match first {
            0x00..=0x7f => Ok((RlpItem::String(vec![first]), &input[1..])),
            0x80..=0xb7 => {
                let len = (first - 0x80) as usize;
                let (payload, rest) = take(&input[1..], len)?;
                if len == 1 && payload[0] < 0x80 {
                    return Err(RlpError::NonCanonicalLength);
                }
                Ok((RlpItem::String(payload.to_vec()), rest))
            }
            0xb8..=0xbf => {
                let len_of_len = (first - 0xb7) as usize;
                let len = decode_length(&input[1..], len_of_len)?;
                if len < 56 {
                    return Err(RlpError::NonCanonicalLength);
                }
                let (payload, rest) = take(&input[1 + len_of_len..], len)?;
                Ok((RlpItem::String(payload.to_vec()), rest))
            }
            0xc0..=0xf7 => {
                let len = (first - 0xc0) as usize;
                let (payload, rest) = take(&input[1..], len)?;
                Ok((RlpItem::List(decode_list_payload(payload)?), rest))
            }
            0xf8..=0xff => {
                let len_of_len = (first - 0xf7) as usize;
                let len = decode_length(&input[1..], len_of_len)?;
                if len < 56 {
                    return Err(RlpError::NonCanonicalLength);
                }
                let (payload, rest) = take(&input[1 + len_of_len..], len)?;
                Ok((RlpItem::List(decode_list_payload(payload)?), rest))
            }
        }
    }
}

fn take(input: &[u8], len: usize) -> Result<(&[u8], &[u8]), RlpError> {
    if input.len() < len {
        return Err(RlpError::Truncated { expected: len, available: input.len() });
    }
    Ok(input.split_at(len))
}

fn decode_length(input: &[u8], len_of_len: usize) -> Result<usize, RlpError> {
    let (bytes, _) = take(input, len_of_len)?;
    if bytes[0] == 0 {
        return Err(RlpError::NonCanonicalLength);
    }
    if bytes.len() > std::mem::size_of::<usize>() {
        return Err(RlpError::OversizedLength);
    }
    let mut buf = [0u8; std::mem::size_of::<usize>()];
    buf[std::mem::size_of::<usize>() - bytes.len()..].copy_from_slice(bytes);
    Ok(usize::from_be_bytes(buf))
}

fn decode_list_payload(mut payload: &[u8]) -> Result<Vec<RlpItem>, RlpError> {
    let mut items = Vec::new();
    while !payload.is_empty() {
        let (item, rest) = RlpItem::decode_prefix(payload)?;
        items.push(item);
        payload = rest;
    }
    Ok(items)
}

/// RLP-encodes a byte slice as a string item.
pub fn encode_bytes(data: &[u8]) -> Vec<u8> {
    if data.len() == 1 && data[0] < 0x80 {
        vec![data[0]]
    } else if data.len() < 56 {
        let mut result = vec![0x80 + data.len() as u8];
        result.extend_from_slice(data);
        result
    } else {
        let len_bytes = encode_length(data.len());
        let mut result = vec![0xb7 + len_bytes.len() as u8];
        result.extend_from_slice(&len_bytes);
        result.extend_from_slice(data);
        result
    }
}

/// RLP-encodes a slice of already-encoded items as a list.
pub fn encode_list(items: &[Vec<u8>]) -> Vec<u8> {
    encode_payload_with_list_header(items)
}

fn encode_payload_with_list_header(encoded_items: &[Vec<u8>]) -> Vec<u8> {
    let total_len: usize = encoded_items.iter().map(|e| e.len()).sum();
    let mut result = Vec::with_capacity(total_len + 9);
    if total_len < 56 {
        result.push(0xc0 + total_len as u8);
    } else {
        let len_bytes = encode_length(total_len);
        result.push(0xf7 + len_bytes.len() as u8);
        result.extend_from_slice(&len_bytes);
    }
    for encoded in encoded_items {
        result.extend_from_slice(encoded);
    }
    result
}

/// Encodes a length as minimal big-endian bytes (no leading zero).
fn encode_length(len: usize) -> Vec<u8> {
    let bytes = len.to_be_bytes();
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len() - 1);
    bytes[start..].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_byte_is_itself() {
        assert_eq!(encode_bytes(&[0x00]), vec![0x00]);
        assert_eq!(encode_bytes(&[0x7f]), vec![0x7f]);
    }

    #[test]
    fn short_string_gets_length_prefix() {
        assert_eq!(encode_bytes(b"dog"), vec![0x83, b'd', b'o', b'g']);
    }

    #[test]
    fn empty_string_is_0x80() {
        assert_eq!(encode_bytes(b""), vec![0x80]);
    }

    #[test]
    fn long_string_gets_two_tier_prefix() {
        let data = vec![b'a'; 56];
        let encoded = encode_bytes(&data);
        assert_eq!(encoded[0], 0xb7 + 1);
        assert_eq!(encoded[1], 56);
        assert_eq!(&encoded[2..], &data[..]);
    }

    #[test]
    fn empty_list_is_0xc0() {
        assert_eq!(RlpItem::List(vec![]).encode(), vec![0xc0]);
    }

    #[test]
    fn round_trips_nested_list() {
        let item = RlpItem::List(vec![
            RlpItem::String(b"dog".to_vec()),
            RlpItem::List(vec![RlpItem::from_u64(1024), RlpItem::String(vec![])]),
        ]);
        let encoded = item.encode();
        assert_eq!(RlpItem::decode(&encoded).unwrap(), item);
    }

    #[test]
    fn from_u64_strips_leading_zeros() {
        assert_eq!(RlpItem::from_u64(0).as_bytes().unwrap(), &[] as &[u8]);
        assert_eq!(RlpItem::from_u64(1024).as_bytes().unwrap(), &[0x04, 0x00]);
    }

    #[test]
    fn rejects_truncated_input() {
        let err = RlpItem::decode(&[0x83, b'd', b'o']).unwrap_err();
        assert!(matches!(err, RlpError::Truncated { .. }));
    }

    #[test]
    fn rejects_non_canonical_single_byte_string() {
        // 0x00 should be encoded as itself, not 0x8100.
        let err = RlpItem::decode(&[0x81, 0x00]).unwrap_err();
        assert_eq!(err, RlpError::NonCanonicalLength);
    }

    #[test]
    fn rejects_trailing_bytes() {
        let err = RlpItem::decode(&[0x80, 0x80]).unwrap_err();
        assert_eq!(err, RlpError::TrailingBytes(1));
    }

    #[test]
    fn rejects_oversized_length_prefix() {
        // len_of_len = 9 claims a length that doesn't fit in a usize on most targets,
        // and regardless there isn't enough input to back it.
        let input = [0xbf_u8, 1, 2, 3, 4, 5, 6, 7, 8, 9];
        let err = RlpItem::decode(&input).unwrap_err();
        assert!(matches!(err, RlpError::OversizedLength | RlpError::Truncated { .. }));
    }
}
