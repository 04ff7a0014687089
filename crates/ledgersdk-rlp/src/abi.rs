//! Solidity ABI call-data writer and return-value reader.
//!
//! Call data is `selector(signature)‖arg0‖arg1‖…`. Each argument occupies a
//! 32-byte "head" slot. Static arguments write their value directly into
//! the head; dynamic arguments (bytes, string, dynamic arrays) write a
//! 32-byte big-endian offset into the head and append their length-prefixed
//! payload to the "tail" region after all heads. Arrays of static type
//! prepend a 32-byte element count ahead of their elements; arrays of
//! dynamic type are themselves dynamic and use per-element offsets within
//! their own payload.

use primitive_types::U256;
use sha3::{Digest, Keccak256};

use crate::error::AbiError;

const WORD: usize = 32;

/// A single ABI value to encode, or the schema used to decode a return
/// value. Only the subset of Solidity types this crate's callers need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiValue {
    Uint256(U256),
    Int256(U256),
    Address([u8; 20]),
    Bool(bool),
    Bytes32([u8; 32]),
    Bytes(Vec<u8>),
    String(String),
    /// A homogeneous array; `true` marks the element type as dynamic.
    Array(Vec<AbiValue>, bool),
}

impl AbiValue {
    fn is_dynamic(&self) -> bool {
        matches!(self, AbiValue::Bytes(_) | AbiValue::String(_) | AbiValue::Array(_, true))
    }

    fn head_and_tail(&self, tail_offset_base: usize) -> (Vec<u8>, Vec<u8>) {
        match self {
            AbiValue::Uint256(v) | AbiValue::Int256(v) => (u256_to_word(*v), Vec::new()),
            AbiValue::Address(addr) => {
                let mut word = [0u8; WORD];
                word[WORD - 20..].copy_from_slice(addr);
                (word.to_vec(), Vec::new())
            }
            AbiValue::Bool(b) => {
                let mut word = [0u8; WORD];
                word[WORD - 1] = *b as u8;
                (word.to_vec(), Vec::new())
            }
            AbiValue::Bytes32(bytes) => (bytes.to_vec(), Vec::new()),
            AbiValue::Bytes(data) => {
                let tail = encode_length_prefixed(data);
                (u256_to_word(U256::from(tail_offset_base)), tail)
            }
            AbiValue::String(s) => {
                let tail = encode_length_prefixed(s.as_bytes());
                (u256_to_word(U256::from(tail_offset_base)), tail)
            }
            AbiValue::Array(items, dynamic_elements) => {
                let tail = if *dynamic_elements {
                    encode_dynamic_array_body(items)
                } else {
                    encode_static_array_body(items)
                };
                (u256_to_word(U256::from(tail_offset_base)), tail)
            }
        }
    }
}

fn u256_to_word(v: U256) -> Vec<u8> {
    let mut word = [0u8; WORD];
    v.to_big_endian(&mut word);
    word.to_vec()
}

fn encode_length_prefixed(data: &[u8]) -> Vec<u8> {
    let mut out = u256_to_word(U256::from(data.len()));
    out.extend_from_slice(data);
    let padding = (WORD - data.len() % WORD) % WORD;
    out.extend(std::iter::repeat(0u8).take(padding));
    out
}

fn encode_static_array_body(items: &[AbiValue]) -> Vec<u8> {
    let mut out = u256_to_word(U256::from(items.len()));
    out.extend(encode_head_tail_region(items));
    out
}

fn encode_dynamic_array_body(items: &[AbiValue]) -> Vec<u8> {
    let mut out = u256_to_word(U256::from(items.len()));
    out.extend(encode_head_tail_region(items));
    out
}

/// Encodes a sequence of values as a contiguous head region (one word per
/// value, or an offset word for dynamic values) followed by the tail
/// region of dynamic payloads, in argument order.
fn encode_head_tail_region(items: &[AbiValue]) -> Vec<u8> {
    let head_len = items.len() * WORD;
    let mut heads = Vec::with_capacity(head_len);
    let mut tails = Vec::new();
    for item in items {
        let (head, tail) = item.head_and_tail(head_len + tails.len());
        heads.extend(head);
        tails.extend(tail);
    }
    heads.extend(tails);
    heads
}

/// Builds the 4-byte Keccak-256 function selector for a canonical
/// signature such as `"foo(uint256,bool)"`.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = Keccak256::digest(signature.as_bytes());
    let mut out = [0u8; 4];
    out.copy_from_slice(&hash[..4]);
    out
}

/// Writes call data: the 4-byte selector followed by the head/tail-encoded
/// arguments.
pub fn encode_call(signature: &str, args: &[AbiValue]) -> Vec<u8> {
    let mut out = selector(signature).to_vec();
    out.extend(encode_head_tail_region(args));
    out
}

/// Schema for decoding one return value; mirrors [`AbiValue`]'s shape
/// without carrying data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbiType {
    Uint256,
    Int256,
    Address,
    Bool,
    Bytes32,
    Bytes,
    String,
}

/// Decodes a sequence of return values out of ABI-encoded `data` according
/// to `schema`, in order.
pub fn decode_return(data: &[u8], schema: &[AbiType]) -> Result<Vec<AbiValue>, AbiError> {
    let mut out = Vec::with_capacity(schema.len());
    for (i, ty) in schema.iter().enumerate() {
        let head = read_word(data, i * WORD)?;
        out.push(match ty {
            AbiType::Uint256 => AbiValue::Uint256(U256::from_big_endian(&head)),
            AbiType::Int256 => AbiValue::Int256(U256::from_big_endian(&head)),
            AbiType::Address => {
                let mut addr = [0u8; 20];
                addr.copy_from_slice(&head[WORD - 20..]);
                AbiValue::Address(addr)
            }
            AbiType::Bool => AbiValue::Bool(head[WORD - 1] != 0),
            AbiType::Bytes32 => AbiValue::Bytes32(head),
            AbiType::Bytes => {
                let offset = u256_as_usize(&head)?;
                AbiValue::Bytes(read_dynamic_bytes(data, offset)?)
            }
            AbiType::String => {
                let offset = u256_as_usize(&head)?;
                let bytes = read_dynamic_bytes(data, offset)?;
                AbiValue::String(
                    String::from_utf8(bytes).map_err(|_| AbiError::OffsetOutOfBounds { offset, len: data.len() })?,
                )
            }
        });
    }
    Ok(out)
}

fn read_word(data: &[u8], at: usize) -> Result<[u8; WORD], AbiError> {
    if data.len() < at + WORD {
        return Err(AbiError::TruncatedData { expected: at + WORD, actual: data.len() });
    }
    let mut word = [0u8; WORD];
    word.copy_from_slice(&data[at..at + WORD]);
    Ok(word)
}

fn u256_as_usize(word: &[u8; WORD]) -> Result<usize, AbiError> {
    let v = U256::from_big_endian(word);
    usize::try_from(v).map_err(|_| AbiError::OffsetOutOfBounds { offset: usize::MAX, len: 0 })
}

fn read_dynamic_bytes(data: &[u8], offset: usize) -> Result<Vec<u8>, AbiError> {
    let len_word = read_word(data, offset).map_err(|_| AbiError::OffsetOutOfBounds { offset, len: data.len() })?;
    let len = u256_as_usize(&len_word)?;
    let start = offset + WORD;
    if data.len() < start + len {
        return Err(AbiError::TruncatedData { expected: start + len, actual: data.len() });
    }
    Ok(data[start..start + len].to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_matches_known_signature() {
        // transfer(address,uint256), a widely published reference value.
        assert_eq!(hex::encode(selector("transfer(address,uint256)")), "a9059cbb");
    }

    #[test]
    fn encodes_static_uint_and_bool() {
        let data = encode_call("foo(uint256,bool)", &[AbiValue::Uint256(U256::from(42u64)), AbiValue::Bool(true)]);
        assert_eq!(data.len(), 4 + 64);
        assert_eq!(data[4 + 31], 42);
        assert_eq!(data[4 + 63], 1);
    }

    #[test]
    fn encodes_dynamic_string_with_offset_and_tail() {
        let data = encode_call("foo(string)", &[AbiValue::String("dog".into())]);
        // head: offset to tail (one word in)
        assert_eq!(&data[4..4 + 32], &u256_to_word(U256::from(32u64))[..]);
        // tail: length then padded bytes
        assert_eq!(&data[4 + 32..4 + 64], &u256_to_word(U256::from(3u64))[..]);
        assert_eq!(&data[4 + 64..4 + 67], b"dog");
    }

    #[test]
    fn decode_return_round_trips_uint_and_address() {
        let addr = [0x11u8; 20];
        let data = encode_head_tail_region(&[AbiValue::Uint256(U256::from(7u64)), AbiValue::Address(addr)]);
        let decoded = decode_return(&data, &[AbiType::Uint256, AbiType::Address]).unwrap();
        assert_eq!(decoded[0], AbiValue::Uint256(U256::from(7u64)));
        assert_eq!(decoded[1], AbiValue::Address(addr));
    }

    #[test]
    fn decode_return_round_trips_dynamic_bytes() {
        let data = encode_head_tail_region(&[AbiValue::Bytes(vec![1, 2, 3, 4, 5])]);
        let decoded = decode_return(&data, &[AbiType::Bytes]).unwrap();
        assert_eq!(decoded[0], AbiValue::Bytes(vec![1, 2, 3, 4, 5]));
    }

    #[test]
    fn decode_return_rejects_truncated_data() {
        let err = decode_return(&[0u8; 10], &[AbiType::Uint256]).unwrap_err();
        assert!(matches!(err, AbiError::TruncatedData { .. }));
    }
}
