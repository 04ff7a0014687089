//! Error types for RLP decoding, ABI encoding/decoding and Ethereum
//! transaction parsing.

use thiserror::Error;

/// Errors raised while decoding an RLP item.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RlpError {
    /// The buffer ended before the item it was describing did.
    #[error("truncated RLP input: expected {expected} more byte(s), got {available}")]
    Truncated { expected: usize, available: usize },

    /// A multi-byte length prefix encoded a length that itself fits in a
    /// single byte, or had a leading zero byte.
    #[error("non-canonical RLP length encoding")]
    NonCanonicalLength,

    /// A length prefix's declared length overflows `usize` or is absurdly
    /// large relative to the remaining input.
    #[error("oversized RLP length prefix")]
    OversizedLength,

    /// The caller asked for a list item but the payload was a string, or
    /// vice versa.
    #[error("unexpected RLP item shape")]
    UnexpectedShape,

    /// Trailing bytes remained after decoding the expected item.
    #[error("{0} trailing byte(s) after RLP item")]
    TrailingBytes(usize),
}

/// Errors raised while encoding or decoding Solidity ABI call data.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AbiError {
    /// A fixed-size byte type was given data of the wrong length.
    #[error("expected {expected} byte(s) for {type_name}, got {actual}")]
    WrongFixedSize {
        type_name: &'static str,
        expected: usize,
        actual: usize,
    },

    /// The return-data buffer was shorter than the schema requires.
    #[error("truncated ABI return data: expected at least {expected} byte(s), got {actual}")]
    TruncatedData { expected: usize, actual: usize },

    /// A dynamic value's offset slot pointed outside the buffer.
    #[error("ABI offset {offset} out of bounds for buffer of length {len}")]
    OffsetOutOfBounds { offset: usize, len: usize },
}

/// Errors raised while encoding or decoding an Ethereum-style transaction.
#[derive(Debug, Error)]
pub enum EthereumTxError {
    /// The leading type byte wasn't one this crate recognizes.
    #[error("unrecognized Ethereum transaction type byte {0:#04x}")]
    UnknownTxType(u8),

    /// The RLP structure didn't have the field count the transaction type
    /// requires.
    #[error("wrong field count for transaction type: expected {expected}, got {actual}")]
    WrongFieldCount { expected: usize, actual: usize },

    /// A field that must be a fixed-size scalar (e.g. an address) had the
    /// wrong length.
    #[error("malformed field {0}")]
    MalformedField(&'static str),

    /// Underlying RLP decoding failed.
    #[error(transparent)]
    Rlp(#[from] RlpError),
}
