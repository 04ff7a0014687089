//! Error types for key parsing, signing and derivation.

use thiserror::Error;

/// Errors raised by key parsing, signing, verification and derivation.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// A key failed to parse from raw bytes, DER, PEM or hex.
    #[error("failed to parse key: {0}")]
    KeyParse(String),

    /// `derive`/`legacyDerive` was attempted on a key without a chain code,
    /// or the derivation index was rejected.
    #[error("failed to derive key: {0}")]
    KeyDerive(String),

    /// Signing failed (only possible for malformed input, never for a
    /// syntactically valid private key).
    #[error("failed to sign: {0}")]
    Signature(String),

    /// Verification failed: algorithm mismatch or an invalid signature.
    #[error("signature verification failed: {0}")]
    SignatureVerify(String),
}
