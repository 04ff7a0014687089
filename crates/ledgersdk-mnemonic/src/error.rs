//! Error taxonomy for mnemonic parsing and seed derivation.

use thiserror::Error;

/// Why a mnemonic string failed to parse. Aggregated rather than
/// fail-fast-on-first-defect: callers get the most specific diagnosis
/// available.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseReason {
    /// The word count isn't one this crate recognizes (12, 22 or 24).
    #[error("unexpected word count {0}")]
    BadLength(usize),

    /// One or more words aren't in the wordlist. Carries their 0-based
    /// positions so a caller can point a user at the exact typo.
    #[error("unknown words at positions {0:?}")]
    UnknownWords(Vec<usize>),

    /// The trailing checksum bits/byte didn't match the entropy.
    #[error("checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// Checksum computed from the entropy.
        expected: String,
        /// Checksum embedded in the mnemonic.
        actual: String,
    },
}

/// Errors raised while parsing a mnemonic or deriving key material from one.
#[derive(Debug, Clone, Error)]
pub enum MnemonicError {
    /// The mnemonic string didn't parse; see [`ParseReason`].
    #[error("failed to parse mnemonic: {reason}")]
    MnemonicParse {
        /// The specific defect.
        reason: ParseReason,
        /// The offending mnemonic, for diagnostics (callers may wish to
        /// redact this before logging).
        mnemonic: String,
    },

    /// A passphrase was supplied where the scheme forbids one, or some
    /// other entropy-derivation precondition was violated.
    #[error("invalid mnemonic entropy: {0}")]
    MnemonicEntropy(String),
}
