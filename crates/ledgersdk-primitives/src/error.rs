//! Error types shared by every primitive in this crate.

use thiserror::Error;

/// Errors raised while parsing or validating a primitive value.
#[derive(Debug, Clone, Error)]
pub enum PrimitivesError {
    /// An entity-id string did not match any accepted grammar, or its
    /// embedded checksum did not match the active ledger.
    #[error("invalid entity id `{input}`: {reason}")]
    BadEntityId {
        /// The raw string that failed to parse.
        input: String,
        /// Human-readable reason.
        reason: String,
    },

    /// A checksum segment was present but did not match the checksum
    /// computed for the active ledger.
    #[error(
        "entity id {shard}.{realm}.{num} checksum mismatch: expected `{expected}`, got `{actual}`"
    )]
    ChecksumMismatch {
        /// Shard number.
        shard: u64,
        /// Realm number.
        realm: u64,
        /// Entity number.
        num: u64,
        /// Checksum computed against the active ledger.
        expected: String,
        /// Checksum embedded in the parsed string.
        actual: String,
    },

    /// `Hbar::from` received a value that isn't representable exactly,
    /// or is NaN/infinite.
    #[error("hbar amount {0} is not a whole number of tinybars")]
    NotWholeTinybars(f64),

    /// An hbar string did not parse (bad number or unknown unit glyph).
    #[error("invalid hbar string `{0}`")]
    BadHbarString(String),

    /// An operation required a checksum but the value holds none (or vice
    /// versa) — see `CannotToStringWithChecksum` / `CannotPerformTaskWithoutLedgerId`
    /// in the wider SDK error taxonomy.
    #[error("cannot render an entity id with a checksum without a ledger id")]
    CannotToStringWithChecksum,

    /// An operation that depends on the active ledger id was attempted
    /// without one configured.
    #[error("cannot perform `{0}` without a ledger id")]
    CannotPerformTaskWithoutLedgerId(String),
}
