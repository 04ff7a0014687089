//! The per-type transaction payload. Concrete body types (one per
//! transaction kind) implement this; the common `Transaction<B>` base
//! handles everything else (spec §1: "the spec covers the common base
//! behavior and the contract-create flow", not per-type builder
//! ergonomics for every kind).

/// A transaction's type-specific payload: knows how to serialize itself
/// into the wire body and, for chunked kinds, how to split across
/// multiple chunks.
pub trait TransactionBody: Clone + Send + Sync + 'static {
    /// Serializes this body's fields (not the envelope: payer, node id,
    /// transaction id and signatures are handled by `Transaction<B>`).
    fn to_bytes(&self) -> Vec<u8>;

    /// Deserializes a body previously produced by [`TransactionBody::to_bytes`].
    fn from_bytes(bytes: &[u8]) -> Result<Self, crate::error::TransactionError>
    where
        Self: Sized;
}
