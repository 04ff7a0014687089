//! Errors specific to transaction/query construction, layered on top of
//! [`ledgersdk_client::Error`] for the execution-loop and lower-layer
//! error kinds.

use thiserror::Error;

/// Errors raised while building, freezing, signing or executing a
/// transaction or query.
#[derive(Debug, Error)]
pub enum TransactionError {
    /// A mutator was called after the transaction was frozen.
    #[error("transaction is frozen and can no longer be modified")]
    AlreadyFrozen,

    /// `freezeWith` was called without a client and no explicit payer/node
    /// list/transaction id had been set.
    #[error("cannot freeze without a client: {0}")]
    CannotFreezeWithoutClient(String),

    /// A chunked transaction's payload needed more chunks than
    /// `max_chunks` allows.
    #[error("message requires {required} chunks, exceeding the maximum of {max}")]
    TooManyChunks { required: usize, max: usize },

    /// A chunk's pre-check failed; the remaining chunks were not sent.
    #[error("chunk {index} failed: {source}")]
    ChunkFailed { index: usize, #[source] source: ledgersdk_client::Error },

    /// Body bytes failed to decode (a malformed `fromBytes` input).
    #[error("failed to decode transaction body: {0}")]
    BodyDecode(String),

    /// The execution-loop/lower-layer error.
    #[error(transparent)]
    Client(#[from] ledgersdk_client::Error),
}
