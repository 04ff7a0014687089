//! The aggregated error type surfaced across the request-execution loop,
//! transactions and queries. Every lower-layer error enum converts into
//! this one so callers deal with a single type at the crate boundary.

use thiserror::Error;

use ledgersdk_crypto::CryptoError;
use ledgersdk_mnemonic::MnemonicError;
use ledgersdk_primitives::PrimitivesError;
use ledgersdk_rlp::{AbiError, EthereumTxError, RlpError};

/// Top-level error for the client/request-execution/transaction layers.
#[derive(Debug, Error)]
pub enum Error {
    /// The overall deadline elapsed before an attempt succeeded or a
    /// terminal failure was classified.
    #[error("request timed out")]
    TimedOut,

    /// The transport reported a non-application-level RPC failure.
    #[error("transport returned status {0}")]
    GrpcStatus(String),

    /// A response failed to decode from the wire schema.
    #[error("failed to decode response: {0}")]
    FromProtobuf(String),

    /// A request failed to encode to the wire schema.
    #[error("failed to encode request: {0}")]
    RequestParse(String),

    /// A transaction's pre-check returned a terminal failure status.
    #[error("transaction {transaction_id} pre-check failed with status {status}")]
    TransactionPreCheckStatus { status: String, transaction_id: String },

    /// A transaction's pre-check failed before a transaction ID could be
    /// assigned.
    #[error("transaction pre-check failed with status {status}")]
    TransactionNoIdPreCheckStatus { status: String },

    /// A query's pre-check returned a terminal failure status.
    #[error("query pre-check failed with status {status}")]
    QueryPreCheckStatus { status: String },

    /// A query's attached payment pre-check returned a terminal failure
    /// status.
    #[error("query payment {transaction_id} pre-check failed with status {status}")]
    QueryPaymentPreCheckStatus { status: String, transaction_id: String },

    /// A query's payment pre-check failed before a transaction ID could be
    /// assigned.
    #[error("query payment pre-check failed with status {status}")]
    QueryNoPaymentPreCheckStatus { status: String },

    /// Generic parse failure outside the entity-ID/key/mnemonic taxonomies.
    #[error("parse error: {0}")]
    BasicParse(String),

    /// No operator is configured on the client and the transaction has no
    /// explicit payer, or a transaction ID couldn't be derived.
    #[error("no payer account or transaction id available")]
    NoPayerAccountOrTransactionId,

    /// A query's estimated cost exceeded the configured maximum.
    #[error("query cost {cost} exceeds configured maximum {max}")]
    MaxQueryPaymentExceeded { cost: i64, max: i64 },

    /// The client has no healthy node to address the request to.
    #[error("no known node account to address the request to")]
    NodeAccountUnknown,

    /// The transport returned a response status code this crate doesn't
    /// recognize.
    #[error("unrecognized response status {0}")]
    ResponseStatusUnrecognized(String),

    /// Receipt polling reached a terminal, non-success status.
    #[error("transaction {transaction_id} receipt has status {status}")]
    ReceiptStatus { status: String, transaction_id: String },

    /// `toStringWithChecksum` was called without a ledger-id to checksum
    /// against.
    #[error("cannot render a checksum without a ledger id")]
    CannotToStringWithChecksum,

    /// An operation that requires a ledger-id was attempted on a client
    /// without one.
    #[error("cannot {0} without a ledger id")]
    CannotPerformTaskWithoutLedgerId(String),

    /// An entity ID, key, RLP or ABI error from a lower layer.
    #[error(transparent)]
    Primitives(#[from] PrimitivesError),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error(transparent)]
    Mnemonic(#[from] MnemonicError),

    #[error(transparent)]
    Rlp(#[from] RlpError),

    #[error(transparent)]
    Abi(#[from] AbiError),

    #[error(transparent)]
    EthereumTx(#[from] EthereumTxError),
}
