//! Client-side SDK core for a distributed-ledger network.
//!
//! This crate is a thin façade: it re-exports `ledgersdk-primitives`,
//! `ledgersdk-crypto`, `ledgersdk-mnemonic`, `ledgersdk-rlp`,
//! `ledgersdk-client` and `ledgersdk-transactions` under one dependency so
//! a consumer only needs one line in `Cargo.toml`. There is no additional
//! logic here and no CLI/binary target.

pub use ledgersdk_primitives as primitives;
pub use ledgersdk_primitives::{
    AccountAddress, AccountId, ContractAddress, ContractId, Duration, FileId, Hbar, HbarUnit,
    LedgerId, NftId, PrimitivesError, ScheduleId, Timestamp, TokenId, TopicId,
};

pub use ledgersdk_crypto as crypto;
pub use ledgersdk_crypto::{
    CryptoError, EcdsaPrivateKey, EcdsaPublicKey, Ed25519PrivateKey, Ed25519PublicKey, PrivateKey,
    PublicKey,
};

pub use ledgersdk_mnemonic as mnemonic;
pub use ledgersdk_mnemonic::{LegacyMnemonic, Mnemonic, MnemonicError, ParseReason, StandardMnemonic};

pub use ledgersdk_rlp as rlp;
pub use ledgersdk_rlp::{
    decode_return, encode_call, selector, AbiError, AbiType, AbiValue, AccessListEntry,
    EthereumTransaction, EthereumTxError, RlpError, RlpItem,
};

pub use ledgersdk_client as client;
pub use ledgersdk_client::{
    backoff_delay, execute_with_retry, ChannelFactory, Classification, Client, ClientConfig,
    Error as ClientError, NetworkPreset, NetworkView, NodeChannel, NodeEntry, Operator,
    PresetNode, Signer, TransportError,
};

pub use ledgersdk_transactions as transactions;
pub use ledgersdk_transactions::{
    ChunkedTransaction, ContractCreateBody, ContractCreateFlow, FileAppendBody, FileCreateBody,
    FileDeleteBody, Query, QueryBody, QueryPaymentBody, ReceiptQueryBody, Transaction,
    TransactionBody, TransactionError, TransactionId, TransactionResponse, TopicMessageSubmit,
    TopicMessageSubmitBody,
};
