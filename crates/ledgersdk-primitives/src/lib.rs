//! Core value types shared across the ledger SDK: entity ids, hbar amounts,
//! timestamps, ledger identity, and the entity-id checksum algorithm.
//!
//! This crate has no async runtime, cryptography, or I/O dependency — it is
//! the vocabulary the rest of the SDK is built from.

pub mod checksum;
pub mod entity_id;
pub mod error;
pub mod hbar;
pub mod ledger_id;
pub mod timestamp;

pub use entity_id::{
    AccountAddress, AccountId, ContractAddress, ContractId, FileId, NftId, ScheduleId, TokenId,
    TopicId,
};
pub use error::PrimitivesError;
pub use hbar::{Hbar, HbarUnit};
pub use ledger_id::LedgerId;
pub use timestamp::{Duration, Timestamp};
