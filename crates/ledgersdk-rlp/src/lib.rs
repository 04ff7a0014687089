//! RLP encoding, Solidity ABI call data, and Ethereum-style transaction
//! codecs used by externally-formatted signed transactions.

pub mod abi;
pub mod error;
pub mod ethereum_tx;
pub mod rlp;

pub use abi::{decode_return, encode_call, selector, AbiType, AbiValue};
pub use error::{AbiError, EthereumTxError, RlpError};
pub use ethereum_tx::{AccessListEntry, EthereumTransaction};
pub use rlp::RlpItem;
