//! Key material for the ledger SDK: Ed25519 and ECDSA secp256k1 private and
//! public keys, signing, verification, hierarchical derivation, and EVM
//! address computation.

pub mod ecdsa;
pub mod ed25519;
pub mod error;
pub mod key;

pub use ecdsa::{EcdsaPrivateKey, EcdsaPublicKey};
pub use ed25519::{Ed25519PrivateKey, Ed25519PublicKey};
pub use error::CryptoError;
pub use key::{PrivateKey, PublicKey};
