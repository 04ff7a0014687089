//! BIP-39 mnemonics (12/24 words) and the legacy 22-word scheme: parsing,
//! generation, seed derivation and private-key recovery.

mod bits;
pub mod error;
pub mod legacy;
mod mnemonic;
pub mod standard;
mod wordlist;

pub use error::{MnemonicError, ParseReason};
pub use legacy::LegacyMnemonic;
pub use mnemonic::Mnemonic;
pub use standard::StandardMnemonic;
