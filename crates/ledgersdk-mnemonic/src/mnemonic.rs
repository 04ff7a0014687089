//! The top-level `Mnemonic`, dispatching to the standard 12/24-word scheme
//! or the legacy 22-word scheme by word count.

use ledgersdk_crypto::PrivateKey;

use crate::error::{MnemonicError, ParseReason};
use crate::legacy::LegacyMnemonic;
use crate::standard::StandardMnemonic;

/// A BIP-39 mnemonic (12/24 words) or a legacy mnemonic (22 words).
pub enum Mnemonic {
    /// Standard BIP-39, 12 or 24 words.
    Standard(StandardMnemonic),
    /// Legacy, 22 words, no passphrase.
    Legacy(LegacyMnemonic),
}

impl Mnemonic {
    /// Generates a fresh standard mnemonic with `word_count` words (12 or
    /// 24).
    pub fn generate(word_count: usize) -> Result<Self, MnemonicError> {
        Ok(Self::Standard(StandardMnemonic::generate(word_count)?))
    }

    /// Generates a fresh legacy 22-word mnemonic.
    pub fn generate_legacy() -> Self {
        Self::Legacy(LegacyMnemonic::generate())
    }

    /// Parses a mnemonic string, dispatching on word count: 22 words is the
    /// legacy scheme, 12/24 is standard BIP-39.
    pub fn from_phrase(phrase: &str) -> Result<Self, MnemonicError> {
        match phrase.split_whitespace().count() {
            22 => Ok(Self::Legacy(LegacyMnemonic::from_phrase(phrase)?)),
            12 | 24 => Ok(Self::Standard(StandardMnemonic::from_phrase(phrase)?)),
            n => Err(MnemonicError::MnemonicParse {
                reason: ParseReason::BadLength(n),
                mnemonic: phrase.to_string(),
            }),
        }
    }

    /// Renders back to the original space-separated string.
    pub fn to_phrase(&self) -> String {
        match self {
            Self::Standard(m) => m.to_phrase(),
            Self::Legacy(m) => m.to_phrase(),
        }
    }

    /// Derives the account's Ed25519 private key. For the standard scheme
    /// this is the SLIP-10 master key from the BIP-39 seed; for the legacy
    /// scheme it's the direct entropy-seeded key (which rejects a non-empty
    /// `passphrase`).
    pub fn to_private_key(&self, passphrase: &str) -> Result<PrivateKey, MnemonicError> {
        match self {
            Self::Standard(m) => {
                let seed = m.to_seed(passphrase);
                let key = ledgersdk_crypto::Ed25519PrivateKey::from_seed_with_chain_code(&seed)
                    .map_err(|e| MnemonicError::MnemonicEntropy(e.to_string()))?;
                Ok(PrivateKey::Ed25519(key))
            }
            Self::Legacy(m) => Ok(PrivateKey::Ed25519(m.to_private_key(passphrase)?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatches_by_word_count() {
        let std_phrase = Mnemonic::generate(12).unwrap().to_phrase();
        assert!(matches!(Mnemonic::from_phrase(&std_phrase).unwrap(), Mnemonic::Standard(_)));

        let legacy_phrase = Mnemonic::generate_legacy().to_phrase();
        assert!(matches!(Mnemonic::from_phrase(&legacy_phrase).unwrap(), Mnemonic::Legacy(_)));
    }

    #[test]
    fn string_round_trip() {
        let m = Mnemonic::generate(24).unwrap();
        let phrase = m.to_phrase();
        assert_eq!(Mnemonic::from_phrase(&phrase).unwrap().to_phrase(), phrase);
    }

    #[test]
    fn to_private_key_succeeds_for_both_schemes() {
        assert!(Mnemonic::generate(12).unwrap().to_private_key("").is_ok());
        assert!(Mnemonic::generate_legacy().to_private_key("").is_ok());
    }
}
