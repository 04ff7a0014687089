//! The standard 12/24-word BIP-39 scheme.

use hmac::Hmac;
use pbkdf2::pbkdf2;
use sha2::{Digest, Sha256, Sha512};
use zeroize::Zeroize;

use crate::bits::{bits_to_bytes, push_bits, read_bits};
use crate::error::{MnemonicError, ParseReason};
use crate::wordlist;

/// A parsed 12- or 24-word BIP-39 mnemonic.
pub struct StandardMnemonic {
    words: Vec<String>,
    entropy: Vec<u8>,
}

impl StandardMnemonic {
    /// Generates a fresh mnemonic with `word_count` words (12 or 24).
    pub fn generate(word_count: usize) -> Result<Self, MnemonicError> {
        let entropy_len = match word_count {
            12 => 16,
            24 => 32,
            n => {
                return Err(MnemonicError::MnemonicParse {
                    reason: ParseReason::BadLength(n),
                    mnemonic: String::new(),
                })
            }
        };
        let mut entropy = vec![0u8; entropy_len];
        rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut entropy);
        let words = Self::words_from_entropy(&entropy);
        Ok(Self { words, entropy })
    }

    /// Parses a space-separated mnemonic string. Validates word count, word
    /// membership, and the embedded checksum.
    pub fn from_phrase(phrase: &str) -> Result<Self, MnemonicError> {
        let words: Vec<String> = phrase.split_whitespace().map(str::to_string).collect();
        if words.len() != 12 && words.len() != 24 {
            return Err(MnemonicError::MnemonicParse {
                reason: ParseReason::BadLength(words.len()),
                mnemonic: phrase.to_string(),
            });
        }

        let mut indices = Vec::with_capacity(words.len());
        let mut unknown = Vec::new();
        for (i, word) in words.iter().enumerate() {
            match wordlist::word_to_index(word) {
                Some(idx) => indices.push(idx),
                None => unknown.push(i),
            }
        }
        if !unknown.is_empty() {
            return Err(MnemonicError::MnemonicParse {
                reason: ParseReason::UnknownWords(unknown),
                mnemonic: phrase.to_string(),
            });
        }

        let mut bits = Vec::with_capacity(words.len() * 11);
        for idx in &indices {
            push_bits(&mut bits, *idx as u32, 11);
        }

        let checksum_bits = words.len() / 3;
        let entropy_bits = bits.len() - checksum_bits;
        let entropy = bits_to_bytes(&bits[..entropy_bits]);
        let embedded_checksum = read_bits(&bits, entropy_bits, checksum_bits);

        let hash = Sha256::digest(&entropy);
        let computed_checksum = (hash[0] as u32) >> (8 - checksum_bits);

        if embedded_checksum != computed_checksum {
            return Err(MnemonicError::MnemonicParse {
                reason: ParseReason::ChecksumMismatch {
                    expected: format!("{computed_checksum:0width$b}", width = checksum_bits),
                    actual: format!("{embedded_checksum:0width$b}", width = checksum_bits),
                },
                mnemonic: phrase.to_string(),
            });
        }

        Ok(Self { words, entropy })
    }

    fn words_from_entropy(entropy: &[u8]) -> Vec<String> {
        let checksum_bits = entropy.len() / 4;
        let hash = Sha256::digest(entropy);
        let checksum_value = (hash[0] as u32) >> (8 - checksum_bits);

        let mut bits = Vec::with_capacity(entropy.len() * 8 + checksum_bits);
        for byte in entropy {
            push_bits(&mut bits, *byte as u32, 8);
        }
        push_bits(&mut bits, checksum_value, checksum_bits);

        bits.chunks(11).map(|chunk| {
            let idx = chunk.iter().fold(0u32, |acc, &bit| (acc << 1) | bit as u32);
            wordlist::index_to_word(idx as u16).to_string()
        }).collect()
    }

    /// Renders back to the original space-separated string.
    pub fn to_phrase(&self) -> String {
        self.words.join(" ")
    }

    /// The raw entropy bytes (16 for 12 words, 32 for 24 words).
    pub fn entropy(&self) -> &[u8] {
        &self.entropy
    }

    /// Derives the 64-byte BIP-39 seed:
    /// `PBKDF2-HMAC-SHA512(words joined with spaces, "mnemonic" + passphrase, 2048, 64)`.
    pub fn to_seed(&self, passphrase: &str) -> [u8; 64] {
        let password = self.to_phrase();
        let salt = format!("mnemonic{passphrase}");
        let mut seed = [0u8; 64];
        pbkdf2::<Hmac<Sha512>>(password.as_bytes(), salt.as_bytes(), 2048, &mut seed);
        seed
    }
}

impl Drop for StandardMnemonic {
    fn drop(&mut self) {
        self.entropy.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_then_parse_round_trips() {
        let m = StandardMnemonic::generate(12).unwrap();
        let phrase = m.to_phrase();
        let parsed = StandardMnemonic::from_phrase(&phrase).unwrap();
        assert_eq!(parsed.to_phrase(), phrase);
        assert_eq!(parsed.entropy(), m.entropy());
    }

    #[test]
    fn generate_24_words_round_trips() {
        let m = StandardMnemonic::generate(24).unwrap();
        assert_eq!(m.to_phrase().split_whitespace().count(), 24);
    }

    #[test]
    fn rejects_wrong_word_count() {
        let err = StandardMnemonic::from_phrase("abandon abandon abandon").unwrap_err();
        assert!(matches!(
            err,
            MnemonicError::MnemonicParse { reason: ParseReason::BadLength(3), .. }
        ));
    }

    #[test]
    fn rejects_unknown_words_with_positions() {
        let mut words = vec!["abandon".to_string(); 12];
        words[3] = "notarealword".to_string();
        words[7] = "alsofake".to_string();
        let err = StandardMnemonic::from_phrase(&words.join(" ")).unwrap_err();
        match err {
            MnemonicError::MnemonicParse { reason: ParseReason::UnknownWords(positions), .. } => {
                assert_eq!(positions, vec![3, 7]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn rejects_bad_checksum() {
        let m = StandardMnemonic::generate(12).unwrap();
        let mut words: Vec<String> = m.to_phrase().split_whitespace().map(str::to_string).collect();
        let last = words.last().unwrap().clone();
        let replacement = if last == "abandon" { "ability" } else { "abandon" };
        *words.last_mut().unwrap() = replacement.to_string();
        let err = StandardMnemonic::from_phrase(&words.join(" "));
        assert!(err.is_err());
    }

    #[test]
    fn seed_derivation_is_deterministic() {
        let m = StandardMnemonic::generate(12).unwrap();
        assert_eq!(m.to_seed(""), m.to_seed(""));
        assert_ne!(m.to_seed(""), m.to_seed("extra"));
    }
}
