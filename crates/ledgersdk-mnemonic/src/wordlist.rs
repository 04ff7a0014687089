//! Thin wrapper over `tiny-bip39`'s English wordlist: word/index lookup
//! only. Entropy packing, checksums and seed derivation are ours.

use bip39::Language;

/// Looks up a word's 11-bit index (0..2048), if it's in the wordlist.
pub fn word_to_index(word: &str) -> Option<u16> {
    Language::English.wordlist().get_index(word).ok().map(|i| i as u16)
}

/// Looks up the word for an 11-bit index. Panics if `index >= 2048`; callers
/// only ever pass values already masked to 11 bits.
pub fn index_to_word(index: u16) -> &'static str {
    Language::English.wordlist().get_word(index.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_word_round_trips() {
        let index = word_to_index("abandon").unwrap();
        assert_eq!(index_to_word(index), "abandon");
    }

    #[test]
    fn unknown_word_is_none() {
        assert!(word_to_index("notarealbip39word").is_none());
    }
}
