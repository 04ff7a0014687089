//! Opaque ledger identity used as the checksum mixing key.

use std::fmt;

/// Identifies the target network a checksum or signature is bound to.
///
/// Comparison and hashing operate on the raw bytes; the three canonical
/// presets are provided as associated constructors.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct LedgerId(Vec<u8>);

impl LedgerId {
    /// Mainnet, byte `0x00`.
    pub fn mainnet() -> Self {
        Self(vec![0x00])
    }

    /// Testnet, byte `0x01`.
    pub fn testnet() -> Self {
        Self(vec![0x01])
    }

    /// Previewnet, byte `0x02`.
    pub fn previewnet() -> Self {
        Self(vec![0x02])
    }

    /// Builds a ledger id from arbitrary bytes (user-supplied networks).
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Raw bytes of this ledger id.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// `true` for the three canonical networks.
    pub fn is_known(&self) -> bool {
        matches!(self.0.as_slice(), [0x00] | [0x01] | [0x02])
    }
}

impl fmt::Debug for LedgerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_slice() {
            [0x00] => write!(f, "LedgerId(mainnet)"),
            [0x01] => write!(f, "LedgerId(testnet)"),
            [0x02] => write!(f, "LedgerId(previewnet)"),
            bytes => write!(f, "LedgerId({})", hex::encode(bytes)),
        }
    }
}

impl fmt::Display for LedgerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_slice() {
            [0x00] => write!(f, "mainnet"),
            [0x01] => write!(f, "testnet"),
            [0x02] => write!(f, "previewnet"),
            bytes => write!(f, "{}", hex::encode(bytes)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_have_distinct_bytes() {
        let ids = [LedgerId::mainnet(), LedgerId::testnet(), LedgerId::previewnet()];
        for (i, a) in ids.iter().enumerate() {
            for (j, b) in ids.iter().enumerate() {
                assert_eq!(i == j, a == b);
            }
        }
    }

    #[test]
    fn display_names_known_networks() {
        assert_eq!(LedgerId::mainnet().to_string(), "mainnet");
        assert_eq!(LedgerId::testnet().to_string(), "testnet");
        assert_eq!(LedgerId::previewnet().to_string(), "previewnet");
    }
}
