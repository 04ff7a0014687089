//! Client configuration: request timeout defaults, fee/payment ceilings,
//! and named network presets.

use std::time::Duration;

use ledgersdk_primitives::{AccountId, LedgerId};

/// Tunables that apply to every request issued by a `Client` unless
/// overridden per call.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Overall deadline for a single `execute`/`getReceipt` call when the
    /// caller doesn't supply one. Spec default: 2 minutes.
    pub default_request_timeout: Duration,
    /// Default max transaction fee, in tinybars, applied to transactions
    /// that don't set one explicitly.
    pub default_max_transaction_fee: i64,
    /// Default max query payment, in tinybars.
    pub default_max_query_payment: i64,
    /// Chunk size, in bytes, used when splitting a chunked transaction's
    /// payload. Spec default: 1024.
    pub default_chunk_size: usize,
    /// Maximum number of chunks a chunked transaction may be split into.
    pub default_max_chunks: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            default_request_timeout: Duration::from_secs(120),
            default_max_transaction_fee: 100_000_000, // 1 hbar in tinybars
            default_max_query_payment: 100_000_000,
            default_chunk_size: 1024,
            default_max_chunks: 20,
        }
    }
}

/// A node entry as supplied by a network preset or a user-supplied map,
/// before it's wrapped in [`crate::network::NetworkView`]'s health
/// bookkeeping.
pub type PresetNode = (AccountId, String);

/// Named network presets. `mainnet`/`testnet`/`previewnet` ship a small
/// seed set of well-known nodes; a real deployment would pull the full set
/// from an address-book query, which is out of scope here (the client
/// accepts a user-supplied map for that case).
pub enum NetworkPreset {
    Mainnet,
    Testnet,
    Previewnet,
    Custom(Vec<PresetNode>, LedgerId),
}

impl NetworkPreset {
    /// The preset's ledger id.
    pub fn ledger_id(&self) -> LedgerId {
        match self {
            NetworkPreset::Mainnet => LedgerId::mainnet(),
            NetworkPreset::Testnet => LedgerId::testnet(),
            NetworkPreset::Previewnet => LedgerId::previewnet(),
            NetworkPreset::Custom(_, ledger_id) => ledger_id.clone(),
        }
    }

    /// The preset's seed node set.
    pub fn nodes(&self) -> Vec<PresetNode> {
        match self {
            NetworkPreset::Mainnet => vec![
                (AccountId::new(0, 0, 3), "35.237.200.180:50211".to_string()),
                (AccountId::new(0, 0, 4), "35.186.191.247:50211".to_string()),
                (AccountId::new(0, 0, 5), "35.192.2.25:50211".to_string()),
            ],
            NetworkPreset::Testnet => vec![
                (AccountId::new(0, 0, 3), "0.testnet.example:50211".to_string()),
                (AccountId::new(0, 0, 4), "1.testnet.example:50211".to_string()),
            ],
            NetworkPreset::Previewnet => vec![
                (AccountId::new(0, 0, 3), "0.previewnet.example:50211".to_string()),
                (AccountId::new(0, 0, 4), "1.previewnet.example:50211".to_string()),
            ],
            NetworkPreset::Custom(nodes, _) => nodes.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_carry_distinct_ledger_ids() {
        assert_ne!(NetworkPreset::Mainnet.ledger_id(), NetworkPreset::Testnet.ledger_id());
        assert_ne!(NetworkPreset::Testnet.ledger_id(), NetworkPreset::Previewnet.ledger_id());
    }

    #[test]
    fn default_config_matches_spec_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.default_request_timeout, Duration::from_secs(120));
        assert_eq!(config.default_chunk_size, 1024);
    }
}
