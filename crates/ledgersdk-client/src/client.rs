//! The `Client`: owns the network view and health map exclusively;
//! requests borrow an immutable snapshot when freezing (spec §3, §9 —
//! never a back-reference from node state to in-flight requests).

use std::sync::Arc;

use ledgersdk_primitives::{AccountId, LedgerId};

use crate::channel::NodeChannel;
use crate::config::{ClientConfig, NetworkPreset};
use crate::network::NetworkView;
use crate::signer::Signer;

/// The default payer account and signer applied to transactions/queries
/// that don't set their own.
#[derive(Clone)]
pub struct Operator {
    pub account_id: AccountId,
    pub signer: Signer,
}

/// Resolves a node's account id to the transport channel that reaches it.
/// The client never constructs channels itself (the transport is an
/// external collaborator, spec §1); callers supply this at construction.
pub type ChannelFactory = Arc<dyn Fn(&AccountId, &str) -> Arc<dyn NodeChannel> + Send + Sync>;

/// The client-side handle requests execute against. Exclusively owns its
/// [`NetworkView`] (node list plus mutable health counters) and
/// configuration. The operator is optional (set later via
/// [`Client::set_operator`]); the channel factory is supplied at
/// construction and required for every constructor, since every request
/// eventually needs a transport to dispatch over.
pub struct Client {
    network: NetworkView,
    config: ClientConfig,
    operator: Option<Operator>,
    channel_factory: ChannelFactory,
}

impl Client {
    /// Builds a client for a named network preset.
    pub fn for_preset(preset: NetworkPreset, channel_factory: ChannelFactory) -> Self {
        let ledger_id = preset.ledger_id();
        let network = NetworkView::new(preset.nodes(), Some(ledger_id));
        Self { network, config: ClientConfig::default(), operator: None, channel_factory }
    }

    /// Builds a client for mainnet.
    pub fn for_mainnet(channel_factory: ChannelFactory) -> Self {
        Self::for_preset(NetworkPreset::Mainnet, channel_factory)
    }

    /// Builds a client for testnet.
    pub fn for_testnet(channel_factory: ChannelFactory) -> Self {
        Self::for_preset(NetworkPreset::Testnet, channel_factory)
    }

    /// Builds a client for previewnet.
    pub fn for_previewnet(channel_factory: ChannelFactory) -> Self {
        Self::for_preset(NetworkPreset::Previewnet, channel_factory)
    }

    /// Builds a client with a caller-supplied node set and ledger id, for
    /// local/custom networks.
    pub fn for_network(
        nodes: Vec<(AccountId, String)>,
        ledger_id: Option<LedgerId>,
        channel_factory: ChannelFactory,
    ) -> Self {
        Self {
            network: NetworkView::new(nodes, ledger_id),
            config: ClientConfig::default(),
            operator: None,
            channel_factory,
        }
    }

    pub fn with_config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    pub fn set_operator(&mut self, account_id: AccountId, signer: Signer) {
        self.operator = Some(Operator { account_id, signer });
    }

    pub fn operator(&self) -> Option<&Operator> {
        self.operator.as_ref()
    }

    pub fn network(&self) -> &NetworkView {
        &self.network
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn ledger_id(&self) -> Option<&LedgerId> {
        self.network.ledger_id()
    }

    /// Resolves the channel for the node at `node_idx` in the current
    /// network view.
    pub fn channel_for(&self, node_idx: usize) -> Arc<dyn NodeChannel> {
        let node = &self.network.nodes()[node_idx];
        (self.channel_factory)(&node.account_id, &node.endpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::test_support::ScriptedChannel;
    use ledgersdk_crypto::PrivateKey;

    fn dummy_factory() -> ChannelFactory {
        Arc::new(|_account, _endpoint| Arc::new(ScriptedChannel::new(vec![])) as Arc<dyn NodeChannel>)
    }

    #[test]
    fn preset_clients_carry_distinct_ledger_ids() {
        let mainnet = Client::for_mainnet(dummy_factory());
        let testnet = Client::for_testnet(dummy_factory());
        assert_ne!(mainnet.ledger_id(), testnet.ledger_id());
    }

    #[test]
    fn operator_round_trips() {
        let mut client = Client::for_testnet(dummy_factory());
        let key = PrivateKey::generate_ed25519();
        let account = AccountId::new(0, 0, 1001);
        client.set_operator(account.clone(), Signer::from_private_key(key));
        assert_eq!(client.operator().unwrap().account_id, account);
    }

    #[test]
    fn custom_network_preserves_node_count() {
        let nodes = vec![(AccountId::new(0, 0, 3), "a:1".to_string()), (AccountId::new(0, 0, 4), "b:2".to_string())];
        let client = Client::for_network(nodes, Some(LedgerId::testnet()), dummy_factory());
        assert_eq!(client.network().nodes().len(), 2);
    }
}
