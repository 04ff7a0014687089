//! The client's immutable network view and its mutable per-node health
//! bookkeeping.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use ledgersdk_primitives::{AccountId, LedgerId};

/// One known node: its account id, RPC endpoint, and health counters.
///
/// Health fields are exposed publicly (not behind an accessor-only API) so
/// integration tests can assert node-rotation fairness and backoff
/// monotonicity directly.
pub struct NodeEntry {
    pub account_id: AccountId,
    pub endpoint: String,
    /// Consecutive transport/retryable failures since the last success.
    pub consecutive_failures: AtomicU32,
    /// Unix-epoch millis after which this node may be selected again.
    pub backoff_until_millis: AtomicU64,
    /// Unix-epoch millis of the last attempt against this node.
    pub last_used_millis: AtomicU64,
}

impl NodeEntry {
    fn new(account_id: AccountId, endpoint: String) -> Self {
        Self {
            account_id,
            endpoint,
            consecutive_failures: AtomicU32::new(0),
            backoff_until_millis: AtomicU64::new(0),
            last_used_millis: AtomicU64::new(0),
        }
    }

    /// `true` if this node's backoff window has elapsed.
    pub fn is_healthy(&self, now_millis: u64) -> bool {
        self.backoff_until_millis.load(Ordering::Relaxed) <= now_millis
    }

    /// Records a successful attempt: resets the failure streak.
    pub fn record_success(&self, now_millis: u64) {
        self.consecutive_failures.store(0, Ordering::Relaxed);
        self.backoff_until_millis.store(0, Ordering::Relaxed);
        self.last_used_millis.store(now_millis, Ordering::Relaxed);
    }

    /// Records a failed attempt: bumps the failure streak and sets a
    /// backoff window proportional to it, capped at 8 s.
    pub fn record_failure(&self, now_millis: u64) {
        let failures = self.consecutive_failures.fetch_add(1, Ordering::Relaxed) + 1;
        let backoff_ms = (250u64.saturating_mul(1u64 << failures.min(5))).min(8_000);
        self.backoff_until_millis.store(now_millis + backoff_ms, Ordering::Relaxed);
        self.last_used_millis.store(now_millis, Ordering::Relaxed);
    }
}

/// Returns the current Unix-epoch time in milliseconds.
pub fn now_millis() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).expect("system clock before epoch").as_millis() as u64
}

/// An immutable snapshot of known nodes plus the ledger-id they belong to.
/// Health state per node is mutable and shared via interior atomics so
/// in-flight requests can update it without taking a lock across I/O.
pub struct NetworkView {
    nodes: Vec<NodeEntry>,
    ledger_id: Option<LedgerId>,
    rotation_cursor: AtomicU32,
}

impl NetworkView {
    /// Builds a view from an ordered `(account_id, endpoint)` list.
    pub fn new(entries: Vec<(AccountId, String)>, ledger_id: Option<LedgerId>) -> Self {
        let mut nodes: Vec<NodeEntry> =
            entries.into_iter().map(|(id, endpoint)| NodeEntry::new(id, endpoint)).collect();
        nodes.sort_by(|a, b| a.account_id.cmp(&b.account_id));
        Self { nodes, ledger_id, rotation_cursor: AtomicU32::new(0) }
    }

    pub fn ledger_id(&self) -> Option<&LedgerId> {
        self.ledger_id.as_ref()
    }

    pub fn nodes(&self) -> &[NodeEntry] {
        &self.nodes
    }

    /// Node account ids sorted ascending, as required when a transaction's
    /// node list is defaulted from the client (spec: "sorted ascending by
    /// account-id").
    pub fn sorted_node_ids(&self) -> Vec<AccountId> {
        self.nodes.iter().map(|n| n.account_id.clone()).collect()
    }

    /// Picks the next node to try: starts from a rotated offset (advanced
    /// on every call, for fairness across executions) and walks forward
    /// until a healthy node is found, wrapping once.
    pub fn next_node(&self) -> Option<usize> {
        if self.nodes.is_empty() {
            return None;
        }
        let start = self.rotation_cursor.fetch_add(1, Ordering::Relaxed) as usize % self.nodes.len();
        let now = now_millis();
        (0..self.nodes.len())
            .map(|offset| (start + offset) % self.nodes.len())
            .find(|&idx| self.nodes[idx].is_healthy(now))
            .or(Some(start))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(n: u64) -> Vec<(AccountId, String)> {
        (0..n).map(|i| (AccountId::new(0, 0, i), format!("node{i}.example:50211"))).collect()
    }

    #[test]
    fn sorted_node_ids_are_ascending() {
        let view = NetworkView::new(entries(3).into_iter().rev().collect(), None);
        let ids = view.sorted_node_ids();
        assert!(ids.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn rotation_is_fair_over_many_calls() {
        let view = NetworkView::new(entries(4), None);
        let mut counts = [0u32; 4];
        for _ in 0..400 {
            let idx = view.next_node().unwrap();
            counts[idx] += 1;
        }
        assert!(counts.iter().all(|&c| c >= 100 - 1));
    }

    #[test]
    fn failure_backoff_is_nondecreasing_until_cap() {
        let node = NodeEntry::new(AccountId::new(0, 0, 3), "x".into());
        let mut last = 0u64;
        for t in [0u64, 10_000, 20_000, 30_000, 40_000, 50_000] {
            node.record_failure(t);
            let until = node.backoff_until_millis.load(Ordering::Relaxed) - t;
            assert!(until >= last || until == 8_000);
            last = until;
        }
    }

    #[test]
    fn empty_network_has_no_next_node() {
        let view = NetworkView::new(vec![], None);
        assert!(view.next_node().is_none());
    }
}
