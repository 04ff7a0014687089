//! The generic execution loop shared by transactions and queries: node
//! selection, attempt, response classification, retry with backoff, and
//! overall deadline enforcement (spec §4.7).

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tracing::{debug, warn};

use crate::channel::{NodeChannel, TransportError};
use crate::error::Error;
use crate::network::{now_millis, NetworkView};

/// How an attempt's raw response bytes (or transport failure) should be
/// handled by the execution loop. Built by the caller's pre-check decoding
/// logic, which this crate deliberately does not hardcode (the wire schema
/// is out of scope, per spec §1).
pub enum Classification<T> {
    /// The attempt succeeded; stop and return this value.
    Ok(T),
    /// Rotate to the next node and retry after backoff (busy/throttled/
    /// platform-not-active/expired-within-grace).
    Retryable,
    /// A terminal pre-check failure; stop and surface this error.
    Terminal(Error),
}

/// Computes `min(250ms * 2^attempt, 8s)` jittered by +/-25%, per spec §4.7.
pub fn backoff_delay(attempt: u32) -> Duration {
    let base_ms = 250u64.saturating_mul(1u64 << attempt.min(5));
    let capped_ms = base_ms.min(8_000);
    let jitter_frac = rand::thread_rng().gen_range(-0.25..=0.25);
    let jittered_ms = (capped_ms as f64 * (1.0 + jitter_frac)).max(0.0) as u64;
    Duration::from_millis(jittered_ms)
}

/// Runs the node-selection/attempt/classify/retry loop until a terminal
/// result, a terminal error, or `timeout` elapses (surfacing `TimedOut`).
///
/// `channel_for` resolves a node index to its transport channel;
/// `build_request` builds the per-node request bytes (transactions
/// pre-compute these per node at freeze time; queries build them fresh);
/// `classify` turns the raw response into a [`Classification`].
pub async fn execute_with_retry<T, F, B, C>(
    network: &NetworkView,
    channel_for: F,
    build_request: B,
    classify: C,
    timeout: Duration,
) -> Result<T, Error>
where
    F: Fn(usize) -> Arc<dyn NodeChannel>,
    B: Fn(usize) -> Vec<u8>,
    C: Fn(&[u8]) -> Classification<T>,
{
    let deadline = tokio::time::Instant::now() + timeout;
    let mut attempt: u32 = 0;

    loop {
        if tokio::time::Instant::now() >= deadline {
            warn!(attempt, "request exceeded overall deadline");
            return Err(Error::TimedOut);
        }

        let Some(node_idx) = network.next_node() else {
            return Err(Error::NodeAccountUnknown);
        };
        let node = &network.nodes()[node_idx];
        let channel = channel_for(node_idx);
        let request = build_request(node_idx);

        debug!(attempt, node = %node.account_id, "dispatching attempt");
        let now = now_millis();
        match channel.submit_transaction(request).await {
            Ok(response) => match classify(&response) {
                Classification::Ok(value) => {
                    node.record_success(now);
                    return Ok(value);
                }
                Classification::Retryable => {
                    node.record_failure(now);
                    debug!(attempt, node = %node.account_id, "retryable pre-check, backing off");
                }
                Classification::Terminal(err) => return Err(err),
            },
            Err(transport_err) => {
                node.record_failure(now);
                warn!(attempt, node = %node.account_id, error = %transport_err, "transport error");
            }
        }

        let delay = backoff_delay(attempt);
        let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
        if remaining.is_zero() {
            return Err(Error::TimedOut);
        }
        tokio::time::sleep(delay.min(remaining)).await;
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::test_support::ScriptedChannel;
    use ledgersdk_primitives::AccountId;

    fn network_of(n: u64) -> NetworkView {
        let entries = (0..n).map(|i| (AccountId::new(0, 0, i), format!("node{i}"))).collect();
        NetworkView::new(entries, None)
    }

    #[tokio::test]
    async fn succeeds_on_first_ok_response() {
        let network = network_of(1);
        let channel: Arc<dyn NodeChannel> = Arc::new(ScriptedChannel::new(vec![Ok(vec![1])]));
        let result = execute_with_retry(
            &network,
            |_| channel.clone(),
            |_| vec![],
            |resp| Classification::Ok(resp.to_vec()),
            Duration::from_secs(5),
        )
        .await;
        assert_eq!(result.unwrap(), vec![1]);
    }

    #[tokio::test]
    async fn retries_past_transport_errors_then_succeeds() {
        let network = network_of(1);
        let channel: Arc<dyn NodeChannel> = Arc::new(ScriptedChannel::new(vec![
            Err(TransportError::ConnectionRefused),
            Err(TransportError::Timeout),
            Ok(vec![9]),
        ]));
        let result = execute_with_retry(
            &network,
            |_| channel.clone(),
            |_| vec![],
            |resp| Classification::Ok(resp.to_vec()),
            Duration::from_secs(5),
        )
        .await;
        assert_eq!(result.unwrap(), vec![9]);
    }

    #[tokio::test]
    async fn terminal_classification_stops_immediately() {
        let network = network_of(1);
        let channel: Arc<dyn NodeChannel> = Arc::new(ScriptedChannel::new(vec![Ok(vec![]), Ok(vec![])]));
        let result: Result<(), Error> = execute_with_retry(
            &network,
            |_| channel.clone(),
            |_| vec![],
            |_| Classification::Terminal(Error::NodeAccountUnknown),
            Duration::from_secs(5),
        )
        .await;
        assert!(matches!(result, Err(Error::NodeAccountUnknown)));
        assert_eq!(channel.calls.load(std::sync::atomic::Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn empty_network_fails_fast() {
        let network = network_of(0);
        let channel: Arc<dyn NodeChannel> = Arc::new(ScriptedChannel::new(vec![]));
        let result: Result<(), Error> = execute_with_retry(
            &network,
            |_| channel.clone(),
            |_| vec![],
            |_| Classification::Ok(()),
            Duration::from_secs(5),
        )
        .await;
        assert!(matches!(result, Err(Error::NodeAccountUnknown)));
    }

    #[tokio::test(start_paused = true)]
    async fn exhausts_deadline_on_persistent_retryable() {
        let network = network_of(1);
        let responses: Vec<Result<Vec<u8>, TransportError>> = (0..50).map(|_| Ok(vec![])).collect();
        let channel: Arc<dyn NodeChannel> = Arc::new(ScriptedChannel::new(responses));
        let result: Result<(), Error> = execute_with_retry(
            &network,
            |_| channel.clone(),
            |_| vec![],
            |_| Classification::<()>::Retryable,
            Duration::from_millis(500),
        )
        .await;
        assert!(matches!(result, Err(Error::TimedOut)));
    }
}
