//! The query common base: an optional attached payment transaction, cost
//! estimation, and dispatch over a client's node set (spec §4.6).

use std::time::Duration as StdDuration;

use ledgersdk_client::{Classification, Client, Signer};
use ledgersdk_primitives::AccountId;

use crate::body::TransactionBody;
use crate::error::TransactionError;
use crate::transaction::Transaction;

/// A query's type-specific payload. `is_free` opts a kind like receipt
/// polling out of the cost-estimation/payment round-trip entirely.
pub trait QueryBody: Clone + Send + Sync + 'static {
    fn to_bytes(&self) -> Vec<u8>;

    fn from_bytes(bytes: &[u8]) -> Result<Self, TransactionError>
    where
        Self: Sized;

    /// Whether this query kind never requires a payment (e.g. receipt
    /// polling). Defaults to `false`.
    fn is_free(&self) -> bool {
        false
    }
}

/// The payload of the synthetic payment transaction a paid query attaches
/// as its header: a plain hbar transfer from the payer to the answering
/// node, for the query's quoted cost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPaymentBody {
    pub to: AccountId,
    pub amount_tinybar: i64,
}

impl TransactionBody for QueryPaymentBody {
    fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        let to = self.to.to_string_no_checksum();
        out.extend((to.len() as u32).to_be_bytes());
        out.extend(to.as_bytes());
        out.extend(self.amount_tinybar.to_be_bytes());
        out
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, TransactionError> {
        let err = || TransactionError::BodyDecode("truncated QueryPaymentBody".into());
        if bytes.len() < 4 {
            return Err(err());
        }
        let to_len = u32::from_be_bytes(bytes[0..4].try_into().unwrap()) as usize;
        let mut offset = 4;
        let to_str = std::str::from_utf8(bytes.get(offset..offset + to_len).ok_or_else(err)?).map_err(|_| err())?;
        let to = AccountId::from_str_checked(to_str, None).map_err(|e| TransactionError::BodyDecode(e.to_string()))?;
        offset += to_len;
        let amount_tinybar = i64::from_be_bytes(bytes.get(offset..offset + 8).ok_or_else(err)?.try_into().unwrap());
        Ok(Self { to, amount_tinybar })
    }
}

/// A query before/after its optional payment is attached.
pub struct Query<Q: QueryBody> {
    body: Q,
    node_ids: Option<Vec<AccountId>>,
    max_query_payment: Option<i64>,
    payment: Option<Transaction<QueryPaymentBody>>,
}

impl<Q: QueryBody> Query<Q> {
    pub fn new(body: Q) -> Self {
        Self { body, node_ids: None, max_query_payment: None, payment: None }
    }

    pub fn set_node_ids(&mut self, node_ids: Vec<AccountId>) {
        self.node_ids = Some(node_ids);
    }

    pub fn set_max_query_payment(&mut self, max_query_payment: i64) {
        self.max_query_payment = Some(max_query_payment);
    }

    pub fn body(&self) -> &Q {
        &self.body
    }

    pub fn payment(&self) -> Option<&Transaction<QueryPaymentBody>> {
        self.payment.as_ref()
    }

    fn candidate_nodes(&self, client: &Client) -> Vec<AccountId> {
        self.node_ids.clone().unwrap_or_else(|| client.network().sorted_node_ids())
    }

    /// Runs the full query lifecycle: for a free query, dispatches
    /// directly; for a paid query, first probes cost via `classify_cost`,
    /// fails with `MaxQueryPaymentExceeded` if it exceeds the configured
    /// ceiling, else builds, signs and attaches a payment transfer before
    /// re-sending. Classifies the final response via `classify_response`.
    pub async fn execute<Fcost, Fresp>(
        &mut self,
        client: &Client,
        signer: &Signer,
        classify_cost: Fcost,
        classify_response: Fresp,
        timeout: Option<StdDuration>,
    ) -> Result<Vec<u8>, TransactionError>
    where
        Fcost: Fn(&[u8]) -> Classification<i64>,
        Fresp: Fn(&[u8]) -> Classification<Vec<u8>>,
    {
        let nodes = self.candidate_nodes(client);
        if nodes.is_empty() {
            return Err(TransactionError::Client(ledgersdk_client::Error::NodeAccountUnknown));
        }

        if !self.body.is_free() {
            let cost = self.dispatch(client, &nodes, &self.body.to_bytes(), &classify_cost, timeout).await?;
            let max = self.max_query_payment.unwrap_or(client.config().default_max_query_payment);
            if cost > max {
                return Err(TransactionError::Client(ledgersdk_client::Error::MaxQueryPaymentExceeded { cost, max }));
            }

            let payer = client
                .operator()
                .map(|op| op.account_id.clone())
                .ok_or(TransactionError::Client(ledgersdk_client::Error::NoPayerAccountOrTransactionId))?;
            let payment_body = QueryPaymentBody { to: nodes[0].clone(), amount_tinybar: cost };
            let mut payment = Transaction::new(payment_body);
            payment.set_payer(payer)?;
            payment.set_node_ids(vec![nodes[0].clone()])?;
            let mut payment = payment.freeze_with(client)?;
            payment.sign_with_signer(signer)?;
            self.payment = Some(payment);
        }

        let request = match &self.payment {
            Some(payment) => {
                let mut bytes = Vec::new();
                let payment_bytes = payment.body().to_bytes();
                bytes.extend((payment_bytes.len() as u32).to_be_bytes());
                bytes.extend(payment_bytes);
                bytes.extend(self.body.to_bytes());
                bytes
            }
            None => self.body.to_bytes(),
        };

        self.dispatch(client, &nodes, &request, &classify_response, timeout).await
    }

    async fn dispatch<T>(
        &self,
        client: &Client,
        nodes: &[AccountId],
        request: &[u8],
        classify: &impl Fn(&[u8]) -> Classification<T>,
        timeout: Option<StdDuration>,
    ) -> Result<T, TransactionError> {
        let deadline = tokio::time::Instant::now() + timeout.unwrap_or(client.config().default_request_timeout);
        let mut attempt: u32 = 0;
        loop {
            if tokio::time::Instant::now() >= deadline {
                return Err(TransactionError::Client(ledgersdk_client::Error::TimedOut));
            }
            let idx = attempt as usize % nodes.len();
            let node_idx = client
                .network()
                .nodes()
                .iter()
                .position(|node| &node.account_id == &nodes[idx])
                .ok_or(TransactionError::Client(ledgersdk_client::Error::NodeAccountUnknown))?;
            let channel = client.channel_for(node_idx);
            match channel.submit_query(request.to_vec()).await {
                Ok(response) => match classify(&response) {
                    Classification::Ok(value) => return Ok(value),
                    Classification::Retryable => {}
                    Classification::Terminal(err) => return Err(TransactionError::Client(err)),
                },
                Err(_) => {}
            }
            let delay = ledgersdk_client::backoff_delay(attempt);
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            if remaining.is_zero() {
                return Err(TransactionError::Client(ledgersdk_client::Error::TimedOut));
            }
            tokio::time::sleep(delay.min(remaining)).await;
            attempt += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ledgersdk_client::{ChannelFactory, NetworkPreset, NodeChannel, TransportError};
    use ledgersdk_crypto::PrivateKey;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Clone)]
    struct PingBody;
    impl QueryBody for PingBody {
        fn to_bytes(&self) -> Vec<u8> {
            vec![7]
        }
        fn from_bytes(_bytes: &[u8]) -> Result<Self, TransactionError> {
            Ok(PingBody)
        }
    }

    #[derive(Clone)]
    struct FreeBody;
    impl QueryBody for FreeBody {
        fn to_bytes(&self) -> Vec<u8> {
            vec![9]
        }
        fn from_bytes(_bytes: &[u8]) -> Result<Self, TransactionError> {
            Ok(FreeBody)
        }
        fn is_free(&self) -> bool {
            true
        }
    }

    struct ScriptedChannel {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl NodeChannel for ScriptedChannel {
        async fn submit_transaction(&self, _request: Vec<u8>) -> Result<Vec<u8>, TransportError> {
            Ok(vec![0])
        }
        async fn submit_query(&self, _request: Vec<u8>) -> Result<Vec<u8>, TransportError> {
            let n = self.calls.fetch_add(1, Ordering::Relaxed);
            // First call (cost probe) returns a cost encoded as a single byte; second returns the answer.
            Ok(vec![n as u8])
        }
    }

    fn factory() -> ChannelFactory {
        Arc::new(|_account, _endpoint| Arc::new(ScriptedChannel { calls: AtomicUsize::new(0) }) as Arc<dyn NodeChannel>)
    }

    fn test_client() -> Client {
        let mut client = Client::for_preset(NetworkPreset::Testnet, factory());
        client.set_operator(AccountId::new(0, 0, 2), Signer::from_private_key(PrivateKey::generate_ed25519()));
        client
    }

    #[tokio::test]
    async fn paid_query_attaches_payment_when_cost_is_within_max() {
        let client = test_client();
        let signer = Signer::from_private_key(PrivateKey::generate_ed25519());
        let mut query = Query::new(PingBody);
        query.set_max_query_payment(1_000);
        let result = query
            .execute(&client, &signer, |r| Classification::Ok(r[0] as i64), |r| Classification::Ok(r.to_vec()), None)
            .await
            .unwrap();
        assert!(query.payment().is_some());
        assert_eq!(result, vec![1]);
    }

    #[tokio::test]
    async fn paid_query_fails_when_cost_exceeds_max() {
        let client = test_client();
        let signer = Signer::from_private_key(PrivateKey::generate_ed25519());
        let mut query = Query::new(PingBody);
        query.set_max_query_payment(0);
        let result = query
            .execute(&client, &signer, |_r| Classification::Ok(5_000i64), |r| Classification::Ok(r.to_vec()), None)
            .await;
        assert!(matches!(
            result,
            Err(TransactionError::Client(ledgersdk_client::Error::MaxQueryPaymentExceeded { .. }))
        ));
    }

    #[tokio::test]
    async fn free_query_skips_payment_entirely() {
        let client = test_client();
        let signer = Signer::from_private_key(PrivateKey::generate_ed25519());
        let mut query = Query::new(FreeBody);
        let result = query
            .execute(&client, &signer, |_| Classification::Ok(0), |r| Classification::Ok(r.to_vec()), None)
            .await
            .unwrap();
        assert!(query.payment().is_none());
        assert_eq!(result, vec![0]);
    }
}
