//! Common transaction base: a tagged `Building`/`Frozen` variant (spec §9
//! redesign note — mutators only exist on `Building`; `freezeWith`
//! converts once and eliminates the modify-after-freeze check by
//! construction rather than a runtime flag).

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration as StdDuration;

use ledgersdk_client::{Classification, Client, Signer};
use ledgersdk_crypto::{PrivateKey, PublicKey};
use ledgersdk_primitives::{AccountId, Duration, Timestamp};

use crate::body::TransactionBody;
use crate::error::TransactionError;
use crate::transaction_id::TransactionId;

/// Result of a successful `execute`: the node that accepted the
/// transaction and the per-node transaction hash, from which a receipt
/// can later be polled.
#[derive(Debug, Clone)]
pub struct TransactionResponse {
    pub transaction_id: TransactionId,
    pub node_id: AccountId,
    pub transaction_hash: Vec<u8>,
}

struct BuildingFields<B: TransactionBody> {
    payer: Option<AccountId>,
    node_ids: Option<Vec<AccountId>>,
    valid_duration: Duration,
    transaction_id: Option<TransactionId>,
    max_fee: Option<i64>,
    memo: String,
    body: B,
}

struct FrozenFields<B: TransactionBody> {
    payer: AccountId,
    node_ids: Vec<AccountId>,
    valid_duration: Duration,
    transaction_id: TransactionId,
    max_fee: i64,
    memo: String,
    body: B,
    /// Pre-computed envelope bytes, one per entry of `node_ids`, in order.
    node_bodies: Vec<Vec<u8>>,
    /// Signatures keyed by public key; each holds one signature per
    /// `node_bodies` entry. De-duplicated by public key, first wins.
    signatures: Vec<(PublicKey, Vec<Vec<u8>>)>,
    rotation_cursor: AtomicU32,
}

/// A transaction, either still mutable (`Building`) or frozen against a
/// network view (`Frozen`).
pub enum Transaction<B: TransactionBody> {
    Building(BuildingFields<B>),
    Frozen(FrozenFields<B>),
}

fn envelope_bytes(
    payer: &AccountId,
    node_id: &AccountId,
    valid_duration: Duration,
    transaction_id: &TransactionId,
    max_fee: i64,
    memo: &str,
    body_bytes: &[u8],
) -> Vec<u8> {
    let mut out = Vec::new();
    let mut push_str = |s: &str, out: &mut Vec<u8>| {
        out.extend((s.len() as u32).to_be_bytes());
        out.extend(s.as_bytes());
    };
    push_str(&payer.to_string_no_checksum(), &mut out);
    push_str(&node_id.to_string_no_checksum(), &mut out);
    out.extend(valid_duration.seconds.to_be_bytes());
    let tx_id_bytes = transaction_id.to_bytes();
    out.extend((tx_id_bytes.len() as u32).to_be_bytes());
    out.extend(tx_id_bytes);
    out.extend(max_fee.to_be_bytes());
    push_str(memo, &mut out);
    out.extend((body_bytes.len() as u32).to_be_bytes());
    out.extend(body_bytes);
    out
}

impl<B: TransactionBody> Transaction<B> {
    /// Starts a new, mutable transaction wrapping `body`.
    pub fn new(body: B) -> Self {
        Transaction::Building(BuildingFields {
            payer: None,
            node_ids: None,
            valid_duration: Duration::default_transaction_valid(),
            transaction_id: None,
            max_fee: None,
            memo: String::new(),
            body,
        })
    }

    fn building_mut(&mut self) -> Result<&mut BuildingFields<B>, TransactionError> {
        match self {
            Transaction::Building(fields) => Ok(fields),
            Transaction::Frozen(_) => Err(TransactionError::AlreadyFrozen),
        }
    }

    pub fn is_frozen(&self) -> bool {
        matches!(self, Transaction::Frozen(_))
    }

    pub fn set_payer(&mut self, payer: AccountId) -> Result<(), TransactionError> {
        self.building_mut()?.payer = Some(payer);
        Ok(())
    }

    pub fn set_node_ids(&mut self, node_ids: Vec<AccountId>) -> Result<(), TransactionError> {
        self.building_mut()?.node_ids = Some(node_ids);
        Ok(())
    }

    pub fn set_transaction_id(&mut self, transaction_id: TransactionId) -> Result<(), TransactionError> {
        self.building_mut()?.transaction_id = Some(transaction_id);
        Ok(())
    }

    pub fn set_max_transaction_fee(&mut self, max_fee: i64) -> Result<(), TransactionError> {
        self.building_mut()?.max_fee = Some(max_fee);
        Ok(())
    }

    pub fn set_memo(&mut self, memo: impl Into<String>) -> Result<(), TransactionError> {
        self.building_mut()?.memo = memo.into();
        Ok(())
    }

    /// Mutable access to the body while still building.
    pub fn body_mut(&mut self) -> Result<&mut B, TransactionError> {
        Ok(&mut self.building_mut()?.body)
    }

    pub fn body(&self) -> &B {
        match self {
            Transaction::Building(fields) => &fields.body,
            Transaction::Frozen(fields) => &fields.body,
        }
    }

    pub fn transaction_id(&self) -> Option<&TransactionId> {
        match self {
            Transaction::Building(fields) => fields.transaction_id.as_ref(),
            Transaction::Frozen(fields) => Some(&fields.transaction_id),
        }
    }

    pub fn node_ids(&self) -> Option<&[AccountId]> {
        match self {
            Transaction::Building(fields) => fields.node_ids.as_deref(),
            Transaction::Frozen(fields) => Some(&fields.node_ids),
        }
    }

    /// Snapshots payer/node-ids/transaction-id defaults from `client`,
    /// serializes the per-node envelope bytes, and converts `Building` to
    /// `Frozen`. Fails with `AlreadyFrozen` if already frozen.
    pub fn freeze_with(self, client: &Client) -> Result<Self, TransactionError> {
        let fields = match self {
            Transaction::Building(fields) => fields,
            Transaction::Frozen(_) => return Err(TransactionError::AlreadyFrozen),
        };

        let payer = match fields.payer {
            Some(payer) => payer,
            None => {
                client.operator().map(|op| op.account_id.clone()).ok_or(TransactionError::Client(
                    ledgersdk_client::Error::NoPayerAccountOrTransactionId,
                ))?
            }
        };

        let node_ids = match fields.node_ids {
            Some(ids) => ids,
            None => {
                let now = ledgersdk_client::network::now_millis();
                let healthy: Vec<AccountId> = client
                    .network()
                    .nodes()
                    .iter()
                    .filter(|n| n.is_healthy(now))
                    .map(|n| n.account_id.clone())
                    .collect();
                if healthy.is_empty() {
                    return Err(TransactionError::Client(ledgersdk_client::Error::NodeAccountUnknown));
                }
                healthy
            }
        };

        let transaction_id = fields
            .transaction_id
            .unwrap_or_else(|| TransactionId::generate(payer.clone(), Timestamp::now()));

        let max_fee = fields.max_fee.unwrap_or(client.config().default_max_transaction_fee);
        let body_bytes = fields.body.to_bytes();

        let node_bodies = node_ids
            .iter()
            .map(|node_id| {
                envelope_bytes(&payer, node_id, fields.valid_duration, &transaction_id, max_fee, &fields.memo, &body_bytes)
            })
            .collect();

        Ok(Transaction::Frozen(FrozenFields {
            payer,
            node_ids,
            valid_duration: fields.valid_duration,
            transaction_id,
            max_fee,
            memo: fields.memo,
            body: fields.body,
            node_bodies,
            signatures: Vec::new(),
            rotation_cursor: AtomicU32::new(0),
        }))
    }

    fn frozen_mut(&mut self) -> Result<&mut FrozenFields<B>, TransactionError> {
        match self {
            Transaction::Frozen(fields) => Ok(fields),
            Transaction::Building(_) => Err(TransactionError::Client(ledgersdk_client::Error::BasicParse(
                "transaction must be frozen before signing".into(),
            ))),
        }
    }

    /// Signs every per-node body with `key`. Equivalent to
    /// `sign_with(key.public_key(), |msg| key.sign(msg))`.
    pub fn sign(&mut self, key: &PrivateKey) -> Result<(), TransactionError> {
        let public_key = key.public_key();
        self.sign_with(public_key, |msg| key.sign(msg))
    }

    /// Signs every per-node body using the given signer.
    pub fn sign_with_signer(&mut self, signer: &Signer) -> Result<(), TransactionError> {
        let public_key = *signer.public_key();
        let signer = signer.clone();
        self.sign_with(public_key, move |msg| signer.sign(msg))
    }

    /// Signs every per-node body with an arbitrary `bytes -> signature`
    /// function. Duplicate public keys are de-duplicated: the first
    /// signature attached for a given key wins.
    pub fn sign_with(
        &mut self,
        public_key: PublicKey,
        sign_fn: impl Fn(&[u8]) -> Vec<u8>,
    ) -> Result<(), TransactionError> {
        let fields = self.frozen_mut()?;
        if fields.signatures.iter().any(|(k, _)| *k == public_key) {
            return Ok(());
        }
        let sigs = fields.node_bodies.iter().map(|body| sign_fn(body)).collect();
        fields.signatures.push((public_key, sigs));
        Ok(())
    }

    pub fn signature_count(&self) -> usize {
        match self {
            Transaction::Building(_) => 0,
            Transaction::Frozen(fields) => fields.signatures.len(),
        }
    }

    /// Dispatches the frozen transaction: round-robins over this
    /// transaction's own selected nodes (not the client's full network)
    /// starting from a rotated offset, classifying each response via
    /// `classify` (the wire-schema pre-check decoding is external to this
    /// crate, spec §1).
    pub async fn execute<F>(
        &self,
        client: &Client,
        classify: F,
        timeout: Option<StdDuration>,
    ) -> Result<TransactionResponse, TransactionError>
    where
        F: Fn(&[u8]) -> Classification<Vec<u8>>,
    {
        let fields = match self {
            Transaction::Frozen(fields) => fields,
            Transaction::Building(_) => {
                return Err(TransactionError::Client(ledgersdk_client::Error::BasicParse(
                    "transaction must be frozen before execute".into(),
                )))
            }
        };
        let deadline_dur = timeout.unwrap_or(client.config().default_request_timeout);
        let deadline = tokio::time::Instant::now() + deadline_dur;
        let n = fields.node_ids.len();
        if n == 0 {
            return Err(TransactionError::Client(ledgersdk_client::Error::NodeAccountUnknown));
        }

        let mut attempt: u32 = 0;
        loop {
            if tokio::time::Instant::now() >= deadline {
                return Err(TransactionError::Client(ledgersdk_client::Error::TimedOut));
            }
            let start = fields.rotation_cursor.fetch_add(1, Ordering::Relaxed) as usize % n;
            let idx = (start + attempt as usize) % n;
            let node_id = &fields.node_ids[idx];
            let node_idx = client
                .network()
                .nodes()
                .iter()
                .position(|node| &node.account_id == node_id)
                .ok_or(TransactionError::Client(ledgersdk_client::Error::NodeAccountUnknown))?;

            let channel = client.channel_for(node_idx);
            let request = fields.node_bodies[idx].clone();
            match channel.submit_transaction(request).await {
                Ok(response) => match classify(&response) {
                    Classification::Ok(hash) => {
                        return Ok(TransactionResponse {
                            transaction_id: fields.transaction_id.clone(),
                            node_id: node_id.clone(),
                            transaction_hash: hash,
                        })
                    }
                    Classification::Retryable => {}
                    Classification::Terminal(err) => return Err(TransactionError::Client(err)),
                },
                Err(_transport_err) => {}
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
