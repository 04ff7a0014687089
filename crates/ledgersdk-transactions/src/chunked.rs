//! Chunked transactions (topic-message submit, file-append, raw contract
//! bytecode upload): a payload too large for one transaction is split
//! into sequentially dispatched sub-transactions, each its own signed
//! `Transaction`.

use ledgersdk_primitives::{AccountId, TopicId};

use crate::body::TransactionBody;
use crate::error::TransactionError;
use crate::transaction::{Transaction, TransactionResponse};
use crate::transaction_id::TransactionId;

/// The per-chunk payload for a consensus topic message submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicMessageSubmitBody {
    pub topic_id: TopicId,
    pub message: Vec<u8>,
    pub chunk_index: u32,
    pub chunk_total: u32,
}

impl TransactionBody for TopicMessageSubmitBody {
    fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        let topic = self.topic_id.to_string_no_checksum();
        out.extend((topic.len() as u32).to_be_bytes());
        out.extend(topic.as_bytes());
        out.extend(self.chunk_index.to_be_bytes());
        out.extend(self.chunk_total.to_be_bytes());
        out.extend((self.message.len() as u32).to_be_bytes());
        out.extend(&self.message);
        out
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, TransactionError> {
        let err = || TransactionError::BodyDecode("truncated TopicMessageSubmitBody".into());
        if bytes.len() < 4 {
            return Err(err());
        }
        let topic_len = u32::from_be_bytes(bytes[0..4].try_into().unwrap()) as usize;
        let mut offset = 4;
        let topic_str = std::str::from_utf8(bytes.get(offset..offset + topic_len).ok_or_else(err)?)
            .map_err(|_| err())?;
        offset += topic_len;
        let topic_id = TopicId::from_str_checked(topic_str, None).map_err(|e| TransactionError::BodyDecode(e.to_string()))?;
        let chunk_index = u32::from_be_bytes(bytes.get(offset..offset + 4).ok_or_else(err)?.try_into().unwrap());
        offset += 4;
        let chunk_total = u32::from_be_bytes(bytes.get(offset..offset + 4).ok_or_else(err)?.try_into().unwrap());
        offset += 4;
        let message_len = u32::from_be_bytes(bytes.get(offset..offset + 4).ok_or_else(err)?.try_into().unwrap()) as usize;
        offset += 4;
        let message = bytes.get(offset..offset + message_len).ok_or_else(err)?.to_vec();
        Ok(Self { topic_id, message, chunk_index, chunk_total })
    }
}

/// A topic-message submission before chunking/freezing.
pub struct TopicMessageSubmit {
    topic_id: TopicId,
    message: Vec<u8>,
    chunk_size: usize,
    max_chunks: usize,
    payer: Option<AccountId>,
    node_ids: Option<Vec<AccountId>>,
    transaction_id: Option<TransactionId>,
    memo: String,
}

impl TopicMessageSubmit {
    pub fn new(topic_id: TopicId, message: Vec<u8>) -> Self {
        Self {
            topic_id,
            message,
            chunk_size: 1024,
            max_chunks: 20,
            payer: None,
            node_ids: None,
            transaction_id: None,
            memo: String::new(),
        }
    }

    pub fn set_chunk_size(&mut self, chunk_size: usize) {
        self.chunk_size = chunk_size;
    }

    pub fn set_max_chunks(&mut self, max_chunks: usize) {
        self.max_chunks = max_chunks;
    }

    pub fn set_payer(&mut self, payer: AccountId) {
        self.payer = Some(payer);
    }

    pub fn set_node_ids(&mut self, node_ids: Vec<AccountId>) {
        self.node_ids = Some(node_ids);
    }

    pub fn set_transaction_id(&mut self, transaction_id: TransactionId) {
        self.transaction_id = Some(transaction_id);
    }

    pub fn set_memo(&mut self, memo: impl Into<String>) {
        self.memo = memo.into();
    }

    /// Splits `message` into `chunk_size`-byte pieces, assigns transaction
    /// ids (the initial id for chunk 0, nanos-incremented ids for the
    /// rest), and freezes each chunk as its own `Transaction`.
    pub fn freeze_with(self, client: &ledgersdk_client::Client) -> Result<ChunkedTransaction, TransactionError> {
        let pieces: Vec<Vec<u8>> = if self.message.is_empty() {
            vec![Vec::new()]
        } else {
            self.message.chunks(self.chunk_size.max(1)).map(|c| c.to_vec()).collect()
        };
        if pieces.len() > self.max_chunks {
            return Err(TransactionError::TooManyChunks { required: pieces.len(), max: self.max_chunks });
        }

        let payer = match self.payer.clone() {
            Some(payer) => payer,
            None => client
                .operator()
                .map(|op| op.account_id.clone())
                .ok_or(TransactionError::Client(ledgersdk_client::Error::NoPayerAccountOrTransactionId))?,
        };
        let initial_id = self
            .transaction_id
            .clone()
            .unwrap_or_else(|| TransactionId::generate(payer.clone(), ledgersdk_primitives::Timestamp::now()));

        let chunk_total = pieces.len() as u32;
        let mut chunks = Vec::with_capacity(pieces.len());
        for (index, piece) in pieces.into_iter().enumerate() {
            let body = TopicMessageSubmitBody {
                topic_id: self.topic_id.clone(),
                message: piece,
                chunk_index: index as u32,
                chunk_total,
            };
            let mut tx = Transaction::new(body);
            tx.set_payer(payer.clone())?;
            if let Some(node_ids) = &self.node_ids {
                tx.set_node_ids(node_ids.clone())?;
            }
            let chunk_id = if index == 0 { initial_id.clone() } else { initial_id.for_chunk(index as u64) };
            tx.set_transaction_id(chunk_id)?;
            tx.set_memo(self.memo.clone())?;
            chunks.push(tx.freeze_with(client)?);
        }

        Ok(ChunkedTransaction { topic_id: self.topic_id, chunk_size: self.chunk_size, max_chunks: self.max_chunks, chunks })
    }
}

/// A frozen, chunked topic-message submission.
pub struct ChunkedTransaction {
    topic_id: TopicId,
    chunk_size: usize,
    max_chunks: usize,
    chunks: Vec<Transaction<TopicMessageSubmitBody>>,
}

impl ChunkedTransaction {
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn topic_id(&self) -> &TopicId {
        &self.topic_id
    }

    /// The full message, reassembled from its chunks in order.
    pub fn message(&self) -> Vec<u8> {
        self.chunks.iter().flat_map(|c| c.body().message.clone()).collect()
    }

    pub fn transaction_id(&self) -> &TransactionId {
        self.chunks[0].transaction_id().expect("frozen chunk always has a transaction id")
    }

    /// Signs every chunk with `key`.
    pub fn sign(&mut self, key: &ledgersdk_crypto::PrivateKey) -> Result<(), TransactionError> {
        for chunk in &mut self.chunks {
            chunk.sign(key)?;
        }
        Ok(())
    }

    pub fn sign_with_signer(&mut self, signer: &ledgersdk_client::Signer) -> Result<(), TransactionError> {
        for chunk in &mut self.chunks {
            chunk.sign_with_signer(signer)?;
        }
        Ok(())
    }

    /// Dispatches chunks sequentially; a chunk's pre-check must succeed
    /// (classification other than `Terminal`) before the next is sent. On
    /// a terminal failure, the remainder are not submitted.
    pub async fn execute<F>(
        &self,
        client: &ledgersdk_client::Client,
        classify: F,
        timeout: Option<std::time::Duration>,
    ) -> Result<Vec<TransactionResponse>, TransactionError>
    where
        F: Fn(&[u8]) -> ledgersdk_client::Classification<Vec<u8>>,
    {
        let mut responses = Vec::with_capacity(self.chunks.len());
        for (index, chunk) in self.chunks.iter().enumerate() {
            let response = chunk
                .execute(client, &classify, timeout)
                .await
                .map_err(|e| TransactionError::ChunkFailed { index, source: into_client_error(e) })?;
            responses.push(response);
        }
        Ok(responses)
    }

    /// Serializes chunk boundaries, topic, transaction id and per-chunk
    /// signatures so the whole payload can be reconstructed.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend((self.chunk_size as u32).to_be_bytes());
        out.extend((self.max_chunks as u32).to_be_bytes());
        out.extend((self.chunks.len() as u32).to_be_bytes());
        for chunk in &self.chunks {
            let body_bytes = chunk.body().to_bytes();
            out.extend((body_bytes.len() as u32).to_be_bytes());
            out.extend(body_bytes);
            let id_bytes = chunk.transaction_id().expect("frozen").to_bytes();
            out.extend((id_bytes.len() as u32).to_be_bytes());
            out.extend(id_bytes);
        }
        out
    }

    /// Reconstructs topic id, reassembled message and the initial
    /// transaction id from bytes produced by [`ChunkedTransaction::to_bytes`].
    /// Does not re-create signable `Transaction` chunks (signatures are not
    /// part of this format); used by the round-trip property in scenario 3.
    pub fn from_bytes(bytes: &[u8]) -> Result<(TopicId, Vec<u8>, TransactionId), TransactionError> {
        let err = || TransactionError::BodyDecode("truncated ChunkedTransaction".into());
        if bytes.len() < 12 {
            return Err(err());
        }
        let chunk_count = u32::from_be_bytes(bytes[8..12].try_into().unwrap()) as usize;
        let mut offset = 12;
        let mut message = Vec::new();
        let mut topic_id = None;
        let mut initial_id = None;
        for _ in 0..chunk_count {
            let body_len = u32::from_be_bytes(bytes.get(offset..offset + 4).ok_or_else(err)?.try_into().unwrap()) as usize;
            offset += 4;
            let body_bytes = bytes.get(offset..offset + body_len).ok_or_else(err)?;
            offset += body_len;
            let body = TopicMessageSubmitBody::from_bytes(body_bytes)?;
            if topic_id.is_none() {
                topic_id = Some(body.topic_id.clone());
            }
            message.extend(body.message);

            let id_len = u32::from_be_bytes(bytes.get(offset..offset + 4).ok_or_else(err)?.try_into().unwrap()) as usize;
            offset += 4;
            let id_bytes = bytes.get(offset..offset + id_len).ok_or_else(err)?;
            offset += id_len;
            if initial_id.is_none() {
                initial_id = Some(TransactionId::from_bytes(id_bytes).ok_or_else(err)?);
            }
        }
        Ok((topic_id.ok_or_else(err)?, message, initial_id.ok_or_else(err)?))
    }
}

fn into_client_error(e: TransactionError) -> ledgersdk_client::Error {
    match e {
        TransactionError::Client(inner) => inner,
        other => ledgersdk_client::Error::BasicParse(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ledgersdk_client::{ChannelFactory, NetworkPreset, NodeChannel, Signer, TransportError};
    use ledgersdk_crypto::PrivateKey;
    use std::sync::Arc;

    struct AlwaysOkChannel;
    #[async_trait]
    impl NodeChannel for AlwaysOkChannel {
        async fn submit_transaction(&self, _request: Vec<u8>) -> Result<Vec<u8>, TransportError> {
            Ok(vec![0])
        }
        async fn submit_query(&self, request: Vec<u8>) -> Result<Vec<u8>, TransportError> {
            self.submit_transaction(request).await
        }
    }

    fn factory() -> ChannelFactory {
        Arc::new(|_account, _endpoint| Arc::new(AlwaysOkChannel) as Arc<dyn NodeChannel>)
    }

    fn test_client() -> ledgersdk_client::Client {
        let mut client = ledgersdk_client::Client::for_preset(NetworkPreset::Testnet, factory());
        client.set_operator(AccountId::new(0, 0, 0), Signer::from_private_key(PrivateKey::generate_ed25519()));
        client
    }

    #[test]
    fn splits_into_expected_chunk_count() {
        let client = test_client();
        let topic = TopicId::new(0, 0, 314);
        let mut submit = TopicMessageSubmit::new(topic, b"Hello, world!".to_vec());
        submit.set_chunk_size(8);
        submit.set_max_chunks(2);
        let frozen = submit.freeze_with(&client).unwrap();
        assert_eq!(frozen.chunk_count(), 2);
    }

    #[test]
    fn too_many_chunks_is_rejected() {
        let client = test_client();
        let topic = TopicId::new(0, 0, 314);
        let mut submit = TopicMessageSubmit::new(topic, b"Hello, world!".to_vec());
        submit.set_chunk_size(8);
        submit.set_max_chunks(1);
        assert!(matches!(submit.freeze_with(&client), Err(TransactionError::TooManyChunks { .. })));
    }

    #[test]
    fn round_trips_topic_message_and_transaction_id() {
        let client = test_client();
        let topic = TopicId::new(0, 0, 314);
        let mut submit = TopicMessageSubmit::new(topic.clone(), b"Hello, world!".to_vec());
        submit.set_chunk_size(8);
        submit.set_max_chunks(2);
        let frozen = submit.freeze_with(&client).unwrap();
        let original_id = frozen.transaction_id().clone();
        let bytes = frozen.to_bytes();
        let (decoded_topic, decoded_message, decoded_id) = ChunkedTransaction::from_bytes(&bytes).unwrap();
        assert_eq!(decoded_topic, topic);
        assert_eq!(decoded_message, b"Hello, world!".to_vec());
        assert_eq!(decoded_id, original_id);
    }

    #[tokio::test]
    async fn execute_dispatches_chunks_sequentially() {
        let client = test_client();
        let topic = TopicId::new(0, 0, 314);
        let mut submit = TopicMessageSubmit::new(topic, b"Hello, world!".to_vec());
        submit.set_chunk_size(8);
        submit.set_max_chunks(2);
        let mut frozen = submit.freeze_with(&client).unwrap();
        let key = PrivateKey::generate_ed25519();
        frozen.sign(&key).unwrap();
        let responses =
            frozen.execute(&client, |r: &[u8]| ledgersdk_client::Classification::Ok(r.to_vec()), None).await.unwrap();
        assert_eq!(responses.len(), 2);
    }
}
