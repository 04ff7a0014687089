//! The contract-create composite flow: file-create, then file-append for
//! any bytecode past the first chunk, then contract-create, then a
//! best-effort file-delete cleanup — the one multi-stage state machine
//! this crate documents (spec §2, "composite flows").

use std::time::Duration as StdDuration;

use ledgersdk_client::{Classification, Client, Signer};
use ledgersdk_primitives::{ContractId, FileId};
use tracing::warn;

use crate::body::TransactionBody;
use crate::error::TransactionError;
use crate::transaction::Transaction;

/// The payload of a file-create transaction: its initial contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCreateBody {
    pub contents: Vec<u8>,
}

impl TransactionBody for FileCreateBody {
    fn to_bytes(&self) -> Vec<u8> {
        self.contents.clone()
    }
    fn from_bytes(bytes: &[u8]) -> Result<Self, TransactionError> {
        Ok(Self { contents: bytes.to_vec() })
    }
}

/// The payload of a file-append transaction: bytes appended to an
/// existing file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAppendBody {
    pub file_id: FileId,
    pub contents: Vec<u8>,
}

impl TransactionBody for FileAppendBody {
    fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        let file = self.file_id.to_string_no_checksum();
        out.extend((file.len() as u32).to_be_bytes());
        out.extend(file.as_bytes());
        out.extend(&self.contents);
        out
    }
    fn from_bytes(bytes: &[u8]) -> Result<Self, TransactionError> {
        let err = || TransactionError::BodyDecode("truncated FileAppendBody".into());
        if bytes.len() < 4 {
            return Err(err());
        }
        let file_len = u32::from_be_bytes(bytes[0..4].try_into().unwrap()) as usize;
        let file_str = std::str::from_utf8(bytes.get(4..4 + file_len).ok_or_else(err)?).map_err(|_| err())?;
        let file_id = FileId::from_str_checked(file_str, None).map_err(|e| TransactionError::BodyDecode(e.to_string()))?;
        let contents = bytes[4 + file_len..].to_vec();
        Ok(Self { file_id, contents })
    }
}

/// The payload of a contract-create transaction: the bytecode file plus
/// constructor call data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCreateBody {
    pub bytecode_file_id: FileId,
    pub gas: i64,
    pub constructor_params: Vec<u8>,
    pub memo: String,
}

impl TransactionBody for ContractCreateBody {
    fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        let file = self.bytecode_file_id.to_string_no_checksum();
        out.extend((file.len() as u32).to_be_bytes());
        out.extend(file.as_bytes());
        out.extend(self.gas.to_be_bytes());
        out.extend((self.constructor_params.len() as u32).to_be_bytes());
        out.extend(&self.constructor_params);
        out.extend(self.memo.as_bytes());
        out
    }
    fn from_bytes(bytes: &[u8]) -> Result<Self, TransactionError> {
        let err = || TransactionError::BodyDecode("truncated ContractCreateBody".into());
        if bytes.len() < 4 {
            return Err(err());
        }
        let file_len = u32::from_be_bytes(bytes[0..4].try_into().unwrap()) as usize;
        let mut offset = 4;
        let file_str = std::str::from_utf8(bytes.get(offset..offset + file_len).ok_or_else(err)?).map_err(|_| err())?;
        let bytecode_file_id = FileId::from_str_checked(file_str, None).map_err(|e| TransactionError::BodyDecode(e.to_string()))?;
        offset += file_len;
        let gas = i64::from_be_bytes(bytes.get(offset..offset + 8).ok_or_else(err)?.try_into().unwrap());
        offset += 8;
        let params_len = u32::from_be_bytes(bytes.get(offset..offset + 4).ok_or_else(err)?.try_into().unwrap()) as usize;
        offset += 4;
        let constructor_params = bytes.get(offset..offset + params_len).ok_or_else(err)?.to_vec();
        offset += params_len;
        let memo = std::str::from_utf8(&bytes[offset..]).map_err(|_| err())?.to_string();
        Ok(Self { bytecode_file_id, gas, constructor_params, memo })
    }
}

/// The payload of a file-delete transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDeleteBody {
    pub file_id: FileId,
}

impl TransactionBody for FileDeleteBody {
    fn to_bytes(&self) -> Vec<u8> {
        self.file_id.to_string_no_checksum().into_bytes()
    }
    fn from_bytes(bytes: &[u8]) -> Result<Self, TransactionError> {
        let s = std::str::from_utf8(bytes).map_err(|_| TransactionError::BodyDecode("non-utf8 FileDeleteBody".into()))?;
        let file_id = FileId::from_str_checked(s, None).map_err(|e| TransactionError::BodyDecode(e.to_string()))?;
        Ok(Self { file_id })
    }
}

/// Drives file-create -> file-append chunks -> contract-create ->
/// file-delete as one state machine. Each stage's response is decoded by
/// caller-supplied extractors, since the wire schema for responses is
/// external to this crate (spec §1).
pub struct ContractCreateFlow {
    bytecode: Vec<u8>,
    gas: i64,
    constructor_params: Vec<u8>,
    chunk_size: usize,
    max_chunks: usize,
    memo: String,
}

impl ContractCreateFlow {
    pub fn new(bytecode: Vec<u8>, gas: i64) -> Self {
        Self { bytecode, gas, constructor_params: Vec::new(), chunk_size: 1024, max_chunks: 20, memo: String::new() }
    }

    pub fn set_constructor_params(&mut self, params: Vec<u8>) {
        self.constructor_params = params;
    }

    pub fn set_chunk_size(&mut self, chunk_size: usize) {
        self.chunk_size = chunk_size;
    }

    pub fn set_max_chunks(&mut self, max_chunks: usize) {
        self.max_chunks = max_chunks;
    }

    pub fn set_memo(&mut self, memo: impl Into<String>) {
        self.memo = memo.into();
    }

    /// Runs the flow to completion. `extract_file_id`/`extract_contract_id`
    /// decode a successful raw response into the freshly created entity's
    /// id; `classify` turns a raw response into retry/terminal outcomes for
    /// every stage. A file-delete failure after a successful
    /// contract-create is logged but does not fail the flow: the contract
    /// already exists and the cleanup was only best-effort.
    pub async fn execute<FClassify, FExtractFile, FExtractContract>(
        &self,
        client: &Client,
        signer: &Signer,
        classify: FClassify,
        extract_file_id: FExtractFile,
        extract_contract_id: FExtractContract,
        timeout: Option<StdDuration>,
    ) -> Result<ContractId, TransactionError>
    where
        FClassify: Fn(&[u8]) -> Classification<Vec<u8>>,
        FExtractFile: Fn(&[u8]) -> Result<FileId, TransactionError>,
        FExtractContract: Fn(&[u8]) -> Result<ContractId, TransactionError>,
    {
        let payer = client
            .operator()
            .map(|op| op.account_id.clone())
            .ok_or(TransactionError::Client(ledgersdk_client::Error::NoPayerAccountOrTransactionId))?;

        let pieces: Vec<Vec<u8>> = if self.bytecode.is_empty() {
            vec![Vec::new()]
        } else {
            self.bytecode.chunks(self.chunk_size.max(1)).map(|c| c.to_vec()).collect()
        };
        if pieces.len() > self.max_chunks {
            return Err(TransactionError::TooManyChunks { required: pieces.len(), max: self.max_chunks });
        }

        let mut create = Transaction::new(FileCreateBody { contents: pieces[0].clone() });
        create.set_payer(payer.clone())?;
        let mut create = create.freeze_with(client)?;
        create.sign_with_signer(signer)?;
        let response = create
            .execute(client, &classify, timeout)
            .await
            .map_err(|e| TransactionError::ChunkFailed { index: 0, source: into_client_error(e) })?;
        let file_id = extract_file_id(&response.transaction_hash)?;

        for (index, piece) in pieces.iter().enumerate().skip(1) {
            let mut append = Transaction::new(FileAppendBody { file_id: file_id.clone(), contents: piece.clone() });
            append.set_payer(payer.clone())?;
            let mut append = append.freeze_with(client)?;
            append.sign_with_signer(signer)?;
            append
                .execute(client, &classify, timeout)
                .await
                .map_err(|e| TransactionError::ChunkFailed { index, source: into_client_error(e) })?;
        }

        let mut contract_create = Transaction::new(ContractCreateBody {
            bytecode_file_id: file_id.clone(),
            gas: self.gas,
            constructor_params: self.constructor_params.clone(),
            memo: self.memo.clone(),
        });
        contract_create.set_payer(payer.clone())?;
        let mut contract_create = contract_create.freeze_with(client)?;
        contract_create.sign_with_signer(signer)?;
        let response = contract_create.execute(client, &classify, timeout).await?;
        let contract_id = extract_contract_id(&response.transaction_hash)?;

        let mut delete = Transaction::new(FileDeleteBody { file_id: file_id.clone() });
        if delete.set_payer(payer).is_ok() {
            if let Ok(mut delete) = delete.freeze_with(client) {
                delete.sign_with_signer(signer).ok();
                if let Err(e) = delete.execute(client, &classify, timeout).await {
                    warn!(file_id = %file_id, error = %e, "file-delete cleanup after contract-create failed");
                }
            }
        }

        Ok(contract_id)
    }
}

fn into_client_error(e: TransactionError) -> ledgersdk_client::Error {
    match e {
        TransactionError::Client(inner) => inner,
        other => ledgersdk_client::Error::BasicParse(other.to_string()),
    }
}
