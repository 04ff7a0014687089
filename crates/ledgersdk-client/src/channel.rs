//! The one interface boundary a transport implementation plugs into: a
//! channel to a single node offering one RPC method per service call, each
//! taking serialized request bytes and returning serialized response bytes
//! or a transport error.

use async_trait::async_trait;
use thiserror::Error;

/// Errors a transport adapter may report; distinct from the crate's
/// aggregated [`crate::Error`] because these originate below the
/// pre-check-classification boundary (§4.7).
#[derive(Debug, Error, Clone)]
pub enum TransportError {
    #[error("connection refused")]
    ConnectionRefused,
    #[error("channel timed out")]
    Timeout,
    #[error("transport error: {0}")]
    Other(String),
}

/// A channel to one node, offering the per-message-type dispatch the core
/// doesn't hardcode beyond this trait. Transactions call
/// [`NodeChannel::submit_transaction`]; queries call
/// [`NodeChannel::submit_query`].
#[async_trait]
pub trait NodeChannel: Send + Sync {
    /// Sends serialized transaction bytes to this node and returns the
    /// serialized transaction response (containing the pre-check status).
    async fn submit_transaction(&self, request: Vec<u8>) -> Result<Vec<u8>, TransportError>;

    /// Sends serialized query bytes to this node and returns the
    /// serialized query response.
    async fn submit_query(&self, request: Vec<u8>) -> Result<Vec<u8>, TransportError>;
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// A channel whose responses are scripted in advance, for exercising
    /// the retry/classification loop deterministically.
    pub struct ScriptedChannel {
        pub responses: Mutex<Vec<Result<Vec<u8>, TransportError>>>,
        pub calls: AtomicUsize,
    }

    impl ScriptedChannel {
        pub fn new(responses: Vec<Result<Vec<u8>, TransportError>>) -> Self {
            Self { responses: Mutex::new(responses), calls: AtomicUsize::new(0) }
        }
    }

    #[async_trait]
    impl NodeChannel for ScriptedChannel {
        async fn submit_transaction(&self, _request: Vec<u8>) -> Result<Vec<u8>, TransportError> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                Err(TransportError::Other("no more scripted responses".into()))
            } else {
                responses.remove(0)
            }
        }

        async fn submit_query(&self, request: Vec<u8>) -> Result<Vec<u8>, TransportError> {
            self.submit_transaction(request).await
        }
    }
}
