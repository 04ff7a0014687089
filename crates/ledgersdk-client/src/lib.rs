//! Network view, client configuration, node health, the signer
//! abstraction, and the generic request-execution loop shared by
//! transactions and queries.

pub mod channel;
pub mod client;
pub mod config;
pub mod error;
pub mod executor;
pub mod network;
pub mod signer;

pub use channel::{NodeChannel, TransportError};
pub use client::{ChannelFactory, Client, Operator};
pub use config::{ClientConfig, NetworkPreset, PresetNode};
pub use error::Error;
pub use executor::{backoff_delay, execute_with_retry, Classification};
pub use network::{NetworkView, NodeEntry};
pub use signer::Signer;
