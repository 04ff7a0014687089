//! A signer is a capability pairing a public key with a signing function,
//! independent of whether the underlying private key is held locally or
//! reached through an external signer (hardware wallet, remote KMS).

use std::sync::Arc;

use ledgersdk_crypto::{PrivateKey, PublicKey};

/// Pairs a public key with a `bytes -> signature` capability.
#[derive(Clone)]
pub struct Signer {
    public_key: PublicKey,
    sign_fn: Arc<dyn Fn(&[u8]) -> Vec<u8> + Send + Sync>,
}

impl Signer {
    /// Wraps a local private key as a signer.
    pub fn from_private_key(key: PrivateKey) -> Self {
        let public_key = key.public_key();
        Self { public_key, sign_fn: Arc::new(move |msg| key.sign(msg)) }
    }

    /// Builds a signer from an arbitrary public key and signing function,
    /// for keys held outside this process.
    pub fn from_fn(
        public_key: PublicKey,
        sign_fn: impl Fn(&[u8]) -> Vec<u8> + Send + Sync + 'static,
    ) -> Self {
        Self { public_key, sign_fn: Arc::new(sign_fn) }
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        (self.sign_fn)(message)
    }
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signer").field("public_key", &self.public_key).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_private_key_signs_and_matches_public_key() {
        let key = PrivateKey::generate_ed25519();
        let public = key.public_key();
        let signer = Signer::from_private_key(key);
        let sig = signer.sign(b"hello");
        assert!(signer.public_key().verify(b"hello", &sig).is_ok());
        assert_eq!(signer.public_key().to_bytes_raw(), public.to_bytes_raw());
    }
}
