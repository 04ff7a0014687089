//! Ed25519 keys, RFC 8032 signing, and SLIP-10 hardened-only derivation.

use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use hmac::{Hmac, Mac};
use sha2::Sha512;
use zeroize::Zeroize;

use crate::error::CryptoError;

type HmacSha512 = Hmac<Sha512>;

/// An Ed25519 private key, optionally carrying a chain code that makes it
/// derivable (SLIP-10).
#[derive(Clone)]
pub struct Ed25519PrivateKey {
    signing_key: SigningKey,
    chain_code: Option<[u8; 32]>,
}

impl Ed25519PrivateKey {
    /// Generates a fresh key from 32 random bytes, with no chain code.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut rand::thread_rng());
        Self { signing_key, chain_code: None }
    }

    /// Builds a key from a raw 32-byte seed.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let seed: [u8; 32] =
            bytes.try_into().map_err(|_| CryptoError::KeyParse("ed25519 key must be 32 bytes".into()))?;
        Ok(Self { signing_key: SigningKey::from_bytes(&seed), chain_code: None })
    }

    /// Builds the SLIP-10 master key and chain code from an arbitrary seed
    /// (e.g. a BIP-39 seed).
    pub fn from_seed_with_chain_code(seed: &[u8]) -> Result<Self, CryptoError> {
        let mut mac = HmacSha512::new_from_slice(b"ed25519 seed")
            .map_err(|e| CryptoError::KeyDerive(e.to_string()))?;
        mac.update(seed);
        let i = mac.finalize().into_bytes();
        let (il, ir) = i.split_at(32);
        let mut key = Self::from_bytes(il)?;
        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(ir);
        key.chain_code = Some(chain_code);
        Ok(key)
    }

    /// Raw 32-byte secret scalar.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }

    /// This key's public counterpart.
    pub fn public_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey { verifying_key: self.signing_key.verifying_key() }
    }

    /// `true` if this key carries a chain code and can be derived further.
    pub fn is_derivable(&self) -> bool {
        self.chain_code.is_some()
    }

    /// Signs `message`, producing a deterministic RFC 8032 signature.
    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.signing_key.sign(message).to_bytes()
    }

    /// SLIP-10 child derivation. Ed25519 only supports hardened derivation,
    /// so the top bit of `index` is always forced regardless of its sign.
    pub fn derive(&self, index: i32) -> Result<Self, CryptoError> {
        let chain_code = self
            .chain_code
            .ok_or_else(|| CryptoError::KeyDerive("key has no chain code".into()))?;
        let hardened_index = (index as u32) | 0x8000_0000;
        self.derive_raw(&chain_code, hardened_index)
    }

    /// Hedera's legacy derivation scheme: an `i64` index (negative values
    /// allowed) folded into an 8-byte big-endian field in place of SLIP-10's
    /// 4-byte hardened index.
    pub fn legacy_derive(&self, index: i64) -> Result<Self, CryptoError> {
        let chain_code = self
            .chain_code
            .ok_or_else(|| CryptoError::KeyDerive("key has no chain code".into()))?;
        let mut data = Vec::with_capacity(1 + 32 + 8);
        data.push(0u8);
        data.extend_from_slice(&self.signing_key.to_bytes());
        data.extend_from_slice(&index.to_be_bytes());

        let mut mac = HmacSha512::new_from_slice(&chain_code)
            .map_err(|e| CryptoError::KeyDerive(e.to_string()))?;
        mac.update(&data);
        let i = mac.finalize().into_bytes();
        let (il, ir) = i.split_at(32);
        let mut key = Self::from_bytes(il)?;
        let mut next_chain_code = [0u8; 32];
        next_chain_code.copy_from_slice(ir);
        key.chain_code = Some(next_chain_code);
        Ok(key)
    }

    fn derive_raw(&self, chain_code: &[u8; 32], index: u32) -> Result<Self, CryptoError> {
        let mut data = Vec::with_capacity(1 + 32 + 4);
        data.push(0u8);
        data.extend_from_slice(&self.signing_key.to_bytes());
        data.extend_from_slice(&index.to_be_bytes());

        let mut mac = HmacSha512::new_from_slice(chain_code)
            .map_err(|e| CryptoError::KeyDerive(e.to_string()))?;
        mac.update(&data);
        let i = mac.finalize().into_bytes();
        let (il, ir) = i.split_at(32);
        let mut key = Self::from_bytes(il)?;
        let mut next_chain_code = [0u8; 32];
        next_chain_code.copy_from_slice(ir);
        key.chain_code = Some(next_chain_code);
        Ok(key)
    }
}

impl Drop for Ed25519PrivateKey {
    fn drop(&mut self) {
        let mut bytes = self.signing_key.to_bytes();
        bytes.zeroize();
        if let Some(mut cc) = self.chain_code {
            cc.zeroize();
        }
    }
}

/// An Ed25519 public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ed25519PublicKey {
    verifying_key: VerifyingKey,
}

impl Ed25519PublicKey {
    /// Builds a public key from its raw 32 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let raw: [u8; 32] = bytes
            .try_into()
            .map_err(|_| CryptoError::KeyParse("ed25519 public key must be 32 bytes".into()))?;
        let verifying_key =
            VerifyingKey::from_bytes(&raw).map_err(|e| CryptoError::KeyParse(e.to_string()))?;
        Ok(Self { verifying_key })
    }

    /// Raw 32 bytes.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.verifying_key.to_bytes()
    }

    /// Verifies `signature` over `message`.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> Result<(), CryptoError> {
        let sig_bytes: [u8; 64] = signature
            .try_into()
            .map_err(|_| CryptoError::SignatureVerify("ed25519 signature must be 64 bytes".into()))?;
        let sig = ed25519_dalek::Signature::from_bytes(&sig_bytes);
        self.verifying_key
            .verify(message, &sig)
            .map_err(|e| CryptoError::SignatureVerify(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_then_verify_succeeds() {
        let key = Ed25519PrivateKey::generate();
        let sig = key.sign(b"hello");
        assert!(key.public_key().verify(b"hello", &sig).is_ok());
    }

    #[test]
    fn verify_rejects_wrong_message() {
        let key = Ed25519PrivateKey::generate();
        let sig = key.sign(b"hello");
        assert!(key.public_key().verify(b"goodbye", &sig).is_err());
    }

    #[test]
    fn signing_is_deterministic() {
        let key = Ed25519PrivateKey::from_bytes(&[7u8; 32]).unwrap();
        assert_eq!(key.sign(b"msg"), key.sign(b"msg"));
    }

    #[test]
    fn non_derivable_key_rejects_derive() {
        let key = Ed25519PrivateKey::generate();
        assert!(key.derive(0).is_err());
    }

    #[test]
    fn derivable_key_produces_deterministic_children() {
        let master = Ed25519PrivateKey::from_seed_with_chain_code(b"test seed bytes").unwrap();
        let a = master.derive(0).unwrap();
        let b = master.derive(0).unwrap();
        assert_eq!(a.to_bytes(), b.to_bytes());
        let c = master.derive(1).unwrap();
        assert_ne!(a.to_bytes(), c.to_bytes());
    }

    #[test]
    fn legacy_derive_is_deterministic_for_extreme_indices() {
        let master = Ed25519PrivateKey::from_seed_with_chain_code(b"test seed bytes").unwrap();
        let a = master.legacy_derive(-1).unwrap();
        let b = master.legacy_derive(-1).unwrap();
        assert_eq!(a.to_bytes(), b.to_bytes());
        let c = master.legacy_derive(0xFFFFFFFFFF).unwrap();
        assert_ne!(a.to_bytes(), c.to_bytes());
    }
}
