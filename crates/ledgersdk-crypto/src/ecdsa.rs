//! ECDSA (secp256k1) keys, RFC 6979 signing, BIP-32 derivation and EVM
//! address derivation.

use hmac::{Hmac, Mac};
use k256::ecdsa::signature::{Signer, Verifier};
use k256::ecdsa::{Signature, SigningKey, VerifyingKey};
use k256::elliptic_curve::ff::PrimeField;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::{FieldBytes, Scalar};
use sha2::Sha512;
use sha3::{Digest, Keccak256};
use zeroize::Zeroize;

use crate::error::CryptoError;

type HmacSha512 = Hmac<Sha512>;

/// An ECDSA secp256k1 private key, optionally carrying a chain code that
/// makes it derivable (BIP-32).
#[derive(Clone)]
pub struct EcdsaPrivateKey {
    signing_key: SigningKey,
    chain_code: Option<[u8; 32]>,
}

impl EcdsaPrivateKey {
    /// Generates a fresh random key, with no chain code.
    pub fn generate() -> Self {
        Self { signing_key: SigningKey::random(&mut rand::thread_rng()), chain_code: None }
    }

    /// Builds a key from a raw 32-byte scalar.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let signing_key =
            SigningKey::from_slice(bytes).map_err(|e| CryptoError::KeyParse(e.to_string()))?;
        Ok(Self { signing_key, chain_code: None })
    }

    /// Builds the BIP-32 master key and chain code from an arbitrary seed.
    pub fn from_seed_with_chain_code(seed: &[u8]) -> Result<Self, CryptoError> {
        let mut mac = HmacSha512::new_from_slice(b"Bitcoin seed")
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

    /// Raw 32-byte scalar.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes().into()
    }

    /// This key's public counterpart (compressed SEC1 form).
    pub fn public_key(&self) -> EcdsaPublicKey {
        EcdsaPublicKey { verifying_key: *self.signing_key.verifying_key() }
    }

    /// `true` if this key carries a chain code and can be derived further.
    pub fn is_derivable(&self) -> bool {
        self.chain_code.is_some()
    }

    /// Signs `message`'s SHA-256 digest, producing a 64-byte low-S
    /// normalized `r‖s` signature (RFC 6979).
    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        let sig: Signature = self.signing_key.sign(message);
        sig.to_bytes().into()
    }

    /// BIP-32 child derivation: hardened if the top bit of `index` is set,
    /// normal (public-derivation-compatible) otherwise.
    pub fn derive(&self, index: i32) -> Result<Self, CryptoError> {
        let chain_code = self
            .chain_code
            .ok_or_else(|| CryptoError::KeyDerive("key has no chain code".into()))?;
        let index = index as u32;
        let hardened = index & 0x8000_0000 != 0;

        let mut data = Vec::with_capacity(37);
        if hardened {
            data.push(0u8);
            data.extend_from_slice(&self.signing_key.to_bytes());
        } else {
            data.extend_from_slice(self.signing_key.verifying_key().to_encoded_point(true).as_bytes());
        }
        data.extend_from_slice(&index.to_be_bytes());

        let mut mac = HmacSha512::new_from_slice(&chain_code)
            .map_err(|e| CryptoError::KeyDerive(e.to_string()))?;
        mac.update(&data);
        let i = mac.finalize().into_bytes();
        let (il, ir) = i.split_at(32);

        let il_scalar: Scalar = Option::from(Scalar::from_repr(*FieldBytes::from_slice(il)))
            .ok_or_else(|| CryptoError::KeyDerive("derived scalar out of range".into()))?;
        let parent_scalar: Scalar = *self.signing_key.as_nonzero_scalar().as_ref();
        let child_scalar = il_scalar + parent_scalar;
        let child_bytes: [u8; 32] = child_scalar.to_bytes().into();

        let mut key = Self::from_bytes(&child_bytes)?;
        let mut next_chain_code = [0u8; 32];
        next_chain_code.copy_from_slice(ir);
        key.chain_code = Some(next_chain_code);
        Ok(key)
    }
}

impl Drop for EcdsaPrivateKey {
    fn drop(&mut self) {
        let mut bytes: [u8; 32] = self.signing_key.to_bytes().into();
        bytes.zeroize();
        if let Some(mut cc) = self.chain_code {
            cc.zeroize();
        }
    }
}

/// An ECDSA secp256k1 public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EcdsaPublicKey {
    verifying_key: VerifyingKey,
}

impl EcdsaPublicKey {
    /// Builds a key from compressed (33-byte) or uncompressed (65-byte) SEC1
    /// bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let verifying_key =
            VerifyingKey::from_sec1_bytes(bytes).map_err(|e| CryptoError::KeyParse(e.to_string()))?;
        Ok(Self { verifying_key })
    }

    /// Compressed 33-byte SEC1 form.
    pub fn to_bytes_compressed(&self) -> [u8; 33] {
        let point = self.verifying_key.to_encoded_point(true);
        let mut out = [0u8; 33];
        out.copy_from_slice(point.as_bytes());
        out
    }

    /// Uncompressed 65-byte SEC1 form (`0x04 ‖ X ‖ Y`).
    pub fn to_bytes_uncompressed(&self) -> [u8; 65] {
        let point = self.verifying_key.to_encoded_point(false);
        let mut out = [0u8; 65];
        out.copy_from_slice(point.as_bytes());
        out
    }

    /// Verifies a 64-byte `r‖s` signature over `message`.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> Result<(), CryptoError> {
        let sig = Signature::from_slice(signature)
            .map_err(|e| CryptoError::SignatureVerify(e.to_string()))?;
        self.verifying_key
            .verify(message, &sig)
            .map_err(|e| CryptoError::SignatureVerify(e.to_string()))
    }

    /// The 20-byte EVM address: Keccak-256 of the uncompressed `X‖Y` (64
    /// bytes, no `0x04` prefix), rightmost 20 bytes.
    pub fn to_evm_address(&self) -> [u8; 20] {
        let uncompressed = self.to_bytes_uncompressed();
        let mut hasher = Keccak256::new();
        hasher.update(&uncompressed[1..]);
        let digest = hasher.finalize();
        let mut addr = [0u8; 20];
        addr.copy_from_slice(&digest[12..]);
        addr
    }

    /// The `0x`-prefixed lowercase hex form of [`to_evm_address`].
    pub fn to_evm_address_string(&self) -> String {
        format!("0x{}", hex::encode(self.to_evm_address()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_then_verify_succeeds() {
        let key = EcdsaPrivateKey::generate();
        let sig = key.sign(b"hello");
        assert!(key.public_key().verify(b"hello", &sig).is_ok());
    }

    #[test]
    fn verify_rejects_wrong_message() {
        let key = EcdsaPrivateKey::generate();
        let sig = key.sign(b"hello");
        assert!(key.public_key().verify(b"goodbye", &sig).is_err());
    }

    #[test]
    fn signing_is_deterministic() {
        let key = EcdsaPrivateKey::from_bytes(&[7u8; 32]).unwrap();
        assert_eq!(key.sign(b"msg"), key.sign(b"msg"));
    }

    #[test]
    fn vector_signature_matches_spec() {
        let der = hex::decode(
            "3030020100300706052b8104000a042204208776c6b831a1b61ac10dac0304a2843de4716f54b1919bb91a2685d0fe3f3048",
        )
        .unwrap();
        // The DER wraps a plain 32-byte secp256k1 scalar as its final OCTET STRING.
        let scalar = &der[der.len() - 32..];
        let key = EcdsaPrivateKey::from_bytes(scalar).unwrap();
        let sig = key.sign(b"hello world");
        assert_eq!(
            hex::encode(sig),
            "f3a13a555f1f8cd6532716b8f388bd4e9d8ed0b252743e923114c0c6cbfe414c086e3717a6502c3edff6130d34df252fb94b6f662d0cd27e2110903320563851"
        );
    }

    #[test]
    fn vector_evm_address_matches_spec() {
        let pubkey_bytes =
            hex::decode("029469a657510f3bf199a0e29b21e11e7039d8883f3547d59c3568f9c89f704cbc").unwrap();
        let pubkey = EcdsaPublicKey::from_bytes(&pubkey_bytes).unwrap();
        assert_eq!(pubkey.to_evm_address_string(), "0xbbaa6bdfe888ae1fc8e7c8cee82081fa79ba8834");
    }

    #[test]
    fn non_derivable_key_rejects_derive() {
        let key = EcdsaPrivateKey::generate();
        assert!(key.derive(0).is_err());
    }

    #[test]
    fn derivable_key_produces_deterministic_children() {
        let master = EcdsaPrivateKey::from_seed_with_chain_code(b"test seed bytes").unwrap();
        let a = master.derive(0).unwrap();
        let b = master.derive(0).unwrap();
        assert_eq!(a.to_bytes(), b.to_bytes());
        let hardened = master.derive(-1).unwrap();
        assert_ne!(a.to_bytes(), hardened.to_bytes());
    }
}
