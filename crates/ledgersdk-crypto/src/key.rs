//! Algorithm-polymorphic key types: the `PrivateKey`/`PublicKey` the rest of
//! the SDK signs and verifies with, parsed from bytes, DER, PEM or hex.

use std::fmt;

use pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding};

use crate::ecdsa::{EcdsaPrivateKey, EcdsaPublicKey};
use crate::ed25519::{Ed25519PrivateKey, Ed25519PublicKey};
use crate::error::CryptoError;

/// A private key for either supported algorithm.
pub enum PrivateKey {
    /// Ed25519.
    Ed25519(Ed25519PrivateKey),
    /// ECDSA secp256k1.
    Ecdsa(EcdsaPrivateKey),
}

impl PrivateKey {
    /// Generates a fresh Ed25519 key.
    pub fn generate_ed25519() -> Self {
        Self::Ed25519(Ed25519PrivateKey::generate())
    }

    /// Generates a fresh ECDSA key.
    pub fn generate_ecdsa() -> Self {
        Self::Ecdsa(EcdsaPrivateKey::generate())
    }

    /// Parses a raw 32-byte Ed25519 private key.
    pub fn from_bytes_ed25519(bytes: &[u8]) -> Result<Self, CryptoError> {
        Ok(Self::Ed25519(Ed25519PrivateKey::from_bytes(bytes)?))
    }

    /// Parses a raw 32-byte ECDSA private key.
    pub fn from_bytes_ecdsa(bytes: &[u8]) -> Result<Self, CryptoError> {
        Ok(Self::Ecdsa(EcdsaPrivateKey::from_bytes(bytes)?))
    }

    /// Parses a raw private key of unspecified algorithm. 32-byte input is
    /// treated as Ed25519 (the more common case); any other length fails.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() == 32 {
            Self::from_bytes_ed25519(bytes)
        } else {
            Err(CryptoError::KeyParse(format!(
                "unrecognized private key length {} (expected 32 raw bytes, or DER/PEM)",
                bytes.len()
            )))
        }
    }

    /// Parses a PKCS#8 DER-encoded private key, detecting the algorithm from
    /// its OID.
    pub fn from_der(der: &[u8]) -> Result<Self, CryptoError> {
        if let Ok(key) = ed25519_dalek::SigningKey::from_pkcs8_der(der) {
            return Ok(Self::Ed25519(Ed25519PrivateKey::from_bytes(&key.to_bytes())?));
        }
        if let Ok(key) = k256::ecdsa::SigningKey::from_pkcs8_der(der) {
            let bytes: [u8; 32] = key.to_bytes().into();
            return Ok(Self::Ecdsa(EcdsaPrivateKey::from_bytes(&bytes)?));
        }
        Err(CryptoError::KeyParse("not a recognized PKCS#8 private key".into()))
    }

    /// Parses a PEM-encoded private key. Accepts both the `PRIVATE KEY` and
    /// `ENCRYPTED PRIVATE KEY` labels; for the latter, decrypts with
    /// `password` (PBKDF2 + AES-CBC per the PKCS#8 PBES2 wrapper).
    pub fn from_pem(pem: &str, password: Option<&[u8]>) -> Result<Self, CryptoError> {
        let label = pem_rfc7468::decode_label(pem.as_bytes())
            .map_err(|e| CryptoError::KeyParse(e.to_string()))?;
        match (label, password) {
            ("ENCRYPTED PRIVATE KEY", Some(password)) => {
                if let Ok(key) = ed25519_dalek::SigningKey::from_pkcs8_encrypted_pem(pem, password) {
                    return Ok(Self::Ed25519(Ed25519PrivateKey::from_bytes(&key.to_bytes())?));
                }
                if let Ok(key) = k256::ecdsa::SigningKey::from_pkcs8_encrypted_pem(pem, password) {
                    let bytes: [u8; 32] = key.to_bytes().into();
                    return Ok(Self::Ecdsa(EcdsaPrivateKey::from_bytes(&bytes)?));
                }
                Err(CryptoError::KeyParse("failed to decrypt PKCS#8 PEM".into()))
            }
            ("ENCRYPTED PRIVATE KEY", None) => {
                Err(CryptoError::KeyParse("encrypted PEM requires a password".into()))
            }
            ("PRIVATE KEY", _) => {
                if let Ok(key) = ed25519_dalek::SigningKey::from_pkcs8_pem(pem) {
                    return Ok(Self::Ed25519(Ed25519PrivateKey::from_bytes(&key.to_bytes())?));
                }
                if let Ok(key) = k256::ecdsa::SigningKey::from_pkcs8_pem(pem) {
                    let bytes: [u8; 32] = key.to_bytes().into();
                    return Ok(Self::Ecdsa(EcdsaPrivateKey::from_bytes(&bytes)?));
                }
                Err(CryptoError::KeyParse("not a recognized PKCS#8 PEM".into()))
            }
            (other, _) => Err(CryptoError::KeyParse(format!("unsupported PEM label `{other}`"))),
        }
    }

    /// Parses a hex string (optionally `0x`-prefixed, either case) as a raw
    /// or DER-encoded private key.
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let trimmed = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
        let bytes = hex::decode(trimmed).map_err(|e| CryptoError::KeyParse(e.to_string()))?;
        if bytes.len() == 32 {
            Self::from_bytes(&bytes)
        } else {
            Self::from_der(&bytes)
        }
    }

    /// This key's public counterpart.
    pub fn public_key(&self) -> PublicKey {
        match self {
            Self::Ed25519(k) => PublicKey::Ed25519(k.public_key()),
            Self::Ecdsa(k) => PublicKey::Ecdsa(k.public_key()),
        }
    }

    /// `true` if this key carries a chain code and can be derived further.
    pub fn is_derivable(&self) -> bool {
        match self {
            Self::Ed25519(k) => k.is_derivable(),
            Self::Ecdsa(k) => k.is_derivable(),
        }
    }

    /// Signs `message`. Ed25519 per RFC 8032, ECDSA per RFC 6979 over the
    /// message's SHA-256 digest.
    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        match self {
            Self::Ed25519(k) => k.sign(message).to_vec(),
            Self::Ecdsa(k) => k.sign(message).to_vec(),
        }
    }

    /// Derives a child key via SLIP-10 (Ed25519) or BIP-32 (ECDSA).
    pub fn derive(&self, index: i32) -> Result<Self, CryptoError> {
        match self {
            Self::Ed25519(k) => Ok(Self::Ed25519(k.derive(index)?)),
            Self::Ecdsa(k) => Ok(Self::Ecdsa(k.derive(index)?)),
        }
    }

    /// The legacy `i64`-indexed derivation scheme. Ed25519-only.
    pub fn legacy_derive(&self, index: i64) -> Result<Self, CryptoError> {
        match self {
            Self::Ed25519(k) => Ok(Self::Ed25519(k.legacy_derive(index)?)),
            Self::Ecdsa(_) => {
                Err(CryptoError::KeyDerive("legacy derivation is Ed25519-only".into()))
            }
        }
    }

    /// Raw bytes: 32-byte seed/scalar for either algorithm.
    pub fn to_bytes_raw(&self) -> Vec<u8> {
        match self {
            Self::Ed25519(k) => k.to_bytes().to_vec(),
            Self::Ecdsa(k) => k.to_bytes().to_vec(),
        }
    }

    /// PKCS#8 DER encoding.
    pub fn to_der(&self) -> Result<Vec<u8>, CryptoError> {
        let doc = match self {
            Self::Ed25519(k) => {
                let signing_key = ed25519_dalek::SigningKey::from_bytes(&k.to_bytes());
                signing_key.to_pkcs8_der().map_err(|e| CryptoError::KeyParse(e.to_string()))?
            }
            Self::Ecdsa(k) => {
                let signing_key = k256::ecdsa::SigningKey::from_bytes(k.to_bytes().as_slice().into())
                    .map_err(|e| CryptoError::KeyParse(e.to_string()))?;
                signing_key.to_pkcs8_der().map_err(|e| CryptoError::KeyParse(e.to_string()))?
            }
        };
        Ok(doc.as_bytes().to_vec())
    }

    /// PKCS#8 PEM encoding (unencrypted, `PRIVATE KEY` label).
    pub fn to_pem(&self) -> Result<String, CryptoError> {
        let der = self.to_der()?;
        pem_rfc7468::encode_string("PRIVATE KEY", LineEnding::LF, &der)
            .map_err(|e| CryptoError::KeyParse(e.to_string()))
    }

    /// Lowercase hex of the PKCS#8 DER encoding. Round-trips through
    /// [`PrivateKey::from_hex`].
    pub fn to_hex(&self) -> String {
        // `to_der` only fails on the encoder's internal invariants, never on
        // live key material, so collapsing the error here is safe.
        hex::encode(self.to_der().expect("DER-encoding a valid private key cannot fail"))
    }
}

impl fmt::Display for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// A public key for either supported algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublicKey {
    /// Ed25519.
    Ed25519(Ed25519PublicKey),
    /// ECDSA secp256k1.
    Ecdsa(EcdsaPublicKey),
}

impl PublicKey {
    /// Parses a raw public key: 32 bytes is Ed25519; 33 (compressed) or 65
    /// (uncompressed) bytes is ECDSA.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        match bytes.len() {
            32 => Ok(Self::Ed25519(Ed25519PublicKey::from_bytes(bytes)?)),
            33 | 65 => Ok(Self::Ecdsa(EcdsaPublicKey::from_bytes(bytes)?)),
            n => Err(CryptoError::KeyParse(format!(
                "unrecognized public key length {n} (expected 32, 33 or 65 raw bytes)"
            ))),
        }
    }

    /// Parses a raw 32-byte Ed25519 public key.
    pub fn from_bytes_ed25519(bytes: &[u8]) -> Result<Self, CryptoError> {
        Ok(Self::Ed25519(Ed25519PublicKey::from_bytes(bytes)?))
    }

    /// Parses a raw 33- or 65-byte ECDSA public key.
    pub fn from_bytes_ecdsa(bytes: &[u8]) -> Result<Self, CryptoError> {
        Ok(Self::Ecdsa(EcdsaPublicKey::from_bytes(bytes)?))
    }

    /// Parses a SubjectPublicKeyInfo DER-encoded public key, detecting the
    /// algorithm from its OID.
    pub fn from_der(der: &[u8]) -> Result<Self, CryptoError> {
        if let Ok(key) = ed25519_dalek::VerifyingKey::from_public_key_der(der) {
            return Ok(Self::Ed25519(Ed25519PublicKey::from_bytes(key.as_bytes())?));
        }
        if let Ok(key) = k256::ecdsa::VerifyingKey::from_public_key_der(der) {
            use k256::elliptic_curve::sec1::ToEncodedPoint;
            let compressed = key.to_encoded_point(true);
            return Ok(Self::Ecdsa(EcdsaPublicKey::from_bytes(compressed.as_bytes())?));
        }
        Err(CryptoError::KeyParse("not a recognized SubjectPublicKeyInfo public key".into()))
    }

    /// Parses a hex string (optionally `0x`-prefixed, either case) as a raw
    /// or DER-encoded public key.
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let trimmed = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
        let bytes = hex::decode(trimmed).map_err(|e| CryptoError::KeyParse(e.to_string()))?;
        match bytes.len() {
            32 | 33 | 65 => Self::from_bytes(&bytes),
            _ => Self::from_der(&bytes),
        }
    }

    /// Verifies `signature` over `message`. Fails with `SignatureVerify` on
    /// algorithm mismatch (wrong-length signature) or an invalid signature.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> Result<(), CryptoError> {
        match self {
            Self::Ed25519(k) => k.verify(message, signature),
            Self::Ecdsa(k) => k.verify(message, signature),
        }
    }

    /// Raw bytes: 32 for Ed25519, 33 (compressed) for ECDSA.
    pub fn to_bytes_raw(&self) -> Vec<u8> {
        match self {
            Self::Ed25519(k) => k.to_bytes().to_vec(),
            Self::Ecdsa(k) => k.to_bytes_compressed().to_vec(),
        }
    }

    /// The EVM address for an ECDSA key. Fails for Ed25519 keys.
    pub fn to_evm_address(&self) -> Result<[u8; 20], CryptoError> {
        match self {
            Self::Ecdsa(k) => Ok(k.to_evm_address()),
            Self::Ed25519(_) => {
                Err(CryptoError::KeyParse("EVM addresses require an ECDSA key".into()))
            }
        }
    }

    /// SubjectPublicKeyInfo DER encoding.
    pub fn to_der(&self) -> Result<Vec<u8>, CryptoError> {
        let doc = match self {
            Self::Ed25519(k) => {
                let verifying_key = ed25519_dalek::VerifyingKey::from_bytes(&k.to_bytes())
                    .map_err(|e| CryptoError::KeyParse(e.to_string()))?;
                verifying_key.to_public_key_der().map_err(|e| CryptoError::KeyParse(e.to_string()))?
            }
            Self::Ecdsa(k) => {
                let verifying_key = k256::ecdsa::VerifyingKey::from_sec1_bytes(&k.to_bytes_compressed())
                    .map_err(|e| CryptoError::KeyParse(e.to_string()))?;
                verifying_key.to_public_key_der().map_err(|e| CryptoError::KeyParse(e.to_string()))?
            }
        };
        Ok(doc.as_bytes().to_vec())
    }

    /// Lowercase hex of the SubjectPublicKeyInfo DER encoding. Round-trips
    /// through [`PublicKey::from_hex`].
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_der().expect("DER-encoding a valid public key cannot fail"))
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ed25519_sign_verify_round_trip() {
        let key = PrivateKey::generate_ed25519();
        let sig = key.sign(b"hello");
        assert!(key.public_key().verify(b"hello", &sig).is_ok());
    }

    #[test]
    fn ecdsa_sign_verify_round_trip() {
        let key = PrivateKey::generate_ecdsa();
        let sig = key.sign(b"hello");
        assert!(key.public_key().verify(b"hello", &sig).is_ok());
    }

    #[test]
    fn cross_algorithm_verify_fails() {
        let ed = PrivateKey::generate_ed25519();
        let ec = PrivateKey::generate_ecdsa();
        let sig = ed.sign(b"hello");
        assert!(ec.public_key().verify(b"hello", &sig).is_err());
    }

    #[test]
    fn der_round_trip_ed25519() {
        let key = PrivateKey::generate_ed25519();
        let der = key.to_der().unwrap();
        let parsed = PrivateKey::from_der(&der).unwrap();
        assert_eq!(key.to_bytes_raw(), parsed.to_bytes_raw());
    }

    #[test]
    fn der_round_trip_ecdsa() {
        let key = PrivateKey::generate_ecdsa();
        let der = key.to_der().unwrap();
        let parsed = PrivateKey::from_der(&der).unwrap();
        assert_eq!(key.to_bytes_raw(), parsed.to_bytes_raw());
    }

    #[test]
    fn pem_round_trip() {
        let key = PrivateKey::generate_ed25519();
        let pem = key.to_pem().unwrap();
        let parsed = PrivateKey::from_pem(&pem, None).unwrap();
        assert_eq!(key.to_bytes_raw(), parsed.to_bytes_raw());
    }

    #[test]
    fn hex_parsing_accepts_0x_prefix_either_case() {
        let key = PrivateKey::generate_ed25519();
        let hex_str = format!("0x{}", hex::encode(key.to_bytes_raw()));
        assert!(PrivateKey::from_hex(&hex_str).is_ok());
        assert!(PrivateKey::from_hex(&hex_str.to_uppercase()).is_ok());
    }

    #[test]
    fn legacy_derive_rejected_for_ecdsa() {
        let key = PrivateKey::generate_ecdsa();
        assert!(key.legacy_derive(-1).is_err());
    }

    #[test]
    fn private_key_string_round_trips_ed25519() {
        let key = PrivateKey::generate_ed25519();
        let parsed = PrivateKey::from_hex(&key.to_string()).unwrap();
        assert_eq!(key.to_bytes_raw(), parsed.to_bytes_raw());
    }

    #[test]
    fn private_key_string_round_trips_ecdsa() {
        let key = PrivateKey::generate_ecdsa();
        let parsed = PrivateKey::from_hex(&key.to_string()).unwrap();
        assert_eq!(key.to_bytes_raw(), parsed.to_bytes_raw());
    }

    #[test]
    fn public_key_string_round_trips_ed25519() {
        let key = PrivateKey::generate_ed25519().public_key();
        let parsed = PublicKey::from_hex(&key.to_string()).unwrap();
        assert_eq!(key.to_bytes_raw(), parsed.to_bytes_raw());
    }

    #[test]
    fn public_key_string_round_trips_ecdsa() {
        let key = PrivateKey::generate_ecdsa().public_key();
        let parsed = PublicKey::from_hex(&key.to_string()).unwrap();
        assert_eq!(key.to_bytes_raw(), parsed.to_bytes_raw());
    }
}
