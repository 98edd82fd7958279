//! # Key Management
//!
//! Ed25519 keypair generation and the typed public-key / signature wrappers
//! used throughout the commitment core.
//!
//! Ed25519 because: deterministic signatures (no nonce footguns), 128-bit
//! security in 32+32 bytes, and fast verification — which matters when a
//! single transaction can carry a signature per required party.
//!
//! Private key material is never serialized implicitly: [`VelaKeypair`] does
//! not implement `Serialize`, and its `Debug` output shows only the public
//! half. Exporting a secret is a deliberate call to
//! [`VelaKeypair::secret_key_bytes`].

use ed25519_dalek::{
    Signature as DalekSignature, Signer, SigningKey, Verifier, VerifyingKey, SECRET_KEY_LENGTH,
};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use thiserror::Error;

/// Errors during key operations. Deliberately vague about *why* — error
/// messages must not become an oracle for key material.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("invalid secret key bytes: wrong length or not a valid scalar")]
    InvalidSecretKey,

    #[error("invalid public key bytes: not a valid Ed25519 point")]
    InvalidPublicKey,
}

/// An Ed25519 signing keypair — the "private key handle" of the core.
///
/// Each required party of a transaction holds one of these and signs the
/// transaction's identity hash with it. The verifying half travels inside
/// the collected signature; this struct never leaves its owner.
pub struct VelaKeypair {
    signing_key: SigningKey,
}

/// The public half of a keypair, safe to share and to embed in composite
/// key trees, parties, and collected signatures.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VelaPublicKey {
    bytes: [u8; 32],
}

/// An Ed25519 signature over a byte sequence.
///
/// Always 64 bytes when produced by this module. A signature of any other
/// length simply fails verification; no panics, no special cases.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VelaSignature {
    bytes: Vec<u8>,
}

impl VelaKeypair {
    /// Generates a fresh keypair from the OS cryptographic RNG.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Constructs a keypair deterministically from a 32-byte seed.
    ///
    /// In Ed25519 the 32-byte secret key *is* the seed. A weak seed makes a
    /// weak key; feed this from a CSPRNG or a proper KDF.
    pub fn from_seed(seed: &[u8; SECRET_KEY_LENGTH]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// Reconstructs a keypair from a hex-encoded secret key.
    pub fn from_hex(hex_str: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(hex_str).map_err(|_| KeyError::InvalidSecretKey)?;
        let arr: [u8; SECRET_KEY_LENGTH] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| KeyError::InvalidSecretKey)?;
        Ok(Self::from_seed(&arr))
    }

    /// The public key of this pair.
    pub fn public_key(&self) -> VelaPublicKey {
        VelaPublicKey {
            bytes: self.signing_key.verifying_key().to_bytes(),
        }
    }

    /// Signs a message. Ed25519 signing is deterministic: the same key and
    /// message always yield the same signature.
    pub fn sign(&self, message: &[u8]) -> VelaSignature {
        VelaSignature {
            bytes: self.signing_key.sign(message).to_bytes().to_vec(),
        }
    }

    /// Verifies a signature against this pair's public key.
    pub fn verify(&self, message: &[u8], signature: &VelaSignature) -> bool {
        self.public_key().verify(message, signature)
    }

    /// Exports the raw 32-byte secret. Handle with care: this is the only
    /// secret between an attacker and the associated identity.
    pub fn secret_key_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }
}

impl Clone for VelaKeypair {
    fn clone(&self) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(&self.signing_key.to_bytes()),
        }
    }
}

impl fmt::Debug for VelaKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print secret material, not even partially.
        write!(f, "VelaKeypair(pub={})", self.public_key().to_hex())
    }
}

// ---------------------------------------------------------------------------
// VelaPublicKey
// ---------------------------------------------------------------------------

impl VelaPublicKey {
    /// Wraps raw public key bytes without validation. Use
    /// [`try_from_slice`](Self::try_from_slice) for untrusted input.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self { bytes }
    }

    /// Validates and wraps a byte slice as a public key.
    ///
    /// Rejects wrong lengths and bytes that are not a valid Ed25519 point,
    /// which catches low-order points and other degenerate encodings.
    pub fn try_from_slice(slice: &[u8]) -> Result<Self, KeyError> {
        let bytes: [u8; 32] = slice.try_into().map_err(|_| KeyError::InvalidPublicKey)?;
        VerifyingKey::from_bytes(&bytes).map_err(|_| KeyError::InvalidPublicKey)?;
        Ok(Self { bytes })
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }

    /// Verifies a signature against this key.
    ///
    /// Returns a plain boolean: callers want yes/no, and distinguishing
    /// "malformed signature" from "wrong key" would only feed an attacker's
    /// error oracle.
    pub fn verify(&self, message: &[u8], signature: &VelaSignature) -> bool {
        let Ok(verifying_key) = VerifyingKey::from_bytes(&self.bytes) else {
            return false;
        };
        let sig_bytes: [u8; 64] = match signature.bytes.as_slice().try_into() {
            Ok(b) => b,
            Err(_) => return false,
        };
        verifying_key
            .verify(message, &DalekSignature::from_bytes(&sig_bytes))
            .is_ok()
    }

    /// Hex-encoded representation, 64 characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    /// Parses a hex-encoded public key.
    pub fn from_hex(s: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(s).map_err(|_| KeyError::InvalidPublicKey)?;
        Self::try_from_slice(&bytes)
    }
}

impl Hash for VelaPublicKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bytes.hash(state);
    }
}

impl fmt::Display for VelaPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for VelaPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VelaPublicKey({})", &self.to_hex()[..16])
    }
}

// ---------------------------------------------------------------------------
// VelaSignature
// ---------------------------------------------------------------------------

impl VelaSignature {
    /// Wraps a raw 64-byte signature.
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self {
            bytes: bytes.to_vec(),
        }
    }

    /// Raw signature bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Hex-encoded representation, 128 characters for a valid signature.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }

    /// Parses a hex-encoded signature. Rejects anything that is not exactly
    /// 64 bytes.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        if bytes.len() != 64 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        Ok(Self { bytes })
    }
}

impl fmt::Display for VelaSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for VelaSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex_str = self.to_hex();
        if hex_str.len() >= 16 {
            write!(f, "VelaSignature({}...)", &hex_str[..16])
        } else {
            write!(f, "VelaSignature({})", hex_str)
        }
    }
}
