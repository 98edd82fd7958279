//! # Content Identifiers
//!
//! Hashing for the commitment core. Two functions, two jobs:
//!
//! - **BLAKE3** (domain-separated) computes transaction identities. Every
//!   identity hash runs through `derive_key` with a versioned context string,
//!   so a wire-transaction hash can never collide with a hash of the same
//!   bytes produced for any other purpose.
//! - **SHA-256** derives contract identifiers from contract names, keeping
//!   them stable and reproducible from the name alone.
//!
//! Both produce 32 bytes, wrapped in [`SecureHash`] so a digest can never be
//! confused with arbitrary bytes at an API boundary.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use thiserror::Error;

/// Errors when parsing a hash from its textual form.
#[derive(Debug, Error)]
pub enum HashError {
    /// The input was not valid hex.
    #[error("invalid hash hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    /// The decoded bytes were not exactly 32 bytes long.
    #[error("invalid hash length: expected 32 bytes, got {0}")]
    InvalidLength(usize),
}

/// A 32-byte content identifier.
///
/// Used both as the identity of a wire transaction (BLAKE3, domain-separated)
/// and as a contract identifier (SHA-256 of the contract name). Equality is
/// structural; two hashes compare equal iff their bytes are identical.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SecureHash([u8; 32]);

impl SecureHash {
    /// Digest length in bytes.
    pub const LENGTH: usize = 32;

    /// Wraps raw digest bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// The all-zero hash. Useful as a placeholder in tests; never the output
    /// of an actual digest computation in practice.
    pub fn zero() -> Self {
        Self([0u8; 32])
    }

    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Hex-encoded representation, 64 characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parses a 64-character hex string.
    pub fn from_hex(s: &str) -> Result<Self, HashError> {
        let bytes = hex::decode(s)?;
        if bytes.len() != Self::LENGTH {
            return Err(HashError::InvalidLength(bytes.len()));
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Display for SecureHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for SecureHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecureHash({})", &self.to_hex()[..12])
    }
}

/// Computes a domain-separated BLAKE3 hash.
///
/// Uses BLAKE3's `derive_key` mode, which mixes the context string into the
/// internal IV. Hashes produced under different contexts can never collide,
/// even over identical input bytes. The context string must be unique per
/// purpose and versioned (see [`crate::config::WIRE_TX_DOMAIN`]).
pub fn domain_hash(context: &str, data: &[u8]) -> SecureHash {
    let mut hasher = blake3::Hasher::new_derive_key(context);
    hasher.update(data);
    SecureHash(*hasher.finalize().as_bytes())
}

/// Computes the SHA-256 hash of the input.
///
/// Contract identifiers are SHA-256 of the contract name, so they can be
/// recomputed by any party (or any external system) from the name alone.
pub fn sha256(data: &[u8]) -> SecureHash {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let digest = hasher.finalize();
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&digest);
    SecureHash(bytes)
}
