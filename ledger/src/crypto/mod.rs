//! # Cryptographic Primitives
//!
//! The foundation of the commitment core: content hashing, Ed25519 keys and
//! signatures, and composite (threshold) key trees.
//!
//! Everything here is a thin, type-safe wrapper around audited
//! implementations (`blake3`, `sha2`, `ed25519-dalek`). The one piece of
//! cryptographic logic we own — composite key satisfaction — is a pure
//! recursion over a tree, deliberately kept free of any signature math.

pub mod composite;
pub mod hash;
pub mod keys;
pub mod signatures;

// Re-export the types people actually need so call sites don't have to
// memorize the module hierarchy.
pub use composite::{CompositeKey, CompositeKeyError};
pub use hash::{domain_hash, sha256, SecureHash};
pub use keys::{KeyError, VelaKeypair, VelaPublicKey, VelaSignature};
pub use signatures::{batch_verify, sign, verify};
