//! # Protocol Constants
//!
//! Every magic number in the commitment core lives here. Identity hashes and
//! every collected signature depend on these values, so changing any of them
//! after transactions exist in the wild invalidates those transactions.
//! Treat this file as consensus-critical.

// ---------------------------------------------------------------------------
// Versioning
// ---------------------------------------------------------------------------

/// Protocol generation recorded in signature metadata. Bump on changes to
/// the signing pipeline (what gets signed, how signatures are interpreted).
pub const PROTOCOL_VERSION: u16 = 1;

/// Canonical wire-format marker. The first two bytes of every canonical
/// encoding, and therefore an input to every transaction identity. Bump on
/// any change to the canonical byte layout.
pub const WIRE_FORMAT_VERSION: u16 = 1;

// ---------------------------------------------------------------------------
// Hash Domains
// ---------------------------------------------------------------------------

/// Domain tag for transaction identity hashes. The version suffix means a
/// format bump can never collide with hashes of the previous layout, even
/// over identical bytes.
pub const WIRE_TX_DOMAIN: &str = "vela/wire-transaction/v1";

// ---------------------------------------------------------------------------
// Cryptographic Parameters
// ---------------------------------------------------------------------------

/// The signature scheme used at the leaf-key level.
pub const SIGNING_ALGORITHM: &str = "Ed25519";

/// Scheme identifier recorded in signature metadata. Ed25519 is scheme 1;
/// further schemes get further numbers, never a reassignment.
pub const SCHEME_ED25519: u8 = 1;

/// Ed25519 secret key length in bytes.
pub const SIGNING_KEY_LENGTH: usize = 32;

/// Ed25519 public (verifying) key length in bytes.
pub const VERIFYING_KEY_LENGTH: usize = 32;

/// Ed25519 signature length in bytes.
pub const SIGNATURE_LENGTH: usize = 64;

/// Output length of both identity hashes (BLAKE3) and contract identifiers
/// (SHA-256).
pub const HASH_OUTPUT_LENGTH: usize = 32;
