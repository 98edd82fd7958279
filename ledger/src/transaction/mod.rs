//! # Transaction Commitment Pipeline
//!
//! Construction, canonicalization, signing, and verification of ledger
//! transactions.
//!
//! ```text
//! wire.rs    — Command, TimeWindow, WireTransaction (canonical form + identity)
//! builder.rs — TransactionBuilder: two-phase accumulate-then-freeze staging
//! signed.rs  — TransactionSignature, SignedTransaction, verify_signatures
//! ```
//!
//! ## Lifecycle
//!
//! 1. **Accumulate** — a [`TransactionBuilder`] collects inputs, outputs,
//!    commands, an optional notary, and an optional time window.
//! 2. **Freeze** — the builder snapshots into a [`WireTransaction`], whose
//!    canonical bytes are hashed into its identity. The freeze is
//!    irreversible; corrections require a new builder.
//! 3. **Sign** — each required party signs the identity hash; signatures
//!    accumulate on the builder.
//! 4. **Commit** — [`TransactionBuilder::to_signed_transaction`] checks the
//!    required-signer set and produces an immutable [`SignedTransaction`].
//! 5. **Verify** — any holder of the signed transaction can re-run
//!    [`SignedTransaction::verify_signatures`]: every signature must verify
//!    against the identity, the identity must match the content, and the
//!    required-signer set must be covered.
//!
//! ## Determinism
//!
//! Two parties that build the same logical transaction must compute the same
//! identity, or their signatures can never agree. The canonical encoding is
//! therefore hand-framed — fixed-width little-endian integers, explicit
//! presence flags, length-prefixed sections — with no dependence on map
//! iteration order, locale, or serializer defaults.

pub mod builder;
pub mod signed;
pub mod wire;

pub use builder::{BuilderItem, TransactionBuilder};
pub use signed::{SignatureMetadata, SignedTransaction, TransactionSignature};
pub use wire::{Command, TimeWindow, WireTransaction};

use thiserror::Error;

use crate::crypto::SecureHash;

/// Errors raised while building, committing, or verifying transactions.
///
/// Variants fall into three of the core's failure categories (contract
/// failures are [`crate::contract::ContractError`], kept separate):
///
/// - malformed input: [`Frozen`](Self::Frozen),
///   [`EmptySignatures`](Self::EmptySignatures), [`Encode`](Self::Encode),
///   [`InputCountMismatch`](Self::InputCountMismatch),
///   [`InputMismatch`](Self::InputMismatch);
/// - signature-invalid: [`InvalidSignature`](Self::InvalidSignature),
///   [`IdentityMismatch`](Self::IdentityMismatch);
/// - missing-authorization:
///   [`MissingAuthorization`](Self::MissingAuthorization).
#[derive(Debug, Error)]
pub enum TransactionError {
    /// A mutation was attempted on a builder that already froze its wire
    /// form. The identity is already fixed; corrections require a new
    /// builder.
    #[error("builder already frozen as transaction {id}; start a new builder to make changes")]
    Frozen {
        /// Identity of the frozen wire transaction.
        id: SecureHash,
    },

    /// The canonical encoding of a state, command, or party payload failed.
    #[error("canonical encoding failed: {0}")]
    Encode(#[from] bincode::Error),

    /// A signed transaction must carry at least one signature. Enforced at
    /// construction, before and independent of any authorization check.
    #[error("a signed transaction requires at least one signature")]
    EmptySignatures,

    /// Resolution was given the wrong number of input states.
    #[error("wrong number of resolved inputs: transaction has {expected}, got {actual}")]
    InputCountMismatch {
        /// Number of inputs the wire transaction references.
        expected: usize,
        /// Number of states supplied.
        actual: usize,
    },

    /// A resolved input state does not match the reference at its position.
    #[error("resolved input {position} does not match the transaction's input reference")]
    InputMismatch {
        /// Zero-based position of the offending input.
        position: usize,
    },

    /// A collected signature does not verify against the transaction
    /// identity and its claimed key. Tampering or corruption; never ignored.
    #[error("signature by key {key} does not verify against transaction {id}")]
    InvalidSignature {
        /// Hex encoding of the claimed signing key.
        key: String,
        /// The identity the signature was checked against.
        id: SecureHash,
    },

    /// The transaction content does not hash to the claimed identity.
    /// Like [`InvalidSignature`](Self::InvalidSignature), this means the
    /// identity binding is broken.
    #[error("identity mismatch: content hashes to {computed} but transaction claims {claimed}")]
    IdentityMismatch {
        /// Identity recomputed from the canonical content.
        computed: SecureHash,
        /// Identity the transaction claims.
        claimed: SecureHash,
    },

    /// The required-signer set is not fully covered by the collected
    /// signatures. Resolved by collecting more signatures and re-verifying,
    /// never by partial acceptance.
    #[error("unsatisfied required signers: {missing} of {required} not covered")]
    MissingAuthorization {
        /// Number of required signers not satisfied.
        missing: usize,
        /// Total number of required signers.
        required: usize,
    },
}
