// Copyright (c) 2026 VELA Contributors. MIT License.
// See LICENSE for details.

//! # VELA Ledger — Transaction Commitment Core
//!
//! The mechanism by which a proposed state transition becomes an atomic,
//! tamper-evident, multi-party-authorized fact: assemble it in a builder,
//! freeze it into a canonical wire transaction whose content hash is its
//! identity, collect every required party's signature over that identity,
//! and verify the result — authenticity, identity binding, and
//! authorization completeness, in that order.
//!
//! ## Architecture
//!
//! - **crypto** — Content hashing (BLAKE3 domain-separated, SHA-256 for
//!   contract ids), Ed25519 keys and signatures, composite/threshold key
//!   trees.
//! - **identity** — Named parties bound to owning keys (notaries, issuers,
//!   owners).
//! - **state** — References to prior ledger states and the typed state
//!   payloads themselves.
//! - **transaction** — The pipeline: builder → wire transaction → signed
//!   transaction → verification.
//! - **contract** — The dispatch boundary to externally-supplied contract
//!   verification logic.
//! - **config** — Protocol constants. Consensus-critical; see the module
//!   docs before touching anything.
//!
//! ## Design Rules
//!
//! 1. Determinism above all: two independent builds of the same logical
//!    transaction must hash identically, or cross-party signing breaks.
//! 2. Frozen means frozen: wire and signed transactions never mutate;
//!    corrections require a new builder.
//! 3. Verification is all-or-nothing — no partial acceptance, no silent
//!    downgrades, and contract rejection is never conflated with
//!    cryptographic failure.

pub mod config;
pub mod contract;
pub mod crypto;
pub mod identity;
pub mod state;
pub mod transaction;

#[cfg(test)]
pub(crate) mod testutil;

pub use contract::{
    CommandData, ContractError, ContractId, ContractState, ContractVerifier, ResolvedTransaction,
    VerifierRegistry,
};
pub use crypto::{CompositeKey, CompositeKeyError, SecureHash, VelaKeypair, VelaPublicKey};
pub use identity::Party;
pub use state::{StateAndRef, StateRef, TransactionState};
pub use transaction::{
    BuilderItem, Command, SignatureMetadata, SignedTransaction, TimeWindow, TransactionBuilder,
    TransactionError, TransactionSignature, WireTransaction,
};
