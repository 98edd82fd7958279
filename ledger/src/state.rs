//! # Ledger State References
//!
//! The vocabulary for pointing at ledger states: a [`StateRef`] names one
//! output of one prior transaction, a [`TransactionState`] is a typed state
//! payload bound to the notary that arbitrates its consumption, and a
//! [`StateAndRef`] pairs the two — the unit a builder takes as an input.
//!
//! All three are plain value types. Once a transaction is committed, the
//! states it produced are history; consuming one elsewhere never mutates it,
//! it only gets referenced.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::crypto::SecureHash;
use crate::identity::Party;

/// A pointer to a specific output of a specific prior transaction.
///
/// Equality is structural: same transaction identity, same output index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StateRef {
    /// Identity hash of the transaction that produced the state.
    pub txhash: SecureHash,
    /// Position of the state in that transaction's output list.
    pub index: u32,
}

impl StateRef {
    /// Creates a reference to output `index` of transaction `txhash`.
    pub fn new(txhash: SecureHash, index: u32) -> Self {
        Self { txhash, index }
    }
}

impl fmt::Display for StateRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.txhash, self.index)
    }
}

/// A state payload plus the notary authorized to arbitrate its consumption.
///
/// The payload type `S` is a contract family's state type (see
/// [`crate::contract::ContractState`]). The notary recorded here is the only
/// one that may commit a transaction consuming this state — mixing notaries
/// within one transaction's inputs is a notarization-layer concern, outside
/// this core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionState<S> {
    /// The typed state payload.
    pub data: S,
    /// The notary bound to this state.
    pub notary: Party,
}

impl<S> TransactionState<S> {
    /// Binds a state payload to a notary.
    pub fn new(data: S, notary: Party) -> Self {
        Self { data, notary }
    }
}

/// A state together with the reference that names it on the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateAndRef<S> {
    /// The referenced state, as produced by the prior transaction.
    pub state: TransactionState<S>,
    /// Where that state lives on the ledger.
    pub reference: StateRef,
}

impl<S> StateAndRef<S> {
    /// Pairs a state with its ledger reference.
    pub fn new(state: TransactionState<S>, reference: StateRef) -> Self {
        Self { state, reference }
    }
}
