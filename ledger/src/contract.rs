//! # Contract Verification Boundary
//!
//! The commitment core does not understand contract business logic; it only
//! knows how to *dispatch* to it. A contract family supplies:
//!
//! - a state type implementing [`ContractState`],
//! - a command type implementing [`CommandData`] (a closed enum: marker-only
//!   variants for semantic flags, pure-data variants carrying fields),
//! - a verifier registered in a [`VerifierRegistry`] under the family's
//!   [`ContractId`].
//!
//! Given a [`ResolvedTransaction`] — inputs resolved to their concrete prior
//! states — the registry invokes each registered verifier once per distinct
//! contract referenced by the transaction's outputs and commands. Contract
//! rejection is a [`ContractError`], a category of its own: it is a business
//! rule saying no, not a broken signature or a missing authorization, and
//! callers must be able to tell the difference.
//!
//! The registry is explicit configuration. There is no process-wide table of
//! contracts; whoever verifies builds (or is handed) a registry.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;
use tracing::debug;

use crate::crypto::hash::sha256;
use crate::crypto::{CompositeKey, SecureHash};
use crate::identity::Party;
use crate::state::{StateAndRef, TransactionState};
use crate::transaction::{Command, TimeWindow};

/// Errors from contract verification. Deliberately a separate enum from the
/// transaction errors: a contract saying "no" is a different fact from a
/// signature failing to verify.
#[derive(Debug, Error)]
pub enum ContractError {
    /// A referenced contract has no verifier in the registry.
    #[error("no verifier registered for contract {0}")]
    Unregistered(ContractId),

    /// A contract's verifier rejected the transaction.
    #[error("contract {contract} rejected the transaction: {reason}")]
    Rejected {
        /// The rejecting contract.
        contract: ContractId,
        /// The contract's stated reason.
        reason: String,
    },
}

impl ContractError {
    /// Convenience constructor for contract implementations.
    pub fn rejected(contract: ContractId, reason: impl Into<String>) -> Self {
        Self::Rejected {
            contract,
            reason: reason.into(),
        }
    }
}

/// Identifies a contract family.
///
/// Derived as SHA-256 of the family's canonical name, so any party can
/// recompute it from the name alone and identifiers stay stable across
/// builds and implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContractId(SecureHash);

impl ContractId {
    /// Derives the identifier for the named contract family.
    pub fn from_name(name: &str) -> Self {
        Self(sha256(name.as_bytes()))
    }

    /// The underlying digest.
    pub fn hash(&self) -> &SecureHash {
        &self.0
    }
}

impl fmt::Display for ContractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_hex()[..16])
    }
}

/// A contract family's state payload.
///
/// `Serialize` is required because states are part of the canonical wire
/// encoding; `Clone` and `Debug` because states travel through builders and
/// error messages.
pub trait ContractState: Clone + fmt::Debug + Serialize {
    /// The contract family this state belongs to.
    fn contract(&self) -> ContractId;

    /// The keys with a stake in this state. Informational for the core;
    /// contract verifiers typically check these against command signers.
    fn participants(&self) -> Vec<CompositeKey>;
}

/// A contract family's command payload — the closed variant set naming what
/// a transaction *does* with the family's states.
pub trait CommandData: Clone + fmt::Debug + Serialize {
    /// The contract family this command belongs to.
    fn contract(&self) -> ContractId;
}

/// A transaction with its inputs resolved to concrete prior states — the
/// view handed to contract verifiers.
///
/// Fields are public: contract code reads all of them, and tests construct
/// resolved views directly.
#[derive(Debug, Clone)]
pub struct ResolvedTransaction<S, C> {
    /// Inputs with their full prior states, in wire order.
    pub inputs: Vec<StateAndRef<S>>,
    /// Output states, in wire order.
    pub outputs: Vec<TransactionState<S>>,
    /// Commands, in wire order.
    pub commands: Vec<Command<C>>,
    /// The notary, if the transaction names one.
    pub notary: Option<Party>,
    /// The time window, if the transaction carries one.
    pub time_window: Option<TimeWindow>,
    /// Identity of the underlying wire transaction.
    pub id: SecureHash,
}

impl<S: ContractState, C: CommandData> ResolvedTransaction<S, C> {
    /// Distinct contracts referenced by outputs and commands, in first
    /// reference order. This is the dispatch list: each gets exactly one
    /// verifier invocation.
    pub fn contracts(&self) -> Vec<ContractId> {
        let mut seen = Vec::new();
        let referenced = self
            .outputs
            .iter()
            .map(|output| output.data.contract())
            .chain(self.commands.iter().map(|command| command.data.contract()));
        for contract in referenced {
            if !seen.contains(&contract) {
                seen.push(contract);
            }
        }
        seen
    }

    /// The commands belonging to the given contract family, in wire order.
    pub fn commands_for(&self, contract: ContractId) -> Vec<&Command<C>> {
        self.commands
            .iter()
            .filter(|command| command.data.contract() == contract)
            .collect()
    }
}

/// The verification capability for one contract family.
pub type ContractVerifier<S, C> =
    Box<dyn Fn(&ResolvedTransaction<S, C>) -> Result<(), ContractError> + Send + Sync>;

/// An explicit table mapping contract identifiers to their verifiers.
pub struct VerifierRegistry<S, C> {
    verifiers: HashMap<ContractId, ContractVerifier<S, C>>,
}

impl<S: ContractState, C: CommandData> VerifierRegistry<S, C> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            verifiers: HashMap::new(),
        }
    }

    /// Registers (or replaces) the verifier for a contract family.
    pub fn register<F>(&mut self, contract: ContractId, verifier: F)
    where
        F: Fn(&ResolvedTransaction<S, C>) -> Result<(), ContractError> + Send + Sync + 'static,
    {
        self.verifiers.insert(contract, Box::new(verifier));
    }

    /// Whether a verifier is registered for the given contract.
    pub fn is_registered(&self, contract: ContractId) -> bool {
        self.verifiers.contains_key(&contract)
    }

    /// Runs each referenced contract's verifier against the resolved
    /// transaction, once per distinct contract in first-reference order.
    ///
    /// Fails on the first unregistered contract or rejection; there is no
    /// partial success.
    pub fn verify(&self, tx: &ResolvedTransaction<S, C>) -> Result<(), ContractError> {
        for contract in tx.contracts() {
            let verifier = self
                .verifiers
                .get(&contract)
                .ok_or(ContractError::Unregistered(contract))?;
            verifier(tx)?;
            debug!(%contract, tx = %tx.id, "contract verification passed");
        }
        Ok(())
    }
}

impl<S: ContractState, C: CommandData> Default for VerifierRegistry<S, C> {
    fn default() -> Self {
        Self::new()
    }
}
