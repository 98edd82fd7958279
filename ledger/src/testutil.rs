//! Shared fixtures for the crate's unit tests: a minimal cash-like contract
//! family and a few generators. Compiled only for tests.

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::contract::{CommandData, ContractId, ContractState};
use crate::crypto::{CompositeKey, SecureHash, VelaKeypair};
use crate::identity::Party;
use crate::state::{StateRef, TransactionState};

/// Name of the test contract family.
pub const TEST_CONTRACT: &str = "vela.test.cash";

/// A bare-bones owned-value state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestState {
    pub value: u64,
    pub owner: CompositeKey,
}

impl ContractState for TestState {
    fn contract(&self) -> ContractId {
        ContractId::from_name(TEST_CONTRACT)
    }

    fn participants(&self) -> Vec<CompositeKey> {
        vec![self.owner.clone()]
    }
}

/// Commands of the test family: one marker-only, one pure-data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TestCommand {
    Move,
    Issue { value: u64 },
}

impl CommandData for TestCommand {
    fn contract(&self) -> ContractId {
        ContractId::from_name(TEST_CONTRACT)
    }
}

/// A notary party backed by a fresh keypair.
pub fn notary() -> Party {
    Party::new("Test Notary", VelaKeypair::generate().public_key())
}

/// A notary party backed by the given keypair.
pub fn notary_with(keypair: &VelaKeypair) -> Party {
    Party::new("Test Notary", keypair.public_key())
}

/// A reference to an output of a transaction that never existed.
pub fn fake_state_ref() -> StateRef {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    StateRef::new(SecureHash::from_bytes(bytes), 0)
}

/// A test state of the given value, owned by `owner`, notarized by `notary`.
pub fn test_state(value: u64, owner: CompositeKey, notary: &Party) -> TransactionState<TestState> {
    TransactionState::new(TestState { value, owner }, notary.clone())
}
