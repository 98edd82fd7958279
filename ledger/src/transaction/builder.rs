//! # Transaction Builder
//!
//! The mutable staging area in which a transaction is assembled. A builder
//! is a two-phase state machine:
//!
//! - **Accumulating** — inputs, outputs, commands, the notary, and an
//!   optional time window can be appended or set. Appending is monotonic:
//!   there is no removal operation.
//! - **Frozen** — the first signature (or an explicit
//!   [`to_wire_transaction`](TransactionBuilder::to_wire_transaction) call)
//!   snapshots the accumulated content into a [`WireTransaction`] and fixes
//!   its identity. From then on, content mutation fails with
//!   [`TransactionError::Frozen`]; signatures keep accumulating against the
//!   fixed identity. The freeze is irreversible — corrections mean a new
//!   builder.
//!
//! A builder is single-owner and sequential. A multi-party signing round may
//! drive it from the outside, but each mutation of one builder instance is
//! serialized by its owner; the frozen products are immutable and freely
//! shareable.

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::time::Duration;
use tracing::debug;

use crate::contract::{CommandData, ContractState};
use crate::crypto::{VelaKeypair, VelaPublicKey};
use crate::identity::Party;
use crate::state::{StateAndRef, TransactionState};

use super::signed::{verify_required_signers, SignedTransaction, TransactionSignature};
use super::wire::{Command, TimeWindow, WireTransaction};
use super::TransactionError;

/// One item for [`TransactionBuilder::with_items`]: an input, an output, or
/// a command. The set is closed — there is no such thing as an unrecognized
/// item at this boundary.
#[derive(Debug, Clone)]
pub enum BuilderItem<S, C> {
    /// A prior state to consume.
    Input(StateAndRef<S>),
    /// A new state to produce.
    Output(TransactionState<S>),
    /// A command with its required signers.
    Command(Command<C>),
}

impl<S, C> From<StateAndRef<S>> for BuilderItem<S, C> {
    fn from(input: StateAndRef<S>) -> Self {
        Self::Input(input)
    }
}

impl<S, C> From<TransactionState<S>> for BuilderItem<S, C> {
    fn from(output: TransactionState<S>) -> Self {
        Self::Output(output)
    }
}

impl<S, C> From<Command<C>> for BuilderItem<S, C> {
    fn from(command: Command<C>) -> Self {
        Self::Command(command)
    }
}

/// Accumulates transaction content and signatures, then freezes into the
/// immutable wire / signed forms.
pub struct TransactionBuilder<S, C> {
    notary: Option<Party>,
    inputs: Vec<StateAndRef<S>>,
    outputs: Vec<TransactionState<S>>,
    commands: Vec<Command<C>>,
    time_window: Option<TimeWindow>,
    signatures: Vec<TransactionSignature>,
    frozen: Option<WireTransaction<S, C>>,
}

impl<S: ContractState, C: CommandData> TransactionBuilder<S, C> {
    /// Creates an empty builder with no notary.
    pub fn new() -> Self {
        Self {
            notary: None,
            inputs: Vec::new(),
            outputs: Vec::new(),
            commands: Vec::new(),
            time_window: None,
            signatures: Vec::new(),
            frozen: None,
        }
    }

    /// Creates an empty builder seeded with a notary.
    pub fn with_notary(notary: Party) -> Self {
        let mut builder = Self::new();
        builder.notary = Some(notary);
        builder
    }

    /// Appends a mixture of inputs, outputs, and commands, in the order
    /// given. Chainable; intended for the common build-it-all-at-once flow.
    pub fn with_items<I>(mut self, items: I) -> Result<Self, TransactionError>
    where
        I: IntoIterator<Item = BuilderItem<S, C>>,
    {
        for item in items {
            match item {
                BuilderItem::Input(input) => {
                    self.add_input(input)?;
                }
                BuilderItem::Output(output) => {
                    self.add_output(output)?;
                }
                BuilderItem::Command(command) => {
                    self.add_command(command)?;
                }
            }
        }
        Ok(self)
    }

    /// Appends an input.
    pub fn add_input(&mut self, input: StateAndRef<S>) -> Result<&mut Self, TransactionError> {
        self.ensure_mutable()?;
        self.inputs.push(input);
        Ok(self)
    }

    /// Appends an output.
    pub fn add_output(
        &mut self,
        output: TransactionState<S>,
    ) -> Result<&mut Self, TransactionError> {
        self.ensure_mutable()?;
        self.outputs.push(output);
        Ok(self)
    }

    /// Appends a command.
    pub fn add_command(&mut self, command: Command<C>) -> Result<&mut Self, TransactionError> {
        self.ensure_mutable()?;
        self.commands.push(command);
        Ok(self)
    }

    /// Sets the time window. At most one window is active; setting again
    /// replaces the previous one.
    pub fn set_time(
        &mut self,
        midpoint: DateTime<Utc>,
        tolerance: Duration,
    ) -> Result<&mut Self, TransactionError> {
        self.ensure_mutable()?;
        self.time_window = Some(TimeWindow::new(midpoint, tolerance));
        Ok(self)
    }

    /// Signs the transaction identity with the given keypair, freezing the
    /// wire form first if this is the first freeze-triggering call.
    ///
    /// Signing twice with the same key is permitted: the duplicate entries
    /// are valid, and verification never double-counts them toward another
    /// key's requirement.
    pub fn sign_with(&mut self, keypair: &VelaKeypair) -> Result<&mut Self, TransactionError> {
        let id = *self.freeze()?.id();
        let signature = TransactionSignature::sign(keypair, &id);
        debug!(key = %signature.by, tx = %id, "signature collected");
        self.signatures.push(signature);
        Ok(self)
    }

    /// The signatures collected so far, in collection order.
    pub fn signatures(&self) -> &[TransactionSignature] {
        &self.signatures
    }

    /// The accumulated inputs with their full states — handy for resolving
    /// the finished transaction for contract verification.
    pub fn inputs(&self) -> &[StateAndRef<S>] {
        &self.inputs
    }

    /// Whether the builder has frozen its wire form.
    pub fn is_frozen(&self) -> bool {
        self.frozen.is_some()
    }

    /// Freezes (if not already frozen) and returns the canonical wire form.
    ///
    /// Deterministic: for identical accumulated content this yields
    /// byte-identical canonical encodings, regardless of how construction
    /// calls were interleaved to get there.
    pub fn to_wire_transaction(&mut self) -> Result<WireTransaction<S, C>, TransactionError> {
        self.freeze()
    }

    /// Freezes and produces a [`SignedTransaction`], first checking that the
    /// collected signatures cover the full required-signer set (command
    /// signers, plus the notary when inputs or a time window are present).
    ///
    /// Fails with [`TransactionError::MissingAuthorization`] when coverage
    /// is incomplete — collect the missing signatures and call again; the
    /// accumulated signature set is not mutated by this call.
    pub fn to_signed_transaction(&mut self) -> Result<SignedTransaction<S, C>, TransactionError> {
        let wire = self.freeze()?;
        let signed_keys: HashSet<VelaPublicKey> = self
            .signatures
            .iter()
            .map(|signature| signature.by.clone())
            .collect();
        verify_required_signers(&wire.required_signers(), &signed_keys)?;
        SignedTransaction::new(wire, self.signatures.clone())
    }

    /// Like [`to_signed_transaction`](Self::to_signed_transaction) but skips
    /// the required-signer check, for callers that gather signatures across
    /// several rounds and verify at the end. An empty signature list is
    /// still rejected.
    pub fn to_signed_transaction_unchecked(
        &mut self,
    ) -> Result<SignedTransaction<S, C>, TransactionError> {
        let wire = self.freeze()?;
        SignedTransaction::new(wire, self.signatures.clone())
    }

    fn ensure_mutable(&self) -> Result<(), TransactionError> {
        match &self.frozen {
            Some(wire) => Err(TransactionError::Frozen { id: *wire.id() }),
            None => Ok(()),
        }
    }

    fn freeze(&mut self) -> Result<WireTransaction<S, C>, TransactionError> {
        if let Some(wire) = &self.frozen {
            return Ok(wire.clone());
        }
        let wire = WireTransaction::new(
            self.inputs.iter().map(|input| input.reference).collect(),
            self.outputs.clone(),
            self.commands.clone(),
            self.notary.clone(),
            self.time_window,
        )?;
        debug!(id = %wire.id(), "builder frozen");
        self.frozen = Some(wire.clone());
        Ok(wire)
    }
}

impl<S: ContractState, C: CommandData> Default for TransactionBuilder<S, C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::CompositeKey;
    use crate::testutil::{fake_state_ref, notary_with, test_state, TestCommand, TestState};

    struct Fixture {
        notary_keypair: VelaKeypair,
        notary: Party,
        owner_keypair: VelaKeypair,
        owner: CompositeKey,
        input: StateAndRef<TestState>,
    }

    fn fixture() -> Fixture {
        let notary_keypair = VelaKeypair::generate();
        let notary = notary_with(&notary_keypair);
        let owner_keypair = VelaKeypair::generate();
        let owner = CompositeKey::single(owner_keypair.public_key());
        let input = StateAndRef::new(
            test_state(1_000, owner.clone(), &notary),
            fake_state_ref(),
        );
        Fixture {
            notary_keypair,
            notary,
            owner_keypair,
            owner,
            input,
        }
    }

    fn populated_builder(fx: &Fixture) -> TransactionBuilder<TestState, TestCommand> {
        TransactionBuilder::with_notary(fx.notary.clone())
            .with_items(vec![
                BuilderItem::from(fx.input.clone()),
                BuilderItem::from(test_state(600, fx.owner.clone(), &fx.notary)),
                BuilderItem::from(test_state(400, fx.owner.clone(), &fx.notary)),
                BuilderItem::from(Command::new(TestCommand::Move, vec![fx.owner.clone()])),
            ])
            .unwrap()
    }

    #[test]
    fn identical_content_gives_identical_identity() {
        let fx = fixture();

        // Same logical content, assembled through different call sequences:
        // with_items in one shot vs. piecewise add_* calls with the time
        // window set (and replaced) in between.
        let mut one_shot = populated_builder(&fx);

        let mut piecewise: TransactionBuilder<TestState, TestCommand> =
            TransactionBuilder::with_notary(fx.notary.clone());
        piecewise.add_input(fx.input.clone()).unwrap();
        piecewise
            .add_output(test_state(600, fx.owner.clone(), &fx.notary))
            .unwrap();
        piecewise
            .add_command(Command::new(TestCommand::Move, vec![fx.owner.clone()]))
            .unwrap();
        piecewise
            .add_output(test_state(400, fx.owner.clone(), &fx.notary))
            .unwrap();

        assert_eq!(
            one_shot.to_wire_transaction().unwrap().id(),
            piecewise.to_wire_transaction().unwrap().id(),
            "interleaving of unrelated mutation calls must not affect identity"
        );
    }

    #[test]
    fn wire_transaction_preserves_insertion_order() {
        let fx = fixture();
        let mut builder = populated_builder(&fx);
        let wire = builder.to_wire_transaction().unwrap();

        assert_eq!(wire.inputs(), &[fx.input.reference]);
        assert_eq!(wire.outputs()[0].data.value, 600);
        assert_eq!(wire.outputs()[1].data.value, 400);
        assert_eq!(wire.commands().len(), 1);
    }

    #[test]
    fn freezing_is_idempotent() {
        let fx = fixture();
        let mut builder = populated_builder(&fx);
        let first = builder.to_wire_transaction().unwrap();
        let second = builder.to_wire_transaction().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn mutation_after_freeze_fails() {
        let fx = fixture();
        let mut builder = populated_builder(&fx);
        builder.sign_with(&fx.owner_keypair).unwrap();
        assert!(builder.is_frozen());

        let result = builder.add_output(test_state(1, fx.owner.clone(), &fx.notary));
        match result {
            Err(TransactionError::Frozen { .. }) => {}
            other => panic!("expected Frozen, got {:?}", other.map(|_| ())),
        }
        assert!(matches!(
            builder.set_time(Utc::now(), Duration::from_secs(30)),
            Err(TransactionError::Frozen { .. })
        ));
    }

    #[test]
    fn signing_after_freeze_is_allowed() {
        let fx = fixture();
        let mut builder = populated_builder(&fx);
        builder.sign_with(&fx.owner_keypair).unwrap();
        builder.sign_with(&fx.notary_keypair).unwrap();
        assert_eq!(builder.signatures().len(), 2);
    }

    #[test]
    fn set_time_replaces_previous_window() {
        let fx = fixture();
        let mut builder = populated_builder(&fx);
        let first = Utc::now();
        let second = first + chrono::Duration::seconds(90);

        builder.set_time(first, Duration::from_secs(30)).unwrap();
        builder.set_time(second, Duration::from_secs(60)).unwrap();

        let wire = builder.to_wire_transaction().unwrap();
        let window = wire.time_window().unwrap();
        assert_eq!(window.midpoint, second);
        assert_eq!(window.tolerance, Duration::from_secs(60));
    }

    #[test]
    fn to_signed_transaction_requires_all_signers() {
        let fx = fixture();
        let mut builder = populated_builder(&fx);

        // No signatures at all.
        assert!(matches!(
            builder.to_signed_transaction(),
            Err(TransactionError::MissingAuthorization { missing: 2, required: 2 })
        ));

        // Owner only: the notary (required because there is an input) is missing.
        builder.sign_with(&fx.owner_keypair).unwrap();
        assert!(matches!(
            builder.to_signed_transaction(),
            Err(TransactionError::MissingAuthorization { missing: 1, required: 2 })
        ));

        // Adding exactly the missing signer completes the set.
        builder.sign_with(&fx.notary_keypair).unwrap();
        let signed = builder.to_signed_transaction().unwrap();
        assert_eq!(signed.sigs().len(), 2);
    }

    #[test]
    fn failed_commit_leaves_signatures_intact() {
        let fx = fixture();
        let mut builder = populated_builder(&fx);
        builder.sign_with(&fx.owner_keypair).unwrap();

        assert!(builder.to_signed_transaction().is_err());
        assert_eq!(
            builder.signatures().len(),
            1,
            "a failed commit must not touch the collected signatures"
        );
    }

    #[test]
    fn duplicate_signature_is_permitted_but_not_sufficient() {
        let fx = fixture();
        let mut builder = populated_builder(&fx);

        builder.sign_with(&fx.owner_keypair).unwrap();
        builder.sign_with(&fx.owner_keypair).unwrap();
        assert_eq!(builder.signatures().len(), 2);

        // Two signatures from one key still cover only one required signer.
        assert!(matches!(
            builder.to_signed_transaction(),
            Err(TransactionError::MissingAuthorization { missing: 1, required: 2 })
        ));
    }

    #[test]
    fn unchecked_commit_skips_coverage_but_not_emptiness() {
        let fx = fixture();
        let mut builder = populated_builder(&fx);

        assert!(matches!(
            builder.to_signed_transaction_unchecked(),
            Err(TransactionError::EmptySignatures)
        ));

        builder.sign_with(&fx.owner_keypair).unwrap();
        let signed = builder.to_signed_transaction_unchecked().unwrap();
        assert_eq!(signed.sigs().len(), 1);
    }

    #[test]
    fn notary_not_required_for_issue_only_transaction() {
        let fx = fixture();
        let mut builder: TransactionBuilder<TestState, TestCommand> =
            TransactionBuilder::with_notary(fx.notary.clone());
        builder
            .add_output(test_state(100, fx.owner.clone(), &fx.notary))
            .unwrap();
        builder
            .add_command(Command::new(
                TestCommand::Issue { value: 100 },
                vec![fx.owner.clone()],
            ))
            .unwrap();

        // No inputs and no time window: the owner alone suffices.
        builder.sign_with(&fx.owner_keypair).unwrap();
        assert!(builder.to_signed_transaction().is_ok());
    }
}
