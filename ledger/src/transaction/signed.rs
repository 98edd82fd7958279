//! # Signed Transactions
//!
//! A [`SignedTransaction`] pairs one wire transaction with the signatures
//! collected over its identity. Construction rejects an empty signature
//! list outright; everything else is checked by
//! [`verify_signatures`](SignedTransaction::verify_signatures), which any
//! holder can re-run at any time — it is a pure function of the immutable
//! transaction.
//!
//! The verification order is fixed, because each step consumes what the
//! previous one established:
//!
//! 1. every collected signature must verify against the stored identity
//!    bytes — one bad signature (or one flipped identity bit) fails the
//!    whole check;
//! 2. the identity is recomputed from the canonical content and compared to
//!    the stored value — signatures must be bound to *this* content, not to
//!    whatever identity a tampered transaction claims;
//! 3. the required-signer set is recomputed and must be covered by the
//!    distinct keys that signed, with composite keys resolved recursively.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

use crate::config;
use crate::contract::{CommandData, ContractState};
use crate::crypto::{CompositeKey, SecureHash, VelaKeypair, VelaPublicKey, VelaSignature};

use super::wire::WireTransaction;
use super::TransactionError;

// ---------------------------------------------------------------------------
// Signatures
// ---------------------------------------------------------------------------

/// Context recorded alongside each signature: which protocol generation
/// produced it and under which scheme. Verification logic keys off the
/// scheme id when more than one scheme exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureMetadata {
    /// Protocol generation at signing time.
    pub protocol_version: u16,
    /// Signature scheme identifier (see [`config::SCHEME_ED25519`]).
    pub scheme_id: u8,
}

impl SignatureMetadata {
    /// Metadata for a signature produced by this build of the core.
    pub fn current() -> Self {
        Self {
            protocol_version: config::PROTOCOL_VERSION,
            scheme_id: config::SCHEME_ED25519,
        }
    }
}

impl Default for SignatureMetadata {
    fn default() -> Self {
        Self::current()
    }
}

/// One party's signature over a transaction identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionSignature {
    /// The key that claims to have signed.
    pub by: VelaPublicKey,
    /// The signature bytes over the identity hash.
    pub signature: VelaSignature,
    /// Signing context.
    pub metadata: SignatureMetadata,
}

impl TransactionSignature {
    /// Signs the given transaction identity.
    pub fn sign(keypair: &VelaKeypair, id: &SecureHash) -> Self {
        Self {
            by: keypair.public_key(),
            signature: keypair.sign(id.as_bytes()),
            metadata: SignatureMetadata::current(),
        }
    }

    /// Whether this signature verifies against the given identity.
    pub fn verify(&self, id: &SecureHash) -> bool {
        self.by.verify(id.as_bytes(), &self.signature)
    }
}

// ---------------------------------------------------------------------------
// SignedTransaction
// ---------------------------------------------------------------------------

/// An immutable wire transaction plus its collected signatures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignedTransaction<S, C> {
    tx: WireTransaction<S, C>,
    sigs: Vec<TransactionSignature>,
    id: SecureHash,
}

impl<S: ContractState, C: CommandData> SignedTransaction<S, C> {
    /// Pairs a wire transaction with its signatures.
    ///
    /// An empty signature list is rejected here, unconditionally — a
    /// "signed" transaction nobody signed is malformed, independent of
    /// whether its required-signer set happens to be empty.
    pub fn new(
        tx: WireTransaction<S, C>,
        sigs: Vec<TransactionSignature>,
    ) -> Result<Self, TransactionError> {
        if sigs.is_empty() {
            return Err(TransactionError::EmptySignatures);
        }
        let id = *tx.id();
        Ok(Self { tx, sigs, id })
    }

    /// The identity the signatures are bound to.
    pub fn id(&self) -> &SecureHash {
        &self.id
    }

    /// The underlying wire transaction.
    pub fn tx(&self) -> &WireTransaction<S, C> {
        &self.tx
    }

    /// The collected signatures, in collection order.
    pub fn sigs(&self) -> &[TransactionSignature] {
        &self.sigs
    }

    /// Rebuilds this signed transaction with a different signature list.
    ///
    /// The wire content and identity are unchanged, so signatures collected
    /// for any other transaction will fail
    /// [`verify_signatures`](Self::verify_signatures) — they are bound to
    /// that transaction's identity, not this one's.
    pub fn with_signatures(
        self,
        sigs: Vec<TransactionSignature>,
    ) -> Result<Self, TransactionError> {
        Self::new(self.tx, sigs)
    }

    /// Checks authenticity and authorization of this transaction.
    ///
    /// Verifies every collected signature against the identity, confirms
    /// the identity matches the canonical content, and confirms the
    /// required-signer set (command signers, plus the notary when inputs or
    /// a time window are present) is covered by the distinct signing keys.
    /// Any failure aborts the whole check; there is no partial success.
    pub fn verify_signatures(&self) -> Result<(), TransactionError> {
        // 1. Authenticity: every signature must verify against the identity
        //    bytes. A corrupted identity makes every binding fail here.
        for sig in &self.sigs {
            if !sig.verify(&self.id) {
                return Err(TransactionError::InvalidSignature {
                    key: sig.by.to_hex(),
                    id: self.id,
                });
            }
        }

        // 2. Binding: the identity the signatures cover must be the hash of
        //    this content. Catches content swapped under a stale identity.
        let computed = self.tx.compute_id()?;
        if computed != self.id {
            return Err(TransactionError::IdentityMismatch {
                computed,
                claimed: self.id,
            });
        }

        // 3. Authorization: distinct signing keys must cover every required
        //    signer. Duplicates collapse in the set and cannot double-count.
        let signed: HashSet<VelaPublicKey> =
            self.sigs.iter().map(|sig| sig.by.clone()).collect();
        verify_required_signers(&self.tx.required_signers(), &signed)?;

        debug!(tx = %self.id, sigs = self.sigs.len(), "signature verification passed");
        Ok(())
    }
}

/// Checks that every required (possibly composite) signer is satisfied by
/// the given set of signing keys.
///
/// Shared by [`SignedTransaction::verify_signatures`] and the builder's
/// commit path so the two can never disagree about what "covered" means.
pub fn verify_required_signers(
    required: &[CompositeKey],
    signed: &HashSet<VelaPublicKey>,
) -> Result<(), TransactionError> {
    let missing = required
        .iter()
        .filter(|key| !key.is_satisfied_by(signed))
        .count();
    if missing > 0 {
        return Err(TransactionError::MissingAuthorization {
            missing,
            required: required.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::CompositeKey;
    use crate::identity::Party;
    use crate::state::StateAndRef;
    use crate::testutil::{fake_state_ref, notary_with, test_state, TestCommand, TestState};
    use crate::transaction::builder::TransactionBuilder;
    use crate::transaction::wire::Command;

    struct Fixture {
        notary_keypair: VelaKeypair,
        notary: Party,
        owner_keypair: VelaKeypair,
        owner: CompositeKey,
    }

    fn fixture() -> Fixture {
        let notary_keypair = VelaKeypair::generate();
        let notary = notary_with(&notary_keypair);
        let owner_keypair = VelaKeypair::generate();
        let owner = CompositeKey::single(owner_keypair.public_key());
        Fixture {
            notary_keypair,
            notary,
            owner_keypair,
            owner,
        }
    }

    /// Builds and fully signs the standard one-input, two-output transaction.
    fn signed_tx(fx: &Fixture) -> SignedTransaction<TestState, TestCommand> {
        let input = StateAndRef::new(
            test_state(1_000, fx.owner.clone(), &fx.notary),
            fake_state_ref(),
        );
        let mut builder = TransactionBuilder::with_notary(fx.notary.clone())
            .with_items(vec![
                input.into(),
                test_state(600, fx.owner.clone(), &fx.notary).into(),
                test_state(400, fx.owner.clone(), &fx.notary).into(),
                Command::new(TestCommand::Move, vec![fx.owner.clone()]).into(),
            ])
            .unwrap();
        builder.sign_with(&fx.owner_keypair).unwrap();
        builder.sign_with(&fx.notary_keypair).unwrap();
        builder.to_signed_transaction().unwrap()
    }

    #[test]
    fn round_trip_verifies() {
        let fx = fixture();
        signed_tx(&fx).verify_signatures().unwrap();
    }

    #[test]
    fn empty_signature_list_is_unconstructable() {
        let fx = fixture();
        let stx = signed_tx(&fx);
        match stx.with_signatures(vec![]) {
            Err(TransactionError::EmptySignatures) => {}
            other => panic!("expected EmptySignatures, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn flipping_one_identity_bit_fails_as_invalid_signature() {
        let fx = fixture();
        let mut stx = signed_tx(&fx);

        // Corrupt a single bit of the identity the signatures are bound to.
        let mut bytes = *stx.id.as_bytes();
        bytes[5] ^= 0x01;
        stx.id = SecureHash::from_bytes(bytes);

        match stx.verify_signatures() {
            Err(TransactionError::InvalidSignature { .. }) => {}
            other => panic!("expected InvalidSignature, got {:?}", other),
        }
    }

    #[test]
    fn every_identity_bit_matters_in_the_first_byte() {
        // Spot-check all eight bit positions of one byte rather than all 256
        // bits; the binding makes no distinction between positions.
        let fx = fixture();
        let stx = signed_tx(&fx);

        for bit in 0..8 {
            let mut corrupted = stx.clone();
            let mut bytes = *corrupted.id.as_bytes();
            bytes[0] ^= 1 << bit;
            corrupted.id = SecureHash::from_bytes(bytes);
            assert!(
                matches!(
                    corrupted.verify_signatures(),
                    Err(TransactionError::InvalidSignature { .. })
                ),
                "bit {} flip must fail verification",
                bit
            );
        }
    }

    #[test]
    fn substituted_signature_list_fails() {
        let fx = fixture();
        let stx = signed_tx(&fx);

        // An unrelated-but-valid transaction with a different required
        // signer, fully signed by its own parties.
        let other_owner_keypair = VelaKeypair::generate();
        let other_owner = CompositeKey::single(other_owner_keypair.public_key());
        let input = StateAndRef::new(
            test_state(1_000, other_owner.clone(), &fx.notary),
            fake_state_ref(),
        );
        let mut other_builder = TransactionBuilder::with_notary(fx.notary.clone())
            .with_items(vec![
                input.into(),
                test_state(1_000, other_owner.clone(), &fx.notary).into(),
                Command::new(TestCommand::Move, vec![other_owner]).into(),
            ])
            .unwrap();
        other_builder.sign_with(&other_owner_keypair).unwrap();
        other_builder.sign_with(&fx.notary_keypair).unwrap();
        let other = other_builder.to_signed_transaction().unwrap();
        other.verify_signatures().unwrap();

        // Those signatures are bound to the other transaction's identity.
        let spliced = stx.with_signatures(other.sigs().to_vec()).unwrap();
        match spliced.verify_signatures() {
            Err(TransactionError::InvalidSignature { .. }) => {}
            other => panic!("expected InvalidSignature, got {:?}", other),
        }
    }

    #[test]
    fn tampered_content_fails_as_identity_mismatch() {
        let fx = fixture();
        let mut stx = signed_tx(&fx);

        // Swap the wire content for different content while keeping the
        // original identity and signatures. The signatures still verify
        // against the stored identity, but the content no longer hashes to it.
        let replacement = {
            let mut builder: TransactionBuilder<TestState, TestCommand> =
                TransactionBuilder::with_notary(fx.notary.clone());
            builder
                .add_output(test_state(1, fx.owner.clone(), &fx.notary))
                .unwrap();
            builder.to_wire_transaction().unwrap()
        };
        stx.tx = replacement;

        match stx.verify_signatures() {
            Err(TransactionError::IdentityMismatch { .. }) => {}
            other => panic!("expected IdentityMismatch, got {:?}", other),
        }
    }

    #[test]
    fn stray_extra_signature_fails_verification() {
        // A signature by a key nobody asked for, over the wrong bytes,
        // poisons the whole set: verification is all-or-nothing.
        let fx = fixture();
        let stx = signed_tx(&fx);

        let stranger = VelaKeypair::generate();
        let mut sigs = stx.sigs().to_vec();
        sigs.push(TransactionSignature {
            by: stranger.public_key(),
            signature: stranger.sign(b"something else entirely"),
            metadata: SignatureMetadata::current(),
        });

        let stx = stx.with_signatures(sigs).unwrap();
        assert!(matches!(
            stx.verify_signatures(),
            Err(TransactionError::InvalidSignature { .. })
        ));
    }

    #[test]
    fn duplicate_signatures_verify_without_double_counting() {
        let fx = fixture();
        let stx = signed_tx(&fx);

        // Duplicating the owner's signature keeps the set verifiable.
        let mut sigs = stx.sigs().to_vec();
        sigs.push(sigs[0].clone());
        let stx_dup = stx.clone().with_signatures(sigs).unwrap();
        stx_dup.verify_signatures().unwrap();

        // But two copies of the owner's signature without the notary's do
        // not cover the notary requirement.
        let owner_sig = stx.sigs()[0].clone();
        let stx_short = stx
            .with_signatures(vec![owner_sig.clone(), owner_sig])
            .unwrap();
        assert!(matches!(
            stx_short.verify_signatures(),
            Err(TransactionError::MissingAuthorization { missing: 1, required: 2 })
        ));
    }

    #[test]
    fn composite_two_of_three_coverage() {
        let fx = fixture();
        let keypairs: Vec<VelaKeypair> = (0..3).map(|_| VelaKeypair::generate()).collect();
        let board = CompositeKey::threshold(
            2,
            keypairs
                .iter()
                .map(|kp| CompositeKey::single(kp.public_key()))
                .collect(),
        )
        .unwrap();

        let build = |signers: &[&VelaKeypair]| {
            let mut builder: TransactionBuilder<TestState, TestCommand> =
                TransactionBuilder::with_notary(fx.notary.clone());
            builder
                .add_output(test_state(100, board.clone(), &fx.notary))
                .unwrap();
            builder
                .add_command(Command::new(
                    TestCommand::Issue { value: 100 },
                    vec![board.clone()],
                ))
                .unwrap();
            for keypair in signers {
                builder.sign_with(keypair).unwrap();
            }
            builder.to_signed_transaction()
        };

        // One of three is not enough.
        assert!(matches!(
            build(&[&keypairs[0]]),
            Err(TransactionError::MissingAuthorization { .. })
        ));

        // Any two of three satisfy the node.
        build(&[&keypairs[0], &keypairs[1]])
            .unwrap()
            .verify_signatures()
            .unwrap();
        build(&[&keypairs[1], &keypairs[2]])
            .unwrap()
            .verify_signatures()
            .unwrap();
    }

    #[test]
    fn metadata_records_scheme_and_version() {
        let fx = fixture();
        let stx = signed_tx(&fx);
        for sig in stx.sigs() {
            assert_eq!(sig.metadata.protocol_version, config::PROTOCOL_VERSION);
            assert_eq!(sig.metadata.scheme_id, config::SCHEME_ED25519);
        }
    }

    #[test]
    fn verification_is_repeatable() {
        // Pure function of immutable data: run it as often as you like.
        let fx = fixture();
        let stx = signed_tx(&fx);
        for _ in 0..3 {
            stx.verify_signatures().unwrap();
        }
    }
}
