//! # Canonical Wire Transactions
//!
//! A [`WireTransaction`] is the immutable, deterministically-encoded form of
//! a transaction. Its identity is the domain-separated BLAKE3 hash of its
//! canonical bytes — which makes the encoding consensus-critical: any
//! instability (serializer field reordering, map iteration, locale-dependent
//! formatting) would give two honest parties two different identities for
//! the same logical transaction, and their signatures would never agree.
//!
//! The encoding is therefore framed by hand: a leading format marker,
//! fixed-width little-endian integers, explicit presence flags for optional
//! fields, and length-prefixed `bincode` sections for the structured
//! payloads (states, commands, parties). Every attribute is covered; change
//! one bit of content and the identity changes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::trace;

use crate::config;
use crate::contract::{CommandData, ContractState, ResolvedTransaction};
use crate::crypto::{domain_hash, CompositeKey, SecureHash};
use crate::identity::Party;
use crate::state::{StateAndRef, StateRef, TransactionState};

use super::TransactionError;

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

/// A command: what the transaction does, and who must sign off on it.
///
/// The payload `C` is a contract family's closed command enum. The signers
/// are composite keys; each joins the transaction's required-signer set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command<C> {
    /// The command payload.
    pub data: C,
    /// Keys that must sign the transaction for this command to be
    /// authorized, in the order given.
    pub signers: Vec<CompositeKey>,
}

impl<C> Command<C> {
    /// Creates a command with the given required signers.
    pub fn new(data: C, signers: Vec<CompositeKey>) -> Self {
        Self { data, signers }
    }

    /// Creates a command with a single required signer.
    pub fn with_signer(data: C, signer: impl Into<CompositeKey>) -> Self {
        Self {
            data,
            signers: vec![signer.into()],
        }
    }
}

// ---------------------------------------------------------------------------
// TimeWindow
// ---------------------------------------------------------------------------

/// The span of notary clock time in which a transaction may be committed.
///
/// Expressed as a midpoint instant plus a symmetric tolerance. The core
/// records the window and folds it into the identity; *interpreting* it is
/// the notary's job, which is why the notary's signature becomes required
/// the moment a window is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Center of the acceptable commit-time range.
    pub midpoint: DateTime<Utc>,
    /// Maximum distance from the midpoint, on either side.
    pub tolerance: Duration,
}

impl TimeWindow {
    /// Creates a window centered on `midpoint`, extending `tolerance` to
    /// each side.
    pub fn new(midpoint: DateTime<Utc>, tolerance: Duration) -> Self {
        Self {
            midpoint,
            tolerance,
        }
    }

    /// Whether the given instant falls within the window. A helper for
    /// notary-side checks; the core itself never gates on wall-clock time.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        let distance = at.signed_duration_since(self.midpoint);
        distance.num_milliseconds().unsigned_abs() as u128 <= self.tolerance.as_millis()
    }
}

// ---------------------------------------------------------------------------
// WireTransaction
// ---------------------------------------------------------------------------

/// The canonical, immutable form of a transaction. Its content hash is its
/// identity; two wire transactions with equal identity are bit-for-bit equal
/// in canonical form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireTransaction<S, C> {
    version: u16,
    inputs: Vec<StateRef>,
    outputs: Vec<TransactionState<S>>,
    commands: Vec<Command<C>>,
    notary: Option<Party>,
    time_window: Option<TimeWindow>,
    id: SecureHash,
}

impl<S: ContractState, C: CommandData> WireTransaction<S, C> {
    /// Assembles a wire transaction and computes its identity.
    ///
    /// Ordering within each sequence is preserved exactly as given and is
    /// part of the identity.
    pub fn new(
        inputs: Vec<StateRef>,
        outputs: Vec<TransactionState<S>>,
        commands: Vec<Command<C>>,
        notary: Option<Party>,
        time_window: Option<TimeWindow>,
    ) -> Result<Self, TransactionError> {
        let mut tx = Self {
            version: config::WIRE_FORMAT_VERSION,
            inputs,
            outputs,
            commands,
            notary,
            time_window,
            id: SecureHash::zero(),
        };
        tx.id = tx.compute_id()?;
        trace!(id = %tx.id, "wire transaction assembled");
        Ok(tx)
    }

    /// The identity computed when this transaction was assembled.
    pub fn id(&self) -> &SecureHash {
        &self.id
    }

    /// The wire-format version marker folded into the canonical encoding.
    pub fn version(&self) -> u16 {
        self.version
    }

    /// Input references, in canonical order.
    pub fn inputs(&self) -> &[StateRef] {
        &self.inputs
    }

    /// Output states, in canonical order.
    pub fn outputs(&self) -> &[TransactionState<S>] {
        &self.outputs
    }

    /// Commands, in canonical order.
    pub fn commands(&self) -> &[Command<C>] {
        &self.commands
    }

    /// The notary, if one is named.
    pub fn notary(&self) -> Option<&Party> {
        self.notary.as_ref()
    }

    /// The time window, if one is set.
    pub fn time_window(&self) -> Option<&TimeWindow> {
        self.time_window.as_ref()
    }

    /// Recomputes the identity from the canonical content.
    ///
    /// For a transaction assembled by [`new`](Self::new) this equals
    /// [`id`](Self::id); verification recomputes it anyway, so a transaction
    /// whose stored identity was corrupted or forged in transit cannot pass.
    pub fn compute_id(&self) -> Result<SecureHash, TransactionError> {
        Ok(domain_hash(config::WIRE_TX_DOMAIN, &self.canonical_bytes()?))
    }

    /// The deterministic canonical encoding.
    ///
    /// Layout, in order: format version (`u16` LE); input count (`u32` LE)
    /// then each input as 32 hash bytes + `u32` LE index; output count then
    /// each output as a length-prefixed `bincode` section; command count
    /// then each command likewise; notary presence flag (+ section);
    /// time-window presence flag (+ `i64` LE midpoint millis and `u64` LE
    /// tolerance millis).
    pub fn canonical_bytes(&self) -> Result<Vec<u8>, TransactionError> {
        let mut buf = Vec::with_capacity(512);

        buf.extend_from_slice(&self.version.to_le_bytes());

        buf.extend_from_slice(&(self.inputs.len() as u32).to_le_bytes());
        for input in &self.inputs {
            buf.extend_from_slice(input.txhash.as_bytes());
            buf.extend_from_slice(&input.index.to_le_bytes());
        }

        buf.extend_from_slice(&(self.outputs.len() as u32).to_le_bytes());
        for output in &self.outputs {
            push_section(&mut buf, &bincode::serialize(output)?);
        }

        buf.extend_from_slice(&(self.commands.len() as u32).to_le_bytes());
        for command in &self.commands {
            push_section(&mut buf, &bincode::serialize(command)?);
        }

        match &self.notary {
            Some(notary) => {
                buf.push(0x01);
                push_section(&mut buf, &bincode::serialize(notary)?);
            }
            None => buf.push(0x00),
        }

        match &self.time_window {
            Some(window) => {
                buf.push(0x01);
                buf.extend_from_slice(&window.midpoint.timestamp_millis().to_le_bytes());
                buf.extend_from_slice(&(window.tolerance.as_millis() as u64).to_le_bytes());
            }
            None => buf.push(0x00),
        }

        Ok(buf)
    }

    /// The set of keys whose signatures this transaction requires: the
    /// union of all command signers, plus the notary's key iff the
    /// transaction consumes inputs or carries a time window.
    ///
    /// Deduplicated, in first-appearance order — never a hash-order
    /// iteration, since callers fold this into deterministic checks.
    pub fn required_signers(&self) -> Vec<CompositeKey> {
        let mut required: Vec<CompositeKey> = Vec::new();
        for command in &self.commands {
            for key in &command.signers {
                if !required.contains(key) {
                    required.push(key.clone());
                }
            }
        }
        // The notary must sign whenever it is being asked to do something:
        // arbitrate input consumption, or attest a time window.
        if let Some(notary) = &self.notary {
            if (!self.inputs.is_empty() || self.time_window.is_some())
                && !required.contains(&notary.owning_key)
            {
                required.push(notary.owning_key.clone());
            }
        }
        required
    }

    /// Pairs this transaction's input references with their concrete prior
    /// states, producing the view handed to contract verifiers.
    ///
    /// The supplied states must match the input references one-to-one, in
    /// order.
    pub fn resolve(
        &self,
        input_states: Vec<StateAndRef<S>>,
    ) -> Result<ResolvedTransaction<S, C>, TransactionError> {
        if input_states.len() != self.inputs.len() {
            return Err(TransactionError::InputCountMismatch {
                expected: self.inputs.len(),
                actual: input_states.len(),
            });
        }
        for (position, (supplied, reference)) in
            input_states.iter().zip(self.inputs.iter()).enumerate()
        {
            if supplied.reference != *reference {
                return Err(TransactionError::InputMismatch { position });
            }
        }
        Ok(ResolvedTransaction {
            inputs: input_states,
            outputs: self.outputs.clone(),
            commands: self.commands.clone(),
            notary: self.notary.clone(),
            time_window: self.time_window,
            id: self.id,
        })
    }
}

fn push_section(buf: &mut Vec<u8>, bytes: &[u8]) {
    buf.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
    buf.extend_from_slice(bytes);
}
