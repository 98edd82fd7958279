//! # Asset Contract
//!
//! A fungible-asset family for the commitment core: states carry an amount
//! of some currency, an issuer reference, and an owning key. Three commands
//! cover the lifecycle:
//!
//! - **Move** — change ownership. Marker-only: everything the verifier needs
//!   is in the states; the command's job is to say "this is a move" and name
//!   the signers.
//! - **Issue** — bring new value onto the ledger. No inputs allowed; every
//!   issuer named in the outputs must sign.
//! - **Exit** — retire value from the ledger, carrying the exited amount as
//!   command data.
//!
//! ## Verification Model
//!
//! The verifier is pure arithmetic over the resolved view: per-currency
//! sums of inputs and outputs must relate as the command dictates, and the
//! parties whose value is being spent must be among the command's signers.
//! Violations surface as [`ContractError::Rejected`] with an
//! [`AssetViolation`] as the reason — a business-rule "no", deliberately a
//! different category from signature or authorization failures.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

use vela_ledger::{
    CommandData, ContractError, ContractId, ContractState, Party, ResolvedTransaction,
    VerifierRegistry,
};
use vela_ledger::crypto::CompositeKey;

/// Canonical name of this contract family; its SHA-256 is the contract id.
pub const ASSET_CONTRACT: &str = "vela.contracts.asset";

/// The asset family's contract identifier.
pub fn asset_contract_id() -> ContractId {
    ContractId::from_name(ASSET_CONTRACT)
}

// ---------------------------------------------------------------------------
// Violations
// ---------------------------------------------------------------------------

/// The ways an asset transaction can be malformed, from the contract's
/// point of view. Rendered into the rejection reason.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AssetViolation {
    /// The transaction references this contract but carries none or several
    /// of its commands.
    #[error("expected exactly one asset command, found {0}")]
    CommandCount(usize),

    /// A Move or Exit with nothing to spend.
    #[error("command requires at least one asset input")]
    NoInputs,

    /// A Move with nothing produced, or an Issue with nothing issued.
    #[error("command requires at least one asset output")]
    NoOutputs,

    /// An Issue must not consume existing states.
    #[error("issuance must not consume inputs")]
    IssueWithInputs,

    /// Value appeared or vanished where the command forbids it.
    #[error("conservation violated for {currency}: inputs total {inputs}, outputs total {outputs}")]
    Conservation {
        currency: Currency,
        inputs: u128,
        outputs: u128,
    },

    /// The exited amount does not match the input/output difference.
    #[error("exit of {expected} {currency} does not match the consumed difference")]
    ExitMismatch {
        currency: Currency,
        expected: u64,
    },

    /// A spent state's owner is not among the command signers.
    #[error("owner of a consumed state is not a command signer")]
    OwnerNotSigner,

    /// An issuing party is not among the command signers.
    #[error("issuer of a produced state is not a command signer")]
    IssuerNotSigner,
}

// ---------------------------------------------------------------------------
// Value types
// ---------------------------------------------------------------------------

/// Currency denominations the asset contract understands natively, plus an
/// escape hatch for arbitrary tickers.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Currency {
    /// Pound sterling (smallest unit: penny, 10^-2).
    GBP,
    /// United States Dollar (smallest unit: cent, 10^-2).
    USD,
    /// Euro (smallest unit: cent, 10^-2).
    EUR,
    /// Arbitrary ticker for non-standard assets.
    Custom(String),
}

impl Currency {
    /// Decimal places for display formatting. The contract itself always
    /// works in integer smallest units.
    pub fn decimals(&self) -> u8 {
        match self {
            Self::GBP | Self::USD | Self::EUR => 2,
            Self::Custom(_) => 8,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GBP => write!(f, "GBP"),
            Self::USD => write!(f, "USD"),
            Self::EUR => write!(f, "EUR"),
            Self::Custom(ticker) => write!(f, "{}", ticker),
        }
    }
}

/// An amount in the smallest indivisible unit of a currency. Always an
/// integer — no floating point anywhere near value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amount {
    /// Value in smallest units.
    pub value: u64,
    /// Denomination.
    pub currency: Currency,
}

impl Amount {
    /// Creates an amount.
    pub fn new(value: u64, currency: Currency) -> Self {
        Self { value, currency }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.currency)
    }
}

/// Who stands behind a state's value: an issuing party plus a small opaque
/// reference distinguishing issuance batches of the same party.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issuer {
    /// The issuing party.
    pub party: Party,
    /// Issuer-chosen batch reference.
    pub reference: u8,
}

impl Issuer {
    /// Creates an issuer reference.
    pub fn new(party: Party, reference: u8) -> Self {
        Self { party, reference }
    }
}

impl fmt::Display for Issuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.party, self.reference)
    }
}

// ---------------------------------------------------------------------------
// States and commands
// ---------------------------------------------------------------------------

/// A fungible asset state: an amount backed by an issuer, owned by a key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetState {
    /// Who stands behind this value.
    pub issuer: Issuer,
    /// How much, in which currency.
    pub amount: Amount,
    /// The key that must sign to spend this state.
    pub owner: CompositeKey,
}

impl ContractState for AssetState {
    fn contract(&self) -> ContractId {
        asset_contract_id()
    }

    fn participants(&self) -> Vec<CompositeKey> {
        vec![self.owner.clone()]
    }
}

/// The asset family's command set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AssetCommand {
    /// Change ownership. Marker-only: the states say everything else.
    Move,
    /// Bring new value onto the ledger.
    Issue,
    /// Retire the given amount from the ledger.
    Exit {
        /// The amount leaving the ledger.
        amount: Amount,
    },
}

impl CommandData for AssetCommand {
    fn contract(&self) -> ContractId {
        asset_contract_id()
    }
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

/// Registers the asset verifier under this family's contract id.
pub fn register_asset_contract(registry: &mut VerifierRegistry<AssetState, AssetCommand>) {
    registry.register(asset_contract_id(), verify_asset);
}

/// The asset family's verification capability.
///
/// Checks, per the single asset command present:
///
/// - **Move**: at least one input and one output; per-currency totals
///   conserved exactly; every consumed state's owner among the signers.
/// - **Issue**: no inputs, at least one output; every output's issuing
///   party among the signers.
/// - **Exit**: at least one input; the exited currency's totals differ by
///   exactly the exited amount, all other currencies conserved; every
///   consumed state's owner among the signers.
pub fn verify_asset(
    tx: &ResolvedTransaction<AssetState, AssetCommand>,
) -> Result<(), ContractError> {
    check_asset(tx).map_err(|violation| {
        ContractError::rejected(asset_contract_id(), violation.to_string())
    })
}

fn check_asset(tx: &ResolvedTransaction<AssetState, AssetCommand>) -> Result<(), AssetViolation> {
    let commands = tx.commands_for(asset_contract_id());
    if commands.len() != 1 {
        return Err(AssetViolation::CommandCount(commands.len()));
    }
    let command = commands[0];

    let inputs: Vec<&AssetState> = tx.inputs.iter().map(|input| &input.state.data).collect();
    let outputs: Vec<&AssetState> = tx.outputs.iter().map(|output| &output.data).collect();
    let input_sums = sums(&inputs);
    let output_sums = sums(&outputs);

    match &command.data {
        AssetCommand::Move => {
            if inputs.is_empty() {
                return Err(AssetViolation::NoInputs);
            }
            if outputs.is_empty() {
                return Err(AssetViolation::NoOutputs);
            }
            require_conserved(&input_sums, &output_sums)?;
            require_owners_sign(&inputs, &command.signers)
        }
        AssetCommand::Issue => {
            if !inputs.is_empty() {
                return Err(AssetViolation::IssueWithInputs);
            }
            if outputs.is_empty() {
                return Err(AssetViolation::NoOutputs);
            }
            require_issuers_sign(&outputs, &command.signers)
        }
        AssetCommand::Exit { amount } => {
            if inputs.is_empty() {
                return Err(AssetViolation::NoInputs);
            }
            require_exit_balance(&input_sums, &output_sums, amount)?;
            require_owners_sign(&inputs, &command.signers)
        }
    }
}

/// Per-currency totals. `u128` accumulation: `u64` values cannot overflow it.
fn sums(states: &[&AssetState]) -> BTreeMap<Currency, u128> {
    let mut totals: BTreeMap<Currency, u128> = BTreeMap::new();
    for state in states {
        *totals.entry(state.amount.currency.clone()).or_default() += state.amount.value as u128;
    }
    totals
}

fn require_conserved(
    inputs: &BTreeMap<Currency, u128>,
    outputs: &BTreeMap<Currency, u128>,
) -> Result<(), AssetViolation> {
    let currencies = inputs.keys().chain(outputs.keys());
    for currency in currencies {
        let consumed = inputs.get(currency).copied().unwrap_or(0);
        let produced = outputs.get(currency).copied().unwrap_or(0);
        if consumed != produced {
            return Err(AssetViolation::Conservation {
                currency: currency.clone(),
                inputs: consumed,
                outputs: produced,
            });
        }
    }
    Ok(())
}

fn require_exit_balance(
    inputs: &BTreeMap<Currency, u128>,
    outputs: &BTreeMap<Currency, u128>,
    exited: &Amount,
) -> Result<(), AssetViolation> {
    let currencies = inputs.keys().chain(outputs.keys());
    for currency in currencies {
        let consumed = inputs.get(currency).copied().unwrap_or(0);
        let produced = outputs.get(currency).copied().unwrap_or(0);
        let expected_gap = if *currency == exited.currency {
            exited.value as u128
        } else {
            0
        };
        if consumed != produced + expected_gap {
            return Err(AssetViolation::ExitMismatch {
                currency: exited.currency.clone(),
                expected: exited.value,
            });
        }
    }
    Ok(())
}

fn require_owners_sign(
    inputs: &[&AssetState],
    signers: &[CompositeKey],
) -> Result<(), AssetViolation> {
    for state in inputs {
        if !signers.contains(&state.owner) {
            return Err(AssetViolation::OwnerNotSigner);
        }
    }
    Ok(())
}

fn require_issuers_sign(
    outputs: &[&AssetState],
    signers: &[CompositeKey],
) -> Result<(), AssetViolation> {
    for state in outputs {
        if !signers.contains(&state.issuer.party.owning_key) {
            return Err(AssetViolation::IssuerNotSigner);
        }
    }
    Ok(())
}
