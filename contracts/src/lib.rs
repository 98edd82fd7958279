// Copyright (c) 2026 VELA Contributors. MIT License.
// See LICENSE for details.

//! # VELA Contracts
//!
//! Contract families for the VELA commitment core. Each family is a closed
//! set of states and commands plus a verification capability that the core
//! dispatches to through a [`vela_ledger::VerifierRegistry`].
//!
//! Currently one family ships:
//!
//! - **Asset** — fungible value with issue / move / exit lifecycle and
//!   per-currency conservation checks.
//!
//! ## Design Principles
//!
//! 1. Command sets are closed enums: marker-only variants for semantic
//!    flags, pure-data variants for payloads. No open hierarchies.
//! 2. Verifiers are pure functions of the resolved transaction view; they
//!    hold no state and touch no globals.
//! 3. A contract's "no" is a [`vela_ledger::ContractError`] — never
//!    disguised as a signature or authorization failure.

pub mod asset;

pub use asset::{
    asset_contract_id, register_asset_contract, verify_asset, Amount, AssetCommand, AssetState,
    AssetViolation, Currency, Issuer,
};
