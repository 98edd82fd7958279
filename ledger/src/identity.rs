//! # Parties
//!
//! A party is a named identity bound to an owning key. Notaries, asset
//! owners, and command signers are all parties; the commitment core only
//! ever consults the owning key (for authorization completeness), while the
//! name exists for humans reading logs and test failures.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::crypto::CompositeKey;

/// A named identity bound to a (possibly composite) owning key.
///
/// The notary of a transaction is a `Party`; so is any issuer or owner a
/// contract family wants to name. Two parties are equal iff both name and
/// key are equal — the core never treats the name as an identifier on its
/// own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    /// Human-readable display name.
    pub name: String,
    /// The key that must sign on this party's behalf.
    pub owning_key: CompositeKey,
}

impl Party {
    /// Creates a party from a name and owning key.
    pub fn new(name: impl Into<String>, owning_key: impl Into<CompositeKey>) -> Self {
        Self {
            name: name.into(),
            owning_key: owning_key.into(),
        }
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
