//! # Composite Keys
//!
//! A composite key is a tree: leaves are ordinary Ed25519 public keys,
//! internal nodes demand that at least `threshold` of their children be
//! satisfied. A plain 2-of-3 multisig is one node with three leaves; deeper
//! trees express arbitrary nested policies ("the CFO, or any two directors").
//!
//! Satisfaction is a pure recursion over the tree against the set of leaf
//! keys that have produced valid signatures. The same leaf may appear under
//! several nodes, and one signature by it counts toward all of them — the
//! requirement is about *which keys signed*, not how many signature bytes
//! were presented.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

use super::keys::VelaPublicKey;

/// Errors constructing a composite key.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompositeKeyError {
    /// A threshold node with no children can never be satisfied.
    #[error("a threshold node requires at least one child")]
    EmptyNode,

    /// The threshold must be between 1 and the number of children.
    #[error("invalid threshold {threshold} for a node with {children} children")]
    InvalidThreshold { threshold: usize, children: usize },
}

/// A public key tree: a single key, or an M-of-N combination of subtrees.
///
/// Every required signer of a transaction is one of these. A leaf is
/// satisfied by a valid signature from exactly that key; a node is satisfied
/// when enough of its children are.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompositeKey {
    /// A single cryptographic public key.
    Leaf(VelaPublicKey),
    /// An M-of-N combination: satisfied when at least `threshold` of
    /// `children` are satisfied.
    Node {
        threshold: usize,
        children: Vec<CompositeKey>,
    },
}

impl CompositeKey {
    /// Wraps a single public key as a leaf.
    pub fn single(key: VelaPublicKey) -> Self {
        Self::Leaf(key)
    }

    /// Builds a validated M-of-N node.
    ///
    /// Fails if `children` is empty or `threshold` is outside
    /// `1..=children.len()`. A 0-of-N node would be vacuously satisfied and
    /// an (N+1)-of-N node never satisfiable; both are construction bugs, not
    /// runtime conditions.
    pub fn threshold(
        threshold: usize,
        children: Vec<CompositeKey>,
    ) -> Result<Self, CompositeKeyError> {
        if children.is_empty() {
            return Err(CompositeKeyError::EmptyNode);
        }
        if threshold == 0 || threshold > children.len() {
            return Err(CompositeKeyError::InvalidThreshold {
                threshold,
                children: children.len(),
            });
        }
        Ok(Self::Node {
            threshold,
            children,
        })
    }

    /// N-of-N: every child must be satisfied.
    pub fn all_of(children: Vec<CompositeKey>) -> Result<Self, CompositeKeyError> {
        let n = children.len();
        Self::threshold(n, children)
    }

    /// 1-of-N: any single child suffices.
    pub fn any_of(children: Vec<CompositeKey>) -> Result<Self, CompositeKeyError> {
        Self::threshold(1, children)
    }

    /// Whether this key's policy is met by the given set of signed leaf keys.
    ///
    /// A leaf is satisfied iff its exact key is in `signed`; a node iff at
    /// least `threshold` children are recursively satisfied. Duplicates in
    /// the presented signatures cannot inflate the count — `signed` is a set
    /// of distinct keys by construction.
    pub fn is_satisfied_by(&self, signed: &HashSet<VelaPublicKey>) -> bool {
        match self {
            Self::Leaf(key) => signed.contains(key),
            Self::Node {
                threshold,
                children,
            } => {
                children
                    .iter()
                    .filter(|child| child.is_satisfied_by(signed))
                    .count()
                    >= *threshold
            }
        }
    }

    /// All leaf keys of this tree, in depth-first order. Duplicates are kept:
    /// a key appearing under two nodes is listed twice.
    pub fn leaves(&self) -> Vec<&VelaPublicKey> {
        match self {
            Self::Leaf(key) => vec![key],
            Self::Node { children, .. } => {
                children.iter().flat_map(|child| child.leaves()).collect()
            }
        }
    }

    /// Whether the given key appears as a leaf anywhere in this tree.
    pub fn contains(&self, key: &VelaPublicKey) -> bool {
        match self {
            Self::Leaf(leaf) => leaf == key,
            Self::Node { children, .. } => children.iter().any(|child| child.contains(key)),
        }
    }
}

impl From<VelaPublicKey> for CompositeKey {
    fn from(key: VelaPublicKey) -> Self {
        Self::Leaf(key)
    }
}

impl fmt::Display for CompositeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf(key) => write!(f, "{}", &key.to_hex()[..16]),
            Self::Node {
                threshold,
                children,
            } => {
                write!(f, "{}-of-{}(", threshold, children.len())?;
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", child)?;
                }
                write!(f, ")")
            }
        }
    }
}
