//! Host-facing projection of terms and facts.
//!
//! Handles only mean something inside the store that issued them, so every
//! term that leaves a session is first expanded into a [`JsonTerm`] tree.
//! The JSON shape is:
//!
//! | term              | JSON                                   |
//! |-------------------|----------------------------------------|
//! | trivial           | `null`                                 |
//! | integer           | number, or decimal string past 2^53-1  |
//! | string            | string                                 |
//! | boolean           | boolean                                |
//! | constructed term  | `{"name": .., "args": [..]}`           |
//! | host reference    | `{"name": null, "value": n}`           |
//!
//! `args` is omitted for atoms. The encoding does not distinguish a large
//! integer from a string of digits, so it is output only.

use std::sync::Arc;

use num_bigint::BigInt;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use choicelog_foundation::{TermId, TermStore, TermView};
use choicelog_language::encoding::bigint;
use choicelog_storage::StoredFact;

/// A fully expanded term.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JsonTerm {
    /// The unit term.
    Trivial,
    /// Integer.
    Int(BigInt),
    /// Boolean.
    Bool(bool),
    /// String.
    String(Arc<str>),
    /// Constructor applied to arguments.
    Const {
        /// Constructor name.
        name: Arc<str>,
        /// Arguments, in order.
        args: Vec<JsonTerm>,
    },
    /// Opaque host reference.
    Ref(u64),
}

impl JsonTerm {
    /// Expands `id` recursively.
    #[must_use]
    pub fn from_term(store: &TermStore, id: TermId) -> Self {
        match store.expose(id) {
            TermView::Trivial => Self::Trivial,
            TermView::Int(n) => Self::Int(n.clone()),
            TermView::Bool(b) => Self::Bool(*b),
            TermView::String(s) => Self::String(s.clone()),
            TermView::Const { name, args } => Self::Const {
                name: name.clone(),
                args: args.iter().map(|&arg| Self::from_term(store, arg)).collect(),
            },
            TermView::Ref(index) => Self::Ref(*index),
        }
    }

    /// A zero-argument constructor.
    #[must_use]
    pub fn atom(name: &str) -> Self {
        Self::Const {
            name: name.into(),
            args: Vec::new(),
        }
    }
}

impl From<i64> for JsonTerm {
    fn from(n: i64) -> Self {
        Self::Int(BigInt::from(n))
    }
}

impl From<&str> for JsonTerm {
    fn from(s: &str) -> Self {
        Self::String(s.into())
    }
}

impl From<bool> for JsonTerm {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl Serialize for JsonTerm {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Trivial => serializer.serialize_unit(),
            Self::Int(n) => bigint::serialize(n, serializer),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::String(s) => serializer.serialize_str(s),
            Self::Const { name, args } if args.is_empty() => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("name", name)?;
                map.end()
            }
            Self::Const { name, args } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("name", name)?;
                map.serialize_entry("args", args)?;
                map.end()
            }
            Self::Ref(index) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("name", &())?;
                map.serialize_entry("value", index)?;
                map.end()
            }
        }
    }
}

/// One fact of a solution, `name(args) is value`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Fact {
    /// Predicate name.
    pub name: Arc<str>,
    /// Arguments.
    pub args: Vec<JsonTerm>,
    /// Value.
    pub value: JsonTerm,
}

impl Fact {
    /// Expands a stored fact against the store that interned it.
    #[must_use]
    pub fn from_stored(store: &TermStore, fact: &StoredFact) -> Self {
        Self {
            name: fact.name.clone(),
            args: fact
                .args
                .iter()
                .map(|&arg| JsonTerm::from_term(store, arg))
                .collect(),
            value: JsonTerm::from_term(store, fact.value),
        }
    }
}

/// Expands every fact, preserving order.
#[must_use]
pub fn project(store: &TermStore, facts: &[StoredFact]) -> Vec<Fact> {
    facts.iter().map(|fact| Fact::from_stored(store, fact)).collect()
}
