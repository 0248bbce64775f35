//! Term patterns and the slot-indexed substitution they bind into.
//!
//! [`Pattern`] is the serialized form the compiler emits. Before execution
//! each pattern is compiled against a [`TermStore`] into a
//! [`CompiledPattern`], which folds every ground subterm into a single
//! handle so that matching is a handle comparison.

use std::sync::Arc;

use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

use choicelog_foundation::{Error, Result, TermId, TermStore, TermView};

/// A term pattern as emitted by the compiler.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Pattern {
    /// The unit term.
    #[default]
    Trivial,
    /// An integer literal.
    Int {
        /// The value.
        #[serde(with = "crate::encoding::bigint")]
        value: BigInt,
    },
    /// A boolean literal.
    Bool {
        /// The value.
        value: bool,
    },
    /// A string literal.
    String {
        /// The value.
        value: Arc<str>,
    },
    /// A constructor applied to sub-patterns.
    Const {
        /// Constructor name.
        name: Arc<str>,
        /// Argument patterns.
        #[serde(default)]
        args: Vec<Pattern>,
    },
    /// A reference into host data.
    Ref {
        /// Host index.
        index: u64,
    },
    /// A variable, identified by its substitution slot.
    Var {
        /// Slot index.
        slot: usize,
    },
    /// Matches anything and binds nothing.
    Wildcard,
}

impl Pattern {
    /// Shorthand for an integer literal.
    #[must_use]
    pub fn int(n: impl Into<BigInt>) -> Self {
        Self::Int { value: n.into() }
    }

    /// Shorthand for a string literal.
    #[must_use]
    pub fn string(s: &str) -> Self {
        Self::String { value: s.into() }
    }

    /// Shorthand for a constructor pattern.
    #[must_use]
    pub fn constant(name: &str, args: Vec<Pattern>) -> Self {
        Self::Const {
            name: name.into(),
            args,
        }
    }

    /// Shorthand for a nullary constructor, the usual way to write atoms.
    #[must_use]
    pub fn atom(name: &str) -> Self {
        Self::constant(name, Vec::new())
    }

    /// Shorthand for a variable.
    #[must_use]
    pub const fn var(slot: usize) -> Self {
        Self::Var { slot }
    }

    /// Returns true if the pattern contains no variables or wildcards.
    #[must_use]
    pub fn is_ground(&self) -> bool {
        match self {
            Self::Var { .. } | Self::Wildcard => false,
            Self::Const { args, .. } => args.iter().all(Self::is_ground),
            _ => true,
        }
    }

    /// Returns true if the pattern contains a wildcard anywhere.
    #[must_use]
    pub fn has_wildcard(&self) -> bool {
        match self {
            Self::Wildcard => true,
            Self::Const { args, .. } => args.iter().any(Self::has_wildcard),
            _ => false,
        }
    }

    /// Appends every slot the pattern mentions to `out`.
    pub fn collect_slots(&self, out: &mut Vec<usize>) {
        match self {
            Self::Var { slot } => out.push(*slot),
            Self::Const { args, .. } => {
                for arg in args {
                    arg.collect_slots(out);
                }
            }
            _ => {}
        }
    }

    /// Interns a ground pattern as a term.
    ///
    /// # Errors
    ///
    /// Returns a malformed-program error if the pattern is not ground.
    pub fn to_term(&self, store: &mut TermStore) -> Result<TermId> {
        let view = match self {
            Self::Trivial => return Ok(TermId::TRIVIAL),
            Self::Bool { value } => return Ok(TermId::boolean(*value)),
            Self::Int { value } => TermView::Int(value.clone()),
            Self::String { value } => TermView::String(value.clone()),
            Self::Ref { index } => TermView::Ref(*index),
            Self::Const { name, args } => {
                let args = args
                    .iter()
                    .map(|arg| arg.to_term(store))
                    .collect::<Result<Vec<_>>>()?;
                TermView::Const {
                    name: name.clone(),
                    args,
                }
            }
            Self::Var { slot } => {
                return Err(Error::malformed(format!(
                    "variable in slot {slot} where a ground term is required"
                )));
            }
            Self::Wildcard => {
                return Err(Error::malformed("wildcard where a ground term is required"));
            }
        };
        Ok(store.intern(view))
    }

    /// Compiles the pattern, interning every ground subterm.
    pub fn compile(&self, store: &mut TermStore) -> CompiledPattern {
        match self {
            Self::Var { slot } => CompiledPattern::Var(*slot),
            Self::Wildcard => CompiledPattern::Wildcard,
            Self::Const { name, args } if !self.is_ground() => CompiledPattern::Const {
                name: name.clone(),
                args: args.iter().map(|arg| arg.compile(store)).collect(),
            },
            ground => match ground.to_term(store) {
                Ok(term) => CompiledPattern::Term(term),
                Err(_) => unreachable!("ground patterns always intern"),
            },
        }
    }
}

/// A pattern whose ground parts have been interned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CompiledPattern {
    /// A ground term.
    Term(TermId),
    /// A variable slot.
    Var(usize),
    /// Matches anything.
    Wildcard,
    /// A constructor with at least one non-ground argument.
    Const {
        /// Constructor name.
        name: Arc<str>,
        /// Argument patterns.
        args: Vec<CompiledPattern>,
    },
}

/// Slot-indexed variable bindings for one rule firing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Substitution {
    slots: Vec<Option<TermId>>,
}

impl Substitution {
    /// Creates an empty substitution with room for `size` slots.
    #[must_use]
    pub fn with_slots(size: usize) -> Self {
        Self {
            slots: vec![None; size],
        }
    }

    /// Returns the binding of a slot, if bound.
    #[must_use]
    pub fn get(&self, slot: usize) -> Option<TermId> {
        self.slots.get(slot).copied().flatten()
    }

    /// Binds a slot, or checks an existing binding. Returns false on a
    /// conflicting binding.
    pub fn bind(&mut self, slot: usize, term: TermId) -> bool {
        if slot >= self.slots.len() {
            self.slots.resize(slot + 1, None);
        }
        match self.slots[slot] {
            Some(bound) => bound == term,
            None => {
                self.slots[slot] = Some(term);
                true
            }
        }
    }

    /// Matches `term` against `pattern`, binding unbound slots.
    ///
    /// On failure the substitution may hold partial bindings; callers match
    /// against a copy when they need to retry.
    pub fn matches(&mut self, pattern: &CompiledPattern, term: TermId, store: &TermStore) -> bool {
        match pattern {
            CompiledPattern::Term(expected) => *expected == term,
            CompiledPattern::Wildcard => true,
            CompiledPattern::Var(slot) => self.bind(*slot, term),
            CompiledPattern::Const { name, args } => match store.expose(term) {
                TermView::Const {
                    name: actual,
                    args: actual_args,
                } if actual == name && actual_args.len() == args.len() => args
                    .iter()
                    .zip(actual_args)
                    .all(|(p, &t)| self.matches(p, t, store)),
                _ => false,
            },
        }
    }

    /// Matches a sequence of terms against a sequence of patterns.
    pub fn matches_all(
        &mut self,
        patterns: &[CompiledPattern],
        terms: &[TermId],
        store: &TermStore,
    ) -> bool {
        patterns.len() == terms.len()
            && patterns
                .iter()
                .zip(terms)
                .all(|(p, &t)| self.matches(p, t, store))
    }

    /// Builds the term a pattern denotes under this substitution.
    ///
    /// # Errors
    ///
    /// Returns a malformed-program error for an unbound slot or a wildcard.
    pub fn instantiate(&self, pattern: &CompiledPattern, store: &mut TermStore) -> Result<TermId> {
        match pattern {
            CompiledPattern::Term(term) => Ok(*term),
            CompiledPattern::Var(slot) => self
                .get(*slot)
                .ok_or_else(|| Error::malformed(format!("slot {slot} is used before it is bound"))),
            CompiledPattern::Wildcard => {
                Err(Error::malformed("wildcard cannot be instantiated"))
            }
            CompiledPattern::Const { name, args } => {
                let args = args
                    .iter()
                    .map(|arg| self.instantiate(arg, store))
                    .collect::<Result<Vec<_>>>()?;
                Ok(store.intern(TermView::Const {
                    name: name.clone(),
                    args,
                }))
            }
        }
    }

    /// Instantiates every pattern in order.
    ///
    /// # Errors
    ///
    /// Returns a malformed-program error for an unbound slot or a wildcard.
    pub fn instantiate_all(
        &self,
        patterns: &[CompiledPattern],
        store: &mut TermStore,
    ) -> Result<Vec<TermId>> {
        patterns
            .iter()
            .map(|p| self.instantiate(p, store))
            .collect()
    }
}
