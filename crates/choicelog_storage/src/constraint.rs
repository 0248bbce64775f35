//! Three-valued knowledge about one predicate at one argument tuple.
//!
//! A tuple that is absent from its relation is fully open. A tuple that is
//! present is either fixed to a value, or narrowed by a set of values it is
//! known not to take.

use std::fmt;

use choicelog_foundation::{TermId, TermStore};

/// What is known about the value of a predicate at one argument tuple.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Constraint {
    /// The value is fixed.
    Just(TermId),
    /// The value is undetermined but excludes every term in the set.
    NoneOf(im::OrdSet<TermId>),
}

/// Which counter a constraint contributes to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ConstraintKind {
    /// [`Constraint::Just`].
    Fixed,
    /// [`Constraint::NoneOf`].
    Narrowing,
}

impl Constraint {
    /// Creates a narrowing constraint from the excluded values.
    #[must_use]
    pub fn none_of(values: impl IntoIterator<Item = TermId>) -> Self {
        Self::NoneOf(values.into_iter().collect())
    }

    /// Returns the counter this constraint contributes to.
    #[must_use]
    pub fn kind(&self) -> ConstraintKind {
        match self {
            Self::Just(_) => ConstraintKind::Fixed,
            Self::NoneOf(_) => ConstraintKind::Narrowing,
        }
    }

    /// Returns the fixed value, if any.
    #[must_use]
    pub fn value(&self) -> Option<TermId> {
        match self {
            Self::Just(v) => Some(*v),
            Self::NoneOf(_) => None,
        }
    }

    /// Returns true if the value is fixed.
    #[must_use]
    pub fn is_fixed(&self) -> bool {
        matches!(self, Self::Just(_))
    }

    /// Returns true if `value` is still a possible value.
    #[must_use]
    pub fn admits(&self, value: TermId) -> bool {
        match self {
            Self::Just(v) => *v == value,
            Self::NoneOf(excluded) => !excluded.contains(&value),
        }
    }

    /// Returns a displayable rendering using the store for term syntax.
    #[must_use]
    pub fn display<'a>(&'a self, store: &'a TermStore) -> ConstraintDisplay<'a> {
        ConstraintDisplay {
            constraint: self,
            store,
        }
    }
}

/// Rendering of a [`Constraint`]. See [`Constraint::display`].
pub struct ConstraintDisplay<'a> {
    constraint: &'a Constraint,
    store: &'a TermStore,
}

impl fmt::Display for ConstraintDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.constraint {
            Constraint::Just(v) => write!(f, "is {}", self.store.display(*v)),
            Constraint::NoneOf(excluded) => {
                write!(f, "is none of {{")?;
                for (i, v) in excluded.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", self.store.display(*v))?;
                }
                write!(f, "}}")
            }
        }
    }
}
