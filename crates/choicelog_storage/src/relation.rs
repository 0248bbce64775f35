//! Relation storage: one trie of constraints per predicate.

use choicelog_foundation::{Result, TermId, Trie};

use crate::constraint::{Constraint, ConstraintKind};

/// All stored tuples of one predicate.
///
/// Alongside the trie the relation keeps running counts of fixed and
/// narrowing entries, so callers can tell without a scan whether any tuple
/// is still undetermined.
#[derive(Clone, Debug, Default)]
pub struct Relation {
    trie: Trie<Constraint>,
    fixed: usize,
    narrowing: usize,
}

impl Relation {
    /// Creates an empty relation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the underlying trie.
    #[must_use]
    pub fn trie(&self) -> &Trie<Constraint> {
        &self.trie
    }

    /// Returns the number of fixed entries.
    #[must_use]
    pub fn fixed_count(&self) -> usize {
        self.fixed
    }

    /// Returns the number of narrowed but undetermined entries.
    #[must_use]
    pub fn narrowing_count(&self) -> usize {
        self.narrowing
    }

    /// Returns the number of stored tuples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fixed + self.narrowing
    }

    /// Returns true if no tuple is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Looks up the constraint stored for `args`.
    ///
    /// A lookup that ends on an interior node (fewer args than the stored
    /// tuples have) is absent, not an error.
    #[must_use]
    pub fn get(&self, args: &[TermId]) -> Option<&Constraint> {
        self.trie.lookup(args)?.leaf()
    }

    /// Returns a new relation with `constraint` stored at `args`, and the
    /// constraint it replaced.
    ///
    /// # Errors
    ///
    /// Returns an invariant error if `args` disagrees with the arity of the
    /// tuples already stored.
    pub fn set(&self, args: &[TermId], constraint: Constraint) -> Result<(Self, Option<Constraint>)> {
        let new_kind = constraint.kind();
        let (trie, previous) = self.trie.insert(args, constraint)?;

        let (mut fixed, mut narrowing) = (self.fixed, self.narrowing);
        match previous.as_ref().map(Constraint::kind) {
            Some(ConstraintKind::Fixed) => fixed -= 1,
            Some(ConstraintKind::Narrowing) => narrowing -= 1,
            None => {}
        }
        match new_kind {
            ConstraintKind::Fixed => fixed += 1,
            ConstraintKind::Narrowing => narrowing += 1,
        }

        Ok((
            Self {
                trie,
                fixed,
                narrowing,
            },
            previous,
        ))
    }

    /// Returns every stored tuple with its constraint, ascending.
    #[must_use]
    pub fn entries(&self) -> Vec<(Vec<TermId>, &Constraint)> {
        self.trie.entries()
    }
}
