//! The indexed fact database with immutable snapshots.
//!
//! A `Database` maps predicate names to [`Relation`]s. Every update returns a
//! new database and leaves the receiver untouched; only the path from the
//! changed leaf to the root is rebuilt, so a search tree can hold one
//! snapshot per branch without copying.

use std::sync::Arc;

use choicelog_foundation::{OrdMap, Result, TermId, Trie};

use crate::constraint::{Constraint, ConstraintKind};
use crate::relation::Relation;

/// One fixed fact: `name(args) is value`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredFact {
    /// Predicate name.
    pub name: Arc<str>,
    /// Argument tuple.
    pub args: Vec<TermId>,
    /// Fixed value.
    pub value: TermId,
}

/// Immutable fact database. Cloning is O(1).
#[derive(Clone, Debug, Default)]
pub struct Database {
    relations: OrdMap<Arc<str>, Relation>,
    fixed: usize,
    narrowing: usize,
}

impl Database {
    /// Creates an empty database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the relation for a predicate, if any tuple was ever stored.
    #[must_use]
    pub fn relation(&self, name: &str) -> Option<&Relation> {
        self.relations.get_entry(name).map(|(_, rel)| rel)
    }

    /// Returns the names of all stored predicates, ascending.
    pub fn names(&self) -> impl Iterator<Item = &Arc<str>> {
        self.relations.keys()
    }

    /// Returns the number of fixed entries across all relations.
    #[must_use]
    pub fn fixed_count(&self) -> usize {
        self.fixed
    }

    /// Returns the number of narrowed but undetermined entries across all
    /// relations.
    #[must_use]
    pub fn narrowing_count(&self) -> usize {
        self.narrowing
    }

    /// Looks up the constraint for `name(args)`.
    ///
    /// Absent if the predicate or tuple was never stored, or if `args` is
    /// shorter than the stored tuples.
    #[must_use]
    pub fn get(&self, name: &str, args: &[TermId]) -> Option<&Constraint> {
        self.relation(name)?.get(args)
    }

    /// Returns a new database with `constraint` stored at `name(args)`, and
    /// the constraint it replaced.
    ///
    /// # Errors
    ///
    /// Returns an invariant error if `args` disagrees with the arity of the
    /// tuples already stored for `name`.
    pub fn set(
        &self,
        name: &str,
        args: &[TermId],
        constraint: Constraint,
    ) -> Result<(Self, Option<Constraint>)> {
        let new_kind = constraint.kind();
        let (key, relation) = match self.relations.get_entry(name) {
            Some((key, relation)) => (key.clone(), relation.set(args, constraint)?),
            None => (Arc::from(name), Relation::new().set(args, constraint)?),
        };
        let (relation, previous) = relation;

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

        let (relations, _) = self.relations.insert(key, relation);
        Ok((
            Self {
                relations,
                fixed,
                narrowing,
            },
            previous,
        ))
    }

    /// Enumerates completions of `name(args...)` by access pattern.
    ///
    /// With `depth == 0` this is a membership test and yields at most one
    /// empty completion:
    /// - empty `args`: the predicate holds if its trie has children, or if it
    ///   is a zero-arity predicate with a fixed value;
    /// - otherwise the last element of `args` is checked against the node
    ///   reached by the others: equal to the fixed value of a terminal node,
    ///   or present as a child key of an interior node.
    ///
    /// With `depth > 0`, `args` is a bound prefix. Each completion has
    /// exactly `depth` elements: the keys below the prefix, followed either by
    /// the fixed value of a terminal node (undetermined terminals are
    /// skipped) or by a child key of an interior node. Completions come out
    /// in ascending key order.
    #[must_use]
    pub fn visit(&self, name: &str, args: &[TermId], depth: usize) -> Vec<Vec<TermId>> {
        let Some(relation) = self.relation(name) else {
            return Vec::new();
        };
        let trie = relation.trie();

        if depth == 0 {
            let holds = match args.split_last() {
                None => match trie {
                    Trie::Node(children) => !children.is_empty(),
                    Trie::Leaf(constraint) => constraint.is_fixed(),
                },
                Some((last, prefix)) => match trie.lookup(prefix) {
                    None => false,
                    Some(Trie::Leaf(constraint)) => constraint.value() == Some(*last),
                    Some(Trie::Node(children)) => children.contains_key(last),
                },
            };
            return if holds { vec![Vec::new()] } else { Vec::new() };
        }

        let Some(subtrie) = trie.lookup(args) else {
            return Vec::new();
        };

        let mut completions = Vec::new();
        for (keys, node) in subtrie.visit(depth - 1) {
            match node {
                Trie::Leaf(constraint) => {
                    if let Some(value) = constraint.value() {
                        let mut completion = keys;
                        completion.push(value);
                        completions.push(completion);
                    }
                }
                Trie::Node(children) => {
                    for &key in children.keys() {
                        let mut completion = keys.clone();
                        completion.push(key);
                        completions.push(completion);
                    }
                }
            }
        }
        completions
    }

    /// Returns every fixed fact, ascending by predicate name and then by
    /// argument tuple.
    #[must_use]
    pub fn facts(&self) -> Vec<StoredFact> {
        let mut facts = Vec::with_capacity(self.fixed);
        for (name, relation) in &self.relations {
            for (args, constraint) in relation.entries() {
                if let Some(value) = constraint.value() {
                    facts.push(StoredFact {
                        name: name.clone(),
                        args,
                        value,
                    });
                }
            }
        }
        facts
    }

    /// Returns every narrowed but undetermined entry with its exclusions.
    #[must_use]
    pub fn undetermined(&self) -> Vec<(Arc<str>, Vec<TermId>, Constraint)> {
        let mut out = Vec::with_capacity(self.narrowing);
        for (name, relation) in &self.relations {
            if relation.narrowing_count() == 0 {
                continue;
            }
            for (args, constraint) in relation.entries() {
                if !constraint.is_fixed() {
                    out.push((name.clone(), args, constraint.clone()));
                }
            }
        }
        out
    }
}
