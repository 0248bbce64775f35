//! Forward chaining over one leaf of the choice tree.
//!
//! A [`Leaf`] is a complete, immutable-by-clone snapshot of a partial
//! model: the fact database, the intermediate relations, the agenda of
//! derivations not yet propagated, and the choices registered but not yet
//! resolved. Saturation pops one agenda item per [`Leaf::step`] and fires
//! every rule it triggers. Once the agenda is empty, [`Leaf::examine`]
//! resolves registered choices one at a time, either in place or by
//! splitting the leaf into branches.
//!
//! Every field is a persistent structure, so cloning a leaf for each branch
//! shares all of its state with the parent.

use std::fmt;
use std::sync::Arc;

use im::{OrdMap as ImOrdMap, OrdSet, Vector};
use tracing::trace;

use choicelog_foundation::{OrdMap, Result, TermId, TermStore, Trie};
use choicelog_language::{Substitution, Vm};
use choicelog_storage::{Constraint, Database};

use crate::rule::{CompiledConclusion, CompiledRuleBody, RuleSet};

// =============================================================================
// Agenda and Choice Types
// =============================================================================

/// A derivation waiting to be propagated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Item {
    /// A base fact that was just fixed.
    Fact {
        /// Predicate name.
        name: Arc<str>,
        /// Arguments.
        args: Vec<TermId>,
        /// Fixed value.
        value: TermId,
    },
    /// An intermediate tuple that was just derived.
    Intermediate {
        /// Intermediate name.
        name: Arc<str>,
        /// Arguments.
        args: Vec<TermId>,
    },
}

/// The tuple a choice is about.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChoiceKey {
    /// Predicate name.
    pub name: Arc<str>,
    /// Arguments.
    pub args: Vec<TermId>,
}

/// Every registration for one [`ChoiceKey`], merged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Deferred {
    /// Union of the candidate values of every registration.
    pub values: OrdSet<TermId>,
    /// True if any registration was closed.
    pub exhaustive: bool,
}

/// Why a leaf cannot lead to a solution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeadEnd {
    /// A forbidden intermediate was derived.
    Forbidden(Arc<str>),
    /// A fact contradicts the value already fixed or excluded.
    Conflict(Arc<str>),
    /// A closed choice has no candidate left, or does not admit the value
    /// its tuple is fixed to.
    NoCandidates(Arc<str>),
    /// Some tuple was narrowed but never fixed.
    Unjustified,
    /// A demanded intermediate was not derived.
    MissingDemand(Arc<str>),
}

impl fmt::Display for DeadEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Forbidden(name) => write!(f, "forbidden {name} derived"),
            Self::Conflict(name) => write!(f, "conflicting value for {name}"),
            Self::NoCandidates(name) => write!(f, "no candidate left for {name}"),
            Self::Unjustified => write!(f, "narrowed tuple left undetermined"),
            Self::MissingDemand(name) => write!(f, "demand {name} not derived"),
        }
    }
}

/// Whether a leaf can still lead to a solution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LeafStatus {
    /// Still live.
    Alive,
    /// Abandoned.
    Dead(DeadEnd),
}

/// What [`Leaf::examine`] decided.
#[derive(Clone, Debug)]
pub enum Examination {
    /// A choice needed no action; examine again.
    Discharged,
    /// A closed choice with one candidate was applied; saturate again.
    Applied,
    /// The leaf is dead.
    Dead,
    /// The leaf splits into these branches.
    Branch(Vec<Leaf>),
    /// The leaf is a solution.
    Solution,
}

// =============================================================================
// Leaf
// =============================================================================

/// A snapshot of one node of the choice tree.
#[derive(Clone, Debug)]
pub struct Leaf {
    db: Database,
    intermediates: OrdMap<Arc<str>, Trie<()>>,
    agenda: Vector<Item>,
    deferred: ImOrdMap<ChoiceKey, Deferred>,
    status: LeafStatus,
}

impl Default for Leaf {
    fn default() -> Self {
        Self::new()
    }
}

impl Leaf {
    /// Creates an empty live leaf.
    #[must_use]
    pub fn new() -> Self {
        Self {
            db: Database::new(),
            intermediates: OrdMap::new(),
            agenda: Vector::new(),
            deferred: ImOrdMap::new(),
            status: LeafStatus::Alive,
        }
    }

    /// Creates the root leaf, with every seed derived.
    ///
    /// # Errors
    ///
    /// Returns an invariant error if a seed name was already used with a
    /// different arity.
    pub fn seeded(rules: &RuleSet) -> Result<Self> {
        let mut leaf = Self::new();
        for seed in rules.seeds() {
            leaf.derive_intermediate(rules, seed.clone(), Vec::new())?;
        }
        Ok(leaf)
    }

    /// Returns the fact database.
    #[must_use]
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Returns the leaf status.
    #[must_use]
    pub fn status(&self) -> &LeafStatus {
        &self.status
    }

    /// Returns true if the leaf is dead.
    #[must_use]
    pub fn is_dead(&self) -> bool {
        matches!(self.status, LeafStatus::Dead(_))
    }

    /// Returns true if no derivation is waiting.
    #[must_use]
    pub fn is_saturated(&self) -> bool {
        self.agenda.is_empty()
    }

    /// Returns the number of derivations waiting.
    #[must_use]
    pub fn agenda_len(&self) -> usize {
        self.agenda.len()
    }

    /// Returns the registered, unresolved choices.
    #[must_use]
    pub fn deferred(&self) -> &ImOrdMap<ChoiceKey, Deferred> {
        &self.deferred
    }

    /// Returns true if the intermediate `name` has at least one tuple.
    #[must_use]
    pub fn holds(&self, name: &str) -> bool {
        self.intermediates
            .get_entry(name)
            .is_some_and(|(_, trie)| !trie.is_empty())
    }

    /// Returns true if the intermediate tuple `name(args)` was derived.
    #[must_use]
    pub fn derived(&self, name: &str, args: &[TermId]) -> bool {
        self.intermediates
            .get_entry(name)
            .and_then(|(_, trie)| trie.lookup(args))
            .is_some_and(|node| node.leaf().is_some())
    }

    fn kill(&mut self, reason: DeadEnd) {
        trace!(%reason, "leaf killed");
        self.status = LeafStatus::Dead(reason);
        self.agenda.clear();
    }

    // -------------------------------------------------------------------------
    // Saturation
    // -------------------------------------------------------------------------

    /// Propagates one agenda item. Returns false if there was nothing to do.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed rule code or a broken storage invariant.
    pub fn step(&mut self, rules: &RuleSet, store: &mut TermStore) -> Result<bool> {
        if self.is_dead() {
            return Ok(false);
        }
        let Some(item) = self.agenda.pop_front() else {
            return Ok(false);
        };
        trace!(?item, "agenda");

        match item {
            Item::Fact { name, args, value } => self.propagate_fact(rules, store, &name, &args, value)?,
            Item::Intermediate { name, args } => {
                self.propagate_intermediate(rules, store, &name, &args)?;
            }
        }
        Ok(true)
    }

    /// Steps until the agenda is empty or the leaf dies. Returns the number
    /// of items propagated.
    ///
    /// # Errors
    ///
    /// As for [`Leaf::step`].
    pub fn saturate(&mut self, rules: &RuleSet, store: &mut TermStore) -> Result<usize> {
        let mut steps = 0;
        while self.step(rules, store)? {
            steps += 1;
        }
        Ok(steps)
    }

    fn propagate_fact(
        &mut self,
        rules: &RuleSet,
        store: &mut TermStore,
        name: &str,
        args: &[TermId],
        value: TermId,
    ) -> Result<()> {
        for rule in rules.on_fact(name) {
            if self.is_dead() {
                break;
            }
            match &rule.body {
                CompiledRuleBody::Unary { premise } => {
                    let mut subst = Substitution::with_slots(rule.slots);
                    if subst.matches_all(&premise.args, args, store)
                        && subst.matches(&premise.value, value, store)
                    {
                        self.fire(rules, store, &rule.conclusion, &subst)?;
                    }
                }
                CompiledRuleBody::Join {
                    intermediate,
                    vars,
                    shared,
                    premise,
                } => {
                    let mut subst = Substitution::with_slots(rule.slots);
                    if !(subst.matches_all(&premise.args, args, store)
                        && subst.matches(&premise.value, value, store))
                    {
                        continue;
                    }
                    let rows: Vec<Vec<TermId>> = self
                        .intermediates
                        .get_entry(&**intermediate)
                        .and_then(|(_, trie)| trie.lookup(&args[..*shared]))
                        .map(|node| {
                            node.visit(vars.len() - shared)
                                .filter(|(_, leaf)| leaf.leaf().is_some())
                                .map(|(keys, _)| keys)
                                .collect()
                        })
                        .unwrap_or_default();
                    for keys in rows {
                        let mut joined = subst.clone();
                        if bind_slots(&mut joined, &vars[*shared..], &keys) {
                            self.fire(rules, store, &rule.conclusion, &joined)?;
                        }
                    }
                }
                CompiledRuleBody::Run { .. } => {}
            }
        }
        Ok(())
    }

    fn propagate_intermediate(
        &mut self,
        rules: &RuleSet,
        store: &mut TermStore,
        name: &str,
        args: &[TermId],
    ) -> Result<()> {
        for rule in rules.on_intermediate(name) {
            if self.is_dead() {
                break;
            }
            match &rule.body {
                CompiledRuleBody::Join {
                    vars,
                    shared,
                    premise,
                    ..
                } => {
                    let mut subst = Substitution::with_slots(rule.slots);
                    if !bind_slots(&mut subst, vars, args) {
                        continue;
                    }
                    let depth = premise.args.len() - shared + 1;
                    for completion in self.db.visit(&premise.name, &args[..*shared], depth) {
                        let Some((&value, rest)) = completion.split_last() else {
                            continue;
                        };
                        let mut joined = subst.clone();
                        if joined.matches_all(&premise.args[*shared..], rest, store)
                            && joined.matches(&premise.value, value, store)
                        {
                            self.fire(rules, store, &rule.conclusion, &joined)?;
                        }
                    }
                }
                CompiledRuleBody::Run {
                    vars,
                    instructions,
                    for_failure,
                    ..
                } => {
                    let mut subst = Substitution::with_slots(rule.slots);
                    if !bind_slots(&mut subst, vars, args) {
                        continue;
                    }
                    let outcomes = Vm::new(store).run(instructions, subst.clone())?;
                    if *for_failure {
                        if outcomes.is_empty() {
                            self.fire(rules, store, &rule.conclusion, &subst)?;
                        }
                    } else {
                        for outcome in outcomes {
                            self.fire(rules, store, &rule.conclusion, &outcome)?;
                        }
                    }
                }
                CompiledRuleBody::Unary { .. } => {}
            }
        }
        Ok(())
    }

    fn fire(
        &mut self,
        rules: &RuleSet,
        store: &mut TermStore,
        conclusion: &CompiledConclusion,
        subst: &Substitution,
    ) -> Result<()> {
        if self.is_dead() {
            return Ok(());
        }
        match conclusion {
            CompiledConclusion::Intermediate { name, args } => {
                let args = subst.instantiate_all(args, store)?;
                self.derive_intermediate(rules, name.clone(), args)
            }
            CompiledConclusion::Fact { name, args, value } => {
                let args = subst.instantiate_all(args, store)?;
                let value = subst.instantiate(value, store)?;
                self.assert_fact(name.clone(), args, value)
            }
            CompiledConclusion::Choice {
                name,
                args,
                values,
                exhaustive,
            } => {
                let args = subst.instantiate_all(args, store)?;
                let values = subst.instantiate_all(values, store)?;
                self.register_choice(
                    ChoiceKey {
                        name: name.clone(),
                        args,
                    },
                    values.into_iter().collect(),
                    *exhaustive,
                );
                Ok(())
            }
        }
    }

    fn derive_intermediate(
        &mut self,
        rules: &RuleSet,
        name: Arc<str>,
        args: Vec<TermId>,
    ) -> Result<()> {
        let trie = self
            .intermediates
            .get_entry(&*name)
            .map(|(_, trie)| trie.clone())
            .unwrap_or_default();
        let (trie, previous) = trie.insert(&args, ())?;
        if previous.is_some() {
            return Ok(());
        }
        self.intermediates = self.intermediates.insert(name.clone(), trie).0;

        if rules.is_forbidden(&name) {
            self.kill(DeadEnd::Forbidden(name));
            return Ok(());
        }
        self.agenda.push_back(Item::Intermediate { name, args });
        Ok(())
    }

    /// Fixes `name(args)` to `value` and queues it for propagation.
    ///
    /// A repeated assertion of the same value is ignored. Asserting a value
    /// that differs from the fixed one, or that was excluded, kills the leaf.
    ///
    /// # Errors
    ///
    /// Returns an invariant error if `args` disagrees with the arity already
    /// stored for `name`.
    pub fn assert_fact(&mut self, name: Arc<str>, args: Vec<TermId>, value: TermId) -> Result<()> {
        match self.db.get(&name, &args).cloned() {
            Some(Constraint::Just(existing)) if existing == value => return Ok(()),
            Some(constraint) if !constraint.admits(value) => {
                self.kill(DeadEnd::Conflict(name));
                return Ok(());
            }
            _ => {}
        }
        self.db = self.db.set(&name, &args, Constraint::Just(value))?.0;
        self.agenda.push_back(Item::Fact { name, args, value });
        Ok(())
    }

    fn register_choice(&mut self, key: ChoiceKey, values: OrdSet<TermId>, exhaustive: bool) {
        let merged = match self.deferred.get(&key) {
            Some(existing) => Deferred {
                values: existing.values.clone().union(values),
                exhaustive: existing.exhaustive || exhaustive,
            },
            None => Deferred { values, exhaustive },
        };
        self.deferred.insert(key, merged);
    }

    fn exclude(&mut self, key: &ChoiceKey, values: OrdSet<TermId>) -> Result<()> {
        self.db = self.db.set(&key.name, &key.args, Constraint::NoneOf(values))?.0;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Choices
    // -------------------------------------------------------------------------

    /// Resolves the first registered choice of a saturated leaf, or decides
    /// the leaf if none is left.
    ///
    /// Candidates are the registered values minus the tuple's exclusions. A
    /// tuple that is already fixed discharges its choice, unless the choice
    /// is closed and does not list the fixed value. A closed choice
    /// with no candidate kills the leaf, and one with a single candidate is
    /// applied in place. Otherwise the leaf splits into one branch per
    /// candidate, plus, for an open choice, a branch that excludes every
    /// candidate.
    ///
    /// With no choice left, the leaf is a solution iff no tuple is merely
    /// narrowed and every demand was derived.
    ///
    /// # Errors
    ///
    /// Returns an invariant error if storage rejects an update.
    pub fn examine(&mut self, rules: &RuleSet) -> Result<Examination> {
        if self.is_dead() {
            return Ok(Examination::Dead);
        }

        if let Some((key, deferred)) = self.deferred.get_min().cloned() {
            self.deferred.remove(&key);

            let excluded = match self.db.get(&key.name, &key.args) {
                Some(Constraint::Just(value))
                    if deferred.exhaustive && !deferred.values.contains(value) =>
                {
                    self.kill(DeadEnd::NoCandidates(key.name));
                    return Ok(Examination::Dead);
                }
                Some(Constraint::Just(_)) => return Ok(Examination::Discharged),
                Some(Constraint::NoneOf(excluded)) => excluded.clone(),
                None => OrdSet::new(),
            };
            let candidates: Vec<TermId> = deferred
                .values
                .iter()
                .filter(|value| !excluded.contains(value))
                .copied()
                .collect();

            if deferred.exhaustive {
                match candidates.as_slice() {
                    [] => {
                        self.kill(DeadEnd::NoCandidates(key.name));
                        return Ok(Examination::Dead);
                    }
                    [only] => {
                        self.assert_fact(key.name, key.args, *only)?;
                        return Ok(Examination::Applied);
                    }
                    _ => {}
                }
            } else if candidates.is_empty() {
                return Ok(Examination::Discharged);
            }

            let mut branches = Vec::with_capacity(candidates.len() + 1);
            for &value in &candidates {
                let mut branch = self.clone();
                branch.assert_fact(key.name.clone(), key.args.clone(), value)?;
                branches.push(branch);
            }
            if !deferred.exhaustive {
                let mut none = self.clone();
                none.exclude(&key, excluded.union(candidates.into_iter().collect()))?;
                branches.push(none);
            }
            return Ok(Examination::Branch(branches));
        }

        if self.db.narrowing_count() > 0 {
            self.kill(DeadEnd::Unjustified);
            return Ok(Examination::Dead);
        }
        if let Some(missing) = rules.demands().iter().find(|name| !self.holds(name)) {
            self.kill(DeadEnd::MissingDemand(missing.clone()));
            return Ok(Examination::Dead);
        }
        Ok(Examination::Solution)
    }
}

/// Binds `slots[i]` to `terms[i]`. False on a length mismatch or a clash.
fn bind_slots(subst: &mut Substitution, slots: &[usize], terms: &[TermId]) -> bool {
    slots.len() == terms.len()
        && slots
            .iter()
            .zip(terms)
            .all(|(&slot, &term)| subst.bind(slot, term))
}
