//! Randomized choice-tree search.
//!
//! The [`Solver`] owns the current leaf and a priority queue of pending
//! branches. Each call to [`Solver::step`] spends a bounded number of
//! cycles: saturating the current leaf, examining its choices, and, when the
//! leaf is finished, popping the highest-priority pending branch. Branch
//! priorities are drawn from a seeded generator, so the exploration order is
//! a randomized depth-first walk that is reproducible for a fixed seed.
//!
//! All solver state is persistent. Abandoning a solver between steps needs
//! no cleanup, and resuming is just calling `step` again.

use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use choicelog_foundation::{BinomialForest, Result, TermStore};
use choicelog_language::Program;
use choicelog_storage::{Database, StoredFact};

use crate::config::{SolverConfig, SolverStats};
use crate::rule::RuleSet;
use crate::saturate::{Examination, Leaf, LeafStatus};

/// Mixed into the seed of the budget generator so that jitter draws never
/// perturb branch priorities.
const JITTER_STREAM: u64 = 0x6A09_E667_F3BC_C909;

/// A stable model.
#[derive(Clone, Debug)]
pub struct Solution {
    db: Database,
}

impl Solution {
    /// Returns the model's database.
    #[must_use]
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Returns every fact of the model, ascending by predicate then tuple.
    #[must_use]
    pub fn facts(&self) -> Vec<StoredFact> {
        self.db.facts()
    }
}

/// What one call to [`Solver::step`] achieved.
#[derive(Clone, Debug)]
pub enum Step {
    /// A solution was reached. More may follow.
    Solution(Solution),
    /// The budget ran out with work remaining.
    Paused,
    /// The search space is exhausted.
    Exhausted,
}

/// Choice-tree search controller.
pub struct Solver {
    store: TermStore,
    rules: RuleSet,
    config: SolverConfig,
    priorities: ChaCha8Rng,
    budgets: ChaCha8Rng,
    pending: BinomialForest<u64, Leaf>,
    current: Option<Leaf>,
    stats: SolverStats,
}

impl Solver {
    /// Validates and compiles `program` and seeds the root leaf.
    ///
    /// # Errors
    ///
    /// Returns a malformed-program error if validation fails.
    pub fn new(program: &Program, config: SolverConfig) -> Result<Self> {
        let mut store = TermStore::new();
        let rules = RuleSet::compile(program, &mut store)?;
        let root = Leaf::seeded(&rules)?;
        debug!(
            rules = rules.len(),
            seed = config.seed,
            "solver created"
        );

        Ok(Self {
            store,
            rules,
            priorities: ChaCha8Rng::seed_from_u64(config.seed),
            budgets: ChaCha8Rng::seed_from_u64(config.seed ^ JITTER_STREAM),
            config,
            pending: BinomialForest::new(),
            current: Some(root),
            stats: SolverStats::default(),
        })
    }

    /// Returns the term store that every reported term belongs to.
    #[must_use]
    pub fn store(&self) -> &TermStore {
        &self.store
    }

    /// Returns the statistics so far.
    #[must_use]
    pub fn stats(&self) -> SolverStats {
        self.stats
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Returns the number of branches waiting to be explored.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Returns true if no work remains.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.current.is_none() && self.pending.is_empty()
    }

    /// Performs at most `budget` cycles of work, stopping early at a solution
    /// or when the search is exhausted.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed rule code or a broken storage
    /// invariant. The solver should be abandoned afterwards.
    pub fn step(&mut self, budget: usize) -> Result<Step> {
        let mut remaining = self.draw_budget(budget);

        while remaining > 0 {
            let Some(mut leaf) = self.current.take().or_else(|| self.pop_branch()) else {
                return Ok(Step::Exhausted);
            };
            remaining -= 1;
            self.stats.cycles += 1;

            if let LeafStatus::Dead(reason) = leaf.status() {
                debug!(%reason, "dead end");
                self.stats.dead_ends += 1;
                continue;
            }

            if !leaf.is_saturated() {
                leaf.step(&self.rules, &mut self.store)?;
                self.current = Some(leaf);
                continue;
            }

            match leaf.examine(&self.rules)? {
                Examination::Discharged | Examination::Applied | Examination::Dead => {
                    self.current = Some(leaf);
                }
                Examination::Branch(branches) => {
                    debug!(count = branches.len(), pending = self.pending.len(), "branch");
                    for branch in branches {
                        let priority = self.priorities.next_u64();
                        self.pending.push(priority, branch);
                        self.stats.branches += 1;
                    }
                }
                Examination::Solution => {
                    self.stats.solutions += 1;
                    debug!(
                        solutions = self.stats.solutions,
                        facts = leaf.database().fixed_count(),
                        "solution"
                    );
                    return Ok(Step::Solution(Solution {
                        db: leaf.database().clone(),
                    }));
                }
            }
        }

        if self.is_exhausted() {
            Ok(Step::Exhausted)
        } else {
            Ok(Step::Paused)
        }
    }

    fn pop_branch(&mut self) -> Option<Leaf> {
        self.pending.pop().map(|(_, leaf)| leaf)
    }

    fn draw_budget(&mut self, budget: usize) -> usize {
        let budget = budget.max(1);
        if self.config.budget_jitter && budget > 1 {
            self.budgets.gen_range(budget / 2..=budget).max(1)
        } else {
            budget
        }
    }
}

impl Iterator for Solver {
    type Item = Result<Solution>;

    /// Steps until the next solution. Errors end the iteration.
    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.step(usize::MAX) {
                Ok(Step::Solution(solution)) => return Some(Ok(solution)),
                Ok(Step::Paused) => {}
                Ok(Step::Exhausted) => return None,
                Err(err) => {
                    self.current = None;
                    self.pending = BinomialForest::new();
                    return Some(Err(err));
                }
            }
        }
    }
}
