//! Step-wise solving sessions.
//!
//! A [`Session`] wraps a [`Solver`] and projects every solution it reports
//! into host-facing [`Fact`]s. Stepping is cooperative: each call does a
//! bounded amount of work and returns, so a host can interleave solving with
//! its own event loop and drop the session between steps at no cost.

use serde::Serialize;
use tracing::debug;

use choicelog_engine::{Solution, Solver, SolverConfig, SolverStats, Step};
use choicelog_foundation::Result;
use choicelog_language::Program;

use crate::json::{Fact, project};

/// The outcome of one [`Session::step`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StepReport {
    /// The solution reached during this step, if any.
    pub solution: Option<Vec<Fact>>,
    /// True once the search space is exhausted.
    pub exhausted: bool,
    /// Statistics so far.
    pub stats: SolverStats,
}

/// A solving session over one program.
pub struct Session {
    solver: Solver,
}

impl Session {
    /// Validates `program` and creates a session with the default
    /// configuration.
    ///
    /// # Errors
    ///
    /// Returns a malformed-program error if validation fails.
    pub fn new(program: &Program) -> Result<Self> {
        Self::with_config(program, SolverConfig::default())
    }

    /// Validates `program` and creates a session with `config`.
    ///
    /// # Errors
    ///
    /// Returns a malformed-program error if validation fails.
    pub fn with_config(program: &Program, config: SolverConfig) -> Result<Self> {
        let solver = Solver::new(program, config)?;
        debug!(rules = program.rules.len(), "session started");
        Ok(Self { solver })
    }

    /// Performs at most `budget` cycles of work.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed rule code or a broken invariant. The
    /// session must be abandoned afterwards.
    pub fn step(&mut self, budget: usize) -> Result<StepReport> {
        let solution = match self.solver.step(budget)? {
            Step::Solution(solution) => Some(self.project(&solution)),
            Step::Paused | Step::Exhausted => None,
        };
        let exhausted = self.solver.is_exhausted();
        if exhausted {
            debug!(stats = ?self.solver.stats(), "session exhausted");
        }
        Ok(StepReport {
            solution,
            exhausted,
            stats: self.solver.stats(),
        })
    }

    /// Returns an iterator that drives the session to exhaustion.
    pub fn solutions(&mut self) -> Solutions<'_> {
        Solutions { session: self }
    }

    /// Expands a solution's facts against this session's term store.
    #[must_use]
    pub fn project(&self, solution: &Solution) -> Vec<Fact> {
        project(self.solver.store(), &solution.facts())
    }

    /// Returns the statistics so far.
    #[must_use]
    pub fn stats(&self) -> SolverStats {
        self.solver.stats()
    }

    /// Returns true if no work remains.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.solver.is_exhausted()
    }
}

/// Iterator over the remaining solutions of a [`Session`].
pub struct Solutions<'a> {
    session: &'a mut Session,
}

impl Iterator for Solutions<'_> {
    type Item = Result<Vec<Fact>>;

    fn next(&mut self) -> Option<Self::Item> {
        let solution = match self.session.solver.next()? {
            Ok(solution) => solution,
            Err(err) => return Some(Err(err)),
        };
        Some(Ok(self.session.project(&solution)))
    }
}
