//! Solver configuration and statistics.

use serde::{Deserialize, Serialize};

/// Configuration for a [`Solver`](crate::Solver).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SolverConfig {
    /// Seed for branch priorities. Equal seeds give equal solution orders.
    pub seed: u64,
    /// Draw each step's budget uniformly from `[budget / 2, budget]`.
    pub budget_jitter: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            budget_jitter: false,
        }
    }
}

impl SolverConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the priority seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Enables or disables budget jitter.
    #[must_use]
    pub fn with_budget_jitter(mut self, jitter: bool) -> Self {
        self.budget_jitter = jitter;
        self
    }
}

/// Running counters over a solver's lifetime.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverStats {
    /// Units of work performed: agenda items and choice examinations.
    pub cycles: u64,
    /// Leaves abandoned as dead ends.
    pub dead_ends: u64,
    /// Solutions reported.
    pub solutions: u64,
    /// Branches pushed onto the pending queue.
    pub branches: u64,
}
