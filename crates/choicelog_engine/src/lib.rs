//! Saturation and choice-tree search for choicelog.
//!
//! This crate provides:
//! - [`RuleSet`] - Compiled rules indexed by triggering predicate
//! - [`Leaf`] - A persistent snapshot of one node of the choice tree
//! - [`Solver`] - Step-driven randomized search over the choice tree
//! - [`SolverConfig`] / [`SolverStats`] - Seed, budget jitter, and counters

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod rule;
pub mod saturate;
pub mod search;

pub use config::{SolverConfig, SolverStats};
pub use rule::{CompiledConclusion, CompiledPremise, CompiledRule, CompiledRuleBody, RuleSet};
pub use saturate::{ChoiceKey, DeadEnd, Deferred, Examination, Item, Leaf, LeafStatus};
pub use search::{Solution, Solver, Step};
