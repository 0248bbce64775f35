//! Constraints, relations, and the persistent fact database for choicelog.
//!
//! This crate provides:
//! - [`Constraint`] - Fixed or narrowed knowledge about one tuple
//! - [`Relation`] - A trie of constraints with fixed/narrowing counts
//! - [`Database`] - Immutable predicate-to-relation map with structural sharing

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod constraint;
pub mod database;
pub mod relation;

pub use constraint::{Constraint, ConstraintDisplay, ConstraintKind};
pub use database::{Database, StoredFact};
pub use relation::Relation;
