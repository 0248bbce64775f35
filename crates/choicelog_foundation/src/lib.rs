//! Term store, errors, and persistent collections for choicelog.
//!
//! This crate provides:
//! - [`TermStore`] - Hash-consed terms addressed by [`TermId`] handles
//! - [`Error`] - Error types with context
//! - [`OrdMap`] - Persistent AVL map with a pluggable [`Comparator`]
//! - [`Trie`] - Persistent trie over term sequences
//! - [`BinomialForest`] - Persistent max-priority queue

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod forest;
pub mod intern;
pub mod ordmap;
pub mod term;
pub mod trie;

pub use error::{Error, ErrorContext, ErrorKind, Result};
pub use forest::BinomialForest;
pub use intern::{TermDisplay, TermStore};
pub use ordmap::{ByFn, Comparator, Natural, OrdMap};
pub use term::{TermId, TermView};
pub use trie::Trie;

pub use num_bigint::BigInt;
