//! choicelog - Finite-domain answer-set runtime
//!
//! This crate re-exports all layers of the choicelog system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 4: choicelog_runtime    — Sessions, JSON projection, worker protocol, CLI
//! Layer 3: choicelog_engine     — Saturation, choice-tree search
//! Layer 2: choicelog_language   — Program IR, patterns, stack machine
//! Layer 1: choicelog_storage    — Indexed fact database, value constraints
//! Layer 0: choicelog_foundation — Term store, errors, persistent collections
//! ```

pub use choicelog_engine as engine;
pub use choicelog_foundation as foundation;
pub use choicelog_language as language;
pub use choicelog_runtime as runtime;
pub use choicelog_storage as storage;
