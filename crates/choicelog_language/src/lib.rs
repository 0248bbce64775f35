//! Program representation and built-in evaluation for choicelog.
//!
//! This crate provides:
//! - [`Program`] - The compiled rule IR consumed by the engine
//! - [`Pattern`] / [`Substitution`] - Slot-indexed term matching
//! - [`Instruction`] - Stack-machine instruction set for built-ins
//! - [`Vm`] - Nondeterministic stack machine
//! - [`segmentations`] - String segmentation matcher used by `Split`

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod encoding;
pub mod opcode;
pub mod pattern;
pub mod program;
pub mod segment;
pub mod vm;

pub use opcode::{Instruction, SplitPart};
pub use pattern::{CompiledPattern, Pattern, Substitution};
pub use program::{Conclusion, Premise, Program, Rule};
pub use segment::{Segment, Segmentations, segmentations};
pub use vm::Vm;
