//! Solving sessions, projection, and host interfaces for choicelog.
//!
//! This crate provides:
//! - [`Session`] - Step-wise solving with solutions projected to JSON terms
//! - [`JsonTerm`] / [`Fact`] - The host-facing view of terms and facts
//! - [`Worker`] - The cooperative load/start/stop message protocol
//! - Program loading from JSON and `MessagePack`

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod json;
pub mod protocol;
pub mod serialize;
pub mod session;

pub use json::{Fact, JsonTerm};
pub use protocol::{Request, Response, Worker};
pub use serialize::{load_program, program_from_bytes, program_to_bytes, save_program};
pub use session::{Session, Solutions, StepReport};
