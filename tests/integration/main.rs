//! End-to-end tests: programs in, host-facing facts out
//!
//! These drive the runtime the way a host does, through sessions, the worker
//! protocol, and program files.

mod programs;
mod protocol;
mod solving;
