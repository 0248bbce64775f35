//! Integration tests for Layer 2: Language
//!
//! Tests for the program IR, patterns, string segmentation, and the stack
//! machine.

mod patterns;
mod program;
mod segment;
mod vm;
