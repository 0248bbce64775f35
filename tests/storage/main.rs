//! Integration tests for Layer 1: Storage
//!
//! Tests for constraints, relations, and the persistent fact database.

mod database;
