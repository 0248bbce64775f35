//! Integration tests for Layer 3: Engine
//!
//! Tests for saturation over leaves and the choice-tree search controller.

mod saturation;
mod search;
