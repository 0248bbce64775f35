//! Instruction set for the built-in stack machine.
//!
//! `Run` rules carry a flat list of instructions. Values live on an operand
//! stack; variable slots are shared with the rule's substitution. Guards
//! (comparisons, `Store` against a bound slot, `Fail`) end the current
//! execution path without producing an outcome instead of raising an error.

#![allow(clippy::doc_markdown)]

use serde::{Deserialize, Serialize};

use crate::pattern::Pattern;

/// A single instruction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Instruction {
    // === Stack Operations ===
    /// Push a ground term: `[] -> [t]`
    Const {
        /// The term to push. Must be ground.
        value: Pattern,
    },
    /// Push the term bound in a slot: `[] -> [t]`
    Load {
        /// Slot index.
        slot: usize,
    },
    /// Pop into a slot, or check equality with its binding: `[t] -> []`
    Store {
        /// Slot index.
        slot: usize,
    },

    // === Guards ===
    /// Continue iff equal: `[a, b] -> []`
    Equal,
    /// Continue iff different: `[a, b] -> []`
    NotEqual,
    /// Continue iff `a > b` on integers: `[a, b] -> []`
    Gt,
    /// Continue iff `a >= b` on integers: `[a, b] -> []`
    Geq,
    /// Continue iff `a < b` on integers: `[a, b] -> []`
    Lt,
    /// Continue iff `a <= b` on integers: `[a, b] -> []`
    Leq,

    // === Arithmetic ===
    /// Sum of the top `arity` integers: `[a1 .. an] -> [a1 + .. + an]`
    Plus {
        /// Number of operands.
        arity: usize,
    },
    /// Difference: `[a, b] -> [a - b]`
    Minus,
    /// Product of the top `arity` integers: `[a1 .. an] -> [a1 * .. * an]`
    Times {
        /// Number of operands.
        arity: usize,
    },

    // === Constructors ===
    /// Push `true`.
    BoolTrue,
    /// Push `false`.
    BoolFalse,
    /// Push the natural number zero.
    NatZero,
    /// Successor of a natural: `[n] -> [n + 1]`
    NatSucc,
    /// Predecessor of a positive natural: `[n] -> [n - 1]`
    NatPred,
    /// Apply a constructor: `[a1 .. an] -> [name a1 .. an]`
    Build {
        /// Constructor name.
        name: String,
        /// Number of arguments.
        arity: usize,
    },

    // === Strings ===
    /// Concatenate the top `arity` strings: `[s1 .. sn] -> [s1 ++ .. ++ sn]`
    Concat {
        /// Number of operands.
        arity: usize,
    },
    /// Segment a string against literals and slots: `[s] -> []`
    ///
    /// Bound slots must match their string exactly; free slots are bound,
    /// once per consistent segmentation.
    Split {
        /// Literal separators and slot positions, left to right.
        parts: Vec<SplitPart>,
    },

    // === Control ===
    /// End this path with no outcome.
    Fail,
}

/// One piece of a [`Instruction::Split`] template.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SplitPart {
    /// A literal separator.
    Literal {
        /// The literal text.
        text: String,
    },
    /// A variable slot.
    Slot {
        /// Slot index.
        slot: usize,
    },
}

impl Instruction {
    /// Returns the slot read by this instruction, if any.
    #[must_use]
    pub fn reads(&self) -> Option<usize> {
        match self {
            Self::Load { slot } => Some(*slot),
            _ => None,
        }
    }

    /// Returns the slots this instruction may bind.
    #[must_use]
    pub fn binds(&self) -> Vec<usize> {
        match self {
            Self::Store { slot } => vec![*slot],
            Self::Split { parts } => parts
                .iter()
                .filter_map(|part| match part {
                    SplitPart::Slot { slot } => Some(*slot),
                    SplitPart::Literal { .. } => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Returns `(popped, pushed)` operand counts.
    #[must_use]
    pub fn stack_effect(&self) -> (usize, usize) {
        match self {
            Self::Const { .. }
            | Self::Load { .. }
            | Self::BoolTrue
            | Self::BoolFalse
            | Self::NatZero => (0, 1),
            Self::Store { .. } | Self::Split { .. } => (1, 0),
            Self::Equal | Self::NotEqual | Self::Gt | Self::Geq | Self::Lt | Self::Leq => (2, 0),
            Self::Minus => (2, 1),
            Self::NatSucc | Self::NatPred => (1, 1),
            Self::Plus { arity }
            | Self::Times { arity }
            | Self::Concat { arity }
            | Self::Build { arity, .. } => (*arity, 1),
            Self::Fail => (0, 0),
        }
    }
}
