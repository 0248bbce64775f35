//! The compiled program IR.
//!
//! A [`Program`] is what the compiler hands the runtime: rules already
//! decomposed into single-premise steps that communicate through
//! intermediate predicates, plus the names that seed, demand, and forbid
//! those intermediates. The IR is plain data and round-trips through serde.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use choicelog_foundation::{Error, ErrorContext, Result};

use crate::opcode::Instruction;
use crate::pattern::Pattern;

/// A premise matching a base fact `name(args) is value`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Premise {
    /// Predicate name.
    pub name: Arc<str>,
    /// Argument patterns.
    #[serde(default)]
    pub args: Vec<Pattern>,
    /// Value pattern.
    #[serde(default)]
    pub value: Pattern,
}

/// What a rule derives when it fires.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Conclusion {
    /// A tuple of an intermediate predicate.
    Intermediate {
        /// Intermediate name.
        name: Arc<str>,
        /// Argument patterns.
        #[serde(default)]
        args: Vec<Pattern>,
    },
    /// A definite fact, `name(args) is value`.
    Fact {
        /// Predicate name.
        name: Arc<str>,
        /// Argument patterns.
        #[serde(default)]
        args: Vec<Pattern>,
        /// Value pattern.
        #[serde(default)]
        value: Pattern,
    },
    /// A choice, `name(args) is {values}` or `name(args) is? {values}`.
    Choice {
        /// Predicate name.
        name: Arc<str>,
        /// Argument patterns.
        #[serde(default)]
        args: Vec<Pattern>,
        /// Candidate value patterns.
        values: Vec<Pattern>,
        /// Closed choice: the value must be one of `values`.
        exhaustive: bool,
    },
}

impl Conclusion {
    /// Returns every pattern the conclusion instantiates.
    pub fn patterns(&self) -> impl Iterator<Item = &Pattern> {
        let (args, rest): (&[Pattern], &[Pattern]) = match self {
            Self::Intermediate { args, .. } => (args.as_slice(), &[]),
            Self::Fact { args, value, .. } => (args.as_slice(), std::slice::from_ref(value)),
            Self::Choice { args, values, .. } => (args.as_slice(), values.as_slice()),
        };
        args.iter().chain(rest)
    }

    /// Returns the predicate or intermediate name.
    #[must_use]
    pub fn name(&self) -> &Arc<str> {
        match self {
            Self::Intermediate { name, .. } | Self::Fact { name, .. } | Self::Choice { name, .. } => {
                name
            }
        }
    }
}

/// A single rule.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Rule {
    /// Fires on each base fact matching `premise`.
    Unary {
        /// The premise.
        premise: Premise,
        /// The conclusion.
        conclusion: Conclusion,
    },
    /// Joins an intermediate tuple with a base fact.
    ///
    /// The intermediate's arguments bind slots `vars` in order. The first
    /// `shared` premise arguments must be exactly `Var(vars[i])`; they form
    /// the index prefix used from either side of the join.
    Join {
        /// Intermediate name.
        intermediate: Arc<str>,
        /// Slots bound by the intermediate's arguments.
        vars: Vec<usize>,
        /// Length of the shared prefix.
        shared: usize,
        /// The base-fact premise.
        premise: Premise,
        /// The conclusion.
        conclusion: Conclusion,
    },
    /// Runs the stack machine on each intermediate tuple; fires once per
    /// successful outcome.
    Run {
        /// Intermediate name.
        intermediate: Arc<str>,
        /// Slots bound by the intermediate's arguments.
        vars: Vec<usize>,
        /// Stack-machine code.
        instructions: Vec<Instruction>,
        /// The conclusion.
        conclusion: Conclusion,
    },
    /// Runs the stack machine on each intermediate tuple; fires once iff
    /// there is no successful outcome.
    RunForFailure {
        /// Intermediate name.
        intermediate: Arc<str>,
        /// Slots bound by the intermediate's arguments.
        vars: Vec<usize>,
        /// Stack-machine code.
        instructions: Vec<Instruction>,
        /// The conclusion.
        conclusion: Conclusion,
    },
}

impl Rule {
    /// Returns the rule's conclusion.
    #[must_use]
    pub fn conclusion(&self) -> &Conclusion {
        match self {
            Self::Unary { conclusion, .. }
            | Self::Join { conclusion, .. }
            | Self::Run { conclusion, .. }
            | Self::RunForFailure { conclusion, .. } => conclusion,
        }
    }

    /// Returns the number of substitution slots the rule needs.
    #[must_use]
    pub fn slot_count(&self) -> usize {
        let mut slots = Vec::new();
        match self {
            Self::Unary { premise, .. } => premise_slots(premise, &mut slots),
            Self::Join { vars, premise, .. } => {
                slots.extend(vars);
                premise_slots(premise, &mut slots);
            }
            Self::Run {
                vars, instructions, ..
            }
            | Self::RunForFailure {
                vars, instructions, ..
            } => {
                slots.extend(vars);
                for instruction in instructions {
                    slots.extend(instruction.reads());
                    slots.extend(instruction.binds());
                }
            }
        }
        for pattern in self.conclusion().patterns() {
            pattern.collect_slots(&mut slots);
        }
        slots.into_iter().max().map_or(0, |max| max + 1)
    }

    /// Checks that every slot is bound before it is read.
    fn validate(&self) -> Result<()> {
        let mut bound = BTreeSet::new();
        match self {
            Self::Unary { premise, .. } => {
                bind_premise(premise, &mut bound);
            }
            Self::Join {
                vars,
                shared,
                premise,
                ..
            } => {
                if *shared > vars.len() || *shared > premise.args.len() {
                    return Err(Error::malformed(format!(
                        "join shares {shared} positions but binds {} and matches {}",
                        vars.len(),
                        premise.args.len()
                    )));
                }
                for (i, (&var, arg)) in vars.iter().zip(&premise.args).take(*shared).enumerate() {
                    if *arg != Pattern::var(var) {
                        return Err(Error::malformed(format!(
                            "join premise position {i} must be slot {var}"
                        )));
                    }
                }
                bound.extend(vars);
                bind_premise(premise, &mut bound);
            }
            Self::Run {
                vars, instructions, ..
            }
            | Self::RunForFailure {
                vars, instructions, ..
            } => {
                bound.extend(vars);
                let mut depth = 0usize;
                for (pc, instruction) in instructions.iter().enumerate() {
                    if let Instruction::Const { value } = instruction {
                        if !value.is_ground() {
                            return Err(Error::malformed(format!(
                                "constant at instruction {pc} is not ground"
                            )));
                        }
                    }
                    if let Some(slot) = instruction.reads() {
                        if !bound.contains(&slot) {
                            return Err(Error::malformed(format!(
                                "instruction {pc} loads unbound slot {slot}"
                            )));
                        }
                    }
                    let (pops, pushes) = instruction.stack_effect();
                    depth = depth.checked_sub(pops).ok_or_else(|| {
                        Error::malformed(format!("stack underflow at instruction {pc}"))
                    })? + pushes;
                    bound.extend(instruction.binds());
                }
                if matches!(self, Self::RunForFailure { .. }) {
                    bound = vars.iter().copied().collect();
                }
            }
        }

        let conclusion = self.conclusion();
        for pattern in conclusion.patterns() {
            if pattern.has_wildcard() {
                return Err(Error::malformed(format!(
                    "conclusion {} contains a wildcard",
                    conclusion.name()
                )));
            }
            let mut slots = Vec::new();
            pattern.collect_slots(&mut slots);
            if let Some(slot) = slots.into_iter().find(|slot| !bound.contains(slot)) {
                return Err(Error::malformed(format!(
                    "conclusion {} uses unbound slot {slot}",
                    conclusion.name()
                )));
            }
        }
        Ok(())
    }
}

fn premise_slots(premise: &Premise, out: &mut Vec<usize>) {
    for pattern in premise.args.iter().chain(std::iter::once(&premise.value)) {
        pattern.collect_slots(out);
    }
}

fn bind_premise(premise: &Premise, bound: &mut BTreeSet<usize>) {
    let mut slots = Vec::new();
    premise_slots(premise, &mut slots);
    bound.extend(slots);
}

/// A complete compiled program.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    /// Zero-arity intermediates asserted before saturation starts.
    #[serde(default)]
    pub seeds: Vec<Arc<str>>,
    /// The rules.
    #[serde(default)]
    pub rules: Vec<Rule>,
    /// Zero-arity intermediates every solution must derive.
    #[serde(default)]
    pub demands: Vec<Arc<str>>,
    /// Zero-arity intermediates no solution may derive.
    #[serde(default)]
    pub forbids: Vec<Arc<str>>,
}

impl Program {
    /// Creates an empty program.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks every rule's slot discipline.
    ///
    /// # Errors
    ///
    /// Returns a malformed-program error naming the first offending rule.
    pub fn validate(&self) -> Result<()> {
        for (index, rule) in self.rules.iter().enumerate() {
            rule.validate().map_err(|err| {
                err.with_context(ErrorContext::new().with_frame(format!("rule {index}")))
            })?;
        }
        Ok(())
    }
}
