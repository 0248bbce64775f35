//! Compiled rules and the indexes that trigger them.
//!
//! A [`RuleSet`] is built once per session. Patterns are interned against
//! the session's term store, and every rule is indexed by the predicate or
//! intermediate whose new tuples can make it fire. A join appears in both
//! indexes because either side of it can arrive first.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use choicelog_foundation::{Result, TermStore};
use choicelog_language::{
    CompiledPattern, Conclusion, Instruction, Pattern, Premise, Program, Rule,
};

// =============================================================================
// Compiled Rule
// =============================================================================

/// A premise with interned patterns.
#[derive(Clone, Debug)]
pub struct CompiledPremise {
    /// Predicate name.
    pub name: Arc<str>,
    /// Argument patterns.
    pub args: Vec<CompiledPattern>,
    /// Value pattern.
    pub value: CompiledPattern,
}

impl CompiledPremise {
    fn compile(premise: &Premise, store: &mut TermStore) -> Self {
        Self {
            name: premise.name.clone(),
            args: premise.args.iter().map(|p| p.compile(store)).collect(),
            value: premise.value.compile(store),
        }
    }
}

/// A conclusion with interned patterns.
#[derive(Clone, Debug)]
pub enum CompiledConclusion {
    /// Derive an intermediate tuple.
    Intermediate {
        /// Intermediate name.
        name: Arc<str>,
        /// Argument patterns.
        args: Vec<CompiledPattern>,
    },
    /// Derive a definite fact.
    Fact {
        /// Predicate name.
        name: Arc<str>,
        /// Argument patterns.
        args: Vec<CompiledPattern>,
        /// Value pattern.
        value: CompiledPattern,
    },
    /// Register a choice.
    Choice {
        /// Predicate name.
        name: Arc<str>,
        /// Argument patterns.
        args: Vec<CompiledPattern>,
        /// Candidate value patterns.
        values: Vec<CompiledPattern>,
        /// Closed choice.
        exhaustive: bool,
    },
}

impl CompiledConclusion {
    fn compile(conclusion: &Conclusion, store: &mut TermStore) -> Self {
        let compile_all = |ps: &[Pattern], store: &mut TermStore| -> Vec<CompiledPattern> {
            ps.iter().map(|p| p.compile(store)).collect()
        };
        match conclusion {
            Conclusion::Intermediate { name, args } => Self::Intermediate {
                name: name.clone(),
                args: compile_all(args, store),
            },
            Conclusion::Fact { name, args, value } => Self::Fact {
                name: name.clone(),
                args: compile_all(args, store),
                value: value.compile(store),
            },
            Conclusion::Choice {
                name,
                args,
                values,
                exhaustive,
            } => Self::Choice {
                name: name.clone(),
                args: compile_all(args, store),
                values: compile_all(values, store),
                exhaustive: *exhaustive,
            },
        }
    }
}

/// The body of a compiled rule.
#[derive(Clone, Debug)]
pub enum CompiledRuleBody {
    /// Fires on base facts.
    Unary {
        /// The premise.
        premise: CompiledPremise,
    },
    /// Joins an intermediate with a base fact.
    Join {
        /// Intermediate name.
        intermediate: Arc<str>,
        /// Slots bound by the intermediate's arguments.
        vars: Vec<usize>,
        /// Length of the shared index prefix.
        shared: usize,
        /// The base-fact premise.
        premise: CompiledPremise,
    },
    /// Runs the stack machine on intermediate tuples.
    Run {
        /// Intermediate name.
        intermediate: Arc<str>,
        /// Slots bound by the intermediate's arguments.
        vars: Vec<usize>,
        /// Stack-machine code.
        instructions: Vec<Instruction>,
        /// Fire on failure instead of once per outcome.
        for_failure: bool,
    },
}

/// A compiled rule ready for execution.
#[derive(Clone, Debug)]
pub struct CompiledRule {
    /// Position of the rule in the program.
    pub index: usize,
    /// Substitution size.
    pub slots: usize,
    /// What triggers the rule and how it matches.
    pub body: CompiledRuleBody,
    /// What the rule derives.
    pub conclusion: CompiledConclusion,
}

impl CompiledRule {
    /// Compiles one rule against `store`.
    pub fn compile(index: usize, rule: &Rule, store: &mut TermStore) -> Self {
        let body = match rule {
            Rule::Unary { premise, .. } => CompiledRuleBody::Unary {
                premise: CompiledPremise::compile(premise, store),
            },
            Rule::Join {
                intermediate,
                vars,
                shared,
                premise,
                ..
            } => CompiledRuleBody::Join {
                intermediate: intermediate.clone(),
                vars: vars.clone(),
                shared: *shared,
                premise: CompiledPremise::compile(premise, store),
            },
            Rule::Run {
                intermediate,
                vars,
                instructions,
                ..
            } => CompiledRuleBody::Run {
                intermediate: intermediate.clone(),
                vars: vars.clone(),
                instructions: instructions.clone(),
                for_failure: false,
            },
            Rule::RunForFailure {
                intermediate,
                vars,
                instructions,
                ..
            } => CompiledRuleBody::Run {
                intermediate: intermediate.clone(),
                vars: vars.clone(),
                instructions: instructions.clone(),
                for_failure: true,
            },
        };
        Self {
            index,
            slots: rule.slot_count(),
            body,
            conclusion: CompiledConclusion::compile(rule.conclusion(), store),
        }
    }
}

// =============================================================================
// Rule Set
// =============================================================================

/// Every compiled rule of a program, indexed by trigger.
#[derive(Clone, Debug, Default)]
pub struct RuleSet {
    rules: Vec<CompiledRule>,
    on_fact: HashMap<Arc<str>, Vec<usize>>,
    on_intermediate: HashMap<Arc<str>, Vec<usize>>,
    seeds: Vec<Arc<str>>,
    demands: Vec<Arc<str>>,
    forbids: HashSet<Arc<str>>,
}

impl RuleSet {
    /// Validates and compiles a program.
    ///
    /// # Errors
    ///
    /// Returns a malformed-program error if validation fails.
    pub fn compile(program: &Program, store: &mut TermStore) -> Result<Self> {
        program.validate()?;

        let mut set = Self {
            seeds: program.seeds.clone(),
            demands: program.demands.clone(),
            forbids: program.forbids.iter().cloned().collect(),
            ..Self::default()
        };

        for (index, rule) in program.rules.iter().enumerate() {
            let compiled = CompiledRule::compile(index, rule, store);
            match &compiled.body {
                CompiledRuleBody::Unary { premise } => {
                    set.on_fact.entry(premise.name.clone()).or_default().push(index);
                }
                CompiledRuleBody::Join {
                    intermediate,
                    premise,
                    ..
                } => {
                    set.on_fact.entry(premise.name.clone()).or_default().push(index);
                    set.on_intermediate
                        .entry(intermediate.clone())
                        .or_default()
                        .push(index);
                }
                CompiledRuleBody::Run { intermediate, .. } => {
                    set.on_intermediate
                        .entry(intermediate.clone())
                        .or_default()
                        .push(index);
                }
            }
            set.rules.push(compiled);
        }

        Ok(set)
    }

    /// Returns the rules triggered by a new base fact of `name`.
    pub fn on_fact<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a CompiledRule> + use<'a> {
        self.triggered(self.on_fact.get(name))
    }

    /// Returns the rules triggered by a new tuple of intermediate `name`.
    pub fn on_intermediate<'a>(
        &'a self,
        name: &str,
    ) -> impl Iterator<Item = &'a CompiledRule> + use<'a> {
        self.triggered(self.on_intermediate.get(name))
    }

    fn triggered<'a>(
        &'a self,
        indexes: Option<&'a Vec<usize>>,
    ) -> impl Iterator<Item = &'a CompiledRule> + use<'a> {
        indexes
            .into_iter()
            .flatten()
            .map(move |&index| &self.rules[index])
    }

    /// Returns the number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if there are no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Zero-arity intermediates asserted at the start.
    #[must_use]
    pub fn seeds(&self) -> &[Arc<str>] {
        &self.seeds
    }

    /// Zero-arity intermediates every solution must derive.
    #[must_use]
    pub fn demands(&self) -> &[Arc<str>] {
        &self.demands
    }

    /// Returns true if deriving `name` kills the leaf.
    #[must_use]
    pub fn is_forbidden(&self, name: &str) -> bool {
        self.forbids.contains(name)
    }
}
