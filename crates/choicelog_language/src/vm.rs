//! Stack machine for built-in predicates.
//!
//! A `Run` rule hands the machine its instruction list and the substitution
//! produced by matching the rule's intermediate tuple. Execution is
//! nondeterministic: [`Instruction::Split`] forks one path per segmentation,
//! and a path that reaches the end of the list yields its substitution as an
//! outcome. Guards and failed operator preconditions end a path quietly.
//!
//! Only malformed code (loading an unbound slot, stack underflow, a
//! non-ground constant) is reported as an error.

mod native;

use choicelog_foundation::{Error, Result, TermId, TermStore};

use crate::opcode::Instruction;
use crate::pattern::Substitution;

/// Stack machine bound to a term store.
pub struct Vm<'a> {
    store: &'a mut TermStore,
}

impl<'a> Vm<'a> {
    /// Creates a machine that interns its results into `store`.
    pub fn new(store: &'a mut TermStore) -> Self {
        Self { store }
    }

    /// Runs `code` from `subst` and returns every successful outcome, in
    /// enumeration order.
    ///
    /// # Errors
    ///
    /// Returns a malformed-program error if the code reads an unbound slot,
    /// underflows the stack, or pushes a non-ground constant.
    pub fn run(&mut self, code: &[Instruction], subst: Substitution) -> Result<Vec<Substitution>> {
        let mut outcomes = Vec::new();
        self.exec(code, 0, Vec::new(), subst, &mut outcomes)?;
        Ok(outcomes)
    }

    /// Returns true if `code` has at least one successful outcome.
    ///
    /// # Errors
    ///
    /// As for [`Vm::run`].
    pub fn succeeds(&mut self, code: &[Instruction], subst: Substitution) -> Result<bool> {
        Ok(!self.run(code, subst)?.is_empty())
    }

    fn exec(
        &mut self,
        code: &[Instruction],
        mut pc: usize,
        mut stack: Vec<TermId>,
        mut subst: Substitution,
        out: &mut Vec<Substitution>,
    ) -> Result<()> {
        macro_rules! guard {
            ($cond:expr) => {
                if !$cond {
                    return Ok(());
                }
            };
        }
        macro_rules! check {
            ($opt:expr) => {
                match $opt {
                    Some(value) => value,
                    None => return Ok(()),
                }
            };
        }

        while let Some(instruction) = code.get(pc) {
            pc += 1;

            match instruction {
                Instruction::Const { value } => {
                    let term = value.to_term(self.store)?;
                    stack.push(term);
                }
                Instruction::Load { slot } => {
                    let term = subst.get(*slot).ok_or_else(|| {
                        Error::malformed(format!("load of unbound slot {slot} at {}", pc - 1))
                    })?;
                    stack.push(term);
                }
                Instruction::Store { slot } => {
                    let term = pop(&mut stack, pc)?;
                    guard!(subst.bind(*slot, term));
                }

                // Guards
                Instruction::Equal => {
                    let (a, b) = pop2(&mut stack, pc)?;
                    guard!(a == b);
                }
                Instruction::NotEqual => {
                    let (a, b) = pop2(&mut stack, pc)?;
                    guard!(a != b);
                }
                Instruction::Gt => {
                    let (a, b) = pop2(&mut stack, pc)?;
                    guard!(check!(native::compare(self.store, a, b)).is_gt());
                }
                Instruction::Geq => {
                    let (a, b) = pop2(&mut stack, pc)?;
                    guard!(check!(native::compare(self.store, a, b)).is_ge());
                }
                Instruction::Lt => {
                    let (a, b) = pop2(&mut stack, pc)?;
                    guard!(check!(native::compare(self.store, a, b)).is_lt());
                }
                Instruction::Leq => {
                    let (a, b) = pop2(&mut stack, pc)?;
                    guard!(check!(native::compare(self.store, a, b)).is_le());
                }

                // Arithmetic
                Instruction::Plus { arity } => {
                    let args = pop_n(&mut stack, *arity, pc)?;
                    stack.push(check!(native::sum(self.store, &args)));
                }
                Instruction::Minus => {
                    let (a, b) = pop2(&mut stack, pc)?;
                    stack.push(check!(native::difference(self.store, a, b)));
                }
                Instruction::Times { arity } => {
                    let args = pop_n(&mut stack, *arity, pc)?;
                    stack.push(check!(native::product(self.store, &args)));
                }

                // Constructors
                Instruction::BoolTrue => stack.push(TermId::TRUE),
                Instruction::BoolFalse => stack.push(TermId::FALSE),
                Instruction::NatZero => stack.push(self.store.int(0)),
                Instruction::NatSucc => {
                    let n = pop(&mut stack, pc)?;
                    stack.push(check!(native::nat_succ(self.store, n)));
                }
                Instruction::NatPred => {
                    let n = pop(&mut stack, pc)?;
                    stack.push(check!(native::nat_pred(self.store, n)));
                }
                Instruction::Build { name, arity } => {
                    let args = pop_n(&mut stack, *arity, pc)?;
                    stack.push(native::build(self.store, name, args));
                }

                // Strings
                Instruction::Concat { arity } => {
                    let args = pop_n(&mut stack, *arity, pc)?;
                    stack.push(check!(native::concat(self.store, &args)));
                }
                Instruction::Split { parts } => {
                    let subject = pop(&mut stack, pc)?;
                    let rows = check!(native::split_template(self.store, parts, &subst, subject));
                    'rows: for row in rows {
                        let mut branch = subst.clone();
                        for (slot, piece) in row {
                            let term = self.store.string(&piece);
                            if !branch.bind(slot, term) {
                                continue 'rows;
                            }
                        }
                        self.exec(code, pc, stack.clone(), branch, out)?;
                    }
                    return Ok(());
                }

                Instruction::Fail => return Ok(()),
            }
        }

        out.push(subst);
        Ok(())
    }
}

fn underflow(pc: usize) -> Error {
    Error::malformed(format!("stack underflow at instruction {}", pc - 1))
}

fn pop(stack: &mut Vec<TermId>, pc: usize) -> Result<TermId> {
    stack.pop().ok_or_else(|| underflow(pc))
}

/// Pops `[a, b]` with `b` on top.
fn pop2(stack: &mut Vec<TermId>, pc: usize) -> Result<(TermId, TermId)> {
    let b = pop(stack, pc)?;
    let a = pop(stack, pc)?;
    Ok((a, b))
}

/// Pops the top `n` values, returned bottom first.
fn pop_n(stack: &mut Vec<TermId>, n: usize, pc: usize) -> Result<Vec<TermId>> {
    let at = stack.len().checked_sub(n).ok_or_else(|| underflow(pc))?;
    Ok(stack.split_off(at))
}
