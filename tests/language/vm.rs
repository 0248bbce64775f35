//! Integration tests for the stack machine

use choicelog_foundation::{BigInt, TermStore};
use choicelog_language::{Instruction, Pattern, SplitPart, Substitution, Vm};

fn konst(value: Pattern) -> Instruction {
    Instruction::Const { value }
}

#[test]
fn split_then_rebuild() {
    let mut store = TermStore::new();
    let code = [
        konst(Pattern::string("a.b")),
        Instruction::Split {
            parts: vec![
                SplitPart::Slot { slot: 0 },
                SplitPart::Literal { text: ".".into() },
                SplitPart::Slot { slot: 1 },
            ],
        },
        Instruction::Load { slot: 1 },
        Instruction::Load { slot: 0 },
        Instruction::Concat { arity: 2 },
        Instruction::Store { slot: 2 },
    ];

    let outcomes = Vm::new(&mut store).run(&code, Substitution::with_slots(3)).unwrap();
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].get(2), Some(store.string("ba")));
}

#[test]
fn each_split_outcome_continues_independently() {
    let mut store = TermStore::new();
    // Keep only the splits whose halves differ.
    let code = [
        konst(Pattern::string("xxxx")),
        Instruction::Split {
            parts: vec![SplitPart::Slot { slot: 0 }, SplitPart::Slot { slot: 1 }],
        },
        Instruction::Load { slot: 0 },
        Instruction::Load { slot: 1 },
        Instruction::NotEqual,
    ];
    let outcomes = Vm::new(&mut store).run(&code, Substitution::with_slots(2)).unwrap();
    // Five cuts, minus the one where both halves are "xx".
    assert_eq!(outcomes.len(), 4);
}

#[test]
fn large_arithmetic_does_not_overflow() {
    let mut store = TermStore::new();
    let code = [
        konst(Pattern::int(i64::MAX)),
        konst(Pattern::int(i64::MAX)),
        Instruction::Times { arity: 2 },
        Instruction::Store { slot: 0 },
    ];
    let outcomes = Vm::new(&mut store).run(&code, Substitution::with_slots(1)).unwrap();
    let max = BigInt::from(i64::MAX);
    assert_eq!(outcomes[0].get(0), Some(store.int(&max * &max)));
}

#[test]
fn succeeds_reports_any_outcome() {
    let mut store = TermStore::new();
    let guard = [konst(Pattern::int(3)), konst(Pattern::int(3)), Instruction::Equal];
    let mut vm = Vm::new(&mut store);
    assert!(vm.succeeds(&guard, Substitution::default()).unwrap());
    assert!(!vm.succeeds(&[Instruction::Fail], Substitution::default()).unwrap());
}
