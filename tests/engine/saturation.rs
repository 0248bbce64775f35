//! Integration tests for saturating a single leaf

use choicelog_engine::{Examination, Leaf, RuleSet};
use choicelog_foundation::{TermId, TermStore};
use choicelog_language::{Instruction, Pattern, SplitPart};
use choicelog_storage::Constraint;

use crate::programs::{fact, reachability, run_on_go, seeded};

fn saturated(program: &choicelog_language::Program, store: &mut TermStore) -> (RuleSet, Leaf) {
    let rules = RuleSet::compile(program, store).unwrap();
    let mut leaf = Leaf::seeded(&rules).unwrap();
    leaf.saturate(&rules, store).unwrap();
    (rules, leaf)
}

#[test]
fn transitive_closure() {
    let mut store = TermStore::new();
    let (rules, mut leaf) = saturated(&reachability(), &mut store);
    let [a, b, c, d] = ["a", "b", "c", "d"].map(|n| store.constant(n, vec![]));

    let reachable = |x, y| leaf.database().get("path", &[x, y]).is_some();
    for (x, y) in [(a, b), (a, c), (a, d), (b, c), (b, d), (c, d)] {
        assert!(reachable(x, y));
    }
    assert!(!reachable(b, a));
    assert!(!reachable(a, a));
    assert_eq!(leaf.database().relation("path").unwrap().fixed_count(), 6);

    assert!(leaf.is_saturated());
    assert!(matches!(leaf.examine(&rules).unwrap(), Examination::Solution));
}

#[test]
fn saturation_is_idempotent() {
    let mut store = TermStore::new();
    let (rules, mut leaf) = saturated(&reachability(), &mut store);
    let before = leaf.database().facts();
    assert_eq!(leaf.saturate(&rules, &mut store).unwrap(), 0);
    assert_eq!(leaf.database().facts(), before);
}

#[test]
fn run_rules_split_strings() {
    let program = seeded(vec![run_on_go(
        vec![
            Instruction::Const {
                value: Pattern::string("key=value"),
            },
            Instruction::Split {
                parts: vec![
                    SplitPart::Slot { slot: 0 },
                    SplitPart::Literal { text: "=".into() },
                    SplitPart::Slot { slot: 1 },
                ],
            },
        ],
        fact("setting", vec![Pattern::var(0)], Pattern::var(1)),
    )]);

    let mut store = TermStore::new();
    let (_, leaf) = saturated(&program, &mut store);
    let key = store.string("key");
    let value = store.string("value");
    assert_eq!(
        leaf.database().get("setting", &[key]),
        Some(&Constraint::Just(value))
    );
}

#[test]
fn every_split_outcome_fires() {
    let program = seeded(vec![run_on_go(
        vec![
            Instruction::Const {
                value: Pattern::string("ab"),
            },
            Instruction::Split {
                parts: vec![SplitPart::Slot { slot: 0 }, SplitPart::Slot { slot: 1 }],
            },
        ],
        fact("cut", vec![Pattern::var(0), Pattern::var(1)], Pattern::Trivial),
    )]);

    let mut store = TermStore::new();
    let (_, leaf) = saturated(&program, &mut store);
    assert_eq!(leaf.database().facts().len(), 3);
    assert!(leaf.database().facts().iter().all(|f| f.value == TermId::TRIVIAL));
}

#[test]
fn snapshots_are_independent() {
    let mut store = TermStore::new();
    let (rules, root) = saturated(&reachability(), &mut store);
    let [d, e] = ["d", "e"].map(|n| store.constant(n, vec![]));

    let mut extended = root.clone();
    extended
        .assert_fact("edge".into(), vec![d, e], TermId::TRIVIAL)
        .unwrap();
    extended.saturate(&rules, &mut store).unwrap();

    assert_eq!(extended.database().relation("path").unwrap().fixed_count(), 10);
    assert_eq!(root.database().relation("path").unwrap().fixed_count(), 6);
}
