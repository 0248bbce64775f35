//! Integration tests for the choice-tree search controller

use std::collections::BTreeSet;

use choicelog_engine::{Solution, Solver, SolverConfig, Step};
use choicelog_foundation::TermStore;
use choicelog_language::{Pattern, Premise, Program, Rule};
use proptest::prelude::*;

use crate::programs::{choice, independent_coins, intermediate, on_go, seeded, triangle_coloring};

/// Renders each solution as a sorted list of `name(args) = value` lines.
fn render(store: &TermStore, solution: &Solution) -> Vec<String> {
    solution
        .facts()
        .iter()
        .map(|f| {
            let args: Vec<String> = f.args.iter().map(|&a| store.display(a).to_string()).collect();
            format!("{}({}) = {}", f.name, args.join(", "), store.display(f.value))
        })
        .collect()
}

fn solve_all(program: &Program, seed: u64) -> (Vec<Vec<String>>, Solver) {
    let mut solver = Solver::new(program, SolverConfig::new().with_seed(seed)).unwrap();
    let mut rendered = Vec::new();
    while let Some(solution) = solver.next() {
        rendered.push(render(solver.store(), &solution.unwrap()));
    }
    (rendered, solver)
}

#[test]
fn triangle_has_six_colorings() {
    let (solutions, solver) = solve_all(&triangle_coloring(), 0);
    assert_eq!(solutions.len(), 6);

    let unique: BTreeSet<_> = solutions.iter().collect();
    assert_eq!(unique.len(), 6);
    for solution in &solutions {
        let colors: BTreeSet<&str> = solution
            .iter()
            .filter(|line| line.starts_with("color"))
            .map(|line| line.rsplit(" = ").next().unwrap())
            .collect();
        assert_eq!(colors.len(), 3);
    }

    let stats = solver.stats();
    assert_eq!(stats.solutions, 6);
    assert!(stats.dead_ends > 0);
    assert!(solver.is_exhausted());
}

#[test]
fn independent_open_choices_multiply() {
    let (solutions, solver) = solve_all(&independent_coins(3), 5);
    assert_eq!(solutions.len(), 8);
    assert_eq!(solutions.iter().collect::<BTreeSet<_>>().len(), 8);
    // Every leaf below a "none of these" branch stays narrowed and dies.
    assert_eq!(solver.stats().dead_ends, 27 - 8);
    assert_eq!(solver.stats().branches, 3 + 9 + 27);
}

#[test]
fn closed_single_candidate_never_branches() {
    let program = seeded(vec![on_go(choice("only", vec![], &["one"], true))]);
    let (solutions, solver) = solve_all(&program, 0);
    assert_eq!(solutions, vec![vec!["only() = one".to_string()]]);
    assert_eq!(solver.stats().branches, 0);
    assert_eq!(solver.stats().dead_ends, 0);
}

#[test]
fn demand_must_be_derived() {
    let justified = seeded(vec![
        on_go(choice("p", vec![], &["a"], false)),
        Rule::Unary {
            premise: Premise {
                name: "p".into(),
                args: vec![],
                value: Pattern::atom("a"),
            },
            conclusion: intermediate("$ok", vec![]),
        },
    ]);
    let mut with_demand = justified.clone();
    with_demand.demands.push("$ok".into());
    assert_eq!(solve_all(&with_demand, 0).0.len(), 1);

    let mut unreachable = justified;
    unreachable.demands.push("$never".into());
    assert_eq!(solve_all(&unreachable, 0).0.len(), 0);
}

#[test]
fn budgets_bound_each_step() {
    let mut solver = Solver::new(&triangle_coloring(), SolverConfig::default()).unwrap();
    let mut last = 0;
    loop {
        let step = solver.step(2).unwrap();
        let cycles = solver.stats().cycles;
        assert!(cycles - last <= 2);
        last = cycles;
        if matches!(step, Step::Exhausted) {
            break;
        }
    }
    assert_eq!(solver.stats().solutions, 6);
}

#[test]
fn jittered_budgets_find_the_same_solutions() {
    let config = SolverConfig::new().with_seed(9).with_budget_jitter(true);
    let mut solver = Solver::new(&independent_coins(2), config).unwrap();
    let mut found = 0;
    while !solver.is_exhausted() {
        if let Step::Solution(_) = solver.step(3).unwrap() {
            found += 1;
        }
    }
    assert_eq!(found, 4);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn every_seed_finds_the_same_models(seed in any::<u64>()) {
        let (mut solutions, _) = solve_all(&independent_coins(2), seed);
        let (mut reference, _) = solve_all(&independent_coins(2), 0);
        solutions.sort();
        reference.sort();
        prop_assert_eq!(solutions, reference);
    }

    #[test]
    fn a_seed_replays_exactly(seed in any::<u64>()) {
        let (first, _) = solve_all(&triangle_coloring(), seed);
        let (second, _) = solve_all(&triangle_coloring(), seed);
        prop_assert_eq!(first, second);
    }
}
