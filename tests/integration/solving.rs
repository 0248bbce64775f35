//! Solving through sessions

use std::collections::BTreeSet;

use choicelog_runtime::{Fact, JsonTerm, Session};
use serde_json::json;

use crate::programs;

fn all_solutions(program: &choicelog_language::Program) -> (Vec<Vec<Fact>>, Session) {
    let mut session = Session::new(program).unwrap();
    let solutions = session.solutions().collect::<Result<Vec<_>, _>>().unwrap();
    (solutions, session)
}

#[test]
fn open_choice_over_two_values_has_two_solutions() {
    let (solutions, session) = all_solutions(&programs::coin());
    assert_eq!(solutions.len(), 2);

    let unique: BTreeSet<String> = solutions
        .iter()
        .map(|facts| serde_json::to_string(facts).unwrap())
        .collect();
    assert_eq!(unique.len(), 2);

    let stats = session.stats();
    assert_eq!(stats.solutions, 2);
    assert_eq!(stats.branches, 3);
    assert_eq!(stats.dead_ends, 1);
}

#[test]
fn solutions_serialize_as_host_facts() {
    let (solutions, _) = all_solutions(&programs::coin());
    let mut values: Vec<serde_json::Value> = solutions
        .iter()
        .map(|facts| serde_json::to_value(facts).unwrap())
        .collect();
    values.sort_by_key(ToString::to_string);

    assert_eq!(
        values,
        vec![
            json!([{"name": "coin", "args": [], "value": {"name": "heads"}}]),
            json!([{"name": "coin", "args": [], "value": {"name": "tails"}}]),
        ]
    );
}

#[test]
fn always_true_forbid_has_no_solutions() {
    let (solutions, session) = all_solutions(&programs::always_forbidden());
    assert!(solutions.is_empty());
    assert!(session.is_exhausted());
}

#[test]
fn unmet_demand_has_no_solutions() {
    let (solutions, _) = all_solutions(&programs::unmet_demand());
    assert!(solutions.is_empty());
}

#[test]
fn demand_selects_matching_branch() {
    let (solutions, _) = all_solutions(&programs::demands_heads());
    assert_eq!(solutions.len(), 1);
    assert_eq!(solutions[0][0].value, JsonTerm::atom("heads"));
}

#[test]
fn closed_single_candidate_does_not_branch() {
    let (solutions, session) = all_solutions(&programs::single_candidate());
    assert_eq!(solutions.len(), 1);
    assert_eq!(solutions[0][0].value, JsonTerm::atom("one"));
    assert_eq!(session.stats().branches, 0);
    assert_eq!(session.stats().dead_ends, 0);
}

#[test]
fn conflicting_facts_have_no_solutions() {
    let (solutions, session) = all_solutions(&programs::conflicting_facts());
    assert!(solutions.is_empty());
    assert_eq!(session.stats().dead_ends, 1);
}

#[test]
fn run_for_failure_fires_only_without_outcomes() {
    let names = |left, right| -> Vec<String> {
        let (solutions, _) = all_solutions(&programs::compare(left, right));
        assert_eq!(solutions.len(), 1);
        solutions[0].iter().map(|fact| fact.name.to_string()).collect()
    };

    assert_eq!(names(3, 3), vec!["equal"]);
    assert_eq!(names(3, 4), vec!["distinct"]);
}

#[test]
fn integers_past_machine_width_survive() {
    let (solutions, _) = all_solutions(&programs::big_sum());
    let total = serde_json::to_value(&solutions[0][0].value).unwrap();
    assert_eq!(total, json!("9223372036854775808"));
}

#[test]
fn small_steps_find_the_same_solutions() {
    let (expected, _) = all_solutions(&programs::coin());

    let mut session = Session::new(&programs::coin()).unwrap();
    let mut found = Vec::new();
    let mut steps = 0;
    loop {
        let report = session.step(1).unwrap();
        steps += 1;
        found.extend(report.solution);
        if report.exhausted {
            break;
        }
    }

    assert_eq!(found, expected);
    assert!(steps > found.len());
}
