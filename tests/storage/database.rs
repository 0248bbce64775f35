//! Integration tests for the fact database

use choicelog_foundation::{TermId, TermStore};
use choicelog_storage::{Constraint, Database};
use proptest::prelude::*;

fn atoms(store: &mut TermStore, names: &[&str]) -> Vec<TermId> {
    names.iter().map(|n| store.constant(n, vec![])).collect()
}

#[test]
fn counters_follow_replacements() {
    let mut store = TermStore::new();
    let ids = atoms(&mut store, &["a", "red"]);
    let (a, red) = (ids[0], ids[1]);

    let (db, _) = Database::new().set("color", &[a], Constraint::none_of([red])).unwrap();
    assert_eq!((db.fixed_count(), db.narrowing_count()), (0, 1));

    let blue = store.constant("blue", vec![]);
    let (db, previous) = db.set("color", &[a], Constraint::Just(blue)).unwrap();
    assert_eq!(previous, Some(Constraint::none_of([red])));
    assert_eq!((db.fixed_count(), db.narrowing_count()), (1, 0));
}

#[test]
fn prefix_visit_enumerates_free_suffix() {
    let mut store = TermStore::new();
    let ids = atoms(&mut store, &["a", "b", "c", "d"]);
    let (a, b, c, d) = (ids[0], ids[1], ids[2], ids[3]);

    let mut db = Database::new();
    for (x, y) in [(a, b), (a, c), (b, d)] {
        db = db.set("edge", &[x, y], Constraint::Just(TermId::TRIVIAL)).unwrap().0;
    }

    // edge(a, Y): one free argument plus the value.
    let from_a = db.visit("edge", &[a], 2);
    assert_eq!(
        from_a,
        vec![vec![b, TermId::TRIVIAL], vec![c, TermId::TRIVIAL]]
    );

    // edge(X, Y) at depth 2 stops at the second argument.
    assert_eq!(db.visit("edge", &[], 2), vec![vec![a, b], vec![a, c], vec![b, d]]);

    // Membership.
    assert_eq!(db.visit("edge", &[b, d], 0).len(), 1);
    assert!(db.visit("edge", &[b, c], 0).is_empty());
    assert!(db.visit("missing", &[], 1).is_empty());
}

#[test]
fn undetermined_entries_are_skipped_by_visit() {
    let mut store = TermStore::new();
    let ids = atoms(&mut store, &["x", "y", "on"]);
    let (db, _) = Database::new().set("p", &[ids[0]], Constraint::Just(ids[2])).unwrap();
    let (db, _) = db.set("p", &[ids[1]], Constraint::none_of([ids[2]])).unwrap();

    assert_eq!(db.visit("p", &[], 2), vec![vec![ids[0], ids[2]]]);
    assert_eq!(db.facts().len(), 1);
    assert_eq!(db.undetermined().len(), 1);
}

#[test]
fn facts_are_sorted_by_name_then_tuple() {
    let mut store = TermStore::new();
    let ids = atoms(&mut store, &["one", "two"]);
    let mut db = Database::new();
    db = db.set("z", &[ids[0]], Constraint::Just(TermId::TRUE)).unwrap().0;
    db = db.set("a", &[ids[1]], Constraint::Just(TermId::TRUE)).unwrap().0;
    db = db.set("a", &[ids[0]], Constraint::Just(TermId::FALSE)).unwrap().0;

    let facts: Vec<(String, TermId)> = db
        .facts()
        .into_iter()
        .map(|f| (f.name.to_string(), f.args[0]))
        .collect();
    assert_eq!(
        facts,
        vec![("a".into(), ids[0]), ("a".into(), ids[1]), ("z".into(), ids[0])]
    );
}

proptest! {
    #[test]
    fn snapshots_survive_updates(
        first in prop::collection::vec((0i64..20, 0i64..5), 1..40),
        second in prop::collection::vec((0i64..20, 0i64..5), 1..40),
    ) {
        let mut store = TermStore::new();
        let mut s1 = Database::new();
        for (k, v) in &first {
            let (k, v) = (store.int(*k), store.int(*v));
            s1 = s1.set("p", &[k], Constraint::Just(v)).unwrap().0;
        }
        let before = s1.facts();

        let mut s2 = s1.clone();
        for (k, v) in &second {
            let (k, v) = (store.int(*k), store.int(*v));
            s2 = s2.set("p", &[k], Constraint::Just(v)).unwrap().0;
        }

        prop_assert_eq!(s1.facts(), before);
        prop_assert!(s2.fixed_count() >= s1.fixed_count());
    }
}
