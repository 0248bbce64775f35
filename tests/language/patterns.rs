//! Integration tests for pattern matching and instantiation

use choicelog_foundation::{TermId, TermStore};
use choicelog_language::{Pattern, Substitution};

#[test]
fn nested_match_binds_and_rebuilds() {
    let mut store = TermStore::new();
    let pattern = Pattern::constant("edge", vec![Pattern::var(0), Pattern::var(1)]);
    let compiled = pattern.compile(&mut store);

    let a = store.constant("a", vec![]);
    let b = store.constant("b", vec![]);
    let term = store.constant("edge", vec![a, b]);

    let mut subst = Substitution::with_slots(2);
    assert!(subst.matches(&compiled, term, &store));
    assert_eq!(subst.get(0), Some(a));
    assert_eq!(subst.get(1), Some(b));
    assert_eq!(subst.instantiate(&compiled, &mut store).unwrap(), term);
}

#[test]
fn repeated_variable_requires_equal_terms() {
    let mut store = TermStore::new();
    let compiled = Pattern::constant("same", vec![Pattern::var(0), Pattern::var(0)]).compile(&mut store);
    let x = store.int(1);
    let y = store.int(2);
    let same = store.constant("same", vec![x, x]);
    let differ = store.constant("same", vec![x, y]);

    assert!(Substitution::with_slots(1).matches(&compiled, same, &store));
    assert!(!Substitution::with_slots(1).matches(&compiled, differ, &store));
}

#[test]
fn wildcards_match_anything_but_cannot_be_built() {
    let mut store = TermStore::new();
    let compiled = Pattern::Wildcard.compile(&mut store);
    let mut subst = Substitution::default();
    assert!(subst.matches(&compiled, TermId::TRUE, &store));
    assert!(subst.instantiate(&compiled, &mut store).is_err());
}

#[test]
fn ground_patterns_intern_once() {
    let mut store = TermStore::new();
    let p = Pattern::constant("f", vec![Pattern::int(3), Pattern::string("s")]);
    let direct = p.to_term(&mut store).unwrap();
    let via_subst = Substitution::default()
        .instantiate(&p.compile(&mut store), &mut store)
        .unwrap();
    assert_eq!(direct, via_subst);
}

#[test]
fn arity_mismatch_does_not_match() {
    let mut store = TermStore::new();
    let patterns = [Pattern::var(0).compile(&mut store)];
    let one = store.int(1);
    assert!(!Substitution::with_slots(1).matches_all(&patterns, &[one, one], &store));
}
