//! Integer and natural-number operators.

use std::cmp::Ordering;

use num_bigint::BigInt;
use num_traits::{One, Signed, Zero};

use choicelog_foundation::{TermId, TermStore};

fn int(store: &TermStore, term: TermId) -> Option<&BigInt> {
    store.expose(term).as_int()
}

fn ints(store: &TermStore, terms: &[TermId]) -> Option<Vec<BigInt>> {
    terms.iter().map(|&t| int(store, t).cloned()).collect()
}

/// Three-way integer comparison.
pub(crate) fn compare(store: &TermStore, a: TermId, b: TermId) -> Option<Ordering> {
    Some(int(store, a)?.cmp(int(store, b)?))
}

/// Sum of integers. The empty sum is zero.
pub(crate) fn sum(store: &mut TermStore, terms: &[TermId]) -> Option<TermId> {
    let total = ints(store, terms)?
        .into_iter()
        .fold(BigInt::zero(), |acc, n| acc + n);
    Some(store.int(total))
}

/// Product of integers. The empty product is one.
pub(crate) fn product(store: &mut TermStore, terms: &[TermId]) -> Option<TermId> {
    let total = ints(store, terms)?
        .into_iter()
        .fold(BigInt::one(), |acc, n| acc * n);
    Some(store.int(total))
}

/// `a - b`.
pub(crate) fn difference(store: &mut TermStore, a: TermId, b: TermId) -> Option<TermId> {
    let n = int(store, a)? - int(store, b)?;
    Some(store.int(n))
}

/// `n + 1` for a natural `n`.
pub(crate) fn nat_succ(store: &mut TermStore, n: TermId) -> Option<TermId> {
    let n = int(store, n)?;
    if n.is_negative() {
        return None;
    }
    let next = n + BigInt::one();
    Some(store.int(next))
}

/// `n - 1` for a positive natural `n`.
pub(crate) fn nat_pred(store: &mut TermStore, n: TermId) -> Option<TermId> {
    let n = int(store, n)?;
    if !n.is_positive() {
        return None;
    }
    let prev = n - BigInt::one();
    Some(store.int(prev))
}
