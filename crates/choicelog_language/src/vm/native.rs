//! Built-in operators for the stack machine.
//!
//! Every operator returns `None` when its preconditions are unmet (wrong
//! term kind, negative natural). The machine treats that as a dead path,
//! never as an error.

mod math;
mod string;

pub(crate) use math::{compare, difference, nat_pred, nat_succ, product, sum};
pub(crate) use string::{concat, split_template};

use choicelog_foundation::{TermId, TermStore, TermView};

/// Applies a constructor to already-built arguments.
pub(crate) fn build(store: &mut TermStore, name: &str, args: Vec<TermId>) -> TermId {
    store.intern(TermView::Const {
        name: name.into(),
        args,
    })
}
