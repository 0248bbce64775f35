//! String operators.

use choicelog_foundation::{TermId, TermStore};

use crate::opcode::SplitPart;
use crate::pattern::Substitution;
use crate::segment::{Segment, segmentations};

/// Concatenation of strings, in stack order.
pub(crate) fn concat(store: &mut TermStore, terms: &[TermId]) -> Option<TermId> {
    let mut out = String::new();
    for &term in terms {
        out.push_str(store.expose(term).as_str()?);
    }
    Some(store.string(&out))
}

/// Segments `subject` against `parts`, reading bound slots from `subst`.
///
/// Returns one row per segmentation, holding a `(slot, piece)` pair per slot
/// part in template order. `None` if the subject or a bound slot is not a
/// string.
pub(crate) fn split_template(
    store: &TermStore,
    parts: &[SplitPart],
    subst: &Substitution,
    subject: TermId,
) -> Option<Vec<Vec<(usize, String)>>> {
    let subject = store.expose(subject).as_str()?;

    let mut template = Vec::with_capacity(parts.len());
    let mut slots = Vec::new();
    for part in parts {
        match part {
            SplitPart::Literal { text } => template.push(Segment::Literal(text.as_str())),
            SplitPart::Slot { slot } => {
                slots.push(*slot);
                match subst.get(*slot) {
                    Some(bound) => template.push(Segment::Bound(store.expose(bound).as_str()?)),
                    None => template.push(Segment::Free),
                }
            }
        }
    }

    Some(
        segmentations(&template, subject)
            .map(|pieces| slots.iter().copied().zip(pieces).collect())
            .collect(),
    )
}
