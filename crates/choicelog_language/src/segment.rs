//! Nondeterministic string segmentation.
//!
//! A template is a sequence of [`Segment`]s: literal separators, slots whose
//! string is already known, and free slots. [`segmentations`] enumerates
//! every way to cut a subject string consistent with the template.
//!
//! Order: the first free slot takes its shortest consistent piece first,
//! and for each choice the remaining free slots are enumerated the same
//! way, left to right. A free slot at the end of the template takes the
//! rest of the subject.

/// One piece of a segmentation template.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Text that must appear verbatim.
    Literal(&'a str),
    /// A slot whose string is already known; must appear verbatim.
    Bound(&'a str),
    /// A slot to be assigned.
    Free,
}

impl<'a> Segment<'a> {
    fn fixed(self) -> Option<&'a str> {
        match self {
            Self::Literal(s) | Self::Bound(s) => Some(s),
            Self::Free => None,
        }
    }
}

/// Every segmentation of a subject, in enumeration order.
///
/// Each item holds one string per non-literal segment (bound slots repeat
/// their known string), in template order.
#[derive(Clone, Debug)]
pub struct Segmentations {
    results: std::vec::IntoIter<Vec<String>>,
}

impl Iterator for Segmentations {
    type Item = Vec<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.results.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.results.size_hint()
    }
}

impl ExactSizeIterator for Segmentations {}

/// Enumerates segmentations of `subject` against `template`.
#[must_use]
pub fn segmentations(template: &[Segment<'_>], subject: &str) -> Segmentations {
    let mut results = Vec::new();
    let mut current = Vec::new();
    search(template, subject, &mut current, &mut results);
    Segmentations {
        results: results.into_iter(),
    }
}

fn search(
    template: &[Segment<'_>],
    rest: &str,
    current: &mut Vec<String>,
    out: &mut Vec<Vec<String>>,
) {
    let Some((&head, tail)) = template.split_first() else {
        if rest.is_empty() {
            out.push(current.clone());
        }
        return;
    };

    if let Some(text) = head.fixed() {
        if let Some(after) = rest.strip_prefix(text) {
            let slot = matches!(head, Segment::Bound(_));
            if slot {
                current.push(text.to_string());
            }
            search(tail, after, current, out);
            if slot {
                current.pop();
            }
        }
        return;
    }

    if tail.is_empty() {
        current.push(rest.to_string());
        out.push(current.clone());
        current.pop();
        return;
    }

    let cuts = rest
        .char_indices()
        .map(|(index, _)| index)
        .chain(std::iter::once(rest.len()));
    for cut in cuts {
        current.push(rest[..cut].to_string());
        search(tail, &rest[cut..], current, out);
        current.pop();
    }
}
