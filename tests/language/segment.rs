//! Integration tests for string segmentation

use choicelog_language::{Segment, segmentations};
use proptest::prelude::*;

fn binomial(n: usize, k: usize) -> usize {
    (0..k).fold(1, |acc, i| acc * (n - i) / (i + 1))
}

#[test]
fn literal_anchoring_example() {
    let got: Vec<Vec<String>> =
        segmentations(&[Segment::Free, Segment::Literal("a"), Segment::Free], "aaba").collect();
    assert_eq!(got.len(), 3);
    assert_eq!(got[0], vec!["".to_string(), "aba".to_string()]);
}

#[test]
fn enumeration_is_restartable() {
    let template = [Segment::Free, Segment::Free];
    let first = segmentations(&template, "xyz");
    let replay = first.clone();
    assert_eq!(first.len(), 4);
    assert_eq!(first.collect::<Vec<_>>(), replay.collect::<Vec<_>>());
}

#[test]
fn multibyte_subjects_cut_on_characters() {
    let got: Vec<Vec<String>> = segmentations(&[Segment::Free, Segment::Free], "é").collect();
    assert_eq!(got, vec![vec!["".to_string(), "é".to_string()], vec!["é".to_string(), "".to_string()]]);
}

proptest! {
    #[test]
    fn pieces_reassemble_the_subject(subject in "[ab]{0,8}", k in 1usize..4) {
        let template = vec![Segment::Free; k];
        let all: Vec<Vec<String>> = segmentations(&template, &subject).collect();

        prop_assert_eq!(all.len(), binomial(subject.len() + k - 1, k - 1));
        for pieces in &all {
            prop_assert_eq!(pieces.concat(), subject.clone());
        }
        let mut deduped = all.clone();
        deduped.dedup();
        prop_assert_eq!(deduped.len(), all.len());
    }

    #[test]
    fn separators_are_respected(left in "[xy]{0,4}", right in "[xy]{0,4}") {
        let subject = format!("{left}-{right}");
        let template = [Segment::Free, Segment::Literal("-"), Segment::Free];
        let all: Vec<Vec<String>> = segmentations(&template, &subject).collect();
        prop_assert_eq!(all, vec![vec![left, right]]);
    }
}
