//! Integration tests for the persistent trie

use choicelog_foundation::{TermId, TermStore, Trie};

fn letters(store: &mut TermStore, word: &str) -> Vec<TermId> {
    word.chars().map(|c| store.string(&c.to_string())).collect()
}

fn spell(store: &TermStore, keys: &[TermId]) -> String {
    keys.iter()
        .map(|&k| store.expose(k).as_str().unwrap_or("?").to_string())
        .collect()
}

#[test]
fn visit_at_full_depth_is_sorted() {
    let mut store = TermStore::new();
    let atone = letters(&mut store, "atone");
    let stare = letters(&mut store, "stare");

    let trie = Trie::empty();
    let (trie, _) = trie.insert(&stare, 1).unwrap();
    let (trie, _) = trie.insert(&atone, 9).unwrap();

    let visited: Vec<(String, i32)> = trie
        .visit(5)
        .map(|(keys, node)| (spell(&store, &keys), *node.leaf().unwrap()))
        .collect();
    assert_eq!(visited, vec![("atone".into(), 9), ("stare".into(), 1)]);
}

#[test]
fn visit_at_partial_depth_yields_subtries() {
    let mut store = TermStore::new();
    let words = ["tab", "tan", "tea", "ten", "toe"];
    let mut trie = Trie::empty();
    for (i, word) in words.iter().enumerate() {
        let keys = letters(&mut store, word);
        trie = trie.insert(&keys, i).unwrap().0;
    }

    let prefixes: Vec<String> = trie.visit(2).map(|(keys, _)| spell(&store, &keys)).collect();
    assert_eq!(prefixes, vec!["ta", "te", "to"]);

    let t = store.string("t");
    let e = store.string("e");
    let under_te = trie.lookup(&[t, e]).unwrap();
    assert_eq!(under_te.visit(1).count(), 2);
}

#[test]
fn insert_replaces_and_preserves_snapshots() {
    let mut store = TermStore::new();
    let keys = letters(&mut store, "ab");
    let (t1, first) = Trie::empty().insert(&keys, "old").unwrap();
    let (t2, second) = t1.insert(&keys, "new").unwrap();

    assert_eq!(first, None);
    assert_eq!(second, Some("old"));
    assert_eq!(t1.lookup(&keys).and_then(Trie::leaf), Some(&"old"));
    assert_eq!(t2.lookup(&keys).and_then(Trie::leaf), Some(&"new"));
}

#[test]
fn arity_mismatch_is_an_invariant_error() {
    let mut store = TermStore::new();
    let long = letters(&mut store, "abc");
    let (trie, _) = Trie::empty().insert(&long, ()).unwrap();

    assert!(trie.insert(&long[..2], ()).is_err());
    let longer = letters(&mut store, "abcd");
    assert!(trie.insert(&longer, ()).is_err());
}

#[test]
fn entries_list_every_leaf() {
    let mut store = TermStore::new();
    let mut trie = Trie::empty();
    for word in ["xy", "xz", "wy"] {
        let keys = letters(&mut store, word);
        trie = trie.insert(&keys, word.len()).unwrap().0;
    }
    let words: Vec<String> = trie.entries().iter().map(|(k, _)| spell(&store, k)).collect();
    assert_eq!(words, vec!["xy", "xz", "wy"]);
}
