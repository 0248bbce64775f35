//! Persistent trie over term sequences.
//!
//! Each level of the trie indexes one position of a key sequence with an
//! [`OrdMap`]. A relation of arity `n` stores its tuples `n` levels deep and
//! keeps its payload in the leaves.

use crate::error::{Error, Result};
use crate::ordmap::{self, OrdMap};
use crate::term::TermId;

/// A trie node: either more key positions remain, or a terminal payload.
#[derive(Clone, Debug)]
pub enum Trie<V: Clone> {
    /// More positions remain; children are keyed by the next element.
    Node(OrdMap<TermId, Trie<V>>),
    /// Terminal node carrying a payload.
    Leaf(V),
}

impl<V: Clone> Default for Trie<V> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<V: Clone> Trie<V> {
    /// Creates an empty trie.
    #[must_use]
    pub fn empty() -> Self {
        Self::Node(OrdMap::new())
    }

    /// Returns the payload if this is a terminal node.
    #[must_use]
    pub fn leaf(&self) -> Option<&V> {
        match self {
            Self::Leaf(v) => Some(v),
            Self::Node(_) => None,
        }
    }

    /// Returns the child index if this is not a terminal node.
    #[must_use]
    pub fn children(&self) -> Option<&OrdMap<TermId, Trie<V>>> {
        match self {
            Self::Node(children) => Some(children),
            Self::Leaf(_) => None,
        }
    }

    /// Returns true if this node has neither a payload nor children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Node(children) if children.is_empty())
    }

    /// Follows `keys` one level at a time.
    ///
    /// Returns `None` if some key is missing, or if a terminal node is reached
    /// before the keys run out.
    #[must_use]
    pub fn lookup(&self, keys: &[TermId]) -> Option<&Trie<V>> {
        let mut node = self;
        for key in keys {
            node = node.children()?.get(key)?;
        }
        Some(node)
    }

    /// Returns a new trie with `value` stored at `keys`, and the value it
    /// replaced. Only the path from the root to the new leaf is rebuilt.
    ///
    /// # Errors
    ///
    /// Returns an invariant error if the path runs into a terminal node before
    /// the keys run out, or ends at a node that still has children.
    pub fn insert(&self, keys: &[TermId], value: V) -> Result<(Self, Option<V>)> {
        Self::insert_at(Some(self), 0, keys, value)
    }

    /// Inserts starting at position `index` of `keys`, below `node`.
    fn insert_at(
        node: Option<&Self>,
        index: usize,
        keys: &[TermId],
        value: V,
    ) -> Result<(Self, Option<V>)> {
        let Some(&key) = keys.get(index) else {
            return match node {
                None => Ok((Self::Leaf(value), None)),
                Some(Self::Leaf(old)) => Ok((Self::Leaf(value), Some(old.clone()))),
                Some(node) if node.is_empty() => Ok((Self::Leaf(value), None)),
                Some(Self::Node(_)) => Err(Error::invariant(format!(
                    "terminal position {index} of a {}-key insert still has children",
                    keys.len()
                ))),
            };
        };

        match node {
            None => {
                let (child, _) = Self::insert_at(None, index + 1, keys, value)?;
                let (children, _) = OrdMap::new().insert(key, child);
                Ok((Self::Node(children), None))
            }
            Some(Self::Node(children)) => {
                let (child, previous) =
                    Self::insert_at(children.get(&key), index + 1, keys, value)?;
                let (children, _) = children.insert(key, child);
                Ok((Self::Node(children), previous))
            }
            Some(Self::Leaf(_)) => Err(Error::invariant(format!(
                "terminal node reached at position {index} of a {}-key insert",
                keys.len()
            ))),
        }
    }

    /// Collects every terminal payload with the full key sequence leading to
    /// it, ascending. Unlike [`Trie::visit`] this does not need to know the
    /// depth in advance.
    #[must_use]
    pub fn entries(&self) -> Vec<(Vec<TermId>, &V)> {
        fn walk<'a, V: Clone>(
            node: &'a Trie<V>,
            prefix: &mut Vec<TermId>,
            out: &mut Vec<(Vec<TermId>, &'a V)>,
        ) {
            match node {
                Trie::Leaf(v) => out.push((prefix.clone(), v)),
                Trie::Node(children) => {
                    for (&key, child) in children {
                        prefix.push(key);
                        walk(child, prefix, out);
                        prefix.pop();
                    }
                }
            }
        }

        let mut out = Vec::new();
        walk(self, &mut Vec::new(), &mut out);
        out
    }

    /// Enumerates every node exactly `depth` levels below this one, ascending
    /// by key sequence, paired with the keys that lead to it.
    ///
    /// Branches that end in a terminal node before `depth` are skipped.
    #[must_use]
    pub fn visit(&self, depth: usize) -> Visit<'_, V> {
        Visit {
            depth,
            root: Some(self),
            prefix: Vec::with_capacity(depth),
            stack: Vec::with_capacity(depth),
        }
    }
}

/// Lazy enumeration of the nodes at a fixed depth. See [`Trie::visit`].
pub struct Visit<'a, V: Clone> {
    depth: usize,
    root: Option<&'a Trie<V>>,
    /// Keys chosen on the levels above the top of `stack`.
    prefix: Vec<TermId>,
    stack: Vec<ordmap::Iter<'a, TermId, Trie<V>>>,
}

impl<'a, V: Clone> Iterator for Visit<'a, V> {
    type Item = (Vec<TermId>, &'a Trie<V>);

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(root) = self.root.take() {
            if self.depth == 0 {
                return Some((Vec::new(), root));
            }
            self.stack.push(root.children()?.iter());
        }

        loop {
            let top = self.stack.last_mut()?;
            let Some((&key, child)) = top.next() else {
                self.stack.pop();
                self.prefix.pop();
                continue;
            };

            if self.stack.len() == self.depth {
                let mut keys = self.prefix.clone();
                keys.push(key);
                return Some((keys, child));
            }

            if let Some(children) = child.children() {
                self.prefix.push(key);
                self.stack.push(children.iter());
            }
        }
    }
}
