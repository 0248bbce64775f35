//! Persistent max-priority queue as a binomial forest.
//!
//! The forest is a sparse array of binomial trees indexed by rank; a tree of
//! rank `r` holds `2^r` elements. Adding a tree works like adding a bit to a
//! binary number: two trees of the same rank join into one tree of the next
//! rank, and the carry propagates upward.
//!
//! Trees are shared through `Arc`, so cloning a forest is O(log n) and the
//! clone is unaffected by later pushes and pops on the original.

use std::sync::Arc;

#[derive(Clone)]
struct Tree<P, T> {
    priority: P,
    item: T,
    /// `children[i]` has rank `i`.
    children: Vec<Arc<Tree<P, T>>>,
}

impl<P, T> Tree<P, T> {
    fn rank(&self) -> usize {
        self.children.len()
    }
}

/// Joins two trees of equal rank. The root with the higher priority becomes
/// the parent; on a tie the first argument wins.
fn join<P: Ord + Clone, T: Clone>(a: Arc<Tree<P, T>>, b: Arc<Tree<P, T>>) -> Arc<Tree<P, T>> {
    debug_assert_eq!(a.rank(), b.rank(), "joined trees must have equal rank");
    let (parent, child) = if b.priority > a.priority {
        (b, a)
    } else {
        (a, b)
    };
    let mut parent = Arc::unwrap_or_clone(parent);
    parent.children.push(child);
    Arc::new(parent)
}

/// Max-priority queue with cheap snapshots.
#[derive(Clone)]
pub struct BinomialForest<P, T> {
    roots: Vec<Option<Arc<Tree<P, T>>>>,
    len: usize,
}

impl<P, T> Default for BinomialForest<P, T> {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            len: 0,
        }
    }
}

impl<P: Ord + Clone, T: Clone> BinomialForest<P, T> {
    /// Creates an empty forest.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of queued elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Adds a tree at its rank, carrying into higher ranks as needed.
    fn add_tree(&mut self, mut tree: Arc<Tree<P, T>>) {
        let mut rank = tree.rank();
        loop {
            if rank >= self.roots.len() {
                self.roots.resize(rank + 1, None);
            }
            match self.roots[rank].take() {
                Some(existing) => {
                    tree = join(existing, tree);
                    rank += 1;
                }
                None => {
                    self.roots[rank] = Some(tree);
                    return;
                }
            }
        }
    }

    /// Queues an element. O(log n) worst case, O(1) amortized.
    pub fn push(&mut self, priority: P, item: T) {
        self.add_tree(Arc::new(Tree {
            priority,
            item,
            children: Vec::new(),
        }));
        self.len += 1;
    }

    /// Returns the rank of the root holding the maximum priority.
    ///
    /// Ranks are scanned from lowest to highest; the first maximum wins.
    fn max_rank(&self) -> Option<usize> {
        let mut best: Option<(usize, &P)> = None;
        for (rank, root) in self.roots.iter().enumerate() {
            let Some(root) = root else { continue };
            match best {
                Some((_, priority)) if root.priority <= *priority => {}
                _ => best = Some((rank, &root.priority)),
            }
        }
        best.map(|(rank, _)| rank)
    }

    /// Returns the highest priority without removing it.
    #[must_use]
    pub fn peek_priority(&self) -> Option<&P> {
        let rank = self.max_rank()?;
        self.roots[rank].as_ref().map(|root| &root.priority)
    }

    /// Removes and returns the element with the highest priority, or `None`
    /// if the forest is empty. O(log n).
    pub fn pop(&mut self) -> Option<(P, T)> {
        let rank = self.max_rank()?;
        let root = self.roots[rank].take()?;
        while matches!(self.roots.last(), Some(None)) {
            self.roots.pop();
        }
        self.len -= 1;

        let root = Arc::unwrap_or_clone(root);
        for child in root.children {
            self.add_tree(child);
        }
        Some((root.priority, root.item))
    }
}
