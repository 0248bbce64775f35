//! Persistent ordered map with structural sharing.
//!
//! An AVL tree of reference-counted nodes. Sibling subtree heights differ by
//! at most one after every operation. Insertion copies only the path from the
//! root to the changed node; every other subtree is shared with the input
//! map, so keeping old versions around is cheap.
//!
//! Ordering is supplied by a [`Comparator`]. `Ordering::Less` means the first
//! argument sorts first, and iteration is ascending in that order.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// A three-way comparison used to order map keys.
pub trait Comparator<K>: Clone {
    /// Compares two keys.
    fn compare(&self, a: &K, b: &K) -> Ordering;
}

/// Orders keys by their `Ord` instance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Natural;

impl<K: Ord> Comparator<K> for Natural {
    fn compare(&self, a: &K, b: &K) -> Ordering {
        a.cmp(b)
    }
}

/// Orders keys with a caller-supplied function.
#[derive(Clone, Copy)]
pub struct ByFn<F>(pub F);

impl<K, F> Comparator<K> for ByFn<F>
where
    F: Fn(&K, &K) -> Ordering + Clone,
{
    fn compare(&self, a: &K, b: &K) -> Ordering {
        (self.0)(a, b)
    }
}

type Link<K, V> = Option<Arc<Node<K, V>>>;

struct Node<K, V> {
    key: K,
    value: V,
    height: u32,
    left: Link<K, V>,
    right: Link<K, V>,
}

fn height<K, V>(link: &Link<K, V>) -> u32 {
    link.as_ref().map_or(0, |n| n.height)
}

fn make<K, V>(key: K, value: V, left: Link<K, V>, right: Link<K, V>) -> Arc<Node<K, V>> {
    let height = 1 + height(&left).max(height(&right));
    Arc::new(Node {
        key,
        value,
        height,
        left,
        right,
    })
}

/// Builds a node from parts whose heights differ by at most two, restoring
/// the AVL invariant with a single or double rotation.
fn balance<K: Clone, V: Clone>(
    key: K,
    value: V,
    left: Link<K, V>,
    right: Link<K, V>,
) -> Arc<Node<K, V>> {
    let (hl, hr) = (height(&left), height(&right));

    if hl > hr + 1 {
        let Some(l) = left else {
            unreachable!("left subtree is taller than right")
        };
        if height(&l.left) >= height(&l.right) {
            // Left-left: single right rotation.
            let new_right = make(key, value, l.right.clone(), right);
            make(l.key.clone(), l.value.clone(), l.left.clone(), Some(new_right))
        } else {
            // Left-right: double rotation through the left child's right child.
            let Some(lr) = &l.right else {
                unreachable!("left-right case needs a right grandchild")
            };
            let new_left = make(l.key.clone(), l.value.clone(), l.left.clone(), lr.left.clone());
            let new_right = make(key, value, lr.right.clone(), right);
            make(lr.key.clone(), lr.value.clone(), Some(new_left), Some(new_right))
        }
    } else if hr > hl + 1 {
        let Some(r) = right else {
            unreachable!("right subtree is taller than left")
        };
        if height(&r.right) >= height(&r.left) {
            // Right-right: single left rotation.
            let new_left = make(key, value, left, r.left.clone());
            make(r.key.clone(), r.value.clone(), Some(new_left), r.right.clone())
        } else {
            // Right-left.
            let Some(rl) = &r.left else {
                unreachable!("right-left case needs a left grandchild")
            };
            let new_left = make(key, value, left, rl.left.clone());
            let new_right = make(r.key.clone(), r.value.clone(), rl.right.clone(), r.right.clone());
            make(rl.key.clone(), rl.value.clone(), Some(new_left), Some(new_right))
        }
    } else {
        make(key, value, left, right)
    }
}

fn insert_at<K: Clone, V: Clone, C: Comparator<K>>(
    link: &Link<K, V>,
    key: K,
    value: V,
    cmp: &C,
    previous: &mut Option<V>,
) -> Arc<Node<K, V>> {
    let Some(node) = link else {
        return make(key, value, None, None);
    };

    match cmp.compare(&key, &node.key) {
        Ordering::Less => {
            let left = insert_at(&node.left, key, value, cmp, previous);
            balance(
                node.key.clone(),
                node.value.clone(),
                Some(left),
                node.right.clone(),
            )
        }
        Ordering::Greater => {
            let right = insert_at(&node.right, key, value, cmp, previous);
            balance(
                node.key.clone(),
                node.value.clone(),
                node.left.clone(),
                Some(right),
            )
        }
        Ordering::Equal => {
            *previous = Some(node.value.clone());
            Arc::new(Node {
                key,
                value,
                height: node.height,
                left: node.left.clone(),
                right: node.right.clone(),
            })
        }
    }
}

/// Persistent sorted map. Cloning is O(1).
pub struct OrdMap<K, V, C = Natural> {
    root: Link<K, V>,
    len: usize,
    cmp: C,
}

impl<K, V, C: Clone> Clone for OrdMap<K, V, C> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            len: self.len,
            cmp: self.cmp.clone(),
        }
    }
}

impl<K, V, C: Default> Default for OrdMap<K, V, C> {
    fn default() -> Self {
        Self {
            root: None,
            len: 0,
            cmp: C::default(),
        }
    }
}

impl<K: Clone + Ord, V: Clone> OrdMap<K, V, Natural> {
    /// Creates an empty map ordered by `K: Ord`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up an entry through a borrowed form of the key, the way
    /// `BTreeMap::get` does.
    #[must_use]
    pub fn get_entry<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut link = &self.root;
        while let Some(node) = link {
            match key.cmp(node.key.borrow()) {
                Ordering::Less => link = &node.left,
                Ordering::Greater => link = &node.right,
                Ordering::Equal => return Some((&node.key, &node.value)),
            }
        }
        None
    }
}

impl<K: Clone, V: Clone, C: Comparator<K>> OrdMap<K, V, C> {
    /// Creates an empty map ordered by the given comparator.
    #[must_use]
    pub fn with_comparator(cmp: C) -> Self {
        Self {
            root: None,
            len: 0,
            cmp,
        }
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the height of the tree (0 when empty).
    #[must_use]
    pub fn height(&self) -> u32 {
        height(&self.root)
    }

    /// Looks up a key. O(log n).
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        let mut link = &self.root;
        while let Some(node) = link {
            match self.cmp.compare(key, &node.key) {
                Ordering::Less => link = &node.left,
                Ordering::Greater => link = &node.right,
                Ordering::Equal => return Some(&node.value),
            }
        }
        None
    }

    /// Returns true if the map contains the key.
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Returns a new map with the entry inserted, along with the value it
    /// replaced. The receiver is unchanged. O(log n).
    #[must_use]
    pub fn insert(&self, key: K, value: V) -> (Self, Option<V>) {
        let mut previous = None;
        let root = insert_at(&self.root, key, value, &self.cmp, &mut previous);
        let len = if previous.is_some() {
            self.len
        } else {
            self.len + 1
        };
        (
            Self {
                root: Some(root),
                len,
                cmp: self.cmp.clone(),
            },
            previous,
        )
    }

    /// Returns some entry of the map, or `None` if it is empty.
    ///
    /// Which entry is unspecified; it is the cheapest one to reach.
    #[must_use]
    pub fn choose(&self) -> Option<(&K, &V)> {
        self.root.as_ref().map(|n| (&n.key, &n.value))
    }

    /// Returns a lazy ascending iterator over the entries.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K, V> {
        let mut iter = Iter {
            stack: Vec::with_capacity(self.height() as usize),
            remaining: self.len,
        };
        iter.push_left_spine(&self.root);
        iter
    }

    /// Returns a lazy ascending iterator over the keys.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.iter().map(|(k, _)| k)
    }

    /// Returns a lazy ascending iterator over the values.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, v)| v)
    }

    /// Verifies the AVL height invariant, stored heights, and key order.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        fn check<K, V, C: Comparator<K>>(link: &Link<K, V>, cmp: &C) -> Option<u32> {
            let Some(node) = link else {
                return Some(0);
            };
            let hl = check(&node.left, cmp)?;
            let hr = check(&node.right, cmp)?;
            if hl.abs_diff(hr) > 1 || node.height != 1 + hl.max(hr) {
                return None;
            }
            if let Some(l) = &node.left {
                if cmp.compare(&l.key, &node.key) != Ordering::Less {
                    return None;
                }
            }
            if let Some(r) = &node.right {
                if cmp.compare(&r.key, &node.key) != Ordering::Greater {
                    return None;
                }
            }
            Some(node.height)
        }

        check(&self.root, &self.cmp).is_some()
    }
}

/// Ascending iterator over an [`OrdMap`].
pub struct Iter<'a, K, V> {
    stack: Vec<&'a Node<K, V>>,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    fn push_left_spine(&mut self, mut link: &'a Link<K, V>) {
        while let Some(node) = link {
            self.stack.push(node);
            link = &node.left;
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left_spine(&node.right);
        self.remaining -= 1;
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<'a, K: Clone, V: Clone, C: Comparator<K>> IntoIterator for &'a OrdMap<K, V, C> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: Clone + Ord, V: Clone> FromIterator<(K, V)> for OrdMap<K, V, Natural> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |map, (k, v)| map.insert(k, v).0)
    }
}

impl<K, V, C> fmt::Debug for OrdMap<K, V, C>
where
    K: Clone + fmt::Debug,
    V: Clone + fmt::Debug,
    C: Comparator<K>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, C> PartialEq for OrdMap<K, V, C>
where
    K: Clone + PartialEq,
    V: Clone + PartialEq,
    C: Comparator<K>,
{
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}
