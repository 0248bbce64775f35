//! Hash-consed term storage.
//!
//! Every term that the engine touches is interned here once. Afterwards the
//! engine only passes [`TermId`] handles around, and equality is handle
//! equality.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use num_bigint::BigInt;

use crate::term::{TermId, TermView};

/// Interner for terms.
///
/// The store is append-only: it grows monotonically for the lifetime of a
/// solving session and is discarded with it. It is not thread-safe; each
/// session owns its own store.
#[derive(Clone, Debug)]
pub struct TermStore {
    /// Term storage, indexed by handle.
    views: Vec<TermView>,
    /// Map from structure to handle.
    view_to_id: HashMap<TermView, TermId>,
}

impl Default for TermStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TermStore {
    /// Terms that are interned at startup with fixed handles.
    const RESERVED: [TermView; 3] = [
        TermView::Trivial,     // TermId(0) = TRIVIAL
        TermView::Bool(true),  // TermId(1) = TRUE
        TermView::Bool(false), // TermId(2) = FALSE
    ];

    /// Creates a new store with the reserved terms pre-interned.
    #[must_use]
    pub fn new() -> Self {
        let mut store = Self {
            views: Vec::new(),
            view_to_id: HashMap::new(),
        };

        for (i, view) in Self::RESERVED.into_iter().enumerate() {
            let id = store.intern(view);
            debug_assert_eq!(id.0 as usize, i, "reserved term interned out of order");
        }

        store
    }

    /// Interns a term view, returning its handle.
    ///
    /// Interning the same view twice returns the same handle.
    ///
    /// # Panics
    ///
    /// Panics if the number of interned terms exceeds `u32::MAX`, or (in
    /// debug builds) if the view refers to a handle this store never issued.
    pub fn intern(&mut self, view: TermView) -> TermId {
        if let Some(&id) = self.view_to_id.get(&view) {
            return id;
        }

        if let TermView::Const { args, .. } = &view {
            debug_assert!(
                args.iter().all(|arg| (arg.0 as usize) < self.views.len()),
                "constructor argument from a foreign store"
            );
        }

        let id = TermId(u32::try_from(self.views.len()).expect("too many interned terms"));
        self.views.push(view.clone());
        self.view_to_id.insert(view, id);
        id
    }

    /// Returns the structure of an interned term.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this store.
    #[must_use]
    pub fn expose(&self, id: TermId) -> &TermView {
        &self.views[id.0 as usize]
    }

    /// Returns the structure of a term, or `None` for a foreign handle.
    #[must_use]
    pub fn get(&self, id: TermId) -> Option<&TermView> {
        self.views.get(id.0 as usize)
    }

    /// Returns the handle for a view if it has already been interned.
    #[must_use]
    pub fn lookup(&self, view: &TermView) -> Option<TermId> {
        self.view_to_id.get(view).copied()
    }

    /// Interns an integer.
    pub fn int(&mut self, n: impl Into<BigInt>) -> TermId {
        self.intern(TermView::Int(n.into()))
    }

    /// Interns a string.
    pub fn string(&mut self, s: &str) -> TermId {
        self.intern(TermView::String(s.into()))
    }

    /// Returns the handle for a boolean. Never allocates.
    #[must_use]
    pub const fn boolean(&self, b: bool) -> TermId {
        TermId::boolean(b)
    }

    /// Interns a constructed term.
    pub fn constant(&mut self, name: &str, args: Vec<TermId>) -> TermId {
        self.intern(TermView::Const {
            name: Arc::from(name),
            args,
        })
    }

    /// Interns an external reference.
    pub fn reference(&mut self, index: u64) -> TermId {
        self.intern(TermView::Ref(index))
    }

    /// Returns the number of interned terms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.views.len()
    }

    /// Returns true if nothing beyond the reserved terms was interned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.views.len() <= Self::RESERVED.len()
    }

    /// Returns a displayable rendering of a term in surface syntax.
    #[must_use]
    pub fn display(&self, id: TermId) -> TermDisplay<'_> {
        TermDisplay {
            store: self,
            id,
            nested: false,
        }
    }
}

/// Surface-syntax rendering of a term. See [`TermStore::display`].
pub struct TermDisplay<'a> {
    store: &'a TermStore,
    id: TermId,
    nested: bool,
}

impl fmt::Display for TermDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.store.get(self.id) {
            None => write!(f, "<foreign {}>", self.id.0),
            Some(TermView::Trivial) => write!(f, "()"),
            Some(TermView::Int(n)) => write!(f, "{n}"),
            Some(TermView::Bool(b)) => write!(f, "{b}"),
            Some(TermView::String(s)) => write!(f, "{s:?}"),
            Some(TermView::Ref(r)) => write!(f, "#ref {r}"),
            Some(TermView::Const { name, args }) if args.is_empty() => write!(f, "{name}"),
            Some(TermView::Const { name, args }) => {
                if self.nested {
                    write!(f, "(")?;
                }
                write!(f, "{name}")?;
                for &arg in args {
                    let inner = TermDisplay {
                        store: self.store,
                        id: arg,
                        nested: true,
                    };
                    write!(f, " {inner}")?;
                }
                if self.nested {
                    write!(f, ")")?;
                }
                Ok(())
            }
        }
    }
}
