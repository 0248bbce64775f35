//! Term handles and structural term views.

use std::fmt;
use std::sync::Arc;

use num_bigint::BigInt;

/// Interned term handle.
///
/// Two handles from the same [`TermStore`](crate::TermStore) are equal if and
/// only if the terms they name are structurally equal, so handle comparison
/// replaces recursive comparison everywhere above the store.
///
/// The `Ord` instance orders handles by interning order. It is the comparator
/// used for every term-keyed ordered map.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct TermId(pub(crate) u32);

impl TermId {
    /// The trivial (unit) term `()`.
    pub const TRIVIAL: TermId = TermId(0);

    /// The boolean `true`.
    pub const TRUE: TermId = TermId(1);

    /// The boolean `false`.
    pub const FALSE: TermId = TermId(2);

    /// Returns the raw index of this term.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }

    /// Returns the handle for a boolean.
    #[must_use]
    pub const fn boolean(b: bool) -> Self {
        if b { Self::TRUE } else { Self::FALSE }
    }
}

impl fmt::Debug for TermId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TermId({})", self.0)
    }
}

/// The structure of one term, one level deep.
///
/// Arguments of constructed terms are handles, so a view is never deeper
/// than a single constructor.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TermView {
    /// The unit term.
    Trivial,
    /// Arbitrary-precision integer.
    Int(BigInt),
    /// Boolean.
    Bool(bool),
    /// String.
    String(Arc<str>),
    /// Constructor applied to arguments.
    Const {
        /// Constructor name.
        name: Arc<str>,
        /// Argument handles, in order.
        args: Vec<TermId>,
    },
    /// Opaque reference into host-provided data.
    Ref(u64),
}

impl TermView {
    /// Returns a short name for the kind of term, for diagnostics.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Trivial => "trivial",
            Self::Int(_) => "int",
            Self::Bool(_) => "bool",
            Self::String(_) => "string",
            Self::Const { .. } => "const",
            Self::Ref(_) => "ref",
        }
    }

    /// Attempts to extract an integer.
    #[must_use]
    pub fn as_int(&self) -> Option<&BigInt> {
        match self {
            Self::Int(n) => Some(n),
            _ => None,
        }
    }

    /// Attempts to extract a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Attempts to extract a boolean.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<i64> for TermView {
    fn from(n: i64) -> Self {
        Self::Int(BigInt::from(n))
    }
}

impl From<BigInt> for TermView {
    fn from(n: BigInt) -> Self {
        Self::Int(n)
    }
}

impl From<bool> for TermView {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for TermView {
    fn from(s: &str) -> Self {
        Self::String(s.into())
    }
}

impl From<String> for TermView {
    fn from(s: String) -> Self {
        Self::String(s.into())
    }
}
