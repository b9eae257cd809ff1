//! Interned string identifier.

use std::fmt;

use crate::interner;

/// Interned string handle.
///
/// A `Name` is an index into the process-global interner, so equality and
/// hashing are O(1) integer operations. Names are used for variable name
/// hints, global symbols, operator names, and attribute keys. A name hint
/// never carries identity by itself: two distinct variables may share one
/// hint (see [`Id`](crate::Id)).
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct Name(u32);

impl Name {
    /// Pre-interned empty string.
    pub const EMPTY: Name = Name(0);

    /// Intern a string in the global interner.
    pub fn intern(s: &str) -> Name {
        interner::global().intern(s)
    }

    /// Resolve this name to its string content.
    pub fn as_str(self) -> &'static str {
        interner::global().lookup(self)
    }

    /// Get raw index value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Create from a raw index value.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Name(raw)
    }
}

impl Default for Name {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({:?})", self.as_str())
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
