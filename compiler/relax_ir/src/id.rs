//! Variable identity tokens.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU32, Ordering};

use crate::Name;

/// Counter backing [`Id::fresh`]. Process-wide so identities stay unique
/// across independently constructed functions.
static NEXT_ID: AtomicU32 = AtomicU32::new(0);

/// Identity token of a variable.
///
/// An `Id` pairs a unique serial number with a human-readable name hint.
/// Equality and hashing use the serial number only: two `Id`s created by
/// separate [`Id::fresh`] calls are distinct even when their hints match,
/// and every `Var` referencing one logical variable shares one `Id`.
#[derive(Copy, Clone)]
pub struct Id {
    raw: u32,
    name_hint: Name,
}

impl Id {
    /// Create a fresh identity with the given name hint.
    pub fn fresh(name_hint: &str) -> Self {
        Id {
            raw: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            name_hint: Name::intern(name_hint),
        }
    }

    /// Create a fresh identity from an already interned hint.
    pub fn fresh_from_name(name_hint: Name) -> Self {
        Id {
            raw: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            name_hint,
        }
    }

    /// The unique serial number.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.raw
    }

    /// The human-readable hint. Not part of identity.
    #[inline]
    pub const fn name_hint(self) -> Name {
        self.name_hint
    }
}

// Identity excludes the hint: only the serial number participates.

impl PartialEq for Id {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for Id {}

impl Hash for Id {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl PartialOrd for Id {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Id {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.raw.cmp(&other.raw)
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({}#{})", self.name_hint, self.raw)
    }
}
