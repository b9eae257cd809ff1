//! Process-global string interner.
//!
//! Name hints, global symbols, operator names, and attribute keys all pass
//! through one interner, so a [`Name`](crate::Name) is a 4-byte handle with
//! O(1) equality. Interned strings live for the remainder of the process.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::sync::OnceLock;

use crate::Name;

/// Global interner singleton.
static GLOBAL_INTERNER: OnceLock<StringInterner> = OnceLock::new();

struct InternerInner {
    /// Map from string content to index.
    map: FxHashMap<&'static str, u32>,
    /// Storage for string contents, indexed by `Name::raw`.
    strings: Vec<&'static str>,
}

/// String interner with read-mostly concurrent access.
pub struct StringInterner {
    inner: RwLock<InternerInner>,
}

impl StringInterner {
    /// Create a new interner with the empty string pre-interned at index 0.
    pub fn new() -> Self {
        let empty: &'static str = "";
        let mut map = FxHashMap::default();
        map.insert(empty, 0);
        StringInterner {
            inner: RwLock::new(InternerInner {
                map,
                strings: vec![empty],
            }),
        }
    }

    /// Intern a string, returning its handle.
    ///
    /// Interning the same content twice returns the same handle.
    pub fn intern(&self, s: &str) -> Name {
        // Fast path: already interned.
        {
            let guard = self.inner.read();
            if let Some(&raw) = guard.map.get(s) {
                return Name::from_raw(raw);
            }
        }

        let mut guard = self.inner.write();

        // Double-check after acquiring the write lock.
        if let Some(&raw) = guard.map.get(s) {
            return Name::from_raw(raw);
        }

        // Leak the string to get 'static lifetime.
        let leaked: &'static str = Box::leak(s.to_owned().into_boxed_str());
        let raw = u32::try_from(guard.strings.len())
            .unwrap_or_else(|_| panic!("string interner exceeded u32::MAX entries"));
        guard.strings.push(leaked);
        guard.map.insert(leaked, raw);
        Name::from_raw(raw)
    }

    /// Resolve a handle back to its string content.
    ///
    /// Handles not produced by this interner resolve to the empty string.
    pub fn lookup(&self, name: Name) -> &'static str {
        let guard = self.inner.read();
        guard.strings.get(name.raw() as usize).copied().unwrap_or("")
    }

    /// Number of interned strings (including the pre-interned empty string).
    pub fn len(&self) -> usize {
        self.inner.read().strings.len()
    }

    /// Check if the interner holds only the pre-interned empty string.
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

/// Get the process-global interner.
pub fn global() -> &'static StringInterner {
    GLOBAL_INTERNER.get_or_init(StringInterner::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_dedup() {
        let interner = StringInterner::new();
        let a = interner.intern("softmax");
        let b = interner.intern("softmax");
        let c = interner.intern("matmul");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_lookup_roundtrip() {
        let interner = StringInterner::new();
        let name = interner.intern("relax.shape_of");
        assert_eq!(interner.lookup(name), "relax.shape_of");
    }

    #[test]
    fn test_empty_preinterned() {
        let interner = StringInterner::new();
        assert_eq!(interner.intern(""), Name::EMPTY);
        assert_eq!(interner.lookup(Name::EMPTY), "");
    }

    #[test]
    fn test_unknown_name_lookup() {
        let interner = StringInterner::new();
        assert_eq!(interner.lookup(Name::from_raw(9999)), "");
    }
}
