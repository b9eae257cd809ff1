//! Primitive operators and the process-global operator registry.
//!
//! Operators are interned singletons: looking up `"relax.add"` twice yields
//! the same handle, so operator identity is pointer identity. The registry
//! also records purity, which the well-formedness checker consults when it
//! validates dataflow blocks.

use std::fmt;
use std::ops::Deref;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::Name;

/// Dotted name of the shape query operator.
///
/// `Expr::shape()` emits a call to this operator when no shape annotation
/// is cached; it is pre-registered when the registry is first touched.
pub const SHAPE_OF: &str = "relax.shape_of";

/// Payload of a registered operator.
#[derive(Debug)]
pub struct OpNode {
    /// Dotted operator name, e.g. `relax.shape_of`.
    pub name: Name,
    /// Whether calls to this operator are free of observable side effects.
    pub pure: bool,
}

/// Handle to a registered operator.
///
/// Cloning shares the underlying node; [`Op::same_as`] tests pointer
/// identity, which coincides with name equality for handles obtained from
/// one registry.
#[derive(Clone, Debug)]
pub struct Op(Arc<OpNode>);

impl Op {
    fn new(name: Name, pure: bool) -> Self {
        Op(Arc::new(OpNode { name, pure }))
    }

    /// Pointer identity test.
    pub fn same_as(&self, other: &Op) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Deref for Op {
    type Target = OpNode;

    fn deref(&self) -> &OpNode {
        &self.0
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Global operator registry singleton.
static GLOBAL_REGISTRY: OnceLock<OpRegistry> = OnceLock::new();

/// Registry of primitive operators.
///
/// Registration normally happens during process initialization; lookups
/// dominate afterwards, hence the read-write lock.
pub struct OpRegistry {
    ops: RwLock<FxHashMap<Name, Op>>,
    /// Kept outside the map so the shape-of rule never takes the lock twice.
    shape_of: Op,
}

impl OpRegistry {
    fn new() -> Self {
        let shape_of = Op::new(Name::intern(SHAPE_OF), true);
        let mut ops = FxHashMap::default();
        ops.insert(shape_of.name, shape_of.clone());
        OpRegistry {
            ops: RwLock::new(ops),
            shape_of,
        }
    }

    /// Get the global registry, initializing it on first use.
    pub fn global() -> &'static OpRegistry {
        GLOBAL_REGISTRY.get_or_init(OpRegistry::new)
    }

    /// Register an operator, or return the existing handle if the name is
    /// already taken. Registration is idempotent; the first registration
    /// fixes purity.
    pub fn register(&self, name: &str, pure: bool) -> Op {
        let name = Name::intern(name);
        let mut guard = self.ops.write();
        guard
            .entry(name)
            .or_insert_with(|| Op::new(name, pure))
            .clone()
    }

    /// Look up an operator by dotted name.
    pub fn get(&self, name: &str) -> Option<Op> {
        self.ops.read().get(&Name::intern(name)).cloned()
    }

    /// The pre-registered `relax.shape_of` operator.
    pub fn shape_of(&self) -> Op {
        self.shape_of.clone()
    }

    /// Number of registered operators.
    pub fn len(&self) -> usize {
        self.ops.read().len()
    }

    /// Check if no operator has been registered (never true: `shape_of` is
    /// pre-registered).
    pub fn is_empty(&self) -> bool {
        self.ops.read().is_empty()
    }
}
