//! Well-formedness checking for the Relax IR.
//!
//! IR constructors are deliberately permissive so rewrites can pass through
//! ill-formed intermediate states. Before a pass relies on scoping or
//! purity guarantees, it runs this checker, which validates:
//!
//! - every variable use is preceded by its definition in sequence order
//! - no variable has two defining bindings within one `SeqExpr`
//! - dataflow variables are defined only inside dataflow blocks and never
//!   escape their defining block
//! - bindings inside a dataflow block are free of observable side effects
//!   (operator purity comes from the operator registry; calls to extern
//!   functions count as impure)
//!
//! Errors are collected and reported in bulk, each carrying the span of
//! the offending node.

mod errors;
mod wellformed;

pub use errors::WellFormedError;
pub use wellformed::{check_function, check_seq};
