//! Symbolic scalar expressions.
//!
//! `PrimExpr` is the integer expression language shape dimensions are
//! written in. A dimension is either a known constant, a symbolic variable
//! (`n`, `m`), or arithmetic over those. The IR treats the language as
//! opaque: nothing here evaluates or simplifies, that belongs to the
//! arithmetic analyzer outside this crate.

use std::fmt;

use rustc_hash::FxHashSet;

use crate::Name;

/// Integer-typed symbolic scalar expression.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum PrimExpr {
    /// Constant dimension: `4`
    Int(i64),

    /// Symbolic dimension variable: `n`
    Var(Name),

    /// Sum of two dimensions: `n + 1`
    Add(Box<PrimExpr>, Box<PrimExpr>),

    /// Product of two dimensions: `n * 4`
    Mul(Box<PrimExpr>, Box<PrimExpr>),
}

impl PrimExpr {
    /// Symbolic variable with the given name.
    pub fn var(name: &str) -> Self {
        PrimExpr::Var(Name::intern(name))
    }

    /// Check if this expression is a bare symbolic variable.
    ///
    /// Bare variables in a `MatchShape` pattern are the positions that can
    /// bind fresh dimensions at runtime.
    pub fn is_var(&self) -> bool {
        matches!(self, PrimExpr::Var(_))
    }

    /// Collect every symbolic variable occurring in this expression.
    pub fn collect_vars(&self, out: &mut FxHashSet<Name>) {
        match self {
            PrimExpr::Int(_) => {}
            PrimExpr::Var(name) => {
                out.insert(*name);
            }
            PrimExpr::Add(lhs, rhs) | PrimExpr::Mul(lhs, rhs) => {
                lhs.collect_vars(out);
                rhs.collect_vars(out);
            }
        }
    }
}

impl From<i64> for PrimExpr {
    fn from(value: i64) -> Self {
        PrimExpr::Int(value)
    }
}

impl fmt::Display for PrimExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimExpr::Int(value) => write!(f, "{value}"),
            PrimExpr::Var(name) => write!(f, "{name}"),
            PrimExpr::Add(lhs, rhs) => write!(f, "({lhs} + {rhs})"),
            PrimExpr::Mul(lhs, rhs) => write!(f, "({lhs} * {rhs})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_structural_equality() {
        assert_eq!(PrimExpr::Int(4), PrimExpr::from(4));
        assert_eq!(PrimExpr::var("n"), PrimExpr::var("n"));
        assert_ne!(PrimExpr::var("n"), PrimExpr::var("m"));
    }

    #[test]
    fn test_display() {
        let dim = PrimExpr::Add(
            Box::new(PrimExpr::Mul(
                Box::new(PrimExpr::var("n")),
                Box::new(PrimExpr::Int(4)),
            )),
            Box::new(PrimExpr::Int(1)),
        );
        assert_eq!(format!("{dim}"), "((n * 4) + 1)");
    }

    #[test]
    fn test_collect_vars() {
        let dim = PrimExpr::Add(
            Box::new(PrimExpr::var("n")),
            Box::new(PrimExpr::Mul(
                Box::new(PrimExpr::var("m")),
                Box::new(PrimExpr::Int(2)),
            )),
        );
        let mut vars = FxHashSet::default();
        dim.collect_vars(&mut vars);
        assert_eq!(vars.len(), 2);
        assert!(vars.contains(&Name::intern("n")));
        assert!(vars.contains(&Name::intern("m")));
    }

    #[test]
    fn test_is_var() {
        assert!(PrimExpr::var("n").is_var());
        assert!(!PrimExpr::Int(3).is_var());
    }
}
