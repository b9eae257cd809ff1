//! IR Visitor Pattern
//!
//! Generic read-only traversal over the expression DAG. Override `visit_*`
//! methods for custom behavior at specific nodes; call `walk_*` functions
//! to continue into children. The visitor may mutate its own state, the IR
//! never.
//!
//! Traversal order is evaluation order: binding values before the bound
//! variable, blocks before the `SeqExpr` body, callee before arguments'
//! siblings in sequence.

use crate::{Binding, BindingBlock, Expr, PrimExpr, Var};

/// IR visitor trait.
pub trait Visitor {
    /// Visit an expression.
    fn visit_expr(&mut self, expr: &Expr) {
        walk_expr(self, expr);
    }

    /// Visit a variable occurrence in expression position (a use).
    fn visit_var_use(&mut self, var: &Var) {
        let _ = var;
    }

    /// Visit a variable at its definition site (binding or parameter).
    fn visit_var_def(&mut self, var: &Var) {
        let _ = var;
    }

    /// Visit a binding.
    fn visit_binding(&mut self, binding: &Binding) {
        walk_binding(self, binding);
    }

    /// Visit a binding block.
    fn visit_block(&mut self, block: &BindingBlock) {
        walk_block(self, block);
    }

    /// Visit a symbolic dimension (in a `ShapeExpr` or a match pattern).
    fn visit_prim(&mut self, prim: &PrimExpr) {
        let _ = prim;
    }
}

/// Traverse the children of an expression.
pub fn walk_expr<V: Visitor + ?Sized>(v: &mut V, expr: &Expr) {
    match expr {
        // Leaves.
        Expr::Constant(_) | Expr::Extern(_) | Expr::Global(_) | Expr::Op(_) => {}
        Expr::Var(var) => v.visit_var_use(var),
        Expr::Shape(shape) => {
            for dim in &shape.values {
                v.visit_prim(dim);
            }
        }
        Expr::Tuple(tuple) => {
            for field in &tuple.fields {
                v.visit_expr(field);
            }
        }
        Expr::TupleGetItem(proj) => v.visit_expr(&proj.tuple),
        Expr::Call(call) => {
            v.visit_expr(&call.op);
            for arg in &call.args {
                v.visit_expr(arg);
            }
        }
        Expr::If(cond) => {
            v.visit_expr(&cond.cond);
            v.visit_expr(&cond.true_branch);
            v.visit_expr(&cond.false_branch);
        }
        Expr::Seq(seq) => {
            for block in &seq.blocks {
                v.visit_block(block);
            }
            v.visit_expr(&seq.body);
        }
        Expr::Function(func) => {
            for param in &func.params {
                v.visit_var_def(param);
            }
            v.visit_expr(&func.body);
        }
    }
}

/// Traverse the children of a binding: value first, defined variable last.
pub fn walk_binding<V: Visitor + ?Sized>(v: &mut V, binding: &Binding) {
    match binding {
        Binding::Var(b) => {
            v.visit_expr(&b.value);
            v.visit_var_def(&b.var);
        }
        Binding::MatchShape(b) => {
            v.visit_expr(&b.value);
            for dim in &b.pattern {
                v.visit_prim(dim);
            }
            v.visit_var_def(&b.var);
        }
    }
}

/// Traverse the bindings of a block in order.
pub fn walk_block<V: Visitor + ?Sized>(v: &mut V, block: &BindingBlock) {
    for binding in &block.bindings {
        v.visit_binding(binding);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Call, OpRegistry, SeqExpr, ShapeExpr, Span, VarBinding};

    #[derive(Default)]
    struct Counter {
        uses: usize,
        defs: usize,
        dims: usize,
        calls: usize,
    }

    impl Visitor for Counter {
        fn visit_expr(&mut self, expr: &Expr) {
            if matches!(expr, Expr::Call(_)) {
                self.calls += 1;
            }
            walk_expr(self, expr);
        }

        fn visit_var_use(&mut self, _var: &Var) {
            self.uses += 1;
        }

        fn visit_var_def(&mut self, _var: &Var) {
            self.defs += 1;
        }

        fn visit_prim(&mut self, _prim: &PrimExpr) {
            self.dims += 1;
        }
    }

    #[test]
    fn test_walk_seq() {
        // x = shape_of(p); body = x
        let p = Var::new("p", None, None, Span::DUMMY);
        let x = Var::new("x", None, None, Span::DUMMY);
        let call = Call::new(
            OpRegistry::global().shape_of().into(),
            vec![p.clone().into()],
            Vec::new(),
            Vec::new(),
            Span::DUMMY,
        );
        let block = BindingBlock::new(
            vec![VarBinding::new(x.clone(), call.into(), Span::DUMMY).into()],
            Span::DUMMY,
        );
        let seq = SeqExpr::new(vec![block], x.into(), Span::DUMMY);

        let mut counter = Counter::default();
        counter.visit_expr(&Expr::Seq(seq));
        assert_eq!(counter.calls, 1);
        assert_eq!(counter.uses, 2); // p inside the call, x in the body
        assert_eq!(counter.defs, 1); // x at its binding
    }

    #[test]
    fn test_walk_shape_dims() {
        let shape = ShapeExpr::new(vec![PrimExpr::var("n"), PrimExpr::Int(4)], Span::DUMMY);
        let mut counter = Counter::default();
        counter.visit_expr(&shape.into());
        assert_eq!(counter.dims, 2);
    }
}
