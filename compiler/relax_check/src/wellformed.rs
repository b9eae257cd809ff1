//! The checking pass.
//!
//! One forward walk in evaluation order, tracking the set of visible
//! variable identities. Scoping follows the sequence rules: a variable
//! defined in block *i* of a `SeqExpr` is visible through blocks *i+1..n*
//! and the body, except that a dataflow variable drops out of scope at the
//! end of its defining block. Nested sequences and function bodies are
//! checked lexically with the outer scope visible.

use rustc_hash::FxHashSet;
use tracing::debug;

use relax_ir::visitor::{walk_expr, Visitor};
use relax_ir::{Binding, Expr, Function, Id, SeqExpr, Span, Var};

use crate::WellFormedError;

/// Check a function, treating its parameters as defined throughout.
pub fn check_function(func: &Function) -> Result<(), Vec<WellFormedError>> {
    debug!(params = func.params.len(), "checking function");
    let mut checker = Checker::default();
    checker.enter_function(func);
    checker.finish()
}

/// Check a bare `SeqExpr` with the given variables pre-defined (typically
/// the parameters of the function the sequence will live in).
pub fn check_seq(seq: &SeqExpr, params: &[Var]) -> Result<(), Vec<WellFormedError>> {
    debug!(
        blocks = seq.blocks.len(),
        params = params.len(),
        "checking sequence"
    );
    let mut checker = Checker::default();
    for param in params {
        checker.visible.insert(param.vid);
    }
    checker.check_seq_scoped(seq);
    checker.finish()
}

#[derive(Default)]
struct Checker {
    errors: Vec<WellFormedError>,
    /// Identities visible at the current program point.
    visible: FxHashSet<Id>,
    /// Dataflow identities whose defining block has ended; distinguishes
    /// an escape from a plain undefined-variable use.
    escaped: FxHashSet<Id>,
}

impl Checker {
    fn finish(self) -> Result<(), Vec<WellFormedError>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            debug!(errors = self.errors.len(), "check failed");
            Err(self.errors)
        }
    }

    fn enter_function(&mut self, func: &Function) {
        let saved = self.visible.clone();
        for param in &func.params {
            self.visible.insert(param.vid);
        }
        self.visit_expr(&func.body);
        self.visible = saved;
    }

    fn check_use(&mut self, var: &Var) {
        if self.visible.contains(&var.vid) {
            return;
        }
        if var.is_dataflow() && self.escaped.contains(&var.vid) {
            self.errors.push(WellFormedError::DataflowVarEscapes {
                name: var.name_hint(),
                span: var.span,
            });
        } else {
            self.errors.push(WellFormedError::UndefinedVar {
                name: var.name_hint(),
                span: var.span,
            });
        }
    }

    fn check_seq_scoped(&mut self, seq: &SeqExpr) {
        let saved = self.visible.clone();
        // Single-assignment is per enclosing SeqExpr.
        let mut defined_here: FxHashSet<Id> = FxHashSet::default();

        for block in &seq.blocks {
            let mut block_dataflow: Vec<Id> = Vec::new();
            for binding in &block.bindings {
                // Value first: the bound variable is not in scope in its
                // own definition.
                self.visit_expr(binding.value());

                if block.is_dataflow() {
                    if let Some(span) = find_impure_call(binding) {
                        self.errors
                            .push(WellFormedError::ImpureBindingInDataflowBlock { span });
                    }
                }

                let var = binding.var();
                if var.is_dataflow() && !block.is_dataflow() {
                    self.errors
                        .push(WellFormedError::DataflowVarOutsideDataflowBlock {
                            name: var.name_hint(),
                            span: var.span,
                        });
                }
                if !defined_here.insert(var.vid) {
                    self.errors.push(WellFormedError::Redefinition {
                        name: var.name_hint(),
                        span: binding.span(),
                    });
                }
                self.visible.insert(var.vid);
                if var.is_dataflow() {
                    block_dataflow.push(var.vid);
                }
            }
            // Dataflow vars do not survive their block.
            for vid in block_dataflow {
                self.visible.remove(&vid);
                self.escaped.insert(vid);
            }
        }

        self.visit_expr(&seq.body);
        self.visible = saved;
    }
}

impl Visitor for Checker {
    fn visit_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Var(var) => self.check_use(var),
            Expr::Seq(seq) => self.check_seq_scoped(seq),
            Expr::Function(func) => self.enter_function(func),
            _ => walk_expr(self, expr),
        }
    }
}

/// Scan a binding's value for an effectful call: an operator registered
/// impure, or an extern function (side effects unknown). Returns the span
/// of the first such call site.
fn find_impure_call(binding: &Binding) -> Option<Span> {
    let mut scan = PurityScan { impure_at: None };
    scan.visit_expr(binding.value());
    scan.impure_at
}

struct PurityScan {
    impure_at: Option<Span>,
}

impl Visitor for PurityScan {
    fn visit_expr(&mut self, expr: &Expr) {
        match expr {
            // A function value is inert until called.
            Expr::Function(_) => {}
            Expr::Call(call) => {
                let impure = match &call.op {
                    Expr::Op(op) => !op.pure,
                    Expr::Extern(_) => true,
                    _ => false,
                };
                if impure && self.impure_at.is_none() {
                    self.impure_at = Some(call.span);
                }
                walk_expr(self, expr);
            }
            _ => walk_expr(self, expr),
        }
    }
}
