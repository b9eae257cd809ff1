//! Bindings and binding blocks.
//!
//! A `SeqExpr` body is a list of blocks, each an ordered list of bindings.
//! Ordinary blocks may sequence arbitrary side effects; dataflow blocks
//! promise purity, which is what later passes rely on to reorder and fuse.
//! Constructors here are permissive: scoping, single-assignment, and purity
//! are validated by the checker pass, not at construction time, so rewrites
//! may pass through ill-formed intermediate states.

use std::ops::Deref;
use std::sync::Arc;

use crate::expr::DimVec;
use crate::{Expr, Span, Var};

/// Payload of [`VarBinding`].
#[derive(Debug)]
pub struct VarBindingNode {
    /// The variable being defined. This binding is its sole definition
    /// site in any well-formed tree.
    pub var: Var,
    pub value: Expr,
    pub span: Span,
}

/// Single-assignment binding: `var = value`.
#[derive(Clone, Debug)]
pub struct VarBinding(Arc<VarBindingNode>);

impl VarBinding {
    pub fn new(var: Var, value: Expr, span: Span) -> Self {
        VarBinding(Arc::new(VarBindingNode { var, value, span }))
    }

    /// Pointer identity test.
    pub fn same_as(&self, other: &VarBinding) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Deref for VarBinding {
    type Target = VarBindingNode;

    fn deref(&self) -> &VarBindingNode {
        &self.0
    }
}

/// Payload of [`MatchShape`].
#[derive(Debug)]
pub struct MatchShapeNode {
    pub value: Expr,
    /// Dimension pattern. Bare symbolic variables bind the matched
    /// dimension; anything else asserts equality at runtime.
    pub pattern: DimVec,
    /// Receives `value` with its shape refined to `pattern`.
    pub var: Var,
    pub span: Span,
}

/// Runtime shape assertion and refinement binding.
///
/// Statically the IR is well-formed whether or not the match can succeed;
/// a mismatch is a runtime error raised by the evaluator.
#[derive(Clone, Debug)]
pub struct MatchShape(Arc<MatchShapeNode>);

impl MatchShape {
    pub fn new(value: Expr, pattern: impl Into<DimVec>, var: Var, span: Span) -> Self {
        MatchShape(Arc::new(MatchShapeNode {
            value,
            pattern: pattern.into(),
            var,
            span,
        }))
    }

    /// Pointer identity test.
    pub fn same_as(&self, other: &MatchShape) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Deref for MatchShape {
    type Target = MatchShapeNode;

    fn deref(&self) -> &MatchShapeNode {
        &self.0
    }
}

/// Binding sum.
#[derive(Clone, Debug)]
pub enum Binding {
    Var(VarBinding),
    MatchShape(MatchShape),
}

impl Binding {
    /// The variable this binding defines.
    pub fn var(&self) -> &Var {
        match self {
            Binding::Var(b) => &b.var,
            Binding::MatchShape(b) => &b.var,
        }
    }

    /// The bound value.
    pub fn value(&self) -> &Expr {
        match self {
            Binding::Var(b) => &b.value,
            Binding::MatchShape(b) => &b.value,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Binding::Var(b) => b.span,
            Binding::MatchShape(b) => b.span,
        }
    }
}

impl From<VarBinding> for Binding {
    fn from(binding: VarBinding) -> Binding {
        Binding::Var(binding)
    }
}

impl From<MatchShape> for Binding {
    fn from(binding: MatchShape) -> Binding {
        Binding::MatchShape(binding)
    }
}

/// Distinguishes dataflow blocks from ordinary ones. Tested by tag, like
/// [`VarKind`](crate::VarKind).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BlockKind {
    /// Arbitrary bindings, side effects allowed, sequenced in order.
    Plain,
    /// Every binding pure; the only region that may define dataflow vars.
    Dataflow,
}

/// Payload of [`BindingBlock`].
#[derive(Debug)]
pub struct BindingBlockNode {
    pub kind: BlockKind,
    /// Order is significant: later bindings may use earlier ones.
    pub bindings: Vec<Binding>,
    pub span: Span,
}

/// Ordered group of bindings.
#[derive(Clone, Debug)]
pub struct BindingBlock(Arc<BindingBlockNode>);

impl BindingBlock {
    /// Ordinary block.
    pub fn new(bindings: Vec<Binding>, span: Span) -> Self {
        BindingBlock(Arc::new(BindingBlockNode {
            kind: BlockKind::Plain,
            bindings,
            span,
        }))
    }

    /// Dataflow block.
    pub fn dataflow(bindings: Vec<Binding>, span: Span) -> Self {
        BindingBlock(Arc::new(BindingBlockNode {
            kind: BlockKind::Dataflow,
            bindings,
            span,
        }))
    }

    pub fn is_dataflow(&self) -> bool {
        self.kind == BlockKind::Dataflow
    }

    /// Pointer identity test.
    pub fn same_as(&self, other: &BindingBlock) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Deref for BindingBlock {
    type Target = BindingBlockNode;

    fn deref(&self) -> &BindingBlockNode {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PrimExpr, Span};
    use smallvec::smallvec;

    #[test]
    fn test_var_binding_accessors() {
        let x = Var::new("x", None, None, Span::new(0, 1));
        let y = Var::new("y", None, None, Span::new(4, 5));
        let binding: Binding = VarBinding::new(y.clone(), x.clone().into(), Span::new(4, 9)).into();
        assert!(binding.var().same_as(&y));
        assert!(binding.value().same_as(&x.into()));
        assert_eq!(binding.span(), Span::new(4, 9));
    }

    #[test]
    fn test_match_shape_accessors() {
        let t = Var::new("t", None, None, Span::new(0, 1));
        let t2 = Var::new("t2", None, None, Span::new(10, 12));
        let pattern: crate::DimVec = smallvec![PrimExpr::var("m"), PrimExpr::var("n")];
        let binding: Binding =
            MatchShape::new(t.clone().into(), pattern, t2.clone(), Span::new(10, 30)).into();
        assert!(binding.var().same_as(&t2));
        let Binding::MatchShape(ms) = &binding else {
            panic!("expected MatchShape variant");
        };
        assert_eq!(ms.pattern.len(), 2);
        assert!(ms.pattern[0].is_var());
    }

    #[test]
    fn test_block_kinds() {
        let block = BindingBlock::new(Vec::new(), Span::DUMMY);
        let dataflow = BindingBlock::dataflow(Vec::new(), Span::DUMMY);
        assert!(!block.is_dataflow());
        assert!(dataflow.is_dataflow());
        assert_eq!(block.kind, BlockKind::Plain);
        assert_eq!(dataflow.kind, BlockKind::Dataflow);
    }

    #[test]
    fn test_binding_order_preserved() {
        let x = Var::new("x", None, None, Span::DUMMY);
        let y = Var::new("y", None, None, Span::DUMMY);
        let shape: Expr = crate::ShapeExpr::new(vec![PrimExpr::Int(1)], Span::DUMMY).into();
        let bindings = vec![
            Binding::from(VarBinding::new(x.clone(), shape.clone(), Span::DUMMY)),
            Binding::from(VarBinding::new(y.clone(), x.clone().into(), Span::DUMMY)),
        ];
        let block = BindingBlock::new(bindings, Span::DUMMY);
        assert_eq!(block.bindings.len(), 2);
        assert!(block.bindings[0].var().same_as(&x));
        assert!(block.bindings[1].var().same_as(&y));
    }
}
