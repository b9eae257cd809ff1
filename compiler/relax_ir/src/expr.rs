//! Expression nodes.
//!
//! Every node is an immutable, reference-counted payload behind a cheap
//! handle type (`Var`, `Call`, `SeqExpr`, ...); [`Expr`] is the tagged sum
//! of those handles. Parents share children freely, so a program is a DAG.
//! Node identity is pointer identity (`same_as`); structural comparison is
//! left to the reflection machinery outside this crate.
//!
//! Two derived attributes are cached on every node, write-once at
//! construction time: `shape_hint` (the symbolic shape, when annotated or
//! already inferred) and `checked_type`. Passes that refine either build a
//! replacement node instead of mutating in place.

use std::ops::Deref;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::op::{Op, OpRegistry};
use crate::{DType, Id, Name, PrimExpr, Span, Type};

/// Dimension list of a shape. Most tensor ranks are small; four inline
/// slots cover the common cases without a heap allocation.
pub type DimVec = SmallVec<[PrimExpr; 4]>;

/// Attribute value attached to a call site.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum AttrValue {
    Int(i64),
    Bool(bool),
    Str(Name),
}

/// Ordered call-site attributes.
pub type Attrs = Vec<(Name, AttrValue)>;

/// Opaque tensor payload of a [`Constant`].
///
/// The IR records only what identity and printing need: element type,
/// dimensions, and raw bytes in row-major order.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct TensorData {
    pub dtype: DType,
    pub dims: Vec<i64>,
    pub bytes: Vec<u8>,
}

/// Distinguishes dataflow-scoped variables from ordinary ones.
///
/// A dataflow variable is a distinct variant tested by tag, not a separate
/// node type: everything that accepts a `Var` accepts either kind, and the
/// well-formedness checker enforces where each may be defined and used.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum VarKind {
    /// Visible from its definition to the end of the enclosing `SeqExpr`.
    Plain,
    /// Visible only within its defining `DataflowBlock`.
    Dataflow,
}

// Node payloads.
//
// Field order convention: variant-specific fields first, then the three
// common fields `span`, `shape_hint`, `checked_type`.

/// Payload of [`Constant`].
#[derive(Debug)]
pub struct ConstantNode {
    pub data: TensorData,
    pub span: Span,
    pub shape_hint: Option<Expr>,
    pub checked_type: Option<Type>,
}

/// Payload of [`Tuple`].
#[derive(Debug)]
pub struct TupleNode {
    pub fields: Vec<Expr>,
    pub span: Span,
    pub shape_hint: Option<Expr>,
    pub checked_type: Option<Type>,
}

/// Payload of [`Var`].
#[derive(Debug)]
pub struct VarNode {
    /// Referential identity. Every handle to one logical variable shares
    /// this `Id`; the name hint inside it carries no identity.
    pub vid: Id,
    pub kind: VarKind,
    /// The user-written type annotation, kept verbatim for printing.
    pub type_annotation: Option<Type>,
    pub span: Span,
    pub shape_hint: Option<Expr>,
    pub checked_type: Option<Type>,
}

/// Payload of [`ShapeExpr`].
#[derive(Debug)]
pub struct ShapeExprNode {
    /// Ordered symbolic dimensions. Stored as given; no normalization.
    pub values: DimVec,
    pub span: Span,
    pub shape_hint: Option<Expr>,
    pub checked_type: Option<Type>,
}

/// Payload of [`ExternFunc`].
#[derive(Debug)]
pub struct ExternFuncNode {
    /// Symbol resolved by the host runtime; the IR knows nothing else.
    pub global_symbol: Name,
    pub span: Span,
    pub shape_hint: Option<Expr>,
    pub checked_type: Option<Type>,
}

/// Payload of [`GlobalVar`].
#[derive(Debug)]
pub struct GlobalVarNode {
    pub name_hint: Name,
    pub span: Span,
    pub shape_hint: Option<Expr>,
    pub checked_type: Option<Type>,
}

/// Payload of [`Function`].
#[derive(Debug)]
pub struct FunctionNode {
    /// Optional global name, present for recursion and module exposure.
    pub name: Option<GlobalVar>,
    pub params: Vec<Var>,
    pub body: Expr,
    pub ret_type: Type,
    pub span: Span,
    pub shape_hint: Option<Expr>,
    pub checked_type: Option<Type>,
}

/// Payload of [`Call`].
#[derive(Debug)]
pub struct CallNode {
    /// Callee: an [`Op`], a function-valued expression, or an extern.
    pub op: Expr,
    pub args: Vec<Expr>,
    pub attrs: Attrs,
    pub type_args: Vec<Type>,
    pub span: Span,
    pub shape_hint: Option<Expr>,
    pub checked_type: Option<Type>,
}

/// Payload of [`SeqExpr`].
#[derive(Debug)]
pub struct SeqExprNode {
    pub blocks: Vec<crate::BindingBlock>,
    pub body: Expr,
    pub span: Span,
    pub shape_hint: Option<Expr>,
    pub checked_type: Option<Type>,
}

/// Payload of [`If`].
#[derive(Debug)]
pub struct IfNode {
    pub cond: Expr,
    pub true_branch: Expr,
    pub false_branch: Expr,
    pub span: Span,
    pub shape_hint: Option<Expr>,
    pub checked_type: Option<Type>,
}

/// Payload of [`TupleGetItem`].
#[derive(Debug)]
pub struct TupleGetItemNode {
    pub tuple: Expr,
    pub index: usize,
    pub span: Span,
    pub shape_hint: Option<Expr>,
    pub checked_type: Option<Type>,
}

macro_rules! impl_expr_ref {
    ($Ref:ident, $Node:ident, $variant:ident) => {
        impl $Ref {
            /// Pointer identity test.
            pub fn same_as(&self, other: &$Ref) -> bool {
                Arc::ptr_eq(&self.0, &other.0)
            }
        }

        impl Deref for $Ref {
            type Target = $Node;

            fn deref(&self) -> &$Node {
                &self.0
            }
        }

        impl From<$Ref> for Expr {
            fn from(node: $Ref) -> Expr {
                Expr::$variant(node)
            }
        }
    };
}

/// Constant tensor handle.
#[derive(Clone, Debug)]
pub struct Constant(Arc<ConstantNode>);
impl_expr_ref!(Constant, ConstantNode, Constant);

/// Tuple construction handle.
#[derive(Clone, Debug)]
pub struct Tuple(Arc<TupleNode>);
impl_expr_ref!(Tuple, TupleNode, Tuple);

/// Variable handle (plain or dataflow, see [`VarKind`]).
#[derive(Clone, Debug)]
pub struct Var(Arc<VarNode>);
impl_expr_ref!(Var, VarNode, Var);

/// Symbolic shape tuple handle.
#[derive(Clone, Debug)]
pub struct ShapeExpr(Arc<ShapeExprNode>);
impl_expr_ref!(ShapeExpr, ShapeExprNode, Shape);

/// Opaque external function handle.
#[derive(Clone, Debug)]
pub struct ExternFunc(Arc<ExternFuncNode>);
impl_expr_ref!(ExternFunc, ExternFuncNode, Extern);

/// Module-level name handle.
#[derive(Clone, Debug)]
pub struct GlobalVar(Arc<GlobalVarNode>);
impl_expr_ref!(GlobalVar, GlobalVarNode, Global);

/// Function value handle.
#[derive(Clone, Debug)]
pub struct Function(Arc<FunctionNode>);
impl_expr_ref!(Function, FunctionNode, Function);

/// Call site handle.
#[derive(Clone, Debug)]
pub struct Call(Arc<CallNode>);
impl_expr_ref!(Call, CallNode, Call);

/// Block sequence handle.
#[derive(Clone, Debug)]
pub struct SeqExpr(Arc<SeqExprNode>);
impl_expr_ref!(SeqExpr, SeqExprNode, Seq);

/// Conditional handle.
#[derive(Clone, Debug)]
pub struct If(Arc<IfNode>);
impl_expr_ref!(If, IfNode, If);

/// Tuple projection handle.
#[derive(Clone, Debug)]
pub struct TupleGetItem(Arc<TupleGetItemNode>);
impl_expr_ref!(TupleGetItem, TupleGetItemNode, TupleGetItem);

impl Constant {
    pub fn new(data: TensorData, span: Span) -> Self {
        Constant(Arc::new(ConstantNode {
            data,
            span,
            shape_hint: None,
            checked_type: None,
        }))
    }
}

impl Tuple {
    pub fn new(fields: Vec<Expr>, span: Span) -> Self {
        Tuple(Arc::new(TupleNode {
            fields,
            span,
            shape_hint: None,
            checked_type: None,
        }))
    }
}

impl Var {
    /// Plain variable with a fresh identity.
    ///
    /// A shape annotation seeds the shape cache; a type annotation seeds
    /// the checked type.
    pub fn new(
        name_hint: &str,
        shape_annotation: Option<Expr>,
        type_annotation: Option<Type>,
        span: Span,
    ) -> Self {
        Self::from_id(Id::fresh(name_hint), shape_annotation, type_annotation, span)
    }

    /// Plain variable reusing an existing identity.
    pub fn from_id(
        vid: Id,
        shape_annotation: Option<Expr>,
        type_annotation: Option<Type>,
        span: Span,
    ) -> Self {
        let checked_type = type_annotation.clone();
        Var(Arc::new(VarNode {
            vid,
            kind: VarKind::Plain,
            type_annotation,
            span,
            shape_hint: shape_annotation,
            checked_type,
        }))
    }

    /// Dataflow variable with a fresh identity.
    pub fn dataflow(
        name_hint: &str,
        shape_annotation: Option<Expr>,
        type_annotation: Option<Type>,
        span: Span,
    ) -> Self {
        Self::dataflow_from_id(Id::fresh(name_hint), shape_annotation, type_annotation, span)
    }

    /// Dataflow variable reusing an existing identity.
    ///
    /// Unlike a plain variable, the checked type is not seeded from the
    /// annotation; it is left for inference to fill on a rebuilt node.
    pub fn dataflow_from_id(
        vid: Id,
        shape_annotation: Option<Expr>,
        type_annotation: Option<Type>,
        span: Span,
    ) -> Self {
        Var(Arc::new(VarNode {
            vid,
            kind: VarKind::Dataflow,
            type_annotation,
            span,
            shape_hint: shape_annotation,
            checked_type: None,
        }))
    }

    pub fn name_hint(&self) -> Name {
        self.vid.name_hint()
    }

    pub fn is_dataflow(&self) -> bool {
        self.kind == VarKind::Dataflow
    }

    /// Rebuild this variable with an inferred shape deposited in the cache.
    ///
    /// Identity (`vid`), kind, annotation, and span are shared with the
    /// original; the original node is untouched.
    #[must_use]
    pub fn with_shape_hint(&self, shape: Expr) -> Var {
        Var(Arc::new(VarNode {
            vid: self.vid,
            kind: self.kind,
            type_annotation: self.type_annotation.clone(),
            span: self.span,
            shape_hint: Some(shape),
            checked_type: self.checked_type.clone(),
        }))
    }

    /// Rebuild this variable with an inferred checked type.
    #[must_use]
    pub fn with_checked_type(&self, ty: Type) -> Var {
        Var(Arc::new(VarNode {
            vid: self.vid,
            kind: self.kind,
            type_annotation: self.type_annotation.clone(),
            span: self.span,
            shape_hint: self.shape_hint.clone(),
            checked_type: Some(ty),
        }))
    }
}

impl ShapeExpr {
    /// Shape tuple over symbolic dimensions. Values are stored as given.
    pub fn new(values: impl Into<DimVec>, span: Span) -> Self {
        ShapeExpr(Arc::new(ShapeExprNode {
            values: values.into(),
            span,
            shape_hint: None,
            checked_type: None,
        }))
    }
}

impl ExternFunc {
    pub fn new(global_symbol: &str, span: Span) -> Self {
        ExternFunc(Arc::new(ExternFuncNode {
            global_symbol: Name::intern(global_symbol),
            span,
            shape_hint: None,
            checked_type: None,
        }))
    }
}

impl GlobalVar {
    pub fn new(name_hint: &str, span: Span) -> Self {
        GlobalVar(Arc::new(GlobalVarNode {
            name_hint: Name::intern(name_hint),
            span,
            shape_hint: None,
            checked_type: None,
        }))
    }
}

impl Function {
    pub fn new(
        name: Option<GlobalVar>,
        params: Vec<Var>,
        body: Expr,
        ret_type: Type,
        span: Span,
    ) -> Self {
        Function(Arc::new(FunctionNode {
            name,
            params,
            body,
            ret_type,
            span,
            shape_hint: None,
            checked_type: None,
        }))
    }
}

impl Call {
    pub fn new(
        op: Expr,
        args: Vec<Expr>,
        attrs: Attrs,
        type_args: Vec<Type>,
        span: Span,
    ) -> Self {
        Call(Arc::new(CallNode {
            op,
            args,
            attrs,
            type_args,
            span,
            shape_hint: None,
            checked_type: None,
        }))
    }
}

impl SeqExpr {
    pub fn new(blocks: Vec<crate::BindingBlock>, body: Expr, span: Span) -> Self {
        SeqExpr(Arc::new(SeqExprNode {
            blocks,
            body,
            span,
            shape_hint: None,
            checked_type: None,
        }))
    }
}

impl If {
    pub fn new(cond: Expr, true_branch: Expr, false_branch: Expr, span: Span) -> Self {
        If(Arc::new(IfNode {
            cond,
            true_branch,
            false_branch,
            span,
            shape_hint: None,
            checked_type: None,
        }))
    }
}

impl TupleGetItem {
    pub fn new(tuple: Expr, index: usize, span: Span) -> Self {
        TupleGetItem(Arc::new(TupleGetItemNode {
            tuple,
            index,
            span,
            shape_hint: None,
            checked_type: None,
        }))
    }
}

/// Expression sum.
///
/// Cloning clones a handle, never a payload. Matching on the enum is the
/// tag test; [`Expr::same_as`] is the identity test.
#[derive(Clone, Debug)]
pub enum Expr {
    Constant(Constant),
    Tuple(Tuple),
    Var(Var),
    Shape(ShapeExpr),
    Extern(ExternFunc),
    Global(GlobalVar),
    Function(Function),
    Call(Call),
    Seq(SeqExpr),
    If(If),
    TupleGetItem(TupleGetItem),
    Op(Op),
}

impl From<Op> for Expr {
    fn from(op: Op) -> Expr {
        Expr::Op(op)
    }
}

macro_rules! dispatch {
    ($self:expr, $x:ident => $body:expr, Op => $op_body:expr) => {
        match $self {
            Expr::Op(_) => $op_body,
            Expr::Constant($x) => $body,
            Expr::Tuple($x) => $body,
            Expr::Var($x) => $body,
            Expr::Shape($x) => $body,
            Expr::Extern($x) => $body,
            Expr::Global($x) => $body,
            Expr::Function($x) => $body,
            Expr::Call($x) => $body,
            Expr::Seq($x) => $body,
            Expr::If($x) => $body,
            Expr::TupleGetItem($x) => $body,
        }
    };
}

impl Expr {
    /// Source location of this node. Operators are global singletons
    /// without provenance.
    pub fn span(&self) -> Span {
        dispatch!(self, x => x.span, Op => Span::DUMMY)
    }

    /// The cached symbolic shape, if an annotation or an earlier inference
    /// pass deposited one.
    pub fn shape_hint(&self) -> Option<&Expr> {
        dispatch!(self, x => x.shape_hint.as_ref(), Op => None)
    }

    /// The cached checked type, if annotated or already inferred.
    pub fn checked_type(&self) -> Option<&Type> {
        dispatch!(self, x => x.checked_type.as_ref(), Op => None)
    }

    /// The shape of this expression. Total: returns the cached shape when
    /// one is set, otherwise a deferred `relax.shape_of` call carrying this
    /// node as its only argument. The deferred form is an ordinary
    /// expression for later evaluation or analysis.
    pub fn shape(&self) -> Expr {
        if let Some(shape) = self.shape_hint() {
            return shape.clone();
        }
        let op = OpRegistry::global().shape_of();
        Call::new(op.into(), vec![self.clone()], Attrs::new(), Vec::new(), Span::DUMMY).into()
    }

    /// Pointer identity test. Handles of different variants are never the
    /// same node.
    pub fn same_as(&self, other: &Expr) -> bool {
        match (self, other) {
            (Expr::Constant(a), Expr::Constant(b)) => a.same_as(b),
            (Expr::Tuple(a), Expr::Tuple(b)) => a.same_as(b),
            (Expr::Var(a), Expr::Var(b)) => a.same_as(b),
            (Expr::Shape(a), Expr::Shape(b)) => a.same_as(b),
            (Expr::Extern(a), Expr::Extern(b)) => a.same_as(b),
            (Expr::Global(a), Expr::Global(b)) => a.same_as(b),
            (Expr::Function(a), Expr::Function(b)) => a.same_as(b),
            (Expr::Call(a), Expr::Call(b)) => a.same_as(b),
            (Expr::Seq(a), Expr::Seq(b)) => a.same_as(b),
            (Expr::If(a), Expr::If(b)) => a.same_as(b),
            (Expr::TupleGetItem(a), Expr::TupleGetItem(b)) => a.same_as(b),
            (Expr::Op(a), Expr::Op(b)) => a.same_as(b),
            _ => false,
        }
    }

    /// Stable type key of this node's variant, as registered with the node
    /// registry. Dataflow variables report their own key: they are a
    /// distinguished variant even though they share the `Var` handle type.
    pub fn type_key(&self) -> &'static str {
        match self {
            Expr::Constant(_) => "relax.expr.Constant",
            Expr::Tuple(_) => "relax.expr.Tuple",
            Expr::Var(v) if v.is_dataflow() => "relax.expr.DataflowVar",
            Expr::Var(_) => "relax.expr.Var",
            Expr::Shape(_) => "relax.expr.ShapeExpr",
            Expr::Extern(_) => "relax.expr.ExternFunc",
            Expr::Global(_) => "ir.GlobalVar",
            Expr::Function(_) => "relax.expr.Function",
            Expr::Call(_) => "relax.expr.Call",
            Expr::Seq(_) => "relax.expr.SeqExpr",
            Expr::If(_) => "relax.expr.If",
            Expr::TupleGetItem(_) => "relax.expr.TupleGetItem",
            Expr::Op(_) => "ir.Op",
        }
    }

    /// Downcast to a variable handle.
    pub fn as_var(&self) -> Option<&Var> {
        match self {
            Expr::Var(v) => Some(v),
            _ => None,
        }
    }

    /// Downcast to a call handle.
    pub fn as_call(&self) -> Option<&Call> {
        match self {
            Expr::Call(c) => Some(c),
            _ => None,
        }
    }
}
