//! Relax IR - Core Node Library
//!
//! This crate contains the abstract-syntax / IR node types for the Relax
//! tensor-program language:
//! - Spans for source locations
//! - Interned names and variable identity tokens
//! - Symbolic scalar expressions (`PrimExpr`) and type terms
//! - Expression nodes (`Var`, `ShapeExpr`, `Call`, `SeqExpr`, `Function`, ...)
//! - Bindings, binding blocks, and dataflow blocks
//! - The operator registry and the node constructor registry
//!
//! # Design Philosophy
//!
//! - **Immutable, shared nodes**: every node is constructed once and shared
//!   by reference counting; programs are DAGs, never cyclic. Passes build
//!   replacement nodes instead of mutating.
//! - **Identity vs. structure**: node equality is pointer identity
//!   (`same_as`); variable identity is the `Id` token, never the name hint.
//! - **Permissive construction**: constructors accept ill-formed trees so
//!   rewrites can pass through intermediate states; the `relax_check` crate
//!   holds the strict well-formedness pass.
//! - **Total shape query**: `Expr::shape()` returns the cached symbolic
//!   shape when present and a deferred `relax.shape_of` call otherwise.

mod binding;
mod expr;
mod id;
mod interner;
mod name;
mod op;
mod prim;
mod registry;
mod span;
mod ty;
pub mod visitor;

pub use binding::{
    Binding, BindingBlock, BindingBlockNode, BlockKind, MatchShape, MatchShapeNode, VarBinding,
    VarBindingNode,
};
pub use expr::{
    AttrValue, Attrs, Call, CallNode, Constant, ConstantNode, DimVec, Expr, ExternFunc,
    ExternFuncNode, Function, FunctionNode, GlobalVar, GlobalVarNode, If, IfNode, SeqExpr,
    SeqExprNode, ShapeExpr, ShapeExprNode, TensorData, Tuple, TupleGetItem, TupleGetItemNode,
    TupleNode, Var, VarKind, VarNode,
};
pub use id::Id;
pub use interner::StringInterner;
pub use name::Name;
pub use op::{Op, OpNode, OpRegistry, SHAPE_OF};
pub use prim::PrimExpr;
pub use registry::{ArgValue, Registry, RegistryError};
pub use span::Span;
pub use ty::{DType, Type};
