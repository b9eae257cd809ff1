//! Node constructor and type-key registry.
//!
//! Frontends, the parser, and the printer build nodes through a uniform
//! name-indexed dispatch instead of linking against concrete constructors:
//! every constructor registers under a stable dotted name, and every node
//! variant registers a stable type key. The table is process-wide, built
//! once on first use, and read-only afterwards.
//!
//! Constructors validate arity and argument kinds and report the offending
//! name immediately. They do not validate scoping or purity; that is the
//! checker pass's job.

use std::sync::OnceLock;

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::{
    Binding, BindingBlock, Expr, ExternFunc, Function, GlobalVar, Id, MatchShape, Name, PrimExpr,
    SeqExpr, ShapeExpr, Span, Type, Var, VarBinding,
};

/// Erased argument (and result) value for registry dispatch.
#[derive(Clone, Debug)]
pub enum ArgValue {
    Span(Span),
    Str(Name),
    Expr(Expr),
    OptExpr(Option<Expr>),
    Type(Type),
    OptType(Option<Type>),
    Prims(Vec<PrimExpr>),
    Exprs(Vec<Expr>),
    Var(Var),
    Vars(Vec<Var>),
    OptGlobal(Option<GlobalVar>),
    Binding(Binding),
    Bindings(Vec<Binding>),
    Block(BindingBlock),
    Blocks(Vec<BindingBlock>),
}

/// Error from a registry call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("no constructor registered under `{name}`")]
    UnknownFunction { name: String },

    #[error("`{name}` expects {expected} arguments, got {got}")]
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
    },

    #[error("`{name}` argument {index} must be {expected}")]
    WrongArgument {
        name: String,
        index: usize,
        expected: &'static str,
    },
}

impl ArgValue {
    fn wrong(name: &str, index: usize, expected: &'static str) -> RegistryError {
        RegistryError::WrongArgument {
            name: name.to_owned(),
            index,
            expected,
        }
    }

    fn expect_span(&self, name: &str, index: usize) -> Result<Span, RegistryError> {
        match self {
            ArgValue::Span(span) => Ok(*span),
            _ => Err(Self::wrong(name, index, "a Span")),
        }
    }

    fn expect_str(&self, name: &str, index: usize) -> Result<Name, RegistryError> {
        match self {
            ArgValue::Str(s) => Ok(*s),
            _ => Err(Self::wrong(name, index, "a string")),
        }
    }

    fn expect_expr(&self, name: &str, index: usize) -> Result<Expr, RegistryError> {
        match self {
            ArgValue::Expr(e) => Ok(e.clone()),
            _ => Err(Self::wrong(name, index, "an Expr")),
        }
    }

    /// Optional slots also accept a bare value for frontend convenience.
    fn expect_opt_expr(&self, name: &str, index: usize) -> Result<Option<Expr>, RegistryError> {
        match self {
            ArgValue::OptExpr(e) => Ok(e.clone()),
            ArgValue::Expr(e) => Ok(Some(e.clone())),
            _ => Err(Self::wrong(name, index, "an optional Expr")),
        }
    }

    fn expect_type(&self, name: &str, index: usize) -> Result<Type, RegistryError> {
        match self {
            ArgValue::Type(ty) => Ok(ty.clone()),
            _ => Err(Self::wrong(name, index, "a Type")),
        }
    }

    fn expect_opt_type(&self, name: &str, index: usize) -> Result<Option<Type>, RegistryError> {
        match self {
            ArgValue::OptType(ty) => Ok(ty.clone()),
            ArgValue::Type(ty) => Ok(Some(ty.clone())),
            _ => Err(Self::wrong(name, index, "an optional Type")),
        }
    }

    fn expect_prims(&self, name: &str, index: usize) -> Result<Vec<PrimExpr>, RegistryError> {
        match self {
            ArgValue::Prims(values) => Ok(values.clone()),
            _ => Err(Self::wrong(name, index, "a PrimExpr array")),
        }
    }

    fn expect_var(&self, name: &str, index: usize) -> Result<Var, RegistryError> {
        match self {
            ArgValue::Var(var) => Ok(var.clone()),
            ArgValue::Expr(Expr::Var(var)) => Ok(var.clone()),
            _ => Err(Self::wrong(name, index, "a Var")),
        }
    }

    fn expect_vars(&self, name: &str, index: usize) -> Result<Vec<Var>, RegistryError> {
        match self {
            ArgValue::Vars(vars) => Ok(vars.clone()),
            _ => Err(Self::wrong(name, index, "a Var array")),
        }
    }

    fn expect_opt_global(
        &self,
        name: &str,
        index: usize,
    ) -> Result<Option<GlobalVar>, RegistryError> {
        match self {
            ArgValue::OptGlobal(gv) => Ok(gv.clone()),
            ArgValue::Expr(Expr::Global(gv)) => Ok(Some(gv.clone())),
            _ => Err(Self::wrong(name, index, "an optional GlobalVar")),
        }
    }

    fn expect_binding(&self, name: &str, index: usize) -> Result<Binding, RegistryError> {
        match self {
            ArgValue::Binding(binding) => Ok(binding.clone()),
            _ => Err(Self::wrong(name, index, "a Binding")),
        }
    }

    fn expect_bindings(&self, name: &str, index: usize) -> Result<Vec<Binding>, RegistryError> {
        match self {
            ArgValue::Bindings(bindings) => Ok(bindings.clone()),
            _ => Err(Self::wrong(name, index, "a Binding array")),
        }
    }

    fn expect_blocks(&self, name: &str, index: usize) -> Result<Vec<BindingBlock>, RegistryError> {
        match self {
            ArgValue::Blocks(blocks) => Ok(blocks.clone()),
            _ => Err(Self::wrong(name, index, "a BindingBlock array")),
        }
    }
}

type Ctor = Box<dyn Fn(&[ArgValue]) -> Result<ArgValue, RegistryError> + Send + Sync>;

/// Global registry singleton.
static GLOBAL_REGISTRY: OnceLock<Registry> = OnceLock::new();

/// Name-indexed constructor table plus the set of registered type keys.
pub struct Registry {
    ctors: FxHashMap<&'static str, Ctor>,
    type_keys: Vec<&'static str>,
}

fn expect_arity(name: &str, args: &[ArgValue], expected: usize) -> Result<(), RegistryError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(RegistryError::ArityMismatch {
            name: name.to_owned(),
            expected,
            got: args.len(),
        })
    }
}

impl Registry {
    /// Get the global registry with every node constructor registered.
    pub fn global() -> &'static Registry {
        GLOBAL_REGISTRY.get_or_init(Registry::new)
    }

    fn new() -> Self {
        let mut registry = Registry {
            ctors: FxHashMap::default(),
            type_keys: Vec::new(),
        };
        registry.register_builtin_ctors();
        registry.register_builtin_type_keys();
        registry
    }

    fn register(
        &mut self,
        name: &'static str,
        ctor: impl Fn(&[ArgValue]) -> Result<ArgValue, RegistryError> + Send + Sync + 'static,
    ) {
        self.ctors.insert(name, Box::new(ctor));
    }

    fn register_builtin_ctors(&mut self) {
        self.register("relax.ShapeExpr", |args| {
            let name = "relax.ShapeExpr";
            expect_arity(name, args, 2)?;
            let values = args[0].expect_prims(name, 0)?;
            let span = args[1].expect_span(name, 1)?;
            Ok(ArgValue::Expr(ShapeExpr::new(values, span).into()))
        });

        self.register("relax.Var", |args| {
            let name = "relax.Var";
            expect_arity(name, args, 4)?;
            let hint = args[0].expect_str(name, 0)?;
            let shape_annotation = args[1].expect_opt_expr(name, 1)?;
            let type_annotation = args[2].expect_opt_type(name, 2)?;
            let span = args[3].expect_span(name, 3)?;
            let var = Var::from_id(
                Id::fresh_from_name(hint),
                shape_annotation,
                type_annotation,
                span,
            );
            Ok(ArgValue::Expr(var.into()))
        });

        self.register("relax.DataflowVar", |args| {
            let name = "relax.DataflowVar";
            expect_arity(name, args, 4)?;
            let hint = args[0].expect_str(name, 0)?;
            let shape_annotation = args[1].expect_opt_expr(name, 1)?;
            let type_annotation = args[2].expect_opt_type(name, 2)?;
            let span = args[3].expect_span(name, 3)?;
            let var = Var::dataflow_from_id(
                Id::fresh_from_name(hint),
                shape_annotation,
                type_annotation,
                span,
            );
            Ok(ArgValue::Expr(var.into()))
        });

        // Upcast pass-through: lets frontends hold any binding under the
        // base name without knowing its concrete variant.
        self.register("relax.Binding", |args| {
            let name = "relax.Binding";
            expect_arity(name, args, 1)?;
            let binding = args[0].expect_binding(name, 0)?;
            Ok(ArgValue::Binding(binding))
        });

        self.register("relax.VarBinding", |args| {
            let name = "relax.VarBinding";
            expect_arity(name, args, 3)?;
            let var = args[0].expect_var(name, 0)?;
            let value = args[1].expect_expr(name, 1)?;
            let span = args[2].expect_span(name, 2)?;
            Ok(ArgValue::Binding(VarBinding::new(var, value, span).into()))
        });

        self.register("relax.MatchShape", |args| {
            let name = "relax.MatchShape";
            expect_arity(name, args, 4)?;
            let value = args[0].expect_expr(name, 0)?;
            let pattern = args[1].expect_prims(name, 1)?;
            let var = args[2].expect_var(name, 2)?;
            let span = args[3].expect_span(name, 3)?;
            Ok(ArgValue::Binding(
                MatchShape::new(value, pattern, var, span).into(),
            ))
        });

        self.register("relax.BindingBlock", |args| {
            let name = "relax.BindingBlock";
            expect_arity(name, args, 2)?;
            let bindings = args[0].expect_bindings(name, 0)?;
            let span = args[1].expect_span(name, 1)?;
            Ok(ArgValue::Block(BindingBlock::new(bindings, span)))
        });

        self.register("relax.DataflowBlock", |args| {
            let name = "relax.DataflowBlock";
            expect_arity(name, args, 2)?;
            let bindings = args[0].expect_bindings(name, 0)?;
            let span = args[1].expect_span(name, 1)?;
            Ok(ArgValue::Block(BindingBlock::dataflow(bindings, span)))
        });

        self.register("relax.SeqExpr", |args| {
            let name = "relax.SeqExpr";
            expect_arity(name, args, 3)?;
            let blocks = args[0].expect_blocks(name, 0)?;
            let body = args[1].expect_expr(name, 1)?;
            let span = args[2].expect_span(name, 2)?;
            Ok(ArgValue::Expr(SeqExpr::new(blocks, body, span).into()))
        });

        self.register("relax.Function", |args| {
            let name = "relax.Function";
            expect_arity(name, args, 5)?;
            let global = args[0].expect_opt_global(name, 0)?;
            let params = args[1].expect_vars(name, 1)?;
            let body = args[2].expect_expr(name, 2)?;
            let ret_type = args[3].expect_type(name, 3)?;
            let span = args[4].expect_span(name, 4)?;
            Ok(ArgValue::Expr(
                Function::new(global, params, body, ret_type, span).into(),
            ))
        });

        self.register("relax.ExternFunc", |args| {
            let name = "relax.ExternFunc";
            expect_arity(name, args, 2)?;
            let symbol = args[0].expect_str(name, 0)?;
            let span = args[1].expect_span(name, 1)?;
            Ok(ArgValue::Expr(
                ExternFunc::new(symbol.as_str(), span).into(),
            ))
        });

        // The shape-of query, exposed for every expression variant.
        self.register("ir.RelayExprShape", |args| {
            let name = "ir.RelayExprShape";
            expect_arity(name, args, 1)?;
            let expr = args[0].expect_expr(name, 0)?;
            Ok(ArgValue::Expr(expr.shape()))
        });
    }

    fn register_builtin_type_keys(&mut self) {
        self.type_keys = vec![
            "relax.expr.Constant",
            "relax.expr.Tuple",
            "relax.expr.Var",
            "relax.expr.DataflowVar",
            "relax.expr.ShapeExpr",
            "relax.expr.ExternFunc",
            "relax.expr.Function",
            "relax.expr.Call",
            "relax.expr.SeqExpr",
            "relax.expr.If",
            "relax.expr.TupleGetItem",
            "ir.GlobalVar",
            "ir.Op",
            "relax.VarBinding",
            "relax.MatchShape",
            "relax.BindingBlock",
            "relax.DataflowBlock",
        ];
    }

    /// Invoke a registered constructor by name.
    pub fn call(&self, name: &str, args: &[ArgValue]) -> Result<ArgValue, RegistryError> {
        let ctor = self
            .ctors
            .get(name)
            .ok_or_else(|| RegistryError::UnknownFunction {
                name: name.to_owned(),
            })?;
        ctor(args)
    }

    /// Check if a constructor name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.ctors.contains_key(name)
    }

    /// All registered constructor names.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.ctors.keys().copied()
    }

    /// Check if a node type key is registered.
    pub fn is_registered_type(&self, key: &str) -> bool {
        self.type_keys.contains(&key)
    }

    /// All registered node type keys.
    pub fn type_keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.type_keys.iter().copied()
    }
}

#[cfg(test)]
mod tests;
