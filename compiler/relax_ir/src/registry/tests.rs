use pretty_assertions::assert_eq;

use super::*;
use crate::SHAPE_OF;

fn span(start: u32, end: u32) -> ArgValue {
    ArgValue::Span(Span::new(start, end))
}

fn str_arg(s: &str) -> ArgValue {
    ArgValue::Str(Name::intern(s))
}

#[test]
fn test_all_constructor_names_registered() {
    let registry = Registry::global();
    for name in [
        "relax.ShapeExpr",
        "relax.Var",
        "relax.DataflowVar",
        "relax.Binding",
        "relax.VarBinding",
        "relax.MatchShape",
        "relax.BindingBlock",
        "relax.DataflowBlock",
        "relax.SeqExpr",
        "relax.Function",
        "relax.ExternFunc",
        "ir.RelayExprShape",
    ] {
        assert!(registry.contains(name), "missing constructor `{name}`");
    }
    assert!(!registry.contains("relax.NoSuchNode"));
    assert!(registry.names().count() >= 12);
}

#[test]
fn test_type_keys_registered() {
    let registry = Registry::global();
    for key in [
        "relax.expr.ShapeExpr",
        "relax.expr.Var",
        "relax.expr.DataflowVar",
        "relax.expr.SeqExpr",
        "relax.VarBinding",
        "relax.MatchShape",
        "relax.DataflowBlock",
        "ir.Op",
    ] {
        assert!(registry.is_registered_type(key), "missing type key `{key}`");
    }
    assert!(!registry.is_registered_type("relax.expr.Nonexistent"));
    assert!(registry.type_keys().count() >= 17);
}

#[test]
fn test_construct_shape_expr() {
    let result = Registry::global().call(
        "relax.ShapeExpr",
        &[
            ArgValue::Prims(vec![PrimExpr::var("n"), PrimExpr::Int(4)]),
            span(0, 6),
        ],
    );
    let Ok(ArgValue::Expr(Expr::Shape(shape))) = result else {
        panic!("expected a ShapeExpr, got {result:?}");
    };
    assert_eq!(shape.values.len(), 2);
    assert_eq!(shape.span, Span::new(0, 6));
}

#[test]
fn test_construct_var_and_dataflow_var() {
    let registry = Registry::global();
    let ty = crate::Type::tensor(1, crate::DType::F32);

    let result = registry.call(
        "relax.Var",
        &[
            str_arg("x"),
            ArgValue::OptExpr(None),
            ArgValue::Type(ty.clone()),
            span(0, 1),
        ],
    );
    let Ok(ArgValue::Expr(expr)) = result else {
        panic!("expected an expression, got {result:?}");
    };
    assert_eq!(expr.type_key(), "relax.expr.Var");
    let Expr::Var(var) = &expr else {
        panic!("expected a Var");
    };
    assert_eq!(var.name_hint().as_str(), "x");
    assert_eq!(var.checked_type.as_ref(), Some(&ty));

    let result = registry.call(
        "relax.DataflowVar",
        &[
            str_arg("lv0"),
            ArgValue::OptExpr(None),
            ArgValue::OptType(None),
            span(2, 5),
        ],
    );
    let Ok(ArgValue::Expr(expr)) = result else {
        panic!("expected an expression, got {result:?}");
    };
    assert_eq!(expr.type_key(), "relax.expr.DataflowVar");
}

#[test]
fn test_separate_registry_vars_are_distinct() {
    let registry = Registry::global();
    let args = [
        str_arg("x"),
        ArgValue::OptExpr(None),
        ArgValue::OptType(None),
        span(0, 1),
    ];
    let Ok(ArgValue::Expr(Expr::Var(a))) = registry.call("relax.Var", &args) else {
        panic!("expected a Var");
    };
    let Ok(ArgValue::Expr(Expr::Var(b))) = registry.call("relax.Var", &args) else {
        panic!("expected a Var");
    };
    assert_ne!(a.vid, b.vid);
}

#[test]
fn test_construct_bindings_blocks_seq() {
    let registry = Registry::global();
    let x = Var::new("x", None, None, Span::new(0, 1));
    let value: Expr = ShapeExpr::new(vec![PrimExpr::Int(2)], Span::DUMMY).into();

    let Ok(ArgValue::Binding(binding)) = registry.call(
        "relax.VarBinding",
        &[
            ArgValue::Var(x.clone()),
            ArgValue::Expr(value),
            span(0, 10),
        ],
    ) else {
        panic!("expected a binding");
    };
    assert!(binding.var().same_as(&x));

    // Base-name upcast keeps the binding unchanged.
    let Ok(ArgValue::Binding(upcast)) =
        registry.call("relax.Binding", &[ArgValue::Binding(binding.clone())])
    else {
        panic!("expected a binding back");
    };
    assert!(upcast.var().same_as(&x));

    let Ok(ArgValue::Block(block)) = registry.call(
        "relax.BindingBlock",
        &[ArgValue::Bindings(vec![binding.clone()]), span(0, 10)],
    ) else {
        panic!("expected a block");
    };
    assert!(!block.is_dataflow());

    let Ok(ArgValue::Block(dataflow)) = registry.call(
        "relax.DataflowBlock",
        &[ArgValue::Bindings(vec![binding]), span(0, 10)],
    ) else {
        panic!("expected a dataflow block");
    };
    assert!(dataflow.is_dataflow());

    let Ok(ArgValue::Expr(Expr::Seq(seq))) = registry.call(
        "relax.SeqExpr",
        &[
            ArgValue::Blocks(vec![block, dataflow]),
            ArgValue::Expr(x.into()),
            span(0, 20),
        ],
    ) else {
        panic!("expected a SeqExpr");
    };
    assert_eq!(seq.blocks.len(), 2);
}

#[test]
fn test_construct_match_shape() {
    let t = Var::new("t", None, None, Span::DUMMY);
    let t2 = Var::new("t2", None, None, Span::DUMMY);
    let Ok(ArgValue::Binding(Binding::MatchShape(ms))) = Registry::global().call(
        "relax.MatchShape",
        &[
            ArgValue::Expr(t.into()),
            ArgValue::Prims(vec![PrimExpr::var("m"), PrimExpr::var("n")]),
            ArgValue::Var(t2.clone()),
            span(0, 25),
        ],
    ) else {
        panic!("expected a MatchShape binding");
    };
    assert_eq!(ms.pattern.len(), 2);
    assert!(ms.var.same_as(&t2));
}

#[test]
fn test_construct_function_and_extern() {
    let registry = Registry::global();
    let x = Var::new("x", None, None, Span::DUMMY);

    let Ok(ArgValue::Expr(Expr::Function(func))) = registry.call(
        "relax.Function",
        &[
            ArgValue::OptGlobal(None),
            ArgValue::Vars(vec![x.clone()]),
            ArgValue::Expr(x.into()),
            ArgValue::Type(crate::Type::Shape),
            span(0, 30),
        ],
    ) else {
        panic!("expected a Function");
    };
    assert!(func.name.is_none());
    assert_eq!(func.params.len(), 1);

    let Ok(ArgValue::Expr(Expr::Extern(ext))) = registry.call(
        "relax.ExternFunc",
        &[str_arg("my_kernel"), span(0, 9)],
    ) else {
        panic!("expected an ExternFunc");
    };
    assert_eq!(ext.global_symbol.as_str(), "my_kernel");
}

#[test]
fn test_shape_query_through_registry() {
    let registry = Registry::global();
    let annotation: Expr = ShapeExpr::new(vec![PrimExpr::Int(8)], Span::DUMMY).into();
    let annotated: Expr = Var::new("x", Some(annotation.clone()), None, Span::DUMMY).into();

    let Ok(ArgValue::Expr(got)) =
        registry.call("ir.RelayExprShape", &[ArgValue::Expr(annotated)])
    else {
        panic!("expected the cached shape");
    };
    assert!(got.same_as(&annotation));

    let bare: Expr = Var::new("y", None, None, Span::DUMMY).into();
    let Ok(ArgValue::Expr(Expr::Call(call))) =
        registry.call("ir.RelayExprShape", &[ArgValue::Expr(bare.clone())])
    else {
        panic!("expected a deferred call");
    };
    let Expr::Op(op) = &call.op else {
        panic!("expected operator callee");
    };
    assert_eq!(op.name.as_str(), SHAPE_OF);
    assert!(call.args[0].same_as(&bare));
}

#[test]
fn test_unknown_function() {
    let result = Registry::global().call("relax.NoSuchNode", &[]);
    assert_eq!(
        result.map(|_| ()),
        Err(RegistryError::UnknownFunction {
            name: "relax.NoSuchNode".to_owned()
        })
    );
}

#[test]
fn test_arity_mismatch() {
    let result = Registry::global().call("relax.ShapeExpr", &[span(0, 1)]);
    assert_eq!(
        result.map(|_| ()),
        Err(RegistryError::ArityMismatch {
            name: "relax.ShapeExpr".to_owned(),
            expected: 2,
            got: 1,
        })
    );
}

#[test]
fn test_wrong_argument() {
    let result = Registry::global().call("relax.ShapeExpr", &[span(0, 1), span(0, 1)]);
    assert_eq!(
        result.map(|_| ()),
        Err(RegistryError::WrongArgument {
            name: "relax.ShapeExpr".to_owned(),
            index: 0,
            expected: "a PrimExpr array",
        })
    );
}

#[test]
fn test_error_messages_name_the_constructor() {
    let Err(err) = Registry::global().call("relax.Var", &[]) else {
        panic!("arity error expected");
    };
    let message = err.to_string();
    assert!(message.contains("relax.Var"));
    assert!(message.contains('4'));
}
