#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;

use super::*;
use arbor_ir::{ExprBuilder, TypeId};

struct Entity {
    value: String,
}

fn registry() -> (TypeRegistry, TypeId) {
    let mut types = TypeRegistry::new();
    let entity = types
        .register::<Entity>("Entity")
        .member("Value", TypeId::STR, |e| Value::from(e.value.as_str()))
        .finish();
    (types, entity)
}

/// `i > 5 && i < 10`
fn in_range(b: &ExprBuilder<'_>) -> (Expr, Param) {
    let i = b.parameter("i", TypeId::INT).unwrap();
    let tree = b
        .and(
            b.greater_than(b.param(&i), b.constant(5_i64)).unwrap(),
            b.less_than(b.param(&i), b.constant(10_i64)).unwrap(),
        )
        .unwrap();
    (tree, i)
}

#[test]
fn test_constant_addition() {
    let types = TypeRegistry::new();
    let b = ExprBuilder::new(&types);
    let tree = b.add(b.constant(7_i64), b.constant(10_i64)).unwrap();
    let eval = Compiler::new(&types).compile(&tree, &[]).unwrap();
    assert_eq!(eval.invoke(&[]), Ok(Value::Int(17)));
    assert_eq!(eval.result_type(), TypeId::INT);
}

#[test]
fn test_range_predicate() {
    let types = TypeRegistry::new();
    let b = ExprBuilder::new(&types);
    let (tree, i) = in_range(&b);
    let eval = Compiler::new(&types).compile(&tree, &[i]).unwrap();

    assert_eq!(eval.invoke(&[Value::Int(7)]), Ok(Value::Bool(true)));
    assert_eq!(eval.invoke(&[Value::Int(11)]), Ok(Value::Bool(false)));
    assert_eq!(eval.invoke(&[Value::Int(5)]), Ok(Value::Bool(false)));
}

#[test]
fn test_reused_param_binds_one_slot() {
    let types = TypeRegistry::new();
    let b = ExprBuilder::new(&types);
    let x = b.parameter("x", TypeId::INT).unwrap();
    let tree = b.multiply(b.param(&x), b.param(&x)).unwrap();
    let eval = Compiler::new(&types).compile(&tree, &[x]).unwrap();
    assert_eq!(eval.arity(), 1);
    assert_eq!(eval.invoke(&[Value::Int(9)]), Ok(Value::Int(81)));
}

#[test]
fn test_argument_order_follows_declaration() {
    let types = TypeRegistry::new();
    let b = ExprBuilder::new(&types);
    let a = b.parameter("a", TypeId::INT).unwrap();
    let c = b.parameter("c", TypeId::INT).unwrap();
    let tree = b.subtract(b.param(&a), b.param(&c)).unwrap();
    let compiler = Compiler::new(&types);

    let forward = compiler.compile(&tree, &[a.clone(), c.clone()]).unwrap();
    let reversed = compiler.compile(&tree, &[c, a]).unwrap();
    let args = [Value::Int(10), Value::Int(3)];
    assert_eq!(forward.invoke(&args), Ok(Value::Int(7)));
    assert_eq!(reversed.invoke(&args), Ok(Value::Int(-7)));
}

#[test]
fn test_unbound_parameter() {
    let types = TypeRegistry::new();
    let b = ExprBuilder::new(&types);
    let (tree, _) = in_range(&b);
    let other = b.parameter("i", TypeId::INT).unwrap();
    assert_eq!(
        Compiler::new(&types).compile(&tree, &[other]).unwrap_err(),
        CompileError::UnboundParameter { name: "i".into() }
    );
}

#[test]
fn test_duplicate_parameter() {
    let types = TypeRegistry::new();
    let b = ExprBuilder::new(&types);
    let (tree, i) = in_range(&b);
    assert_eq!(
        Compiler::new(&types)
            .compile(&tree, &[i.clone(), i])
            .unwrap_err(),
        CompileError::DuplicateParameter { name: "i".into() }
    );
}

#[test]
fn test_unreferenced_declared_parameter() {
    let types = TypeRegistry::new();
    let b = ExprBuilder::new(&types);
    let unused = b.parameter("unused", TypeId::STR).unwrap();
    let eval = Compiler::new(&types)
        .compile(&b.constant(1_i64), &[unused])
        .unwrap();
    assert_eq!(eval.invoke(&[Value::from("ignored")]), Ok(Value::Int(1)));
}

#[test]
fn test_arity_error() {
    let types = TypeRegistry::new();
    let b = ExprBuilder::new(&types);
    let (tree, i) = in_range(&b);
    let eval = Compiler::new(&types).compile(&tree, &[i]).unwrap();
    assert_eq!(
        eval.invoke(&[]),
        Err(EvalError::Arity {
            expected: 1,
            found: 0
        })
    );
}

#[test]
fn test_argument_type_checked() {
    let types = TypeRegistry::new();
    let b = ExprBuilder::new(&types);
    let (tree, i) = in_range(&b);
    let eval = Compiler::new(&types).compile(&tree, &[i]).unwrap();
    assert_eq!(
        eval.invoke(&[Value::from("7")]),
        Err(EvalError::RuntimeCast {
            expected: "int".to_string(),
            found: "str".to_string(),
        })
    );
}

#[test]
fn test_and_short_circuits() {
    let (types, entity) = registry();
    let b = ExprBuilder::new(&types);
    let flag = b.parameter("flag", TypeId::BOOL).unwrap();
    let e = b.parameter("e", entity).unwrap();
    let read = b.member_get(b.param(&e), "Value").unwrap();
    let tree = b
        .and(b.param(&flag), b.equal(read, b.constant("x")).unwrap())
        .unwrap();
    let eval = Compiler::new(&types).compile(&tree, &[flag, e]).unwrap();

    assert_eq!(
        eval.invoke(&[Value::Bool(false), Value::Null]),
        Ok(Value::Bool(false))
    );
    assert_eq!(
        eval.invoke(&[Value::Bool(true), Value::Null]),
        Err(EvalError::NullReceiver {
            member: "Value".into()
        })
    );
}

#[test]
fn test_or_short_circuits() {
    let types = TypeRegistry::new();
    let b = ExprBuilder::new(&types);
    let flag = b.parameter("flag", TypeId::BOOL).unwrap();
    let n = b.parameter("n", TypeId::INT).unwrap();
    let divides = b
        .equal(
            b.divide(b.constant(10_i64), b.param(&n)).unwrap(),
            b.constant(5_i64),
        )
        .unwrap();
    let tree = b.or(b.param(&flag), divides).unwrap();
    let eval = Compiler::new(&types).compile(&tree, &[flag, n]).unwrap();

    assert_eq!(
        eval.invoke(&[Value::Bool(true), Value::Int(0)]),
        Ok(Value::Bool(true))
    );
    assert_eq!(
        eval.invoke(&[Value::Bool(false), Value::Int(0)]),
        Err(EvalError::DivisionByZero)
    );
    assert_eq!(
        eval.invoke(&[Value::Bool(false), Value::Int(2)]),
        Ok(Value::Bool(true))
    );
}

#[test]
fn test_member_get_through_narrowing() {
    let (types, entity) = registry();
    let b = ExprBuilder::new(&types);
    let o = b.parameter("o", TypeId::OBJECT).unwrap();
    let tree = b
        .member_get(b.convert(b.param(&o), entity).unwrap(), "Value")
        .unwrap();
    let eval = Compiler::new(&types).compile(&tree, &[o]).unwrap();

    let object = types
        .object(Entity {
            value: "hello".to_string(),
        })
        .unwrap();
    assert_eq!(eval.invoke(&[object]), Ok(Value::from("hello")));
    assert_eq!(
        eval.invoke(&[Value::Int(3)]),
        Err(EvalError::RuntimeCast {
            expected: "Entity".to_string(),
            found: "int".to_string(),
        })
    );
    assert_eq!(
        eval.invoke(&[Value::Null]),
        Err(EvalError::NullReceiver {
            member: "Value".into()
        })
    );
}

#[test]
fn test_getter_result_checked_against_member_type() {
    let mut types = TypeRegistry::new();
    let entity = types
        .register::<Entity>("Entity")
        .member("Count", TypeId::INT, |e| Value::from(e.value.as_str()))
        .finish();
    let b = ExprBuilder::new(&types);
    let e = b.parameter("e", entity).unwrap();
    let tree = b
        .add(b.member_get(b.param(&e), "Count").unwrap(), b.constant(1_i64))
        .unwrap();
    let eval = Compiler::new(&types).compile(&tree, &[e]).unwrap();

    let object = types
        .object(Entity {
            value: "three".to_string(),
        })
        .unwrap();
    assert_eq!(
        eval.invoke(&[object]),
        Err(EvalError::RuntimeCast {
            expected: "int".to_string(),
            found: "str".to_string(),
        })
    );
}

#[test]
fn test_numeric_conversions() {
    let types = TypeRegistry::new();
    let b = ExprBuilder::new(&types);
    let x = b.parameter("x", TypeId::FLOAT).unwrap();
    let truncated = b.convert(b.param(&x), TypeId::INT).unwrap();
    let tree = b
        .convert(b.add(truncated, b.constant(1_i64)).unwrap(), TypeId::FLOAT)
        .unwrap();
    let eval = Compiler::new(&types).compile(&tree, &[x]).unwrap();
    assert_eq!(eval.invoke(&[Value::Float(2.75)]), Ok(Value::Float(3.0)));
    assert_eq!(eval.invoke(&[Value::Float(-2.75)]), Ok(Value::Float(-1.0)));
}

#[test]
fn test_failing_fold_is_deferred() {
    let types = TypeRegistry::new();
    let b = ExprBuilder::new(&types);
    let tree = b.divide(b.constant(1_i64), b.constant(0_i64)).unwrap();
    let eval = Compiler::new(&types).compile(&tree, &[]).unwrap();
    assert_eq!(eval.invoke(&[]), Err(EvalError::DivisionByZero));

    let overflow = b
        .add(b.constant(i64::MAX), b.constant(1_i64))
        .unwrap();
    let eval = Compiler::new(&types).compile(&overflow, &[]).unwrap();
    assert_eq!(
        eval.invoke(&[]),
        Err(EvalError::Overflow { op: "addition" })
    );
}

#[test]
fn test_folding_does_not_change_results() {
    let types = TypeRegistry::new();
    let b = ExprBuilder::new(&types);
    let x = b.parameter("x", TypeId::INT).unwrap();
    let tree = b
        .multiply(
            b.add(b.constant(7_i64), b.constant(10_i64)).unwrap(),
            b.subtract(b.param(&x), b.constant(2_i64)).unwrap(),
        )
        .unwrap();

    let folded = Compiler::new(&types).compile(&tree, &[x.clone()]).unwrap();
    let plain = Compiler::new(&types)
        .with_options(CompileOptions::default().with_constant_folding(false))
        .compile(&tree, &[x])
        .unwrap();
    for n in [-3_i64, 0, 2, 5, 1000] {
        assert_eq!(
            folded.invoke(&[Value::Int(n)]),
            plain.invoke(&[Value::Int(n)])
        );
    }
    assert_eq!(folded.invoke(&[Value::Int(5)]), Ok(Value::Int(51)));
}

#[test]
fn test_independent_evaluators_agree() {
    let types = TypeRegistry::new();
    let b = ExprBuilder::new(&types);
    let (tree, i) = in_range(&b);
    let compiler = Compiler::new(&types);
    let first = compiler.compile(&tree, &[i.clone()]).unwrap();
    let second = compiler.compile(&tree, &[i]).unwrap();
    drop(tree);

    for n in 0..15 {
        assert_eq!(
            first.invoke(&[Value::Int(n)]),
            second.invoke(&[Value::Int(n)])
        );
    }
}

#[test]
fn test_string_concatenation() {
    let types = TypeRegistry::new();
    let b = ExprBuilder::new(&types);
    let s = b.parameter("s", TypeId::STR).unwrap();
    let tree = b.add(b.constant("Hello, "), b.param(&s)).unwrap();
    let eval = Compiler::new(&types).compile(&tree, &[s]).unwrap();
    assert_eq!(
        eval.invoke(&[Value::from("world")]),
        Ok(Value::from("Hello, world"))
    );
}

#[test]
fn test_unbound_parameter_reports_first_in_pre_order() {
    let types = TypeRegistry::new();
    let b = ExprBuilder::new(&types);
    let x = b.parameter("x", TypeId::INT).unwrap();
    let y = b.parameter("y", TypeId::INT).unwrap();
    let tree = b.add(b.param(&y), b.param(&x)).unwrap();
    assert_eq!(
        Compiler::new(&types).compile(&tree, &[]).unwrap_err(),
        CompileError::UnboundParameter { name: "y".into() }
    );
    assert_eq!(
        Compiler::new(&types).compile(&tree, &[y]).unwrap_err(),
        CompileError::UnboundParameter { name: "x".into() }
    );
}

#[test]
fn test_deep_tree_compiles_and_invokes() {
    const DEPTH: i64 = 100_000;

    let types = TypeRegistry::new();
    let b = ExprBuilder::new(&types);
    let x = b.parameter("x", TypeId::INT).unwrap();
    let mut tree = b.param(&x);
    for _ in 0..DEPTH {
        tree = b.add(tree, b.constant(1_i64)).unwrap();
    }
    let eval = Compiler::new(&types).compile(&tree, &[x]).unwrap();
    drop(tree);
    assert_eq!(eval.invoke(&[Value::Int(0)]), Ok(Value::Int(DEPTH)));
    assert_eq!(
        eval.invoke(&[Value::Int(i64::MAX)]),
        Err(EvalError::Overflow { op: "addition" })
    );
    drop(eval);
}

#[test]
fn test_deep_conversion_chain_invokes() {
    let types = TypeRegistry::new();
    let b = ExprBuilder::new(&types);
    let x = b.parameter("x", TypeId::FLOAT).unwrap();
    let mut tree = b.param(&x);
    for _ in 0..50_000 {
        let truncated = b.convert(tree, TypeId::INT).unwrap();
        tree = b.convert(truncated, TypeId::FLOAT).unwrap();
    }
    let eval = Compiler::new(&types).compile(&tree, &[x]).unwrap();
    assert_eq!(eval.invoke(&[Value::Float(2.5)]), Ok(Value::Float(2.0)));
}

mod proptest_compiled {
    use arbor_ir::{BinaryOp, ExprBuilder, TypeId, TypeRegistry, Value};
    use proptest::prelude::*;

    use crate::{CompileOptions, Compiler, EvalError};

    fn int_op() -> impl Strategy<Value = BinaryOp> {
        prop::sample::select(
            BinaryOp::ALL
                .iter()
                .copied()
                .filter(|op| op.result_type(TypeId::INT, TypeId::INT).is_some())
                .collect::<Vec<_>>(),
        )
    }

    /// `op` applied with Rust's own integer operators.
    fn apply_natively(op: BinaryOp, a: i64, c: i64) -> Result<Value, EvalError> {
        let overflow = |op: &'static str| EvalError::Overflow { op };
        match op {
            BinaryOp::Add => a.checked_add(c).map(Value::Int).ok_or(overflow("addition")),
            BinaryOp::Subtract => a.checked_sub(c).map(Value::Int).ok_or(overflow("subtraction")),
            BinaryOp::Multiply => a
                .checked_mul(c)
                .map(Value::Int)
                .ok_or(overflow("multiplication")),
            BinaryOp::Divide if c == 0 => Err(EvalError::DivisionByZero),
            BinaryOp::Divide => a.checked_div(c).map(Value::Int).ok_or(overflow("division")),
            BinaryOp::Equal => Ok(Value::Bool(a == c)),
            BinaryOp::NotEqual => Ok(Value::Bool(a != c)),
            BinaryOp::LessThan => Ok(Value::Bool(a < c)),
            BinaryOp::LessThanOrEqual => Ok(Value::Bool(a <= c)),
            BinaryOp::GreaterThan => Ok(Value::Bool(a > c)),
            BinaryOp::GreaterThanOrEqual => Ok(Value::Bool(a >= c)),
            BinaryOp::LogicalAnd | BinaryOp::LogicalOr => unreachable!("{op} takes bool operands"),
        }
    }

    proptest! {
        #[test]
        fn compiled_constants_match_direct_application(
            op in int_op(),
            a in any::<i64>(),
            c in any::<i64>(),
            fold in any::<bool>(),
        ) {
            let types = TypeRegistry::new();
            let b = ExprBuilder::new(&types);
            let tree = b.binary(op, b.constant(a), b.constant(c)).unwrap();
            let eval = Compiler::new(&types)
                .with_options(CompileOptions::default().with_constant_folding(fold))
                .compile(&tree, &[])
                .unwrap();
            prop_assert_eq!(eval.invoke(&[]), apply_natively(op, a, c));
        }

        #[test]
        fn compiled_params_match_direct_application(
            op in int_op(),
            a in -1000_i64..1000,
            c in -1000_i64..1000,
        ) {
            let types = TypeRegistry::new();
            let b = ExprBuilder::new(&types);
            let x = b.parameter("x", TypeId::INT).unwrap();
            let y = b.parameter("y", TypeId::INT).unwrap();
            let tree = b.binary(op, b.param(&x), b.param(&y)).unwrap();
            let eval = Compiler::new(&types).compile(&tree, &[x, y]).unwrap();
            let args = [Value::Int(a), Value::Int(c)];
            prop_assert_eq!(eval.invoke(&args), apply_natively(op, a, c));
        }

        #[test]
        fn logical_ops_match_rust(l in any::<bool>(), r in any::<bool>()) {
            let types = TypeRegistry::new();
            let b = ExprBuilder::new(&types);
            let p = b.parameter("p", TypeId::BOOL).unwrap();
            let q = b.parameter("q", TypeId::BOOL).unwrap();
            let and = b.and(b.param(&p), b.param(&q)).unwrap();
            let or = b.or(b.param(&p), b.param(&q)).unwrap();
            let compiler = Compiler::new(&types);
            let and = compiler.compile(&and, &[p.clone(), q.clone()]).unwrap();
            let or = compiler.compile(&or, &[p, q]).unwrap();
            let args = [Value::Bool(l), Value::Bool(r)];
            prop_assert_eq!(and.invoke(&args), Ok(Value::Bool(l && r)));
            prop_assert_eq!(or.invoke(&args), Ok(Value::Bool(l || r)));
        }
    }
}
