//! Binary operator and conversion implementations.
//!
//! Direct enum-based dispatch on `(left, right)` value pairs. Operand types
//! were validated by the builder, so the fallback arms only fire for values
//! that bypassed it.

use std::cmp::Ordering;

use arbor_ir::{BinaryOp, Value};

use crate::errors::{division_by_zero, integer_overflow, runtime_cast, EvalError, EvalResult};

#[inline]
fn checked_arith(result: Option<i64>, op_name: &'static str) -> EvalResult {
    result.map(Value::Int).ok_or_else(|| integer_overflow(op_name))
}

/// Apply `op` to two already-evaluated operands.
///
/// Logical operators are applied strictly here; short-circuiting is the
/// compiler's job.
pub fn evaluate_binary(op: BinaryOp, left: &Value, right: &Value) -> EvalResult {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => eval_int_binary(*a, *b, op),
        (Value::Float(a), Value::Float(b)) => eval_float_binary(*a, *b, op),
        (Value::Bool(a), Value::Bool(b)) => eval_bool_binary(*a, *b, op),
        (Value::Str(a), Value::Str(b)) => eval_string_binary(a, b, op),
        _ => Err(mismatch(op, left, right)),
    }
}

#[cold]
fn mismatch(op: BinaryOp, left: &Value, right: &Value) -> EvalError {
    EvalError::RuntimeCast {
        expected: format!("operands of `{op}`"),
        found: format!("{} and {}", left.type_name(), right.type_name()),
    }
}

fn eval_int_binary(a: i64, b: i64, op: BinaryOp) -> EvalResult {
    match op {
        BinaryOp::Add => checked_arith(a.checked_add(b), "addition"),
        BinaryOp::Subtract => checked_arith(a.checked_sub(b), "subtraction"),
        BinaryOp::Multiply => checked_arith(a.checked_mul(b), "multiplication"),
        BinaryOp::Divide => {
            if b == 0 {
                Err(division_by_zero())
            } else {
                checked_arith(a.checked_div(b), "division")
            }
        }
        BinaryOp::Equal => Ok(Value::Bool(a == b)),
        BinaryOp::NotEqual => Ok(Value::Bool(a != b)),
        BinaryOp::LessThan => Ok(Value::Bool(a < b)),
        BinaryOp::LessThanOrEqual => Ok(Value::Bool(a <= b)),
        BinaryOp::GreaterThan => Ok(Value::Bool(a > b)),
        BinaryOp::GreaterThanOrEqual => Ok(Value::Bool(a >= b)),
        BinaryOp::LogicalAnd | BinaryOp::LogicalOr => {
            Err(mismatch(op, &Value::Int(a), &Value::Int(b)))
        }
    }
}

/// IEEE semantics: division by zero yields an infinity or NaN, and every
/// comparison involving NaN is false except `NotEqual`.
fn eval_float_binary(a: f64, b: f64, op: BinaryOp) -> EvalResult {
    let ord = a.partial_cmp(&b);
    match op {
        BinaryOp::Add => Ok(Value::Float(a + b)),
        BinaryOp::Subtract => Ok(Value::Float(a - b)),
        BinaryOp::Multiply => Ok(Value::Float(a * b)),
        BinaryOp::Divide => Ok(Value::Float(a / b)),
        BinaryOp::Equal => Ok(Value::Bool(ord == Some(Ordering::Equal))),
        BinaryOp::NotEqual => Ok(Value::Bool(ord != Some(Ordering::Equal))),
        BinaryOp::LessThan => Ok(Value::Bool(ord == Some(Ordering::Less))),
        BinaryOp::LessThanOrEqual => Ok(Value::Bool(matches!(
            ord,
            Some(Ordering::Less | Ordering::Equal)
        ))),
        BinaryOp::GreaterThan => Ok(Value::Bool(ord == Some(Ordering::Greater))),
        BinaryOp::GreaterThanOrEqual => Ok(Value::Bool(matches!(
            ord,
            Some(Ordering::Greater | Ordering::Equal)
        ))),
        BinaryOp::LogicalAnd | BinaryOp::LogicalOr => {
            Err(mismatch(op, &Value::Float(a), &Value::Float(b)))
        }
    }
}

fn eval_bool_binary(a: bool, b: bool, op: BinaryOp) -> EvalResult {
    match op {
        BinaryOp::Equal => Ok(Value::Bool(a == b)),
        BinaryOp::NotEqual => Ok(Value::Bool(a != b)),
        BinaryOp::LogicalAnd => Ok(Value::Bool(a && b)),
        BinaryOp::LogicalOr => Ok(Value::Bool(a || b)),
        _ => Err(mismatch(op, &Value::Bool(a), &Value::Bool(b))),
    }
}

fn eval_string_binary(a: &str, b: &str, op: BinaryOp) -> EvalResult {
    match op {
        BinaryOp::Add => {
            let mut joined = String::with_capacity(a.len() + b.len());
            joined.push_str(a);
            joined.push_str(b);
            Ok(Value::string(joined))
        }
        BinaryOp::Equal => Ok(Value::Bool(a == b)),
        BinaryOp::NotEqual => Ok(Value::Bool(a != b)),
        // Lexicographic by bytes
        BinaryOp::LessThan => Ok(Value::Bool(a < b)),
        BinaryOp::LessThanOrEqual => Ok(Value::Bool(a <= b)),
        BinaryOp::GreaterThan => Ok(Value::Bool(a > b)),
        BinaryOp::GreaterThanOrEqual => Ok(Value::Bool(a >= b)),
        _ => Err(mismatch(op, &Value::from(a), &Value::from(b))),
    }
}

/// `int` to `float`.
#[allow(clippy::cast_precision_loss, reason = "widening is lossy above 2^53")]
pub fn int_to_float(value: &Value) -> EvalResult {
    match value {
        Value::Int(n) => Ok(Value::Float(*n as f64)),
        other => Err(runtime_cast("int", other)),
    }
}

/// `float` to `int`: truncate toward zero, saturate at the `i64` bounds,
/// NaN becomes 0.
#[allow(clippy::cast_possible_truncation, reason = "saturating cast is the defined semantics")]
pub fn float_to_int(value: &Value) -> EvalResult {
    match value {
        Value::Float(x) => Ok(Value::Int(*x as i64)),
        other => Err(runtime_cast("float", other)),
    }
}
