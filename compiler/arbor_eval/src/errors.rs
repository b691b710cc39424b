//! Compile-time and evaluation-time errors.
//!
//! `CompileError` is raised once, when a tree is bound to its parameters.
//! `EvalError` is the only error an evaluator can return.

use std::sync::Arc;

use arbor_ir::Value;
use thiserror::Error;

/// Error raised while compiling a tree into an evaluator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// The tree references a parameter missing from the declared list.
    #[error("parameter `{name}` is referenced but not declared")]
    UnboundParameter { name: Arc<str> },

    /// The same parameter appears twice in the declared list.
    #[error("parameter `{name}` is declared more than once")]
    DuplicateParameter { name: Arc<str> },

    /// A typed evaluator's argument tuple has the wrong length.
    #[error("expected {expected} argument(s), signature takes {found}")]
    Arity { expected: usize, found: usize },

    /// A typed evaluator's Rust signature disagrees with the tree.
    #[error("signature mismatch at {position}: expected `{expected}`, found `{found}`")]
    SignatureMismatch {
        position: String,
        expected: String,
        found: String,
    },
}

/// Error raised while evaluating a compiled tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    /// Wrong number of arguments.
    #[error("expected {expected} argument(s), got {found}")]
    Arity { expected: usize, found: usize },

    /// A value does not conform to the type it must be converted or bound to.
    #[error("cannot cast `{found}` to `{expected}`")]
    RuntimeCast { expected: String, found: String },

    /// Member read on the null value.
    #[error("cannot read member `{member}` of null")]
    NullReceiver { member: Arc<str> },

    #[error("division by zero")]
    DivisionByZero,

    #[error("integer overflow in {op}")]
    Overflow { op: &'static str },
}

/// Result of evaluation.
pub type EvalResult<T = Value> = Result<T, EvalError>;

/// `RuntimeCast` for a value that failed a runtime type test.
#[cold]
pub fn runtime_cast(expected: &str, found: &Value) -> EvalError {
    EvalError::RuntimeCast {
        expected: expected.to_string(),
        found: found.type_name().to_string(),
    }
}

#[cold]
pub fn division_by_zero() -> EvalError {
    EvalError::DivisionByZero
}

#[cold]
pub fn integer_overflow(op: &'static str) -> EvalError {
    EvalError::Overflow { op }
}
