//! Arbor Eval - Closure compiler for Arbor expression trees.
//!
//! A validated [`Expr`](arbor_ir::Expr) plus an ordered list of declared
//! parameters is lowered once into nested closures. The result is callable
//! through two conventions built from the same node model:
//!
//! - [`Evaluator::invoke`]: type-erased, `&[Value] -> Value`, with runtime
//!   argument checks
//! - [`TypedEvaluator::call`]: a Rust signature such as `(i64,) -> bool`,
//!   checked once at compile time
//!
//! # Architecture
//!
//! - `Compiler`: binds parameters to slots and lowers nodes
//! - `evaluate_binary`: direct enum-based binary operator dispatch
//! - `CompileOptions`: constant folding switch

pub mod errors;
mod compile;
mod evaluator;
mod operators;
mod options;
mod typed;

pub use compile::Compiler;
pub use errors::{CompileError, EvalError, EvalResult};
pub use evaluator::Evaluator;
pub use operators::{evaluate_binary, float_to_int, int_to_float};
pub use options::CompileOptions;
pub use typed::{ArgVec, Args, HostValue, TypedEvaluator};
