//! Expression tree node types.
//!
//! All node types are immutable after construction. Validation lives in the
//! [`ExprBuilder`](crate::ExprBuilder); these are pure data.

mod expr;
mod operators;

pub use expr::{Conversion, Expr, ExprKind, Param, ParamId};
pub use operators::{BinaryOp, OpClass};
