//! Construction-time errors.
//!
//! Everything the builder rejects is detectable from declared types alone, so
//! these errors never surface from an evaluator.

use std::sync::Arc;

use thiserror::Error;

use crate::BinaryOp;

/// Error raised while assembling a tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// Operand types differ, or the operator is undefined for them.
    #[error("operator `{op}` cannot be applied to `{left}` and `{right}`")]
    TypeMismatch {
        op: BinaryOp,
        left: String,
        right: String,
    },

    /// No conversion path between the two types.
    #[error("no conversion from `{from}` to `{to}`")]
    InvalidConversion { from: String, to: String },

    /// The receiver type has no readable member of this name.
    #[error("type `{ty}` has no readable member `{member}`")]
    UnknownMember { ty: String, member: Arc<str> },

    /// The type id was never registered.
    #[error("type {raw} is not registered")]
    UnknownType { raw: u32 },
}

/// Result of a builder operation.
pub type BuildResult<T> = Result<T, BuildError>;
