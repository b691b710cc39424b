//! Arbor IR - Typed Expression Trees
//!
//! This crate contains the core data structures of Arbor:
//! - `TypeId` for primitive and registered record types
//! - `Value` and `Object` for runtime values
//! - `TypeRegistry` mapping record types to readable members
//! - Expression nodes (`Expr`, `ExprKind`, `Param`)
//! - `ExprBuilder`, the validating node factory
//! - `Visitor` and the analyses built on it
//!
//! # Design Philosophy
//!
//! - **Validate at construction**: a tree that exists is well-typed
//! - **Resolve once**: members are looked up by name when the `MemberGet`
//!   node is built, never during evaluation
//! - **Explicit erasure**: crossing between typed and `OBJECT` values only
//!   happens through `Convert` nodes

/// Compile-time assertion that a type has a specific size.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

pub mod analysis;
pub mod ast;
mod builder;
mod errors;
mod registry;
mod stack;
mod type_id;
mod value;
pub mod visitor;

pub use analysis::{NodeCounter, ParamCollector};
pub use ast::{BinaryOp, Conversion, Expr, ExprKind, OpClass, Param, ParamId};
pub use builder::ExprBuilder;
pub use errors::{BuildError, BuildResult};
pub use registry::{Getter, MemberDef, MemberRef, RecordBuilder, TypeRegistry};
pub use stack::ensure_sufficient_stack;
pub use type_id::TypeId;
pub use value::{Object, Record, Value};
pub use visitor::{walk_binary, walk_expr, Visitor};

static_assert_size!(TypeId, 4);
static_assert_size!(BinaryOp, 1);
static_assert_size!(ParamId, 8);
