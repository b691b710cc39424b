//! Arbor - typed expression trees compiled to reusable evaluators.
//!
//! This crate re-exports the public API of the workspace and adds:
//! - [`Error`], one error type for every phase
//! - [`AccessorCache`], compiled `object -> object` member accessors keyed
//!   by record type and member name
//! - [`read_dynamic`], the uncompiled lookup the cache is measured against
//! - [`init_tracing`]
//!
//! # Example
//!
//! ```
//! use arbor::{Compiler, ExprBuilder, TypeId, TypeRegistry, Value};
//!
//! let types = TypeRegistry::new();
//! let b = ExprBuilder::new(&types);
//! let i = b.parameter("i", TypeId::INT)?;
//! let tree = b.and(
//!     b.greater_than(b.param(&i), b.constant(5_i64))?,
//!     b.less_than(b.param(&i), b.constant(10_i64))?,
//! )?;
//!
//! let in_range = Compiler::new(&types).compile(&tree, &[i])?;
//! assert_eq!(in_range.invoke(&[Value::Int(7)])?, Value::Bool(true));
//! assert_eq!(arbor::print_expr(&tree)?, "((i > 5) && (i < 10))");
//! # Ok::<(), arbor::Error>(())
//! ```

use std::sync::Once;

mod accessors;

pub use accessors::{erase_accessor, read_dynamic, AccessorCache};
pub use arbor_eval::{
    evaluate_binary, ArgVec, Args, CompileError, CompileOptions, Compiler, EvalError, EvalResult,
    Evaluator, HostValue, TypedEvaluator,
};
pub use arbor_fmt::{print_expr, PrintError, Printer};
pub use arbor_ir::{
    analysis, visitor, walk_binary, walk_expr, BinaryOp, BuildError, BuildResult, Conversion,
    Expr, ExprBuilder, ExprKind, Getter, MemberDef, MemberRef, NodeCounter, Object, OpClass,
    Param, ParamCollector, ParamId, Record, RecordBuilder, TypeId, TypeRegistry, Value, Visitor,
};

/// Any error the workspace can produce.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error(transparent)]
    Eval(#[from] EvalError),
    #[error(transparent)]
    Print(#[from] PrintError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Safe to call multiple times. Does nothing unless `RUST_LOG` is set, e.g.
/// `RUST_LOG=arbor=debug` or `RUST_LOG=arbor_ir=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            // Another subscriber may already be installed by the host.
            let _ = tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .try_init();
        }
    });
}
