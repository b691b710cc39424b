//! Type-erased evaluator.

use std::fmt;
use std::sync::Arc;

use arbor_ir::{ensure_sufficient_stack, Param, TypeId, Value};

use crate::errors::{runtime_cast, EvalError, EvalResult};

/// A compiled node: maps the argument slots to a value.
pub(crate) type CompiledExpr = Box<dyn Fn(&[Value]) -> EvalResult + Send + Sync>;

/// A subexpression captured by a compiled node.
///
/// Compiled bodies nest as deep as the tree they came from, so both calling
/// and dropping a child run under [`ensure_sufficient_stack`].
pub(crate) struct Child(CompiledExpr);

impl Child {
    pub(crate) fn new(code: CompiledExpr) -> Self {
        Child(code)
    }

    #[inline]
    pub(crate) fn call(&self, args: &[Value]) -> EvalResult {
        ensure_sufficient_stack(|| (self.0)(args))
    }
}

impl Drop for Child {
    fn drop(&mut self) {
        // The placeholder is zero-sized, so swapping it in does not allocate.
        let code = std::mem::replace(&mut self.0, Box::new(|_: &[Value]| Ok(Value::Null)));
        ensure_sufficient_stack(move || drop(code));
    }
}

/// One declared parameter, with its type name cached for error messages.
pub(crate) struct Slot {
    pub(crate) param: Param,
    pub(crate) type_name: Arc<str>,
}

struct Inner {
    slots: Box<[Slot]>,
    params: Box<[Param]>,
    result_ty: TypeId,
    body: CompiledExpr,
}

/// Callable produced by [`Compiler::compile`](crate::Compiler::compile).
///
/// Immutable; clones share the compiled body. Safe to invoke from many
/// threads at once.
#[derive(Clone)]
pub struct Evaluator {
    inner: Arc<Inner>,
}

impl Evaluator {
    pub(crate) fn new(slots: Vec<Slot>, result_ty: TypeId, body: CompiledExpr) -> Self {
        let params = slots.iter().map(|slot| slot.param.clone()).collect();
        Evaluator {
            inner: Arc::new(Inner {
                slots: slots.into_boxed_slice(),
                params,
                result_ty,
                body,
            }),
        }
    }

    /// Declared parameters, in argument order.
    pub fn params(&self) -> &[Param] {
        &self.inner.params
    }

    #[inline]
    pub fn arity(&self) -> usize {
        self.inner.slots.len()
    }

    /// Static type of the values this evaluator returns.
    #[inline]
    pub fn result_type(&self) -> TypeId {
        self.inner.result_ty
    }

    /// Evaluate with positional arguments.
    ///
    /// Each argument must conform to its parameter's type; `OBJECT`
    /// parameters accept anything.
    pub fn invoke(&self, args: &[Value]) -> EvalResult {
        if args.len() != self.arity() {
            return Err(EvalError::Arity {
                expected: self.arity(),
                found: args.len(),
            });
        }
        for (slot, arg) in self.inner.slots.iter().zip(args) {
            if !arg.conforms_to(slot.param.ty()) {
                return Err(runtime_cast(&slot.type_name, arg));
            }
        }
        (self.inner.body)(args)
    }

    /// Evaluate without argument checks. The caller guarantees arity and
    /// conformance, as typed evaluators do statically.
    #[inline]
    pub(crate) fn invoke_unchecked(&self, args: &[Value]) -> EvalResult {
        (self.inner.body)(args)
    }
}

impl fmt::Debug for Evaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Evaluator")
            .field("params", &self.inner.params)
            .field("result_ty", &self.inner.result_ty)
            .finish_non_exhaustive()
    }
}
