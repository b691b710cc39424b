//! Statically typed calling convention.
//!
//! A [`TypedEvaluator<A, R>`] is checked against the tree once, when it is
//! compiled: the Rust argument tuple `A` must match the declared parameter
//! types slot by slot, and `R` must match the tree's type. Calls then skip
//! the per-argument conformance checks of [`Evaluator::invoke`].
//!
//! | Rust type   | IR type                    |
//! |-------------|----------------------------|
//! | `i64`       | `int`                      |
//! | `f64`       | `float`                    |
//! | `bool`      | `bool`                     |
//! | `String`    | `str`                      |
//! | `Value`     | `object`                   |
//! | `Record<T>` | the record registered for `T` |

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;

use arbor_ir::{Expr, Param, Record, TypeId, TypeRegistry, Value};
use smallvec::SmallVec;

use crate::errors::{runtime_cast, CompileError, EvalResult};
use crate::{Compiler, Evaluator};

/// Argument buffer; most evaluators take few parameters.
pub type ArgVec = SmallVec<[Value; 4]>;

/// A Rust type with a fixed IR type.
pub trait HostValue: Sized {
    /// The IR type this Rust type maps to, if it is known to `types`.
    fn ir_type(types: &TypeRegistry) -> Option<TypeId>;

    fn into_value(self) -> Value;

    /// Recover the Rust value. `None` if `value` has another runtime type.
    fn from_value(value: Value) -> Option<Self>;
}

impl HostValue for i64 {
    fn ir_type(_: &TypeRegistry) -> Option<TypeId> {
        Some(TypeId::INT)
    }

    fn into_value(self) -> Value {
        Value::Int(self)
    }

    fn from_value(value: Value) -> Option<Self> {
        value.as_int()
    }
}

impl HostValue for f64 {
    fn ir_type(_: &TypeRegistry) -> Option<TypeId> {
        Some(TypeId::FLOAT)
    }

    fn into_value(self) -> Value {
        Value::Float(self)
    }

    fn from_value(value: Value) -> Option<Self> {
        value.as_float()
    }
}

impl HostValue for bool {
    fn ir_type(_: &TypeRegistry) -> Option<TypeId> {
        Some(TypeId::BOOL)
    }

    fn into_value(self) -> Value {
        Value::Bool(self)
    }

    fn from_value(value: Value) -> Option<Self> {
        value.as_bool()
    }
}

impl HostValue for String {
    fn ir_type(_: &TypeRegistry) -> Option<TypeId> {
        Some(TypeId::STR)
    }

    fn into_value(self) -> Value {
        Value::from(self)
    }

    fn from_value(value: Value) -> Option<Self> {
        value.as_str().map(str::to_owned)
    }
}

impl HostValue for Value {
    fn ir_type(_: &TypeRegistry) -> Option<TypeId> {
        Some(TypeId::OBJECT)
    }

    fn into_value(self) -> Value {
        self
    }

    fn from_value(value: Value) -> Option<Self> {
        Some(value)
    }
}

impl<T: Any + Send + Sync> HostValue for Record<T> {
    fn ir_type(types: &TypeRegistry) -> Option<TypeId> {
        types.lookup::<T>()
    }

    fn into_value(self) -> Value {
        Record::into_value(self)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(object) => Record::from_object(object),
            _ => None,
        }
    }
}

/// Tuple of [`HostValue`]s forming an argument list.
pub trait Args {
    const ARITY: usize;

    /// IR type and Rust type name of each position.
    fn signature(types: &TypeRegistry) -> SmallVec<[(Option<TypeId>, &'static str); 4]>;

    fn into_values(self) -> ArgVec;
}

macro_rules! impl_args {
    ($len:expr; $($name:ident),*) => {
        impl<$($name: HostValue),*> Args for ($($name,)*) {
            const ARITY: usize = $len;

            #[allow(unused_variables)]
            fn signature(types: &TypeRegistry) -> SmallVec<[(Option<TypeId>, &'static str); 4]> {
                SmallVec::from_iter([$(($name::ir_type(types), std::any::type_name::<$name>())),*])
            }

            #[allow(non_snake_case)]
            fn into_values(self) -> ArgVec {
                let ($($name,)*) = self;
                SmallVec::from_iter([$($name.into_value()),*])
            }
        }
    };
}

impl_args!(0;);
impl_args!(1; A);
impl_args!(2; A, B);
impl_args!(3; A, B, C);
impl_args!(4; A, B, C, D);
impl_args!(5; A, B, C, D, E);
impl_args!(6; A, B, C, D, E, F);

/// Evaluator with a Rust signature `Fn(A) -> R`.
pub struct TypedEvaluator<A, R> {
    inner: Evaluator,
    result_name: &'static str,
    _signature: PhantomData<fn(A) -> R>,
}

impl<A: Args, R: HostValue> TypedEvaluator<A, R> {
    pub fn call(&self, args: A) -> EvalResult<R> {
        let values = args.into_values();
        let result = self.inner.invoke_unchecked(&values)?;
        match R::from_value(result.clone()) {
            Some(value) => Ok(value),
            None => Err(runtime_cast(self.result_name, &result)),
        }
    }

    /// The underlying type-erased evaluator.
    pub fn erased(&self) -> &Evaluator {
        &self.inner
    }
}

impl<A, R> Clone for TypedEvaluator<A, R> {
    fn clone(&self) -> Self {
        TypedEvaluator {
            inner: self.inner.clone(),
            result_name: self.result_name,
            _signature: PhantomData,
        }
    }
}

impl<A, R> fmt::Debug for TypedEvaluator<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedEvaluator")
            .field("signature", &std::any::type_name::<fn(A) -> R>())
            .field("inner", &self.inner)
            .finish()
    }
}

impl Compiler<'_> {
    /// Compile `expr` with a statically checked Rust signature.
    pub fn compile_typed<A: Args, R: HostValue>(
        &self,
        expr: &Expr,
        declared: &[Param],
    ) -> Result<TypedEvaluator<A, R>, CompileError> {
        let types = self.types();
        if A::ARITY != declared.len() {
            return Err(CompileError::Arity {
                expected: declared.len(),
                found: A::ARITY,
            });
        }
        for (index, (param, (ty, host))) in declared.iter().zip(A::signature(types)).enumerate() {
            if ty != Some(param.ty()) {
                return Err(CompileError::SignatureMismatch {
                    position: format!("argument {index} (`{}`)", param.name()),
                    expected: types.display_name(param.ty()),
                    found: host.to_string(),
                });
            }
        }
        let result_name = std::any::type_name::<R>();
        if R::ir_type(types) != Some(expr.ty()) {
            return Err(CompileError::SignatureMismatch {
                position: "result".to_string(),
                expected: types.display_name(expr.ty()),
                found: result_name.to_string(),
            });
        }

        let inner = self.compile(expr, declared)?;
        Ok(TypedEvaluator {
            inner,
            result_name,
            _signature: PhantomData,
        })
    }
}
