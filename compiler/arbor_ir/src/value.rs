//! Runtime values.
//!
//! `Value` is the uniform representation every evaluator works with. Host
//! objects are carried behind `Arc<dyn Any + Send + Sync>` together with the
//! record type they were registered under, so a value can be type-tested
//! without the registry at hand.

use std::any::Any;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use crate::TypeId;

/// Runtime value.
#[derive(Clone)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(Arc<str>),
    /// Instance of a registered record type.
    Object(Object),
    /// The absent value. Inhabits `OBJECT` and every record type.
    Null,
}

impl Value {
    /// Create a string value.
    pub fn string(s: impl Into<Arc<str>>) -> Self {
        Value::Str(s.into())
    }

    /// The static type a constant of this value has.
    ///
    /// `Null` is typed as `OBJECT`.
    pub fn ty(&self) -> TypeId {
        match self {
            Value::Int(_) => TypeId::INT,
            Value::Float(_) => TypeId::FLOAT,
            Value::Bool(_) => TypeId::BOOL,
            Value::Str(_) => TypeId::STR,
            Value::Object(obj) => obj.ty(),
            Value::Null => TypeId::OBJECT,
        }
    }

    /// Human-readable name of the runtime type, used in error messages.
    pub fn type_name(&self) -> &str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
            Value::Str(_) => "str",
            Value::Object(obj) => obj.type_name(),
            Value::Null => "null",
        }
    }

    /// Runtime type test: can this value flow into a slot of type `ty`?
    pub fn conforms_to(&self, ty: TypeId) -> bool {
        match self {
            _ if ty == TypeId::OBJECT => true,
            Value::Null => ty.is_nullable(),
            other => other.ty() == ty,
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[inline]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    #[inline]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            // IEEE comparison: NaN != NaN, -0.0 == 0.0
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            (Value::Null, Value::Null) => true,
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "Int({n})"),
            Value::Float(x) => write!(f, "Float({x})"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Str(s) => write!(f, "Str({s:?})"),
            Value::Object(obj) => write!(f, "Object({})", obj.type_name()),
            Value::Null => write!(f, "Null"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Str(s) => f.write_str(s),
            Value::Object(obj) => write!(f, "<{}>", obj.type_name()),
            Value::Null => f.write_str("null"),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(Arc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(Arc::from(s))
    }
}

impl From<Object> for Value {
    fn from(obj: Object) -> Self {
        Value::Object(obj)
    }
}

/// A host object tagged with its registered record type.
#[derive(Clone)]
pub struct Object {
    ty: TypeId,
    type_name: Arc<str>,
    data: Arc<dyn Any + Send + Sync>,
}

impl Object {
    pub(crate) fn new(ty: TypeId, type_name: Arc<str>, data: Arc<dyn Any + Send + Sync>) -> Self {
        Object {
            ty,
            type_name,
            data,
        }
    }

    #[inline]
    pub fn ty(&self) -> TypeId {
        self.ty
    }

    #[inline]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Borrow the payload as `T`, if that is what it holds.
    #[inline]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        (*self.data).downcast_ref::<T>()
    }

    /// Share the payload as `Arc<T>`, if that is what it holds.
    pub fn downcast_arc<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.data).downcast::<T>().ok()
    }

    /// Identity comparison of the payloads.
    #[inline]
    pub fn ptr_eq(&self, other: &Object) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("ty", &self.ty)
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// Statically typed handle to a host object of record type `T`.
///
/// Obtained from [`TypeRegistry::instance`](crate::TypeRegistry::instance);
/// used as an argument or result type of typed evaluators.
pub struct Record<T> {
    object: Object,
    data: Arc<T>,
}

impl<T: Any + Send + Sync> Record<T> {
    /// Recover a typed handle from an erased object.
    pub fn from_object(object: Object) -> Option<Self> {
        let data = object.downcast_arc::<T>()?;
        Some(Record { object, data })
    }

    #[inline]
    pub fn object(&self) -> &Object {
        &self.object
    }

    #[inline]
    pub fn into_value(self) -> Value {
        Value::Object(self.object)
    }
}

impl<T> Clone for Record<T> {
    fn clone(&self) -> Self {
        Record {
            object: self.object.clone(),
            data: Arc::clone(&self.data),
        }
    }
}

impl<T> Deref for Record<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.data
    }
}

impl<T: fmt::Debug> fmt::Debug for Record<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Record").field(&*self.data).finish()
    }
}

#[cfg(test)]
mod tests;
