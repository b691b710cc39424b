//! Erased member accessors.
//!
//! An erased accessor is a compiled `Fn(object) -> object` reading one
//! member of one record type. [`AccessorCache`] builds them on demand and
//! keeps one per `(record type, member name)`, so code holding only an
//! erased value can read members without per-call lookups by name.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use arbor_eval::{Compiler, EvalError, Evaluator};
use arbor_ir::{BuildError, ExprBuilder, TypeId, TypeRegistry, Value};

use crate::Result;

/// Build and compile the accessor for `member` of `record`:
///
/// ```text
/// Convert(MemberGet(Convert(target: object -> record), member) -> object)
/// ```
///
/// The result takes one `OBJECT` argument and returns an `OBJECT` value.
pub fn erase_accessor(types: &TypeRegistry, record: TypeId, member: &str) -> Result<Evaluator> {
    let b = ExprBuilder::new(types);
    let target = b.parameter("target", TypeId::OBJECT)?;
    let narrowed = b.convert(b.param(&target), record)?;
    let read = b.member_get(narrowed, member)?;
    let erased = b.convert(read, TypeId::OBJECT)?;
    Ok(Compiler::new(types).compile(&erased, &[target])?)
}

type AccessorTable = FxHashMap<TypeId, FxHashMap<Arc<str>, Evaluator>>;

/// Lazily compiled erased accessors, keyed by record type and member name.
///
/// Shareable across threads; lookups take a read lock, and only a miss
/// takes the write lock.
pub struct AccessorCache {
    types: Arc<TypeRegistry>,
    accessors: RwLock<AccessorTable>,
}

impl AccessorCache {
    pub fn new(types: Arc<TypeRegistry>) -> Self {
        AccessorCache {
            types,
            accessors: RwLock::new(FxHashMap::default()),
        }
    }

    pub fn types(&self) -> &Arc<TypeRegistry> {
        &self.types
    }

    /// The accessor for `member` of `ty`, compiling it on first use.
    pub fn get(&self, ty: TypeId, member: &str) -> Result<Evaluator> {
        if let Some(accessor) = self
            .accessors
            .read()
            .get(&ty)
            .and_then(|members| members.get(member))
        {
            return Ok(accessor.clone());
        }

        tracing::debug!(ty = %self.types.display_name(ty), member, "accessor cache miss");
        // Compile outside the lock; a racing miss for the same key keeps
        // whichever accessor was inserted first.
        let compiled = erase_accessor(&self.types, ty, member)?;
        let mut accessors = self.accessors.write();
        let accessor = accessors
            .entry(ty)
            .or_default()
            .entry(Arc::from(member))
            .or_insert(compiled);
        Ok(accessor.clone())
    }

    /// Read `member` off `value`, dispatching on its runtime type.
    pub fn read(&self, value: &Value, member: &str) -> Result<Value> {
        if value.is_null() {
            return Err(EvalError::NullReceiver {
                member: Arc::from(member),
            }
            .into());
        }
        let accessor = self.get(value.ty(), member)?;
        Ok(accessor.invoke(std::slice::from_ref(value))?)
    }

    /// Number of compiled accessors.
    pub fn len(&self) -> usize {
        self.accessors.read().values().map(FxHashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for AccessorCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessorCache")
            .field("types", &self.types)
            .field("accessors", &self.len())
            .finish()
    }
}

/// Read `member` off `value` by looking it up in the registry on every call.
///
/// The uncompiled baseline for [`AccessorCache::read`].
pub fn read_dynamic(types: &TypeRegistry, value: &Value, member: &str) -> Result<Value> {
    let object = match value {
        Value::Object(object) => object,
        Value::Null => {
            return Err(EvalError::NullReceiver {
                member: Arc::from(member),
            }
            .into())
        }
        other => {
            return Err(BuildError::UnknownMember {
                ty: other.type_name().to_string(),
                member: Arc::from(member),
            }
            .into())
        }
    };
    let Some(def) = types.member(object.ty(), member) else {
        return Err(BuildError::UnknownMember {
            ty: types.display_name(object.ty()),
            member: Arc::from(member),
        }
        .into());
    };
    match def.read(object) {
        Some(read) if read.conforms_to(def.ty()) => Ok(read),
        Some(read) => Err(EvalError::RuntimeCast {
            expected: types.display_name(def.ty()),
            found: read.type_name().to_string(),
        }
        .into()),
        None => Err(EvalError::RuntimeCast {
            expected: def.owner_name().to_string(),
            found: object.type_name().to_string(),
        }
        .into()),
    }
}
