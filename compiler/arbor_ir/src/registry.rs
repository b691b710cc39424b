//! Record type registry.
//!
//! The embedding application registers its host types here before building
//! any trees. Each record gets a [`TypeId`] and a table of readable members
//! `(type, member name) -> MemberDef`. The builder resolves `MemberGet` nodes
//! against this table once; evaluation never looks a member up by name.
//!
//! ```text
//! let mut types = TypeRegistry::new();
//! let entity = types
//!     .register::<SomeEntity>("SomeEntity")
//!     .member("SomeValue", TypeId::STR, |e| Value::from(e.some_value.as_str()))
//!     .finish();
//! ```

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::value::{Object, Record};
use crate::{TypeId, Value};

/// Reads one member off a host object. Returns `None` if the object does not
/// hold the host type the member was registered for.
pub type Getter = Arc<dyn Fn(&Object) -> Option<Value> + Send + Sync>;

/// A readable member of a record type.
pub struct MemberDef {
    owner: TypeId,
    owner_name: Arc<str>,
    name: Arc<str>,
    ty: TypeId,
    getter: Getter,
}

/// Shared handle to a resolved member, stored directly in `MemberGet` nodes.
pub type MemberRef = Arc<MemberDef>;

impl MemberDef {
    /// The record type declaring this member.
    #[inline]
    pub fn owner(&self) -> TypeId {
        self.owner
    }

    #[inline]
    pub fn owner_name(&self) -> &str {
        &self.owner_name
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Shared copy of the member name, for keys and error payloads.
    #[inline]
    pub fn name_arc(&self) -> Arc<str> {
        Arc::clone(&self.name)
    }

    /// Declared result type.
    #[inline]
    pub fn ty(&self) -> TypeId {
        self.ty
    }

    /// Invoke the getter.
    #[inline]
    pub fn read(&self, object: &Object) -> Option<Value> {
        (self.getter)(object)
    }
}

impl PartialEq for MemberDef {
    fn eq(&self, other: &Self) -> bool {
        self.owner == other.owner && self.name == other.name
    }
}

impl fmt::Debug for MemberDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberDef")
            .field("owner", &self.owner_name)
            .field("name", &self.name)
            .field("ty", &self.ty)
            .finish_non_exhaustive()
    }
}

struct RecordDef {
    name: Arc<str>,
    members: FxHashMap<Arc<str>, MemberRef>,
    /// Member names in registration order.
    order: Vec<Arc<str>>,
}

/// Registry of record types and their members.
///
/// Mutated only during setup; share it read-only (`Arc<TypeRegistry>`)
/// afterwards.
#[derive(Default)]
pub struct TypeRegistry {
    records: Vec<RecordDef>,
    by_host: FxHashMap<std::any::TypeId, TypeId>,
    by_name: FxHashMap<Arc<str>, TypeId>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start registering host type `T` under `name`.
    ///
    /// Registering the same host type again extends the existing record.
    pub fn register<T: Any + Send + Sync>(&mut self, name: &str) -> RecordBuilder<'_, T> {
        let host = std::any::TypeId::of::<T>();
        let ty = if let Some(&existing) = self.by_host.get(&host) {
            existing
        } else {
            let index = u32::try_from(self.records.len())
                .ok()
                .and_then(|n| n.checked_add(TypeId::FIRST_RECORD))
                .unwrap_or(u32::MAX);
            let ty = TypeId::from_raw(index);
            let name: Arc<str> = Arc::from(name);
            self.records.push(RecordDef {
                name: Arc::clone(&name),
                members: FxHashMap::default(),
                order: Vec::new(),
            });
            self.by_host.insert(host, ty);
            self.by_name.insert(name, ty);
            tracing::trace!(?ty, "registered record type");
            ty
        };
        RecordBuilder {
            registry: self,
            ty,
            _marker: PhantomData,
        }
    }

    fn record(&self, ty: TypeId) -> Option<&RecordDef> {
        if !ty.is_record() {
            return None;
        }
        let index = usize::try_from(ty.raw() - TypeId::FIRST_RECORD).ok()?;
        self.records.get(index)
    }

    fn record_mut(&mut self, ty: TypeId) -> Option<&mut RecordDef> {
        if !ty.is_record() {
            return None;
        }
        let index = usize::try_from(ty.raw() - TypeId::FIRST_RECORD).ok()?;
        self.records.get_mut(index)
    }

    /// Whether `ty` is a primitive or a registered record.
    pub fn contains(&self, ty: TypeId) -> bool {
        ty.is_primitive() || self.record(ty).is_some()
    }

    /// Name of a primitive or registered record type.
    pub fn type_name(&self, ty: TypeId) -> Option<&str> {
        ty.primitive_name()
            .or_else(|| self.record(ty).map(|r| &*r.name))
    }

    /// Like [`type_name`](Self::type_name), with a placeholder for unknown ids.
    pub fn display_name(&self, ty: TypeId) -> String {
        match self.type_name(ty) {
            Some(name) => name.to_string(),
            None => format!("<unregistered type {}>", ty.raw()),
        }
    }

    /// Record type registered for host type `T`.
    pub fn lookup<T: Any>(&self) -> Option<TypeId> {
        self.by_host.get(&std::any::TypeId::of::<T>()).copied()
    }

    /// Record type registered under `name`.
    pub fn lookup_name(&self, name: &str) -> Option<TypeId> {
        self.by_name.get(name).copied()
    }

    /// Resolve `(ty, name)` to a member definition.
    pub fn member(&self, ty: TypeId, name: &str) -> Option<&MemberRef> {
        self.record(ty)?.members.get(name)
    }

    /// Members of `ty` in registration order (empty for primitives).
    pub fn members(&self, ty: TypeId) -> impl Iterator<Item = &MemberRef> + '_ {
        self.record(ty)
            .into_iter()
            .flat_map(|r| r.order.iter().filter_map(|name| r.members.get(name)))
    }

    /// Wrap a host value as a typed record handle.
    ///
    /// Returns `None` if `T` was never registered.
    pub fn instance<T: Any + Send + Sync>(&self, value: T) -> Option<Record<T>> {
        let ty = self.lookup::<T>()?;
        let name = Arc::clone(&self.record(ty)?.name);
        Record::from_object(Object::new(ty, name, Arc::new(value)))
    }

    /// Wrap a host value as an erased [`Value::Object`].
    pub fn object<T: Any + Send + Sync>(&self, value: T) -> Option<Value> {
        self.instance(value).map(Record::into_value)
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.records.iter().map(|r| &r.name))
            .finish()
    }
}

/// Adds members to a record being registered. See [`TypeRegistry::register`].
pub struct RecordBuilder<'r, T> {
    registry: &'r mut TypeRegistry,
    ty: TypeId,
    _marker: PhantomData<fn(&T)>,
}

impl<T: Any + Send + Sync> RecordBuilder<'_, T> {
    /// Declare a readable member of type `ty`.
    #[must_use]
    pub fn member<F>(self, name: &str, ty: TypeId, get: F) -> Self
    where
        F: Fn(&T) -> Value + Send + Sync + 'static,
    {
        let owner = self.ty;
        if let Some(record) = self.registry.record_mut(owner) {
            let name: Arc<str> = Arc::from(name);
            let getter: Getter =
                Arc::new(move |object: &Object| object.downcast_ref::<T>().map(&get));
            let def = Arc::new(MemberDef {
                owner,
                owner_name: Arc::clone(&record.name),
                name: Arc::clone(&name),
                ty,
                getter,
            });
            if record.members.insert(Arc::clone(&name), def).is_none() {
                record.order.push(name);
            }
        }
        self
    }

    /// Finish registration and return the record's type id.
    pub fn finish(self) -> TypeId {
        self.ty
    }
}
