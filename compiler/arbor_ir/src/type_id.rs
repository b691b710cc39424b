//! Interned type identifier.
//!
//! Primitive types are pre-interned at fixed indices. Record (host) types are
//! allocated by [`TypeRegistry`](crate::TypeRegistry) starting at
//! [`TypeId::FIRST_RECORD`].

use std::fmt;

/// Interned type identifier.
///
/// # Pre-interned Types
/// - `INT`, `FLOAT`, `BOOL`, `STR` - scalar types
/// - `OBJECT` - the erased, uniform type every value can be boxed into
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct TypeId(u32);

impl TypeId {
    pub const INT: TypeId = TypeId(0);
    pub const FLOAT: TypeId = TypeId(1);
    pub const BOOL: TypeId = TypeId(2);
    pub const STR: TypeId = TypeId(3);
    pub const OBJECT: TypeId = TypeId(4);

    /// First ID handed out to registered record types.
    pub const FIRST_RECORD: u32 = 5;

    /// Create from a raw u32 value.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        TypeId(raw)
    }

    /// Get the raw u32 value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Check if this is a pre-interned primitive (including `OBJECT`).
    #[inline]
    pub const fn is_primitive(self) -> bool {
        self.0 < Self::FIRST_RECORD
    }

    /// Check if this is a registered record type.
    #[inline]
    pub const fn is_record(self) -> bool {
        self.0 >= Self::FIRST_RECORD
    }

    /// Whether the null value inhabits this type.
    ///
    /// Only the erased type and record types are nullable; scalars never are.
    #[inline]
    pub const fn is_nullable(self) -> bool {
        self.0 == Self::OBJECT.0 || self.is_record()
    }

    /// Whether arithmetic and ordering operators apply to this type.
    #[inline]
    pub const fn is_numeric(self) -> bool {
        self.0 == Self::INT.0 || self.0 == Self::FLOAT.0
    }

    /// Name of a primitive type, `None` for records.
    pub const fn primitive_name(self) -> Option<&'static str> {
        match self {
            Self::INT => Some("int"),
            Self::FLOAT => Some("float"),
            Self::BOOL => Some("bool"),
            Self::STR => Some("str"),
            Self::OBJECT => Some("object"),
            _ => None,
        }
    }
}

impl fmt::Debug for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::INT => write!(f, "TypeId::INT"),
            Self::FLOAT => write!(f, "TypeId::FLOAT"),
            Self::BOOL => write!(f, "TypeId::BOOL"),
            Self::STR => write!(f, "TypeId::STR"),
            Self::OBJECT => write!(f, "TypeId::OBJECT"),
            _ => write!(f, "TypeId({})", self.0),
        }
    }
}
