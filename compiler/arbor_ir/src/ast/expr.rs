//! Expression nodes.
//!
//! A tree is an owned `Expr`: every structural node exclusively owns its
//! children. `Param` handles are the one shared reference - the same handle
//! may appear at several positions to denote the same input.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::BinaryOp;
use crate::registry::MemberRef;
use crate::{TypeId, Value};

/// Expression node. Immutable once built.
#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    kind: ExprKind,
    ty: TypeId,
}

/// Node variants.
#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    /// Literal value.
    Constant(Value),
    /// Reference to a parameter; bound to an argument slot at compile time.
    Parameter(Param),
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Explicit conversion. The node's type is the target type.
    Convert {
        operand: Box<Expr>,
        conversion: Conversion,
    },
    /// Read a member of the receiver's record type. Resolved at build time.
    MemberGet {
        receiver: Box<Expr>,
        member: MemberRef,
    },
}

impl Expr {
    pub(crate) fn new(kind: ExprKind, ty: TypeId) -> Self {
        Expr { kind, ty }
    }

    /// Literal node. Always valid; the type follows the value.
    pub fn constant(value: impl Into<Value>) -> Self {
        let value = value.into();
        let ty = value.ty();
        Expr::new(ExprKind::Constant(value), ty)
    }

    /// Reference to `param`. Always valid.
    pub fn param(param: &Param) -> Self {
        Expr::new(ExprKind::Parameter(param.clone()), param.ty())
    }

    #[inline]
    pub fn kind(&self) -> &ExprKind {
        &self.kind
    }

    /// Result type of this node.
    #[inline]
    pub fn ty(&self) -> TypeId {
        self.ty
    }

    /// Whether this node has no children.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, ExprKind::Constant(_) | ExprKind::Parameter(_))
    }

    /// Direct children in evaluation order (left before right).
    pub fn children(&self) -> impl Iterator<Item = &Expr> + '_ {
        let (first, second): (Option<&Expr>, Option<&Expr>) = match &self.kind {
            ExprKind::Constant(_) | ExprKind::Parameter(_) => (None, None),
            ExprKind::Binary { left, right, .. } => (Some(&**left), Some(&**right)),
            ExprKind::Convert { operand, .. } => (Some(&**operand), None),
            ExprKind::MemberGet { receiver, .. } => (Some(&**receiver), None),
        };
        first.into_iter().chain(second)
    }
}

impl Drop for Expr {
    // Unlink children onto a heap stack so a deep chain drops iteratively.
    fn drop(&mut self) {
        let mut pending = Vec::new();
        detach_children(&mut self.kind, &mut pending);
        while let Some(mut child) = pending.pop() {
            detach_children(&mut child.kind, &mut pending);
        }
    }
}

fn detach_children(kind: &mut ExprKind, out: &mut Vec<Box<Expr>>) {
    if matches!(kind, ExprKind::Constant(_) | ExprKind::Parameter(_)) {
        return;
    }
    match std::mem::replace(kind, ExprKind::Constant(Value::Null)) {
        ExprKind::Binary { left, right, .. } => {
            out.push(left);
            out.push(right);
        }
        ExprKind::Convert { operand, .. } => out.push(operand),
        ExprKind::MemberGet { receiver, .. } => out.push(receiver),
        ExprKind::Constant(_) | ExprKind::Parameter(_) => {}
    }
}

impl From<&Param> for Expr {
    fn from(param: &Param) -> Self {
        Expr::param(param)
    }
}

/// Resolved conversion performed by a `Convert` node.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Conversion {
    /// Source and target are the same type.
    Identity,
    /// Any type to `OBJECT`. Always legal.
    Erase,
    /// `OBJECT` to a concrete type, checked against the runtime value.
    Narrow { target: TypeId },
    /// `int` to `float`.
    IntToFloat,
    /// `float` to `int`, truncating toward zero and saturating at the bounds.
    FloatToInt,
}

impl Conversion {
    /// Find the conversion path from `from` to `to`, if one exists.
    pub fn resolve(from: TypeId, to: TypeId) -> Option<Conversion> {
        match (from, to) {
            _ if from == to => Some(Conversion::Identity),
            (_, TypeId::OBJECT) => Some(Conversion::Erase),
            (TypeId::OBJECT, target) => Some(Conversion::Narrow { target }),
            (TypeId::INT, TypeId::FLOAT) => Some(Conversion::IntToFloat),
            (TypeId::FLOAT, TypeId::INT) => Some(Conversion::FloatToInt),
            _ => None,
        }
    }

    /// Whether the conversion may fail at evaluation time.
    #[inline]
    pub fn is_checked(self) -> bool {
        matches!(self, Conversion::Narrow { .. })
    }
}

static NEXT_PARAM_ID: AtomicU64 = AtomicU64::new(0);

/// Process-unique parameter identity. Never reused.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct ParamId(u64);

impl ParamId {
    fn fresh() -> Self {
        ParamId(NEXT_PARAM_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

struct ParamData {
    id: ParamId,
    name: Arc<str>,
    ty: TypeId,
}

/// Named, identity-bearing placeholder.
///
/// Cloning shares the identity. Two parameters created separately are
/// distinct even with equal names and types.
#[derive(Clone)]
pub struct Param(Arc<ParamData>);

impl Param {
    pub(crate) fn new(name: &str, ty: TypeId) -> Self {
        Param(Arc::new(ParamData {
            id: ParamId::fresh(),
            name: Arc::from(name),
            ty,
        }))
    }

    #[inline]
    pub fn id(&self) -> ParamId {
        self.0.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    #[inline]
    pub fn ty(&self) -> TypeId {
        self.0.ty
    }
}

impl PartialEq for Param {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for Param {}

impl Hash for Param {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

impl fmt::Debug for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Param({}#{}: {:?})", self.0.name, self.0.id.0, self.0.ty)
    }
}
