//! Validating node factory.
//!
//! Every structural node goes through [`ExprBuilder`], which checks operand
//! types against the operator table, conversion paths, and the member table
//! of the [`TypeRegistry`]. A tree that made it out of the builder is
//! well-typed; nothing downstream re-checks declared types.

use crate::ast::{BinaryOp, Conversion, Expr, ExprKind, Param};
use crate::errors::{BuildError, BuildResult};
use crate::{TypeId, TypeRegistry, Value};

/// Factory for expression nodes, bound to a type registry.
#[derive(Clone, Copy, Debug)]
pub struct ExprBuilder<'r> {
    types: &'r TypeRegistry,
}

macro_rules! binary_shorthands {
    ($($name:ident => $op:ident),* $(,)?) => {
        $(
            #[doc = concat!("Shorthand for `binary(BinaryOp::", stringify!($op), ", left, right)`.")]
            pub fn $name(&self, left: Expr, right: Expr) -> BuildResult<Expr> {
                self.binary(BinaryOp::$op, left, right)
            }
        )*
    };
}

impl<'r> ExprBuilder<'r> {
    pub fn new(types: &'r TypeRegistry) -> Self {
        ExprBuilder { types }
    }

    pub fn types(&self) -> &'r TypeRegistry {
        self.types
    }

    /// Literal node; the type is inferred from the value.
    pub fn constant(&self, value: impl Into<Value>) -> Expr {
        Expr::constant(value)
    }

    /// Allocate a fresh parameter of type `ty`.
    pub fn parameter(&self, name: &str, ty: TypeId) -> BuildResult<Param> {
        self.check_known(ty)?;
        let param = Param::new(name, ty);
        tracing::trace!(?param, "parameter");
        Ok(param)
    }

    /// Reference to an existing parameter.
    pub fn param(&self, param: &Param) -> Expr {
        Expr::param(param)
    }

    /// Binary node. The result type comes from [`BinaryOp::result_type`].
    pub fn binary(&self, op: BinaryOp, left: Expr, right: Expr) -> BuildResult<Expr> {
        let Some(ty) = op.result_type(left.ty(), right.ty()) else {
            return Err(BuildError::TypeMismatch {
                op,
                left: self.types.display_name(left.ty()),
                right: self.types.display_name(right.ty()),
            });
        };
        tracing::trace!(%op, ?ty, "binary");
        Ok(Expr::new(
            ExprKind::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            ty,
        ))
    }

    binary_shorthands! {
        add => Add,
        subtract => Subtract,
        multiply => Multiply,
        divide => Divide,
        equal => Equal,
        not_equal => NotEqual,
        less_than => LessThan,
        less_than_or_equal => LessThanOrEqual,
        greater_than => GreaterThan,
        greater_than_or_equal => GreaterThanOrEqual,
        and => LogicalAnd,
        or => LogicalOr,
    }

    /// Explicit conversion of `operand` to `target`.
    ///
    /// Erasing to `OBJECT` is always legal. Narrowing from `OBJECT` is
    /// accepted here and checked against the runtime value on evaluation.
    pub fn convert(&self, operand: Expr, target: TypeId) -> BuildResult<Expr> {
        self.check_known(target)?;
        let Some(conversion) = Conversion::resolve(operand.ty(), target) else {
            return Err(BuildError::InvalidConversion {
                from: self.types.display_name(operand.ty()),
                to: self.types.display_name(target),
            });
        };
        tracing::trace!(?conversion, "convert");
        Ok(Expr::new(
            ExprKind::Convert {
                operand: Box::new(operand),
                conversion,
            },
            target,
        ))
    }

    /// Read member `name` of the receiver's record type.
    pub fn member_get(&self, receiver: Expr, name: &str) -> BuildResult<Expr> {
        let Some(member) = self.types.member(receiver.ty(), name) else {
            return Err(BuildError::UnknownMember {
                ty: self.types.display_name(receiver.ty()),
                member: name.into(),
            });
        };
        let ty = member.ty();
        tracing::trace!(member = member.name(), ?ty, "member get");
        Ok(Expr::new(
            ExprKind::MemberGet {
                receiver: Box::new(receiver),
                member: member.clone(),
            },
            ty,
        ))
    }

    fn check_known(&self, ty: TypeId) -> BuildResult<()> {
        if self.types.contains(ty) {
            Ok(())
        } else {
            Err(BuildError::UnknownType { raw: ty.raw() })
        }
    }
}
