//! Expression Visitor
//!
//! Generic traversal of an expression tree. The visitor may mutate its own
//! state; the tree is borrowed immutably for `'ast`.
//!
//! Default implementations call `walk_*` functions that traverse children
//! in pre-order, left child before right child. Override a `visit_*` method
//! to handle one node kind; every other kind keeps recursing.
//!
//! # Example
//!
//! ```text
//! struct CountConstants(usize);
//!
//! impl<'ast> Visitor<'ast> for CountConstants {
//!     type Error = Infallible;
//!
//!     fn visit_constant(&mut self, _: &'ast Expr, _: &'ast Value) -> Result<(), Infallible> {
//!         self.0 += 1;
//!         Ok(())
//!     }
//! }
//! ```

use crate::ast::{BinaryOp, Conversion, Expr, ExprKind, Param};
use crate::registry::MemberRef;
use crate::stack::ensure_sufficient_stack;
use crate::Value;

/// Expression visitor.
///
/// `Error` lets a consumer abort the walk, e.g. on a node kind it cannot
/// handle. Analyses that cannot fail use [`std::convert::Infallible`].
pub trait Visitor<'ast> {
    type Error;

    /// Visit any expression. Dispatches on the node kind.
    fn visit_expr(&mut self, expr: &'ast Expr) -> Result<(), Self::Error> {
        walk_expr(self, expr)
    }

    fn visit_constant(&mut self, expr: &'ast Expr, value: &'ast Value) -> Result<(), Self::Error> {
        let _ = (expr, value);
        Ok(())
    }

    fn visit_parameter(&mut self, expr: &'ast Expr, param: &'ast Param) -> Result<(), Self::Error> {
        let _ = (expr, param);
        Ok(())
    }

    /// Visit a binary node. The default visits `left`, then `right`.
    fn visit_binary(
        &mut self,
        expr: &'ast Expr,
        op: BinaryOp,
        left: &'ast Expr,
        right: &'ast Expr,
    ) -> Result<(), Self::Error> {
        let _ = (expr, op);
        walk_binary(self, left, right)
    }

    fn visit_convert(
        &mut self,
        expr: &'ast Expr,
        conversion: Conversion,
        operand: &'ast Expr,
    ) -> Result<(), Self::Error> {
        let _ = (expr, conversion);
        self.visit_expr(operand)
    }

    fn visit_member_get(
        &mut self,
        expr: &'ast Expr,
        member: &'ast MemberRef,
        receiver: &'ast Expr,
    ) -> Result<(), Self::Error> {
        let _ = (expr, member);
        self.visit_expr(receiver)
    }
}

/// Dispatch `expr` to the matching `visit_*` method.
pub fn walk_expr<'ast, V: Visitor<'ast> + ?Sized>(
    visitor: &mut V,
    expr: &'ast Expr,
) -> Result<(), V::Error> {
    ensure_sufficient_stack(|| match expr.kind() {
        ExprKind::Constant(value) => visitor.visit_constant(expr, value),
        ExprKind::Parameter(param) => visitor.visit_parameter(expr, param),
        ExprKind::Binary { op, left, right } => visitor.visit_binary(expr, *op, left, right),
        ExprKind::Convert {
            operand,
            conversion,
        } => visitor.visit_convert(expr, *conversion, operand),
        ExprKind::MemberGet { receiver, member } => {
            visitor.visit_member_get(expr, member, receiver)
        }
    })
}

/// Visit both operands of a binary node, left first.
pub fn walk_binary<'ast, V: Visitor<'ast> + ?Sized>(
    visitor: &mut V,
    left: &'ast Expr,
    right: &'ast Expr,
) -> Result<(), V::Error> {
    visitor.visit_expr(left)?;
    visitor.visit_expr(right)
}
