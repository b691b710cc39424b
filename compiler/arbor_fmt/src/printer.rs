//! In-order expression printer.
//!
//! - constants print as literals; strings are quoted, floats keep their
//!   decimal point
//! - parameters print as their name
//! - binary nodes print as `(left OP right)`, `Multiply` as `x`
//!
//! `Convert` and `MemberGet` have no surface syntax and fail with
//! [`PrintError::UnsupportedNode`].

use std::fmt::Write;

use arbor_ir::{BinaryOp, Conversion, Expr, MemberRef, Param, Value, Visitor};

use crate::PrintError;

/// Appends the rendering of a tree to a caller-supplied buffer.
///
/// On error the buffer keeps whatever was written before the unsupported
/// node was reached.
pub struct Printer<'out> {
    out: &'out mut String,
}

impl<'out> Printer<'out> {
    pub fn new(out: &'out mut String) -> Self {
        Printer { out }
    }

    /// Render `expr` onto the end of the buffer.
    pub fn print(&mut self, expr: &Expr) -> Result<(), PrintError> {
        self.visit_expr(expr)
    }

    fn literal(&mut self, value: &Value) {
        // Writing into a String cannot fail.
        let _ = match value {
            Value::Str(s) => write!(self.out, "{:?}", &**s),
            Value::Float(x) => write!(self.out, "{x:?}"),
            other => write!(self.out, "{other}"),
        };
    }
}

impl<'ast> Visitor<'ast> for Printer<'_> {
    type Error = PrintError;

    fn visit_constant(&mut self, _: &'ast Expr, value: &'ast Value) -> Result<(), PrintError> {
        self.literal(value);
        Ok(())
    }

    fn visit_parameter(&mut self, _: &'ast Expr, param: &'ast Param) -> Result<(), PrintError> {
        self.out.push_str(param.name());
        Ok(())
    }

    fn visit_binary(
        &mut self,
        _: &'ast Expr,
        op: BinaryOp,
        left: &'ast Expr,
        right: &'ast Expr,
    ) -> Result<(), PrintError> {
        self.out.push('(');
        self.visit_expr(left)?;
        self.out.push(' ');
        self.out.push_str(op.as_symbol());
        self.out.push(' ');
        self.visit_expr(right)?;
        self.out.push(')');
        Ok(())
    }

    fn visit_convert(
        &mut self,
        _: &'ast Expr,
        _: Conversion,
        _: &'ast Expr,
    ) -> Result<(), PrintError> {
        Err(PrintError::UnsupportedNode { kind: "Convert" })
    }

    fn visit_member_get(
        &mut self,
        _: &'ast Expr,
        _: &'ast MemberRef,
        _: &'ast Expr,
    ) -> Result<(), PrintError> {
        Err(PrintError::UnsupportedNode { kind: "MemberGet" })
    }
}

/// Render `expr` into a fresh string.
pub fn print_expr(expr: &Expr) -> Result<String, PrintError> {
    let mut out = String::new();
    Printer::new(&mut out).print(expr)?;
    Ok(out)
}
