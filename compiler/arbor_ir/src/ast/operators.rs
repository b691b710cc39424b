//! Binary operators and their typing rules.

use std::fmt;

use crate::TypeId;

/// Binary operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Subtract,
    Multiply,
    Divide,

    // Comparison
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,

    // Logical (short-circuiting)
    LogicalAnd,
    LogicalOr,
}

/// Operator families sharing one typing rule.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum OpClass {
    Arithmetic,
    Ordering,
    Equality,
    Logical,
}

impl BinaryOp {
    pub const ALL: [BinaryOp; 12] = [
        BinaryOp::Add,
        BinaryOp::Subtract,
        BinaryOp::Multiply,
        BinaryOp::Divide,
        BinaryOp::Equal,
        BinaryOp::NotEqual,
        BinaryOp::LessThan,
        BinaryOp::LessThanOrEqual,
        BinaryOp::GreaterThan,
        BinaryOp::GreaterThanOrEqual,
        BinaryOp::LogicalAnd,
        BinaryOp::LogicalOr,
    ];

    pub const fn class(self) -> OpClass {
        match self {
            Self::Add | Self::Subtract | Self::Multiply | Self::Divide => OpClass::Arithmetic,
            Self::LessThan
            | Self::LessThanOrEqual
            | Self::GreaterThan
            | Self::GreaterThanOrEqual => OpClass::Ordering,
            Self::Equal | Self::NotEqual => OpClass::Equality,
            Self::LogicalAnd | Self::LogicalOr => OpClass::Logical,
        }
    }

    /// Whether the right operand is evaluated only when the left one does not
    /// already decide the result.
    #[inline]
    pub const fn short_circuits(self) -> bool {
        matches!(self, Self::LogicalAnd | Self::LogicalOr)
    }

    /// Source-level symbol, as rendered by the printer.
    ///
    /// Multiplication prints as `x`.
    pub const fn as_symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "x",
            Self::Divide => "/",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::LessThan => "<",
            Self::LessThanOrEqual => "<=",
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqual => ">=",
            Self::LogicalAnd => "&&",
            Self::LogicalOr => "||",
        }
    }

    /// Operator name, e.g. `Add` or `GreaterThan`.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Add => "Add",
            Self::Subtract => "Subtract",
            Self::Multiply => "Multiply",
            Self::Divide => "Divide",
            Self::Equal => "Equal",
            Self::NotEqual => "NotEqual",
            Self::LessThan => "LessThan",
            Self::LessThanOrEqual => "LessThanOrEqual",
            Self::GreaterThan => "GreaterThan",
            Self::GreaterThanOrEqual => "GreaterThanOrEqual",
            Self::LogicalAnd => "LogicalAnd",
            Self::LogicalOr => "LogicalOr",
        }
    }

    /// Result type of `left op right`, or `None` if the operator is undefined
    /// for these operand types.
    ///
    /// - arithmetic: `int x int -> int`, `float x float -> float`,
    ///   plus `str + str -> str`
    /// - ordering: `int`, `float` or `str` operands -> `bool`
    /// - equality: `int`, `float`, `bool` or `str` operands -> `bool`
    /// - logical: `bool x bool -> bool`
    pub fn result_type(self, left: TypeId, right: TypeId) -> Option<TypeId> {
        if left != right {
            return None;
        }
        let operand = left;
        match self.class() {
            OpClass::Arithmetic if operand.is_numeric() => Some(operand),
            OpClass::Arithmetic if self == Self::Add && operand == TypeId::STR => Some(TypeId::STR),
            OpClass::Ordering if operand.is_numeric() || operand == TypeId::STR => {
                Some(TypeId::BOOL)
            }
            OpClass::Equality if operand.is_primitive() && operand != TypeId::OBJECT => {
                Some(TypeId::BOOL)
            }
            OpClass::Logical if operand == TypeId::BOOL => Some(TypeId::BOOL),
            _ => None,
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
