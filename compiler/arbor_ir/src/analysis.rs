//! Read-only analyses built on [`Visitor`].

use std::convert::Infallible;

use rustc_hash::FxHashSet;

use crate::ast::{BinaryOp, Conversion, Expr, Param, ParamId};
use crate::registry::MemberRef;
use crate::visitor::{walk_binary, Visitor};
use crate::Value;

/// Collects the distinct parameters of a tree in first-occurrence pre-order.
///
/// A parameter referenced several times is reported once.
#[derive(Default)]
pub struct ParamCollector {
    seen: FxHashSet<ParamId>,
    params: Vec<Param>,
}

impl ParamCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parameters referenced anywhere in `expr`.
    pub fn collect(expr: &Expr) -> Vec<Param> {
        let mut collector = ParamCollector::new();
        if let Err(never) = collector.visit_expr(expr) {
            match never {}
        }
        collector.params
    }

    pub fn into_params(self) -> Vec<Param> {
        self.params
    }
}

impl<'ast> Visitor<'ast> for ParamCollector {
    type Error = Infallible;

    fn visit_parameter(&mut self, _expr: &'ast Expr, param: &'ast Param) -> Result<(), Infallible> {
        if self.seen.insert(param.id()) {
            self.params.push(param.clone());
        }
        Ok(())
    }
}

/// Node counts by kind.
#[derive(Copy, Clone, Default, Debug, PartialEq, Eq)]
pub struct NodeCounter {
    pub constants: usize,
    pub parameters: usize,
    pub binaries: usize,
    pub converts: usize,
    pub member_gets: usize,
}

impl NodeCounter {
    pub fn count(expr: &Expr) -> Self {
        let mut counter = NodeCounter::default();
        if let Err(never) = counter.visit_expr(expr) {
            match never {}
        }
        counter
    }

    pub fn total(&self) -> usize {
        self.constants + self.parameters + self.binaries + self.converts + self.member_gets
    }
}

impl<'ast> Visitor<'ast> for NodeCounter {
    type Error = Infallible;

    fn visit_constant(&mut self, _: &'ast Expr, _: &'ast Value) -> Result<(), Infallible> {
        self.constants += 1;
        Ok(())
    }

    fn visit_parameter(&mut self, _: &'ast Expr, _: &'ast Param) -> Result<(), Infallible> {
        self.parameters += 1;
        Ok(())
    }

    fn visit_binary(
        &mut self,
        _: &'ast Expr,
        _: BinaryOp,
        left: &'ast Expr,
        right: &'ast Expr,
    ) -> Result<(), Infallible> {
        self.binaries += 1;
        walk_binary(self, left, right)
    }

    fn visit_convert(
        &mut self,
        _: &'ast Expr,
        _: Conversion,
        operand: &'ast Expr,
    ) -> Result<(), Infallible> {
        self.converts += 1;
        self.visit_expr(operand)
    }

    fn visit_member_get(
        &mut self,
        _: &'ast Expr,
        _: &'ast MemberRef,
        receiver: &'ast Expr,
    ) -> Result<(), Infallible> {
        self.member_gets += 1;
        self.visit_expr(receiver)
    }
}
