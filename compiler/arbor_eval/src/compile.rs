//! Lowering of expression trees into closures.
//!
//! Each node becomes one boxed closure over the argument slots. Parameters
//! are resolved to slot indices and members to their getters here, once, so
//! an evaluation is a plain walk over nested calls.

use std::sync::Arc;

use arbor_ir::{
    ensure_sufficient_stack, BinaryOp, Conversion, Expr, ExprKind, MemberRef, Param,
    ParamCollector, ParamId, TypeRegistry, Value,
};
use rustc_hash::FxHashMap;

use crate::errors::{runtime_cast, CompileError, EvalError};
use crate::evaluator::{Child, CompiledExpr, Evaluator, Slot};
use crate::operators::{evaluate_binary, float_to_int, int_to_float};
use crate::options::CompileOptions;

/// A lowered node, plus its value when known at compile time.
struct Lowered {
    code: CompiledExpr,
    constant: Option<Value>,
}

impl Lowered {
    fn dynamic(code: CompiledExpr) -> Self {
        Lowered {
            code,
            constant: None,
        }
    }

    fn constant(value: Value) -> Self {
        let captured = value.clone();
        Lowered {
            code: Box::new(move |_| Ok(captured.clone())),
            constant: Some(value),
        }
    }
}

/// Compiles trees against a type registry.
#[derive(Clone, Copy, Debug)]
pub struct Compiler<'r> {
    types: &'r TypeRegistry,
    options: CompileOptions,
}

impl<'r> Compiler<'r> {
    pub fn new(types: &'r TypeRegistry) -> Self {
        Compiler {
            types,
            options: CompileOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> CompileOptions {
        self.options
    }

    pub fn types(&self) -> &'r TypeRegistry {
        self.types
    }

    /// Bind `expr` to the `declared` parameters (in argument order) and
    /// lower it to an [`Evaluator`].
    ///
    /// Parameters may be declared without being referenced; every
    /// referenced parameter must be declared.
    #[tracing::instrument(level = "debug", skip_all, fields(params = declared.len(), ty = ?expr.ty()))]
    pub fn compile(&self, expr: &Expr, declared: &[Param]) -> Result<Evaluator, CompileError> {
        let slots = bind_slots(declared)?;
        for param in ParamCollector::collect(expr) {
            if !slots.contains_key(&param.id()) {
                return Err(CompileError::UnboundParameter {
                    name: Arc::from(param.name()),
                });
            }
        }

        let lowered = self.lower(expr, &slots);
        tracing::debug!(folded = lowered.constant.is_some(), "compiled");

        let slots = declared
            .iter()
            .map(|param| Slot {
                param: param.clone(),
                type_name: Arc::from(self.types.display_name(param.ty())),
            })
            .collect();
        Ok(Evaluator::new(slots, expr.ty(), lowered.code))
    }

    fn lower(&self, expr: &Expr, slots: &FxHashMap<ParamId, usize>) -> Lowered {
        ensure_sufficient_stack(|| match expr.kind() {
            ExprKind::Constant(value) => Lowered::constant(value.clone()),
            ExprKind::Parameter(param) => lower_parameter(param, slots),
            ExprKind::Binary { op, left, right } => {
                let left = self.lower(left, slots);
                let right = self.lower(right, slots);
                self.lower_binary(*op, left, right)
            }
            ExprKind::Convert {
                operand,
                conversion,
            } => {
                let operand = self.lower(operand, slots);
                self.lower_convert(*conversion, operand)
            }
            ExprKind::MemberGet { receiver, member } => {
                let receiver = self.lower(receiver, slots);
                let ty_name: Arc<str> = Arc::from(self.types.display_name(member.ty()));
                Lowered::dynamic(lower_member_get(receiver.code, member, ty_name))
            }
        })
    }

    fn lower_binary(&self, op: BinaryOp, left: Lowered, right: Lowered) -> Lowered {
        if self.options.fold_constants {
            if let (Some(l), Some(r)) = (&left.constant, &right.constant) {
                // A failing fold stays dynamic so the error surfaces on invoke.
                if let Ok(value) = evaluate_binary(op, l, r) {
                    tracing::trace!(%op, %value, "folded constant");
                    return Lowered::constant(value);
                }
            }
        }

        let (left, right) = (Child::new(left.code), Child::new(right.code));
        let code: CompiledExpr = match op {
            BinaryOp::LogicalAnd => Box::new(move |args| match left.call(args)? {
                Value::Bool(false) => Ok(Value::Bool(false)),
                Value::Bool(true) => right.call(args),
                other => Err(runtime_cast("bool", &other)),
            }),
            BinaryOp::LogicalOr => Box::new(move |args| match left.call(args)? {
                Value::Bool(true) => Ok(Value::Bool(true)),
                Value::Bool(false) => right.call(args),
                other => Err(runtime_cast("bool", &other)),
            }),
            _ => Box::new(move |args| {
                let l = left.call(args)?;
                let r = right.call(args)?;
                evaluate_binary(op, &l, &r)
            }),
        };
        Lowered::dynamic(code)
    }

    fn lower_convert(&self, conversion: Conversion, operand: Lowered) -> Lowered {
        let code: CompiledExpr = match conversion {
            // Values are already uniform; erasing only changes the static type.
            Conversion::Identity | Conversion::Erase => return Lowered::dynamic(operand.code),
            Conversion::Narrow { target } => {
                let inner = Child::new(operand.code);
                let expected: Arc<str> = Arc::from(self.types.display_name(target));
                Box::new(move |args| {
                    let value = inner.call(args)?;
                    if value.conforms_to(target) {
                        Ok(value)
                    } else {
                        Err(runtime_cast(&expected, &value))
                    }
                })
            }
            Conversion::IntToFloat => {
                let inner = Child::new(operand.code);
                Box::new(move |args| int_to_float(&inner.call(args)?))
            }
            Conversion::FloatToInt => {
                let inner = Child::new(operand.code);
                Box::new(move |args| float_to_int(&inner.call(args)?))
            }
        };
        Lowered::dynamic(code)
    }
}

/// Map each declared parameter to its argument position.
fn bind_slots(declared: &[Param]) -> Result<FxHashMap<ParamId, usize>, CompileError> {
    let mut slots = FxHashMap::default();
    slots.reserve(declared.len());
    for (index, param) in declared.iter().enumerate() {
        if slots.insert(param.id(), index).is_some() {
            return Err(CompileError::DuplicateParameter {
                name: Arc::from(param.name()),
            });
        }
    }
    Ok(slots)
}

fn lower_parameter(param: &Param, slots: &FxHashMap<ParamId, usize>) -> Lowered {
    // Unbound parameters were rejected before lowering.
    let slot = slots.get(&param.id()).copied().unwrap_or(usize::MAX);
    let arity = slots.len();
    Lowered::dynamic(Box::new(move |args: &[Value]| {
        args.get(slot).cloned().ok_or(EvalError::Arity {
            expected: arity,
            found: args.len(),
        })
    }))
}

/// Getters are host code, so a read is checked against the member's
/// declared type before it flows into typed operators.
fn lower_member_get(
    receiver: CompiledExpr,
    member: &MemberRef,
    ty_name: Arc<str>,
) -> CompiledExpr {
    let receiver = Child::new(receiver);
    let member = Arc::clone(member);
    Box::new(move |args| {
        let value = receiver.call(args)?;
        match &value {
            Value::Object(object) => match member.read(object) {
                Some(read) if read.conforms_to(member.ty()) => Ok(read),
                Some(read) => Err(runtime_cast(&ty_name, &read)),
                None => Err(runtime_cast(member.owner_name(), &value)),
            },
            Value::Null => Err(EvalError::NullReceiver {
                member: member.name_arc(),
            }),
            other => Err(runtime_cast(member.owner_name(), other)),
        }
    })
}

#[cfg(test)]
mod tests;
