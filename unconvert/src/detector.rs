//! Redundant conversion detector.
//!
//! Walks one checked file and emits a [`Removal`] for every conversion
//! `T(x)` whose argument already has type `T`.

use crate::ast::{self, CallExpr, Expr, NodeId, NodeRef, UnaryOp};
use crate::edits::Removal;
use crate::error::Result;
use crate::oracle;
use crate::source::SourceUnit;
use crate::types::{identical, Type};
use crate::untyped::{is_untyped_value, UntypedMode};
use log::{trace, warn};
use rustc_hash::FxHashSet;
use std::collections::BTreeSet;

/// Detector settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DetectOptions {
    /// Classifier used for the untyped-constant exception.
    pub untyped: UntypedMode,
    /// Also remove floating-point conversions that keep an arithmetic
    /// operand from being fused with the surrounding operation.
    pub fast_math: bool,
}

/// Finds every redundant conversion in `unit`.
///
/// Nested conversions are decided against their nearest ancestor that stays
/// in the file: a removed conversion never counts as a parent, so a chain
/// such as `T(T(x))` rewrites to exactly what removing it as one would.
pub fn detect(unit: &SourceUnit, options: DetectOptions) -> Result<BTreeSet<Removal>> {
    let root = NodeRef::File(&unit.file);

    // Pre-order: enclosing conversions are decided before the ones inside.
    let mut redundant = FxHashSet::default();
    let walked: Result<()> = ast::walk(root, &mut |node, ancestors| {
        if let NodeRef::Expr(Expr::Call(call)) = node {
            if is_redundant(unit, call, ancestors, &redundant, options) {
                redundant.insert(call.id);
            }
        }
        Ok(())
    });
    walked?;

    let mut removals = BTreeSet::new();
    let walked: Result<()> = ast::walk(root, &mut |node, ancestors| {
        if let NodeRef::Expr(Expr::Call(call)) = node {
            if redundant.contains(&call.id) {
                removals.extend(removal(unit, call, ancestors, &redundant)?);
            }
        }
        Ok(())
    });
    walked?;
    Ok(removals)
}

fn is_redundant(
    unit: &SourceUnit,
    call: &CallExpr,
    ancestors: &[NodeRef<'_>],
    redundant: &FxHashSet<NodeId>,
    options: DetectOptions,
) -> bool {
    // Conversions have exactly one argument.
    let [arg] = call.args.as_slice() else {
        return false;
    };
    if call.ellipsis {
        return false;
    }

    let Some(target) = unit.info.type_of(call.fun.id()) else {
        warn!(
            "{}: missing type for callee of {}",
            unit.path.display(),
            call.id
        );
        return false;
    };
    if !target.is_type() {
        return false;
    }
    let Some(operand) = unit.info.type_of(arg.id()) else {
        warn!(
            "{}: missing type for argument of {}",
            unit.path.display(),
            call.id
        );
        return false;
    };
    if !identical(&target.ty, &operand.ty) {
        return false;
    }
    if is_untyped_value(arg, &unit.info, options.untyped) {
        return false;
    }
    if !options.fast_math && prevents_fusion(&target.ty, arg, ancestors, redundant) {
        trace!(
            "{}: keeping {} conversion {}",
            unit.path.display(),
            target.ty,
            call.id
        );
        return false;
    }
    true
}

fn removal<'a>(
    unit: &SourceUnit,
    call: &'a CallExpr,
    ancestors: &[NodeRef<'a>],
    redundant: &FxHashSet<NodeId>,
) -> Result<Option<Removal>> {
    let [arg] = call.args.as_slice() else {
        return Ok(None);
    };
    let start = unit.span(call.id)?.start;
    let (lparen, rparen) = unit.parens(call.id)?;
    let arg_span = unit.span(arg.id())?;

    // A removed conversion directly inside supplies any parens needed.
    let keep = match arg {
        Expr::Call(inner) if redundant.contains(&inner.id) => false,
        _ => {
            let (top, outer) = chain_top(call, ancestors, redundant);
            oracle::needs_parens(&unit.path, outer, top, arg)?
        }
    };
    Ok(Some(if keep {
        Removal::keep_parens(start, lparen, arg_span.end, rparen)
    } else {
        Removal::strip_parens(start, lparen, arg_span, rparen)
    }))
}

/// The outermost removed conversion whose argument is, through removed
/// conversions only, `call`; returned with its own ancestors.
fn chain_top<'a, 'b>(
    call: &'a CallExpr,
    ancestors: &'b [NodeRef<'a>],
    redundant: &FxHashSet<NodeId>,
) -> (&'a CallExpr, &'b [NodeRef<'a>]) {
    let mut top = call;
    let mut depth = ancestors.len();
    while let Some(NodeRef::Expr(Expr::Call(outer))) =
        depth.checked_sub(1).and_then(|i| ancestors.get(i).copied())
    {
        let wraps = outer.args.first().is_some_and(|a| a.id() == top.id);
        if !wraps || !redundant.contains(&outer.id) {
            break;
        }
        top = outer;
        depth -= 1;
    }
    (top, &ancestors[..depth])
}

/// A floating-point conversion of an arithmetic result that is itself an
/// operand of arithmetic forces rounding in between, so the two operations
/// cannot be fused.
fn prevents_fusion(
    target: &Type,
    arg: &Expr,
    ancestors: &[NodeRef<'_>],
    redundant: &FxHashSet<NodeId>,
) -> bool {
    if !target.is_floating() {
        return false;
    }
    if !matches!(arg.unparen(), Expr::Binary(b) if b.op.is_float_arithmetic()) {
        return false;
    }
    let outer = ancestors.iter().rev().find(|n| match n {
        NodeRef::Expr(Expr::Paren(_)) => false,
        NodeRef::Expr(Expr::Call(c)) => !redundant.contains(&c.id),
        _ => true,
    });
    match outer {
        Some(NodeRef::Expr(Expr::Binary(b))) => b.op.is_float_arithmetic(),
        Some(NodeRef::Expr(Expr::Unary(u))) => matches!(u.op, UnaryOp::Neg | UnaryOp::Pos),
        _ => false,
    }
}
