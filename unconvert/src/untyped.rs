//! Untyped-value classification.
//!
//! A conversion of an untyped constant expression is never redundant even
//! when the checker records the converted type for the argument: without the
//! conversion the constant would take its default type instead.

use crate::ast::{Expr, NodeId, UnaryOp};
use crate::types::{Builtin, ObjectKind, TypeInfo};
use serde::{Deserialize, Serialize};

/// How eagerly expressions are classified as untyped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UntypedMode {
    /// Follows constant propagation through operators, literals, parentheses,
    /// selectors, untyped identifiers and the `real`/`imag`/`complex` builtins.
    #[default]
    Permissive,
    /// Only shifts of untyped operands, comparisons and `nil`.
    Strict,
}

/// Reports whether `expr` yields an untyped value under `mode`.
///
/// The two modes disagree on arithmetic over untyped operands, e.g. `1 + 2`
/// is untyped in permissive mode and typed in strict mode. Both are
/// approximations of the language's constant rules.
#[must_use]
pub fn is_untyped_value(expr: &Expr, info: &TypeInfo, mode: UntypedMode) -> bool {
    match mode {
        UntypedMode::Permissive => permissive(expr, info),
        UntypedMode::Strict => strict(expr, info),
    }
}

fn permissive(expr: &Expr, info: &TypeInfo) -> bool {
    match expr {
        Expr::Binary(b) if b.op.is_shift() => permissive(&b.x, info),
        Expr::Binary(b) if b.op.is_comparison() => true,
        Expr::Binary(b) => permissive(&b.x, info) && permissive(&b.y, info),
        Expr::Unary(u) => match u.op {
            UnaryOp::Pos | UnaryOp::Neg | UnaryOp::Not | UnaryOp::Xor => permissive(&u.x, info),
            UnaryOp::Addr | UnaryOp::Recv => false,
        },
        Expr::BasicLit(_) => true,
        Expr::Paren(p) => permissive(&p.x, info),
        Expr::Selector(s) => untyped_ident(s.sel.id, info),
        Expr::Ident(id) => untyped_ident(id.id, info),
        Expr::Call(c) => match (builtin(&c.fun, info), c.args.as_slice()) {
            (Some(Builtin::Real | Builtin::Imag), [arg]) => permissive(arg, info),
            (Some(Builtin::Complex), [re, im]) => permissive(re, info) && permissive(im, info),
            _ => false,
        },
        _ => false,
    }
}

fn strict(expr: &Expr, info: &TypeInfo) -> bool {
    match expr {
        Expr::Binary(b) if b.op.is_shift() => strict(&b.x, info),
        Expr::Binary(b) => b.op.is_comparison(),
        Expr::Ident(id) => info.object_of(id.id).is_some_and(|obj| obj.is_nil()),
        _ => false,
    }
}

fn untyped_ident(id: NodeId, info: &TypeInfo) -> bool {
    info.object_of(id)
        .is_some_and(|obj| obj.is_nil() || obj.ty.is_untyped())
}

/// The builtin named by `fun`, looking through parentheses.
fn builtin(fun: &Expr, info: &TypeInfo) -> Option<Builtin> {
    let Expr::Ident(id) = fun.unparen() else {
        return None;
    };
    match info.object_of(id.id)?.kind {
        ObjectKind::Builtin(b) => Some(b),
        _ => None,
    }
}
