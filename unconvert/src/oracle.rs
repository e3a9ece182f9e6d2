//! Parenthesization oracle.
//!
//! Decides whether removing `T(` and `)` from `T(arg)` would change how the
//! surrounding code parses. The parent is rendered twice by the canonical
//! printer, once with `arg` in place of the conversion and once with `(arg)`;
//! the parentheses are required iff the two renderings differ.

use crate::ast::{CallExpr, Expr, NodeRef, Stmt};
use crate::error::{Result, UnconvertError};
use crate::printer::{render, Substitution};
use log::trace;
use std::path::Path;

/// Reports whether `arg` must stay parenthesized once `call` is removed.
///
/// `ancestors` are the ancestors of `call`, innermost last. `arg` need not be
/// a direct argument of `call`: for a chain of removed conversions, `call` is
/// the outermost one and `arg` what is left of the innermost.
pub fn needs_parens<'a>(
    path: &Path,
    ancestors: &[NodeRef<'a>],
    call: &'a CallExpr,
    arg: &'a Expr,
) -> Result<bool> {
    let missing = || UnconvertError::MissingSlot {
        path: path.to_path_buf(),
        node: call.id,
    };
    let parent = *ancestors.last().ok_or_else(missing)?;
    let slot = parent.slot_of(call.id).ok_or_else(missing)?;

    let scope = scope(parent, ancestors);
    let bare = render(
        scope,
        Some(Substitution {
            target: call.id,
            replacement: arg,
            parenthesize: false,
        }),
    );
    let wrapped = render(
        scope,
        Some(Substitution {
            target: call.id,
            replacement: arg,
            parenthesize: true,
        }),
    );

    let required = bare != wrapped;
    trace!(
        "{}: conversion {} in {slot}: {bare:?} vs {wrapped:?}, parens {}",
        path.display(),
        call.id,
        if required { "required" } else { "optional" }
    );
    Ok(required)
}

/// The node to render: the parent, or the `if`/`for`/`switch` statement
/// whose header contains it.
fn scope<'a>(parent: NodeRef<'a>, ancestors: &[NodeRef<'a>]) -> NodeRef<'a> {
    for node in ancestors.iter().rev() {
        match node {
            NodeRef::Stmt(
                Stmt::If(_)
                | Stmt::For(_)
                | Stmt::Range(_)
                | Stmt::Switch(_)
                | Stmt::TypeSwitch(_),
            ) => return *node,
            NodeRef::Block(_)
            | NodeRef::CaseClause(_)
            | NodeRef::CommClause(_)
            | NodeRef::Stmt(Stmt::Block(_))
            | NodeRef::Expr(Expr::FuncLit(_))
            | NodeRef::Decl(_)
            | NodeRef::GenDecl(_)
            | NodeRef::File(_) => break,
            _ => {}
        }
    }
    parent
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{self, BinaryOp, UnaryOp};
    use crate::source::SourceUnit;
    use crate::test_utils::Fixture;
    use crate::types::BasicKind;

    /// Oracle answers for every conversion of the unit, in walk order.
    fn decisions(unit: &SourceUnit) -> Vec<bool> {
        let mut out = Vec::new();
        let walked: Result<()> = ast::walk(NodeRef::File(&unit.file), &mut |node, ancestors| {
            if let NodeRef::Expr(Expr::Call(call)) = node {
                out.push(needs_parens(&unit.path, ancestors, call, &call.args[0])?);
            }
            Ok(())
        });
        walked.unwrap();
        out
    }

    #[test]
    fn test_precedence() {
        let fx = Fixture::new();
        let a = fx.var("a", BasicKind::Int);
        let (b, c) = (fx.var("b", BasicKind::Int), fx.var("c", BasicKind::Int));
        let sum = fx.binary(b, BinaryOp::Add, c);
        let conv = fx.conv(fx.basic_type(BasicKind::Int), sum);
        let product = fx.binary(a, BinaryOp::Mul, conv);

        let d = fx.var("d", BasicKind::Int);
        let (e, f) = (fx.var("e", BasicKind::Int), fx.var("f", BasicKind::Int));
        let product2 = fx.binary(e, BinaryOp::Mul, f);
        let conv2 = fx.conv(fx.basic_type(BasicKind::Int), product2);
        let sum2 = fx.binary(d, BinaryOp::Add, conv2);

        let body = vec![fx.blank(product), fx.blank(sum2)];
        let unit = fx.finish("p/prec.go", vec![fx.func_decl("f", body)]);
        assert_eq!(decisions(&unit), vec![true, false]);
    }

    #[test]
    fn test_unary_fusion() {
        let fx = Fixture::new();
        let x = fx.var("x", BasicKind::Int);
        let inner = fx.unary(UnaryOp::Neg, x);
        let conv = fx.conv(fx.basic_type(BasicKind::Int), inner);
        let outer = fx.unary(UnaryOp::Neg, conv);
        let unit = fx.finish("p/neg.go", vec![fx.func_decl("f", vec![fx.blank(outer)])]);
        assert_eq!(decisions(&unit), vec![true]);
    }

    #[test]
    fn test_composite_in_if_header() {
        let fx = Fixture::new();
        let t = fx.named("T", None);
        let lit = fx.composite(fx.type_name("T", t.clone()), vec![]);
        let conv = fx.conv(fx.type_name("T", t.clone()), lit);
        let x = fx.var_of("x", t.clone());
        let cond = fx.binary(x, BinaryOp::Eql, conv);
        let in_header = fx.if_stmt(cond, vec![]);

        let lit = fx.composite(fx.type_name("T", t.clone()), vec![]);
        let conv = fx.conv(fx.type_name("T", t), lit);
        let in_body = fx.blank(conv);

        let unit = fx.finish("p/hdr.go", vec![fx.func_decl("f", vec![in_header, in_body])]);
        assert_eq!(decisions(&unit), vec![true, false]);
    }

    #[test]
    fn test_composite_in_switch_header() {
        let fx = Fixture::new();
        let t = fx.named("T", None);
        let lit = fx.composite(fx.type_name("T", t.clone()), vec![]);
        let conv = fx.conv(fx.type_name("T", t.clone()), lit);
        let x = fx.var_of("x", t.clone());
        let tag = fx.binary(x, BinaryOp::Eql, conv);

        let lit = fx.composite(fx.type_name("T", t.clone()), vec![]);
        let case = fx.conv(fx.type_name("T", t), lit);
        let switch = fx.switch_stmt(Some(tag), vec![(vec![case], vec![])]);

        let unit = fx.finish("p/sw.go", vec![fx.func_decl("f", vec![switch])]);
        assert_eq!(decisions(&unit), vec![true, false]);
    }

    #[test]
    fn test_missing_parent_is_an_error() {
        let fx = Fixture::new();
        let y = fx.var("y", BasicKind::Int);
        let conv = fx.conv(fx.basic_type(BasicKind::Int), y);
        let Expr::Call(call) = &conv else {
            unreachable!()
        };
        let err = needs_parens(Path::new("p/f.go"), &[], call, &call.args[0]).unwrap_err();
        assert!(matches!(err, UnconvertError::MissingSlot { .. }));
    }
}
