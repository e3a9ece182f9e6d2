//! Source printer.
//!
//! Two styles share one tree walk:
//!
//! - [`Style::Faithful`] prints every node as written, including every
//!   parenthesized expression, and records the span of each expression and
//!   statement plus the parenthesis offsets of each call. Fixtures use it to
//!   produce source text and the matching [`Positions`] table together.
//! - [`Style::Canonical`] never inserts parentheses and prints an explicit
//!   parenthesized expression only where it is needed: operator precedence,
//!   operator tokens that would fuse with a unary operand (`- -x` written as
//!   `--x`), and composite literals of named types inside statement headers
//!   (`if`, `for`, `switch`).
//!
//! A [`Substitution`] swaps one node for another while printing, optionally
//! wrapped in parentheses that are subject to the same canonical rule. The
//! parenthesization oracle renders a parent twice, with and without that
//! wrapper, and compares.

use crate::ast::{
    BlockStmt, CaseClause, ChanDir, CommClause, Decl, Expr, Field, File, FuncDecl, FuncType,
    GenDecl, NodeId, NodeRef, Spec, Stmt,
};
use crate::source::{Positions, Span};

/// Printing style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    /// Print exactly what the tree holds and record positions.
    Faithful,
    /// Print parenthesized expressions only where required.
    Canonical,
}

/// Prints `replacement` wherever the node `target` would be printed.
#[derive(Debug, Clone, Copy)]
pub struct Substitution<'a> {
    /// Node to replace.
    pub target: NodeId,
    /// Expression printed in its place.
    pub replacement: &'a Expr,
    /// Wrap the replacement in parentheses, kept only where required.
    pub parenthesize: bool,
}

/// Prints a file in the faithful style, returning its text and positions.
#[must_use]
pub fn layout(file: &File) -> (String, Positions) {
    let mut printer = Printer::new(Style::Faithful, None);
    printer.file(file);
    let positions = printer.positions.unwrap_or_default();
    (printer.out, positions)
}

/// Renders a node in the canonical style.
#[must_use]
pub fn render<'a>(node: NodeRef<'a>, substitution: Option<Substitution<'a>>) -> String {
    let mut printer = Printer::new(Style::Canonical, substitution);
    printer.node(node);
    printer.out
}

/// Syntactic context of the slot an expression is printed into.
#[derive(Debug, Clone, Copy, Default)]
struct Ctx {
    /// Lowest precedence printable without parentheses.
    min_prec: u8,
    /// Operator token printed immediately before the expression.
    after: Option<&'static str>,
    /// Inside an `if`/`for`/`switch` header, outside any brackets.
    in_header: bool,
}

impl Ctx {
    const fn prec(self, min_prec: u8) -> Self {
        Self {
            min_prec,
            after: None,
            in_header: self.in_header,
        }
    }

    const fn operand(self, min_prec: u8, after: &'static str) -> Self {
        Self {
            min_prec,
            after: Some(after),
            in_header: self.in_header,
        }
    }

    const fn header() -> Self {
        Self {
            min_prec: 0,
            after: None,
            in_header: true,
        }
    }
}

const UNARY_PREC: u8 = 6;
const PRIMARY_PREC: u8 = 7;

/// Whether `left` followed directly by `right` lexes as a different token.
fn tokens_fuse(left: &str, right: &str) -> bool {
    // `chan <-chan T` parses as `chan<- (chan T)`.
    if left == "chan" {
        return right == "<-";
    }
    let (Some(l), Some(r)) = (left.chars().last(), right.chars().next()) else {
        return false;
    };
    matches!(
        (l, r),
        ('+', '+') | ('-', '-') | ('&', '&' | '^') | ('<', '-' | '<') | ('/', '*' | '/')
    )
}

struct Printer<'a> {
    style: Style,
    out: String,
    positions: Option<Positions>,
    substitution: Option<Substitution<'a>>,
    indent: usize,
}

impl<'a> Printer<'a> {
    fn new(style: Style, substitution: Option<Substitution<'a>>) -> Self {
        Self {
            style,
            out: String::new(),
            positions: (style == Style::Faithful).then(Positions::new),
            substitution,
            indent: 0,
        }
    }

    fn node(&mut self, node: NodeRef<'a>) {
        match node {
            NodeRef::File(f) => self.file(f),
            NodeRef::Decl(d) => self.decl(d),
            NodeRef::GenDecl(d) => self.gen_decl(d),
            NodeRef::Spec(s) => self.spec(s),
            NodeRef::Stmt(s) => self.stmt(s),
            NodeRef::Block(b) => self.block(b),
            NodeRef::CaseClause(c) => self.case_clause(c),
            NodeRef::CommClause(c) => self.comm_clause(c),
            NodeRef::Expr(e) => self.expr(e, Ctx::default()),
            NodeRef::Field(f) => self.field(f),
            NodeRef::FuncType(t) => {
                self.out.push_str("func");
                self.signature(t);
            }
        }
    }

    fn record(&mut self, id: NodeId, start: usize) {
        let end = self.out.len();
        if let Some(positions) = &mut self.positions {
            positions.set_span(id, Span::new(start, end));
        }
    }

    fn newline(&mut self) {
        self.out.push('\n');
        for _ in 0..self.indent {
            self.out.push('\t');
        }
    }

    // Declarations

    fn file(&mut self, file: &'a File) {
        self.out.push_str("package ");
        self.out.push_str(&file.package.name);
        self.out.push('\n');
        for decl in &file.decls {
            self.out.push('\n');
            self.decl(decl);
            self.out.push('\n');
        }
    }

    fn decl(&mut self, decl: &'a Decl) {
        match decl {
            Decl::Gen(d) => self.gen_decl(d),
            Decl::Func(d) => self.func_decl(d),
        }
    }

    fn gen_decl(&mut self, decl: &'a GenDecl) {
        self.out.push_str(decl.keyword.as_str());
        self.out.push(' ');
        if decl.grouped {
            self.out.push('(');
            self.indent += 1;
            for spec in &decl.specs {
                self.newline();
                self.spec(spec);
            }
            self.indent -= 1;
            self.newline();
            self.out.push(')');
        } else if let Some(spec) = decl.specs.first() {
            self.spec(spec);
        }
    }

    fn spec(&mut self, spec: &'a Spec) {
        match spec {
            Spec::Import(s) => {
                if let Some(name) = &s.name {
                    self.out.push_str(&name.name);
                    self.out.push(' ');
                }
                self.out.push_str(&s.path.value);
            }
            Spec::Value(s) => {
                self.idents(s.names.iter().map(|n| n.name.as_str()));
                if let Some(ty) = &s.ty {
                    self.out.push(' ');
                    self.expr(ty, Ctx::default());
                }
                if !s.values.is_empty() {
                    self.out.push_str(" = ");
                    self.exprs(&s.values, Ctx::default());
                }
            }
            Spec::Type(s) => {
                self.out.push_str(&s.name.name);
                self.out.push_str(if s.alias { " = " } else { " " });
                self.expr(&s.ty, Ctx::default());
            }
        }
    }

    fn func_decl(&mut self, decl: &'a FuncDecl) {
        self.out.push_str("func ");
        if let Some(recv) = &decl.recv {
            self.out.push('(');
            self.field(recv);
            self.out.push_str(") ");
        }
        self.out.push_str(&decl.name.name);
        self.signature(&decl.ty);
        if let Some(body) = &decl.body {
            self.out.push(' ');
            self.block(body);
        }
    }

    fn idents<'n>(&mut self, names: impl Iterator<Item = &'n str>) {
        for (i, name) in names.enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.out.push_str(name);
        }
    }

    fn field(&mut self, field: &'a Field) {
        self.idents(field.names.iter().map(|n| n.name.as_str()));
        if !field.names.is_empty() {
            self.out.push(' ');
        }
        self.expr(&field.ty, Ctx::default());
    }

    fn fields(&mut self, fields: &'a [Field], sep: &str) {
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                self.out.push_str(sep);
            }
            self.field(field);
        }
    }

    fn signature(&mut self, ty: &'a FuncType) {
        self.out.push('(');
        self.fields(&ty.params, ", ");
        self.out.push(')');
        match ty.results.as_slice() {
            [] => {}
            [single] if single.names.is_empty() => {
                self.out.push(' ');
                self.field(single);
            }
            results => {
                self.out.push_str(" (");
                self.fields(results, ", ");
                self.out.push(')');
            }
        }
    }

    // Statements

    fn block(&mut self, block: &'a BlockStmt) {
        let start = self.out.len();
        self.out.push('{');
        self.indent += 1;
        for stmt in &block.stmts {
            self.newline();
            self.stmt(stmt);
        }
        self.indent -= 1;
        self.newline();
        self.out.push('}');
        self.record(block.id, start);
    }

    fn stmt(&mut self, stmt: &'a Stmt) {
        self.stmt_in(stmt, Ctx::default());
    }

    fn clause_body(&mut self, body: &'a [Stmt]) {
        self.indent += 1;
        for stmt in body {
            self.newline();
            self.stmt(stmt);
        }
        self.indent -= 1;
    }

    fn case_clause(&mut self, clause: &'a CaseClause) {
        let start = self.out.len();
        if clause.list.is_empty() {
            self.out.push_str("default:");
        } else {
            self.out.push_str("case ");
            self.exprs(&clause.list, Ctx::default());
            self.out.push(':');
        }
        self.clause_body(&clause.body);
        self.record(clause.id, start);
    }

    fn comm_clause(&mut self, clause: &'a CommClause) {
        let start = self.out.len();
        if let Some(comm) = &clause.comm {
            self.out.push_str("case ");
            self.stmt(comm);
            self.out.push(':');
        } else {
            self.out.push_str("default:");
        }
        self.clause_body(&clause.body);
        self.record(clause.id, start);
    }

    fn switch_head(&mut self, init: Option<&'a Stmt>) {
        self.out.push_str("switch ");
        if let Some(init) = init {
            self.stmt_in(init, Ctx::header());
            self.out.push_str("; ");
        }
    }

    fn case_clauses(&mut self, clauses: &'a [CaseClause]) {
        self.out.push('{');
        for clause in clauses {
            self.newline();
            self.case_clause(clause);
        }
        self.newline();
        self.out.push('}');
    }

    fn stmt_in(&mut self, stmt: &'a Stmt, ctx: Ctx) {
        let start = self.out.len();
        match stmt {
            Stmt::Expr(s) => self.expr(&s.x, ctx),
            Stmt::Assign(s) => {
                self.exprs(&s.lhs, ctx);
                self.out.push(' ');
                self.out.push_str(&s.op.to_string());
                self.out.push(' ');
                self.exprs(&s.rhs, ctx);
            }
            Stmt::IncDec(s) => {
                self.expr(&s.x, ctx);
                self.out.push_str(if s.inc { "++" } else { "--" });
            }
            Stmt::Return(s) => {
                self.out.push_str("return");
                if !s.results.is_empty() {
                    self.out.push(' ');
                    self.exprs(&s.results, ctx);
                }
            }
            Stmt::Block(b) => self.block(b),
            Stmt::If(s) => {
                self.out.push_str("if ");
                if let Some(init) = &s.init {
                    self.stmt_in(init, Ctx::header());
                    self.out.push_str("; ");
                }
                self.expr(&s.cond, Ctx::header());
                self.out.push(' ');
                self.block(&s.body);
                if let Some(els) = &s.els {
                    self.out.push_str(" else ");
                    self.stmt(els);
                }
            }
            Stmt::For(s) => {
                self.out.push_str("for ");
                if s.init.is_some() || s.post.is_some() {
                    if let Some(init) = &s.init {
                        self.stmt_in(init, Ctx::header());
                    }
                    self.out.push_str("; ");
                    if let Some(cond) = &s.cond {
                        self.expr(cond, Ctx::header());
                    }
                    self.out.push_str("; ");
                    if let Some(post) = &s.post {
                        self.stmt_in(post, Ctx::header());
                    }
                    self.out.push(' ');
                } else if let Some(cond) = &s.cond {
                    self.expr(cond, Ctx::header());
                    self.out.push(' ');
                }
                self.block(&s.body);
            }
            Stmt::Range(s) => {
                self.out.push_str("for ");
                if let Some(key) = &s.key {
                    self.expr(key, Ctx::header());
                    if let Some(value) = &s.value {
                        self.out.push_str(", ");
                        self.expr(value, Ctx::header());
                    }
                    self.out.push_str(if s.define { " := " } else { " = " });
                }
                self.out.push_str("range ");
                self.expr(&s.x, Ctx::header());
                self.out.push(' ');
                self.block(&s.body);
            }
            Stmt::Switch(s) => {
                self.switch_head(s.init.as_deref());
                if let Some(tag) = &s.tag {
                    self.expr(tag, Ctx::header());
                    self.out.push(' ');
                }
                self.case_clauses(&s.body);
            }
            Stmt::TypeSwitch(s) => {
                self.switch_head(s.init.as_deref());
                self.stmt_in(&s.assign, Ctx::header());
                self.out.push(' ');
                self.case_clauses(&s.body);
            }
            Stmt::Select(s) => {
                self.out.push_str("select {");
                for clause in &s.body {
                    self.newline();
                    self.comm_clause(clause);
                }
                self.newline();
                self.out.push('}');
            }
            Stmt::Go(s) => {
                self.out.push_str("go ");
                self.expr(&s.call, ctx);
            }
            Stmt::Defer(s) => {
                self.out.push_str("defer ");
                self.expr(&s.call, ctx);
            }
            Stmt::Send(s) => {
                self.expr(&s.chan, ctx);
                self.out.push_str(" <- ");
                self.expr(&s.value, ctx);
            }
            Stmt::Labeled(s) => {
                self.out.push_str(&s.label.name);
                self.out.push(':');
                self.newline();
                self.stmt(&s.stmt);
            }
            Stmt::Branch(s) => {
                self.out.push_str(s.kind.as_str());
                if let Some(label) = &s.label {
                    self.out.push(' ');
                    self.out.push_str(&label.name);
                }
            }
            Stmt::Decl(s) => self.gen_decl(&s.decl),
        }
        self.record(stmt.id(), start);
    }

    // Expressions

    fn exprs(&mut self, list: &'a [Expr], ctx: Ctx) {
        for (i, e) in list.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.expr(e, ctx.prec(0));
        }
    }

    fn expr(&mut self, e: &'a Expr, ctx: Ctx) {
        if let Some(sub) = self.substitution.filter(|s| s.target == e.id()) {
            if sub.parenthesize && self.needs_parens(sub.replacement, ctx) {
                self.out.push('(');
                self.expr(sub.replacement, Ctx::default());
                self.out.push(')');
            } else {
                self.expr(sub.replacement, ctx);
            }
            return;
        }
        let start = self.out.len();
        self.expr_node(e, ctx);
        self.record(e.id(), start);
    }

    fn expr_node(&mut self, e: &'a Expr, ctx: Ctx) {
        match e {
            Expr::Ident(id) => self.out.push_str(&id.name),
            Expr::BasicLit(lit) => self.out.push_str(&lit.value),
            Expr::Composite(c) => {
                if let Some(ty) = &c.ty {
                    self.expr(ty, ctx.prec(PRIMARY_PREC));
                }
                self.out.push('{');
                self.exprs(&c.elts, Ctx::default());
                self.out.push('}');
            }
            Expr::FuncLit(f) => {
                self.out.push_str("func");
                self.signature(&f.ty);
                self.out.push(' ');
                self.block(&f.body);
            }
            Expr::Paren(p) => {
                if self.style == Style::Faithful || self.needs_parens(&p.x, ctx) {
                    self.out.push('(');
                    self.expr(&p.x, Ctx::default());
                    self.out.push(')');
                } else {
                    self.expr(&p.x, ctx);
                }
            }
            Expr::Selector(s) => {
                self.expr(&s.x, ctx.prec(PRIMARY_PREC));
                self.out.push('.');
                self.out.push_str(&s.sel.name);
            }
            Expr::Index(i) => {
                self.expr(&i.x, ctx.prec(PRIMARY_PREC));
                self.out.push('[');
                self.expr(&i.index, Ctx::default());
                self.out.push(']');
            }
            Expr::Slice(s) => {
                self.expr(&s.x, ctx.prec(PRIMARY_PREC));
                self.out.push('[');
                let bounds = [s.low.as_deref(), s.high.as_deref(), s.max.as_deref()];
                let count = if s.max.is_some() { 3 } else { 2 };
                for (i, bound) in bounds.into_iter().take(count).enumerate() {
                    if i > 0 {
                        self.out.push(':');
                    }
                    if let Some(bound) = bound {
                        self.expr(bound, Ctx::default());
                    }
                }
                self.out.push(']');
            }
            Expr::TypeAssert(t) => {
                self.expr(&t.x, ctx.prec(PRIMARY_PREC));
                self.out.push_str(".(");
                match &t.ty {
                    Some(ty) => self.expr(ty, Ctx::default()),
                    None => self.out.push_str("type"),
                }
                self.out.push(')');
            }
            Expr::Call(c) => {
                self.expr(&c.fun, ctx.prec(PRIMARY_PREC));
                let lparen = self.out.len();
                self.out.push('(');
                self.exprs(&c.args, Ctx::default());
                if c.ellipsis {
                    self.out.push_str("...");
                }
                let rparen = self.out.len();
                self.out.push(')');
                if let Some(positions) = &mut self.positions {
                    positions.set_parens(c.id, lparen, rparen);
                }
            }
            Expr::Star(s) => {
                self.out.push('*');
                self.expr(&s.x, ctx.operand(UNARY_PREC, "*"));
            }
            Expr::Unary(u) => {
                self.out.push_str(u.op.as_str());
                self.expr(&u.x, ctx.operand(UNARY_PREC, u.op.as_str()));
            }
            Expr::Binary(b) => {
                let prec = b.op.precedence();
                self.expr(&b.x, ctx.prec(prec));
                self.out.push(' ');
                self.out.push_str(b.op.as_str());
                self.out.push(' ');
                self.expr(&b.y, ctx.operand(prec + 1, b.op.as_str()));
            }
            Expr::KeyValue(kv) => {
                self.expr(&kv.key, ctx.prec(0));
                self.out.push_str(": ");
                self.expr(&kv.value, ctx.prec(0));
            }
            Expr::ArrayType(a) => {
                self.out.push('[');
                if let Some(len) = &a.len {
                    self.expr(len, Ctx::default());
                }
                self.out.push(']');
                self.expr(&a.elem, Ctx::default());
            }
            Expr::StructType(s) => {
                self.out.push_str("struct{");
                if !s.fields.is_empty() {
                    self.out.push(' ');
                    self.fields(&s.fields, "; ");
                    self.out.push(' ');
                }
                self.out.push('}');
            }
            Expr::FuncType(f) => {
                self.out.push_str("func");
                self.signature(f);
            }
            Expr::InterfaceType(i) => {
                self.out.push_str("interface{");
                if !i.methods.is_empty() {
                    self.out.push(' ');
                    for (n, method) in i.methods.iter().enumerate() {
                        if n > 0 {
                            self.out.push_str("; ");
                        }
                        match (&method.ty, method.names.first()) {
                            (Expr::FuncType(sig), Some(name)) => {
                                self.out.push_str(&name.name);
                                self.signature(sig);
                            }
                            _ => self.field(method),
                        }
                    }
                    self.out.push(' ');
                }
                self.out.push('}');
            }
            Expr::MapType(m) => {
                self.out.push_str("map[");
                self.expr(&m.key, Ctx::default());
                self.out.push(']');
                self.expr(&m.value, Ctx::default());
            }
            Expr::ChanType(c) => {
                self.out.push_str(c.dir.prefix());
                let elem = match c.dir {
                    ChanDir::Both => Ctx::default().operand(0, "chan"),
                    ChanDir::Send | ChanDir::Recv => Ctx::default(),
                };
                self.expr(&c.value, elem);
            }
            Expr::Ellipsis(e) => {
                self.out.push_str("...");
                if let Some(elt) = &e.elt {
                    self.expr(elt, Ctx::default());
                }
            }
        }
    }

    // Canonical parenthesization

    /// The expression that will actually be printed for `e`, or `None` when
    /// it prints inside parentheses of its own.
    fn view(&self, e: &'a Expr) -> Option<&'a Expr> {
        match self.substitution {
            Some(sub) if sub.target == e.id() => (!sub.parenthesize).then_some(sub.replacement),
            _ if matches!(e, Expr::Paren(_)) => None,
            _ => Some(e),
        }
    }

    fn needs_parens(&self, e: &'a Expr, ctx: Ctx) -> bool {
        let Some(v) = self.view(e) else {
            return false;
        };
        Self::precedence(v) < ctx.min_prec
            || ctx
                .after
                .zip(self.leading_op(v))
                .is_some_and(|(left, right)| tokens_fuse(left, right))
            || (ctx.in_header && self.exposes_composite(v))
    }

    fn precedence(e: &Expr) -> u8 {
        match e {
            Expr::Binary(b) => b.op.precedence(),
            Expr::Unary(_) | Expr::Star(_) | Expr::ChanType(_) => UNARY_PREC,
            Expr::FuncType(f) if f.results.is_empty() => UNARY_PREC,
            _ => PRIMARY_PREC,
        }
    }

    /// Operator token the printed expression starts with.
    fn leading_op(&self, e: &'a Expr) -> Option<&'static str> {
        match e {
            Expr::Unary(u) => Some(u.op.as_str()),
            Expr::Star(_) => Some("*"),
            Expr::Binary(b) => self.view(&b.x).and_then(|x| self.leading_op(x)),
            Expr::Call(c) => self.view(&c.fun).and_then(|f| self.leading_op(f)),
            Expr::Selector(s) => self.view(&s.x).and_then(|x| self.leading_op(x)),
            Expr::Index(i) => self.view(&i.x).and_then(|x| self.leading_op(x)),
            Expr::Slice(s) => self.view(&s.x).and_then(|x| self.leading_op(x)),
            Expr::TypeAssert(t) => self.view(&t.x).and_then(|x| self.leading_op(x)),
            Expr::ChanType(c) if c.dir == ChanDir::Recv => Some("<-"),
            _ => None,
        }
    }

    /// Whether a composite literal of a named type appears outside brackets.
    fn exposes_composite(&self, e: &'a Expr) -> bool {
        let exposed = |child: &'a Expr| self.view(child).is_some_and(|c| self.exposes_composite(c));
        match e {
            Expr::Composite(c) => c
                .ty
                .as_deref()
                .is_some_and(|ty| matches!(ty.unparen(), Expr::Ident(_) | Expr::Selector(_))),
            Expr::Binary(b) => exposed(&b.x) || exposed(&b.y),
            Expr::Unary(u) => exposed(&u.x),
            Expr::Star(s) => exposed(&s.x),
            Expr::Selector(s) => exposed(&s.x),
            Expr::Index(i) => exposed(&i.x),
            Expr::Slice(s) => exposed(&s.x),
            Expr::TypeAssert(t) => exposed(&t.x),
            Expr::Call(c) => exposed(&c.fun),
            _ => false,
        }
    }
}
