//! Helpers for building checked files in tests.
//!
//! [`Fixture`] hands out node ids and records type information as nodes are
//! built, the way a type checker would have annotated them. [`Fixture::finish`]
//! lays the declarations out as source text and returns a [`SourceUnit`] whose
//! spans and parenthesis offsets point into that text.

use crate::ast::{
    ArrayType, AssignOp, AssignStmt, BasicLit, BinaryExpr, BinaryOp, BlockStmt, CallExpr,
    CaseClause, CompositeLit, Decl, DeclKeyword, DeferStmt, Expr, ExprStmt, File, ForStmt,
    FuncDecl, FuncType, GenDecl, Ident, IfStmt, LitKind, NodeId, ParenExpr, RangeStmt,
    ReturnStmt, SelectorExpr, SliceExpr, Spec, StarExpr, Stmt, SwitchStmt, UnaryExpr, UnaryOp,
    ValueSpec,
};
use crate::error::FrontEndError;
use crate::frontend::{BuildConfig, FrontEnd, Importer};
use crate::printer;
use crate::source::SourceUnit;
use crate::types::{
    BasicKind, Builtin, Mode, NamedType, Object, ObjectKind, Type, TypeAndValue, TypeInfo,
};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Builder for one checked file.
#[derive(Debug, Default)]
pub struct Fixture {
    next_id: Cell<u32>,
    next_type: Cell<u32>,
    info: RefCell<TypeInfo>,
}

impl Fixture {
    /// Empty fixture.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh node id.
    pub fn next(&self) -> NodeId {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        NodeId(id)
    }

    /// Snapshot of the type information recorded so far.
    #[must_use]
    pub fn info(&self) -> TypeInfo {
        self.info.borrow().clone()
    }

    /// Type entry recorded for `expr`.
    #[must_use]
    pub fn type_of(&self, expr: &Expr) -> Option<TypeAndValue> {
        self.info.borrow().type_of(expr.id()).cloned()
    }

    /// Overwrites the type recorded for `expr`, keeping its mode.
    ///
    /// Checkers record the converted type for constant arguments, e.g. the
    /// `0` of `int64(0)` has type `int64`.
    pub fn retype(&self, expr: &Expr, ty: Type) {
        let mut info = self.info.borrow_mut();
        let mode = info.type_of(expr.id()).map_or(Mode::Value, |tv| tv.mode);
        info.types.insert(expr.id(), TypeAndValue::value(mode, ty));
    }

    /// Removes the type entry of `expr`, as for code the checker skipped.
    pub fn forget(&self, expr: &Expr) {
        self.info.borrow_mut().types.remove(&expr.id());
    }

    fn record(&self, id: NodeId, tv: TypeAndValue) {
        self.info.borrow_mut().types.insert(id, tv);
    }

    fn record_use(&self, id: NodeId, object: Object) {
        self.info.borrow_mut().uses.insert(id, object);
    }

    fn value_type(&self, expr: &Expr) -> Option<Type> {
        self.type_of(expr).map(|tv| tv.ty)
    }

    /// Identifier without any type information.
    pub fn ident(&self, name: &str) -> Ident {
        Ident {
            id: self.next(),
            name: name.into(),
        }
    }

    fn object_ident(&self, name: &str, kind: ObjectKind, tv: TypeAndValue) -> Expr {
        let ident = self.ident(name);
        self.record_use(
            ident.id,
            Object {
                name: name.into(),
                kind,
                ty: tv.ty.clone(),
                universe: false,
            },
        );
        self.record(ident.id, tv);
        Expr::Ident(ident)
    }

    // Types

    /// A new defined type named `name`, distinct from every other.
    pub fn named(&self, name: &str, basic: Option<BasicKind>) -> Type {
        let id = self.next_type.get() + 1;
        self.next_type.set(id);
        Type::Named(NamedType {
            id,
            pkg: None,
            name: name.into(),
            basic,
        })
    }

    /// Identifier naming the type `ty`.
    pub fn type_name(&self, name: &str, ty: Type) -> Expr {
        self.object_ident(name, ObjectKind::TypeName, TypeAndValue::type_expr(ty))
    }

    /// `[]elem`.
    pub fn slice_type(&self, elem: Expr) -> Expr {
        let id = self.next();
        if let Some(tv) = self.type_of(&elem).filter(TypeAndValue::is_type) {
            self.record(id, TypeAndValue::type_expr(Type::Slice(Box::new(tv.ty))));
        }
        Expr::ArrayType(ArrayType {
            id,
            len: None,
            elem: Box::new(elem),
        })
    }

    /// Identifier naming a predeclared basic type.
    pub fn basic_type(&self, kind: BasicKind) -> Expr {
        let ident = self.ident(kind.as_str());
        self.record_use(
            ident.id,
            Object {
                name: kind.as_str().into(),
                kind: ObjectKind::TypeName,
                ty: Type::basic(kind),
                universe: true,
            },
        );
        self.record(ident.id, TypeAndValue::type_expr(Type::basic(kind)));
        Expr::Ident(ident)
    }

    // Operands

    /// Integer literal, untyped.
    pub fn int_lit(&self, value: &str) -> Expr {
        self.lit(LitKind::Int, value, BasicKind::UntypedInt)
    }

    /// Floating-point literal, untyped.
    pub fn float_lit(&self, value: &str) -> Expr {
        self.lit(LitKind::Float, value, BasicKind::UntypedFloat)
    }

    fn lit(&self, kind: LitKind, value: &str, basic: BasicKind) -> Expr {
        let id = self.next();
        self.record(id, TypeAndValue::value(Mode::Constant, Type::basic(basic)));
        Expr::BasicLit(BasicLit {
            id,
            kind,
            value: value.into(),
        })
    }

    /// Named constant of a basic kind.
    pub fn constant(&self, name: &str, kind: BasicKind) -> Expr {
        self.object_ident(
            name,
            ObjectKind::Const,
            TypeAndValue::value(Mode::Constant, Type::basic(kind)),
        )
    }

    /// Variable of a basic kind.
    pub fn var(&self, name: &str, kind: BasicKind) -> Expr {
        self.var_of(name, Type::basic(kind))
    }

    /// Variable of any type.
    pub fn var_of(&self, name: &str, ty: Type) -> Expr {
        self.object_ident(name, ObjectKind::Var, TypeAndValue::value(Mode::Variable, ty))
    }

    /// Function returning `result`, e.g. the `f` of `f()`.
    pub fn func(&self, name: &str, result: Type) -> Expr {
        let sig = crate::types::Signature {
            params: Vec::new(),
            results: vec![result],
            variadic: false,
        };
        self.object_ident(name, ObjectKind::Func, TypeAndValue::value(Mode::Value, Type::Func(sig)))
    }

    /// The predeclared `nil`.
    pub fn nil(&self) -> Expr {
        let ident = self.ident("nil");
        self.record_use(ident.id, Object::nil());
        self.record(
            ident.id,
            TypeAndValue::value(Mode::Value, Type::basic(BasicKind::UntypedNil)),
        );
        Expr::Ident(ident)
    }

    /// The built-in function `name`.
    pub fn builtin(&self, name: &str) -> Expr {
        let builtin = Builtin::from_name(name);
        let ident = self.ident(name);
        let ty = Type::Func(crate::types::Signature::default());
        self.record_use(
            ident.id,
            Object {
                name: name.into(),
                kind: ObjectKind::Builtin(builtin),
                ty: ty.clone(),
                universe: true,
            },
        );
        self.record(ident.id, TypeAndValue::value(Mode::Builtin, ty));
        Expr::Ident(ident)
    }

    /// An imported package name.
    pub fn package(&self, name: &str) -> Expr {
        let ident = self.ident(name);
        self.record_use(
            ident.id,
            Object {
                name: name.into(),
                kind: ObjectKind::PkgName,
                // Package names have no type.
                ty: Type::Interface(Vec::new()),
                universe: false,
            },
        );
        Expr::Ident(ident)
    }

    /// `x.sel` denoting a constant of `kind`, e.g. `math.Pi`.
    pub fn selector(&self, x: Expr, sel: &str, kind: BasicKind) -> Expr {
        let sel = self.ident(sel);
        let tv = TypeAndValue::value(Mode::Constant, Type::basic(kind));
        self.record_use(
            sel.id,
            Object {
                name: sel.name.clone(),
                kind: ObjectKind::Const,
                ty: tv.ty.clone(),
                universe: false,
            },
        );
        self.record(sel.id, tv.clone());
        let id = self.next();
        self.record(id, tv);
        Expr::Selector(SelectorExpr {
            id,
            x: Box::new(x),
            sel,
        })
    }

    // Compound expressions

    /// `x op y`. Comparisons are untyped booleans; other operators take the
    /// type of the typed operand.
    pub fn binary(&self, x: Expr, op: BinaryOp, y: Expr) -> Expr {
        let ty = if op.is_comparison() {
            Some(Type::basic(BasicKind::UntypedBool))
        } else if op.is_shift() {
            self.value_type(&x)
        } else {
            match (self.value_type(&x), self.value_type(&y)) {
                (Some(tx), Some(ty)) if tx.is_untyped() => Some(ty),
                (tx, ty) => tx.or(ty),
            }
        };
        let id = self.next();
        if let Some(ty) = ty {
            self.record(id, TypeAndValue::value(Mode::Value, ty));
        }
        Expr::Binary(BinaryExpr {
            id,
            x: Box::new(x),
            op,
            y: Box::new(y),
        })
    }

    /// `op x`.
    pub fn unary(&self, op: UnaryOp, x: Expr) -> Expr {
        let ty = self.value_type(&x).map(|ty| match op {
            UnaryOp::Addr => Type::pointer(ty),
            _ => ty,
        });
        let id = self.next();
        if let Some(ty) = ty {
            self.record(id, TypeAndValue::value(Mode::Value, ty));
        }
        Expr::Unary(UnaryExpr {
            id,
            op,
            x: Box::new(x),
        })
    }

    /// `(x)`, with the type and mode of `x`.
    pub fn paren(&self, x: Expr) -> Expr {
        let id = self.next();
        if let Some(tv) = self.type_of(&x) {
            self.record(id, tv);
        }
        Expr::Paren(ParenExpr {
            id,
            x: Box::new(x),
        })
    }

    /// `*x`: a pointer type when `x` is a type, a dereference otherwise.
    pub fn star(&self, x: Expr) -> Expr {
        let id = self.next();
        match self.type_of(&x) {
            Some(tv) if tv.is_type() => {
                self.record(id, TypeAndValue::type_expr(Type::pointer(tv.ty)));
            }
            Some(TypeAndValue {
                ty: Type::Pointer(elem),
                ..
            }) => self.record(id, TypeAndValue::value(Mode::Variable, *elem)),
            _ => {}
        }
        Expr::Star(StarExpr {
            id,
            x: Box::new(x),
        })
    }

    /// `fun(args...)` with the result type of a function callee, or of the
    /// first argument for builtins.
    pub fn call(&self, fun: Expr, args: Vec<Expr>) -> Expr {
        let ty = match self.value_type(&fun) {
            Some(Type::Func(sig)) if sig.results.len() == 1 => sig.results.first().cloned(),
            _ => args.first().and_then(|a| self.value_type(a)),
        };
        let id = self.next();
        if let Some(ty) = ty {
            self.record(id, TypeAndValue::value(Mode::Value, ty));
        }
        Expr::Call(CallExpr {
            id,
            fun: Box::new(fun),
            args,
            ellipsis: false,
        })
    }

    /// Conversion `fun(arg)`, where `fun` denotes a type.
    pub fn conv(&self, fun: Expr, arg: Expr) -> Expr {
        let id = self.next();
        if let Some(tv) = self.type_of(&fun).filter(TypeAndValue::is_type) {
            self.record(id, TypeAndValue::value(Mode::Value, tv.ty));
        }
        Expr::Call(CallExpr {
            id,
            fun: Box::new(fun),
            args: vec![arg],
            ellipsis: false,
        })
    }

    /// `x[low:]`, with the type of `x`.
    pub fn slice_expr(&self, x: Expr, low: Expr) -> Expr {
        let id = self.next();
        if let Some(ty) = self.value_type(&x) {
            self.record(id, TypeAndValue::value(Mode::Value, ty));
        }
        Expr::Slice(SliceExpr {
            id,
            x: Box::new(x),
            low: Some(Box::new(low)),
            high: None,
            max: None,
        })
    }

    /// Composite literal `T{elts...}`.
    pub fn composite(&self, ty: Expr, elts: Vec<Expr>) -> Expr {
        let id = self.next();
        if let Some(tv) = self.type_of(&ty) {
            self.record(id, TypeAndValue::value(Mode::Value, tv.ty));
        }
        Expr::Composite(CompositeLit {
            id,
            ty: Some(Box::new(ty)),
            elts,
        })
    }

    // Statements

    /// Expression statement.
    pub fn expr_stmt(&self, x: Expr) -> Stmt {
        Stmt::Expr(ExprStmt { id: self.next(), x })
    }

    /// `_ = x`.
    pub fn blank(&self, x: Expr) -> Stmt {
        let lhs = Expr::Ident(self.ident("_"));
        self.assign(lhs, x)
    }

    /// `lhs = rhs`.
    pub fn assign(&self, lhs: Expr, rhs: Expr) -> Stmt {
        Stmt::Assign(AssignStmt {
            id: self.next(),
            lhs: vec![lhs],
            op: AssignOp::Assign,
            rhs: vec![rhs],
        })
    }

    /// `name := rhs`.
    pub fn define(&self, name: &str, rhs: Expr) -> Stmt {
        let lhs = Expr::Ident(self.ident(name));
        Stmt::Assign(AssignStmt {
            id: self.next(),
            lhs: vec![lhs],
            op: AssignOp::Define,
            rhs: vec![rhs],
        })
    }

    /// `return results...`.
    pub fn ret(&self, results: Vec<Expr>) -> Stmt {
        Stmt::Return(ReturnStmt {
            id: self.next(),
            results,
        })
    }

    /// `{ stmts... }`.
    pub fn block(&self, stmts: Vec<Stmt>) -> BlockStmt {
        BlockStmt {
            id: self.next(),
            stmts,
        }
    }

    /// `if cond { body... }`.
    pub fn if_stmt(&self, cond: Expr, body: Vec<Stmt>) -> Stmt {
        let body = self.block(body);
        Stmt::If(IfStmt {
            id: self.next(),
            init: None,
            cond,
            body,
            els: None,
        })
    }

    /// `for cond { body... }`.
    pub fn for_stmt(&self, cond: Expr, body: Vec<Stmt>) -> Stmt {
        let body = self.block(body);
        Stmt::For(ForStmt {
            id: self.next(),
            init: None,
            cond: Some(cond),
            post: None,
            body,
        })
    }

    /// `for range x { body... }`.
    pub fn range_stmt(&self, x: Expr, body: Vec<Stmt>) -> Stmt {
        let body = self.block(body);
        Stmt::Range(RangeStmt {
            id: self.next(),
            key: None,
            value: None,
            define: false,
            x,
            body,
        })
    }

    /// `defer call`.
    pub fn defer_stmt(&self, call: Expr) -> Stmt {
        Stmt::Defer(DeferStmt {
            id: self.next(),
            call,
        })
    }

    /// `switch tag { case list...: body... }`; an empty list is `default`.
    pub fn switch_stmt(&self, tag: Option<Expr>, clauses: Vec<(Vec<Expr>, Vec<Stmt>)>) -> Stmt {
        let body = clauses
            .into_iter()
            .map(|(list, body)| CaseClause {
                id: self.next(),
                list,
                body,
            })
            .collect();
        Stmt::Switch(SwitchStmt {
            id: self.next(),
            init: None,
            tag,
            body,
        })
    }

    // Declarations

    /// `func name() { body... }`.
    pub fn func_decl(&self, name: &str, body: Vec<Stmt>) -> Decl {
        let name = self.ident(name);
        let ty = FuncType {
            id: self.next(),
            params: Vec::new(),
            results: Vec::new(),
        };
        let body = self.block(body);
        Decl::Func(FuncDecl {
            id: self.next(),
            recv: None,
            name,
            ty,
            body: Some(body),
        })
    }

    /// `var name = value`.
    pub fn var_decl(&self, name: &str, value: Expr) -> Decl {
        let names = vec![self.ident(name)];
        let spec = Spec::Value(ValueSpec {
            id: self.next(),
            names,
            ty: None,
            values: vec![value],
        });
        Decl::Gen(GenDecl {
            id: self.next(),
            keyword: DeclKeyword::Var,
            specs: vec![spec],
            grouped: false,
        })
    }

    /// Lays `decls` out as `package p` and returns the checked file.
    pub fn finish(&self, path: impl Into<PathBuf>, decls: Vec<Decl>) -> SourceUnit {
        let file = File {
            id: self.next(),
            package: self.ident("p"),
            decls,
        };
        let (text, positions) = printer::layout(&file);
        SourceUnit {
            path: path.into(),
            source: Arc::from(text),
            file,
            info: self.info(),
            positions,
        }
    }
}

/// Front end serving prepared files per configuration.
///
/// Configurations without prepared files load nothing.
#[derive(Debug, Default)]
pub struct FixtureFrontEnd {
    units: BTreeMap<BuildConfig, Vec<SourceUnit>>,
    failures: BTreeMap<BuildConfig, String>,
    imports: Vec<String>,
}

impl FixtureFrontEnd {
    /// Front end with no files.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style method to serve `units` under `config`.
    #[must_use]
    pub fn with_units(mut self, config: BuildConfig, units: Vec<SourceUnit>) -> Self {
        self.units.entry(config).or_default().extend(units);
        self
    }

    /// Builder-style method to fail type checking under `config`.
    #[must_use]
    pub fn with_failure(mut self, config: BuildConfig, message: &str) -> Self {
        self.failures.insert(config, message.to_owned());
        self
    }

    /// Builder-style method to request `path` from the importer on every load.
    #[must_use]
    pub fn with_import(mut self, path: &str) -> Self {
        self.imports.push(path.to_owned());
        self
    }
}

impl FrontEnd for FixtureFrontEnd {
    fn load(
        &self,
        config: &BuildConfig,
        importer: &dyn Importer,
    ) -> Result<Vec<SourceUnit>, FrontEndError> {
        for path in &self.imports {
            importer.import(path)?;
        }
        if let Some(message) = self.failures.get(config) {
            return Err(FrontEndError::TypeCheck {
                package: "p".to_owned(),
                message: message.clone(),
            });
        }
        Ok(self.units.get(config).cloned().unwrap_or_default())
    }
}
