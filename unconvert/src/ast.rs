//! Syntax tree consumed by the detector.
//!
//! The tree is produced by a [`FrontEnd`](crate::frontend::FrontEnd) and is
//! never mutated afterwards. Nodes own their children; every node that can be
//! looked up in a [`TypeInfo`](crate::types::TypeInfo) or a
//! [`Positions`](crate::source::Positions) table carries a [`NodeId`].
//!
//! Traversal goes through a single exhaustive dispatch table,
//! [`NodeRef::for_each_child`], which reports every child together with the
//! [`Slot`] of the parent that holds it. The walker and the parenthesization
//! oracle are both built on it, so adding a node kind is a compile error until
//! the table is updated.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a node within one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A source file.
#[derive(Debug, Clone, PartialEq)]
pub struct File {
    /// Node id of the file itself.
    pub id: NodeId,
    /// Package clause name.
    pub package: Ident,
    /// Top-level declarations in source order.
    pub decls: Vec<Decl>,
}

/// Top-level declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum Decl {
    /// `import`, `const`, `type` or `var` declaration.
    Gen(GenDecl),
    /// Function or method declaration.
    Func(FuncDecl),
}

/// Keyword introducing a [`GenDecl`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKeyword {
    /// `import`
    Import,
    /// `const`
    Const,
    /// `type`
    Type,
    /// `var`
    Var,
}

impl DeclKeyword {
    /// Source spelling of the keyword.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Import => "import",
            Self::Const => "const",
            Self::Type => "type",
            Self::Var => "var",
        }
    }
}

/// Generic declaration, possibly a parenthesized group.
#[derive(Debug, Clone, PartialEq)]
pub struct GenDecl {
    /// Node id.
    pub id: NodeId,
    /// Declaration keyword.
    pub keyword: DeclKeyword,
    /// Specs in source order.
    pub specs: Vec<Spec>,
    /// Whether the specs are written as a `( ... )` group.
    pub grouped: bool,
}

/// One spec inside a [`GenDecl`].
#[derive(Debug, Clone, PartialEq)]
pub enum Spec {
    /// `import name "path"`
    Import(ImportSpec),
    /// `a, b T = x, y`
    Value(ValueSpec),
    /// `type Name T` or `type Name = T`
    Type(TypeSpec),
}

/// Import spec.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportSpec {
    /// Node id.
    pub id: NodeId,
    /// Local package name, if renamed.
    pub name: Option<Ident>,
    /// Import path literal.
    pub path: BasicLit,
}

/// Constant or variable spec.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueSpec {
    /// Node id.
    pub id: NodeId,
    /// Declared names.
    pub names: Vec<Ident>,
    /// Declared type, if any.
    pub ty: Option<Expr>,
    /// Initial values.
    pub values: Vec<Expr>,
}

/// Type spec.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeSpec {
    /// Node id.
    pub id: NodeId,
    /// Declared name.
    pub name: Ident,
    /// `true` for alias declarations (`type A = B`).
    pub alias: bool,
    /// Type expression.
    pub ty: Expr,
}

/// Function declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct FuncDecl {
    /// Node id.
    pub id: NodeId,
    /// Receiver, for methods.
    pub recv: Option<Field>,
    /// Function name.
    pub name: Ident,
    /// Signature.
    pub ty: FuncType,
    /// Body; `None` for external declarations.
    pub body: Option<BlockStmt>,
}

/// Parameter, result, struct field or interface method.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Node id.
    pub id: NodeId,
    /// Field names; empty for anonymous parameters and embedded fields.
    pub names: Vec<Ident>,
    /// Field type.
    pub ty: Expr,
}

/// Statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// Expression statement.
    Expr(ExprStmt),
    /// Assignment or short variable declaration.
    Assign(AssignStmt),
    /// `x++` / `x--`
    IncDec(IncDecStmt),
    /// `return ...`
    Return(ReturnStmt),
    /// `{ ... }`
    Block(BlockStmt),
    /// `if ...`
    If(IfStmt),
    /// `for ...`
    For(ForStmt),
    /// `for k, v := range x { ... }`
    Range(RangeStmt),
    /// `switch init; tag { ... }`
    Switch(SwitchStmt),
    /// `switch init; x := y.(type) { ... }`
    TypeSwitch(TypeSwitchStmt),
    /// `select { ... }`
    Select(SelectStmt),
    /// `go f(x)`
    Go(GoStmt),
    /// `defer f(x)`
    Defer(DeferStmt),
    /// `ch <- v`
    Send(SendStmt),
    /// `label: stmt`
    Labeled(LabeledStmt),
    /// `break`, `continue`, `goto` or `fallthrough`
    Branch(BranchStmt),
    /// Declaration inside a function body.
    Decl(DeclStmt),
}

/// Expression statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ExprStmt {
    /// Node id.
    pub id: NodeId,
    /// The expression.
    pub x: Expr,
}

/// Assignment operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    /// `=`
    Assign,
    /// `:=`
    Define,
    /// `op=`
    Op(BinaryOp),
}

impl fmt::Display for AssignOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Assign => f.write_str("="),
            Self::Define => f.write_str(":="),
            Self::Op(op) => write!(f, "{}=", op.as_str()),
        }
    }
}

/// Assignment statement.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignStmt {
    /// Node id.
    pub id: NodeId,
    /// Left-hand side.
    pub lhs: Vec<Expr>,
    /// Operator.
    pub op: AssignOp,
    /// Right-hand side.
    pub rhs: Vec<Expr>,
}

/// Increment or decrement statement.
#[derive(Debug, Clone, PartialEq)]
pub struct IncDecStmt {
    /// Node id.
    pub id: NodeId,
    /// Operand.
    pub x: Expr,
    /// `true` for `++`.
    pub inc: bool,
}

/// Return statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    /// Node id.
    pub id: NodeId,
    /// Returned values.
    pub results: Vec<Expr>,
}

/// Block statement.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockStmt {
    /// Node id.
    pub id: NodeId,
    /// Statements.
    pub stmts: Vec<Stmt>,
}

/// If statement.
#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    /// Node id.
    pub id: NodeId,
    /// Optional init statement.
    pub init: Option<Box<Stmt>>,
    /// Condition.
    pub cond: Expr,
    /// Then branch.
    pub body: BlockStmt,
    /// Else branch: a block or another if statement.
    pub els: Option<Box<Stmt>>,
}

/// For statement (three-clause or condition-only form).
#[derive(Debug, Clone, PartialEq)]
pub struct ForStmt {
    /// Node id.
    pub id: NodeId,
    /// Init statement.
    pub init: Option<Box<Stmt>>,
    /// Condition.
    pub cond: Option<Expr>,
    /// Post statement.
    pub post: Option<Box<Stmt>>,
    /// Loop body.
    pub body: BlockStmt,
}

/// Range clause loop.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeStmt {
    /// Node id.
    pub id: NodeId,
    /// Key variable or expression.
    pub key: Option<Expr>,
    /// Value variable or expression.
    pub value: Option<Expr>,
    /// `:=` rather than `=`.
    pub define: bool,
    /// Ranged-over expression.
    pub x: Expr,
    /// Loop body.
    pub body: BlockStmt,
}

/// Expression switch.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchStmt {
    /// Node id.
    pub id: NodeId,
    /// Init statement.
    pub init: Option<Box<Stmt>>,
    /// Tag expression; `None` switches on `true`.
    pub tag: Option<Expr>,
    /// Case clauses.
    pub body: Vec<CaseClause>,
}

/// Type switch.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeSwitchStmt {
    /// Node id.
    pub id: NodeId,
    /// Init statement.
    pub init: Option<Box<Stmt>>,
    /// `x := y.(type)` or `y.(type)`.
    pub assign: Box<Stmt>,
    /// Case clauses listing types.
    pub body: Vec<CaseClause>,
}

/// `case a, b:` or `default:` with its statements.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseClause {
    /// Node id.
    pub id: NodeId,
    /// Case expressions or types; empty for `default`.
    pub list: Vec<Expr>,
    /// Statements of the clause.
    pub body: Vec<Stmt>,
}

/// Select statement.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectStmt {
    /// Node id.
    pub id: NodeId,
    /// Communication clauses.
    pub body: Vec<CommClause>,
}

/// `case v := <-ch:`, `case ch <- v:` or `default:` of a select.
#[derive(Debug, Clone, PartialEq)]
pub struct CommClause {
    /// Node id.
    pub id: NodeId,
    /// Send or receive statement; `None` for `default`.
    pub comm: Option<Box<Stmt>>,
    /// Statements of the clause.
    pub body: Vec<Stmt>,
}

/// `go` statement.
#[derive(Debug, Clone, PartialEq)]
pub struct GoStmt {
    /// Node id.
    pub id: NodeId,
    /// The call.
    pub call: Expr,
}

/// `defer` statement.
#[derive(Debug, Clone, PartialEq)]
pub struct DeferStmt {
    /// Node id.
    pub id: NodeId,
    /// The call.
    pub call: Expr,
}

/// Send statement.
#[derive(Debug, Clone, PartialEq)]
pub struct SendStmt {
    /// Node id.
    pub id: NodeId,
    /// Channel.
    pub chan: Expr,
    /// Sent value.
    pub value: Expr,
}

/// Labeled statement.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledStmt {
    /// Node id.
    pub id: NodeId,
    /// Label.
    pub label: Ident,
    /// Labeled statement.
    pub stmt: Box<Stmt>,
}

/// Branch keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchKind {
    /// `break`
    Break,
    /// `continue`
    Continue,
    /// `goto`
    Goto,
    /// `fallthrough`
    Fallthrough,
}

impl BranchKind {
    /// Source spelling of the keyword.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Break => "break",
            Self::Continue => "continue",
            Self::Goto => "goto",
            Self::Fallthrough => "fallthrough",
        }
    }
}

/// Branch statement.
#[derive(Debug, Clone, PartialEq)]
pub struct BranchStmt {
    /// Node id.
    pub id: NodeId,
    /// Keyword.
    pub kind: BranchKind,
    /// Target label.
    pub label: Option<Ident>,
}

/// Declaration statement.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclStmt {
    /// Node id.
    pub id: NodeId,
    /// The declaration.
    pub decl: GenDecl,
}

/// Expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Identifier.
    Ident(Ident),
    /// Literal of basic type.
    BasicLit(BasicLit),
    /// `T{...}`
    Composite(CompositeLit),
    /// `func(...) {...}`
    FuncLit(FuncLit),
    /// `(x)`
    Paren(ParenExpr),
    /// `x.sel`
    Selector(SelectorExpr),
    /// `x[i]`
    Index(IndexExpr),
    /// `x[lo:hi]` or `x[lo:hi:max]`
    Slice(SliceExpr),
    /// `x.(T)`, or `x.(type)` in a type switch header
    TypeAssert(TypeAssertExpr),
    /// `f(args)` or `T(x)`
    Call(CallExpr),
    /// `*x`, both dereference and pointer type.
    Star(StarExpr),
    /// `op x`
    Unary(UnaryExpr),
    /// `x op y`
    Binary(BinaryExpr),
    /// `key: value` inside a composite literal.
    KeyValue(KeyValueExpr),
    /// `[n]T` or `[]T`
    ArrayType(ArrayType),
    /// `struct{...}`
    StructType(StructType),
    /// `func(...) ...`
    FuncType(FuncType),
    /// `interface{...}`
    InterfaceType(InterfaceType),
    /// `map[K]V`
    MapType(MapType),
    /// `chan T`, `chan<- T` or `<-chan T`
    ChanType(ChanType),
    /// `...T` of a variadic parameter, or `...` as an array length
    Ellipsis(Ellipsis),
}

/// Identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    /// Node id.
    pub id: NodeId,
    /// Spelling.
    pub name: CompactString,
}

/// Kind of a [`BasicLit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LitKind {
    /// Integer literal.
    Int,
    /// Floating-point literal.
    Float,
    /// Imaginary literal.
    Imag,
    /// Rune literal.
    Char,
    /// String literal.
    String,
}

/// Basic literal.
#[derive(Debug, Clone, PartialEq)]
pub struct BasicLit {
    /// Node id.
    pub id: NodeId,
    /// Literal kind.
    pub kind: LitKind,
    /// Literal text as written.
    pub value: CompactString,
}

/// Composite literal.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeLit {
    /// Node id.
    pub id: NodeId,
    /// Literal type; elided inside outer composite literals.
    pub ty: Option<Box<Expr>>,
    /// Elements.
    pub elts: Vec<Expr>,
}

/// Function literal.
#[derive(Debug, Clone, PartialEq)]
pub struct FuncLit {
    /// Node id.
    pub id: NodeId,
    /// Signature.
    pub ty: FuncType,
    /// Body.
    pub body: BlockStmt,
}

/// Parenthesized expression.
#[derive(Debug, Clone, PartialEq)]
pub struct ParenExpr {
    /// Node id.
    pub id: NodeId,
    /// Inner expression.
    pub x: Box<Expr>,
}

/// Selector expression.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorExpr {
    /// Node id.
    pub id: NodeId,
    /// Operand.
    pub x: Box<Expr>,
    /// Selected name.
    pub sel: Ident,
}

/// Index expression.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexExpr {
    /// Node id.
    pub id: NodeId,
    /// Operand.
    pub x: Box<Expr>,
    /// Index.
    pub index: Box<Expr>,
}

/// Slice expression.
#[derive(Debug, Clone, PartialEq)]
pub struct SliceExpr {
    /// Node id.
    pub id: NodeId,
    /// Operand.
    pub x: Box<Expr>,
    /// Low bound.
    pub low: Option<Box<Expr>>,
    /// High bound.
    pub high: Option<Box<Expr>>,
    /// Capacity bound; present only in the three-index form.
    pub max: Option<Box<Expr>>,
}

/// Type assertion.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeAssertExpr {
    /// Node id.
    pub id: NodeId,
    /// Operand.
    pub x: Box<Expr>,
    /// Asserted type; `None` for `.(type)`.
    pub ty: Option<Box<Expr>>,
}

/// Call or conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    /// Node id.
    pub id: NodeId,
    /// Callee, or conversion target type.
    pub fun: Box<Expr>,
    /// Arguments.
    pub args: Vec<Expr>,
    /// `true` when the last argument is spread with `...`.
    pub ellipsis: bool,
}

/// Star expression.
#[derive(Debug, Clone, PartialEq)]
pub struct StarExpr {
    /// Node id.
    pub id: NodeId,
    /// Operand.
    pub x: Box<Expr>,
}

/// Unary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `+`
    Pos,
    /// `-`
    Neg,
    /// `!`
    Not,
    /// `^`
    Xor,
    /// `&`
    Addr,
    /// `<-`
    Recv,
}

impl UnaryOp {
    /// Source spelling of the operator.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pos => "+",
            Self::Neg => "-",
            Self::Not => "!",
            Self::Xor => "^",
            Self::Addr => "&",
            Self::Recv => "<-",
        }
    }
}

/// Unary expression.
#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpr {
    /// Node id.
    pub id: NodeId,
    /// Operator.
    pub op: UnaryOp,
    /// Operand.
    pub x: Box<Expr>,
}

/// Binary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Quo,
    /// `%`
    Rem,
    /// `&`
    And,
    /// `|`
    Or,
    /// `^`
    Xor,
    /// `<<`
    Shl,
    /// `>>`
    Shr,
    /// `&^`
    AndNot,
    /// `&&`
    LAnd,
    /// `||`
    LOr,
    /// `==`
    Eql,
    /// `!=`
    Neq,
    /// `<`
    Lss,
    /// `>`
    Gtr,
    /// `<=`
    Leq,
    /// `>=`
    Geq,
}

impl BinaryOp {
    /// Source spelling of the operator.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Quo => "/",
            Self::Rem => "%",
            Self::And => "&",
            Self::Or => "|",
            Self::Xor => "^",
            Self::Shl => "<<",
            Self::Shr => ">>",
            Self::AndNot => "&^",
            Self::LAnd => "&&",
            Self::LOr => "||",
            Self::Eql => "==",
            Self::Neq => "!=",
            Self::Lss => "<",
            Self::Gtr => ">",
            Self::Leq => "<=",
            Self::Geq => ">=",
        }
    }

    /// Binding strength, from 1 (`||`) to 5 (multiplicative).
    #[must_use]
    pub const fn precedence(self) -> u8 {
        match self {
            Self::LOr => 1,
            Self::LAnd => 2,
            Self::Eql | Self::Neq | Self::Lss | Self::Gtr | Self::Leq | Self::Geq => 3,
            Self::Add | Self::Sub | Self::Or | Self::Xor => 4,
            Self::Mul | Self::Quo | Self::Rem | Self::Shl | Self::Shr | Self::And | Self::AndNot => 5,
        }
    }

    /// `<<` or `>>`.
    #[must_use]
    pub const fn is_shift(self) -> bool {
        matches!(self, Self::Shl | Self::Shr)
    }

    /// Comparison operators, whose result is an untyped boolean.
    #[must_use]
    pub const fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::Eql | Self::Neq | Self::Lss | Self::Gtr | Self::Leq | Self::Geq
        )
    }

    /// `+ - * /`, the operators a backend may fuse on floating-point operands.
    #[must_use]
    pub const fn is_float_arithmetic(self) -> bool {
        matches!(self, Self::Add | Self::Sub | Self::Mul | Self::Quo)
    }
}

/// Binary expression.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    /// Node id.
    pub id: NodeId,
    /// Left operand.
    pub x: Box<Expr>,
    /// Operator.
    pub op: BinaryOp,
    /// Right operand.
    pub y: Box<Expr>,
}

/// Key-value pair in a composite literal.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyValueExpr {
    /// Node id.
    pub id: NodeId,
    /// Key.
    pub key: Box<Expr>,
    /// Value.
    pub value: Box<Expr>,
}

/// Array or slice type.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayType {
    /// Node id.
    pub id: NodeId,
    /// Length; `None` for slices.
    pub len: Option<Box<Expr>>,
    /// Element type.
    pub elem: Box<Expr>,
}

/// Struct type.
#[derive(Debug, Clone, PartialEq)]
pub struct StructType {
    /// Node id.
    pub id: NodeId,
    /// Fields.
    pub fields: Vec<Field>,
}

/// Function type.
#[derive(Debug, Clone, PartialEq)]
pub struct FuncType {
    /// Node id.
    pub id: NodeId,
    /// Parameters.
    pub params: Vec<Field>,
    /// Results.
    pub results: Vec<Field>,
}

/// Interface type.
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceType {
    /// Node id.
    pub id: NodeId,
    /// Methods; each field's type is a [`FuncType`] expression.
    pub methods: Vec<Field>,
}

/// Map type.
#[derive(Debug, Clone, PartialEq)]
pub struct MapType {
    /// Node id.
    pub id: NodeId,
    /// Key type.
    pub key: Box<Expr>,
    /// Value type.
    pub value: Box<Expr>,
}

/// Direction of a channel type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChanDir {
    /// `chan T`
    Both,
    /// `chan<- T`
    Send,
    /// `<-chan T`
    Recv,
}

impl ChanDir {
    /// Source text preceding the element type.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Both => "chan ",
            Self::Send => "chan<- ",
            Self::Recv => "<-chan ",
        }
    }
}

/// Channel type.
#[derive(Debug, Clone, PartialEq)]
pub struct ChanType {
    /// Node id.
    pub id: NodeId,
    /// Direction.
    pub dir: ChanDir,
    /// Element type.
    pub value: Box<Expr>,
}

/// `...T` or a bare `...`.
#[derive(Debug, Clone, PartialEq)]
pub struct Ellipsis {
    /// Node id.
    pub id: NodeId,
    /// Element type.
    pub elt: Option<Box<Expr>>,
}

impl Expr {
    /// Node id of the expression.
    #[must_use]
    pub fn id(&self) -> NodeId {
        match self {
            Self::Ident(e) => e.id,
            Self::BasicLit(e) => e.id,
            Self::Composite(e) => e.id,
            Self::FuncLit(e) => e.id,
            Self::Paren(e) => e.id,
            Self::Selector(e) => e.id,
            Self::Index(e) => e.id,
            Self::Slice(e) => e.id,
            Self::TypeAssert(e) => e.id,
            Self::Call(e) => e.id,
            Self::Star(e) => e.id,
            Self::Unary(e) => e.id,
            Self::Binary(e) => e.id,
            Self::KeyValue(e) => e.id,
            Self::ArrayType(e) => e.id,
            Self::StructType(e) => e.id,
            Self::FuncType(e) => e.id,
            Self::InterfaceType(e) => e.id,
            Self::MapType(e) => e.id,
            Self::ChanType(e) => e.id,
            Self::Ellipsis(e) => e.id,
        }
    }

    /// Strips any number of enclosing parentheses.
    #[must_use]
    pub fn unparen(&self) -> &Expr {
        let mut e = self;
        while let Self::Paren(p) = e {
            e = &p.x;
        }
        e
    }
}

impl Stmt {
    /// Node id of the statement.
    #[must_use]
    pub fn id(&self) -> NodeId {
        match self {
            Self::Expr(s) => s.id,
            Self::Assign(s) => s.id,
            Self::IncDec(s) => s.id,
            Self::Return(s) => s.id,
            Self::Block(s) => s.id,
            Self::If(s) => s.id,
            Self::For(s) => s.id,
            Self::Range(s) => s.id,
            Self::Switch(s) => s.id,
            Self::TypeSwitch(s) => s.id,
            Self::Select(s) => s.id,
            Self::Go(s) => s.id,
            Self::Defer(s) => s.id,
            Self::Send(s) => s.id,
            Self::Labeled(s) => s.id,
            Self::Branch(s) => s.id,
            Self::Decl(s) => s.id,
        }
    }
}

impl Spec {
    /// Node id of the spec.
    #[must_use]
    pub fn id(&self) -> NodeId {
        match self {
            Self::Import(s) => s.id,
            Self::Value(s) => s.id,
            Self::Type(s) => s.id,
        }
    }
}

/// Field (or list slot) of a parent node that holds a child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    /// Field name, e.g. `"Args"`.
    pub field: &'static str,
    /// Index within a list-valued field.
    pub index: Option<usize>,
}

impl Slot {
    const fn one(field: &'static str) -> Self {
        Self { field, index: None }
    }

    const fn at(field: &'static str, index: usize) -> Self {
        Self {
            field,
            index: Some(index),
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(i) => write!(f, "{}[{i}]", self.field),
            None => f.write_str(self.field),
        }
    }
}

/// Borrowed reference to any node that can have children.
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    /// A file.
    File(&'a File),
    /// A top-level declaration.
    Decl(&'a Decl),
    /// A generic declaration (top level or inside a [`DeclStmt`]).
    GenDecl(&'a GenDecl),
    /// A spec.
    Spec(&'a Spec),
    /// A statement.
    Stmt(&'a Stmt),
    /// A block (function bodies and statement branches).
    Block(&'a BlockStmt),
    /// A clause of an expression or type switch.
    CaseClause(&'a CaseClause),
    /// A clause of a select statement.
    CommClause(&'a CommClause),
    /// An expression.
    Expr(&'a Expr),
    /// A field.
    Field(&'a Field),
    /// A function signature.
    FuncType(&'a FuncType),
}

impl<'a> NodeRef<'a> {
    /// Node id of the referenced node.
    #[must_use]
    pub fn id(self) -> NodeId {
        match self {
            Self::File(n) => n.id,
            Self::Decl(Decl::Gen(d)) | Self::GenDecl(d) => d.id,
            Self::Decl(Decl::Func(d)) => d.id,
            Self::Spec(n) => n.id(),
            Self::Stmt(n) => n.id(),
            Self::Block(n) => n.id,
            Self::CaseClause(n) => n.id,
            Self::CommClause(n) => n.id,
            Self::Expr(n) => n.id(),
            Self::Field(n) => n.id,
            Self::FuncType(n) => n.id,
        }
    }

    /// The referenced expression, if this is one.
    #[must_use]
    pub fn as_expr(self) -> Option<&'a Expr> {
        match self {
            Self::Expr(e) => Some(e),
            _ => None,
        }
    }

    /// Calls `f` with every child node and the slot that holds it.
    ///
    /// Identifiers that only name things (declared names, selected names,
    /// field names) are not reported; they can never hold a conversion.
    #[allow(clippy::too_many_lines)]
    pub fn for_each_child(self, f: &mut impl FnMut(Slot, NodeRef<'a>)) {
        fn exprs<'a>(
            field: &'static str,
            list: &'a [Expr],
            f: &mut impl FnMut(Slot, NodeRef<'a>),
        ) {
            for (i, e) in list.iter().enumerate() {
                f(Slot::at(field, i), NodeRef::Expr(e));
            }
        }
        fn stmts<'a>(
            field: &'static str,
            list: &'a [Stmt],
            f: &mut impl FnMut(Slot, NodeRef<'a>),
        ) {
            for (i, s) in list.iter().enumerate() {
                f(Slot::at(field, i), NodeRef::Stmt(s));
            }
        }
        fn opt<'a>(
            field: &'static str,
            e: Option<&'a Expr>,
            f: &mut impl FnMut(Slot, NodeRef<'a>),
        ) {
            if let Some(e) = e {
                f(Slot::one(field), NodeRef::Expr(e));
            }
        }
        fn fields<'a>(
            field: &'static str,
            list: &'a [Field],
            f: &mut impl FnMut(Slot, NodeRef<'a>),
        ) {
            for (i, e) in list.iter().enumerate() {
                f(Slot::at(field, i), NodeRef::Field(e));
            }
        }

        match self {
            Self::File(file) => {
                for (i, d) in file.decls.iter().enumerate() {
                    f(Slot::at("Decls", i), NodeRef::Decl(d));
                }
            }
            Self::Decl(Decl::Gen(d)) | Self::GenDecl(d) => {
                for (i, s) in d.specs.iter().enumerate() {
                    f(Slot::at("Specs", i), NodeRef::Spec(s));
                }
            }
            Self::Decl(Decl::Func(d)) => {
                if let Some(recv) = &d.recv {
                    f(Slot::one("Recv"), NodeRef::Field(recv));
                }
                f(Slot::one("Type"), NodeRef::FuncType(&d.ty));
                if let Some(body) = &d.body {
                    f(Slot::one("Body"), NodeRef::Block(body));
                }
            }
            Self::Spec(Spec::Import(_)) => {}
            Self::Spec(Spec::Value(s)) => {
                if let Some(ty) = &s.ty {
                    f(Slot::one("Type"), NodeRef::Expr(ty));
                }
                exprs("Values", &s.values, f);
            }
            Self::Spec(Spec::Type(s)) => f(Slot::one("Type"), NodeRef::Expr(&s.ty)),
            Self::Block(b) => stmts("List", &b.stmts, f),
            Self::CaseClause(c) => {
                exprs("List", &c.list, f);
                stmts("Body", &c.body, f);
            }
            Self::CommClause(c) => {
                if let Some(comm) = &c.comm {
                    f(Slot::one("Comm"), NodeRef::Stmt(comm));
                }
                stmts("Body", &c.body, f);
            }
            Self::Stmt(stmt) => match stmt {
                Stmt::Expr(s) => f(Slot::one("X"), NodeRef::Expr(&s.x)),
                Stmt::Assign(s) => {
                    exprs("Lhs", &s.lhs, f);
                    exprs("Rhs", &s.rhs, f);
                }
                Stmt::IncDec(s) => f(Slot::one("X"), NodeRef::Expr(&s.x)),
                Stmt::Return(s) => exprs("Results", &s.results, f),
                Stmt::Block(b) => NodeRef::Block(b).for_each_child(f),
                Stmt::If(s) => {
                    if let Some(init) = &s.init {
                        f(Slot::one("Init"), NodeRef::Stmt(init));
                    }
                    f(Slot::one("Cond"), NodeRef::Expr(&s.cond));
                    f(Slot::one("Body"), NodeRef::Block(&s.body));
                    if let Some(els) = &s.els {
                        f(Slot::one("Else"), NodeRef::Stmt(els));
                    }
                }
                Stmt::For(s) => {
                    if let Some(init) = &s.init {
                        f(Slot::one("Init"), NodeRef::Stmt(init));
                    }
                    if let Some(cond) = &s.cond {
                        f(Slot::one("Cond"), NodeRef::Expr(cond));
                    }
                    if let Some(post) = &s.post {
                        f(Slot::one("Post"), NodeRef::Stmt(post));
                    }
                    f(Slot::one("Body"), NodeRef::Block(&s.body));
                }
                Stmt::Range(s) => {
                    opt("Key", s.key.as_ref(), f);
                    opt("Value", s.value.as_ref(), f);
                    f(Slot::one("X"), NodeRef::Expr(&s.x));
                    f(Slot::one("Body"), NodeRef::Block(&s.body));
                }
                Stmt::Switch(s) => {
                    if let Some(init) = &s.init {
                        f(Slot::one("Init"), NodeRef::Stmt(init));
                    }
                    opt("Tag", s.tag.as_ref(), f);
                    for (i, c) in s.body.iter().enumerate() {
                        f(Slot::at("Body", i), NodeRef::CaseClause(c));
                    }
                }
                Stmt::TypeSwitch(s) => {
                    if let Some(init) = &s.init {
                        f(Slot::one("Init"), NodeRef::Stmt(init));
                    }
                    f(Slot::one("Assign"), NodeRef::Stmt(&s.assign));
                    for (i, c) in s.body.iter().enumerate() {
                        f(Slot::at("Body", i), NodeRef::CaseClause(c));
                    }
                }
                Stmt::Select(s) => {
                    for (i, c) in s.body.iter().enumerate() {
                        f(Slot::at("Body", i), NodeRef::CommClause(c));
                    }
                }
                Stmt::Go(s) => f(Slot::one("Call"), NodeRef::Expr(&s.call)),
                Stmt::Defer(s) => f(Slot::one("Call"), NodeRef::Expr(&s.call)),
                Stmt::Send(s) => {
                    f(Slot::one("Chan"), NodeRef::Expr(&s.chan));
                    f(Slot::one("Value"), NodeRef::Expr(&s.value));
                }
                Stmt::Labeled(s) => f(Slot::one("Stmt"), NodeRef::Stmt(&s.stmt)),
                Stmt::Branch(_) => {}
                Stmt::Decl(s) => f(Slot::one("Decl"), NodeRef::GenDecl(&s.decl)),
            },
            Self::Field(field) => f(Slot::one("Type"), NodeRef::Expr(&field.ty)),
            Self::FuncType(ty) => {
                fields("Params", &ty.params, f);
                fields("Results", &ty.results, f);
            }
            Self::Expr(expr) => match expr {
                Expr::Ident(_) | Expr::BasicLit(_) => {}
                Expr::Composite(e) => {
                    if let Some(ty) = &e.ty {
                        f(Slot::one("Type"), NodeRef::Expr(ty));
                    }
                    exprs("Elts", &e.elts, f);
                }
                Expr::FuncLit(e) => {
                    f(Slot::one("Type"), NodeRef::FuncType(&e.ty));
                    f(Slot::one("Body"), NodeRef::Block(&e.body));
                }
                Expr::Paren(e) => f(Slot::one("X"), NodeRef::Expr(&e.x)),
                Expr::Selector(e) => f(Slot::one("X"), NodeRef::Expr(&e.x)),
                Expr::Index(e) => {
                    f(Slot::one("X"), NodeRef::Expr(&e.x));
                    f(Slot::one("Index"), NodeRef::Expr(&e.index));
                }
                Expr::Slice(e) => {
                    f(Slot::one("X"), NodeRef::Expr(&e.x));
                    opt("Low", e.low.as_deref(), f);
                    opt("High", e.high.as_deref(), f);
                    opt("Max", e.max.as_deref(), f);
                }
                Expr::TypeAssert(e) => {
                    f(Slot::one("X"), NodeRef::Expr(&e.x));
                    opt("Type", e.ty.as_deref(), f);
                }
                Expr::Call(e) => {
                    f(Slot::one("Fun"), NodeRef::Expr(&e.fun));
                    exprs("Args", &e.args, f);
                }
                Expr::Star(e) => f(Slot::one("X"), NodeRef::Expr(&e.x)),
                Expr::Unary(e) => f(Slot::one("X"), NodeRef::Expr(&e.x)),
                Expr::Binary(e) => {
                    f(Slot::one("X"), NodeRef::Expr(&e.x));
                    f(Slot::one("Y"), NodeRef::Expr(&e.y));
                }
                Expr::KeyValue(e) => {
                    f(Slot::one("Key"), NodeRef::Expr(&e.key));
                    f(Slot::one("Value"), NodeRef::Expr(&e.value));
                }
                Expr::ArrayType(e) => {
                    if let Some(len) = &e.len {
                        f(Slot::one("Len"), NodeRef::Expr(len));
                    }
                    f(Slot::one("Elt"), NodeRef::Expr(&e.elem));
                }
                Expr::StructType(e) => fields("Fields", &e.fields, f),
                Expr::FuncType(e) => NodeRef::FuncType(e).for_each_child(f),
                Expr::InterfaceType(e) => fields("Methods", &e.methods, f),
                Expr::MapType(e) => {
                    f(Slot::one("Key"), NodeRef::Expr(&e.key));
                    f(Slot::one("Value"), NodeRef::Expr(&e.value));
                }
                Expr::ChanType(e) => f(Slot::one("Value"), NodeRef::Expr(&e.value)),
                Expr::Ellipsis(e) => opt("Elt", e.elt.as_deref(), f),
            },
        }
    }

    /// Finds the expression slot of `self` that holds the node `child`.
    #[must_use]
    pub fn slot_of(self, child: NodeId) -> Option<Slot> {
        let mut found = None;
        self.for_each_child(&mut |slot, node| {
            if found.is_none() && matches!(node, NodeRef::Expr(e) if e.id() == child) {
                found = Some(slot);
            }
        });
        found
    }
}

/// Depth-first pre-order walk.
///
/// `visit` receives each node together with its ancestors, innermost last.
/// The walk stops at the first error.
pub fn walk<'a, E>(
    root: NodeRef<'a>,
    visit: &mut impl FnMut(NodeRef<'a>, &[NodeRef<'a>]) -> Result<(), E>,
) -> Result<(), E> {
    fn go<'a, E>(
        node: NodeRef<'a>,
        ancestors: &mut Vec<NodeRef<'a>>,
        visit: &mut impl FnMut(NodeRef<'a>, &[NodeRef<'a>]) -> Result<(), E>,
    ) -> Result<(), E> {
        visit(node, ancestors.as_slice())?;
        let mut children = Vec::new();
        node.for_each_child(&mut |_, child| children.push(child));
        ancestors.push(node);
        for child in children {
            go(child, ancestors, visit)?;
        }
        ancestors.pop();
        Ok(())
    }

    go(root, &mut Vec::new(), visit)
}
