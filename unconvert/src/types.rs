//! Type table produced by the front end.
//!
//! [`identical`] implements type identity: named types are identical when they
//! come from the same declaration, unnamed types when they have the same
//! structure. Struct tags take part; the order of interface methods does not.

use crate::ast::{ChanDir, NodeId};
use compact_str::CompactString;
use rustc_hash::FxHashMap;
use std::fmt;

/// Predeclared basic types, including the untyped constant kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum BasicKind {
    Bool,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Uintptr,
    Float32,
    Float64,
    Complex64,
    Complex128,
    String,
    UnsafePointer,
    UntypedBool,
    UntypedInt,
    UntypedRune,
    UntypedFloat,
    UntypedComplex,
    UntypedString,
    UntypedNil,
}

impl BasicKind {
    /// Whether this is one of the untyped constant kinds.
    #[must_use]
    pub const fn is_untyped(self) -> bool {
        matches!(
            self,
            Self::UntypedBool
                | Self::UntypedInt
                | Self::UntypedRune
                | Self::UntypedFloat
                | Self::UntypedComplex
                | Self::UntypedString
                | Self::UntypedNil
        )
    }

    /// Floating-point and complex kinds, typed or not.
    #[must_use]
    pub const fn is_floating(self) -> bool {
        matches!(
            self,
            Self::Float32
                | Self::Float64
                | Self::Complex64
                | Self::Complex128
                | Self::UntypedFloat
                | Self::UntypedComplex
        )
    }

    /// Source spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Uint => "uint",
            Self::Uint8 => "uint8",
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
            Self::Uintptr => "uintptr",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Complex64 => "complex64",
            Self::Complex128 => "complex128",
            Self::String => "string",
            Self::UnsafePointer => "unsafe.Pointer",
            Self::UntypedBool => "untyped bool",
            Self::UntypedInt => "untyped int",
            Self::UntypedRune => "untyped rune",
            Self::UntypedFloat => "untyped float",
            Self::UntypedComplex => "untyped complex",
            Self::UntypedString => "untyped string",
            Self::UntypedNil => "untyped nil",
        }
    }
}

/// A declared (defined) type.
///
/// `id` distinguishes types with the same name declared in different scopes.
/// `basic` records the underlying basic kind, when there is one, so that
/// callers can ask about floating-point-ness without resolving the declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamedType {
    /// Declaration identity.
    pub id: u32,
    /// Declaring package, `None` for the universe scope (`error`).
    pub pkg: Option<CompactString>,
    /// Type name.
    pub name: CompactString,
    /// Underlying basic kind, if the underlying type is basic.
    pub basic: Option<BasicKind>,
}

/// Struct field in a type descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldType {
    /// Field name.
    pub name: CompactString,
    /// Field type.
    pub ty: Type,
    /// Embedded field.
    pub embedded: bool,
    /// Tag string, unquoted.
    pub tag: Option<CompactString>,
}

/// Function signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Signature {
    /// Parameter types.
    pub params: Vec<Type>,
    /// Result types.
    pub results: Vec<Type>,
    /// Whether the last parameter is variadic.
    pub variadic: bool,
}

/// Interface method in a type descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Method {
    /// Method name.
    pub name: CompactString,
    /// Method signature.
    pub sig: Signature,
}

/// Resolved type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    /// Predeclared basic type.
    Basic(BasicKind),
    /// Declared type.
    Named(NamedType),
    /// `*T`
    Pointer(Box<Type>),
    /// `[]T`
    Slice(Box<Type>),
    /// `[n]T`
    Array(u64, Box<Type>),
    /// `map[K]V`
    Map(Box<Type>, Box<Type>),
    /// `chan T`, `chan<- T` or `<-chan T`
    Chan(ChanDir, Box<Type>),
    /// `struct{...}`
    Struct(Vec<FieldType>),
    /// `func(...) ...`
    Func(Signature),
    /// `interface{...}`
    Interface(Vec<Method>),
}

impl Type {
    /// Shorthand for a basic type.
    #[must_use]
    pub const fn basic(kind: BasicKind) -> Self {
        Self::Basic(kind)
    }

    /// Shorthand for a pointer type.
    #[must_use]
    pub fn pointer(elem: Self) -> Self {
        Self::Pointer(Box::new(elem))
    }

    /// Whether the type (or its underlying basic kind) is floating-point or complex.
    #[must_use]
    pub fn is_floating(&self) -> bool {
        match self {
            Self::Basic(kind) => kind.is_floating(),
            Self::Named(named) => named.basic.is_some_and(BasicKind::is_floating),
            _ => false,
        }
    }

    /// Whether the type is an untyped constant kind.
    #[must_use]
    pub fn is_untyped(&self) -> bool {
        matches!(self, Self::Basic(kind) if kind.is_untyped())
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic(kind) => f.write_str(kind.as_str()),
            Self::Named(named) => match &named.pkg {
                Some(pkg) => write!(f, "{pkg}.{}", named.name),
                None => f.write_str(&named.name),
            },
            Self::Pointer(elem) => write!(f, "*{elem}"),
            Self::Slice(elem) => write!(f, "[]{elem}"),
            Self::Array(len, elem) => write!(f, "[{len}]{elem}"),
            Self::Map(key, value) => write!(f, "map[{key}]{value}"),
            Self::Chan(dir, elem) => write!(f, "{}{elem}", dir.prefix()),
            Self::Struct(fields) => {
                f.write_str("struct{")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str("; ")?;
                    }
                    if field.embedded {
                        write!(f, "{}", field.ty)?;
                    } else {
                        write!(f, "{} {}", field.name, field.ty)?;
                    }
                    if let Some(tag) = &field.tag {
                        write!(f, " {tag:?}")?;
                    }
                }
                f.write_str("}")
            }
            Self::Func(sig) => write!(f, "func{}", DisplaySignature(sig)),
            Self::Interface(methods) => {
                f.write_str("interface{")?;
                for (i, m) in methods.iter().enumerate() {
                    if i > 0 {
                        f.write_str("; ")?;
                    }
                    write!(f, "{}{}", m.name, DisplaySignature(&m.sig))?;
                }
                f.write_str("}")
            }
        }
    }
}

struct DisplaySignature<'a>(&'a Signature);

impl fmt::Display for DisplaySignature<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sig = self.0;
        f.write_str("(")?;
        for (i, p) in sig.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            if sig.variadic && i + 1 == sig.params.len() {
                f.write_str("...")?;
            }
            write!(f, "{p}")?;
        }
        f.write_str(")")?;
        match sig.results.as_slice() {
            [] => Ok(()),
            [one] => write!(f, " {one}"),
            many => {
                f.write_str(" (")?;
                for (i, r) in many.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{r}")?;
                }
                f.write_str(")")
            }
        }
    }
}

/// Reports whether `a` and `b` are identical types.
#[must_use]
pub fn identical(a: &Type, b: &Type) -> bool {
    match (a, b) {
        (Type::Basic(x), Type::Basic(y)) => x == y,
        (Type::Named(x), Type::Named(y)) => x.id == y.id,
        (Type::Pointer(x), Type::Pointer(y)) | (Type::Slice(x), Type::Slice(y)) => {
            identical(x, y)
        }
        (Type::Chan(d1, x), Type::Chan(d2, y)) => d1 == d2 && identical(x, y),
        (Type::Array(n, x), Type::Array(m, y)) => n == m && identical(x, y),
        (Type::Map(k1, v1), Type::Map(k2, v2)) => identical(k1, k2) && identical(v1, v2),
        (Type::Struct(xs), Type::Struct(ys)) => {
            xs.len() == ys.len()
                && xs.iter().zip(ys).all(|(x, y)| {
                    x.name == y.name
                        && x.embedded == y.embedded
                        && x.tag == y.tag
                        && identical(&x.ty, &y.ty)
                })
        }
        (Type::Func(x), Type::Func(y)) => identical_signatures(x, y),
        (Type::Interface(xs), Type::Interface(ys)) => {
            if xs.len() != ys.len() {
                return false;
            }
            let mut xs: Vec<&Method> = xs.iter().collect();
            let mut ys: Vec<&Method> = ys.iter().collect();
            xs.sort_by(|a, b| a.name.cmp(&b.name));
            ys.sort_by(|a, b| a.name.cmp(&b.name));
            xs.iter()
                .zip(&ys)
                .all(|(x, y)| x.name == y.name && identical_signatures(&x.sig, &y.sig))
        }
        _ => false,
    }
}

fn identical_signatures(a: &Signature, b: &Signature) -> bool {
    a.variadic == b.variadic
        && identical_lists(&a.params, &b.params)
        && identical_lists(&a.results, &b.results)
}

fn identical_lists(xs: &[Type], ys: &[Type]) -> bool {
    xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| identical(x, y))
}

/// What an expression denotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// The expression denotes a type.
    Type,
    /// A computed value.
    Value,
    /// An addressable variable.
    Variable,
    /// A compile-time constant.
    Constant,
    /// A built-in function.
    Builtin,
}

/// Type entry for an expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeAndValue {
    /// What the expression denotes.
    pub mode: Mode,
    /// Its type.
    pub ty: Type,
}

impl TypeAndValue {
    /// Entry for an expression that denotes the type `ty`.
    #[must_use]
    pub const fn type_expr(ty: Type) -> Self {
        Self { mode: Mode::Type, ty }
    }

    /// Entry for a value of type `ty`.
    #[must_use]
    pub const fn value(mode: Mode, ty: Type) -> Self {
        Self { mode, ty }
    }

    /// Whether the expression denotes a type rather than a value.
    #[must_use]
    pub fn is_type(&self) -> bool {
        self.mode == Mode::Type
    }
}

/// Built-in functions, as far as the untyped-value classifier tells them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    /// `real`
    Real,
    /// `imag`
    Imag,
    /// `complex`
    Complex,
    /// Any other built-in, e.g. `len` or `append`.
    Other,
}

impl Builtin {
    /// Looks up a built-in function by name.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "real" => Self::Real,
            "imag" => Self::Imag,
            "complex" => Self::Complex,
            _ => Self::Other,
        }
    }
}

/// Kind of object an identifier refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    /// The predeclared `nil`.
    Nil,
    /// A named constant.
    Const,
    /// A variable, parameter or field.
    Var,
    /// A type name.
    TypeName,
    /// A function.
    Func,
    /// A built-in function.
    Builtin(Builtin),
    /// An imported package.
    PkgName,
}

/// Object an identifier resolves to.
#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    /// Object name.
    pub name: CompactString,
    /// Object kind.
    pub kind: ObjectKind,
    /// Object type.
    pub ty: Type,
    /// Declared in the universe scope rather than in a package.
    pub universe: bool,
}

impl Object {
    /// The universe `nil`.
    #[must_use]
    pub fn nil() -> Self {
        Self {
            name: "nil".into(),
            kind: ObjectKind::Nil,
            ty: Type::Basic(BasicKind::UntypedNil),
            universe: true,
        }
    }

    /// Whether this is the universe `nil`.
    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.universe && self.kind == ObjectKind::Nil
    }
}

/// Type information for one file under one build configuration.
#[derive(Debug, Clone, Default)]
pub struct TypeInfo {
    /// Types of expressions.
    pub types: FxHashMap<NodeId, TypeAndValue>,
    /// Objects referred to by identifiers.
    pub uses: FxHashMap<NodeId, Object>,
}

impl TypeInfo {
    /// Type entry of a node.
    #[must_use]
    pub fn type_of(&self, id: NodeId) -> Option<&TypeAndValue> {
        self.types.get(&id)
    }

    /// Object used by an identifier.
    #[must_use]
    pub fn object_of(&self, id: NodeId) -> Option<&Object> {
        self.uses.get(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(id: u32, name: &str, basic: Option<BasicKind>) -> Type {
        Type::Named(NamedType {
            id,
            pkg: Some("testdata".into()),
            name: name.into(),
            basic,
        })
    }

    #[test]
    fn test_named_identity_uses_declaration() {
        let a = named(1, "Local", None);
        let b = named(2, "Local", None);
        assert!(identical(&a, &a.clone()));
        assert!(!identical(&a, &b));
    }

    #[test]
    fn test_named_differs_from_underlying() {
        let counter = named(1, "Counter", Some(BasicKind::Int64));
        assert!(!identical(&counter, &Type::basic(BasicKind::Int64)));
    }

    #[test]
    fn test_structural_identity() {
        let a = Type::pointer(Type::Struct(vec![FieldType {
            name: "id".into(),
            ty: named(3, "ID", Some(BasicKind::String)),
            embedded: false,
            tag: None,
        }]));
        assert!(identical(&a, &a.clone()));
        assert_eq!(a.to_string(), "*struct{id testdata.ID}");
    }

    #[test]
    fn test_struct_tags_take_part_in_identity() {
        let field = |tag: Option<&str>| FieldType {
            name: "X".into(),
            ty: Type::basic(BasicKind::Int),
            embedded: false,
            tag: tag.map(Into::into),
        };
        let tagged = Type::Struct(vec![field(Some("json:\"x\""))]);
        let plain = Type::Struct(vec![field(None)]);
        assert!(!identical(&tagged, &plain));
        assert!(identical(&tagged, &tagged.clone()));
        assert_eq!(tagged.to_string(), r#"struct{X int "json:\"x\""}"#);
    }

    #[test]
    fn test_interface_method_order_is_ignored() {
        let method = |name: &str, result: BasicKind| Method {
            name: name.into(),
            sig: Signature {
                params: Vec::new(),
                results: vec![Type::basic(result)],
                variadic: false,
            },
        };
        let ab = Type::Interface(vec![method("A", BasicKind::Int), method("B", BasicKind::String)]);
        let ba = Type::Interface(vec![method("B", BasicKind::String), method("A", BasicKind::Int)]);
        let other = Type::Interface(vec![method("A", BasicKind::Int), method("B", BasicKind::Bool)]);
        assert!(identical(&ab, &ba));
        assert!(!identical(&ab, &other));
    }

    #[test]
    fn test_channel_direction_is_part_of_identity() {
        let chan = |dir| Type::Chan(dir, Box::new(Type::basic(BasicKind::Int)));
        assert!(identical(&chan(ChanDir::Recv), &chan(ChanDir::Recv)));
        assert!(!identical(&chan(ChanDir::Both), &chan(ChanDir::Recv)));
        assert_eq!(chan(ChanDir::Send).to_string(), "chan<- int");
    }

    #[test]
    fn test_floating() {
        assert!(Type::basic(BasicKind::Complex64).is_floating());
        assert!(named(4, "Celsius", Some(BasicKind::Float64)).is_floating());
        assert!(!Type::pointer(Type::basic(BasicKind::Float64)).is_floating());
    }

    #[test]
    fn test_func_display() {
        let sig = Signature {
            params: vec![Type::basic(BasicKind::Int), Type::Slice(Box::new(Type::basic(BasicKind::String)))],
            results: vec![Type::basic(BasicKind::Bool), Type::basic(BasicKind::Int)],
            variadic: true,
        };
        assert_eq!(Type::Func(sig).to_string(), "func(int, ...[]string) (bool, int)");
    }
}
