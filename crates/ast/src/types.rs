//! Typed structs representing the ADL abstract syntax tree.
//!
//! These mirror the `sys.adlast` module of the ADL runtime: scoped names,
//! type expressions, declarations and their fields. Annotation payloads and
//! field defaults stay as `serde_json::Value` because their meaning depends
//! on the consumer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Primitive type names that take a single type argument and are classified
/// structurally rather than as leaf primitives.
pub const PRIMITIVE_VECTOR: &str = "Vector";
pub const PRIMITIVE_STRING_MAP: &str = "StringMap";
pub const PRIMITIVE_NULLABLE: &str = "Nullable";

/// Every primitive name understood by the ADL type system.
pub const PRIMITIVES: &[&str] = &[
    "Void",
    "Bool",
    "Int8",
    "Int16",
    "Int32",
    "Int64",
    "Word8",
    "Word16",
    "Word32",
    "Word64",
    "Float",
    "Double",
    "String",
    "ByteVector",
    "Json",
    PRIMITIVE_VECTOR,
    PRIMITIVE_STRING_MAP,
    PRIMITIVE_NULLABLE,
    "TypeToken",
];

pub fn is_primitive(name: &str) -> bool {
    PRIMITIVES.contains(&name)
}

// ── Names ───────────────────────────────────────────────────────────

/// A declaration name qualified by its module, e.g. `sys.types.Maybe`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScopedName {
    #[serde(rename = "moduleName")]
    pub module_name: String,
    pub name: String,
}

impl ScopedName {
    pub fn new(module_name: impl Into<String>, name: impl Into<String>) -> Self {
        ScopedName {
            module_name: module_name.into(),
            name: name.into(),
        }
    }

    /// True if this name is `module_name.name`.
    pub fn is(&self, module_name: &str, name: &str) -> bool {
        self.module_name == module_name && self.name == name
    }
}

impl fmt::Display for ScopedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.module_name.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}.{}", self.module_name, self.name)
        }
    }
}

// ── Type expressions ────────────────────────────────────────────────

/// The head of a type expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Primitive(String),
    TypeParam(String),
    Reference(ScopedName),
}

/// A type reference applied to zero or more type arguments.
///
/// Equality is structural: two expressions are equal iff their references
/// and arguments are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeExpr {
    pub type_ref: TypeRef,
    pub parameters: Vec<TypeExpr>,
}

impl TypeExpr {
    pub fn primitive(name: &str) -> Self {
        TypeExpr {
            type_ref: TypeRef::Primitive(name.to_string()),
            parameters: Vec::new(),
        }
    }

    pub fn type_param(name: &str) -> Self {
        TypeExpr {
            type_ref: TypeRef::TypeParam(name.to_string()),
            parameters: Vec::new(),
        }
    }

    pub fn reference(name: ScopedName, parameters: Vec<TypeExpr>) -> Self {
        TypeExpr {
            type_ref: TypeRef::Reference(name),
            parameters,
        }
    }

    pub fn string() -> Self {
        TypeExpr::primitive("String")
    }

    pub fn void() -> Self {
        TypeExpr::primitive("Void")
    }

    pub fn vector(element: TypeExpr) -> Self {
        TypeExpr {
            type_ref: TypeRef::Primitive(PRIMITIVE_VECTOR.to_string()),
            parameters: vec![element],
        }
    }

    pub fn string_map(value: TypeExpr) -> Self {
        TypeExpr {
            type_ref: TypeRef::Primitive(PRIMITIVE_STRING_MAP.to_string()),
            parameters: vec![value],
        }
    }

    pub fn nullable(value: TypeExpr) -> Self {
        TypeExpr {
            type_ref: TypeRef::Primitive(PRIMITIVE_NULLABLE.to_string()),
            parameters: vec![value],
        }
    }

    /// The scoped name this expression refers to, if it is a reference.
    pub fn scoped_name(&self) -> Option<&ScopedName> {
        match &self.type_ref {
            TypeRef::Reference(sn) => Some(sn),
            _ => None,
        }
    }

    /// True if this expression is a reference to `module_name.name`.
    pub fn is_reference_to(&self, module_name: &str, name: &str) -> bool {
        self.scoped_name()
            .map(|sn| sn.is(module_name, name))
            .unwrap_or(false)
    }

    /// True if this expression is the given primitive.
    pub fn is_primitive(&self, name: &str) -> bool {
        matches!(&self.type_ref, TypeRef::Primitive(p) if p == name)
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.type_ref {
            TypeRef::Primitive(p) => write!(f, "{}", p)?,
            TypeRef::TypeParam(p) => write!(f, "{}", p)?,
            TypeRef::Reference(sn) => write!(f, "{}", sn)?,
        }
        if !self.parameters.is_empty() {
            write!(f, "<")?;
            for (i, p) in self.parameters.iter().enumerate() {
                if i > 0 {
                    write!(f, ",")?;
                }
                write!(f, "{}", p)?;
            }
            write!(f, ">")?;
        }
        Ok(())
    }
}

// ── Declarations ────────────────────────────────────────────────────

/// A single annotation: the annotation type's name and its JSON payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub key: ScopedName,
    pub value: serde_json::Value,
}

pub type Annotations = Vec<Annotation>;

/// A struct field or a union arm.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    /// The member name used in the JSON serialization.
    pub serialized_name: String,
    pub type_expr: TypeExpr,
    /// Declared default value, in ADL JSON form.
    pub default: Option<serde_json::Value>,
    pub annotations: Annotations,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Struct {
    pub type_params: Vec<String>,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Union {
    pub type_params: Vec<String>,
    pub fields: Vec<Field>,
}

/// A type alias.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDef {
    pub type_params: Vec<String>,
    pub type_expr: TypeExpr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewType {
    pub type_params: Vec<String>,
    pub type_expr: TypeExpr,
    pub default: Option<serde_json::Value>,
}

/// The body of a declaration, dispatched by kind.
#[derive(Debug, Clone, PartialEq)]
pub enum DeclType {
    Struct(Struct),
    Union(Union),
    Type(TypeDef),
    NewType(NewType),
}

impl DeclType {
    pub fn type_params(&self) -> &[String] {
        match self {
            DeclType::Struct(s) => &s.type_params,
            DeclType::Union(u) => &u.type_params,
            DeclType::Type(t) => &t.type_params,
            DeclType::NewType(n) => &n.type_params,
        }
    }

    /// The kind tag used in the ADL AST JSON.
    pub fn kind(&self) -> &'static str {
        match self {
            DeclType::Struct(_) => "struct_",
            DeclType::Union(_) => "union_",
            DeclType::Type(_) => "type_",
            DeclType::NewType(_) => "newtype_",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Decl {
    pub name: String,
    pub version: Option<u64>,
    pub type_: DeclType,
    pub annotations: Annotations,
}

/// A declaration together with the module that declares it.
#[derive(Debug, Clone, PartialEq)]
pub struct ScopedDecl {
    pub module_name: String,
    pub decl: Decl,
}

impl ScopedDecl {
    pub fn scoped_name(&self) -> ScopedName {
        ScopedName::new(self.module_name.clone(), self.decl.name.clone())
    }
}
