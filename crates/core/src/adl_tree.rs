//! A fully resolved tree corresponding to an ADL type expression.
//!
//! Fully resolved means every declaration reference has been looked up and
//! every generic type parameter has been substituted by a concrete type.
//! Each node classifies itself lazily: building a node never touches the
//! resolver, and forcing [`AdlTree::details`] walks exactly one level. This
//! is what lets self-referential declarations (a struct holding a vector of
//! itself) produce a finite tree.

use std::cell::OnceCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use veditor_ast::{
    DeclResolver, DeclType, Field, ScopedDecl, ScopedName, TypeExpr, TypeRef, PRIMITIVE_NULLABLE,
    PRIMITIVE_STRING_MAP, PRIMITIVE_VECTOR,
};

/// Type parameter name to concrete type, scoped to one declaration.
pub type TParamBindings = HashMap<String, TypeExpr>;

/// Schema-shape errors: the schema itself is inconsistent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    #[error("unknown declaration '{0}'")]
    UnknownDecl(ScopedName),
    #[error("unbound type parameter '{0}'")]
    UnboundTypeParam(String),
    #[error("'{type_expr}' expects {expected} type argument(s), got {actual}")]
    TypeArgumentCount {
        type_expr: String,
        expected: usize,
        actual: usize,
    },
}

pub struct AdlTree {
    type_expr: TypeExpr,
    resolver: Rc<dyn DeclResolver>,
    details: OnceCell<Result<AdlTreeDetails, TreeError>>,
}

/// The structural classification of a node.
#[derive(Debug)]
pub enum AdlTreeDetails {
    Primitive(String),
    Vector(Box<AdlTree>),
    StringMap(Box<AdlTree>),
    Nullable(Box<AdlTree>),
    Struct(DeclNode),
    Union(DeclNode),
    NewType(AliasNode),
    TypeDef(AliasNode),
}

impl AdlTreeDetails {
    pub fn kind(&self) -> &'static str {
        match self {
            AdlTreeDetails::Primitive(_) => "primitive",
            AdlTreeDetails::Vector(_) => "vector",
            AdlTreeDetails::StringMap(_) => "stringmap",
            AdlTreeDetails::Nullable(_) => "nullable",
            AdlTreeDetails::Struct(_) => "struct",
            AdlTreeDetails::Union(_) => "union",
            AdlTreeDetails::NewType(_) => "newtype",
            AdlTreeDetails::TypeDef(_) => "typedef",
        }
    }
}

/// A struct or union, with one subtree per field.
#[derive(Debug)]
pub struct DeclNode {
    pub scoped_decl: Rc<ScopedDecl>,
    pub fields: Vec<TreeField>,
}

impl DeclNode {
    pub fn module_name(&self) -> &str {
        &self.scoped_decl.module_name
    }

    pub fn name(&self) -> &str {
        &self.scoped_decl.decl.name
    }
}

/// A newtype or type alias wrapping a single subtree.
#[derive(Debug)]
pub struct AliasNode {
    pub scoped_decl: Rc<ScopedDecl>,
    pub tree: Box<AdlTree>,
}

#[derive(Debug)]
pub struct TreeField {
    pub field: Field,
    pub tree: AdlTree,
}

impl fmt::Debug for AdlTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdlTree")
            .field("type_expr", &self.type_expr.to_string())
            .field("resolved", &self.details.get().is_some())
            .finish()
    }
}

impl AdlTree {
    /// Build the root node for `type_expr`. No declarations are resolved until
    /// [`details`](Self::details) is called.
    pub fn new(type_expr: TypeExpr, resolver: Rc<dyn DeclResolver>) -> Self {
        AdlTree {
            type_expr,
            resolver,
            details: OnceCell::new(),
        }
    }

    /// The parameter-substituted type expression this node represents.
    pub fn type_expr(&self) -> &TypeExpr {
        &self.type_expr
    }

    pub fn resolver(&self) -> &Rc<dyn DeclResolver> {
        &self.resolver
    }

    /// Classify this node. Computed on first call, then returned unchanged.
    pub fn details(&self) -> Result<&AdlTreeDetails, TreeError> {
        self.details
            .get_or_init(|| self.classify())
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Follow type aliases and/or newtypes down to the first node that is
    /// neither (per the flags). Returns `self` if nothing applies.
    pub fn resolve(&self, follow_typedefs: bool, follow_newtypes: bool) -> &AdlTree {
        match self.details() {
            Ok(AdlTreeDetails::TypeDef(alias)) if follow_typedefs => {
                alias.tree.resolve(follow_typedefs, follow_newtypes)
            }
            Ok(AdlTreeDetails::NewType(alias)) if follow_newtypes => {
                alias.tree.resolve(follow_typedefs, follow_newtypes)
            }
            _ => self,
        }
    }

    fn child(&self, type_expr: TypeExpr) -> AdlTree {
        AdlTree::new(type_expr, Rc::clone(&self.resolver))
    }

    fn sole_param(&self) -> Result<&TypeExpr, TreeError> {
        self.type_expr
            .parameters
            .first()
            .ok_or_else(|| TreeError::TypeArgumentCount {
                type_expr: self.type_expr.to_string(),
                expected: 1,
                actual: 0,
            })
    }

    fn classify(&self) -> Result<AdlTreeDetails, TreeError> {
        match &self.type_expr.type_ref {
            TypeRef::Primitive(p) => match p.as_str() {
                PRIMITIVE_VECTOR => Ok(AdlTreeDetails::Vector(Box::new(
                    self.child(self.sole_param()?.clone()),
                ))),
                PRIMITIVE_STRING_MAP => Ok(AdlTreeDetails::StringMap(Box::new(
                    self.child(self.sole_param()?.clone()),
                ))),
                PRIMITIVE_NULLABLE => Ok(AdlTreeDetails::Nullable(Box::new(
                    self.child(self.sole_param()?.clone()),
                ))),
                _ => Ok(AdlTreeDetails::Primitive(p.clone())),
            },
            TypeRef::TypeParam(p) => Err(TreeError::UnboundTypeParam(p.clone())),
            TypeRef::Reference(sn) => {
                let scoped_decl = self
                    .resolver
                    .resolve(sn)
                    .ok_or_else(|| TreeError::UnknownDecl(sn.clone()))?;
                let bindings = self.bindings_for(scoped_decl.decl.type_.type_params())?;
                let details = match &scoped_decl.decl.type_ {
                    DeclType::Struct(s) => AdlTreeDetails::Struct(DeclNode {
                        fields: self.fields(&s.fields, &bindings),
                        scoped_decl: Rc::clone(&scoped_decl),
                    }),
                    DeclType::Union(u) => AdlTreeDetails::Union(DeclNode {
                        fields: self.fields(&u.fields, &bindings),
                        scoped_decl: Rc::clone(&scoped_decl),
                    }),
                    DeclType::Type(t) => AdlTreeDetails::TypeDef(AliasNode {
                        tree: Box::new(self.child(substitute(&t.type_expr, &bindings))),
                        scoped_decl: Rc::clone(&scoped_decl),
                    }),
                    DeclType::NewType(n) => AdlTreeDetails::NewType(AliasNode {
                        tree: Box::new(self.child(substitute(&n.type_expr, &bindings))),
                        scoped_decl: Rc::clone(&scoped_decl),
                    }),
                };
                Ok(details)
            }
        }
    }

    /// Bind the declaration's formal parameters, in declared order, to this
    /// node's arguments. The arguments are already substituted in the
    /// caller's scope, so bindings compose rather than nest.
    fn bindings_for(&self, type_params: &[String]) -> Result<TParamBindings, TreeError> {
        let args = &self.type_expr.parameters;
        if args.len() < type_params.len() {
            return Err(TreeError::TypeArgumentCount {
                type_expr: self.type_expr.to_string(),
                expected: type_params.len(),
                actual: args.len(),
            });
        }
        Ok(type_params
            .iter()
            .cloned()
            .zip(args.iter().cloned())
            .collect())
    }

    fn fields(&self, fields: &[Field], bindings: &TParamBindings) -> Vec<TreeField> {
        fields
            .iter()
            .map(|field| TreeField {
                tree: self.child(substitute(&field.type_expr, bindings)),
                field: field.clone(),
            })
            .collect()
    }
}

/// Replace bound type parameters in `type_expr`. Unbound parameters are left
/// in place and reported when the resulting node is classified.
pub fn substitute(type_expr: &TypeExpr, bindings: &TParamBindings) -> TypeExpr {
    if let TypeRef::TypeParam(p) = &type_expr.type_ref {
        if let Some(bound) = bindings.get(p) {
            return bound.clone();
        }
    }
    TypeExpr {
        type_ref: type_expr.type_ref.clone(),
        parameters: type_expr
            .parameters
            .iter()
            .map(|p| substitute(p, bindings))
            .collect(),
    }
}
