//! Declaration lookup.

use std::collections::HashMap;
use std::rc::Rc;

use crate::deserialize::{from_adl_json, AstError};
use crate::sys_types;
use crate::types::{ScopedDecl, ScopedName};

/// Looks up declarations by scoped name.
///
/// Implementations must be pure lookups over an immutable, pre-loaded set of
/// declarations.
pub trait DeclResolver {
    fn resolve(&self, name: &ScopedName) -> Option<Rc<ScopedDecl>>;
}

/// The standard resolver: a map of every loaded declaration, seeded with the
/// built-in `sys.types` module.
#[derive(Debug, Clone)]
pub struct Resolver {
    decls: HashMap<ScopedName, Rc<ScopedDecl>>,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Resolver {
    /// A resolver holding only the `sys.types` declarations.
    pub fn new() -> Self {
        let mut resolver = Resolver {
            decls: HashMap::new(),
        };
        resolver.extend(sys_types::decls());
        resolver
    }

    /// A resolver holding `sys.types` plus every declaration in the ADL AST JSON document.
    pub fn from_adl_json(doc: &serde_json::Value) -> Result<Self, AstError> {
        let mut resolver = Resolver::new();
        resolver.extend(from_adl_json(doc)?);
        Ok(resolver)
    }

    /// Adds a declaration, replacing any existing one with the same name.
    pub fn add(&mut self, decl: ScopedDecl) {
        self.decls.insert(decl.scoped_name(), Rc::new(decl));
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    /// All declared names, sorted.
    pub fn names(&self) -> Vec<&ScopedName> {
        let mut names: Vec<_> = self.decls.keys().collect();
        names.sort();
        names
    }
}

impl Extend<ScopedDecl> for Resolver {
    fn extend<I: IntoIterator<Item = ScopedDecl>>(&mut self, iter: I) {
        for decl in iter {
            self.add(decl);
        }
    }
}

impl DeclResolver for Resolver {
    fn resolve(&self, name: &ScopedName) -> Option<Rc<ScopedDecl>> {
        self.decls.get(name).cloned()
    }
}
