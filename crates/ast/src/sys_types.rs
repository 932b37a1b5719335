//! The built-in `sys.types` module.
//!
//! Editors single out `Maybe` (collapsed to a text field when possible) and
//! `Map` (edited as a list of key/value entries), so these declarations are
//! always available to a [`Resolver`](crate::Resolver).

use crate::types::*;

pub const MODULE: &str = "sys.types";

pub fn sn_maybe() -> ScopedName {
    ScopedName::new(MODULE, "Maybe")
}

pub fn sn_map() -> ScopedName {
    ScopedName::new(MODULE, "Map")
}

pub fn sn_map_entry() -> ScopedName {
    ScopedName::new(MODULE, "MapEntry")
}

pub fn sn_pair() -> ScopedName {
    ScopedName::new(MODULE, "Pair")
}

pub fn texpr_maybe(t: TypeExpr) -> TypeExpr {
    TypeExpr::reference(sn_maybe(), vec![t])
}

pub fn texpr_map(k: TypeExpr, v: TypeExpr) -> TypeExpr {
    TypeExpr::reference(sn_map(), vec![k, v])
}

pub fn texpr_map_entry(k: TypeExpr, v: TypeExpr) -> TypeExpr {
    TypeExpr::reference(sn_map_entry(), vec![k, v])
}

pub fn texpr_pair(a: TypeExpr, b: TypeExpr) -> TypeExpr {
    TypeExpr::reference(sn_pair(), vec![a, b])
}

fn field(name: &str, type_expr: TypeExpr) -> Field {
    Field {
        name: name.to_string(),
        serialized_name: name.to_string(),
        type_expr,
        default: None,
        annotations: Vec::new(),
    }
}

fn params(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

fn decl(name: &str, type_: DeclType) -> ScopedDecl {
    ScopedDecl {
        module_name: MODULE.to_string(),
        decl: Decl {
            name: name.to_string(),
            version: None,
            type_,
            annotations: Vec::new(),
        },
    }
}

/// Every declaration of the `sys.types` module.
pub fn decls() -> Vec<ScopedDecl> {
    let tp = TypeExpr::type_param;
    vec![
        decl(
            "Pair",
            DeclType::Struct(Struct {
                type_params: params(&["T1", "T2"]),
                fields: vec![field("v1", tp("T1")), field("v2", tp("T2"))],
            }),
        ),
        decl(
            "Either",
            DeclType::Union(Union {
                type_params: params(&["T1", "T2"]),
                fields: vec![field("left", tp("T1")), field("right", tp("T2"))],
            }),
        ),
        decl(
            "Maybe",
            DeclType::Union(Union {
                type_params: params(&["T"]),
                fields: vec![field("nothing", TypeExpr::void()), field("just", tp("T"))],
            }),
        ),
        decl(
            "Error",
            DeclType::Union(Union {
                type_params: params(&["T"]),
                fields: vec![field("value", tp("T")), field("error", TypeExpr::string())],
            }),
        ),
        decl(
            "Result",
            DeclType::Union(Union {
                type_params: params(&["T", "E"]),
                fields: vec![field("ok", tp("T")), field("error", tp("E"))],
            }),
        ),
        decl(
            "MapEntry",
            DeclType::Struct(Struct {
                type_params: params(&["K", "V"]),
                fields: vec![field("key", tp("K")), field("value", tp("V"))],
            }),
        ),
        decl(
            "Map",
            DeclType::NewType(NewType {
                type_params: params(&["K", "V"]),
                type_expr: TypeExpr::vector(texpr_pair(tp("K"), tp("V"))),
                default: None,
            }),
        ),
        decl(
            "Set",
            DeclType::NewType(NewType {
                type_params: params(&["T"]),
                type_expr: TypeExpr::vector(tp("T")),
                default: None,
            }),
        ),
    ]
}
