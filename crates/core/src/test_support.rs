//! Declarations shared by the unit tests of this crate.

use std::rc::Rc;

use serde_json::{json, Value};
use veditor_ast::{
    Annotation, Decl, DeclResolver, DeclType, Field, NewType, Resolver, ScopedDecl, ScopedName,
    Struct, TypeDef, TypeExpr, Union,
};

pub fn texpr(text: &str) -> TypeExpr {
    text.parse().unwrap()
}

pub fn field(name: &str, type_expr: &str) -> Field {
    Field {
        name: name.to_string(),
        serialized_name: name.to_string(),
        type_expr: texpr(type_expr),
        default: None,
        annotations: Vec::new(),
    }
}

pub fn with_default(mut field: Field, default: Value) -> Field {
    field.default = Some(default);
    field
}

pub fn annotated(mut field: Field, module: &str, name: &str, value: Value) -> Field {
    field.annotations.push(Annotation {
        key: ScopedName::new(module, name),
        value,
    });
    field
}

fn scoped(name: &str, type_: DeclType) -> ScopedDecl {
    ScopedDecl {
        module_name: "examples".to_string(),
        decl: Decl {
            name: name.to_string(),
            version: None,
            type_,
            annotations: Vec::new(),
        },
    }
}

fn params(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

pub fn struct_decl(name: &str, type_params: &[&str], fields: Vec<Field>) -> ScopedDecl {
    scoped(
        name,
        DeclType::Struct(Struct {
            type_params: params(type_params),
            fields,
        }),
    )
}

pub fn union_decl(name: &str, type_params: &[&str], fields: Vec<Field>) -> ScopedDecl {
    scoped(
        name,
        DeclType::Union(Union {
            type_params: params(type_params),
            fields,
        }),
    )
}

pub fn typedef_decl(name: &str, type_expr: &str) -> ScopedDecl {
    scoped(
        name,
        DeclType::Type(TypeDef {
            type_params: Vec::new(),
            type_expr: texpr(type_expr),
        }),
    )
}

pub fn newtype_decl(name: &str, type_expr: &str) -> ScopedDecl {
    scoped(
        name,
        DeclType::NewType(NewType {
            type_params: Vec::new(),
            type_expr: texpr(type_expr),
            default: None,
        }),
    )
}

pub fn examples_resolver() -> Rc<dyn DeclResolver> {
    Rc::new(examples())
}

pub fn examples() -> Resolver {
    let mut code = typedef_decl("Code", "String");
    code.decl.annotations.push(Annotation {
        key: ScopedName::new("common.ui", "ValidRegex"),
        value: json!({"regex": "^\\s*([A-Z]{3})\\s*$", "description": "a 3 letter code", "returnGroup": 1}),
    });

    let mut resolver = Resolver::new();
    resolver.extend(vec![
        struct_decl(
            "Person",
            &[],
            vec![
                field("name", "String"),
                with_default(field("age", "Int32"), json!(18)),
                field("email", "sys.types.Maybe<String>"),
                field("tags", "Vector<String>"),
            ],
        ),
        struct_decl(
            "Tree",
            &[],
            vec![field("value", "Int32"), field("children", "Vector<examples.Tree>")],
        ),
        struct_decl(
            "Wrapper",
            &["T"],
            vec![field("inner", "sys.types.Pair<T,Vector<T>>")],
        ),
        newtype_decl("UserId", "String"),
        typedef_decl("Owner", "examples.UserId"),
        struct_decl(
            "Rect",
            &[],
            vec![field("width", "Double"), field("height", "Double")],
        ),
        union_decl(
            "Shape",
            &[],
            vec![
                field("circle", "Double"),
                field("rect", "examples.Rect"),
                field("empty", "Void"),
            ],
        ),
        union_decl(
            "Colour",
            &[],
            vec![field("red", "Void"), field("green", "Void"), field("blue", "Void")],
        ),
        code,
        struct_decl(
            "Settings",
            &[],
            vec![
                annotated(
                    field("limits", "StringMap<Int32>"),
                    "common.ui",
                    "FormLabel",
                    json!("Rate limits"),
                ),
                field("flags", "sys.types.Map<String,Bool>"),
                field("frame", "Nullable<examples.Rect>"),
                field("nickname", "Nullable<String>"),
                field("count", "Nullable<Int32>"),
                field("blob", "ByteVector"),
            ],
        ),
        struct_decl(
            "Department",
            &[],
            vec![
                field("name", "String"),
                field("staff", "Vector<examples.Person>"),
                field("head", "sys.types.Maybe<examples.Person>"),
                field("shapes", "StringMap<examples.Shape>"),
            ],
        ),
    ]);
    resolver
}
