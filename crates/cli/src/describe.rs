//! `veditor describe` -- the resolved structure of an ADL type.
//!
//! The tree is first built as JSON (the `--output json` form) and the
//! text outline is formatted from that, so both outputs agree:
//!
//! ```text
//! demo.Person (struct)
//!   name: String (primitive)
//!   age: Int32 (primitive) = 18
//!   tags: Vector<String> (vector)
//!     element: String (primitive)
//! ```

use serde_json::{json, Map, Value};
use veditor_core::adl_tree::{AdlTree, AdlTreeDetails, DeclNode};

/// Describe `tree`, expanding at most `depth` levels below it.
pub fn describe(tree: &AdlTree, depth: usize) -> Value {
    let mut node = Map::new();
    node.insert("type".to_string(), json!(tree.type_expr().to_string()));

    let details = match tree.details() {
        Ok(details) => details,
        Err(e) => {
            node.insert("kind".to_string(), json!("error"));
            node.insert("error".to_string(), json!(e.to_string()));
            return Value::Object(node);
        }
    };
    node.insert("kind".to_string(), json!(details.kind()));

    if let Some(name) = decl_name(details) {
        node.insert("decl".to_string(), json!(name));
    }
    if matches!(details, AdlTreeDetails::Primitive(_)) {
        return Value::Object(node);
    }
    if depth == 0 {
        node.insert("truncated".to_string(), json!(true));
        return Value::Object(node);
    }

    match details {
        AdlTreeDetails::Primitive(_) => {}
        AdlTreeDetails::Vector(element)
        | AdlTreeDetails::StringMap(element)
        | AdlTreeDetails::Nullable(element) => {
            node.insert("element".to_string(), describe(element, depth - 1));
        }
        AdlTreeDetails::Struct(decl) | AdlTreeDetails::Union(decl) => {
            node.insert("fields".to_string(), describe_fields(decl, depth - 1));
        }
        AdlTreeDetails::NewType(alias) | AdlTreeDetails::TypeDef(alias) => {
            node.insert("target".to_string(), describe(&alias.tree, depth - 1));
        }
    }
    Value::Object(node)
}

fn decl_name(details: &AdlTreeDetails) -> Option<String> {
    match details {
        AdlTreeDetails::Struct(decl) | AdlTreeDetails::Union(decl) => {
            Some(decl.scoped_decl.scoped_name().to_string())
        }
        AdlTreeDetails::NewType(alias) | AdlTreeDetails::TypeDef(alias) => {
            Some(alias.scoped_decl.scoped_name().to_string())
        }
        _ => None,
    }
}

fn describe_fields(decl: &DeclNode, depth: usize) -> Value {
    let fields = decl
        .fields
        .iter()
        .map(|f| {
            let mut field = Map::new();
            field.insert("name".to_string(), json!(f.field.name));
            if f.field.serialized_name != f.field.name {
                field.insert("serializedName".to_string(), json!(f.field.serialized_name));
            }
            field.insert(
                "label".to_string(),
                json!(veditor_core::annotations::field_label(&f.field)),
            );
            if let Some(default) = &f.field.default {
                field.insert("default".to_string(), default.clone());
            }
            field.insert("node".to_string(), describe(&f.tree, depth));
            Value::Object(field)
        })
        .collect();
    Value::Array(fields)
}

/// Format a described tree as an indented outline.
pub fn format_outline(node: &Value) -> String {
    let mut out = String::new();
    write_node(&mut out, node, 0, None, None);
    out
}

fn write_node(
    out: &mut String,
    node: &Value,
    indent: usize,
    label: Option<&str>,
    default: Option<&Value>,
) {
    let type_expr = node.get("type").and_then(Value::as_str).unwrap_or("?");
    let kind = node.get("kind").and_then(Value::as_str).unwrap_or("?");

    out.push_str(&"  ".repeat(indent));
    if let Some(label) = label {
        out.push_str(label);
        out.push_str(": ");
    }
    out.push_str(&format!("{} ({})", type_expr, kind));
    if let Some(error) = node.get("error").and_then(Value::as_str) {
        out.push_str(&format!(": {}", error));
    }
    if let Some(default) = default {
        out.push_str(&format!(" = {}", default));
    }
    if node.get("truncated").and_then(Value::as_bool).unwrap_or(false) {
        out.push_str(" ...");
    }
    out.push('\n');

    if let Some(fields) = node.get("fields").and_then(Value::as_array) {
        for field in fields {
            let name = field.get("name").and_then(Value::as_str).unwrap_or("?");
            if let Some(child) = field.get("node") {
                write_node(out, child, indent + 1, Some(name), field.get("default"));
            }
        }
    }
    if let Some(element) = node.get("element") {
        let label = if kind == "nullable" { "value" } else { "element" };
        write_node(out, element, indent + 1, Some(label), None);
    }
    if let Some(target) = node.get("target") {
        write_node(out, target, indent + 1, None, None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;
    use veditor_ast::{DeclResolver, Resolver};

    fn resolver() -> Rc<dyn DeclResolver> {
        let doc = json!({
            "name": "t",
            "decls": {
                "Pair": {
                    "name": "Pair",
                    "version": "nothing",
                    "annotations": [],
                    "type_": {"struct_": {
                        "typeParams": [],
                        "fields": [
                            {
                                "name": "count",
                                "serializedName": "count",
                                "typeExpr": {"typeRef": {"primitive": "Int32"}, "parameters": []},
                                "default": {"just": 2},
                                "annotations": []
                            },
                            {
                                "name": "next",
                                "serializedName": "next",
                                "typeExpr": {
                                    "typeRef": {"primitive": "Nullable"},
                                    "parameters": [
                                        {"typeRef": {"reference": {"moduleName": "t", "name": "Pair"}}, "parameters": []}
                                    ]
                                },
                                "default": "nothing",
                                "annotations": []
                            }
                        ]
                    }}
                }
            }
        });
        Rc::new(Resolver::from_adl_json(&doc).unwrap())
    }

    fn tree(text: &str) -> AdlTree {
        AdlTree::new(text.parse().unwrap(), resolver())
    }

    #[test]
    fn test_describe_primitive() {
        assert_eq!(
            describe(&tree("String"), 0),
            json!({"type": "String", "kind": "primitive"})
        );
    }

    #[test]
    fn test_depth_limits_recursion() {
        let text = format_outline(&describe(&tree("t.Pair"), 2));
        assert_eq!(
            text,
            "t.Pair (struct)\n\
             \x20 count: Int32 (primitive) = 2\n\
             \x20 next: Nullable<t.Pair> (nullable)\n\
             \x20   value: t.Pair (struct) ...\n"
        );
    }

    #[test]
    fn test_unknown_decl_is_reported_in_place() {
        let node = describe(&tree("t.Missing"), 3);
        assert_eq!(node["kind"], json!("error"));
        assert_eq!(node["error"], json!("unknown declaration 't.Missing'"));
    }
}
