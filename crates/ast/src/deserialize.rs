//! Deserialization from ADL AST JSON into typed structs.
//!
//! The main entry point is [`from_adl_json`], which takes a
//! `&serde_json::Value` and produces the scoped declarations it contains.

use crate::types::*;
use serde_json::Value;

/// Errors during ADL AST JSON deserialization.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AstError {
    /// A declaration is missing a required member or has a malformed one.
    #[error("{module}.{decl}: {message}")]
    DeclError {
        module: String,
        decl: String,
        message: String,
    },
    /// The document is neither a scoped declaration, a module, nor an array of them.
    #[error("invalid ADL document: {0}")]
    InvalidDocument(String),
    /// A type expression string could not be parsed.
    #[error("invalid type expression '{text}': {message}")]
    TypeExprSyntax { text: String, message: String },
}

/// Deserialize ADL AST JSON into scoped declarations.
///
/// Accepts a single scoped declaration (`{"moduleName", "decl"}`), a module
/// (`{"name", "decls": {...}}`) or an array mixing both.
pub fn from_adl_json(doc: &Value) -> Result<Vec<ScopedDecl>, AstError> {
    let mut decls = Vec::new();
    collect_decls(doc, &mut decls)?;
    Ok(decls)
}

fn collect_decls(doc: &Value, out: &mut Vec<ScopedDecl>) -> Result<(), AstError> {
    match doc {
        Value::Array(items) => {
            for item in items {
                collect_decls(item, out)?;
            }
            Ok(())
        }
        Value::Object(obj) if obj.contains_key("decl") => {
            let module = obj
                .get("moduleName")
                .and_then(|m| m.as_str())
                .ok_or_else(|| {
                    AstError::InvalidDocument("scoped decl missing 'moduleName'".to_string())
                })?;
            let decl = parse_decl(module, &obj["decl"])?;
            out.push(ScopedDecl {
                module_name: module.to_string(),
                decl,
            });
            Ok(())
        }
        Value::Object(obj) if obj.contains_key("decls") => {
            let module = obj.get("name").and_then(|m| m.as_str()).ok_or_else(|| {
                AstError::InvalidDocument("module missing 'name'".to_string())
            })?;
            let decls = obj
                .get("decls")
                .and_then(|d| d.as_object())
                .ok_or_else(|| {
                    AstError::InvalidDocument(format!("module '{}': 'decls' is not an object", module))
                })?;
            for decl in decls.values() {
                out.push(ScopedDecl {
                    module_name: module.to_string(),
                    decl: parse_decl(module, decl)?,
                });
            }
            Ok(())
        }
        other => Err(AstError::InvalidDocument(format!(
            "expected a scoped decl, a module or an array, got {}",
            json_kind(other)
        ))),
    }
}

// ── Parsing helpers ─────────────────────────────────────────────────

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Carries the module/declaration being parsed so errors can name it.
struct Ctx<'a> {
    module: &'a str,
    decl: &'a str,
}

impl Ctx<'_> {
    fn err(&self, message: impl Into<String>) -> AstError {
        AstError::DeclError {
            module: self.module.to_string(),
            decl: self.decl.to_string(),
            message: message.into(),
        }
    }

    fn required_str(&self, obj: &Value, field: &str) -> Result<String, AstError> {
        obj.get(field)
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| self.err(format!("missing '{}' field", field)))
    }
}

fn parse_decl(module: &str, obj: &Value) -> Result<Decl, AstError> {
    let name = obj
        .get("name")
        .and_then(|n| n.as_str())
        .ok_or_else(|| AstError::DeclError {
            module: module.to_string(),
            decl: "?".to_string(),
            message: "missing 'name' field".to_string(),
        })?
        .to_string();
    let ctx = Ctx {
        module,
        decl: &name,
    };

    let version = parse_maybe(obj.get("version")).and_then(|v| v.as_u64());
    let annotations = parse_annotations(&ctx, obj.get("annotations"))?;

    let type_obj = obj
        .get("type_")
        .ok_or_else(|| ctx.err("missing 'type_' field"))?;
    let (kind, body) = parse_union_value(type_obj).ok_or_else(|| ctx.err("malformed 'type_'"))?;

    let type_ = match kind.as_str() {
        "struct_" => DeclType::Struct(Struct {
            type_params: parse_type_params(&ctx, body)?,
            fields: parse_fields(&ctx, body)?,
        }),
        "union_" => DeclType::Union(Union {
            type_params: parse_type_params(&ctx, body)?,
            fields: parse_fields(&ctx, body)?,
        }),
        "type_" => DeclType::Type(TypeDef {
            type_params: parse_type_params(&ctx, body)?,
            type_expr: parse_type_expr(&ctx, body.get("typeExpr"))?,
        }),
        "newtype_" => DeclType::NewType(NewType {
            type_params: parse_type_params(&ctx, body)?,
            type_expr: parse_type_expr(&ctx, body.get("typeExpr"))?,
            default: parse_maybe(body.get("default")),
        }),
        other => return Err(ctx.err(format!("unknown declaration kind '{}'", other))),
    };

    Ok(Decl {
        name: name.clone(),
        version,
        type_,
        annotations,
    })
}

/// Splits an ADL union value into its tag and payload.
///
/// Accepts both the TypeScript runtime form (`{"kind": k, "value": v}`) and
/// the canonical JSON form (`{k: v}`, or `"k"` for void arms).
fn parse_union_value(v: &Value) -> Option<(String, &Value)> {
    static NULL: Value = Value::Null;
    match v {
        Value::String(tag) => Some((tag.clone(), &NULL)),
        Value::Object(obj) => {
            if let Some(kind) = obj.get("kind").and_then(|k| k.as_str()) {
                return Some((kind.to_string(), obj.get("value").unwrap_or(&NULL)));
            }
            if obj.len() == 1 {
                let (k, v) = obj.iter().next()?;
                return Some((k.clone(), v));
            }
            None
        }
        _ => None,
    }
}

/// Decodes a `sys.types.Maybe` encoded value.
fn parse_maybe(v: Option<&Value>) -> Option<Value> {
    let (tag, payload) = parse_union_value(v?)?;
    if tag == "just" {
        Some(payload.clone())
    } else {
        None
    }
}

fn parse_type_params(ctx: &Ctx<'_>, body: &Value) -> Result<Vec<String>, AstError> {
    match body.get("typeParams") {
        None => Ok(Vec::new()),
        Some(Value::Array(arr)) => arr
            .iter()
            .map(|p| {
                p.as_str()
                    .map(|s| s.to_string())
                    .ok_or_else(|| ctx.err("type parameter is not a string"))
            })
            .collect(),
        Some(_) => Err(ctx.err("'typeParams' is not an array")),
    }
}

fn parse_fields(ctx: &Ctx<'_>, body: &Value) -> Result<Vec<Field>, AstError> {
    let arr = body
        .get("fields")
        .and_then(|f| f.as_array())
        .ok_or_else(|| ctx.err("missing 'fields' array"))?;
    arr.iter().map(|f| parse_field(ctx, f)).collect()
}

fn parse_field(ctx: &Ctx<'_>, obj: &Value) -> Result<Field, AstError> {
    let name = ctx.required_str(obj, "name")?;
    let serialized_name = obj
        .get("serializedName")
        .and_then(|s| s.as_str())
        .map(|s| s.to_string())
        .unwrap_or_else(|| name.clone());
    let type_expr = parse_type_expr(ctx, obj.get("typeExpr"))?;
    let default = parse_maybe(obj.get("default"));
    let annotations = parse_annotations(ctx, obj.get("annotations"))?;
    Ok(Field {
        name,
        serialized_name,
        type_expr,
        default,
        annotations,
    })
}

fn parse_type_expr(ctx: &Ctx<'_>, v: Option<&Value>) -> Result<TypeExpr, AstError> {
    let obj = v.ok_or_else(|| ctx.err("missing 'typeExpr'"))?;
    let type_ref = obj
        .get("typeRef")
        .and_then(parse_union_value)
        .ok_or_else(|| ctx.err("malformed 'typeRef'"))?;
    let type_ref = match (type_ref.0.as_str(), type_ref.1) {
        ("primitive", Value::String(p)) => TypeRef::Primitive(p.clone()),
        ("typeParam", Value::String(p)) => TypeRef::TypeParam(p.clone()),
        ("reference", sn) => TypeRef::Reference(parse_scoped_name(ctx, sn)?),
        (kind, _) => return Err(ctx.err(format!("unknown type reference kind '{}'", kind))),
    };
    let parameters = match obj.get("parameters") {
        None => Vec::new(),
        Some(Value::Array(arr)) => arr
            .iter()
            .map(|p| parse_type_expr(ctx, Some(p)))
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => return Err(ctx.err("'parameters' is not an array")),
    };
    Ok(TypeExpr {
        type_ref,
        parameters,
    })
}

fn parse_scoped_name(ctx: &Ctx<'_>, v: &Value) -> Result<ScopedName, AstError> {
    Ok(ScopedName {
        module_name: ctx.required_str(v, "moduleName")?,
        name: ctx.required_str(v, "name")?,
    })
}

/// Annotations are a `Map<ScopedName, Json>`, serialized either as
/// `{"key", "value"}` entries or as `{"v1", "v2"}` pairs.
fn parse_annotations(ctx: &Ctx<'_>, v: Option<&Value>) -> Result<Annotations, AstError> {
    let arr = match v {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(arr)) => arr,
        Some(_) => return Err(ctx.err("'annotations' is not an array")),
    };
    arr.iter()
        .map(|entry| {
            let (key, value) = match (entry.get("key"), entry.get("v1")) {
                (Some(k), _) => (k, entry.get("value")),
                (None, Some(k)) => (k, entry.get("v2")),
                (None, None) => return Err(ctx.err("malformed annotation entry")),
            };
            Ok(Annotation {
                key: parse_scoped_name(ctx, key)?,
                value: value.cloned().unwrap_or(Value::Null),
            })
        })
        .collect()
}
