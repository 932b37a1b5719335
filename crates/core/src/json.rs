//! Checking JSON against an ADL type.
//!
//! Editor values already are canonical ADL JSON, so serialization is the
//! identity. Deserialization checks a JSON document member by member, fills
//! declared struct defaults and normalizes void union arms to their string
//! form. Errors carry a path such as `$.staff[2].name`.

use serde_json::{Map, Value};
use std::rc::Rc;

use veditor_ast::{DeclResolver, TypeExpr};

use crate::adl_tree::{AdlTree, AdlTreeDetails, DeclNode, TreeError};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum JsonBindingError {
    #[error("{path}: expected {expected}")]
    Mismatch { path: String, expected: String },
    #[error("{path}: missing field '{field}'")]
    MissingField { path: String, field: String },
    #[error("{path}: unknown arm '{arm}'")]
    UnknownArm { path: String, arm: String },
    #[error("{path}: {source}")]
    Schema { path: String, source: TreeError },
}

/// Conversion between ADL values and JSON for one type.
pub struct JsonBinding {
    tree: AdlTree,
}

impl JsonBinding {
    pub fn new(type_expr: TypeExpr, resolver: Rc<dyn DeclResolver>) -> Self {
        JsonBinding {
            tree: AdlTree::new(type_expr, resolver),
        }
    }

    pub fn type_expr(&self) -> &TypeExpr {
        self.tree.type_expr()
    }

    pub fn to_json(&self, value: &Value) -> Value {
        value.clone()
    }

    pub fn from_json(&self, json: &Value) -> Result<Value, JsonBindingError> {
        decode(&self.tree, json, "$")
    }
}

fn mismatch(path: &str, expected: impl Into<String>) -> JsonBindingError {
    JsonBindingError::Mismatch {
        path: path.to_string(),
        expected: expected.into(),
    }
}

fn int_bounds(primitive: &str) -> Option<(i128, i128)> {
    let bounds = match primitive {
        "Int8" => (i8::MIN.into(), i8::MAX.into()),
        "Int16" => (i16::MIN.into(), i16::MAX.into()),
        "Int32" => (i32::MIN.into(), i32::MAX.into()),
        "Int64" => (i64::MIN.into(), i64::MAX.into()),
        "Word8" => (0, u8::MAX.into()),
        "Word16" => (0, u16::MAX.into()),
        "Word32" => (0, u32::MAX.into()),
        "Word64" => (0, u64::MAX.into()),
        _ => return None,
    };
    Some(bounds)
}

/// True if the tree is `Void`, looking through aliases.
pub(crate) fn is_void(tree: &AdlTree) -> bool {
    matches!(
        tree.resolve(true, false).details(),
        Ok(AdlTreeDetails::Primitive(p)) if p == "Void"
    )
}

fn decode(tree: &AdlTree, json: &Value, path: &str) -> Result<Value, JsonBindingError> {
    let details = tree.details().map_err(|source| JsonBindingError::Schema {
        path: path.to_string(),
        source,
    })?;
    match details {
        AdlTreeDetails::Primitive(p) => decode_primitive(p, json, path),
        AdlTreeDetails::Vector(element) => {
            let items = json.as_array().ok_or_else(|| mismatch(path, "an array"))?;
            items
                .iter()
                .enumerate()
                .map(|(i, item)| decode(element, item, &format!("{}[{}]", path, i)))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array)
        }
        AdlTreeDetails::StringMap(value) => {
            let obj = json.as_object().ok_or_else(|| mismatch(path, "an object"))?;
            let mut out = Map::new();
            for (k, v) in obj {
                out.insert(k.clone(), decode(value, v, &format!("{}.{}", path, k))?);
            }
            Ok(Value::Object(out))
        }
        AdlTreeDetails::Nullable(inner) => match json {
            Value::Null => Ok(Value::Null),
            other => decode(inner, other, path),
        },
        AdlTreeDetails::Struct(node) => decode_struct(node, json, path),
        AdlTreeDetails::Union(node) => decode_union(node, json, path),
        AdlTreeDetails::NewType(alias) | AdlTreeDetails::TypeDef(alias) => {
            decode(&alias.tree, json, path)
        }
    }
}

fn decode_primitive(primitive: &str, json: &Value, path: &str) -> Result<Value, JsonBindingError> {
    if let Some((min, max)) = int_bounds(primitive) {
        let n = json
            .as_i64()
            .map(i128::from)
            .or_else(|| json.as_u64().map(i128::from))
            .ok_or_else(|| mismatch(path, "an integer"))?;
        if n < min || n > max {
            return Err(mismatch(
                path,
                format!("a {} between {} and {}", primitive, min, max),
            ));
        }
        return Ok(json.clone());
    }
    let ok = match primitive {
        "Void" => json.is_null(),
        "Bool" => json.is_boolean(),
        "Float" | "Double" => json.is_number(),
        "String" | "ByteVector" => json.is_string(),
        _ => true,
    };
    if ok {
        Ok(json.clone())
    } else {
        Err(mismatch(path, format!("a {}", primitive)))
    }
}

fn decode_struct(node: &DeclNode, json: &Value, path: &str) -> Result<Value, JsonBindingError> {
    let obj = json
        .as_object()
        .ok_or_else(|| mismatch(path, format!("a {} object", node.name())))?;
    let mut out = Map::new();
    for f in &node.fields {
        let name = &f.field.serialized_name;
        let field_path = format!("{}.{}", path, name);
        let value = match (obj.get(name), &f.field.default) {
            (Some(v), _) => decode(&f.tree, v, &field_path)?,
            (None, Some(default)) => decode(&f.tree, default, &field_path)?,
            (None, None) => {
                return Err(JsonBindingError::MissingField {
                    path: path.to_string(),
                    field: name.clone(),
                })
            }
        };
        out.insert(name.clone(), value);
    }
    Ok(Value::Object(out))
}

fn decode_union(node: &DeclNode, json: &Value, path: &str) -> Result<Value, JsonBindingError> {
    let (arm, payload) = match json {
        Value::String(arm) => (arm.as_str(), None),
        Value::Object(obj) if obj.len() == 1 => match obj.iter().next() {
            Some((arm, payload)) => (arm.as_str(), Some(payload)),
            None => return Err(mismatch(path, format!("a {} arm", node.name()))),
        },
        _ => return Err(mismatch(path, format!("a {} arm", node.name()))),
    };
    let f = node
        .fields
        .iter()
        .find(|f| f.field.serialized_name == arm)
        .ok_or_else(|| JsonBindingError::UnknownArm {
            path: path.to_string(),
            arm: arm.to_string(),
        })?;
    if is_void(&f.tree) {
        return match payload {
            None | Some(Value::Null) => Ok(Value::String(arm.to_string())),
            Some(_) => Err(mismatch(&format!("{}.{}", path, arm), "null")),
        };
    }
    let payload = payload.ok_or_else(|| mismatch(path, format!("a payload for '{}'", arm)))?;
    let mut out = Map::new();
    out.insert(
        arm.to_string(),
        decode(&f.tree, payload, &format!("{}.{}", path, arm))?,
    );
    Ok(Value::Object(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use serde_json::json;

    fn binding(type_expr: &str) -> JsonBinding {
        JsonBinding::new(texpr(type_expr), examples_resolver())
    }

    #[test]
    fn test_struct_defaults_filled() {
        let v = binding("examples.Person")
            .from_json(&json!({"name": "Ann", "email": "nothing", "tags": []}))
            .unwrap();
        assert_eq!(
            v,
            json!({"name": "Ann", "age": 18, "email": "nothing", "tags": []})
        );
    }

    #[test]
    fn test_error_paths() {
        let b = binding("examples.Department");
        let err = b
            .from_json(&json!({
                "name": "R&D",
                "staff": [
                    {"name": "Ann", "email": "nothing", "tags": []},
                    {"name": 7, "email": "nothing", "tags": []}
                ],
                "head": "nothing",
                "shapes": {}
            }))
            .unwrap_err();
        assert_eq!(err.to_string(), "$.staff[1].name: expected a String");

        let err = b.from_json(&json!({"name": "x"})).unwrap_err();
        assert_eq!(
            err,
            JsonBindingError::MissingField {
                path: "$".to_string(),
                field: "staff".to_string()
            }
        );
    }

    #[test]
    fn test_union_forms() {
        let b = binding("examples.Shape");
        assert_eq!(b.from_json(&json!("empty")).unwrap(), json!("empty"));
        assert_eq!(b.from_json(&json!({"empty": null})).unwrap(), json!("empty"));
        assert_eq!(
            b.from_json(&json!({"circle": 2.0})).unwrap(),
            json!({"circle": 2.0})
        );
        assert!(matches!(
            b.from_json(&json!("hexagon")).unwrap_err(),
            JsonBindingError::UnknownArm { .. }
        ));
        assert!(b.from_json(&json!("circle")).is_err());
    }

    #[test]
    fn test_int_ranges() {
        let b = binding("Vector<Word8>");
        assert!(b.from_json(&json!([0, 255])).is_ok());
        assert_eq!(
            b.from_json(&json!([0, 256])).unwrap_err().to_string(),
            "$[1]: expected a Word8 between 0 and 255"
        );
        assert!(b.from_json(&json!([1.5])).is_err());
    }

    #[test]
    fn test_schema_errors_carry_path() {
        let err = binding("examples.Missing").from_json(&json!({})).unwrap_err();
        assert_eq!(
            err.to_string(),
            "$: unknown declaration 'examples.Missing'"
        );
    }
}
