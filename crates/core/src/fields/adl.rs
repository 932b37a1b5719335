//! Fields for ADL primitives and for the ADL wrappers that can be edited as
//! a single line of text.

use serde_json::{json, Value};
use std::rc::Rc;

use veditor_ast::{DeclResolver, DeclType, ScopedDecl, TypeExpr};

use super::primitive::{
    bool_field, int_field, json_field, labelled_values_field, number_field, string_field,
    LabelledValue,
};
use super::{FieldFns, UFieldFns};
use crate::json::JsonBinding;

/// The field for an ADL primitive type, or `None` when the primitive has no
/// text representation (`Void`, `ByteVector`, the structural primitives...).
pub fn adl_primitive_field_fns(primitive: &str) -> Option<UFieldFns> {
    let fns = match primitive {
        "String" => string_field(),
        "Int8" => int_field(Some(i8::MIN.into()), Some(i8::MAX.into())),
        "Int16" => int_field(Some(i16::MIN.into()), Some(i16::MAX.into())),
        "Int32" => int_field(Some(i32::MIN.into()), Some(i32::MAX.into())),
        "Int64" => int_field(Some(i64::MIN.into()), Some(i64::MAX.into())),
        "Word8" => int_field(Some(0), Some(u8::MAX.into())),
        "Word16" => int_field(Some(0), Some(u16::MAX.into())),
        "Word32" => int_field(Some(0), Some(u32::MAX.into())),
        "Word64" => int_field(Some(0), Some(u64::MAX.into())),
        "Float" | "Double" => number_field(),
        "Bool" => bool_field(),
        "Json" => json_field(),
        _ => return None,
    };
    Some(fns)
}

// ── Optional wrappers ───────────────────────────────────────────────

/// Encoding of the "absent" case for an optional field.
#[derive(Clone, Copy)]
enum Absent {
    /// `sys.types.Maybe`: `"nothing"` or `{"just": v}`
    Maybe,
    /// `Nullable`: `null` or `v`
    Null,
}

struct OptionalField {
    inner: UFieldFns,
    absent: Absent,
}

impl OptionalField {
    fn present<'a>(&self, value: &'a Value) -> Option<&'a Value> {
        match self.absent {
            Absent::Maybe => value.get("just"),
            Absent::Null => (!value.is_null()).then_some(value),
        }
    }
}

impl FieldFns for OptionalField {
    fn to_text(&self, value: &Value) -> String {
        match self.present(value) {
            Some(v) => self.inner.to_text(v),
            None => String::new(),
        }
    }

    fn validate(&self, text: &str) -> Option<String> {
        if text.is_empty() {
            None
        } else {
            self.inner.validate(text)
        }
    }

    fn from_text(&self, text: &str) -> Value {
        match (self.absent, text.is_empty()) {
            (Absent::Maybe, true) => json!("nothing"),
            (Absent::Maybe, false) => json!({ "just": self.inner.from_text(text) }),
            (Absent::Null, true) => Value::Null,
            (Absent::Null, false) => self.inner.from_text(text),
        }
    }

    fn equals(&self, a: &Value, b: &Value) -> bool {
        match (self.present(a), self.present(b)) {
            (None, None) => true,
            (Some(a), Some(b)) => self.inner.equals(a, b),
            _ => false,
        }
    }

    fn datalist(&self) -> Option<&[String]> {
        self.inner.datalist()
    }
}

/// A field for `sys.types.Maybe<T>` where empty text means `nothing`.
pub fn maybe_field(inner: UFieldFns) -> UFieldFns {
    Rc::new(OptionalField {
        inner,
        absent: Absent::Maybe,
    })
}

/// A field for `Nullable<T>` where empty text means `null`.
pub fn nullable_field(inner: UFieldFns) -> UFieldFns {
    Rc::new(OptionalField {
        inner,
        absent: Absent::Null,
    })
}

// ── Enumerations ────────────────────────────────────────────────────

/// True for a union whose every arm is `Void`.
pub fn is_enum(scoped_decl: &ScopedDecl) -> bool {
    match &scoped_decl.decl.type_ {
        DeclType::Union(u) => u
            .fields
            .iter()
            .all(|f| f.type_expr.is_primitive("Void")),
        _ => false,
    }
}

/// A field choosing an arm of an enumeration union by name.
pub fn enum_field(scoped_decl: &ScopedDecl) -> Option<UFieldFns> {
    if !is_enum(scoped_decl) {
        return None;
    }
    let DeclType::Union(u) = &scoped_decl.decl.type_ else {
        return None;
    };
    let mappings = u
        .fields
        .iter()
        .map(|f| LabelledValue::new(Value::String(f.serialized_name.clone()), f.name.clone()))
        .collect();
    Some(labelled_values_field(
        &scoped_decl.decl.name,
        mappings,
        |a, b| a == b,
    ))
}

// ── Whole values as JSON ────────────────────────────────────────────

struct AdlField {
    binding: JsonBinding,
}

impl FieldFns for AdlField {
    fn to_text(&self, value: &Value) -> String {
        let json = self.binding.to_json(value);
        serde_json::to_string_pretty(&json).unwrap_or_else(|_| json.to_string())
    }

    fn validate(&self, text: &str) -> Option<String> {
        match serde_json::from_str::<Value>(text) {
            Ok(json) => self.binding.from_json(&json).err().map(|e| e.to_string()),
            Err(_) => Some("Json is not well formed".to_string()),
        }
    }

    fn from_text(&self, text: &str) -> Value {
        serde_json::from_str::<Value>(text)
            .ok()
            .and_then(|json| self.binding.from_json(&json).ok())
            .unwrap_or(Value::Null)
    }

    fn equals(&self, a: &Value, b: &Value) -> bool {
        self.binding.to_json(a) == self.binding.to_json(b)
    }
}

/// A field editing any ADL value as JSON text, checked against its type.
pub fn adl_field(type_expr: TypeExpr, resolver: Rc<dyn DeclResolver>) -> UFieldFns {
    Rc::new(AdlField {
        binding: JsonBinding::new(type_expr, resolver),
    })
}
