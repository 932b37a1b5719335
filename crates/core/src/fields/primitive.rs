//! Built-in field functions for scalar values.

use regex::Regex;
use serde_json::{Number, Value};
use std::rc::Rc;

use super::{FieldFns, UFieldFns};

/// Errors constructing a field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("invalid regex '{regex}': {message}")]
    InvalidRegex { regex: String, message: String },
    #[error("regex '{regex}' has no capture group {group}")]
    MissingGroup { regex: String, group: usize },
}

fn json_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ── String ──────────────────────────────────────────────────────────

struct StringField;

impl FieldFns for StringField {
    fn to_text(&self, value: &Value) -> String {
        json_text(value)
    }

    fn validate(&self, _text: &str) -> Option<String> {
        None
    }

    fn from_text(&self, text: &str) -> Value {
        Value::String(text.to_string())
    }
}

pub fn string_field() -> UFieldFns {
    Rc::new(StringField)
}

// ── Regex constrained strings ───────────────────────────────────────

struct RegexStringField {
    regex: Regex,
    description: String,
    return_group: usize,
}

impl FieldFns for RegexStringField {
    fn to_text(&self, value: &Value) -> String {
        json_text(value)
    }

    fn validate(&self, text: &str) -> Option<String> {
        if self.regex.is_match(text) {
            None
        } else {
            Some(format!("must be {}", self.description))
        }
    }

    /// With capture groups in the regex, the value is the selected group
    /// rather than the whole text. This lets a field accept surrounding
    /// whitespace without storing it.
    fn from_text(&self, text: &str) -> Value {
        match self.regex.captures(text) {
            Some(caps) if caps.len() > 1 => caps
                .get(self.return_group)
                .map(|m| Value::String(m.as_str().to_string()))
                .unwrap_or_else(|| Value::String(text.to_string())),
            _ => Value::String(text.to_string()),
        }
    }
}

/// A string field that must match `regex`. Invalid text is reported as
/// "must be {description}".
pub fn regex_string_field(
    regex: &str,
    description: &str,
    return_group: usize,
) -> Result<UFieldFns, FieldError> {
    let compiled = Regex::new(regex).map_err(|e| FieldError::InvalidRegex {
        regex: regex.to_string(),
        message: e.to_string(),
    })?;
    if return_group >= compiled.captures_len() {
        return Err(FieldError::MissingGroup {
            regex: regex.to_string(),
            group: return_group,
        });
    }
    Ok(Rc::new(RegexStringField {
        regex: compiled,
        description: description.to_string(),
        return_group,
    }))
}

pub fn non_empty_string_field() -> Result<UFieldFns, FieldError> {
    regex_string_field("^.+$", "non-empty", 0)
}

/// A decimal number held as a string, so no precision is lost.
pub fn big_decimal_field() -> Result<UFieldFns, FieldError> {
    regex_string_field(
        r"^\s*(-?(?:\d+(?:\.\d+)?|\.\d+))\s*$",
        "a decimal value",
        1,
    )
}

pub fn email_field() -> Result<UFieldFns, FieldError> {
    regex_string_field(
        r"(?i)^\s*([a-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[a-z0-9!#$%&'*+/=?^_`{|}~-]+)*@(?:[a-z0-9](?:[a-z0-9-]*[a-z0-9])?\.)+[a-z0-9](?:[a-z0-9-]*[a-z0-9])?)\s*$",
        "an email address",
        1,
    )
}

// ── Numbers ─────────────────────────────────────────────────────────

struct IntField {
    min: Option<i128>,
    max: Option<i128>,
}

impl FieldFns for IntField {
    fn to_text(&self, value: &Value) -> String {
        json_text(value)
    }

    fn validate(&self, text: &str) -> Option<String> {
        let Ok(v) = text.trim().parse::<i128>() else {
            return Some("must be an integer".to_string());
        };
        match (self.min, self.max) {
            (Some(min), _) if v < min => Some("value too small".to_string()),
            (_, Some(max)) if v > max => Some("value too large".to_string()),
            _ => None,
        }
    }

    fn from_text(&self, text: &str) -> Value {
        match text.trim().parse::<i128>() {
            Ok(v) => int_value(v),
            Err(_) => Value::Null,
        }
    }

    fn equals(&self, a: &Value, b: &Value) -> bool {
        match (a.as_i64(), b.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => a == b,
        }
    }
}

fn int_value(v: i128) -> Value {
    if let Ok(i) = i64::try_from(v) {
        Value::from(i)
    } else if let Ok(u) = u64::try_from(v) {
        Value::from(u)
    } else {
        Number::from_f64(v as f64)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

/// An integer field. A bound of `None` leaves that side unbounded.
pub fn int_field(min: Option<i128>, max: Option<i128>) -> UFieldFns {
    Rc::new(IntField { min, max })
}

struct NumberField;

impl FieldFns for NumberField {
    fn to_text(&self, value: &Value) -> String {
        json_text(value)
    }

    fn validate(&self, text: &str) -> Option<String> {
        match text.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => None,
            _ => Some("must be a number".to_string()),
        }
    }

    fn from_text(&self, text: &str) -> Value {
        let text = text.trim();
        if let Ok(i) = text.parse::<i64>() {
            return Value::from(i);
        }
        if let Ok(u) = text.parse::<u64>() {
            return Value::from(u);
        }
        text.parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }

    fn equals(&self, a: &Value, b: &Value) -> bool {
        match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => a == b,
        }
    }
}

pub fn number_field() -> UFieldFns {
    Rc::new(NumberField)
}

// ── Bool ────────────────────────────────────────────────────────────

struct BoolField;

impl FieldFns for BoolField {
    fn to_text(&self, value: &Value) -> String {
        match value.as_bool() {
            Some(true) => "true".to_string(),
            _ => "false".to_string(),
        }
    }

    /// Any non-empty prefix of "true" or "false", ignoring case.
    fn validate(&self, text: &str) -> Option<String> {
        let lower = text.to_lowercase();
        if !lower.is_empty() && ("true".starts_with(&lower) || "false".starts_with(&lower)) {
            None
        } else {
            Some("Bool must be true or false".to_string())
        }
    }

    fn from_text(&self, text: &str) -> Value {
        let lower = text.to_lowercase();
        Value::Bool(!lower.is_empty() && "true".starts_with(&lower))
    }
}

pub fn bool_field() -> UFieldFns {
    Rc::new(BoolField)
}

// ── Json ────────────────────────────────────────────────────────────

struct JsonField;

impl FieldFns for JsonField {
    fn to_text(&self, value: &Value) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
    }

    fn validate(&self, text: &str) -> Option<String> {
        match serde_json::from_str::<Value>(text) {
            Ok(_) => None,
            Err(_) => Some("Json is not well formed".to_string()),
        }
    }

    fn from_text(&self, text: &str) -> Value {
        serde_json::from_str(text).unwrap_or(Value::Null)
    }
}

pub fn json_field() -> UFieldFns {
    Rc::new(JsonField)
}

// ── Labelled values ─────────────────────────────────────────────────

/// One entry of a finite set of values shown by label.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelledValue {
    pub value: Value,
    pub label: String,
}

impl LabelledValue {
    pub fn new(value: Value, label: impl Into<String>) -> Self {
        LabelledValue {
            value,
            label: label.into(),
        }
    }
}

type ValueEq = Rc<dyn Fn(&Value, &Value) -> bool>;

struct LabelledValuesField {
    type_label: String,
    mappings: Vec<LabelledValue>,
    equals: ValueEq,
}

impl FieldFns for LabelledValuesField {
    /// A value missing from the table is shown as ":" followed by its plain
    /// text, so it can never be mistaken for a label.
    fn to_text(&self, value: &Value) -> String {
        self.mappings
            .iter()
            .find(|m| (self.equals)(&m.value, value))
            .map(|m| m.label.clone())
            .unwrap_or_else(|| format!(":{}", json_text(value)))
    }

    fn validate(&self, text: &str) -> Option<String> {
        if self.mappings.iter().any(|m| m.label == text) {
            None
        } else {
            Some(format!("must be a {}", self.type_label))
        }
    }

    fn from_text(&self, text: &str) -> Value {
        // last mapping wins for duplicated labels
        self.mappings
            .iter()
            .rev()
            .find(|m| m.label == text)
            .map(|m| m.value.clone())
            .unwrap_or(Value::Null)
    }

    fn equals(&self, a: &Value, b: &Value) -> bool {
        (self.equals)(a, b)
    }
}

/// A field choosing from a finite set of values, each shown by its label.
pub fn labelled_values_field(
    type_label: &str,
    mappings: Vec<LabelledValue>,
    equals: impl Fn(&Value, &Value) -> bool + 'static,
) -> UFieldFns {
    Rc::new(LabelledValuesField {
        type_label: type_label.to_string(),
        mappings,
        equals: Rc::new(equals),
    })
}

// ── Datalist ────────────────────────────────────────────────────────

struct WithDatalist {
    inner: UFieldFns,
    datalist: Vec<String>,
}

impl FieldFns for WithDatalist {
    fn to_text(&self, value: &Value) -> String {
        self.inner.to_text(value)
    }

    fn validate(&self, text: &str) -> Option<String> {
        self.inner.validate(text)
    }

    fn from_text(&self, text: &str) -> Value {
        self.inner.from_text(text)
    }

    fn equals(&self, a: &Value, b: &Value) -> bool {
        self.inner.equals(a, b)
    }

    fn datalist(&self) -> Option<&[String]> {
        Some(&self.datalist)
    }
}

/// Attach a list of suggested entries to a field.
pub fn with_datalist(inner: UFieldFns, datalist: Vec<String>) -> UFieldFns {
    Rc::new(WithDatalist { inner, datalist })
}
