//! Typed access to the UI annotations understood by the editors.

use serde::de::DeserializeOwned;
use serde::Deserialize;

use veditor_ast::{Annotations, Field};

pub const UI_MODULE: &str = "common.ui";
pub const DB_MODULE: &str = "common.db";

/// The payload of the annotation `module.name`, if present and well formed.
pub fn get_annotation<T: DeserializeOwned>(
    annotations: &Annotations,
    module: &str,
    name: &str,
) -> Option<T> {
    let ann = annotations.iter().find(|a| a.key.is(module, name))?;
    match serde_json::from_value(ann.value.clone()) {
        Ok(v) => Some(v),
        Err(e) => {
            log::warn!("ignoring malformed {}.{} annotation: {}", module, name, e);
            None
        }
    }
}

/// `common.ui.ValidRegex`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ValidRegex {
    pub regex: String,
    pub description: String,
    #[serde(rename = "returnGroup", default)]
    pub return_group: usize,
}

/// `common.ui.ValidValues`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ValidValues {
    pub values: Vec<String>,
    pub description: String,
}

/// `common.db.DbTable`, as far as key fields care.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DbTable {
    #[serde(default)]
    pub table_name: Option<String>,
    #[serde(default)]
    pub id_prefix: Option<String>,
}

pub fn form_label(field: &Field) -> Option<String> {
    get_annotation(&field.annotations, UI_MODULE, "FormLabel")
}

pub fn valid_regex(annotations: &Annotations) -> Option<ValidRegex> {
    get_annotation(annotations, UI_MODULE, "ValidRegex")
}

pub fn valid_values(annotations: &Annotations) -> Option<ValidValues> {
    get_annotation(annotations, UI_MODULE, "ValidValues")
}

pub fn db_table(annotations: &Annotations) -> Option<DbTable> {
    get_annotation(annotations, DB_MODULE, "DbTable")
}

/// The label shown for a field: its `FormLabel` annotation, else its name
/// split into words (`firstName` and `first_name` both give "First name").
pub fn field_label(field: &Field) -> String {
    form_label(field).unwrap_or_else(|| label_from_name(&field.name))
}

pub fn label_from_name(name: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;
    for c in name.chars() {
        if c == '_' || c == '-' || c.is_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = c.is_lowercase() || c.is_ascii_digit();
        current.extend(c.to_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }
    let joined = words.join(" ");
    let mut chars = joined.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `MyTable` → `my_table`
pub fn snake_case(name: &str) -> String {
    label_from_name(name).to_lowercase().replace(' ', "_")
}
