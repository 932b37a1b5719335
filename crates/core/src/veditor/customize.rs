//! Ready-made customizations for common annotated types.
//!
//! Each function here fits one of the [`Factory`] chains. [`ui_factory`]
//! registers the usual set.

use serde_json::Value;
use std::rc::Rc;

use veditor_ast::{DeclType, ScopedDecl, TypeExpr};

use super::factory::{CustomContext, Factory, Renderer};
use crate::annotations::{db_table, snake_case, valid_regex, valid_values};
use crate::fields::{
    enum_field, labelled_values_field, regex_string_field, with_datalist, FieldFns,
    LabelledValue, UFieldFns,
};

pub const STRINGS_MODULE: &str = "common.strings";

/// A factory with [`regex_fields`], [`valid_values_fields`],
/// [`db_key_fields`] and [`password_fields`] registered.
pub fn ui_factory<R: 'static>(renderer: Rc<dyn Renderer<R>>) -> Factory<R> {
    let mut factory = Factory::new(renderer);
    factory.add_custom_field(regex_fields);
    factory.add_custom_field(valid_values_fields);
    factory.add_custom_field(db_key_fields);
    factory.add_custom_field(password_fields);
    factory
}

/// The declaration `type_expr` refers to, when it is an alias of `String`.
fn string_alias(ctx: &CustomContext) -> Option<Rc<ScopedDecl>> {
    let name = ctx.type_expr.scoped_name()?;
    let scoped_decl = ctx.resolver.resolve(name)?;
    match &scoped_decl.decl.type_ {
        DeclType::Type(t) if t.type_expr == TypeExpr::string() => Some(scoped_decl),
        _ => None,
    }
}

/// For aliases of `String` annotated with `common.ui.ValidRegex`: a text
/// field restricted to the regex.
pub fn regex_fields(ctx: &CustomContext) -> Option<UFieldFns> {
    let scoped_decl = string_alias(ctx)?;
    let ann = valid_regex(&scoped_decl.decl.annotations)?;
    match regex_string_field(&ann.regex, &ann.description, ann.return_group) {
        Ok(fns) => Some(fns),
        Err(e) => {
            log::warn!("ignoring ValidRegex on {}: {}", scoped_decl.scoped_name(), e);
            None
        }
    }
}

/// For aliases of `String` annotated with `common.ui.ValidValues`: a choice
/// from the listed values, offered as a datalist.
pub fn valid_values_fields(ctx: &CustomContext) -> Option<UFieldFns> {
    let scoped_decl = string_alias(ctx)?;
    let ann = valid_values(&scoped_decl.decl.annotations)?;
    let mappings = ann
        .values
        .iter()
        .map(|v| LabelledValue::new(Value::String(v.clone()), v.clone()))
        .collect();
    let fns = labelled_values_field(&ann.description, mappings, |a, b| a == b);
    Some(with_datalist(fns, ann.values))
}

/// Unions whose arms are all `Void`, edited as one labelled choice rather
/// than an arm selector.
pub fn enum_fields(ctx: &CustomContext) -> Option<UFieldFns> {
    let name = ctx.type_expr.scoped_name()?;
    let decl = ctx.resolver.resolve(name)?;
    enum_field(&decl)
}

/// For `common.db.DbKey<T>`: a key with the id prefix of `T`'s table, or
/// any `PREFIX-id` key when the table declares no prefix.
pub fn db_key_fields(ctx: &CustomContext) -> Option<UFieldFns> {
    if !ctx.type_expr.is_reference_to(crate::annotations::DB_MODULE, "DbKey") {
        return None;
    }
    let table = ctx
        .type_expr
        .parameters
        .first()
        .and_then(|t| t.scoped_name())
        .and_then(|name| ctx.resolver.resolve(name));
    if let Some(table) = table {
        let (table_name, id_prefix) = db_table_name_and_prefix(&table);
        if !id_prefix.is_empty() {
            let regex = format!("^{}[A-Za-z0-9]+$", regex::escape(&id_prefix));
            let description = format!("a db key for {}", table_name);
            return regex_string_field(&regex, &description, 0).ok();
        }
    }
    regex_string_field("^[A-Z]+-[A-Za-z0-9]+$", "a db key", 0).ok()
}

/// The table name (annotation, else the snake-cased declaration name less
/// any `_table` suffix) and id prefix of a table declaration.
pub fn db_table_name_and_prefix(scoped_decl: &ScopedDecl) -> (String, String) {
    let ann = db_table(&scoped_decl.decl.annotations).unwrap_or_default();
    let table_name = ann.table_name.unwrap_or_else(|| {
        let name = snake_case(&scoped_decl.decl.name);
        match name.strip_suffix("_table") {
            Some(stripped) => stripped.to_string(),
            None => name,
        }
    });
    (table_name, ann.id_prefix.unwrap_or_default())
}

struct PasswordField;

const MIN_PASSWORD_LEN: usize = 6;

impl FieldFns for PasswordField {
    fn to_text(&self, value: &Value) -> String {
        value.as_str().unwrap_or_default().to_string()
    }

    fn validate(&self, text: &str) -> Option<String> {
        if text.trim().chars().count() < MIN_PASSWORD_LEN {
            Some(format!("must be at least {} characters", MIN_PASSWORD_LEN))
        } else {
            None
        }
    }

    fn from_text(&self, text: &str) -> Value {
        Value::String(text.to_string())
    }
}

/// For `common.strings.Password`.
pub fn password_fields(ctx: &CustomContext) -> Option<UFieldFns> {
    ctx.type_expr
        .is_reference_to(STRINGS_MODULE, "Password")
        .then(|| Rc::new(PasswordField) as UFieldFns)
}
