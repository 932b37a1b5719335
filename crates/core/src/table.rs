//! Table columns for lists of structs.
//!
//! Each struct field with a text representation becomes a column. Fields
//! that need a structured editor (nested structs, vectors...) are skipped.

use serde_json::Value;
use std::collections::HashMap;
use std::rc::Rc;

use veditor_ast::{DeclResolver, Field, ScopedDecl, TypeExpr};

use crate::adl_tree::{AdlTree, AdlTreeDetails, DeclNode, TreeError};
use crate::annotations::field_label;
use crate::fields::{
    adl_primitive_field_fns, enum_field, maybe_field, nullable_field, UFieldFns,
};
use crate::veditor::CustomContext;

/// Longest cell text shown before truncating.
pub const CELL_WIDTH: usize = 40;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    #[error("tables need a struct type, got '{0}'")]
    NotAStruct(String),
    #[error(transparent)]
    Schema(#[from] TreeError),
}

#[derive(Clone)]
pub struct AdlColumn {
    pub field_name: String,
    pub serialized_name: String,
    pub label: String,
    pub default_visible: bool,
    pub fns: UFieldFns,
}

impl std::fmt::Debug for AdlColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdlColumn")
            .field("field_name", &self.field_name)
            .field("label", &self.label)
            .finish()
    }
}

impl AdlColumn {
    /// Text for this column's cell in `row`.
    pub fn cell_text(&self, row: &Value) -> String {
        match row.get(&self.serialized_name) {
            Some(v) => truncate_cell(&self.fns.to_text(v)),
            None => String::new(),
        }
    }
}

/// At most [`CELL_WIDTH`] characters of the first line, with "..." when
/// anything was cut.
pub fn truncate_cell(text: &str) -> String {
    let first_line = text.split('\n').next().unwrap_or_default();
    let shown: String = first_line.chars().take(CELL_WIDTH).collect();
    if shown.len() < text.len() {
        format!("{}...", shown)
    } else {
        shown
    }
}

#[derive(Debug, Clone)]
pub struct AdlTableInfo {
    pub columns: Vec<AdlColumn>,
    by_field: HashMap<String, usize>,
}

impl AdlTableInfo {
    pub fn column(&self, field_name: &str) -> Option<&AdlColumn> {
        self.by_field.get(field_name).map(|&i| &self.columns[i])
    }
}

pub type CustomFieldFn<'a> = &'a dyn Fn(&CustomContext) -> Option<UFieldFns>;

/// Columns for the struct type `type_expr`.
pub fn adl_table_info(
    resolver: Rc<dyn DeclResolver>,
    type_expr: TypeExpr,
    custom_field: Option<CustomFieldFn<'_>>,
) -> Result<AdlTableInfo, TableError> {
    let tree = AdlTree::new(type_expr, resolver);
    let resolved = tree.resolve(true, false);
    match resolved.details()? {
        AdlTreeDetails::Struct(node) => {
            let columns = struct_columns(resolved.resolver(), node, custom_field);
            let by_field = columns
                .iter()
                .enumerate()
                .map(|(i, c)| (c.field_name.clone(), i))
                .collect();
            Ok(AdlTableInfo { columns, by_field })
        }
        _ => Err(TableError::NotAStruct(tree.type_expr().to_string())),
    }
}

/// Columns for `tree` when it is a struct, else none.
pub(crate) fn columns_for(tree: &AdlTree, custom_field: Option<CustomFieldFn<'_>>) -> Vec<AdlColumn> {
    let resolved = tree.resolve(true, false);
    match resolved.details() {
        Ok(AdlTreeDetails::Struct(node)) => struct_columns(resolved.resolver(), node, custom_field),
        _ => Vec::new(),
    }
}

fn struct_columns(
    resolver: &Rc<dyn DeclResolver>,
    node: &DeclNode,
    custom_field: Option<CustomFieldFn<'_>>,
) -> Vec<AdlColumn> {
    node.fields
        .iter()
        .filter_map(|f| {
            let fns = field_fns(
                resolver,
                Some(&node.scoped_decl),
                Some(&f.field),
                &f.tree,
                custom_field,
            )?;
            Some(AdlColumn {
                field_name: f.field.name.clone(),
                serialized_name: f.field.serialized_name.clone(),
                label: field_label(&f.field),
                default_visible: true,
                fns,
            })
        })
        .collect()
}

/// The text field for a value of `tree`, looking through aliases,
/// nullables, `Maybe` and enumerations.
pub fn field_fns(
    resolver: &Rc<dyn DeclResolver>,
    scoped_decl: Option<&Rc<ScopedDecl>>,
    field: Option<&Field>,
    tree: &AdlTree,
    custom_field: Option<CustomFieldFn<'_>>,
) -> Option<UFieldFns> {
    if let Some(custom) = custom_field {
        let ctx = CustomContext {
            resolver: Rc::clone(resolver),
            scoped_decl: scoped_decl.cloned(),
            field: field.cloned(),
            type_expr: tree.type_expr().clone(),
        };
        if let Some(fns) = custom(&ctx) {
            return Some(fns);
        }
    }
    let recurse = |t: &AdlTree| field_fns(resolver, scoped_decl, field, t, custom_field);
    match tree.details().ok()? {
        AdlTreeDetails::TypeDef(alias) | AdlTreeDetails::NewType(alias) => recurse(&alias.tree),
        AdlTreeDetails::Primitive(p) => adl_primitive_field_fns(p),
        AdlTreeDetails::Nullable(inner) => recurse(inner).map(nullable_field),
        AdlTreeDetails::Union(node) if is_maybe(tree) => {
            let just = node.fields.iter().find(|f| f.field.name == "just")?;
            recurse(&just.tree).map(maybe_field)
        }
        AdlTreeDetails::Union(node) => enum_field(&node.scoped_decl),
        _ => None,
    }
}

pub(crate) fn is_maybe(tree: &AdlTree) -> bool {
    tree.type_expr().is_reference_to("sys.types", "Maybe")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::string_field;
    use crate::test_support::*;
    use serde_json::json;

    #[test]
    fn test_person_columns() {
        let info = adl_table_info(examples_resolver(), texpr("examples.Person"), None).unwrap();
        let names: Vec<_> = info.columns.iter().map(|c| c.field_name.as_str()).collect();
        // tags is a vector, so has no column
        assert_eq!(names, vec!["name", "age", "email"]);
        let row = json!({"name": "Ann", "age": 30, "email": {"just": "ann@example.com"}, "tags": []});
        assert_eq!(info.column("age").unwrap().cell_text(&row), "30");
        assert_eq!(
            info.column("email").unwrap().cell_text(&row),
            "ann@example.com"
        );
        assert_eq!(info.column("email").unwrap().label, "Email");
    }

    #[test]
    fn test_custom_field_takes_precedence() {
        let custom = |ctx: &CustomContext| {
            ctx.type_expr.is_primitive("Int32").then(string_field)
        };
        let info = adl_table_info(
            examples_resolver(),
            texpr("examples.Person"),
            Some(&custom),
        )
        .unwrap();
        assert_eq!(info.column("age").unwrap().fns.validate("abc"), None);
    }

    #[test]
    fn test_recursive_struct_columns_stop_at_one_level() {
        let info = adl_table_info(examples_resolver(), texpr("examples.Tree"), None).unwrap();
        let names: Vec<_> = info.columns.iter().map(|c| c.field_name.as_str()).collect();
        assert_eq!(names, vec!["value"]);
        assert!(info.column("children").is_none());
    }

    #[test]
    fn test_not_a_struct() {
        let err = adl_table_info(examples_resolver(), texpr("examples.Shape"), None).unwrap_err();
        assert_eq!(err, TableError::NotAStruct("examples.Shape".to_string()));
    }

    #[test]
    fn test_truncate_cell() {
        assert_eq!(truncate_cell("short"), "short");
        assert_eq!(truncate_cell("two\nlines"), "two...");
        let long = "x".repeat(45);
        assert_eq!(truncate_cell(&long), format!("{}...", "x".repeat(40)));
        assert_eq!(truncate_cell(&"y".repeat(40)), "y".repeat(40));
    }
}
