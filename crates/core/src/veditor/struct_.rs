//! Struct editors: one child editor per field.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::rc::Rc;

use veditor_ast::TypeExpr;

use super::factory::{Renderer, StructFieldProps, StructProps};
use super::{
    ignore_event, nested_update, unexpected_state, EditorEvent, EditorState, Invalid,
    StructState, UVEditor, UpdateFn, VEditor, Validated,
};

/// A struct field and its editor.
pub struct VField<R> {
    pub name: String,
    pub serialized_name: String,
    pub label: String,
    /// Declared default, used to seed the initial state.
    pub default: Option<Value>,
    pub veditor: UVEditor<R>,
}

pub struct StructVEditor<R> {
    type_expr: TypeExpr,
    fields: Vec<VField<R>>,
    renderer: Rc<dyn Renderer<R>>,
}

pub fn struct_veditor<R: 'static>(
    type_expr: TypeExpr,
    fields: Vec<VField<R>>,
    renderer: Rc<dyn Renderer<R>>,
) -> UVEditor<R> {
    Rc::new(StructVEditor {
        type_expr,
        fields,
        renderer,
    })
}

impl<R> StructVEditor<R> {
    fn field_initial_state(&self, f: &VField<R>) -> Rc<EditorState> {
        Rc::new(match &f.default {
            Some(default) => f.veditor.state_from_value(default),
            None => f.veditor.initial_state(),
        })
    }

    fn child_state(&self, s: &StructState, f: &VField<R>) -> Rc<EditorState> {
        s.fields
            .get(&f.name)
            .cloned()
            .unwrap_or_else(|| self.field_initial_state(f))
    }
}

impl<R> VEditor<R> for StructVEditor<R> {
    fn initial_state(&self) -> EditorState {
        EditorState::Struct(StructState {
            fields: self
                .fields
                .iter()
                .map(|f| (f.name.clone(), self.field_initial_state(f)))
                .collect(),
        })
    }

    /// Members missing from `value` start from their default or empty state.
    fn state_from_value(&self, value: &Value) -> EditorState {
        let fields: BTreeMap<_, _> = self
            .fields
            .iter()
            .map(|f| {
                let state = match value.get(&f.serialized_name) {
                    Some(v) => Rc::new(f.veditor.state_from_value(v)),
                    None => self.field_initial_state(f),
                };
                (f.name.clone(), state)
            })
            .collect();
        EditorState::Struct(StructState { fields })
    }

    fn validate(&self, state: &EditorState) -> Vec<String> {
        let EditorState::Struct(s) = state else {
            return unexpected_state("struct", state).0;
        };
        self.fields
            .iter()
            .flat_map(|f| {
                f.veditor
                    .validate(&self.child_state(s, f))
                    .into_iter()
                    .map(move |e| format!("{}: {}", f.name, e))
            })
            .collect()
    }

    fn value_from_state(&self, state: &EditorState) -> Validated<Value> {
        let EditorState::Struct(s) = state else {
            return Err(unexpected_state("struct", state));
        };
        let mut out = Map::new();
        let mut errors = Vec::new();
        for f in &self.fields {
            match f.veditor.value_from_state(&self.child_state(s, f)) {
                Ok(v) => {
                    out.insert(f.serialized_name.clone(), v);
                }
                Err(Invalid(errs)) => {
                    errors.extend(errs.into_iter().map(|e| format!("{}: {}", f.name, e)));
                }
            }
        }
        if errors.is_empty() {
            Ok(Value::Object(out))
        } else {
            Err(Invalid(errors))
        }
    }

    /// Only the named field's state is replaced. Every other field keeps
    /// the same `Rc`.
    fn update(&self, state: &EditorState, event: EditorEvent) -> EditorState {
        let (s, field, child_event) = match (state, event) {
            (EditorState::Struct(s), EditorEvent::Field { field, event }) => (s, field, *event),
            (_, other) => return ignore_event("struct", state, &other),
        };
        let Some(f) = self.fields.iter().find(|f| f.name == field) else {
            log::warn!("struct editor has no field '{}'", field);
            return state.clone();
        };
        let child = self.child_state(s, f);
        let mut fields = s.fields.clone();
        fields.insert(f.name.clone(), Rc::new(f.veditor.update(&child, child_event)));
        EditorState::Struct(StructState { fields })
    }

    fn render(&self, state: &EditorState, disabled: bool, on_update: UpdateFn) -> R {
        let empty = StructState {
            fields: BTreeMap::new(),
        };
        let s = match state {
            EditorState::Struct(s) => s,
            _ => &empty,
        };
        let fields = self
            .fields
            .iter()
            .map(|f| {
                let name = f.name.clone();
                let child_update =
                    nested_update(&on_update, move |e| EditorEvent::field(name.clone(), e));
                StructFieldProps {
                    name: f.name.clone(),
                    label: f.label.clone(),
                    rendered: f
                        .veditor
                        .render(&self.child_state(s, f), disabled, child_update),
                }
            })
            .collect();
        self.renderer.render_struct(StructProps {
            type_expr: self.type_expr.clone(),
            fields,
            disabled,
        })
    }
}
