//! Nullable editors: a present/absent toggle over an underlying editor.

use serde_json::Value;
use std::rc::Rc;

use veditor_ast::TypeExpr;

use super::factory::{NullableProps, Renderer};
use super::{
    ignore_event, nested_update, unexpected_state, EditorEvent, EditorState, NullableState,
    UVEditor, UpdateFn, VEditor, Validated,
};

pub struct NullableVEditor<R> {
    type_expr: TypeExpr,
    underlying: UVEditor<R>,
    renderer: Rc<dyn Renderer<R>>,
}

pub fn nullable_veditor<R: 'static>(
    type_expr: TypeExpr,
    underlying: UVEditor<R>,
    renderer: Rc<dyn Renderer<R>>,
) -> UVEditor<R> {
    Rc::new(NullableVEditor {
        type_expr,
        underlying,
        renderer,
    })
}

impl<R> NullableVEditor<R> {
    fn underlying_state(&self, s: &NullableState) -> Rc<EditorState> {
        s.underlying
            .clone()
            .unwrap_or_else(|| Rc::new(self.underlying.initial_state()))
    }
}

impl<R> VEditor<R> for NullableVEditor<R> {
    fn initial_state(&self) -> EditorState {
        EditorState::Nullable(NullableState {
            present: false,
            underlying: None,
        })
    }

    fn state_from_value(&self, value: &Value) -> EditorState {
        match value {
            Value::Null => self.initial_state(),
            v => EditorState::Nullable(NullableState {
                present: true,
                underlying: Some(Rc::new(self.underlying.state_from_value(v))),
            }),
        }
    }

    fn validate(&self, state: &EditorState) -> Vec<String> {
        match state {
            EditorState::Nullable(s) if s.present => {
                self.underlying.validate(&self.underlying_state(s))
            }
            EditorState::Nullable(_) => Vec::new(),
            other => unexpected_state("nullable", other).0,
        }
    }

    fn value_from_state(&self, state: &EditorState) -> Validated<Value> {
        match state {
            EditorState::Nullable(s) if s.present => {
                self.underlying.value_from_state(&self.underlying_state(s))
            }
            EditorState::Nullable(_) => Ok(Value::Null),
            other => Err(unexpected_state("nullable", other)),
        }
    }

    /// The first toggle to present seeds the underlying state from the
    /// underlying editor's initial state. Later toggles keep whatever was
    /// last edited.
    fn update(&self, state: &EditorState, event: EditorEvent) -> EditorState {
        let EditorState::Nullable(s) = state else {
            return ignore_event("nullable", state, &event);
        };
        match event {
            EditorEvent::TogglePresent => EditorState::Nullable(NullableState {
                present: !s.present,
                underlying: Some(self.underlying_state(s)),
            }),
            EditorEvent::UpdateUnderlying(child_event) if s.present => {
                let updated = self
                    .underlying
                    .update(&self.underlying_state(s), *child_event);
                EditorState::Nullable(NullableState {
                    present: true,
                    underlying: Some(Rc::new(updated)),
                })
            }
            other => ignore_event("nullable", state, &other),
        }
    }

    fn render(&self, state: &EditorState, disabled: bool, on_update: UpdateFn) -> R {
        let rendered = match state {
            EditorState::Nullable(s) if s.present => {
                let child_update = nested_update(&on_update, EditorEvent::update_underlying);
                Some(
                    self.underlying
                        .render(&self.underlying_state(s), disabled, child_update),
                )
            }
            _ => None,
        };
        self.renderer.render_nullable(NullableProps {
            type_expr: self.type_expr.clone(),
            present: rendered.is_some(),
            rendered,
            disabled,
            on_update,
        })
    }
}
