//! Editors whose state is a single line of text.

use serde_json::Value;
use std::rc::Rc;

use super::factory::{FieldProps, Renderer};
use super::{
    ignore_event, unexpected_state, EditorEvent, EditorState, Invalid, UVEditor, UpdateFn,
    VEditor, Validated,
};
use crate::fields::UFieldFns;

pub struct FieldVEditor<R> {
    fns: UFieldFns,
    renderer: Rc<dyn Renderer<R>>,
}

pub fn field_veditor<R: 'static>(fns: UFieldFns, renderer: Rc<dyn Renderer<R>>) -> UVEditor<R> {
    Rc::new(FieldVEditor { fns, renderer })
}

impl<R> FieldVEditor<R> {
    fn text<'a>(&self, state: &'a EditorState) -> Option<&'a str> {
        match state {
            EditorState::Text(t) => Some(t),
            _ => None,
        }
    }
}

impl<R> VEditor<R> for FieldVEditor<R> {
    fn initial_state(&self) -> EditorState {
        EditorState::Text(String::new())
    }

    fn state_from_value(&self, value: &Value) -> EditorState {
        EditorState::Text(self.fns.to_text(value))
    }

    fn validate(&self, state: &EditorState) -> Vec<String> {
        match self.text(state) {
            Some(t) => self.fns.validate(t).into_iter().collect(),
            None => unexpected_state("field", state).0,
        }
    }

    fn value_from_state(&self, state: &EditorState) -> Validated<Value> {
        let text = self
            .text(state)
            .ok_or_else(|| unexpected_state("field", state))?;
        self.fns.parse(text).map_err(Invalid::one)
    }

    fn update(&self, state: &EditorState, event: EditorEvent) -> EditorState {
        match event {
            EditorEvent::SetText(text) => EditorState::Text(text),
            other => ignore_event("field", state, &other),
        }
    }

    fn render(&self, state: &EditorState, disabled: bool, on_update: UpdateFn) -> R {
        let text = self.text(state).unwrap_or_default().to_string();
        let error = self.fns.validate(&text);
        self.renderer.render_field(FieldProps {
            fns: Rc::clone(&self.fns),
            text,
            error,
            disabled,
            on_update,
        })
    }
}
