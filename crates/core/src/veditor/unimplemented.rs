//! Editors with no state: `Void`, and the placeholder used for shapes the
//! engine cannot edit.

use serde_json::Value;
use std::rc::Rc;

use veditor_ast::TypeExpr;

use super::factory::{Renderer, UnimplementedProps};
use super::{EditorEvent, EditorState, UVEditor, UpdateFn, VEditor, Validated};

pub struct VoidVEditor<R> {
    renderer: Rc<dyn Renderer<R>>,
}

pub fn void_veditor<R: 'static>(renderer: Rc<dyn Renderer<R>>) -> UVEditor<R> {
    Rc::new(VoidVEditor { renderer })
}

impl<R> VEditor<R> for VoidVEditor<R> {
    fn initial_state(&self) -> EditorState {
        EditorState::Unit
    }

    fn state_from_value(&self, _value: &Value) -> EditorState {
        EditorState::Unit
    }

    fn validate(&self, _state: &EditorState) -> Vec<String> {
        Vec::new()
    }

    fn value_from_state(&self, _state: &EditorState) -> Validated<Value> {
        Ok(Value::Null)
    }

    fn update(&self, _state: &EditorState, _event: EditorEvent) -> EditorState {
        EditorState::Unit
    }

    fn render(&self, _state: &EditorState, _disabled: bool, _on_update: UpdateFn) -> R {
        self.renderer.render_void()
    }
}

/// Always valid, never edits anything, and yields `null`. Lets a form with
/// an unsupported member still be shown.
pub struct UnimplementedVEditor<R> {
    type_expr: TypeExpr,
    renderer: Rc<dyn Renderer<R>>,
}

pub fn unimplemented_veditor<R: 'static>(
    type_expr: TypeExpr,
    renderer: Rc<dyn Renderer<R>>,
) -> UVEditor<R> {
    Rc::new(UnimplementedVEditor {
        type_expr,
        renderer,
    })
}

impl<R> VEditor<R> for UnimplementedVEditor<R> {
    fn initial_state(&self) -> EditorState {
        EditorState::Unit
    }

    fn state_from_value(&self, _value: &Value) -> EditorState {
        EditorState::Unit
    }

    fn validate(&self, _state: &EditorState) -> Vec<String> {
        Vec::new()
    }

    fn value_from_state(&self, _state: &EditorState) -> Validated<Value> {
        Ok(Value::Null)
    }

    fn update(&self, state: &EditorState, _event: EditorEvent) -> EditorState {
        state.clone()
    }

    fn render(&self, _state: &EditorState, _disabled: bool, _on_update: UpdateFn) -> R {
        self.renderer.render_unimplemented(UnimplementedProps {
            type_expr: self.type_expr.clone(),
        })
    }
}
