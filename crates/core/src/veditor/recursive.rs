//! The editor handed out where a type refers back to a type still being
//! derived.
//!
//! It forwards to the enclosing editor once derivation has finished. The
//! link is weak, since the enclosing editor owns this one.

use serde_json::Value;
use std::cell::OnceCell;
use std::rc::{Rc, Weak};

use veditor_ast::TypeExpr;

use super::factory::Renderer;
use super::unimplemented::unimplemented_veditor;
use super::{EditorEvent, EditorState, UVEditor, UpdateFn, VEditor, Validated};

/// Filled with the enclosing editor when its derivation completes.
pub type RecursionTarget<R> = Rc<OnceCell<Weak<dyn VEditor<R>>>>;

pub struct RecursiveVEditor<R> {
    type_expr: TypeExpr,
    target: RecursionTarget<R>,
    fallback: UVEditor<R>,
}

pub fn recursive_veditor<R: 'static>(
    type_expr: TypeExpr,
    target: RecursionTarget<R>,
    renderer: Rc<dyn Renderer<R>>,
) -> UVEditor<R> {
    Rc::new(RecursiveVEditor {
        fallback: unimplemented_veditor(type_expr.clone(), renderer),
        type_expr,
        target,
    })
}

impl<R> RecursiveVEditor<R> {
    fn editor(&self) -> UVEditor<R> {
        match self.target.get().and_then(Weak::upgrade) {
            Some(editor) => editor,
            None => {
                log::warn!("editor for {} is no longer available", self.type_expr);
                Rc::clone(&self.fallback)
            }
        }
    }
}

impl<R> VEditor<R> for RecursiveVEditor<R> {
    fn initial_state(&self) -> EditorState {
        self.editor().initial_state()
    }

    fn state_from_value(&self, value: &Value) -> EditorState {
        self.editor().state_from_value(value)
    }

    fn validate(&self, state: &EditorState) -> Vec<String> {
        self.editor().validate(state)
    }

    fn value_from_state(&self, state: &EditorState) -> Validated<Value> {
        self.editor().value_from_state(state)
    }

    fn update(&self, state: &EditorState, event: EditorEvent) -> EditorState {
        self.editor().update(state, event)
    }

    fn render(&self, state: &EditorState, disabled: bool, on_update: UpdateFn) -> R {
        self.editor().render(state, disabled, on_update)
    }
}
