//! Re-expressing an editor over an isomorphic type.

use serde_json::Value;
use std::rc::Rc;

use super::{EditorEvent, EditorState, UVEditor, UpdateFn, VEditor, Validated};

type Convert = Rc<dyn Fn(&Value) -> Value>;

pub struct MappedVEditor<R> {
    base: UVEditor<R>,
    a_from_b: Convert,
    b_from_a: Convert,
}

/// An editor for `B` built from an editor for `A`. State, events,
/// validation and rendering are the base editor's; only the conversions
/// between values and state go through `a_from_b` and `b_from_a`.
pub fn mapped_veditor<R: 'static>(
    base: UVEditor<R>,
    a_from_b: impl Fn(&Value) -> Value + 'static,
    b_from_a: impl Fn(&Value) -> Value + 'static,
) -> UVEditor<R> {
    Rc::new(MappedVEditor {
        base,
        a_from_b: Rc::new(a_from_b),
        b_from_a: Rc::new(b_from_a),
    })
}

impl<R> VEditor<R> for MappedVEditor<R> {
    fn initial_state(&self) -> EditorState {
        self.base.initial_state()
    }

    fn state_from_value(&self, value: &Value) -> EditorState {
        self.base.state_from_value(&(self.a_from_b)(value))
    }

    fn validate(&self, state: &EditorState) -> Vec<String> {
        self.base.validate(state)
    }

    fn value_from_state(&self, state: &EditorState) -> Validated<Value> {
        self.base
            .value_from_state(state)
            .map(|a| (self.b_from_a)(&a))
    }

    fn update(&self, state: &EditorState, event: EditorEvent) -> EditorState {
        self.base.update(state, event)
    }

    fn render(&self, state: &EditorState, disabled: bool, on_update: UpdateFn) -> R {
        self.base.render(state, disabled, on_update)
    }
}
