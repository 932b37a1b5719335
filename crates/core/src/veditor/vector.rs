//! Vector editors: one shared element editor over a list of element states.

use serde_json::Value;
use std::rc::Rc;

use veditor_ast::TypeExpr;

use super::factory::{Renderer, VectorItem, VectorProps};
use super::{
    ignore_event, nested_update, unexpected_state, EditorEvent, EditorState, Invalid, UVEditor,
    UpdateFn, VEditor, Validated,
};
use crate::table::AdlColumn;

pub struct VectorVEditor<R> {
    type_expr: TypeExpr,
    element: UVEditor<R>,
    columns: Vec<AdlColumn>,
    renderer: Rc<dyn Renderer<R>>,
}

pub fn vector_veditor<R: 'static>(
    type_expr: TypeExpr,
    element: UVEditor<R>,
    columns: Vec<AdlColumn>,
    renderer: Rc<dyn Renderer<R>>,
) -> UVEditor<R> {
    Rc::new(VectorVEditor {
        type_expr,
        element,
        columns,
        renderer,
    })
}

/// `items[..index] + inserted + items[index + delete..]`, with `index` and
/// `delete` clamped to the list.
pub fn splice<T: Clone>(items: &[T], index: usize, delete: usize, inserted: Vec<T>) -> Vec<T> {
    let start = index.min(items.len());
    let end = start.saturating_add(delete).min(items.len());
    let mut out = Vec::with_capacity(items.len() - (end - start) + inserted.len());
    out.extend_from_slice(&items[..start]);
    out.extend(inserted);
    out.extend_from_slice(&items[end..]);
    out
}

impl<R> VectorVEditor<R> {
    /// The shared element editor.
    pub fn element(&self) -> &UVEditor<R> {
        &self.element
    }
}

impl<R> VEditor<R> for VectorVEditor<R> {
    fn initial_state(&self) -> EditorState {
        EditorState::Vector(Vec::new())
    }

    fn state_from_value(&self, value: &Value) -> EditorState {
        let items = match value.as_array() {
            Some(items) => items,
            None => {
                log::warn!("'{}' is not a value of {}", value, self.type_expr);
                return self.initial_state();
            }
        };
        EditorState::Vector(
            items
                .iter()
                .map(|v| Rc::new(self.element.state_from_value(v)))
                .collect(),
        )
    }

    fn validate(&self, state: &EditorState) -> Vec<String> {
        let EditorState::Vector(items) = state else {
            return unexpected_state("vector", state).0;
        };
        items
            .iter()
            .enumerate()
            .flat_map(|(i, s)| {
                self.element
                    .validate(s)
                    .into_iter()
                    .map(move |e| format!("{}: {}", i, e))
            })
            .collect()
    }

    fn value_from_state(&self, state: &EditorState) -> Validated<Value> {
        let EditorState::Vector(items) = state else {
            return Err(unexpected_state("vector", state));
        };
        let mut values = Vec::with_capacity(items.len());
        let mut errors = Vec::new();
        for (i, s) in items.iter().enumerate() {
            match self.element.value_from_state(s) {
                Ok(v) => values.push(v),
                Err(Invalid(errs)) => errors.extend(errs.into_iter().map(|e| format!("{}: {}", i, e))),
            }
        }
        if errors.is_empty() {
            Ok(Value::Array(values))
        } else {
            Err(Invalid(errors))
        }
    }

    fn update(&self, state: &EditorState, event: EditorEvent) -> EditorState {
        let EditorState::Vector(items) = state else {
            return ignore_event("vector", state, &event);
        };
        match event {
            EditorEvent::Splice {
                index,
                delete,
                insert,
            } => {
                let inserted = insert
                    .iter()
                    .map(|v| Rc::new(self.element.state_from_value(v)))
                    .collect();
                EditorState::Vector(splice(items, index, delete, inserted))
            }
            EditorEvent::UpdateElement { index, event } if index < items.len() => {
                let mut items = items.clone();
                items[index] = Rc::new(self.element.update(&items[index], *event));
                EditorState::Vector(items)
            }
            other => ignore_event("vector", state, &other),
        }
    }

    fn render(&self, state: &EditorState, disabled: bool, on_update: UpdateFn) -> R {
        let no_items = Vec::new();
        let items = match state {
            EditorState::Vector(items) => items,
            _ => &no_items,
        };
        let items = items
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let child_update =
                    nested_update(&on_update, move |e| EditorEvent::update_element(i, e));
                VectorItem {
                    value: self.element.value_from_state(s).ok(),
                    rendered: self.element.render(s, disabled, child_update),
                }
            })
            .collect();
        self.renderer.render_vector(VectorProps {
            type_expr: self.type_expr.clone(),
            items,
            columns: self.columns.clone(),
            disabled,
            on_update,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::int_field;
    use crate::veditor::factory::{
        FieldProps, NullableProps, StructProps, UnimplementedProps, UnionProps,
    };
    use crate::veditor::field::field_veditor;
    use serde_json::json;
    use std::cell::RefCell;

    /// Keeps the last vector props so tests can drive the list helpers.
    #[derive(Default)]
    struct CaptureVector {
        props: RefCell<Option<VectorProps<()>>>,
    }

    impl Renderer<()> for CaptureVector {
        fn render_void(&self) {}
        fn render_field(&self, _props: FieldProps) {}
        fn render_struct(&self, _props: StructProps<()>) {}
        fn render_union(&self, _props: UnionProps<()>) {}
        fn render_nullable(&self, _props: NullableProps<()>) {}
        fn render_vector(&self, props: VectorProps<()>) {
            *self.props.borrow_mut() = Some(props);
        }
        fn render_unimplemented(&self, _props: UnimplementedProps) {}
    }

    fn int_vector(capture: &Rc<CaptureVector>) -> UVEditor<()> {
        let renderer: Rc<dyn Renderer<()>> = capture.clone();
        vector_veditor(
            TypeExpr::vector(TypeExpr::primitive("Int32")),
            field_veditor(int_field(None, None), Rc::clone(&renderer)),
            Vec::new(),
            renderer,
        )
    }

    /// Render `state`, run `f` against the props, then apply every event
    /// it emitted.
    fn act(
        ed: &UVEditor<()>,
        capture: &CaptureVector,
        state: EditorState,
        f: impl Fn(&VectorProps<()>),
    ) -> EditorState {
        let events: Rc<RefCell<Vec<EditorEvent>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        ed.render(&state, false, Rc::new(move |e: EditorEvent| sink.borrow_mut().push(e)));
        let props = capture.props.borrow_mut().take().unwrap();
        f(&props);
        let emitted: Vec<EditorEvent> = events.borrow_mut().drain(..).collect();
        emitted.into_iter().fold(state, |s, e| ed.update(&s, e))
    }

    #[test]
    fn test_splice_clamps() {
        let l = vec![1, 2, 3];
        assert_eq!(splice(&l, 1, 1, vec![9, 9]), vec![1, 9, 9, 3]);
        assert_eq!(splice(&l, 3, 0, vec![4]), vec![1, 2, 3, 4]);
        assert_eq!(splice(&l, 7, 2, vec![4]), vec![1, 2, 3, 4]);
        assert_eq!(splice(&l, 1, 10, vec![]), vec![1]);
        assert_eq!(splice(&l, 0, usize::MAX, vec![]), Vec::<i32>::new());
    }

    #[test]
    fn test_moves_are_two_element_splices() {
        let capture = Rc::new(CaptureVector::default());
        let ed = int_vector(&capture);
        let s = ed.state_from_value(&json!([1, 2, 3]));

        let events: Rc<RefCell<Vec<EditorEvent>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        ed.render(&s, false, Rc::new(move |e: EditorEvent| sink.borrow_mut().push(e)));
        let props = capture.props.borrow_mut().take().unwrap();
        props.move_down(0);
        assert!(matches!(
            events.borrow().as_slice(),
            [EditorEvent::Splice { index: 0, delete: 2, insert }]
                if insert == &vec![json!(2), json!(1)]
        ));

        let s = act(&ed, &capture, s, |p| p.move_down(0));
        assert_eq!(ed.value_from_state(&s), Ok(json!([2, 1, 3])));
        let s = act(&ed, &capture, s, |p| p.move_up(2));
        assert_eq!(ed.value_from_state(&s), Ok(json!([2, 3, 1])));
    }

    #[test]
    fn test_list_helpers() {
        let capture = Rc::new(CaptureVector::default());
        let ed = int_vector(&capture);
        let s = ed.state_from_value(&json!([1, 2, 3]));

        let s = act(&ed, &capture, s, |p| p.insert_after(Some(0), json!(9)));
        assert_eq!(ed.value_from_state(&s), Ok(json!([1, 9, 2, 3])));
        let s = act(&ed, &capture, s, |p| p.insert_after(None, json!(0)));
        assert_eq!(ed.value_from_state(&s), Ok(json!([0, 1, 9, 2, 3])));
        let s = act(&ed, &capture, s, |p| p.delete(2));
        assert_eq!(ed.value_from_state(&s), Ok(json!([0, 1, 2, 3])));
        let s = act(&ed, &capture, s, |p| p.replace(0, json!(7)));
        assert_eq!(ed.value_from_state(&s), Ok(json!([7, 1, 2, 3])));
        let s = act(&ed, &capture, s, |p| p.append(json!(4)));
        assert_eq!(ed.value_from_state(&s), Ok(json!([7, 1, 2, 3, 4])));
    }

    #[test]
    fn test_delete_then_reinsert_restores_list() {
        let capture = Rc::new(CaptureVector::default());
        let ed = int_vector(&capture);
        let s = ed.state_from_value(&json!([1, 2, 3]));

        for i in 0..3 {
            let x = json!(i + 1);
            let deleted = act(&ed, &capture, s.clone(), |p| p.splice(i, 1, Vec::new()));
            let restored = act(&ed, &capture, deleted, |p| p.splice(i, 0, vec![x.clone()]));
            assert_eq!(ed.value_from_state(&restored), Ok(json!([1, 2, 3])));
            assert_eq!(restored, s);
        }
    }

    #[test]
    fn test_no_moves_past_ends_or_invalid_elements() {
        let capture = Rc::new(CaptureVector::default());
        let ed = int_vector(&capture);
        let s = ed.state_from_value(&json!([1, 2, 3]));
        ed.render(&s, false, Rc::new(|_| {}));
        let props = capture.props.borrow_mut().take().unwrap();
        assert!(!props.can_move_up(0));
        assert!(props.can_move_up(1));
        assert!(props.can_move_down(1));
        assert!(!props.can_move_down(2));

        let s = ed.update(
            &s,
            EditorEvent::update_element(1, EditorEvent::set_text("two")),
        );
        ed.render(&s, false, Rc::new(|_| {}));
        let props = capture.props.borrow_mut().take().unwrap();
        assert_eq!(props.values(), vec![Some(&json!(1)), None, Some(&json!(3))]);
        assert!(!props.can_move_down(0));
        assert!(!props.can_move_up(1));
        assert!(!props.can_move_down(1));
        assert!(!props.can_move_up(2));

        let moved = act(&ed, &capture, s.clone(), |p| {
            p.move_down(0);
            p.move_up(2);
        });
        assert_eq!(moved, s);
    }
}
