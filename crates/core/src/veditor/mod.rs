//! Value editors.
//!
//! A [`VEditor`] edits values of one ADL type. It never owns its state: the
//! host keeps an [`EditorState`], feeds [`EditorEvent`]s through
//! [`VEditor::update`] and asks [`VEditor::value_from_state`] for the value.
//! Editors for a whole type are derived with [`create_veditor`].

pub mod customize;
pub mod derive;
pub mod factory;
pub mod field;
pub mod mapped;
pub mod nullable;
pub mod recursive;
pub mod struct_;
pub mod union;
pub mod unimplemented;
pub mod vector;

use serde_json::Value;
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

pub use derive::{create_veditor, create_veditor_from_tree};
pub use factory::{
    ArmChoice, CustomContext, DeriveOptions, Factory, FieldProps, NullableProps, Renderer,
    StructFieldProps, StructProps, UnimplementedProps, UnionProps, VectorItem, VectorProps,
};
pub use mapped::mapped_veditor;

// ── Validation results ──────────────────────────────────────────────

/// A value could not be produced. Holds every problem found, never empty.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", .0.join("; "))]
pub struct Invalid(pub Vec<String>);

impl Invalid {
    pub fn one(message: impl Into<String>) -> Self {
        Invalid(vec![message.into()])
    }

    pub fn messages(&self) -> &[String] {
        &self.0
    }
}

pub type Validated<T> = Result<T, Invalid>;

// ── State ───────────────────────────────────────────────────────────

/// Editor state. Child states are shared through `Rc`, so an update
/// replaces only the path to the edited child.
#[derive(Clone)]
pub enum EditorState {
    /// Void and unimplemented editors.
    Unit,
    /// Text of a leaf field.
    Text(String),
    Struct(StructState),
    Union(UnionState),
    Nullable(NullableState),
    Vector(Vec<Rc<EditorState>>),
    /// State of a host-provided editor.
    Custom(Rc<dyn Any>),
}

/// One state per field, keyed by field name.
#[derive(Debug, Clone, PartialEq)]
pub struct StructState {
    pub fields: BTreeMap<String, Rc<EditorState>>,
}

/// The selected arm, plus the last state of every arm selected so far.
#[derive(Debug, Clone, PartialEq)]
pub struct UnionState {
    pub selected: Option<String>,
    pub arms: BTreeMap<String, Rc<EditorState>>,
}

/// `underlying` is kept while absent, so toggling back restores it.
#[derive(Debug, Clone, PartialEq)]
pub struct NullableState {
    pub present: bool,
    pub underlying: Option<Rc<EditorState>>,
}

impl EditorState {
    pub fn text(text: impl Into<String>) -> Self {
        EditorState::Text(text.into())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            EditorState::Unit => "unit",
            EditorState::Text(_) => "text",
            EditorState::Struct(_) => "struct",
            EditorState::Union(_) => "union",
            EditorState::Nullable(_) => "nullable",
            EditorState::Vector(_) => "vector",
            EditorState::Custom(_) => "custom",
        }
    }

    /// The state of a struct field.
    pub fn field(&self, name: &str) -> Option<&Rc<EditorState>> {
        match self {
            EditorState::Struct(s) => s.fields.get(name),
            _ => None,
        }
    }
}

impl fmt::Debug for EditorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditorState::Unit => write!(f, "Unit"),
            EditorState::Text(t) => f.debug_tuple("Text").field(t).finish(),
            EditorState::Struct(s) => s.fmt(f),
            EditorState::Union(u) => u.fmt(f),
            EditorState::Nullable(n) => n.fmt(f),
            EditorState::Vector(items) => f.debug_tuple("Vector").field(items).finish(),
            EditorState::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

impl PartialEq for EditorState {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (EditorState::Unit, EditorState::Unit) => true,
            (EditorState::Text(a), EditorState::Text(b)) => a == b,
            (EditorState::Struct(a), EditorState::Struct(b)) => a == b,
            (EditorState::Union(a), EditorState::Union(b)) => a == b,
            (EditorState::Nullable(a), EditorState::Nullable(b)) => a == b,
            (EditorState::Vector(a), EditorState::Vector(b)) => a == b,
            (EditorState::Custom(a), EditorState::Custom(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

// ── Events ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub enum EditorEvent {
    /// Replace the text of a leaf field.
    SetText(String),
    /// Apply `event` to one struct field.
    Field { field: String, event: Box<EditorEvent> },
    /// Choose a union arm, or none.
    SelectArm(Option<String>),
    /// Apply an event to the selected union arm.
    UpdateArm(Box<EditorEvent>),
    /// Flip a nullable between absent and present.
    TogglePresent,
    /// Apply an event to the present nullable value.
    UpdateUnderlying(Box<EditorEvent>),
    /// Remove `delete` elements at `index` and insert `insert` in their place.
    Splice {
        index: usize,
        delete: usize,
        insert: Vec<Value>,
    },
    /// Apply an event to one vector element.
    UpdateElement { index: usize, event: Box<EditorEvent> },
    /// An event for a host-provided editor.
    Custom(Rc<dyn Any>),
}

impl EditorEvent {
    pub fn set_text(text: impl Into<String>) -> Self {
        EditorEvent::SetText(text.into())
    }

    pub fn field(field: impl Into<String>, event: EditorEvent) -> Self {
        EditorEvent::Field {
            field: field.into(),
            event: Box::new(event),
        }
    }

    pub fn select_arm(arm: impl Into<String>) -> Self {
        EditorEvent::SelectArm(Some(arm.into()))
    }

    pub fn update_arm(event: EditorEvent) -> Self {
        EditorEvent::UpdateArm(Box::new(event))
    }

    pub fn update_underlying(event: EditorEvent) -> Self {
        EditorEvent::UpdateUnderlying(Box::new(event))
    }

    pub fn splice(index: usize, delete: usize, insert: Vec<Value>) -> Self {
        EditorEvent::Splice {
            index,
            delete,
            insert,
        }
    }

    pub fn update_element(index: usize, event: EditorEvent) -> Self {
        EditorEvent::UpdateElement {
            index,
            event: Box::new(event),
        }
    }
}

impl fmt::Debug for EditorEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditorEvent::SetText(t) => f.debug_tuple("SetText").field(t).finish(),
            EditorEvent::Field { field, event } => f
                .debug_struct("Field")
                .field("field", field)
                .field("event", event)
                .finish(),
            EditorEvent::SelectArm(arm) => f.debug_tuple("SelectArm").field(arm).finish(),
            EditorEvent::UpdateArm(e) => f.debug_tuple("UpdateArm").field(e).finish(),
            EditorEvent::TogglePresent => write!(f, "TogglePresent"),
            EditorEvent::UpdateUnderlying(e) => {
                f.debug_tuple("UpdateUnderlying").field(e).finish()
            }
            EditorEvent::Splice {
                index,
                delete,
                insert,
            } => f
                .debug_struct("Splice")
                .field("index", index)
                .field("delete", delete)
                .field("insert", insert)
                .finish(),
            EditorEvent::UpdateElement { index, event } => f
                .debug_struct("UpdateElement")
                .field("index", index)
                .field("event", event)
                .finish(),
            EditorEvent::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

/// Callback through which rendered output feeds events back.
pub type UpdateFn = Rc<dyn Fn(EditorEvent)>;

// ── The editor contract ─────────────────────────────────────────────

/// An editor for values of one type, rendering to `R`.
///
/// `state_from_value` followed by `value_from_state` gives back the
/// original value. `update` accepts every event the editor's own render
/// output can emit; anything else leaves the state unchanged.
pub trait VEditor<R> {
    /// State for an absent or empty value.
    fn initial_state(&self) -> EditorState;

    fn state_from_value(&self, value: &Value) -> EditorState;

    /// Every problem preventing a value, or nothing if the state is valid.
    fn validate(&self, state: &EditorState) -> Vec<String> {
        match self.value_from_state(state) {
            Ok(_) => Vec::new(),
            Err(Invalid(errors)) => errors,
        }
    }

    fn value_from_state(&self, state: &EditorState) -> Validated<Value>;

    fn update(&self, state: &EditorState, event: EditorEvent) -> EditorState;

    fn render(&self, state: &EditorState, disabled: bool, on_update: UpdateFn) -> R;
}

pub type UVEditor<R> = Rc<dyn VEditor<R>>;

/// Wrap `on_update` so events from a child arrive tagged by `wrap`.
pub(crate) fn nested_update(
    on_update: &UpdateFn,
    wrap: impl Fn(EditorEvent) -> EditorEvent + 'static,
) -> UpdateFn {
    let on_update = Rc::clone(on_update);
    Rc::new(move |event| on_update(wrap(event)))
}

/// Log and ignore an event that does not fit the state.
pub(crate) fn ignore_event(editor: &str, state: &EditorState, event: &EditorEvent) -> EditorState {
    log::warn!(
        "{} editor ignored {:?} for {} state",
        editor,
        event,
        state.kind()
    );
    state.clone()
}

pub(crate) fn unexpected_state(editor: &str, state: &EditorState) -> Invalid {
    Invalid::one(format!(
        "{} editor cannot read {} state",
        editor,
        state.kind()
    ))
}
