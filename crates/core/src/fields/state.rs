//! Standalone state for a single text field, for hosts that edit one value
//! without a derived editor.

use serde_json::Value;

use super::UFieldFns;
use crate::ids::IdSource;

#[derive(Clone)]
pub struct FieldState {
    fns: UFieldFns,
    text: String,
    initial_text: String,
    id: String,
}

impl std::fmt::Debug for FieldState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldState")
            .field("id", &self.id)
            .field("text", &self.text)
            .field("initial_text", &self.initial_text)
            .finish()
    }
}

impl FieldState {
    /// An empty field with an id taken from `ids`.
    pub fn new(fns: UFieldFns, ids: &IdSource) -> Self {
        FieldState {
            fns,
            text: String::new(),
            initial_text: String::new(),
            id: ids.next_id(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn initial_text(&self) -> &str {
        &self.initial_text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn is_modified(&self) -> bool {
        self.text != self.initial_text
    }

    pub fn is_valid(&self) -> bool {
        self.fns.validate(&self.text).is_none()
    }

    /// The parsed value, if the text is valid.
    pub fn value(&self) -> Option<Value> {
        self.fns.parse(&self.text).ok()
    }

    pub fn validation_error(&self) -> Option<String> {
        self.fns.validate(&self.text)
    }

    /// Show `value`, making it the new baseline for [`is_modified`](Self::is_modified).
    pub fn set_value(&mut self, value: &Value) {
        let text = self.fns.to_text(value);
        self.initial_text = text.clone();
        self.text = text;
    }

    pub fn revert(&mut self) {
        self.text = self.initial_text.clone();
    }
}
