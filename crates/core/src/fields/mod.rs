//! Text-based leaf fields.
//!
//! A [`FieldFns`] bundle knows how to show a value as text, check text typed
//! by a user, and parse checked text back into a value. Values are ADL JSON.

pub mod adl;
pub mod primitive;
pub mod state;

use serde_json::Value;
use std::rc::Rc;

pub use adl::{adl_field, adl_primitive_field_fns, enum_field, maybe_field, nullable_field};
pub use primitive::{
    big_decimal_field, bool_field, email_field, int_field, json_field, labelled_values_field,
    non_empty_string_field, number_field, regex_string_field, string_field, with_datalist,
    FieldError, LabelledValue,
};
pub use state::FieldState;

pub trait FieldFns {
    /// Text shown for `value`.
    fn to_text(&self, value: &Value) -> String;

    /// An error message if `text` is not acceptable, else `None`.
    fn validate(&self, text: &str) -> Option<String>;

    /// Parse text that passed [`validate`](Self::validate).
    fn from_text(&self, text: &str) -> Value;

    fn equals(&self, a: &Value, b: &Value) -> bool {
        a == b
    }

    /// Suggested entries offered alongside the text input.
    fn datalist(&self) -> Option<&[String]> {
        None
    }

    /// Validate and parse in one step.
    fn parse(&self, text: &str) -> Result<Value, String> {
        match self.validate(text) {
            Some(err) => Err(err),
            None => Ok(self.from_text(text)),
        }
    }
}

pub type UFieldFns = Rc<dyn FieldFns>;
