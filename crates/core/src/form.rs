//! Form state: an editor over a whole value, with a raw JSON mode and
//! optional host validation of every valid value.
//!
//! Host validation is asynchronous. Each request carries a sequence number
//! and only the outcome of the most recently issued request is kept, so a
//! slow answer never replaces a newer one.

use async_trait::async_trait;
use serde_json::Value;

use crate::fields::{FieldState, UFieldFns};
use crate::ids::IdSource;
use crate::json::JsonBinding;
use crate::veditor::{EditorEvent, EditorState, Invalid, UVEditor, UpdateFn, Validated};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Edit with the derived editor.
    VEditor,
    /// Edit the value as JSON text.
    Raw,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValidation {
    Awaiting { seq: u64 },
    Error { seq: u64, error: String },
    Ok { seq: u64 },
}

impl FormValidation {
    pub fn seq(&self) -> u64 {
        match self {
            FormValidation::Awaiting { seq }
            | FormValidation::Error { seq, .. }
            | FormValidation::Ok { seq } => *seq,
        }
    }
}

/// A value to be checked by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationRequest {
    pub seq: u64,
    pub value: Value,
}

/// The host's answer to a [`ValidationRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub seq: u64,
    pub error: Option<String>,
}

/// Whole-form validation supplied by the host.
#[async_trait(?Send)]
pub trait FormValidator {
    /// An error message, or `None` when the value is acceptable.
    async fn validate(&self, value: &Value) -> Option<String>;
}

pub async fn run_validation(
    validator: &dyn FormValidator,
    request: ValidationRequest,
) -> ValidationOutcome {
    let error = validator
        .validate(&request.value)
        .await
        .filter(|e| !e.is_empty());
    ValidationOutcome {
        seq: request.seq,
        error,
    }
}

pub const NO_JSON_BINDING: &str = "raw editing needs a json binding";
pub const JSON_NOT_WELL_FORMED: &str = "Json is not well formed";

pub struct FormState<R> {
    veditor: UVEditor<R>,
    binding: Option<JsonBinding>,
    validates: bool,
    ids: IdSource,

    value0: Option<Value>,
    state: EditorState,
    raw_text: String,
    mode: Mode,
    pristine: bool,
    validation: FormValidation,
    last_issued: u64,
}

impl<R> FormState<R> {
    pub fn new(veditor: UVEditor<R>, value0: Option<Value>) -> Self {
        let mut form = FormState {
            veditor,
            binding: None,
            validates: false,
            ids: IdSource::new("form"),
            value0: None,
            state: EditorState::Unit,
            raw_text: String::new(),
            mode: Mode::VEditor,
            pristine: true,
            validation: FormValidation::Ok { seq: 0 },
            last_issued: 0,
        };
        form.set_value0(value0);
        form
    }

    /// Enables raw mode.
    pub fn with_json_binding(mut self, binding: JsonBinding) -> Self {
        self.binding = Some(binding);
        self.raw_text = self.make_raw_text(self.value0.as_ref());
        self
    }

    /// Issue a [`ValidationRequest`] for every valid value reached by an
    /// editor update.
    pub fn with_host_validation(mut self) -> Self {
        self.validates = true;
        self
    }

    pub fn value0(&self) -> Option<&Value> {
        self.value0.as_ref()
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_pristine(&self) -> bool {
        self.pristine
    }

    pub fn validation(&self) -> &FormValidation {
        &self.validation
    }

    /// Element ids for this form. Renders carry no ids, so a host that
    /// needs them (labels, datalists) takes them from here.
    pub fn ids(&self) -> &IdSource {
        &self.ids
    }

    /// A standalone text field whose id is unique within this form.
    pub fn field_state(&self, fns: UFieldFns) -> FieldState {
        FieldState::new(fns, &self.ids)
    }

    fn make_state(&self, value: Option<&Value>) -> EditorState {
        match value {
            Some(v) => self.veditor.state_from_value(v),
            None => self.veditor.initial_state(),
        }
    }

    fn make_raw_text(&self, value: Option<&Value>) -> String {
        match (&self.binding, value) {
            (Some(binding), Some(v)) => {
                let json = binding.to_json(v);
                serde_json::to_string_pretty(&json).unwrap_or_else(|_| json.to_string())
            }
            _ => String::new(),
        }
    }

    /// Start over from `value0`.
    pub fn set_value0(&mut self, value0: Option<Value>) {
        self.state = self.make_state(value0.as_ref());
        self.raw_text = self.make_raw_text(value0.as_ref());
        self.value0 = value0;
        self.pristine = true;
    }

    /// Apply an editor event. Returns the validation the host should run,
    /// if any.
    pub fn update(&mut self, event: EditorEvent) -> Option<ValidationRequest> {
        self.state = self.veditor.update(&self.state, event);
        self.pristine = false;
        if !self.validates || self.mode != Mode::VEditor {
            return None;
        }
        let value = self.veditor.value_from_state(&self.state).ok()?;
        self.last_issued += 1;
        let seq = self.last_issued;
        self.validation = FormValidation::Awaiting { seq };
        log::debug!("awaiting validation {}", seq);
        Some(ValidationRequest { seq, value })
    }

    pub fn set_raw_text(&mut self, text: impl Into<String>) {
        self.raw_text = text.into();
        self.pristine = false;
    }

    /// Record a validation outcome. Outcomes of superseded requests are
    /// dropped and `false` is returned.
    pub fn apply_validation(&mut self, outcome: ValidationOutcome) -> bool {
        if outcome.seq != self.last_issued {
            log::debug!(
                "dropping validation {}, latest is {}",
                outcome.seq,
                self.last_issued
            );
            return false;
        }
        self.validation = match outcome.error {
            Some(error) => FormValidation::Error {
                seq: outcome.seq,
                error,
            },
            None => FormValidation::Ok { seq: outcome.seq },
        };
        true
    }

    /// The value held in raw mode.
    pub fn parse_raw(&self) -> Result<Value, String> {
        let binding = self.binding.as_ref().ok_or(NO_JSON_BINDING)?;
        let json: Value =
            serde_json::from_str(&self.raw_text).map_err(|_| JSON_NOT_WELL_FORMED.to_string())?;
        binding.from_json(&json).map_err(|e| e.to_string())
    }

    /// Switch modes, carrying the value across when the current mode holds
    /// a valid one. Otherwise the other mode keeps its previous content.
    pub fn toggle_mode(&mut self) {
        match self.mode {
            Mode::VEditor => {
                if let Ok(value) = self.veditor.value_from_state(&self.state) {
                    if self.binding.is_some() {
                        self.raw_text = self.make_raw_text(Some(&value));
                    }
                }
                self.mode = Mode::Raw;
            }
            Mode::Raw => {
                if let Ok(value) = self.parse_raw() {
                    self.state = self.veditor.state_from_value(&value);
                }
                self.mode = Mode::VEditor;
            }
        }
        self.pristine = false;
    }

    pub fn value(&self) -> Validated<Value> {
        match self.mode {
            Mode::VEditor => self.veditor.value_from_state(&self.state),
            Mode::Raw => self.parse_raw().map_err(Invalid::one),
        }
    }

    pub fn errors(&self) -> Vec<String> {
        match self.mode {
            Mode::VEditor => self.veditor.validate(&self.state),
            Mode::Raw => self.parse_raw().err().into_iter().collect(),
        }
    }

    /// True when the value is valid and no host validation is pending.
    pub fn can_apply(&self) -> bool {
        self.errors().is_empty() && !matches!(self.validation, FormValidation::Awaiting { .. })
    }

    /// Take the current value. It becomes the new starting value.
    pub fn apply(&mut self) -> Validated<Value> {
        let value = self.value()?;
        self.set_value0(Some(value.clone()));
        Ok(value)
    }

    pub fn render(&self, disabled: bool, on_update: UpdateFn) -> R {
        self.veditor.render(&self.state, disabled, on_update)
    }
}
