//! Union editors: a choice of arm plus the chosen arm's editor.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::rc::Rc;

use veditor_ast::TypeExpr;

use super::factory::{ArmChoice, Renderer, UnionProps};
use super::{
    ignore_event, nested_update, unexpected_state, EditorEvent, EditorState, Invalid, UVEditor,
    UnionState, UpdateFn, VEditor, Validated,
};

/// A union arm and its editor.
pub struct VArm<R> {
    pub name: String,
    pub serialized_name: String,
    pub label: String,
    /// Void arms serialize as a bare string.
    pub is_void: bool,
    pub veditor: UVEditor<R>,
}

pub struct UnionVEditor<R> {
    type_expr: TypeExpr,
    arms: Vec<VArm<R>>,
    renderer: Rc<dyn Renderer<R>>,
}

pub fn union_veditor<R: 'static>(
    type_expr: TypeExpr,
    arms: Vec<VArm<R>>,
    renderer: Rc<dyn Renderer<R>>,
) -> UVEditor<R> {
    Rc::new(UnionVEditor {
        type_expr,
        arms,
        renderer,
    })
}

pub const NO_ARM_SELECTED: &str = "no arm selected";

impl<R> UnionVEditor<R> {
    fn arm(&self, name: &str) -> Option<&VArm<R>> {
        self.arms.iter().find(|a| a.name == name)
    }

    /// Accepts `"arm"` and `{"arm": payload}`.
    fn split_value<'a>(&self, value: &'a Value) -> Option<(&VArm<R>, &'a Value)> {
        static NULL: Value = Value::Null;
        let (tag, payload) = match value {
            Value::String(tag) => (tag.as_str(), &NULL),
            Value::Object(obj) if obj.len() == 1 => {
                let (tag, payload) = obj.iter().next()?;
                (tag.as_str(), payload)
            }
            _ => return None,
        };
        self.arms
            .iter()
            .find(|a| a.serialized_name == tag)
            .map(|a| (a, payload))
    }

    fn arm_state(&self, s: &UnionState, arm: &VArm<R>) -> Rc<EditorState> {
        s.arms
            .get(&arm.name)
            .cloned()
            .unwrap_or_else(|| Rc::new(arm.veditor.initial_state()))
    }

    fn selected<'a>(&'a self, s: &UnionState) -> Option<&'a VArm<R>> {
        s.selected.as_deref().and_then(|name| self.arm(name))
    }
}

impl<R> VEditor<R> for UnionVEditor<R> {
    fn initial_state(&self) -> EditorState {
        EditorState::Union(UnionState {
            selected: None,
            arms: BTreeMap::new(),
        })
    }

    fn state_from_value(&self, value: &Value) -> EditorState {
        match self.split_value(value) {
            Some((arm, payload)) => {
                let mut arms = BTreeMap::new();
                arms.insert(arm.name.clone(), Rc::new(arm.veditor.state_from_value(payload)));
                EditorState::Union(UnionState {
                    selected: Some(arm.name.clone()),
                    arms,
                })
            }
            None => {
                log::warn!("'{}' is not a value of {}", value, self.type_expr);
                self.initial_state()
            }
        }
    }

    fn validate(&self, state: &EditorState) -> Vec<String> {
        let EditorState::Union(s) = state else {
            return unexpected_state("union", state).0;
        };
        match self.selected(s) {
            Some(arm) => arm.veditor.validate(&self.arm_state(s, arm)),
            None => vec![NO_ARM_SELECTED.to_string()],
        }
    }

    fn value_from_state(&self, state: &EditorState) -> Validated<Value> {
        let EditorState::Union(s) = state else {
            return Err(unexpected_state("union", state));
        };
        let arm = self.selected(s).ok_or_else(|| Invalid::one(NO_ARM_SELECTED))?;
        let payload = arm.veditor.value_from_state(&self.arm_state(s, arm))?;
        if arm.is_void {
            return Ok(Value::String(arm.serialized_name.clone()));
        }
        let mut out = Map::new();
        out.insert(arm.serialized_name.clone(), payload);
        Ok(Value::Object(out))
    }

    /// Arm states survive switching to another arm and back.
    fn update(&self, state: &EditorState, event: EditorEvent) -> EditorState {
        let EditorState::Union(s) = state else {
            return ignore_event("union", state, &event);
        };
        match event {
            EditorEvent::SelectArm(None) => EditorState::Union(UnionState {
                selected: None,
                arms: s.arms.clone(),
            }),
            EditorEvent::SelectArm(Some(name)) => {
                let Some(arm) = self.arm(&name) else {
                    log::warn!("{} has no arm '{}'", self.type_expr, name);
                    return state.clone();
                };
                let mut arms = s.arms.clone();
                arms.entry(arm.name.clone())
                    .or_insert_with(|| Rc::new(arm.veditor.initial_state()));
                EditorState::Union(UnionState {
                    selected: Some(arm.name.clone()),
                    arms,
                })
            }
            EditorEvent::UpdateArm(child_event) => {
                let Some(arm) = self.selected(s) else {
                    return state.clone();
                };
                let updated = arm.veditor.update(&self.arm_state(s, arm), *child_event);
                let mut arms = s.arms.clone();
                arms.insert(arm.name.clone(), Rc::new(updated));
                EditorState::Union(UnionState {
                    selected: s.selected.clone(),
                    arms,
                })
            }
            other => ignore_event("union", state, &other),
        }
    }

    fn render(&self, state: &EditorState, disabled: bool, on_update: UpdateFn) -> R {
        let (selected, rendered) = match state {
            EditorState::Union(s) => match self.selected(s) {
                Some(arm) => {
                    let child_update = nested_update(&on_update, EditorEvent::update_arm);
                    let rendered = arm
                        .veditor
                        .render(&self.arm_state(s, arm), disabled, child_update);
                    (Some(arm.name.clone()), Some(rendered))
                }
                None => (None, None),
            },
            _ => (None, None),
        };
        self.renderer.render_union(UnionProps {
            type_expr: self.type_expr.clone(),
            arms: self
                .arms
                .iter()
                .map(|a| ArmChoice {
                    name: a.name.clone(),
                    label: a.label.clone(),
                })
                .collect(),
            selected,
            rendered,
            disabled,
            on_update,
        })
    }
}
