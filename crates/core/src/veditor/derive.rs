//! Derivation of an editor from an ADL type.
//!
//! At each node of the type's [`AdlTree`] the factory's customizations are
//! consulted first: a custom editor is used as is, a custom field is wrapped
//! in a field editor. Otherwise an editor is built from the node's shape,
//! recursing into children. Derivation always produces an editor. Shapes
//! with no editor (and schema errors) become the unimplemented editor.
//!
//! A type met again inside its own derivation, in the same context, gets a
//! [`recursive_veditor`] pointing back at the outer editor, so recursive
//! declarations yield a finite editor.

use serde_json::{Map, Value};
use std::cell::{OnceCell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use veditor_ast::{sys_types, DeclResolver, Field, ScopedDecl, ScopedName, TypeExpr};

use super::factory::{CustomContext, Factory};
use super::field::field_veditor;
use super::mapped::mapped_veditor;
use super::nullable::nullable_veditor;
use super::recursive::{recursive_veditor, RecursionTarget};
use super::struct_::{struct_veditor, VField};
use super::union::{union_veditor, VArm};
use super::unimplemented::{unimplemented_veditor, void_veditor};
use super::vector::vector_veditor;
use super::UVEditor;
use crate::adl_tree::{AdlTree, AdlTreeDetails, DeclNode};
use crate::annotations::field_label;
use crate::fields::{adl_primitive_field_fns, maybe_field, nullable_field, UFieldFns};
use crate::json::is_void;
use crate::table::{columns_for, is_maybe};

/// Derive an editor for values of `type_expr`.
pub fn create_veditor<R: 'static>(
    type_expr: TypeExpr,
    resolver: Rc<dyn DeclResolver>,
    factory: &Factory<R>,
) -> UVEditor<R> {
    let tree = AdlTree::new(type_expr, resolver);
    create_veditor_from_tree(&tree, factory)
}

/// Derive an editor for an existing tree.
pub fn create_veditor_from_tree<R: 'static>(tree: &AdlTree, factory: &Factory<R>) -> UVEditor<R> {
    let deriver = Deriver {
        resolver: Rc::clone(tree.resolver()),
        factory,
        in_progress: RefCell::new(HashMap::new()),
    };
    deriver.derive(&Enclosing::default(), tree)
}

/// The struct or union field being derived, if any.
#[derive(Clone, Default)]
struct Enclosing {
    scoped_decl: Option<Rc<ScopedDecl>>,
    field: Option<Field>,
}

impl Enclosing {
    fn field_of(node: &DeclNode, field: &Field) -> Self {
        Enclosing {
            scoped_decl: Some(Rc::clone(&node.scoped_decl)),
            field: Some(field.clone()),
        }
    }
}

/// Identifies one derivation: customizations see the type and its
/// enclosing field, so both must match for the editors to be the same.
#[derive(Clone, PartialEq, Eq, Hash)]
struct DeriveKey {
    type_expr: TypeExpr,
    decl: Option<ScopedName>,
    field: Option<String>,
}

impl DeriveKey {
    fn new(enc: &Enclosing, type_expr: &TypeExpr) -> Self {
        DeriveKey {
            type_expr: type_expr.clone(),
            decl: enc.scoped_decl.as_ref().map(|sd| sd.scoped_name()),
            field: enc.field.as_ref().map(|f| f.name.clone()),
        }
    }
}

struct Deriver<'a, R> {
    resolver: Rc<dyn DeclResolver>,
    factory: &'a Factory<R>,
    in_progress: RefCell<HashMap<DeriveKey, RecursionTarget<R>>>,
}

impl<R: 'static> Deriver<'_, R> {
    fn context(&self, enc: &Enclosing, type_expr: &TypeExpr) -> CustomContext {
        CustomContext {
            resolver: Rc::clone(&self.resolver),
            scoped_decl: enc.scoped_decl.clone(),
            field: enc.field.clone(),
            type_expr: type_expr.clone(),
        }
    }

    fn field(&self, fns: UFieldFns) -> UVEditor<R> {
        field_veditor(fns, Rc::clone(self.factory.renderer()))
    }

    fn unimplemented(&self, type_expr: &TypeExpr) -> UVEditor<R> {
        unimplemented_veditor(type_expr.clone(), Rc::clone(self.factory.renderer()))
    }

    fn derive(&self, enc: &Enclosing, tree: &AdlTree) -> UVEditor<R> {
        let type_expr = tree.type_expr();
        let key = DeriveKey::new(enc, type_expr);
        let pending = self.in_progress.borrow().get(&key).cloned();
        if let Some(target) = pending {
            log::debug!("{} refers back to itself", type_expr);
            return recursive_veditor(
                type_expr.clone(),
                target,
                Rc::clone(self.factory.renderer()),
            );
        }

        let target: RecursionTarget<R> = Rc::new(OnceCell::new());
        self.in_progress
            .borrow_mut()
            .insert(key.clone(), Rc::clone(&target));
        let veditor = self.derive_node(enc, tree);
        self.in_progress.borrow_mut().remove(&key);
        let _ = target.set(Rc::downgrade(&veditor));
        veditor
    }

    fn derive_node(&self, enc: &Enclosing, tree: &AdlTree) -> UVEditor<R> {
        let type_expr = tree.type_expr();
        let ctx = self.context(enc, type_expr);

        if let Some(veditor) = self.factory.get_custom_veditor(&ctx) {
            log::debug!("custom editor for {}", type_expr);
            return veditor;
        }
        if let Some(fns) = self.factory.get_custom_field(&ctx) {
            log::debug!("custom field for {}", type_expr);
            return self.field(fns);
        }

        let details = match tree.details() {
            Ok(details) => details,
            Err(e) => {
                log::warn!("no editor for {}: {}", type_expr, e);
                return self.unimplemented(type_expr);
            }
        };
        let renderer = Rc::clone(self.factory.renderer());

        match details {
            AdlTreeDetails::Primitive(p) if p == "Void" => void_veditor(renderer),
            AdlTreeDetails::Primitive(p) => match self.create_field(enc, tree) {
                Some(fns) => self.field(fns),
                None => {
                    log::warn!("no field for primitive {}", p);
                    self.unimplemented(type_expr)
                }
            },
            AdlTreeDetails::Struct(node) => {
                let apply_defaults = self.factory.options().apply_struct_defaults;
                let fields = node
                    .fields
                    .iter()
                    .map(|f| VField {
                        name: f.field.name.clone(),
                        serialized_name: f.field.serialized_name.clone(),
                        label: field_label(&f.field),
                        default: f.field.default.clone().filter(|_| apply_defaults),
                        veditor: self.derive(&Enclosing::field_of(node, &f.field), &f.tree),
                    })
                    .collect();
                struct_veditor(type_expr.clone(), fields, renderer)
            }
            AdlTreeDetails::NewType(_)
                if type_expr.is_reference_to(sys_types::MODULE, "Map") =>
            {
                self.map_veditor(enc, type_expr)
            }
            AdlTreeDetails::NewType(alias) | AdlTreeDetails::TypeDef(alias) => {
                self.derive(enc, &alias.tree)
            }
            AdlTreeDetails::Union(node) => {
                // Maybe<T> is a single text field when T has one and empty
                // text is not a valid T: "" then reads as nothing.
                if is_maybe(tree) {
                    if let Some(just) = node.fields.iter().find(|f| f.field.name == "just") {
                        if let Some(fns) = self.create_field(enc, &just.tree) {
                            if fns.validate("").is_some() {
                                log::debug!("{} edited as a text field", type_expr);
                                return self.field(maybe_field(fns));
                            }
                        }
                    }
                }
                let arms = node
                    .fields
                    .iter()
                    .map(|f| VArm {
                        name: f.field.name.clone(),
                        serialized_name: f.field.serialized_name.clone(),
                        label: field_label(&f.field),
                        is_void: is_void(&f.tree),
                        veditor: self.derive(&Enclosing::field_of(node, &f.field), &f.tree),
                    })
                    .collect();
                union_veditor(type_expr.clone(), arms, renderer)
            }
            AdlTreeDetails::Nullable(inner) => {
                if let Some(fns) = self.create_field(enc, inner) {
                    if fns.validate("").is_some() {
                        log::debug!("{} edited as a text field", type_expr);
                        return self.field(nullable_field(fns));
                    }
                }
                let underlying = self.derive(enc, inner);
                nullable_veditor(type_expr.clone(), underlying, renderer)
            }
            AdlTreeDetails::Vector(element) => {
                let custom_field = |ctx: &CustomContext| self.factory.get_custom_field(ctx);
                let columns = columns_for(element, Some(&custom_field));
                let element_veditor = self.derive(enc, element);
                vector_veditor(type_expr.clone(), element_veditor, columns, renderer)
            }
            AdlTreeDetails::StringMap(_) => self.string_map_veditor(enc, type_expr),
        }
    }

    /// A text field for `tree`: a custom field, a primitive's field, or
    /// either of those after following aliases and newtypes.
    fn create_field(&self, enc: &Enclosing, tree: &AdlTree) -> Option<UFieldFns> {
        self.create_field1(enc, tree).or_else(|| {
            let resolved = tree.resolve(true, true);
            if std::ptr::eq(resolved, tree) {
                None
            } else {
                self.create_field1(enc, resolved)
            }
        })
    }

    fn create_field1(&self, enc: &Enclosing, tree: &AdlTree) -> Option<UFieldFns> {
        let ctx = self.context(enc, tree.type_expr());
        if let Some(fns) = self.factory.get_custom_field(&ctx) {
            return Some(fns);
        }
        match tree.details() {
            Ok(AdlTreeDetails::Primitive(p)) => adl_primitive_field_fns(p),
            _ => None,
        }
    }

    /// An editor for `Vector<sys.types.MapEntry<K,V>>`.
    fn map_entry_vector(&self, enc: &Enclosing, key: TypeExpr, value: TypeExpr) -> UVEditor<R> {
        let tree = AdlTree::new(
            TypeExpr::vector(sys_types::texpr_map_entry(key, value)),
            Rc::clone(&self.resolver),
        );
        self.derive(enc, &tree)
    }

    /// `sys.types.Map<K,V>` is a newtype over `Vector<Pair<K,V>>`. It is
    /// edited as a list of key/value entries.
    fn map_veditor(&self, enc: &Enclosing, type_expr: &TypeExpr) -> UVEditor<R> {
        let [key, value] = type_expr.parameters.as_slice() else {
            log::warn!("{} needs two type arguments", type_expr);
            return self.unimplemented(type_expr);
        };
        mapped_veditor(
            self.map_entry_vector(enc, key.clone(), value.clone()),
            |pairs| rename_members(pairs, ("v1", "key"), ("v2", "value")),
            |entries| rename_members(entries, ("key", "v1"), ("value", "v2")),
        )
    }

    /// `StringMap<V>` is edited as a list of `MapEntry<String,V>`. When keys
    /// repeat, the last entry wins on conversion back to a map.
    fn string_map_veditor(&self, enc: &Enclosing, type_expr: &TypeExpr) -> UVEditor<R> {
        let Some(value) = type_expr.parameters.first() else {
            return self.unimplemented(type_expr);
        };
        mapped_veditor(
            self.map_entry_vector(enc, TypeExpr::string(), value.clone()),
            entries_from_string_map,
            string_map_from_entries,
        )
    }
}

fn rename_members(items: &Value, a: (&str, &str), b: (&str, &str)) -> Value {
    let Some(items) = items.as_array() else {
        return items.clone();
    };
    Value::Array(
        items
            .iter()
            .map(|item| {
                let mut out = Map::new();
                for (from, to) in [a, b] {
                    if let Some(v) = item.get(from) {
                        out.insert(to.to_string(), v.clone());
                    }
                }
                Value::Object(out)
            })
            .collect(),
    )
}

fn entries_from_string_map(map: &Value) -> Value {
    let Some(map) = map.as_object() else {
        return Value::Array(Vec::new());
    };
    Value::Array(
        map.iter()
            .map(|(k, v)| {
                let mut entry = Map::new();
                entry.insert("key".to_string(), Value::String(k.clone()));
                entry.insert("value".to_string(), v.clone());
                Value::Object(entry)
            })
            .collect(),
    )
}

fn string_map_from_entries(entries: &Value) -> Value {
    let mut out = Map::new();
    for entry in entries.as_array().into_iter().flatten() {
        if let (Some(Value::String(k)), Some(v)) = (entry.get("key"), entry.get("value")) {
            out.insert(k.clone(), v.clone());
        }
    }
    Value::Object(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline::OutlineRenderer;
    use crate::test_support::*;
    use crate::veditor::{EditorEvent, EditorState, Invalid};
    use serde_json::json;

    fn derive(type_expr: &str) -> UVEditor<String> {
        let factory = Factory::new(Rc::new(OutlineRenderer));
        create_veditor(texpr(type_expr), examples_resolver(), &factory)
    }

    #[test]
    fn test_maybe_scalar_collapses_to_field() {
        let ed = derive("sys.types.Maybe<Int32>");
        assert_eq!(ed.initial_state(), EditorState::text(""));
        assert_eq!(ed.value_from_state(&EditorState::text("")), Ok(json!("nothing")));
        assert_eq!(
            ed.value_from_state(&EditorState::text("5")),
            Ok(json!({"just": 5}))
        );
    }

    #[test]
    fn test_maybe_string_stays_a_union() {
        // "" is a valid String, so it cannot also mean nothing
        let ed = derive("sys.types.Maybe<String>");
        assert!(matches!(ed.initial_state(), EditorState::Union(_)));
        let s = ed.state_from_value(&json!({"just": ""}));
        assert_eq!(ed.value_from_state(&s), Ok(json!({"just": ""})));
        let s = ed.state_from_value(&json!("nothing"));
        assert_eq!(ed.value_from_state(&s), Ok(json!("nothing")));
    }

    #[test]
    fn test_nullable_collapse() {
        let ed = derive("Nullable<Int32>");
        assert_eq!(ed.value_from_state(&EditorState::text("")), Ok(Value::Null));
        assert_eq!(ed.state_from_value(&json!(3)), EditorState::text("3"));

        let ed = derive("Nullable<String>");
        assert!(matches!(ed.initial_state(), EditorState::Nullable(_)));
    }

    #[test]
    fn test_aliases_are_transparent() {
        let ed = derive("examples.Owner");
        let s = ed.state_from_value(&json!("u-17"));
        assert_eq!(s, EditorState::text("u-17"));
        assert_eq!(ed.value_from_state(&s), Ok(json!("u-17")));
    }

    #[test]
    fn test_unsupported_primitive_is_unimplemented() {
        let ed = derive("ByteVector");
        let s = ed.state_from_value(&json!("AAEC"));
        assert_eq!(ed.validate(&s), Vec::<String>::new());
        assert_eq!(ed.value_from_state(&s), Ok(Value::Null));
        assert_eq!(ed.render(&s, false, Rc::new(|_| {})), "unimplemented veditor for ByteVector");
    }

    #[test]
    fn test_recursive_decl_derives_finite_editor() {
        let ed = derive("examples.Tree");
        let tree = json!({
            "value": 1,
            "children": [{"value": 2, "children": [{"value": 3, "children": []}]}]
        });
        let s = ed.state_from_value(&tree);
        assert_eq!(ed.value_from_state(&s), Ok(tree));

        // edit the grandchild through the nested editors
        let grandchild = EditorEvent::field(
            "children",
            EditorEvent::update_element(0, EditorEvent::field("value", EditorEvent::set_text("x"))),
        );
        let s = ed.update(
            &s,
            EditorEvent::field("children", EditorEvent::update_element(0, grandchild)),
        );
        assert_eq!(
            ed.validate(&s),
            vec!["children: 0: children: 0: value: must be an integer".to_string()]
        );
    }

    #[test]
    fn test_unknown_decl_is_unimplemented() {
        let ed = derive("examples.DoesNotExist");
        assert_eq!(ed.value_from_state(&ed.initial_state()), Ok(Value::Null));
    }

    #[test]
    fn test_struct_defaults_seed_initial_state() {
        let ed = derive("examples.Person");
        let s = ed.initial_state();
        assert_eq!(s.field("age").map(|s| (**s).clone()), Some(EditorState::text("18")));

        let factory: Factory<String> = Factory::new(Rc::new(OutlineRenderer)).with_options(
            crate::veditor::DeriveOptions {
                apply_struct_defaults: false,
            },
        );
        let ed = create_veditor(texpr("examples.Person"), examples_resolver(), &factory);
        let s = ed.initial_state();
        assert_eq!(s.field("age").map(|s| (**s).clone()), Some(EditorState::text("")));
    }

    #[test]
    fn test_struct_errors_are_aggregated_and_prefixed() {
        let ed = derive("examples.Rect");
        let s = ed.initial_state();
        assert_eq!(
            ed.value_from_state(&s),
            Err(Invalid(vec![
                "width: must be a number".to_string(),
                "height: must be a number".to_string(),
            ]))
        );
        assert_eq!(ed.validate(&s).len(), 2);
    }

    #[test]
    fn test_string_map_round_trip_and_duplicates() {
        let ed = derive("StringMap<Int32>");
        let v = json!({"a": 1, "b": 2});
        let s = ed.state_from_value(&v);
        assert_eq!(ed.value_from_state(&s), Ok(v));

        // a second "a" entry is kept in state and wins on conversion
        let s = ed.update(&s, EditorEvent::splice(2, 0, vec![json!({"key": "a", "value": 9})]));
        let EditorState::Vector(items) = &s else {
            panic!("expected vector state");
        };
        assert_eq!(items.len(), 3);
        assert_eq!(ed.value_from_state(&s), Ok(json!({"a": 9, "b": 2})));
    }

    #[test]
    fn test_sys_map_round_trip() {
        let ed = derive("sys.types.Map<String,Bool>");
        let v = json!([{"v1": "x", "v2": true}, {"v1": "y", "v2": false}]);
        let s = ed.state_from_value(&v);
        let EditorState::Vector(items) = &s else {
            panic!("expected vector state");
        };
        assert_eq!(items[0].field("key").map(|s| (**s).clone()), Some(EditorState::text("x")));
        assert_eq!(ed.value_from_state(&s), Ok(v));
    }

    #[test]
    fn test_custom_veditor_replaces_subtree() {
        let mut factory: Factory<String> = Factory::new(Rc::new(OutlineRenderer));
        factory.add_custom_veditor(|ctx, factory| {
            if ctx.type_expr.is_reference_to("examples", "Rect") {
                Some(crate::veditor::unimplemented::unimplemented_veditor(
                    ctx.type_expr.clone(),
                    Rc::clone(factory.renderer()),
                ))
            } else {
                None
            }
        });
        let ed = create_veditor(texpr("examples.Shape"), examples_resolver(), &factory);
        let s = ed.update(&ed.initial_state(), EditorEvent::select_arm("rect"));
        assert_eq!(ed.value_from_state(&s), Ok(json!({"rect": null})));
    }

    #[test]
    fn test_custom_context_names_enclosing_field() {
        let mut factory: Factory<String> = Factory::new(Rc::new(OutlineRenderer));
        factory.add_custom_field(|ctx| {
            let in_rect = ctx
                .scoped_decl
                .as_ref()
                .map(|sd| sd.decl.name == "Rect")
                .unwrap_or(false);
            let is_height = ctx.field.as_ref().map(|f| f.name == "height").unwrap_or(false);
            (in_rect && is_height).then(|| crate::fields::int_field(Some(0), Some(10)))
        });
        let ed = create_veditor(texpr("examples.Rect"), examples_resolver(), &factory);
        let s = ed.state_from_value(&json!({"width": 100.5, "height": 11}));
        assert_eq!(ed.validate(&s), vec!["height: value too large".to_string()]);
    }
}
