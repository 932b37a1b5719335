//! Derives editors for the demo schema in fixtures/ and checks the editor
//! laws end to end: round trips, structural sharing, splices, arm memory
//! and customization order.

use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde_json::{json, Value};
use veditor_ast::{DeclResolver, Resolver, TypeExpr};
use veditor_core::veditor::field::field_veditor;
use veditor_core::{
    adl_table_info, create_veditor, fields, ui_factory, EditorEvent, EditorState, Factory,
    JsonBinding, JsonBindingError, OutlineRenderer, UVEditor,
};

fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../..")
}

fn read_json(name: &str) -> Value {
    let path = workspace_root().join("fixtures").join(name);
    let text = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("failed to read {}: {}", path.display(), e));
    serde_json::from_str(&text).unwrap()
}

fn demo_resolver() -> Rc<dyn DeclResolver> {
    Rc::new(Resolver::from_adl_json(&read_json("demo.adl.json")).unwrap())
}

fn texpr(text: &str) -> TypeExpr {
    text.parse().unwrap()
}

fn derive(type_expr: &str) -> UVEditor<String> {
    let factory = Factory::new(Rc::new(OutlineRenderer));
    create_veditor(texpr(type_expr), demo_resolver(), &factory)
}

fn person(name: &str) -> Value {
    json!({
        "name": name,
        "age": 33,
        "email": "nothing",
        "address": {"street": "3 Mid St", "city": "Hobart", "postcode": null},
        "tags": ["new"]
    })
}

#[test]
fn team_round_trips_through_its_editor() {
    let ed = derive("demo.Team");
    let team = read_json("team.json");
    let state = ed.state_from_value(&team);
    assert_eq!(ed.validate(&state), Vec::<String>::new());

    // ByteVector has no editor, so logo comes back as null
    let mut expected = team.clone();
    expected["logo"] = Value::Null;
    assert_eq!(ed.value_from_state(&state), Ok(expected));
}

#[test]
fn recursive_type_round_trips() {
    let ed = derive("demo.Tree");
    let tree = json!({
        "value": 1,
        "children": [
            {"value": 2, "children": [{"value": 3, "children": []}]},
            {"value": 4, "children": []}
        ]
    });
    assert_eq!(ed.value_from_state(&ed.state_from_value(&tree)), Ok(tree));
}

#[test]
fn struct_update_keeps_other_fields() {
    let ed = derive("demo.Team");
    let before = ed.state_from_value(&read_json("team.json"));
    let after = ed.update(
        &before,
        EditorEvent::field("name", EditorEvent::set_text("Infra")),
    );
    for untouched in ["members", "lead", "shapes", "scores"] {
        assert!(
            Rc::ptr_eq(
                before.field(untouched).unwrap(),
                after.field(untouched).unwrap()
            ),
            "{} was rebuilt",
            untouched
        );
    }
    assert_eq!(
        after.field("name").map(|s| (**s).clone()),
        Some(EditorState::text("Infra"))
    );
}

#[test]
fn splice_matches_list_splice() {
    let ed = derive("demo.Team");
    let team = read_json("team.json");
    let state = ed.state_from_value(&team);

    let inserted = ed.update(
        &state,
        EditorEvent::field("members", EditorEvent::splice(0, 0, vec![person("Cat")])),
    );
    let value = ed.value_from_state(&inserted).unwrap();
    assert_eq!(value["members"][0], person("Cat"));
    assert_eq!(value["members"][1], team["members"][0]);

    let replaced = ed.update(
        &inserted,
        EditorEvent::field("members", EditorEvent::splice(1, 1, vec![person("Dan")])),
    );
    let value = ed.value_from_state(&replaced).unwrap();
    assert_eq!(value["members"], json!([person("Cat"), person("Dan")]));

    let cleared = ed.update(
        &replaced,
        EditorEvent::field("members", EditorEvent::splice(0, 99, vec![])),
    );
    assert_eq!(ed.value_from_state(&cleared).unwrap()["members"], json!([]));
}

#[test]
fn union_remembers_arm_states() {
    let ed = derive("demo.Shape");
    let s = ed.update(&ed.initial_state(), EditorEvent::select_arm("rect"));
    let s = ed.update(
        &s,
        EditorEvent::update_arm(EditorEvent::field("width", EditorEvent::set_text("4"))),
    );
    let s = ed.update(&s, EditorEvent::select_arm("circle"));
    let s = ed.update(&s, EditorEvent::update_arm(EditorEvent::set_text("1.5")));
    assert_eq!(ed.value_from_state(&s), Ok(json!({"circle": 1.5})));

    let s = ed.update(&s, EditorEvent::select_arm("rect"));
    assert_eq!(ed.validate(&s), vec!["height: must be a number".to_string()]);
    let s = ed.update(
        &s,
        EditorEvent::update_arm(EditorEvent::field("height", EditorEvent::set_text("2"))),
    );
    assert_eq!(
        ed.value_from_state(&s),
        Ok(json!({"rect": {"width": 4, "height": 2}}))
    );

    let s = ed.update(&s, EditorEvent::select_arm("empty"));
    assert_eq!(ed.value_from_state(&s), Ok(json!("empty")));
}

#[test]
fn nullable_toggle_restores_last_value() {
    let ed = derive("demo.Address");
    let postcode = |event| EditorEvent::field("postcode", event);
    let s = ed.state_from_value(&json!({"street": "s", "city": "c", "postcode": null}));

    let s = ed.update(&s, postcode(EditorEvent::TogglePresent));
    assert_eq!(ed.value_from_state(&s).unwrap()["postcode"], json!(""));
    let s = ed.update(
        &s,
        postcode(EditorEvent::update_underlying(EditorEvent::set_text("6000"))),
    );
    let s = ed.update(&s, postcode(EditorEvent::TogglePresent));
    assert_eq!(ed.value_from_state(&s).unwrap()["postcode"], Value::Null);
    let s = ed.update(&s, postcode(EditorEvent::TogglePresent));
    assert_eq!(ed.value_from_state(&s).unwrap()["postcode"], json!("6000"));
}

#[test]
fn optional_scalars_collapse_to_fields() {
    let ed = derive("demo.Team");
    let s = ed.state_from_value(&read_json("team.json"));
    // Nullable<Int64>: "" is not an integer, so "" means null
    assert_eq!(
        s.field("budget").map(|s| (**s).clone()),
        Some(EditorState::text(""))
    );
    let s = ed.update(&s, EditorEvent::field("budget", EditorEvent::set_text("250")));
    assert_eq!(ed.value_from_state(&s).unwrap()["budget"], json!(250));
}

#[test]
fn string_map_duplicate_keys_last_wins() {
    let ed = derive("demo.Team");
    let s = ed.state_from_value(&read_json("team.json"));
    let s = ed.update(
        &s,
        EditorEvent::field(
            "shapes",
            EditorEvent::splice(3, 0, vec![json!({"key": "logo", "value": "empty"})]),
        ),
    );
    let shapes = ed.value_from_state(&s).unwrap()["shapes"].clone();
    assert_eq!(shapes["logo"], json!("empty"));
    assert_eq!(shapes.as_object().unwrap().len(), 3);
}

#[test]
fn customizations_apply_in_registration_order() {
    let team = json!({"code": "plt"});

    // without customizations the regex annotation is not consulted
    let ed = derive("demo.Team");
    let s = ed.state_from_value(&team);
    assert!(!ed
        .validate(&s)
        .iter()
        .any(|e| e.starts_with("code:")));

    let factory: Factory<String> = ui_factory(Rc::new(OutlineRenderer));
    let ed = create_veditor(texpr("demo.Team"), demo_resolver(), &factory);
    let s = ed.state_from_value(&team);
    assert!(ed
        .validate(&s)
        .contains(&"code: must be a 3 letter code".to_string()));

    // the first matching field customization wins
    let mut factory: Factory<String> = Factory::new(Rc::new(OutlineRenderer));
    factory.add_custom_field(|ctx| {
        ctx.type_expr
            .is_reference_to("demo", "Code")
            .then(fields::string_field)
    });
    factory.add_custom_field(|ctx| {
        ctx.type_expr
            .is_reference_to("demo", "Code")
            .then(|| fields::int_field(None, None))
    });
    let ed = create_veditor(texpr("demo.Team"), demo_resolver(), &factory);
    let s = ed.state_from_value(&team);
    assert!(!ed.validate(&s).iter().any(|e| e.starts_with("code:")));

    // editor customizations are consulted before field customizations
    factory.add_custom_veditor(|ctx, factory| {
        ctx.type_expr.is_reference_to("demo", "Code").then(|| {
            field_veditor(fields::int_field(None, None), Rc::clone(factory.renderer()))
        })
    });
    let ed = create_veditor(texpr("demo.Team"), demo_resolver(), &factory);
    let s = ed.state_from_value(&team);
    assert!(ed
        .validate(&s)
        .contains(&"code: must be an integer".to_string()));
}

#[test]
fn person_table_columns() {
    let info = adl_table_info(demo_resolver(), texpr("demo.Person"), None).unwrap();
    let labels: Vec<_> = info.columns.iter().map(|c| c.label.as_str()).collect();
    assert_eq!(labels, vec!["Name", "Age", "Email"]);
    let row = person("Eve");
    assert_eq!(info.column("email").unwrap().cell_text(&row), "");
}

#[test]
fn json_binding_rejects_bad_team() {
    let binding = JsonBinding::new(texpr("demo.Team"), demo_resolver());
    assert!(binding.from_json(&read_json("team.json")).is_ok());
    let err = binding.from_json(&read_json("team_invalid.json")).unwrap_err();
    assert!(
        matches!(err, JsonBindingError::UnknownArm { ref arm, .. } if arm == "purple"),
        "unexpected error: {}",
        err
    );
}
