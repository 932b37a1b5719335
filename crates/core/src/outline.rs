//! A plain-text renderer.
//!
//! Renders an editor as an indented outline, one line per leaf:
//!
//! ```text
//! Name: [Ann]
//! Age: [abc]  <- must be an integer
//! Tags:
//!   - [x]
//! ```
//!
//! Used by the command line tool and in tests. The update callbacks in the
//! props are dropped, so the output is a snapshot.

use crate::veditor::{
    FieldProps, NullableProps, Renderer, StructProps, UnimplementedProps, UnionProps,
    VectorProps,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct OutlineRenderer;

const INDENT: &str = "  ";

fn indent(text: &str) -> String {
    text.lines()
        .map(|line| format!("{}{}", INDENT, line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// `label: text` when `text` fits on one line, else `label:` over the
/// indented block.
fn labelled(label: &str, text: &str) -> String {
    if text.is_empty() {
        label.to_string()
    } else if text.contains('\n') {
        format!("{}:\n{}", label, indent(text))
    } else {
        format!("{}: {}", label, text)
    }
}

impl Renderer<String> for OutlineRenderer {
    fn render_void(&self) -> String {
        String::new()
    }

    fn render_field(&self, props: FieldProps) -> String {
        match props.error {
            Some(error) => format!("[{}]  <- {}", props.text, error),
            None => format!("[{}]", props.text),
        }
    }

    fn render_struct(&self, props: StructProps<String>) -> String {
        if props.fields.is_empty() {
            return "{}".to_string();
        }
        props
            .fields
            .iter()
            .map(|f| labelled(&f.label, &f.rendered))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn render_union(&self, props: UnionProps<String>) -> String {
        match (props.selected, props.rendered) {
            (Some(arm), Some(rendered)) => labelled(&arm, &rendered),
            (Some(arm), None) => arm,
            (None, _) => {
                let names: Vec<&str> = props.arms.iter().map(|a| a.name.as_str()).collect();
                format!("(choose: {})", names.join(" | "))
            }
        }
    }

    fn render_nullable(&self, props: NullableProps<String>) -> String {
        props.rendered.unwrap_or_else(|| "null".to_string())
    }

    fn render_vector(&self, props: VectorProps<String>) -> String {
        if props.items.is_empty() {
            return "[]".to_string();
        }
        props
            .items
            .iter()
            .map(|item| {
                let mut lines = item.rendered.lines();
                let first = lines.next().unwrap_or_default();
                let rest: Vec<String> = lines.map(|l| format!("{}{}", INDENT, l)).collect();
                if rest.is_empty() {
                    format!("- {}", first)
                } else {
                    format!("- {}\n{}", first, rest.join("\n"))
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn render_unimplemented(&self, props: UnimplementedProps) -> String {
        format!("unimplemented veditor for {}", props.type_expr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use crate::veditor::{create_veditor, EditorEvent, Factory, UVEditor};
    use serde_json::json;
    use std::rc::Rc;

    fn derive(type_expr: &str) -> UVEditor<String> {
        let factory = Factory::new(Rc::new(OutlineRenderer));
        create_veditor(texpr(type_expr), examples_resolver(), &factory)
    }

    fn render(ed: &UVEditor<String>, value: serde_json::Value) -> String {
        ed.render(&ed.state_from_value(&value), false, Rc::new(|_| {}))
    }

    #[test]
    fn test_struct_outline() {
        let ed = derive("examples.Person");
        let out = render(
            &ed,
            json!({"name": "Ann", "age": 30, "email": "nothing", "tags": ["a", "b"]}),
        );
        assert_eq!(
            out,
            "Name: [Ann]\nAge: [30]\nEmail: nothing\nTags:\n  - [a]\n  - [b]"
        );
    }

    #[test]
    fn test_field_error_shown() {
        let ed = derive("examples.Rect");
        let s = ed.update(
            &ed.state_from_value(&json!({"width": 1, "height": 2})),
            EditorEvent::field("height", EditorEvent::set_text("tall")),
        );
        let out = ed.render(&s, false, Rc::new(|_| {}));
        assert_eq!(out, "Width: [1]\nHeight: [tall]  <- must be a number");
    }

    #[test]
    fn test_union_outline() {
        let ed = derive("examples.Shape");
        assert_eq!(
            ed.render(&ed.initial_state(), false, Rc::new(|_| {})),
            "(choose: circle | rect | empty)"
        );
        assert_eq!(render(&ed, json!("empty")), "empty");
        assert_eq!(render(&ed, json!({"circle": 2.5})), "circle: [2.5]");
        assert_eq!(
            render(&ed, json!({"rect": {"width": 1, "height": 2}})),
            "rect:\n  Width: [1]\n  Height: [2]"
        );
    }

    #[test]
    fn test_nested_vector_items_indent() {
        let ed = derive("Vector<examples.Rect>");
        assert_eq!(render(&ed, json!([])), "[]");
        assert_eq!(
            render(&ed, json!([{"width": 1, "height": 2}])),
            "- Width: [1]\n  Height: [2]"
        );
    }

    #[test]
    fn test_nullable_outline() {
        let ed = derive("Nullable<examples.Rect>");
        assert_eq!(render(&ed, json!(null)), "null");
        assert_eq!(render(&ed, json!({"width": 3, "height": 4})), "Width: [3]\nHeight: [4]");
    }
}
