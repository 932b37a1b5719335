//! The rendering and customization provider consulted during derivation.

use serde_json::Value;
use std::rc::Rc;

use veditor_ast::{DeclResolver, Field, ScopedDecl, TypeExpr};

use super::{EditorEvent, UVEditor, UpdateFn};
use crate::fields::UFieldFns;
use crate::table::AdlColumn;

// ── Render props ────────────────────────────────────────────────────

/// A leaf text field.
pub struct FieldProps {
    pub fns: UFieldFns,
    pub text: String,
    pub error: Option<String>,
    pub disabled: bool,
    pub on_update: UpdateFn,
}

pub struct StructFieldProps<R> {
    pub name: String,
    pub label: String,
    pub rendered: R,
}

pub struct StructProps<R> {
    pub type_expr: TypeExpr,
    pub fields: Vec<StructFieldProps<R>>,
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArmChoice {
    pub name: String,
    pub label: String,
}

pub struct UnionProps<R> {
    pub type_expr: TypeExpr,
    pub arms: Vec<ArmChoice>,
    pub selected: Option<String>,
    /// The selected arm's editor, if an arm is selected.
    pub rendered: Option<R>,
    pub disabled: bool,
    pub on_update: UpdateFn,
}

pub struct NullableProps<R> {
    pub type_expr: TypeExpr,
    pub present: bool,
    /// The underlying editor, if present.
    pub rendered: Option<R>,
    pub disabled: bool,
    pub on_update: UpdateFn,
}

pub struct VectorItem<R> {
    /// The element's value, when its state is valid.
    pub value: Option<Value>,
    pub rendered: R,
}

/// List editing is expressed only through splices. The helpers below build
/// the splice for each common list operation.
pub struct VectorProps<R> {
    pub type_expr: TypeExpr,
    pub items: Vec<VectorItem<R>>,
    /// Table columns when the element type is a struct, else empty.
    pub columns: Vec<AdlColumn>,
    pub disabled: bool,
    pub on_update: UpdateFn,
}

impl<R> VectorProps<R> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn values(&self) -> Vec<Option<&Value>> {
        self.items.iter().map(|item| item.value.as_ref()).collect()
    }

    pub fn splice(&self, index: usize, delete: usize, insert: Vec<Value>) {
        (self.on_update)(EditorEvent::splice(index, delete, insert));
    }

    pub fn insert_after(&self, index: Option<usize>, value: Value) {
        let at = index.map(|i| i + 1).unwrap_or(0);
        self.splice(at, 0, vec![value]);
    }

    pub fn append(&self, value: Value) {
        self.splice(self.len(), 0, vec![value]);
    }

    pub fn replace(&self, index: usize, value: Value) {
        self.splice(index, 1, vec![value]);
    }

    pub fn delete(&self, index: usize) {
        self.splice(index, 1, Vec::new());
    }

    /// False at the top, or while either element is invalid.
    pub fn can_move_up(&self, index: usize) -> bool {
        index > 0 && self.swap_values(index - 1).is_some()
    }

    pub fn can_move_down(&self, index: usize) -> bool {
        self.swap_values(index).is_some()
    }

    pub fn move_up(&self, index: usize) {
        if index > 0 {
            self.swap(index - 1);
        }
    }

    pub fn move_down(&self, index: usize) {
        self.swap(index);
    }

    fn swap_values(&self, index: usize) -> Option<Vec<Value>> {
        let a = self.items.get(index)?.value.clone()?;
        let b = self.items.get(index + 1)?.value.clone()?;
        Some(vec![b, a])
    }

    fn swap(&self, index: usize) {
        if let Some(swapped) = self.swap_values(index) {
            self.splice(index, 2, swapped);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnimplementedProps {
    pub type_expr: TypeExpr,
}

/// Produces the display delegate for each editor shape.
pub trait Renderer<R> {
    fn render_void(&self) -> R;
    fn render_field(&self, props: FieldProps) -> R;
    fn render_struct(&self, props: StructProps<R>) -> R;
    fn render_union(&self, props: UnionProps<R>) -> R;
    fn render_nullable(&self, props: NullableProps<R>) -> R;
    fn render_vector(&self, props: VectorProps<R>) -> R;
    fn render_unimplemented(&self, props: UnimplementedProps) -> R;
}

// ── Customization ───────────────────────────────────────────────────

/// Where in a schema an editor is being derived.
#[derive(Clone)]
pub struct CustomContext {
    pub resolver: Rc<dyn DeclResolver>,
    /// The struct or union declaring the field being derived, if any.
    pub scoped_decl: Option<Rc<ScopedDecl>>,
    pub field: Option<Field>,
    pub type_expr: TypeExpr,
}

impl std::fmt::Debug for CustomContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomContext")
            .field(
                "scoped_decl",
                &self.scoped_decl.as_ref().map(|sd| sd.scoped_name()),
            )
            .field("field", &self.field.as_ref().map(|f| &f.name))
            .field("type_expr", &self.type_expr.to_string())
            .finish()
    }
}

pub type VEditorCustomize<R> = Box<dyn Fn(&CustomContext, &Factory<R>) -> Option<UVEditor<R>>>;
pub type FieldCustomize = Box<dyn Fn(&CustomContext) -> Option<UFieldFns>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeriveOptions {
    /// Seed struct fields from their declared defaults.
    pub apply_struct_defaults: bool,
}

impl Default for DeriveOptions {
    fn default() -> Self {
        DeriveOptions {
            apply_struct_defaults: true,
        }
    }
}

/// A renderer plus two customization chains, consulted in registration
/// order. The first customization returning `Some` wins.
pub struct Factory<R> {
    renderer: Rc<dyn Renderer<R>>,
    veditor_customize: Vec<VEditorCustomize<R>>,
    field_customize: Vec<FieldCustomize>,
    options: DeriveOptions,
}

impl<R: 'static> Factory<R> {
    pub fn new(renderer: Rc<dyn Renderer<R>>) -> Self {
        Factory {
            renderer,
            veditor_customize: Vec::new(),
            field_customize: Vec::new(),
            options: DeriveOptions::default(),
        }
    }

    pub fn with_options(mut self, options: DeriveOptions) -> Self {
        self.options = options;
        self
    }

    pub fn renderer(&self) -> &Rc<dyn Renderer<R>> {
        &self.renderer
    }

    pub fn options(&self) -> DeriveOptions {
        self.options
    }

    pub fn add_custom_veditor(
        &mut self,
        customize: impl Fn(&CustomContext, &Factory<R>) -> Option<UVEditor<R>> + 'static,
    ) {
        self.veditor_customize.push(Box::new(customize));
    }

    pub fn add_custom_field(
        &mut self,
        customize: impl Fn(&CustomContext) -> Option<UFieldFns> + 'static,
    ) {
        self.field_customize.push(Box::new(customize));
    }

    pub fn get_custom_veditor(&self, ctx: &CustomContext) -> Option<UVEditor<R>> {
        self.veditor_customize.iter().find_map(|c| c(ctx, self))
    }

    pub fn get_custom_field(&self, ctx: &CustomContext) -> Option<UFieldFns> {
        self.field_customize.iter().find_map(|c| c(ctx))
    }
}
