//! veditor-core: value editors derived from ADL types.
//!
//! Given a type expression and a [`DeclResolver`](veditor_ast::DeclResolver),
//! [`create_veditor()`] builds an editor for values of that type by walking
//! the type's [`AdlTree`]. Editors are renderer-agnostic: a [`Renderer`]
//! turns each editor shape into the host's display type.
//!
//! # Public API
//!
//! - [`AdlTree`] -- lazily resolved structure of a type expression
//! - [`FieldFns`] -- text fields for primitives and annotated strings
//! - [`VEditor`] -- the editor contract; [`Factory`] holds the renderer and
//!   customizations consulted during derivation
//! - [`mapped_veditor()`] -- an editor re-expressed over an isomorphic type
//! - [`JsonBinding`] -- checks JSON against a type
//! - [`FormState`] -- a whole-value form with raw JSON mode and host
//!   validation
//! - [`OutlineRenderer`] -- plain-text rendering

pub mod adl_tree;
pub mod annotations;
pub mod fields;
pub mod form;
pub mod ids;
pub mod json;
pub mod outline;
pub mod table;
pub mod veditor;

#[cfg(test)]
mod test_support;

// ── Convenience re-exports ───────────────────────────────────────────

pub use adl_tree::{AdlTree, AdlTreeDetails, TreeError};
pub use fields::{FieldFns, FieldState, UFieldFns};
pub use form::{FormState, FormValidation, FormValidator, Mode, ValidationOutcome};
pub use ids::IdSource;
pub use json::{JsonBinding, JsonBindingError};
pub use outline::OutlineRenderer;
pub use table::{adl_table_info, AdlColumn, AdlTableInfo, TableError};
pub use veditor::customize::ui_factory;
pub use veditor::{
    create_veditor, create_veditor_from_tree, mapped_veditor, CustomContext, DeriveOptions,
    EditorEvent, EditorState, Factory, Invalid, Renderer, UVEditor, VEditor, Validated,
};
