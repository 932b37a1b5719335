//! veditor-ast: ADL abstract syntax, declaration loading and resolution.
//!
//! Provides typed structs for ADL declarations and type expressions, a
//! single `from_adl_json()` entry point that reads the ADL AST JSON emitted
//! by the ADL compiler, and the [`DeclResolver`] lookup consumed by the
//! editor derivation engine in `veditor-core`.

pub mod deserialize;
pub mod parse;
pub mod resolver;
pub mod sys_types;
pub mod types;

pub use deserialize::{from_adl_json, AstError};
pub use resolver::{DeclResolver, Resolver};
pub use types::*;
