//! Intermediate representation of the service contract.
//!
//! This module covers the path from externally parsed declarations to the
//! validated IR every generator consumes:
//!
//! - `decl`: serde input model at the parser boundary
//! - `tags`: documentation-line directive extraction
//! - `extract`: interface selection and embedded-interface flattening
//! - `validate`: structural invariants checked before any generation
//! - `types`: the IR itself (field types, methods, directives)

pub mod decl;
pub mod extract;
pub mod tags;
pub mod types;
pub mod validate;

pub use decl::{DeclFile, InterfaceDecl, MethodDecl, parse_decl_file};
pub use extract::{extract_interface, generate_flags};
pub use tags::{DEFAULT_MARKER, GENERATE_KEY, TRACING_VALUE, parse_directives};
pub use types::{
    Directive, Field, FieldType, InterfaceIR, MapType, Method, PackageRef, values_for,
};
pub use validate::validate_interface;
