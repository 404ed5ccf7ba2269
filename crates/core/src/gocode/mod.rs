//! Go code backend: declaration tree, emission, and symbol scanning.
//!
//! The pipeline itself is grammar-agnostic; everything Go-specific lives
//! here:
//!
//! - `types`: the neutral declaration/statement tree generators build
//! - `emit`: tree to source text via the `Emit` trait
//! - `scan`: top-level symbol extraction for the merge resolver

pub mod emit;
pub mod scan;
pub mod types;

pub use emit::Emit;
pub use scan::scan_symbols;
pub use types::{
    GoDecl, GoExpr, GoField, GoFile, GoFunc, GoImport, GoReceiver, GoStmt, GoType,
};
