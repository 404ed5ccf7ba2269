//! Generation pipeline for microservice boilerplate.
//!
//! The crate turns an annotated interface declaration into a set of source
//! artifacts: cross-cutting decorators, a JSON-RPC transport binding, stub
//! implementations, and type-conversion scaffolding. The flow:
//!
//! 1. `ir` extracts and validates the normalized interface representation
//!    from externally parsed declarations;
//! 2. `pipeline` runs the configured generator sequence over a shared
//!    context, isolating per-generator faults;
//! 3. `generators` hold the built-in generator implementations, building
//!    output through the neutral declaration tree in `gocode`;
//! 4. `merge` reconciles append-class artifacts with existing files without
//!    duplicating symbols or touching hand-written code;
//! 5. `sink` performs the final sequential writes (or a dry run).

pub mod generators;
pub mod gocode;
pub mod ir;
pub mod merge;
pub mod pipeline;
pub mod sink;
pub mod strings;

pub use ir::{InterfaceIR, extract_interface, parse_decl_file, validate_interface};
pub use pipeline::{
    Artifact, GenerationContext, Generator, GeneratorArgs, GeneratorSpec, Registry,
    SourceLocation, WriteStrategy,
};
pub use sink::{report_dry_run, write_artifacts};
