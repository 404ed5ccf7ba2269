//! Generation context threaded through the pipeline.
//!
//! The context is owned by the driving sequence and passed by replacement
//! between stages; generators read it and return artifacts, they never hold a
//! reference across invocations or mutate the IR.

use std::path::PathBuf;

use crate::ir::InterfaceIR;

/// How an artifact is combined with whatever exists at its target path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStrategy {
    /// Write only when no file exists at the path.
    CreateIfAbsent,
    /// Replace file content unconditionally (regenerable artifacts).
    AlwaysOverwrite,
    /// Merge: append only symbols missing from the existing file.
    AppendMissingSymbols,
    /// Discard the whole artifact when a file already exists.
    SkipIfExists,
}

/// One generated output file, accumulated in the context until the write
/// phase.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub path: PathBuf,
    pub content: String,
    pub strategy: WriteStrategy,
    /// Name of the generator that produced the artifact, for error reports.
    pub producer: String,
}

/// Where the run reads from and writes to.
#[derive(Debug, Clone)]
pub struct SourceLocation {
    /// Directory holding the hand-written service sources.
    pub source_dir: PathBuf,
    /// Root directory generated artifacts are placed under.
    pub output_dir: PathBuf,
    /// Import path of the service package (used in qualified references).
    pub import_path: String,
    /// Short package name of the service package.
    pub package_name: String,
    /// Overwrite artifacts that are normally skipped when present.
    pub force: bool,
}

/// State threaded through the generator sequence.
#[derive(Debug)]
pub struct GenerationContext {
    pub ir: InterfaceIR,
    pub location: SourceLocation,
    pub artifacts: Vec<Artifact>,
}

impl GenerationContext {
    pub fn new(ir: InterfaceIR, location: SourceLocation) -> Self {
        GenerationContext {
            ir,
            location,
            artifacts: Vec::new(),
        }
    }
}
