//! Artifact sink: the final, and only, writing stage.
//!
//! Every prior stage is pure with respect to the file system (aside from
//! read-only `prepare` inspection); this module applies each artifact's
//! write strategy sequentially. There is no cross-file transaction: a fault
//! midway leaves the files written so far on disk, and the operator re-runs
//! the tool, which is safe because appends never duplicate symbols.

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::gocode::scan_symbols;
use crate::merge::append_missing;
use crate::pipeline::{Artifact, WriteStrategy};

/// Write the accumulated artifacts.
///
/// For a path produced by several non-append artifacts the last one wins;
/// append-class artifacts all take part in the merge. Errors are wrapped
/// with the producing generator and path.
pub fn write_artifacts(artifacts: &[Artifact]) -> Result<(), String> {
    for artifact in last_writer_wins(artifacts) {
        write_one(artifact)
            .map_err(|err| {
                format!(
                    "Generator {}: writing {}: {err}",
                    artifact.producer,
                    artifact.path.display()
                )
            })?;
    }
    Ok(())
}

/// Log what a run would write without touching the file system.
pub fn report_dry_run(artifacts: &[Artifact]) {
    for artifact in last_writer_wins(artifacts) {
        info!(
            path = %artifact.path.display(),
            generator = %artifact.producer,
            strategy = ?artifact.strategy,
            bytes = artifact.content.len(),
            "Dry run: artifact not written."
        );
    }
}

/// Keep only the last non-append artifact per path; append-class artifacts
/// are always kept in order.
fn last_writer_wins(artifacts: &[Artifact]) -> Vec<&Artifact> {
    artifacts
        .iter()
        .enumerate()
        .filter(|(i, artifact)| {
            artifact.strategy == WriteStrategy::AppendMissingSymbols
                || !artifacts.iter().skip(i + 1).any(|later| {
                    later.strategy != WriteStrategy::AppendMissingSymbols
                        && later.path == artifact.path
                })
        })
        .map(|(_, artifact)| artifact)
        .collect()
}

fn write_one(artifact: &Artifact) -> Result<(), String> {
    let path = &artifact.path;
    match artifact.strategy {
        WriteStrategy::AlwaysOverwrite => write_file(path, &artifact.content),
        WriteStrategy::CreateIfAbsent => {
            if path.exists() {
                debug!(path = %path.display(), "File exists, create-if-absent artifact skipped.");
                Ok(())
            } else {
                write_file(path, &artifact.content)
            }
        }
        WriteStrategy::SkipIfExists => {
            if path.exists() {
                debug!(path = %path.display(), "File exists, artifact discarded.");
                Ok(())
            } else {
                write_file(path, &artifact.content)
            }
        }
        WriteStrategy::AppendMissingSymbols => {
            if !path.exists() {
                return write_file(path, &artifact.content);
            }
            let existing = fs::read_to_string(path).map_err(|err| format!("read: {err}"))?;
            match append_missing(&existing, &artifact.content, scan_symbols) {
                Some(merged) => write_file(path, &merged),
                None => {
                    debug!(path = %path.display(), "Every symbol already present, nothing appended.");
                    Ok(())
                }
            }
        }
    }
}

fn write_file(path: &Path, content: &str) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| format!("create directory: {err}"))?;
    }
    debug!(path = %path.display(), bytes = content.len(), "Writing artifact.");
    fs::write(path, content).map_err(|err| format!("write: {err}"))
}
