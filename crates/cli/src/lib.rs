//! Command-line driver for the generation pipeline.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use console::style;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use svcgen_core::ir::DEFAULT_MARKER;
use svcgen_core::{
    GenerationContext, Registry, SourceLocation, extract_interface, parse_decl_file,
    report_dry_run, validate_interface, write_artifacts,
};

pub mod config;

#[derive(Debug, Parser)]
#[command(
    name = "svcgen",
    version,
    about = "svcgen generates microservice boilerplate from an annotated interface"
)]
pub struct Cli {
    /// Path to the configuration file.
    #[arg(long, default_value = "svcgen.toml")]
    config: PathBuf,

    /// Path to the parsed interface declarations (JSON).
    #[arg(long, default_value = "service.json")]
    decls: PathBuf,

    /// Destination directory for generated artifacts.
    #[arg(long, default_value = ".")]
    dst: PathBuf,

    /// Run every stage but write no files.
    #[arg(long)]
    dry: bool,

    /// Overwrite artifacts that are normally skipped when present.
    #[arg(long)]
    force: bool,

    /// Increase log verbosity (-v: debug for svcgen, -vv: debug everywhere).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Parse arguments, run the pipeline, report the outcome. Returns the
/// process exit code.
pub fn run() -> i32 {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match execute(&cli) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("{} {err}", style("error:").red().bold());
            1
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_filter = match verbose {
        0 => "svcgen=info",
        1 => "svcgen=debug,svcgen_core=debug,svcgen_cli=debug",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    // A second init (tests, embedding) is not an error worth failing on.
    let _ = tracing_subscriber::registry()
        .with(fmt_layer.with_filter(filter))
        .try_init();
}

fn execute(cli: &Cli) -> Result<(), String> {
    let begin = Instant::now();
    let config = config::load_config(&cli.config)?;
    let import_path = config
        .import_path
        .clone()
        .ok_or_else(|| "Config file must set import_path to the service package".to_string())?;
    let package_name = import_path
        .rsplit('/')
        .next()
        .unwrap_or(&import_path)
        .to_string();
    debug!(config = %cli.config.display(), "Configuration loaded.");

    let raw_decls = fs::read_to_string(&cli.decls)
        .map_err(|err| format!("Failed to read declarations {}: {err}", cli.decls.display()))?;
    let decl_file = parse_decl_file(&raw_decls)?;

    let marker = config
        .marker
        .clone()
        .unwrap_or_else(|| DEFAULT_MARKER.to_string());
    let ir = extract_interface(&decl_file.interfaces, config.interface.as_deref(), &marker)?;
    validate_interface(&ir)?;

    let location = SourceLocation {
        source_dir: cli.dst.clone(),
        output_dir: cli.dst.clone(),
        import_path,
        package_name,
        force: cli.force || config.force,
    };

    debug!(interface = %ir.name, methods = ir.methods.len(), "Starting generation.");
    let ctx = GenerationContext::new(ir, location);
    let ctx = Registry::builtin().run(ctx, &config.generator_specs())?;

    if cli.dry {
        debug!("Dry run: not creating files.");
        report_dry_run(&ctx.artifacts);
    } else {
        write_artifacts(&ctx.artifacts)?;
    }
    info!(
        artifacts = ctx.artifacts.len(),
        duration = ?begin.elapsed(),
        "Done."
    );
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const DECLS: &str = r##"{
      "interfaces": [
        {
          "name": "Adder",
          "docs": ["Adder sums numbers.", "@svcgen:generate"],
          "methods": [
            {
              "name": "Add",
              "params": [
                { "name": "ctx", "type": { "name": "Context", "package": { "name": "context", "path": "context" } } },
                { "name": "a", "type": { "name": "int" } },
                { "name": "b", "type": { "name": "int" } }
              ],
              "results": [
                { "name": "sum", "type": { "name": "int" } },
                { "name": "err", "type": { "name": "error" } }
              ]
            }
          ]
        }
      ]
    }"##;

    const CONFIG: &str = r#"
interface = "Adder"
import_path = "example.com/adder"

[[generate]]
name = "middleware"

[[generate]]
name = "logging"

[[generate]]
name = "stub-service"
"#;

    fn cli_for(dir: &tempfile::TempDir, dry: bool) -> Cli {
        Cli {
            config: dir.path().join("svcgen.toml"),
            decls: dir.path().join("service.json"),
            dst: dir.path().to_path_buf(),
            dry,
            force: false,
            verbose: 0,
        }
    }

    fn setup(dir: &tempfile::TempDir) {
        fs::write(dir.path().join("svcgen.toml"), CONFIG).unwrap();
        fs::write(dir.path().join("service.json"), DECLS).unwrap();
    }

    #[test]
    fn test_execute_writes_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        setup(&dir);
        execute(&cli_for(&dir, false)).unwrap();

        assert!(dir.path().join("middleware/middleware.go").exists());
        assert!(dir.path().join("middleware/logging.go").exists());
        assert!(dir.path().join("service.go").exists());
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        setup(&dir);
        execute(&cli_for(&dir, true)).unwrap();

        assert!(!dir.path().join("middleware").exists());
        assert!(!dir.path().join("service.go").exists());
    }

    #[test]
    fn test_unknown_generator_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        setup(&dir);
        fs::write(
            dir.path().join("svcgen.toml"),
            "interface = \"Adder\"\nimport_path = \"x/y\"\n\n[[generate]]\nname = \"nope\"\n",
        )
        .unwrap();
        let err = execute(&cli_for(&dir, false)).unwrap_err();
        assert!(err.contains("nope is not registered"));
    }

    #[test]
    fn test_validation_failure_aborts_before_generation() {
        let dir = tempfile::tempdir().unwrap();
        setup(&dir);
        // Method without context or error.
        fs::write(
            dir.path().join("service.json"),
            r##"{ "interfaces": [ { "name": "Adder", "docs": ["@svcgen:generate"],
                 "methods": [ { "name": "Add" } ] } ] }"##,
        )
        .unwrap();
        let err = execute(&cli_for(&dir, false)).unwrap_err();
        assert!(err.contains("first parameter should be of type context.Context"));
        assert!(err.contains("last result should be of type error"));
        assert!(!dir.path().join("middleware").exists());
    }

    #[test]
    fn test_missing_import_path_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        setup(&dir);
        fs::write(
            dir.path().join("svcgen.toml"),
            "interface = \"Adder\"\n\n[[generate]]\nname = \"middleware\"\n",
        )
        .unwrap();
        let err = execute(&cli_for(&dir, false)).unwrap_err();
        assert!(err.contains("import_path"));
    }
}
