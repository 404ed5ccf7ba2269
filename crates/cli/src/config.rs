//! Run configuration loaded from `svcgen.toml`.
//!
//! ```toml
//! interface = "Adder"
//! import_path = "example.com/adder"
//!
//! [[generate]]
//! name = "middleware"
//!
//! [[generate]]
//! name = "logging"
//! args = { path = "middleware/logging.go" }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use svcgen_core::GeneratorSpec;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Interface to select; may be omitted when exactly one is marked.
    pub interface: Option<String>,
    /// Directive marker prefix; defaults to the built-in marker.
    pub marker: Option<String>,
    /// Import path of the service package.
    pub import_path: Option<String>,
    /// Overwrite artifacts that are normally skipped when present.
    #[serde(default)]
    pub force: bool,
    /// Ordered generator sequence.
    #[serde(default)]
    pub generate: Vec<GeneratorEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneratorEntry {
    pub name: String,
    #[serde(default)]
    pub args: BTreeMap<String, String>,
}

/// Load and check the configuration file. Malformed configuration is fatal
/// before any IR work begins.
pub fn load_config(path: &Path) -> Result<Config, String> {
    let contents = fs::read_to_string(path)
        .map_err(|err| format!("Failed to read config file {}: {err}", path.display()))?;
    let config: Config = toml::from_str(&contents)
        .map_err(|err| format!("Failed to parse config file {}: {err}", path.display()))?;
    if config.generate.is_empty() {
        return Err(format!(
            "Config file {} declares no generators; add at least one [[generate]] entry",
            path.display()
        ));
    }
    Ok(config)
}

impl Config {
    pub fn generator_specs(&self) -> Vec<GeneratorSpec> {
        self.generate
            .iter()
            .map(|entry| GeneratorSpec {
                name: entry.name.clone(),
                args: entry.args.clone(),
            })
            .collect()
    }
}
