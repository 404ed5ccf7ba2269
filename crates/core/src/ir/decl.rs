//! Declaration structs for serde deserialization.
//!
//! This is the boundary to the external declaration parser: interfaces arrive
//! already parsed, as a JSON document of named interfaces with documentation
//! lines and method signatures. Nothing here interprets documentation; the
//! directive extractor does that during IR extraction.

use serde::Deserialize;

use super::types::Field;

/// Root declaration document.
#[derive(Debug, Deserialize)]
pub struct DeclFile {
    #[serde(default)]
    pub interfaces: Vec<InterfaceDecl>,
}

/// One declared interface, possibly embedding others.
#[derive(Debug, Clone, Deserialize)]
pub struct InterfaceDecl {
    pub name: String,
    /// Raw documentation lines, directives included.
    #[serde(default)]
    pub docs: Vec<String>,
    #[serde(default)]
    pub methods: Vec<MethodDecl>,
    /// Embedded interfaces, flattened into the method list at extraction.
    #[serde(default)]
    pub embedded: Vec<InterfaceDecl>,
}

/// One declared method signature.
#[derive(Debug, Clone, Deserialize)]
pub struct MethodDecl {
    pub name: String,
    #[serde(default)]
    pub docs: Vec<String>,
    #[serde(default)]
    pub params: Vec<Field>,
    #[serde(default)]
    pub results: Vec<Field>,
}

/// Parse a declaration document from its JSON form.
pub fn parse_decl_file(content: &str) -> Result<DeclFile, String> {
    serde_json::from_str(content).map_err(|err| format!("Failed to parse declarations: {err}"))
}
