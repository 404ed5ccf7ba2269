//! Directive extraction from documentation lines.
//!
//! A documentation line starting with the configured marker prefix is a
//! directive; everything else is free text. After the marker, the first
//! whitespace-delimited token is the key and the remainder is a
//! comma-separated value list. Unknown keys are ignored by every consumer,
//! so new directives can be introduced without breaking older generators.

use super::types::Directive;

/// Default marker prefix recognized in documentation lines.
pub const DEFAULT_MARKER: &str = "@svcgen:";

/// Interface-level directive key that marks an interface for generation.
pub const GENERATE_KEY: &str = "generate";

/// Value of the `generate` directive that enables tracing propagation in
/// transport bindings.
pub const TRACING_VALUE: &str = "tracing";

/// Extract every directive from the given documentation lines.
///
/// Pure function: same lines and marker always yield the same directives, in
/// line order. Directives with the same key are kept as separate entries.
pub fn parse_directives(lines: &[String], marker: &str) -> Vec<Directive> {
    let mut directives = Vec::new();
    for line in lines {
        let Some(rest) = line.trim_start().strip_prefix(marker) else {
            continue;
        };
        let rest = rest.trim();
        let (key, value_part) = match rest.split_once(char::is_whitespace) {
            Some((key, values)) => (key, values),
            None => (rest, ""),
        };
        if key.is_empty() {
            continue;
        }
        let compact: String = value_part.chars().filter(|c| !c.is_whitespace()).collect();
        let values = if compact.is_empty() {
            Vec::new()
        } else {
            compact.split(',').map(str::to_string).collect()
        };
        directives.push(Directive {
            key: key.to_string(),
            values,
        });
    }
    directives
}
