//! Interface selection and IR extraction.
//!
//! Candidates are the declared interfaces whose documentation carries the
//! `generate` directive. Exactly one interface is selected per run; embedded
//! interfaces are flattened into the method list before the IR is returned.

use tracing::debug;

use super::decl::{InterfaceDecl, MethodDecl};
use super::tags::{GENERATE_KEY, parse_directives};
use super::types::{Directive, InterfaceIR, Method};

/// Select one interface and build its IR.
///
/// Selection rules:
/// - no candidate carries the marker: error naming the marker;
/// - a name was configured but matches no candidate: error listing candidates;
/// - no name configured and exactly one candidate: auto-select;
/// - no name configured and several candidates: error listing candidates.
pub fn extract_interface(
    decls: &[InterfaceDecl],
    configured_name: Option<&str>,
    marker: &str,
) -> Result<InterfaceIR, String> {
    let candidates: Vec<&InterfaceDecl> = decls
        .iter()
        .filter(|decl| {
            parse_directives(&decl.docs, marker)
                .iter()
                .any(|d| d.key == GENERATE_KEY)
        })
        .collect();

    if candidates.is_empty() {
        return Err(format!(
            "No interface is marked for generation; add a \"{marker}{GENERATE_KEY}\" line to the interface documentation"
        ));
    }

    let selected = match configured_name {
        Some(name) => candidates
            .iter()
            .find(|decl| decl.name == name)
            .copied()
            .ok_or_else(|| {
                format!(
                    "Interface {name} not found among marked candidates:\n{}",
                    list_candidates(&candidates)
                )
            })?,
        None => {
            if candidates.len() == 1 {
                candidates[0]
            } else {
                return Err(format!(
                    "{} interfaces are marked for generation but no interface name is configured; add \"interface = \\\"Name\\\"\" to the config file. Candidates:\n{}",
                    candidates.len(),
                    list_candidates(&candidates)
                ));
            }
        }
    };

    debug!(interface = %selected.name, "Selected interface for generation.");
    Ok(build_ir(selected, marker))
}

fn list_candidates(candidates: &[&InterfaceDecl]) -> String {
    candidates
        .iter()
        .map(|decl| {
            format!(
                "\t{} ({} methods, {} embedded interfaces)",
                decl.name,
                decl.methods.len(),
                decl.embedded.len()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn build_ir(decl: &InterfaceDecl, marker: &str) -> InterfaceIR {
    let mut methods = Vec::new();
    collect_methods(decl, marker, &mut methods);
    InterfaceIR {
        name: decl.name.clone(),
        methods,
        directives: parse_directives(&decl.docs, marker),
    }
}

/// Depth-first flattening: an interface's own methods come before the methods
/// of the interfaces it embeds.
fn collect_methods(decl: &InterfaceDecl, marker: &str, out: &mut Vec<Method>) {
    for method in &decl.methods {
        out.push(build_method(method, marker));
    }
    for embedded in &decl.embedded {
        collect_methods(embedded, marker, out);
    }
}

fn build_method(decl: &MethodDecl, marker: &str) -> Method {
    Method {
        name: decl.name.clone(),
        params: decl.params.clone(),
        results: decl.results.clone(),
        directives: parse_directives(&decl.docs, marker),
    }
}

/// Interface-level directives of the `generate` key, i.e. the feature flags
/// carried on the marker line itself.
pub fn generate_flags(directives: &[Directive]) -> Vec<&str> {
    super::types::values_for(directives, GENERATE_KEY)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::ir::decl::parse_decl_file;
    use crate::ir::tags::DEFAULT_MARKER;

    fn decls(json: &str) -> Vec<InterfaceDecl> {
        parse_decl_file(json).unwrap().interfaces
    }

    const TWO_MARKED: &str = r##"{
      "interfaces": [
        { "name": "Adder", "docs": ["@svcgen:generate"], "methods": [ { "name": "Add" } ] },
        { "name": "Greeter", "docs": ["@svcgen:generate tracing"], "methods": [ { "name": "Greet" }, { "name": "Bye" } ] },
        { "name": "Unmarked", "docs": ["plain docs"], "methods": [] }
      ]
    }"##;

    #[test]
    fn test_auto_select_single_candidate() {
        let decls = decls(
            r##"{ "interfaces": [ { "name": "Adder", "docs": ["@svcgen:generate"], "methods": [] } ] }"##,
        );
        let ir = extract_interface(&decls, None, DEFAULT_MARKER).unwrap();
        assert_eq!(ir.name, "Adder");
    }

    #[test]
    fn test_no_candidates_is_error() {
        let decls =
            decls(r##"{ "interfaces": [ { "name": "Adder", "docs": ["plain"], "methods": [] } ] }"##);
        let err = extract_interface(&decls, None, DEFAULT_MARKER).unwrap_err();
        assert!(err.contains("@svcgen:generate"), "unexpected error: {err}");
    }

    #[test]
    fn test_multiple_candidates_require_configured_name() {
        let decls = decls(TWO_MARKED);
        let err = extract_interface(&decls, None, DEFAULT_MARKER).unwrap_err();
        assert!(err.contains("Adder (1 methods, 0 embedded interfaces)"));
        assert!(err.contains("Greeter (2 methods, 0 embedded interfaces)"));
        assert!(!err.contains("Unmarked"));
    }

    #[test]
    fn test_configured_name_selects_among_candidates() {
        let decls = decls(TWO_MARKED);
        let ir = extract_interface(&decls, Some("Greeter"), DEFAULT_MARKER).unwrap();
        assert_eq!(ir.name, "Greeter");
        assert_eq!(generate_flags(&ir.directives), vec!["tracing"]);
    }

    #[test]
    fn test_configured_name_not_found_lists_candidates() {
        let decls = decls(TWO_MARKED);
        let err = extract_interface(&decls, Some("Missing"), DEFAULT_MARKER).unwrap_err();
        assert!(err.contains("Missing"));
        assert!(err.contains("Adder"));
        assert!(err.contains("Greeter"));
    }

    #[test]
    fn test_embedded_interfaces_flattened_depth_first() {
        let decls = decls(
            r##"{
          "interfaces": [
            {
              "name": "Composite",
              "docs": ["@svcgen:generate"],
              "methods": [ { "name": "Own" } ],
              "embedded": [
                { "name": "Inner", "methods": [ { "name": "FromInner" } ],
                  "embedded": [ { "name": "Deep", "methods": [ { "name": "FromDeep" } ] } ] }
              ]
            }
          ]
        }"##,
        );
        let ir = extract_interface(&decls, None, DEFAULT_MARKER).unwrap();
        let names: Vec<&str> = ir.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Own", "FromInner", "FromDeep"]);
    }

    #[test]
    fn test_method_directives_attached() {
        let decls = decls(
            r##"{
          "interfaces": [
            {
              "name": "Adder",
              "docs": ["@svcgen:generate"],
              "methods": [ { "name": "Add", "docs": ["@svcgen:logs-ignore a"] } ]
            }
          ]
        }"##,
        );
        let ir = extract_interface(&decls, None, DEFAULT_MARKER).unwrap();
        assert_eq!(ir.methods[0].directives[0].key, "logs-ignore");
        assert_eq!(ir.methods[0].directives[0].values, vec!["a"]);
    }
}
