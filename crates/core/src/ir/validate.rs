//! Structural validation of the extracted IR.
//!
//! Four rules per method, checked without short-circuiting so one run reports
//! every violation at once:
//! 1. the first parameter is the context carrier (`context.Context`);
//! 2. the last result is the `error` kind;
//! 3. every parameter and result is named;
//! 4. no parameter or result is a raw interface, including map keys/values.

use super::types::{Field, InterfaceIR, Method};

/// Check every method of the interface. `Err` carries one composite message
/// listing every violation; no generation may run after a failure.
pub fn validate_interface(iface: &InterfaceIR) -> Result<(), String> {
    let mut violations = Vec::new();
    for method in &iface.methods {
        validate_method(method, &mut violations);
    }
    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations.join("\n"))
    }
}

fn validate_method(method: &Method, violations: &mut Vec<String>) {
    if !method.params.first().is_some_and(|p| p.ty.is_context()) {
        violations.push(format!(
            "{}: first parameter should be of type context.Context",
            method.name
        ));
    }
    if !method.results.last().is_some_and(|r| r.ty.is_error()) {
        violations.push(format!(
            "{}: last result should be of type error",
            method.name
        ));
    }
    for field in &method.params {
        check_field(&method.name, "parameter", field, violations);
    }
    for field in &method.results {
        check_field(&method.name, "result", field, violations);
    }
}

fn check_field(method: &str, slot: &str, field: &Field, violations: &mut Vec<String>) {
    if field.name.is_empty() {
        violations.push(format!(
            "{method}: unnamed {slot} of type {}",
            field.ty.display()
        ));
    }
    if field.ty.contains_raw_interface() {
        violations.push(format!(
            "{method}: {slot} error: raw interface ({}) type is not allowed, declare it as a named type",
            field.ty.display()
        ));
    }
}
