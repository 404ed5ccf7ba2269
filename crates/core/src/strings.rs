//! Identifier helpers shared across IR extraction and code emission.

/// Upper-case the first character, leaving the rest untouched.
pub fn to_upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

/// Lower-case the first character, leaving the rest untouched.
pub fn to_lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_lowercase().chain(chars).collect(),
    }
}

/// Convert a CamelCase or mixedCase identifier to snake_case.
pub fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, c) in s.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.push(c.to_ascii_lowercase());
        } else {
            result.push(c);
        }
    }
    result
}

/// Receiver identifier for a generated method: the first character of the
/// receiver type, lower-cased. Falls back to `r` for an empty name.
pub fn receiver_ident(type_name: &str) -> String {
    type_name
        .chars()
        .next()
        .map(|c| c.to_lowercase().to_string())
        .unwrap_or_else(|| "r".to_string())
}
