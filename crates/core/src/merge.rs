//! Symbol-level merge of generated fragments into existing files.
//!
//! Append-class artifacts must never duplicate a symbol that is already
//! present in the target file and must never touch existing bytes. The
//! algorithm here is language-agnostic: it works on a [`SymbolIndex`] built by
//! a grammar-specific scanner (a pure function from file content to declared
//! symbol spans, see `gocode::scan`), filters the proposed fragment's spans
//! against it, and appends only the remainder.

use std::collections::HashSet;

/// Kind of a top-level declared symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Struct,
    Function,
    /// Method on a named type; the symbol name is `"Receiver.Name"`.
    Method,
}

/// One declared symbol with the byte span of its full declaration (attached
/// leading comments included).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolSpan {
    pub kind: SymbolKind,
    pub name: String,
    pub start: usize,
    pub end: usize,
}

/// Ephemeral set of `(kind, name)` pairs declared in one file.
#[derive(Debug, Default)]
pub struct SymbolIndex {
    symbols: HashSet<(SymbolKind, String)>,
}

impl SymbolIndex {
    pub fn from_spans(spans: &[SymbolSpan]) -> Self {
        SymbolIndex {
            symbols: spans
                .iter()
                .map(|s| (s.kind, s.name.clone()))
                .collect(),
        }
    }

    pub fn contains(&self, kind: SymbolKind, name: &str) -> bool {
        self.symbols.contains(&(kind, name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// Append the symbols of `proposed` that are missing from `existing`.
///
/// Both inputs are scanned with the same `scan` backend. Returns the merged
/// content, or `None` when every proposed symbol already exists (nothing to
/// write). Existing bytes are preserved untouched; new declarations are
/// appended at the end, separated by blank lines.
pub fn append_missing(
    existing: &str,
    proposed: &str,
    scan: impl Fn(&str) -> Vec<SymbolSpan>,
) -> Option<String> {
    let index = SymbolIndex::from_spans(&scan(existing));
    let missing: Vec<SymbolSpan> = scan(proposed)
        .into_iter()
        .filter(|span| !index.contains(span.kind, &span.name))
        .collect();
    if missing.is_empty() {
        return None;
    }

    let mut merged = existing.to_string();
    if !merged.is_empty() && !merged.ends_with('\n') {
        merged.push('\n');
    }
    for span in &missing {
        merged.push('\n');
        let text = proposed[span.start..span.end].trim_end_matches('\n');
        merged.push_str(text);
        merged.push('\n');
    }
    Some(merged)
}
