//! Go backend for the symbol-merge scanner.
//!
//! A line-oriented scan of top-level declarations, good enough for the
//! generated and hand-completed files the merge resolver sees: `type` blocks,
//! functions, and methods, each with its attached leading comment block.
//! Brace depth is tracked per line; declarations end when depth returns to
//! zero.

use crate::merge::{SymbolKind, SymbolSpan};

/// Scan Go source for top-level declaration spans.
pub fn scan_symbols(content: &str) -> Vec<SymbolSpan> {
    let mut spans = Vec::new();
    let mut depth: i32 = 0;
    let mut offset = 0;
    // Start offset of the comment block directly above the next declaration.
    let mut comment_start: Option<usize> = None;
    let mut open: Option<SymbolSpan> = None;

    for line in content.split_inclusive('\n') {
        let trimmed = line.trim();
        let line_start = offset;
        offset += line.len();

        if depth == 0 && open.is_none() {
            if trimmed.starts_with("//") {
                comment_start.get_or_insert(line_start);
            } else if let Some((kind, name)) = parse_decl_line(trimmed) {
                let start = comment_start.take().unwrap_or(line_start);
                let opened = braces(line);
                if opened.0 > opened.1 {
                    depth = opened.0 - opened.1;
                    open = Some(SymbolSpan {
                        kind,
                        name,
                        start,
                        end: offset,
                    });
                } else {
                    // Single-line declaration (e.g. a func type alias).
                    spans.push(SymbolSpan {
                        kind,
                        name,
                        start,
                        end: offset,
                    });
                }
            } else {
                comment_start = None;
                // Non-declaration blocks (var blocks, init expressions) still
                // nest; skip their bodies.
                let (opened, closed) = braces(line);
                depth = (depth + opened - closed).max(0);
            }
            continue;
        }

        let (opened, closed) = braces(line);
        depth += opened - closed;
        if depth <= 0 {
            depth = 0;
            if let Some(mut span) = open.take() {
                span.end = offset;
                spans.push(span);
            }
        }
    }
    spans
}

fn braces(line: &str) -> (i32, i32) {
    let mut opened = 0;
    let mut closed = 0;
    let mut in_string = false;
    let mut prev = '\0';
    for c in line.chars() {
        match c {
            '"' if prev != '\\' => in_string = !in_string,
            '{' if !in_string => opened += 1,
            '}' if !in_string => closed += 1,
            _ => {}
        }
        prev = c;
    }
    (opened, closed)
}

/// Recognize a top-level declaration line and extract its symbol.
fn parse_decl_line(line: &str) -> Option<(SymbolKind, String)> {
    if let Some(rest) = line.strip_prefix("type ") {
        let name: String = rest
            .chars()
            .take_while(|c| c.is_alphanumeric() || *c == '_')
            .collect();
        if !name.is_empty() {
            return Some((SymbolKind::Struct, name));
        }
        return None;
    }
    let rest = line.strip_prefix("func ")?;
    if let Some(after_recv) = rest.strip_prefix('(') {
        // Method: func (s *serviceLogging) Add(...)
        let (recv, remainder) = after_recv.split_once(')')?;
        let recv_ty = recv
            .split_whitespace()
            .last()?
            .trim_start_matches('*')
            .to_string();
        let name: String = remainder
            .trim_start()
            .chars()
            .take_while(|c| c.is_alphanumeric() || *c == '_')
            .collect();
        if recv_ty.is_empty() || name.is_empty() {
            return None;
        }
        return Some((SymbolKind::Method, format!("{recv_ty}.{name}")));
    }
    let name: String = rest
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_')
        .collect();
    if name.is_empty() {
        None
    } else {
        Some((SymbolKind::Function, name))
    }
}
