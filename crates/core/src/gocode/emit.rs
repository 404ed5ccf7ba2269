//! Go source emission via the Emit trait.
//!
//! Each tree node renders itself to a string; statements additionally take an
//! indentation level (tabs, gofmt-shaped). Emission is purely mechanical:
//! every decision about *what* to render was made while building the tree.

use super::types::{GoDecl, GoExpr, GoField, GoFile, GoImport, GoStmt, GoType};

/// Trait for emitting Go source from tree nodes.
pub trait Emit {
    fn emit(&self) -> String;
}

fn escape_go_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

fn indent_of(level: usize) -> String {
    "\t".repeat(level)
}

// =============================================================================
// Types
// =============================================================================

impl Emit for GoType {
    fn emit(&self) -> String {
        match self {
            GoType::Named(name) => name.clone(),
            GoType::Qual { pkg, name } => format!("{pkg}.{name}"),
            GoType::Pointer(inner) => format!("*{}", inner.emit()),
            GoType::Slice(inner) => format!("[]{}", inner.emit()),
            GoType::Map { key, value } => format!("map[{}]{}", key.emit(), value.emit()),
            GoType::Func { params, results } => {
                let params_str = params.iter().map(Emit::emit).collect::<Vec<_>>().join(", ");
                format!("func({params_str}){}", emit_result_types(results))
            }
            GoType::Variadic(inner) => format!("...{}", inner.emit()),
        }
    }
}

fn emit_result_types(results: &[GoType]) -> String {
    match results {
        [] => String::new(),
        [single] => format!(" {}", single.emit()),
        many => {
            let inner = many.iter().map(Emit::emit).collect::<Vec<_>>().join(", ");
            format!(" ({inner})")
        }
    }
}

impl Emit for GoField {
    fn emit(&self) -> String {
        let mut out = if self.name.is_empty() {
            self.ty.emit()
        } else {
            format!("{} {}", self.name, self.ty.emit())
        };
        if let Some(tag) = &self.tag {
            out.push_str(&format!(" `{tag}`"));
        }
        out
    }
}

// =============================================================================
// Expressions
// =============================================================================

impl GoExpr {
    /// Emit at the given statement indentation level. The level only matters
    /// for nodes that span lines (function literals, multiline composites).
    pub fn emit_at(&self, indent: usize) -> String {
        match self {
            GoExpr::Ident(name) => name.clone(),
            GoExpr::Qual { pkg, name } => format!("{pkg}.{name}"),
            GoExpr::Str(value) => format!("\"{}\"", escape_go_string(value)),
            GoExpr::Call { callee, args } => {
                let args_str = args
                    .iter()
                    .map(|a| a.emit_at(indent))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{}({args_str})", callee.emit_at(indent))
            }
            GoExpr::Selector { base, field } => {
                format!("{}.{field}", base.emit_at(indent))
            }
            GoExpr::Ref(inner) => format!("&{}", inner.emit_at(indent)),
            GoExpr::StructLit {
                ty,
                fields,
                multiline,
            } => {
                if fields.is_empty() {
                    return format!("{ty}{{}}");
                }
                if *multiline {
                    let mut out = format!("{ty}{{\n");
                    for (name, value) in fields {
                        out.push_str(&format!(
                            "{}{name}: {},\n",
                            indent_of(indent + 1),
                            value.emit_at(indent + 1)
                        ));
                    }
                    out.push_str(&format!("{}}}", indent_of(indent)));
                    out
                } else {
                    let fields_str = fields
                        .iter()
                        .map(|(name, value)| format!("{name}: {}", value.emit_at(indent)))
                        .collect::<Vec<_>>()
                        .join(", ");
                    format!("{ty}{{{fields_str}}}")
                }
            }
            GoExpr::MapLit {
                ty,
                entries,
                multiline,
            } => {
                if *multiline && !entries.is_empty() {
                    let mut out = format!("{}{{\n", ty.emit_at(indent));
                    for (key, value) in entries {
                        out.push_str(&format!(
                            "{}{}: {},\n",
                            indent_of(indent + 1),
                            key.emit_at(indent + 1),
                            value.emit_at(indent + 1)
                        ));
                    }
                    out.push_str(&format!("{}}}", indent_of(indent)));
                    out
                } else {
                    let entries_str = entries
                        .iter()
                        .map(|(k, v)| format!("{}: {}", k.emit_at(indent), v.emit_at(indent)))
                        .collect::<Vec<_>>()
                        .join(", ");
                    format!("{}{{{entries_str}}}", ty.emit_at(indent))
                }
            }
            GoExpr::FuncLit {
                params,
                results,
                body,
            } => {
                let params_str = params.iter().map(Emit::emit).collect::<Vec<_>>().join(", ");
                let mut out = format!(
                    "func({params_str}){} {{\n",
                    emit_result_fields(results)
                );
                for stmt in body {
                    out.push_str(&stmt.emit_at(indent + 1));
                }
                out.push_str(&format!("{}}}", indent_of(indent)));
                out
            }
            GoExpr::Variadic(inner) => format!("{}...", inner.emit_at(indent)),
            GoExpr::Raw(code) => code.clone(),
        }
    }
}

impl Emit for GoExpr {
    fn emit(&self) -> String {
        self.emit_at(0)
    }
}

fn emit_result_fields(results: &[GoField]) -> String {
    match results {
        [] => String::new(),
        [single] if single.name.is_empty() => format!(" {}", single.ty.emit()),
        many => {
            let inner = many.iter().map(Emit::emit).collect::<Vec<_>>().join(", ");
            format!(" ({inner})")
        }
    }
}

// =============================================================================
// Statements
// =============================================================================

impl GoStmt {
    /// Emit with the given indentation level (one tab per level), trailing
    /// newline included.
    pub fn emit_at(&self, indent: usize) -> String {
        let prefix = indent_of(indent);
        match self {
            GoStmt::Expr(expr) => format!("{prefix}{}\n", expr.emit_at(indent)),
            GoStmt::Return(exprs) => {
                if exprs.is_empty() {
                    format!("{prefix}return\n")
                } else {
                    let list = exprs
                        .iter()
                        .map(|e| e.emit_at(indent))
                        .collect::<Vec<_>>()
                        .join(", ");
                    format!("{prefix}return {list}\n")
                }
            }
            GoStmt::Assign { lhs, rhs, define } => {
                let op = if *define { ":=" } else { "=" };
                let lhs_str = lhs
                    .iter()
                    .map(|e| e.emit_at(indent))
                    .collect::<Vec<_>>()
                    .join(", ");
                let rhs_str = rhs
                    .iter()
                    .map(|e| e.emit_at(indent))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{prefix}{lhs_str} {op} {rhs_str}\n")
            }
            GoStmt::Defer(call) => format!("{prefix}defer {}\n", call.emit_at(indent)),
            GoStmt::Raw(code) => {
                let mut out = String::new();
                for line in code.lines() {
                    if line.is_empty() {
                        out.push('\n');
                    } else {
                        out.push_str(&format!("{prefix}{line}\n"));
                    }
                }
                out
            }
        }
    }
}

impl Emit for GoStmt {
    fn emit(&self) -> String {
        self.emit_at(1)
    }
}

// =============================================================================
// Declarations
// =============================================================================

fn emit_doc(doc: &[String]) -> String {
    doc.iter().map(|line| format!("// {line}\n")).collect()
}

fn emit_signature(name: &str, params: &[GoField], results: &[GoField]) -> String {
    let params_str = params.iter().map(Emit::emit).collect::<Vec<_>>().join(", ");
    format!("{name}({params_str}){}", emit_result_fields(results))
}

impl Emit for GoDecl {
    fn emit(&self) -> String {
        match self {
            GoDecl::Struct { doc, name, fields } => {
                let mut out = emit_doc(doc);
                if fields.is_empty() {
                    out.push_str(&format!("type {name} struct {{\n}}\n"));
                } else {
                    out.push_str(&format!("type {name} struct {{\n"));
                    for field in fields {
                        out.push_str(&format!("\t{}\n", field.emit()));
                    }
                    out.push_str("}\n");
                }
                out
            }
            GoDecl::FuncType {
                doc,
                name,
                params,
                results,
            } => {
                let params_str = params.iter().map(Emit::emit).collect::<Vec<_>>().join(", ");
                format!(
                    "{}type {name} func({params_str}){}\n",
                    emit_doc(doc),
                    emit_result_types(results)
                )
            }
            GoDecl::Func { doc, func } => {
                let mut out = emit_doc(doc);
                out.push_str(&format!(
                    "func {} {{\n",
                    emit_signature(&func.name, &func.params, &func.results)
                ));
                for stmt in &func.body {
                    out.push_str(&stmt.emit_at(1));
                }
                out.push_str("}\n");
                out
            }
            GoDecl::Method { doc, recv, func } => {
                let star = if recv.pointer { "*" } else { "" };
                let mut out = emit_doc(doc);
                out.push_str(&format!(
                    "func ({} {star}{}) {} {{\n",
                    recv.name,
                    recv.ty,
                    emit_signature(&func.name, &func.params, &func.results)
                ));
                for stmt in &func.body {
                    out.push_str(&stmt.emit_at(1));
                }
                out.push_str("}\n");
                out
            }
        }
    }
}

impl Emit for GoImport {
    fn emit(&self) -> String {
        format!("{} \"{}\"", self.alias, self.path)
    }
}

impl Emit for GoFile {
    fn emit(&self) -> String {
        let mut out = String::new();
        for line in &self.header {
            out.push_str(&format!("// {line}\n"));
        }
        out.push_str(&format!("package {}\n", self.package));
        if !self.imports.is_empty() {
            out.push_str("\nimport (\n");
            for import in &self.imports {
                out.push_str(&format!("\t{}\n", import.emit()));
            }
            out.push_str(")\n");
        }
        for decl in &self.decls {
            out.push('\n');
            out.push_str(&decl.emit());
        }
        out
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::gocode::types::{GoFunc, GoReceiver};

    #[test]
    fn test_type_emission() {
        assert_eq!(GoType::named("int").emit(), "int");
        assert_eq!(GoType::qual("context", "Context").emit(), "context.Context");
        assert_eq!(
            GoType::Pointer(Box::new(GoType::qual("entity", "Visit"))).emit(),
            "*entity.Visit"
        );
        assert_eq!(
            GoType::Slice(Box::new(GoType::named("int"))).emit(),
            "[]int"
        );
        assert_eq!(
            GoType::Map {
                key: Box::new(GoType::named("string")),
                value: Box::new(GoType::named("int")),
            }
            .emit(),
            "map[string]int"
        );
        assert_eq!(
            GoType::Func {
                params: vec![GoType::named("A")],
                results: vec![GoType::named("B")],
            }
            .emit(),
            "func(A) B"
        );
    }

    #[test]
    fn test_struct_decl_with_tag() {
        let decl = GoDecl::Struct {
            doc: vec!["logAddRequest is the logged request of Add.".to_string()],
            name: "logAddRequest".to_string(),
            fields: vec![GoField::tagged("A", GoType::named("int"), "json:\"a\"")],
        };
        assert_eq!(
            decl.emit(),
            "// logAddRequest is the logged request of Add.\ntype logAddRequest struct {\n\tA int `json:\"a\"`\n}\n"
        );
    }

    #[test]
    fn test_func_type_decl() {
        let decl = GoDecl::FuncType {
            doc: Vec::new(),
            name: "Middleware".to_string(),
            params: vec![GoType::qual("svc", "StringService")],
            results: vec![GoType::qual("svc", "StringService")],
        };
        assert_eq!(
            decl.emit(),
            "type Middleware func(svc.StringService) svc.StringService\n"
        );
    }

    #[test]
    fn test_method_with_defer_and_return() {
        let decl = GoDecl::Method {
            doc: Vec::new(),
            recv: GoReceiver {
                name: "s".to_string(),
                ty: "serviceLogging".to_string(),
                pointer: true,
            },
            func: GoFunc {
                name: "Add".to_string(),
                params: vec![
                    GoField::new("ctx", GoType::qual("context", "Context")),
                    GoField::new("a", GoType::named("int")),
                ],
                results: vec![
                    GoField::new("sum", GoType::named("int")),
                    GoField::new("err", GoType::named("error")),
                ],
                body: vec![
                    GoStmt::Defer(GoExpr::call(
                        GoExpr::FuncLit {
                            params: vec![GoField::new("begin", GoType::qual("time", "Time"))],
                            results: Vec::new(),
                            body: vec![GoStmt::Expr(GoExpr::method_call(
                                GoExpr::select(GoExpr::ident("s"), "logger"),
                                "Log",
                                vec![GoExpr::str("method"), GoExpr::str("Add")],
                            ))],
                        },
                        vec![GoExpr::call(GoExpr::qual("time", "Now"), Vec::new())],
                    )),
                    GoStmt::Return(vec![GoExpr::method_call(
                        GoExpr::select(GoExpr::ident("s"), "next"),
                        "Add",
                        vec![GoExpr::ident("ctx"), GoExpr::ident("a")],
                    )]),
                ],
            },
        };
        let expected = "func (s *serviceLogging) Add(ctx context.Context, a int) (sum int, err error) {\n\
\tdefer func(begin time.Time) {\n\
\t\ts.logger.Log(\"method\", \"Add\")\n\
\t}(time.Now())\n\
\treturn s.next.Add(ctx, a)\n\
}\n";
        assert_eq!(decl.emit(), expected);
    }

    #[test]
    fn test_file_emission_with_imports() {
        let mut file = GoFile::new("middleware");
        file.header = vec!["Code generated by \"svcgen\". DO NOT EDIT.".to_string()];
        file.imports = vec![GoImport::new("svc", "gitlab.example.com/usersvc")];
        file.decls = vec![GoDecl::FuncType {
            doc: Vec::new(),
            name: "Middleware".to_string(),
            params: vec![GoType::qual("svc", "UserService")],
            results: vec![GoType::qual("svc", "UserService")],
        }];
        let expected = "// Code generated by \"svcgen\". DO NOT EDIT.\n\
package middleware\n\
\n\
import (\n\
\tsvc \"gitlab.example.com/usersvc\"\n\
)\n\
\n\
type Middleware func(svc.UserService) svc.UserService\n";
        assert_eq!(file.emit(), expected);
    }

    #[test]
    fn test_multiline_struct_literal() {
        let expr = GoExpr::StructLit {
            ty: "serviceLogging".to_string(),
            fields: vec![
                ("logger".to_string(), GoExpr::ident("logger")),
                ("next".to_string(), GoExpr::ident("next")),
            ],
            multiline: true,
        };
        assert_eq!(
            expr.emit_at(1),
            "serviceLogging{\n\t\tlogger: logger,\n\t\tnext: next,\n\t}"
        );
    }

    #[test]
    fn test_raw_stmt_reindented() {
        let stmt = GoStmt::Raw("if r := recover(); r != nil {\n\terr = fmt.Errorf(\"%v\", r)\n}".to_string());
        assert_eq!(
            stmt.emit_at(2),
            "\t\tif r := recover(); r != nil {\n\t\t\terr = fmt.Errorf(\"%v\", r)\n\t\t}\n"
        );
    }
}
