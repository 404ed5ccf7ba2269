//! Logging decorator generator.
//!
//! Wraps the service in a type that logs, per call, the method name, a
//! loggable request/response companion, the trailing error, and the elapsed
//! wall-clock duration, then delegates to the wrapped implementation.
//! Per-method directives:
//!
//! - `logs-ignore`: field names omitted from the log line and companions;
//! - `logs-len`: field names logged by element count instead of value.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::gocode::{Emit, GoDecl, GoExpr, GoField, GoFile, GoStmt, GoType};
use crate::ir::{Field, Method, values_for};
use crate::pipeline::{GenerationContext, Generator, GeneratorArgs, WriteStrategy};
use crate::strings::{receiver_ident, to_snake_case, to_upper_first};

use super::common::{
    DO_NOT_EDIT, FILE_HEADER, PKG_GOKIT_LOG, PKG_TIME, decorator_constructor, decorator_struct,
    delegate_stmt, field_imports, forwarding_method, merged_imports,
};

const DEFAULT_PATH: &str = "middleware/logging.go";
const STRUCT_NAME: &str = "serviceLogging";

const IGNORE_KEY: &str = "logs-ignore";
const LEN_KEY: &str = "logs-len";

#[derive(Debug)]
pub struct LoggingGenerator {
    path: String,
    /// Per-method field names excluded from logging, cached in `prepare`.
    ignored: BTreeMap<String, Vec<String>>,
    /// Per-method field names logged by element count, cached in `prepare`.
    length: BTreeMap<String, Vec<String>>,
}

impl LoggingGenerator {
    pub fn create(args: &GeneratorArgs) -> Box<dyn Generator> {
        Box::new(LoggingGenerator {
            path: args
                .get("path")
                .cloned()
                .unwrap_or_else(|| DEFAULT_PATH.to_string()),
            ignored: BTreeMap::new(),
            length: BTreeMap::new(),
        })
    }

    fn is_ignored(&self, method: &str, field: &str) -> bool {
        self.ignored
            .get(method)
            .is_some_and(|names| names.iter().any(|n| n == field))
    }

    fn is_length(&self, method: &str, field: &str) -> bool {
        self.length
            .get(method)
            .is_some_and(|names| names.iter().any(|n| n == field))
    }

    /// Fields that survive the ignore rule for one request/response slot.
    fn remaining<'a>(&self, method: &str, fields: &'a [Field]) -> Vec<&'a Field> {
        fields
            .iter()
            .filter(|f| !self.is_ignored(method, &f.name))
            .collect()
    }

    /// Companion struct declaration for one slot, or `None` when every field
    /// is ignored.
    fn companion_struct(&self, name: &str, method: &Method, fields: &[Field]) -> Option<GoDecl> {
        let remaining = self.remaining(&method.name, fields);
        if remaining.is_empty() {
            return None;
        }
        let fields = remaining
            .iter()
            .map(|f| {
                if self.is_length(&method.name, &f.name) {
                    GoField::tagged(
                        &format!("Len{}", to_upper_first(&f.name)),
                        GoType::named("int"),
                        &format!("json:\"len({})\"", f.name),
                    )
                } else {
                    GoField::tagged(
                        &to_upper_first(&f.name),
                        super::common::go_type(&f.ty),
                        &format!("json:\"{}\"", to_snake_case(&f.name)),
                    )
                }
            })
            .collect();
        Some(GoDecl::Struct {
            doc: Vec::new(),
            name: name.to_string(),
            fields,
        })
    }

    /// Companion struct literal for the log call.
    fn companion_literal(&self, name: &str, method: &Method, fields: &[Field]) -> GoExpr {
        let fields = self
            .remaining(&method.name, fields)
            .iter()
            .map(|f| {
                if self.is_length(&method.name, &f.name) {
                    (
                        format!("Len{}", to_upper_first(&f.name)),
                        GoExpr::call(GoExpr::ident("len"), vec![GoExpr::ident(&f.name)]),
                    )
                } else {
                    (to_upper_first(&f.name), GoExpr::ident(&f.name))
                }
            })
            .collect();
        GoExpr::StructLit {
            ty: name.to_string(),
            fields,
            multiline: false,
        }
    }

    fn log_call_args(&self, method: &Method) -> Vec<GoExpr> {
        let mut args = vec![GoExpr::str("method"), GoExpr::str(&method.name)];
        let params = method.params_sans_context();
        if !self.remaining(&method.name, params).is_empty() {
            args.push(GoExpr::str("request"));
            args.push(self.companion_literal(&request_struct(method), method, params));
        }
        let results = method.results_sans_error();
        if !self.remaining(&method.name, results).is_empty() {
            args.push(GoExpr::str("response"));
            args.push(self.companion_literal(&response_struct(method), method, results));
        }
        if let Some(err_name) = method.error_result_name()
            && !self.is_ignored(&method.name, err_name)
        {
            args.push(GoExpr::str(err_name));
            args.push(GoExpr::ident(err_name));
        }
        args.push(GoExpr::str("took"));
        args.push(GoExpr::call(
            GoExpr::qual("time", "Since"),
            vec![GoExpr::ident("begin")],
        ));
        args
    }

    fn logging_method(&self, method: &Method) -> GoDecl {
        let recv = receiver_ident(STRUCT_NAME);
        let log_call = GoExpr::method_call(
            GoExpr::select(GoExpr::ident(&recv), "logger"),
            "Log",
            self.log_call_args(method),
        );
        let body = vec![
            GoStmt::Defer(GoExpr::call(
                GoExpr::FuncLit {
                    params: vec![GoField::new("begin", GoType::qual("time", "Time"))],
                    results: Vec::new(),
                    body: vec![GoStmt::Expr(log_call)],
                },
                vec![GoExpr::call(GoExpr::qual("time", "Now"), Vec::new())],
            )),
            delegate_stmt(STRUCT_NAME, method),
        ];
        forwarding_method(STRUCT_NAME, method, Vec::new(), body)
    }
}

fn request_struct(method: &Method) -> String {
    format!("log{}Request", method.name)
}

fn response_struct(method: &Method) -> String {
    format!("log{}Response", method.name)
}

impl Generator for LoggingGenerator {
    fn prepare(&mut self, ctx: &GenerationContext) -> Result<(), String> {
        for method in &ctx.ir.methods {
            self.ignored.insert(
                method.name.clone(),
                values_for(&method.directives, IGNORE_KEY)
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
            );
            self.length.insert(
                method.name.clone(),
                values_for(&method.directives, LEN_KEY)
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
            );
        }
        Ok(())
    }

    fn render(&self, ctx: &GenerationContext) -> Result<String, String> {
        let mut file = GoFile::new("middleware");
        file.header = vec![FILE_HEADER.to_string(), DO_NOT_EDIT.to_string()];
        file.imports = merged_imports(
            field_imports(&ctx.ir.methods),
            &[
                ("log", PKG_GOKIT_LOG),
                ("time", PKG_TIME),
                (super::common::SERVICE_ALIAS, &ctx.location.import_path),
            ],
        );

        file.decls.push(decorator_constructor(
            "ServiceLogging writes params, results and working time of method call to provided logger after its execution.",
            "ServiceLogging",
            STRUCT_NAME,
            "logger",
            GoType::qual("log", "Logger"),
            ctx,
        ));
        file.decls.push(decorator_struct(
            STRUCT_NAME,
            "logger",
            GoType::qual("log", "Logger"),
            ctx,
        ));
        for method in &ctx.ir.methods {
            file.decls.push(self.logging_method(method));
        }
        for method in &ctx.ir.methods {
            if let Some(decl) =
                self.companion_struct(&request_struct(method), method, method.params_sans_context())
            {
                file.decls.push(decl);
            }
            if let Some(decl) = self.companion_struct(
                &response_struct(method),
                method,
                method.results_sans_error(),
            ) {
                file.decls.push(decl);
            }
        }
        Ok(file.emit())
    }

    fn choose_strategy(
        &self,
        ctx: &GenerationContext,
    ) -> Result<Option<(PathBuf, WriteStrategy)>, String> {
        Ok(Some((
            ctx.location.output_dir.join(&self.path),
            WriteStrategy::AlwaysOverwrite,
        )))
    }
}
