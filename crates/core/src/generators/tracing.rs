//! Distributed-tracing decorator generator.
//!
//! Each forwarding method opens a span named after the method from the
//! inbound context, delegates with the span-carrying context, and finishes
//! the span when the call returns.

use std::path::PathBuf;

use crate::gocode::{Emit, GoExpr, GoFile, GoStmt, GoType};
use crate::ir::Method;
use crate::pipeline::{GenerationContext, Generator, GeneratorArgs, WriteStrategy};

use super::common::{
    DO_NOT_EDIT, FILE_HEADER, PKG_OPENTRACING, SERVICE_ALIAS, decorator_constructor,
    decorator_struct, delegate_stmt, field_imports, forwarding_method, merged_imports,
};

const DEFAULT_PATH: &str = "middleware/tracing.go";
const STRUCT_NAME: &str = "serviceTracing";

#[derive(Debug)]
pub struct TracingGenerator {
    path: String,
}

impl TracingGenerator {
    pub fn create(args: &GeneratorArgs) -> Box<dyn Generator> {
        Box::new(TracingGenerator {
            path: args
                .get("path")
                .cloned()
                .unwrap_or_else(|| DEFAULT_PATH.to_string()),
        })
    }
}

fn tracing_method(method: &Method) -> crate::gocode::GoDecl {
    let body = vec![
        GoStmt::Assign {
            lhs: vec![GoExpr::ident("span"), GoExpr::ident("ctx")],
            rhs: vec![GoExpr::call(
                GoExpr::qual("opentracing", "StartSpanFromContext"),
                vec![GoExpr::ident("ctx"), GoExpr::str(&method.name)],
            )],
            define: true,
        },
        GoStmt::Defer(GoExpr::method_call(GoExpr::ident("span"), "Finish", Vec::new())),
        delegate_stmt(STRUCT_NAME, method),
    ];
    forwarding_method(STRUCT_NAME, method, Vec::new(), body)
}

impl Generator for TracingGenerator {
    fn render(&self, ctx: &GenerationContext) -> Result<String, String> {
        let mut file = GoFile::new("middleware");
        file.header = vec![FILE_HEADER.to_string(), DO_NOT_EDIT.to_string()];
        file.imports = merged_imports(
            field_imports(&ctx.ir.methods),
            &[
                ("opentracing", PKG_OPENTRACING),
                (SERVICE_ALIAS, &ctx.location.import_path),
            ],
        );
        file.decls.push(decorator_constructor(
            "ServiceTracing opens a span per method call and propagates it through the call context.",
            "ServiceTracing",
            STRUCT_NAME,
            "tracer",
            GoType::qual("opentracing", "Tracer"),
            ctx,
        ));
        file.decls.push(decorator_struct(
            STRUCT_NAME,
            "tracer",
            GoType::qual("opentracing", "Tracer"),
            ctx,
        ));
        for method in &ctx.ir.methods {
            file.decls.push(tracing_method(method));
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
