//! Panic-recovery decorator generator.
//!
//! Each forwarding method converts a panic in the wrapped implementation into
//! the method's named error result, after logging it.

use std::path::PathBuf;

use crate::gocode::{Emit, GoExpr, GoFile, GoStmt, GoType};
use crate::ir::Method;
use crate::pipeline::{GenerationContext, Generator, GeneratorArgs, WriteStrategy};
use crate::strings::receiver_ident;

use super::common::{
    DO_NOT_EDIT, FILE_HEADER, PKG_FMT, PKG_GOKIT_LOG, SERVICE_ALIAS, decorator_constructor,
    decorator_struct, delegate_stmt, field_imports, forwarding_method, merged_imports,
};

const DEFAULT_PATH: &str = "middleware/recovering.go";
const STRUCT_NAME: &str = "serviceRecovering";

#[derive(Debug)]
pub struct RecoveringGenerator {
    path: String,
}

impl RecoveringGenerator {
    pub fn create(args: &GeneratorArgs) -> Box<dyn Generator> {
        Box::new(RecoveringGenerator {
            path: args
                .get("path")
                .cloned()
                .unwrap_or_else(|| DEFAULT_PATH.to_string()),
        })
    }
}

fn recovering_method(method: &Method) -> Result<crate::gocode::GoDecl, String> {
    let recv = receiver_ident(STRUCT_NAME);
    let err_name = method.error_result_name().ok_or_else(|| {
        format!(
            "{}: recovering decorator requires a trailing error result",
            method.name
        )
    })?;
    let recover_block = GoStmt::Raw(format!(
        "if r := recover(); r != nil {{\n\t{recv}.logger.Log(\"method\", \"{name}\", \"message\", r)\n\t{err_name} = fmt.Errorf(\"%v\", r)\n}}",
        name = method.name,
    ));
    let body = vec![
        GoStmt::Defer(GoExpr::call(
            GoExpr::FuncLit {
                params: Vec::new(),
                results: Vec::new(),
                body: vec![recover_block],
            },
            Vec::new(),
        )),
        delegate_stmt(STRUCT_NAME, method),
    ];
    Ok(forwarding_method(STRUCT_NAME, method, Vec::new(), body))
}

impl Generator for RecoveringGenerator {
    fn render(&self, ctx: &GenerationContext) -> Result<String, String> {
        let mut file = GoFile::new("middleware");
        file.header = vec![FILE_HEADER.to_string(), DO_NOT_EDIT.to_string()];
        file.imports = merged_imports(
            field_imports(&ctx.ir.methods),
            &[
                ("fmt", PKG_FMT),
                ("log", PKG_GOKIT_LOG),
                (SERVICE_ALIAS, &ctx.location.import_path),
            ],
        );
        file.decls.push(decorator_constructor(
            "ServiceRecovering recovers panics from method calls, writes to provided logger and returns the panic message as an error.",
            "ServiceRecovering",
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
            file.decls.push(recovering_method(method)?);
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
