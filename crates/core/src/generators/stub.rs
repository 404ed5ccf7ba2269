//! Stub service implementation generator.
//!
//! Inspects the existing service file for the implementation struct, the
//! conventional constructor, and per-method receiver functions, then emits
//! only what is missing. The target keeps hand-written completions: the
//! artifact appends missing symbols and never rewrites existing ones.

use std::fs;
use std::path::PathBuf;

use tracing::debug;

use crate::gocode::{
    Emit, GoDecl, GoExpr, GoField, GoFile, GoFunc, GoReceiver, GoStmt, GoType, scan_symbols,
};
use crate::ir::Method;
use crate::merge::{SymbolIndex, SymbolKind};
use crate::pipeline::{GenerationContext, Generator, GeneratorArgs, WriteStrategy};
use crate::strings::{receiver_ident, to_lower_first};

use super::common::{FILE_HEADER, field_imports, param_fields};

const DEFAULT_PATH: &str = "service.go";

#[derive(Debug)]
pub struct StubServiceGenerator {
    path: String,
    struct_exists: bool,
    constructor_exists: bool,
    existing_methods: Vec<String>,
}

impl StubServiceGenerator {
    pub fn create(args: &GeneratorArgs) -> Box<dyn Generator> {
        Box::new(StubServiceGenerator {
            path: args
                .get("path")
                .cloned()
                .unwrap_or_else(|| DEFAULT_PATH.to_string()),
            struct_exists: false,
            constructor_exists: false,
            existing_methods: Vec::new(),
        })
    }

    fn target(&self, ctx: &GenerationContext) -> PathBuf {
        ctx.location.source_dir.join(&self.path)
    }
}

fn struct_name(ctx: &GenerationContext) -> String {
    to_lower_first(&ctx.ir.name)
}

fn constructor_name(ctx: &GenerationContext) -> String {
    format!("New{}", ctx.ir.name)
}

fn panic_stmt(message: &str) -> GoStmt {
    GoStmt::Expr(GoExpr::call(
        GoExpr::ident("panic"),
        vec![GoExpr::str(message)],
    ))
}

fn stub_method(struct_name: &str, method: &Method) -> GoDecl {
    GoDecl::Method {
        doc: Vec::new(),
        recv: GoReceiver {
            name: receiver_ident(struct_name),
            ty: struct_name.to_string(),
            pointer: true,
        },
        func: GoFunc {
            name: method.name.clone(),
            params: param_fields(&method.params),
            results: param_fields(&method.results),
            body: vec![panic_stmt("method not provided")],
        },
    }
}

impl Generator for StubServiceGenerator {
    fn prepare(&mut self, ctx: &GenerationContext) -> Result<(), String> {
        let target = self.target(ctx);
        if !target.exists() {
            debug!(path = %target.display(), "No existing service file, emitting full stub.");
            return Ok(());
        }
        let content = fs::read_to_string(&target)
            .map_err(|err| format!("Failed to read {}: {err}", target.display()))?;
        let spans = scan_symbols(&content);
        let index = SymbolIndex::from_spans(&spans);

        let name = struct_name(ctx);
        self.struct_exists = index.contains(SymbolKind::Struct, &name);
        self.constructor_exists = index.contains(SymbolKind::Function, &constructor_name(ctx));
        self.existing_methods = ctx
            .ir
            .methods
            .iter()
            .filter(|m| index.contains(SymbolKind::Method, &format!("{name}.{}", m.name)))
            .map(|m| m.name.clone())
            .collect();
        Ok(())
    }

    fn render(&self, ctx: &GenerationContext) -> Result<String, String> {
        let name = struct_name(ctx);
        let mut file = GoFile::new(&ctx.location.package_name);
        file.header = vec![FILE_HEADER.to_string()];
        file.imports = field_imports(&ctx.ir.methods);

        if !self.struct_exists {
            file.decls.push(GoDecl::Struct {
                doc: vec![format!("{name} implements the {} interface.", ctx.ir.name)],
                name: name.clone(),
                fields: Vec::new(),
            });
        }
        if !self.constructor_exists {
            file.decls.push(GoDecl::Func {
                doc: Vec::new(),
                func: GoFunc {
                    name: constructor_name(ctx),
                    params: Vec::new(),
                    results: vec![GoField::new("", GoType::named(&ctx.ir.name))],
                    body: vec![panic_stmt("constructor not provided")],
                },
            });
        }
        for method in &ctx.ir.methods {
            if !self.existing_methods.contains(&method.name) {
                file.decls.push(stub_method(&name, method));
            }
        }
        Ok(file.emit())
    }

    fn choose_strategy(
        &self,
        ctx: &GenerationContext,
    ) -> Result<Option<(PathBuf, WriteStrategy)>, String> {
        Ok(Some((
            self.target(ctx),
            WriteStrategy::AppendMissingSymbols,
        )))
    }
}
