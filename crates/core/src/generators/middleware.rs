//! Middleware function-type declaration.

use std::path::PathBuf;

use crate::gocode::{Emit, GoDecl, GoFile};
use crate::pipeline::{GenerationContext, Generator, GeneratorArgs, WriteStrategy};

use super::common::{DO_NOT_EDIT, FILE_HEADER, MIDDLEWARE_TYPE, service_import, service_type};

const DEFAULT_PATH: &str = "middleware/middleware.go";

#[derive(Debug)]
pub struct MiddlewareGenerator {
    path: String,
}

impl MiddlewareGenerator {
    pub fn create(args: &GeneratorArgs) -> Box<dyn Generator> {
        Box::new(MiddlewareGenerator {
            path: args
                .get("path")
                .cloned()
                .unwrap_or_else(|| DEFAULT_PATH.to_string()),
        })
    }
}

impl Generator for MiddlewareGenerator {
    fn render(&self, ctx: &GenerationContext) -> Result<String, String> {
        let mut file = GoFile::new("middleware");
        file.header = vec![FILE_HEADER.to_string(), DO_NOT_EDIT.to_string()];
        file.imports = vec![service_import(ctx)];
        file.decls = vec![GoDecl::FuncType {
            doc: vec![format!(
                "{MIDDLEWARE_TYPE} decorates a {} with cross-cutting behavior.",
                ctx.ir.name
            )],
            name: MIDDLEWARE_TYPE.to_string(),
            params: vec![service_type(ctx)],
            results: vec![service_type(ctx)],
        }];
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

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::generators::testutil::adder_ctx;

    #[test]
    fn test_middleware_type_declaration() {
        let ctx = adder_ctx();
        let generator = MiddlewareGenerator::create(&GeneratorArgs::new());
        let content = generator.render(&ctx).unwrap();
        assert!(content.contains("package middleware"));
        assert!(content.contains("type Middleware func(svc.Adder) svc.Adder"));
        assert!(content.contains("svc \"example.com/adder\""));
    }

    #[test]
    fn test_path_override() {
        let ctx = adder_ctx();
        let mut args = GeneratorArgs::new();
        args.insert("path".to_string(), "mw/mw.go".to_string());
        let generator = MiddlewareGenerator::create(&args);
        let (path, strategy) = generator.choose_strategy(&ctx).unwrap().unwrap();
        assert!(path.ends_with("mw/mw.go"));
        assert_eq!(strategy, WriteStrategy::AlwaysOverwrite);
    }
}
