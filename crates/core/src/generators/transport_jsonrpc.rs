//! JSON-RPC transport server binding.
//!
//! Builds, per method, a codec-map entry from the request identifier to the
//! {endpoint, request decoder, response encoder} triple. The identifier can
//! be adjusted per method with the `jsonrpc-prefix` / `jsonrpc-suffix`
//! directives. When the interface-level `generate` directive carries the
//! `tracing` value, every entry also propagates the trace context extracted
//! from the inbound request before the endpoint is invoked.

use std::collections::BTreeMap;
use std::path::PathBuf;

use tracing::debug;

use crate::gocode::{Emit, GoDecl, GoExpr, GoField, GoFile, GoFunc, GoStmt, GoType};
use crate::ir::{Method, TRACING_VALUE, generate_flags, values_for};
use crate::pipeline::{GenerationContext, Generator, GeneratorArgs, WriteStrategy};
use crate::strings::to_lower_first;

use super::common::{
    FILE_HEADER, PKG_GOKIT_JSONRPC, PKG_GOKIT_LOG, PKG_GOKIT_TRACING, PKG_HTTP, PKG_OPENTRACING,
    SERVICE_ALIAS, merged_imports,
};

const DEFAULT_PATH: &str = "transport/jsonrpc/server.go";

const PREFIX_KEY: &str = "jsonrpc-prefix";
const SUFFIX_KEY: &str = "jsonrpc-suffix";

#[derive(Debug)]
pub struct JsonRpcServerGenerator {
    path: String,
    /// Per-method request-identifier prefixes, cached in `prepare`.
    prefixes: BTreeMap<String, String>,
    /// Per-method request-identifier suffixes, cached in `prepare`.
    suffixes: BTreeMap<String, String>,
    tracing: bool,
}

impl JsonRpcServerGenerator {
    pub fn create(args: &GeneratorArgs) -> Box<dyn Generator> {
        Box::new(JsonRpcServerGenerator {
            path: args
                .get("path")
                .cloned()
                .unwrap_or_else(|| DEFAULT_PATH.to_string()),
            prefixes: BTreeMap::new(),
            suffixes: BTreeMap::new(),
            tracing: false,
        })
    }

    fn request_id(&self, method: &Method) -> String {
        format!(
            "{}{}{}",
            self.prefixes.get(&method.name).map_or("", String::as_str),
            method.name,
            self.suffixes.get(&method.name).map_or("", String::as_str),
        )
    }

    /// Server options for one entry: plain `opts...`, or the tracing wrapper
    /// appended in front of them.
    fn server_opts(&self, method: &Method) -> GoExpr {
        if !self.tracing {
            return GoExpr::Variadic(Box::new(GoExpr::ident("opts")));
        }
        let before = GoExpr::call(
            GoExpr::qual("jsonrpc", "ServerBefore"),
            vec![GoExpr::call(
                GoExpr::qual("kittracing", "HTTPToContext"),
                vec![
                    GoExpr::ident("tracer"),
                    GoExpr::str(&method.name),
                    GoExpr::ident("logger"),
                ],
            )],
        );
        GoExpr::Variadic(Box::new(GoExpr::call(
            GoExpr::ident("append"),
            vec![GoExpr::ident("opts"), before],
        )))
    }

    fn codec_entry(&self, method: &Method) -> (GoExpr, GoExpr) {
        let codec = GoExpr::StructLit {
            ty: "jsonrpc.EndpointCodec".to_string(),
            fields: vec![
                (
                    "Endpoint".to_string(),
                    GoExpr::select(
                        GoExpr::ident("endpoints"),
                        &format!("{}Endpoint", method.name),
                    ),
                ),
                (
                    "Decode".to_string(),
                    GoExpr::qual("converter", &format!("Decode{}Request", method.name)),
                ),
                (
                    "Encode".to_string(),
                    GoExpr::qual("converter", &format!("Encode{}Response", method.name)),
                ),
            ],
            multiline: true,
        };
        let server = GoExpr::call(
            GoExpr::qual("jsonrpc", "NewServer"),
            vec![
                GoExpr::MapLit {
                    ty: Box::new(GoExpr::qual("jsonrpc", "EndpointCodecMap")),
                    entries: vec![(GoExpr::str(&self.request_id(method)), codec)],
                    multiline: true,
                },
                self.server_opts(method),
            ],
        );
        (GoExpr::ident(&to_lower_first(&method.name)), server)
    }

    fn server_struct_name(ctx: &GenerationContext) -> String {
        format!("{}Server", to_lower_first(&ctx.ir.name))
    }
}

impl Generator for JsonRpcServerGenerator {
    fn prepare(&mut self, ctx: &GenerationContext) -> Result<(), String> {
        for method in &ctx.ir.methods {
            if let Some(prefix) = values_for(&method.directives, PREFIX_KEY).first() {
                self.prefixes
                    .insert(method.name.clone(), (*prefix).to_string());
            }
            if let Some(suffix) = values_for(&method.directives, SUFFIX_KEY).first() {
                self.suffixes
                    .insert(method.name.clone(), (*suffix).to_string());
            }
        }
        self.tracing = generate_flags(&ctx.ir.directives).contains(&TRACING_VALUE);
        Ok(())
    }

    fn render(&self, ctx: &GenerationContext) -> Result<String, String> {
        let struct_name = Self::server_struct_name(ctx);
        let mut file = GoFile::new("transportjsonrpc");
        file.header = vec![FILE_HEADER.to_string(), "DO NOT EDIT.".to_string()];

        let converter_path = format!("{}/transport/converter/jsonrpc", ctx.location.import_path);
        let mut imports = vec![
            ("converter", converter_path.as_str()),
            ("http", PKG_HTTP),
            ("jsonrpc", PKG_GOKIT_JSONRPC),
            (SERVICE_ALIAS, ctx.location.import_path.as_str()),
        ];
        if self.tracing {
            imports.push(("kittracing", PKG_GOKIT_TRACING));
            imports.push(("log", PKG_GOKIT_LOG));
            imports.push(("opentracing", PKG_OPENTRACING));
        }
        file.imports = merged_imports(Vec::new(), &imports);

        file.decls.push(GoDecl::Struct {
            doc: Vec::new(),
            name: struct_name.clone(),
            fields: ctx
                .ir
                .methods
                .iter()
                .map(|m| GoField::new(&to_lower_first(&m.name), GoType::qual("http", "Handler")))
                .collect(),
        });

        let mut params = vec![GoField::new(
            "endpoints",
            GoType::Pointer(Box::new(GoType::qual(SERVICE_ALIAS, "Endpoints"))),
        )];
        if self.tracing {
            params.push(GoField::new("logger", GoType::qual("log", "Logger")));
            params.push(GoField::new(
                "tracer",
                GoType::qual("opentracing", "Tracer"),
            ));
        }
        params.push(GoField::new(
            "opts",
            GoType::Variadic(Box::new(GoType::qual("jsonrpc", "ServerOption"))),
        ));

        let handlers = ctx
            .ir
            .methods
            .iter()
            .map(|m| {
                let (field, server) = self.codec_entry(m);
                (field.emit(), server)
            })
            .collect();

        file.decls.push(GoDecl::Func {
            doc: vec![format!(
                "NewJSONRPCServer mounts one JSON-RPC handler per {} method.",
                ctx.ir.name
            )],
            func: GoFunc {
                name: "NewJSONRPCServer".to_string(),
                params,
                results: vec![GoField::new("", GoType::qual("http", "Handler"))],
                body: vec![GoStmt::Return(vec![GoExpr::Ref(Box::new(
                    GoExpr::StructLit {
                        ty: struct_name,
                        fields: handlers,
                        multiline: true,
                    },
                ))])],
            },
        });

        Ok(file.emit())
    }

    fn choose_strategy(
        &self,
        ctx: &GenerationContext,
    ) -> Result<Option<(PathBuf, WriteStrategy)>, String> {
        let path = ctx.location.output_dir.join(&self.path);
        if path.exists() && !ctx.location.force {
            debug!(path = %path.display(), "Transport server already exists, skipping.");
            return Ok(None);
        }
        let strategy = if ctx.location.force {
            WriteStrategy::AlwaysOverwrite
        } else {
            WriteStrategy::CreateIfAbsent
        };
        Ok(Some((path, strategy)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::generators::testutil::{adder_ctx, ctx_with_methods, method_with_directives, tracing_ctx};

    fn rendered(ctx: &GenerationContext) -> String {
        let mut generator = JsonRpcServerGenerator::create(&GeneratorArgs::new());
        generator.prepare(ctx).unwrap();
        generator.render(ctx).unwrap()
    }

    #[test]
    fn test_codec_table_entry() {
        let content = rendered(&adder_ctx());
        assert!(content.contains("package transportjsonrpc"));
        assert!(content.contains("type adderServer struct {"));
        assert!(content.contains("add http.Handler"));
        assert!(content.contains("\"Add\": jsonrpc.EndpointCodec{"));
        assert!(content.contains("Endpoint: endpoints.AddEndpoint"));
        assert!(content.contains("Decode: converter.DecodeAddRequest"));
        assert!(content.contains("Encode: converter.EncodeAddResponse"));
        assert!(content.contains("opts...)"));
        // No tracing machinery without the interface-level flag.
        assert!(!content.contains("HTTPToContext"));
        assert!(!content.contains("tracer"));
    }

    #[test]
    fn test_prefix_suffix_directives() {
        let ctx = ctx_with_methods(vec![method_with_directives(
            "Add",
            &["@svcgen:jsonrpc-prefix calc.", "@svcgen:jsonrpc-suffix .v1"],
        )]);
        let content = rendered(&ctx);
        assert!(content.contains("\"calc.Add.v1\": jsonrpc.EndpointCodec{"));
    }

    #[test]
    fn test_tracing_wraps_entries() {
        let content = rendered(&tracing_ctx());
        assert!(content.contains("logger log.Logger"));
        assert!(content.contains("tracer opentracing.Tracer"));
        assert!(content.contains(
            "append(opts, jsonrpc.ServerBefore(kittracing.HTTPToContext(tracer, \"Add\", logger)))..."
        ));
    }

    #[test]
    fn test_skip_when_file_exists_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = adder_ctx();
        ctx.location.output_dir = dir.path().to_path_buf();
        let target = dir.path().join(DEFAULT_PATH);
        std::fs::create_dir_all(target.parent().unwrap()).unwrap();
        std::fs::write(&target, "hand edited").unwrap();

        let generator = JsonRpcServerGenerator::create(&GeneratorArgs::new());
        assert!(generator.choose_strategy(&ctx).unwrap().is_none());

        ctx.location.force = true;
        let (_, strategy) = generator.choose_strategy(&ctx).unwrap().unwrap();
        assert_eq!(strategy, WriteStrategy::AlwaysOverwrite);
    }
}
