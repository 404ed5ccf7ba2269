//! Runnable entry-point skeleton.
//!
//! Emits a `main.go` that wires the stub service, the generated middleware
//! chain, and the JSON-RPC transport into a running process. The file is a
//! starting point for hand completion and is never overwritten.

use std::path::PathBuf;

use crate::gocode::{Emit, GoDecl, GoExpr, GoField, GoFile, GoFunc, GoStmt, GoType};
use crate::ir::{TRACING_VALUE, generate_flags};
use crate::pipeline::{GenerationContext, Generator, GeneratorArgs, WriteStrategy};
use crate::strings::to_snake_case;

use super::common::{
    FILE_HEADER, PKG_ERRORS, PKG_GOKIT_LOG, PKG_HTTP, PKG_OPENTRACING, PKG_OS, PKG_OS_SIGNAL,
    PKG_SYSCALL, SERVICE_ALIAS, merged_imports,
};

#[derive(Debug)]
pub struct CmdMainGenerator {
    path: Option<String>,
    tracing: bool,
}

impl CmdMainGenerator {
    pub fn create(args: &GeneratorArgs) -> Box<dyn Generator> {
        Box::new(CmdMainGenerator {
            path: args.get("path").cloned(),
            tracing: false,
        })
    }

    fn target(&self, ctx: &GenerationContext) -> PathBuf {
        let relative = self.path.clone().unwrap_or_else(|| {
            format!("cmd/{}/main.go", to_snake_case(&ctx.ir.name))
        });
        ctx.location.output_dir.join(relative)
    }

    fn main_func(&self, ctx: &GenerationContext) -> GoDecl {
        let mut body = vec![
            GoStmt::Assign {
                lhs: vec![GoExpr::ident("logger")],
                rhs: vec![GoExpr::call(GoExpr::ident("InitLogger"), Vec::new())],
                define: true,
            },
            GoStmt::Defer(GoExpr::method_call(
                GoExpr::ident("logger"),
                "Log",
                vec![GoExpr::str("goodbye"), GoExpr::str("good luck")],
            )),
            GoStmt::Raw("\nerrorChan := make(chan error)\ngo InterruptHandler(errorChan)\n".to_string()),
            GoStmt::Raw(format!(
                "\nservice := svc.New{name}()\nservice = middleware.ServiceLogging(logger)(service)\nservice = middleware.ServiceRecovering(logger)(service)\n",
                name = ctx.ir.name
            )),
        ];
        let endpoints = GoExpr::Ref(Box::new(GoExpr::StructLit {
            ty: format!("{SERVICE_ALIAS}.Endpoints"),
            fields: ctx
                .ir
                .methods
                .iter()
                .map(|m| {
                    (
                        format!("{}Endpoint", m.name),
                        GoExpr::call(
                            GoExpr::qual(SERVICE_ALIAS, &format!("{}Endpoint", m.name)),
                            vec![GoExpr::ident("service")],
                        ),
                    )
                })
                .collect(),
            multiline: true,
        }));
        body.push(GoStmt::Assign {
            lhs: vec![GoExpr::ident("endpoints")],
            rhs: vec![endpoints],
            define: true,
        });
        body.push(GoStmt::Raw(
            "\nhttpAddr := \":8080\"\ngo ServeJSONRPC(endpoints, errorChan, httpAddr, log.With(logger, \"transport\", \"JSONRPC\"))\n".to_string(),
        ));
        body.push(GoStmt::Raw("\nlogger.Log(\"error\", <-errorChan)".to_string()));
        GoDecl::Func {
            doc: Vec::new(),
            func: GoFunc {
                name: "main".to_string(),
                params: Vec::new(),
                results: Vec::new(),
                body,
            },
        }
    }

    fn serve_func(&self, _ctx: &GenerationContext) -> GoDecl {
        let server_args = if self.tracing {
            "endpoints, logger, opentracing.GlobalTracer()"
        } else {
            "endpoints"
        };
        GoDecl::Func {
            doc: vec![
                "ServeJSONRPC starts a new HTTP server with the JSON-RPC handler and sends the first error to the channel.".to_string(),
            ],
            func: GoFunc {
                name: "ServeJSONRPC".to_string(),
                params: vec![
                    GoField::new(
                        "endpoints",
                        GoType::Pointer(Box::new(GoType::qual(SERVICE_ALIAS, "Endpoints"))),
                    ),
                    GoField::new("ch", GoType::named("chan<- error")),
                    GoField::new("addr", GoType::named("string")),
                    GoField::new("logger", GoType::qual("log", "Logger")),
                ],
                results: Vec::new(),
                body: vec![GoStmt::Raw(format!(
                    "handler := transportjsonrpc.NewJSONRPCServer({server_args})\nserver := &http.Server{{\n\tAddr:    addr,\n\tHandler: handler,\n}}\nlogger.Log(\"listen on\", addr)\nch <- server.ListenAndServe()",
                ))],
            },
        }
    }
}

fn init_logger_func() -> GoDecl {
    GoDecl::Func {
        doc: vec!["InitLogger initializes a JSON logger with timestamp and caller.".to_string()],
        func: GoFunc {
            name: "InitLogger".to_string(),
            params: Vec::new(),
            results: vec![GoField::new("", GoType::qual("log", "Logger"))],
            body: vec![GoStmt::Raw(
                "logger := log.NewJSONLogger(os.Stdout)\nlogger = log.With(logger, \"@when\", log.DefaultTimestampUTC)\nlogger = log.With(logger, \"@where\", log.DefaultCaller)\nlogger.Log(\"hello\", \"I am alive\")\nreturn logger".to_string(),
            )],
        },
    }
}

fn interrupt_handler_func() -> GoDecl {
    GoDecl::Func {
        doc: vec![
            "InterruptHandler handles the first SIGINT or SIGTERM and sends a message to the error channel.".to_string(),
        ],
        func: GoFunc {
            name: "InterruptHandler".to_string(),
            params: vec![GoField::new("ch", GoType::named("chan<- error"))],
            results: Vec::new(),
            body: vec![GoStmt::Raw(
                "interruptHandler := make(chan os.Signal, 1)\nsignal.Notify(interruptHandler, syscall.SIGINT, syscall.SIGTERM)\nch <- errors.New((<-interruptHandler).String())".to_string(),
            )],
        },
    }
}

impl Generator for CmdMainGenerator {
    fn prepare(&mut self, ctx: &GenerationContext) -> Result<(), String> {
        self.tracing = generate_flags(&ctx.ir.directives).contains(&TRACING_VALUE);
        Ok(())
    }

    fn render(&self, ctx: &GenerationContext) -> Result<String, String> {
        let mut file = GoFile::new("main");
        file.header = vec![
            FILE_HEADER.to_string(),
            "This file will never be overwritten.".to_string(),
        ];
        let middleware_path = format!("{}/middleware", ctx.location.import_path);
        let transport_path = format!("{}/transport/jsonrpc", ctx.location.import_path);
        let mut imports = vec![
            ("errors", PKG_ERRORS),
            ("http", PKG_HTTP),
            ("log", PKG_GOKIT_LOG),
            ("middleware", middleware_path.as_str()),
            ("os", PKG_OS),
            ("signal", PKG_OS_SIGNAL),
            ("svc", ctx.location.import_path.as_str()),
            ("syscall", PKG_SYSCALL),
            ("transportjsonrpc", transport_path.as_str()),
        ];
        if self.tracing {
            imports.push(("opentracing", PKG_OPENTRACING));
        }
        file.imports = merged_imports(Vec::new(), &imports);
        file.decls = vec![
            self.main_func(ctx),
            init_logger_func(),
            interrupt_handler_func(),
            self.serve_func(ctx),
        ];
        Ok(file.emit())
    }

    fn choose_strategy(
        &self,
        ctx: &GenerationContext,
    ) -> Result<Option<(PathBuf, WriteStrategy)>, String> {
        Ok(Some((self.target(ctx), WriteStrategy::SkipIfExists)))
    }
}
