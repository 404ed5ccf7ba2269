//! End-to-end pipeline tests: declarations in, files on disk out.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use svcgen_core::ir::DEFAULT_MARKER;
use svcgen_core::{
    GenerationContext, GeneratorSpec, Registry, SourceLocation, extract_interface,
    parse_decl_file, validate_interface, write_artifacts,
};

const DECLS: &str = r##"{
  "interfaces": [
    {
      "name": "StringService",
      "docs": ["StringService processes strings.", "@svcgen:generate tracing"],
      "methods": [
        {
          "name": "Uppercase",
          "docs": ["@svcgen:logs-ignore text"],
          "params": [
            { "name": "ctx", "type": { "name": "Context", "package": { "name": "context", "path": "context" } } },
            { "name": "text", "type": { "name": "string" } }
          ],
          "results": [
            { "name": "upper", "type": { "name": "string" } },
            { "name": "err", "type": { "name": "error" } }
          ]
        },
        {
          "name": "Count",
          "docs": ["@svcgen:logs-len positions", "@svcgen:jsonrpc-prefix str."],
          "params": [
            { "name": "ctx", "type": { "name": "Context", "package": { "name": "context", "path": "context" } } },
            { "name": "text", "type": { "name": "string" } },
            { "name": "symbol", "type": { "name": "string" } }
          ],
          "results": [
            { "name": "count", "type": { "name": "int" } },
            { "name": "positions", "type": { "name": "int", "isArray": true } },
            { "name": "err", "type": { "name": "error" } }
          ]
        },
        {
          "name": "Tokenize",
          "params": [
            { "name": "ctx", "type": { "name": "Context", "package": { "name": "context", "path": "context" } } },
            { "name": "text", "type": { "name": "string" } }
          ],
          "results": [
            { "name": "tokens", "type": { "name": "Token", "isArray": true, "package": { "name": "entity", "path": "example.com/stringsvc/entity" } } },
            { "name": "err", "type": { "name": "error" } }
          ]
        }
      ]
    }
  ]
}"##;

const GENERATORS: &[&str] = &[
    "middleware",
    "logging",
    "recovering",
    "tracing",
    "transport-jsonrpc",
    "stub-service",
    "type-converters",
    "cmd-main",
];

fn run_pipeline(dir: &Path) {
    let decl_file = parse_decl_file(DECLS).unwrap();
    let ir = extract_interface(&decl_file.interfaces, None, DEFAULT_MARKER).unwrap();
    validate_interface(&ir).unwrap();

    let location = SourceLocation {
        source_dir: dir.to_path_buf(),
        output_dir: dir.to_path_buf(),
        import_path: "example.com/stringsvc".to_string(),
        package_name: "stringsvc".to_string(),
        force: false,
    };
    let ctx = GenerationContext::new(ir, location);
    let sequence: Vec<GeneratorSpec> = GENERATORS
        .iter()
        .map(|name| GeneratorSpec {
            name: (*name).to_string(),
            args: Default::default(),
        })
        .collect();
    let ctx = Registry::builtin().run(ctx, &sequence).unwrap();
    write_artifacts(&ctx.artifacts).unwrap();
}

#[test]
fn test_full_run_produces_every_artifact() {
    let dir = TempDir::new().unwrap();
    run_pipeline(dir.path());

    for relative in [
        "middleware/middleware.go",
        "middleware/logging.go",
        "middleware/recovering.go",
        "middleware/tracing.go",
        "transport/jsonrpc/server.go",
        "service.go",
        "transport/converter/protobuf/type_converters.go",
        "cmd/string_service/main.go",
    ] {
        assert!(
            dir.path().join(relative).exists(),
            "missing artifact {relative}"
        );
    }
}

#[test]
fn test_directives_flow_into_generators() {
    let dir = TempDir::new().unwrap();
    run_pipeline(dir.path());

    let logging = fs::read_to_string(dir.path().join("middleware/logging.go")).unwrap();
    // Uppercase's only request field is ignored: no request companion.
    assert!(!logging.contains("logUppercaseRequest"));
    assert!(logging.contains("logUppercaseResponse"));
    // Count logs positions by length.
    assert!(logging.contains("LenPositions: len(positions)"));

    let server = fs::read_to_string(dir.path().join("transport/jsonrpc/server.go")).unwrap();
    // Per-method prefix directive decorates the request identifier.
    assert!(server.contains("\"str.Count\""));
    assert!(server.contains("\"Uppercase\""));
    // Interface-level tracing flag wraps every entry.
    assert!(server.contains("kittracing.HTTPToContext(tracer, \"Count\", logger)"));

    let converters =
        fs::read_to_string(dir.path().join("transport/converter/protobuf/type_converters.go"))
            .unwrap();
    // Only the entity-typed result needs converter stubs.
    assert!(converters.contains("func TokenListToProto"));
    assert!(converters.contains("func ProtoToTokenList"));
}

#[test]
fn test_second_run_is_idempotent() {
    let dir = TempDir::new().unwrap();
    run_pipeline(dir.path());

    let stub_first = fs::read_to_string(dir.path().join("service.go")).unwrap();
    let conv_first =
        fs::read_to_string(dir.path().join("transport/converter/protobuf/type_converters.go"))
            .unwrap();

    run_pipeline(dir.path());

    let stub_second = fs::read_to_string(dir.path().join("service.go")).unwrap();
    let conv_second =
        fs::read_to_string(dir.path().join("transport/converter/protobuf/type_converters.go"))
            .unwrap();
    assert_eq!(stub_first, stub_second, "stub file must not grow");
    assert_eq!(conv_first, conv_second, "converter file must not grow");
}

#[test]
fn test_hand_written_completion_survives_regeneration() {
    let dir = TempDir::new().unwrap();
    run_pipeline(dir.path());

    // Hand-complete one stub method by replacing the whole file, as a
    // developer would edit service.go in place.
    let service_path = dir.path().join("service.go");
    let hand_written = fs::read_to_string(&service_path)
        .unwrap()
        .replace("panic(\"constructor not provided\")", "return &stringService{}");
    fs::write(&service_path, &hand_written).unwrap();

    run_pipeline(dir.path());

    let after = fs::read_to_string(&service_path).unwrap();
    assert_eq!(after, hand_written, "hand-written edits must survive");
}

#[test]
fn test_skip_class_artifacts_never_overwrite() {
    let dir = TempDir::new().unwrap();
    run_pipeline(dir.path());

    let main_path = dir.path().join("cmd/string_service/main.go");
    fs::write(&main_path, "package main // customized\n").unwrap();
    let server_path = dir.path().join("transport/jsonrpc/server.go");
    fs::write(&server_path, "package transportjsonrpc // customized\n").unwrap();

    run_pipeline(dir.path());

    assert_eq!(
        fs::read_to_string(&main_path).unwrap(),
        "package main // customized\n"
    );
    assert_eq!(
        fs::read_to_string(&server_path).unwrap(),
        "package transportjsonrpc // customized\n"
    );
}
