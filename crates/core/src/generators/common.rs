//! Helpers shared by the built-in generators.

use std::collections::BTreeMap;

use crate::gocode::{GoDecl, GoExpr, GoField, GoFunc, GoImport, GoReceiver, GoStmt, GoType};
use crate::ir::{Field, FieldType, Method};
use crate::pipeline::GenerationContext;
use crate::strings::receiver_ident;

/// First header line of every generated file.
pub const FILE_HEADER: &str = "Code generated by \"svcgen\" utility.";
/// Second header line of regenerable files.
pub const DO_NOT_EDIT: &str = "Please, do not edit.";
/// Import alias of the service package in generated files.
pub const SERVICE_ALIAS: &str = "svc";
/// Name of the generated middleware function type.
pub const MIDDLEWARE_TYPE: &str = "Middleware";

pub const PKG_CONTEXT: &str = "context";
pub const PKG_TIME: &str = "time";
pub const PKG_FMT: &str = "fmt";
pub const PKG_ERRORS: &str = "errors";
pub const PKG_HTTP: &str = "net/http";
pub const PKG_OS: &str = "os";
pub const PKG_OS_SIGNAL: &str = "os/signal";
pub const PKG_SYSCALL: &str = "syscall";
pub const PKG_GOKIT_LOG: &str = "github.com/go-kit/kit/log";
pub const PKG_GOKIT_JSONRPC: &str = "github.com/go-kit/kit/transport/http/jsonrpc";
pub const PKG_GOKIT_TRACING: &str = "github.com/go-kit/kit/tracing/opentracing";
pub const PKG_OPENTRACING: &str = "github.com/opentracing/opentracing-go";

/// Map an IR field type to its Go rendering.
pub fn go_type(ty: &FieldType) -> GoType {
    let mut base = if let Some(map) = &ty.map {
        GoType::Map {
            key: Box::new(go_type(&map.key)),
            value: Box::new(go_type(&map.value)),
        }
    } else if let Some(pkg) = &ty.package {
        GoType::qual(&pkg.name, &ty.name)
    } else {
        GoType::named(&ty.name)
    };
    if ty.is_pointer {
        base = GoType::Pointer(Box::new(base));
    }
    if ty.is_array {
        base = GoType::Slice(Box::new(base));
    }
    base
}

/// IR fields as Go parameters/results.
pub fn param_fields(fields: &[Field]) -> Vec<GoField> {
    fields
        .iter()
        .map(|f| GoField::new(&f.name, go_type(&f.ty)))
        .collect()
}

/// Field names as call arguments, in order.
pub fn call_idents(fields: &[Field]) -> Vec<GoExpr> {
    fields.iter().map(|f| GoExpr::ident(&f.name)).collect()
}

/// Qualified reference to the service interface type.
pub fn service_type(ctx: &GenerationContext) -> GoType {
    GoType::qual(SERVICE_ALIAS, &ctx.ir.name)
}

/// Aliased import of the service package.
pub fn service_import(ctx: &GenerationContext) -> GoImport {
    GoImport::new(SERVICE_ALIAS, &ctx.location.import_path)
}

/// Imports required by the packages referenced from the given methods,
/// deduplicated by path and sorted by alias for deterministic output.
pub fn field_imports(methods: &[Method]) -> Vec<GoImport> {
    let mut by_alias: BTreeMap<String, String> = BTreeMap::new();
    for method in methods {
        for field in method.params.iter().chain(method.results.iter()) {
            collect_refs(&field.ty, &mut by_alias);
        }
    }
    by_alias
        .into_iter()
        .map(|(alias, path)| GoImport { alias, path })
        .collect()
}

/// Merge field imports with generator-specific ones, deduplicated by alias
/// and sorted for deterministic emission.
pub fn merged_imports(base: Vec<GoImport>, extra: &[(&str, &str)]) -> Vec<GoImport> {
    let mut by_alias: BTreeMap<String, String> = base
        .into_iter()
        .map(|import| (import.alias, import.path))
        .collect();
    for (alias, path) in extra {
        by_alias.insert((*alias).to_string(), (*path).to_string());
    }
    by_alias
        .into_iter()
        .map(|(alias, path)| GoImport { alias, path })
        .collect()
}

fn collect_refs(ty: &FieldType, out: &mut BTreeMap<String, String>) {
    if let Some(pkg) = &ty.package {
        out.entry(pkg.name.clone()).or_insert_with(|| pkg.path.clone());
    }
    if let Some(map) = &ty.map {
        collect_refs(&map.key, out);
        collect_refs(&map.value, out);
    }
}

/// Forwarding method skeleton shared by the decorators: signature copied from
/// the IR method, body supplied by the caller.
pub fn forwarding_method(
    struct_name: &str,
    method: &Method,
    doc: Vec<String>,
    body: Vec<GoStmt>,
) -> GoDecl {
    GoDecl::Method {
        doc,
        recv: GoReceiver {
            name: receiver_ident(struct_name),
            ty: struct_name.to_string(),
            pointer: true,
        },
        func: GoFunc {
            name: method.name.clone(),
            params: param_fields(&method.params),
            results: param_fields(&method.results),
            body,
        },
    }
}

/// Delegation to the wrapped implementation: `return s.next.Add(ctx, a, b)`.
pub fn delegate_stmt(struct_name: &str, method: &Method) -> GoStmt {
    let recv = receiver_ident(struct_name);
    GoStmt::Return(vec![GoExpr::method_call(
        GoExpr::select(GoExpr::ident(&recv), "next"),
        &method.name,
        call_idents(&method.params),
    )])
}

/// Decorator constructor returning a Middleware:
///
/// ```go
/// func ServiceLogging(logger log.Logger) Middleware {
///     return func(next svc.StringService) svc.StringService {
///         return &serviceLogging{
///             logger: logger,
///             next:   next,
///         }
///     }
/// }
/// ```
pub fn decorator_constructor(
    doc: &str,
    fn_name: &str,
    struct_name: &str,
    dep_name: &str,
    dep_ty: GoType,
    ctx: &GenerationContext,
) -> GoDecl {
    GoDecl::Func {
        doc: vec![doc.to_string()],
        func: GoFunc {
            name: fn_name.to_string(),
            params: vec![GoField::new(dep_name, dep_ty)],
            results: vec![GoField::new("", GoType::named(MIDDLEWARE_TYPE))],
            body: vec![GoStmt::Return(vec![GoExpr::FuncLit {
                params: vec![GoField::new("next", service_type(ctx))],
                results: vec![GoField::new("", service_type(ctx))],
                body: vec![GoStmt::Return(vec![GoExpr::Ref(Box::new(
                    GoExpr::StructLit {
                        ty: struct_name.to_string(),
                        fields: vec![
                            (dep_name.to_string(), GoExpr::ident(dep_name)),
                            ("next".to_string(), GoExpr::ident("next")),
                        ],
                        multiline: true,
                    },
                ))])],
            }])],
        },
    }
}

/// Decorator state struct: the dependency plus the wrapped implementation.
pub fn decorator_struct(
    struct_name: &str,
    dep_name: &str,
    dep_ty: GoType,
    ctx: &GenerationContext,
) -> GoDecl {
    GoDecl::Struct {
        doc: Vec::new(),
        name: struct_name.to_string(),
        fields: vec![
            GoField::new(dep_name, dep_ty),
            GoField::new("next", service_type(ctx)),
        ],
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::gocode::Emit;
    use crate::ir::MapType;

    #[test]
    fn test_go_type_shapes() {
        let mut ty = FieldType::qualified("Visit", "entity", "x/entity");
        ty.is_pointer = true;
        ty.is_array = true;
        assert_eq!(go_type(&ty).emit(), "[]*entity.Visit");

        let mut map_ty = FieldType::plain("");
        map_ty.map = Some(Box::new(MapType {
            key: FieldType::plain("string"),
            value: FieldType::plain("int"),
        }));
        assert_eq!(go_type(&map_ty).emit(), "map[string]int");
    }

    #[test]
    fn test_field_imports_sorted_and_deduplicated() {
        let methods = vec![Method {
            name: "Create".to_string(),
            params: vec![
                Field::new("ctx", FieldType::context()),
                Field::new("visit", FieldType::qualified("Visit", "entity", "x/entity")),
            ],
            results: vec![
                Field::new("saved", FieldType::qualified("Visit", "entity", "x/entity")),
                Field::new("err", FieldType::error()),
            ],
            directives: Vec::new(),
        }];
        let imports = field_imports(&methods);
        assert_eq!(imports.len(), 2);
        assert_eq!(imports[0].alias, "context");
        assert_eq!(imports[1].alias, "entity");
        assert_eq!(imports[1].path, "x/entity");
    }
}
