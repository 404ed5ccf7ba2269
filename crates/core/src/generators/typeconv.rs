//! Protobuf type-conversion stubs.
//!
//! Scalar types map statically onto the protobuf scalar system; a short list
//! of special rules is consulted first (the error kind and opaque blob types
//! flatten to strings, timestamps map to the structured proto timestamp).
//! Every remaining type referenced by any method gets one stub converter
//! pair, deduplicated by the resolved proto type so a type shared by several
//! methods is emitted once.

use std::collections::BTreeSet;
use std::path::PathBuf;

use tracing::debug;

use crate::gocode::{Emit, GoDecl, GoExpr, GoField, GoFile, GoFunc, GoStmt, GoType};
use crate::ir::{Field, FieldType};
use crate::pipeline::{GenerationContext, Generator, GeneratorArgs, WriteStrategy};
use crate::strings::{to_lower_first, to_upper_first};

use super::common::{FILE_HEADER, merged_imports};

const DEFAULT_PATH: &str = "transport/converter/protobuf/type_converters.go";
/// Import alias of the package holding the generated proto types.
const PROTO_ALIAS: &str = "protobuf";

/// Static scalar mapping, internal name to proto name.
fn proto_scalar(name: &str) -> Option<&'static str> {
    match name {
        "string" => Some("string"),
        "int" => Some("int64"),
        "int32" => Some("int32"),
        "int64" => Some("int64"),
        "uint" => Some("uint64"),
        "uint32" => Some("uint32"),
        "uint64" => Some("uint64"),
        "bool" => Some("bool"),
        "float32" => Some("float"),
        "float64" => Some("double"),
        "byte" => Some("uint32"),
        _ => None,
    }
}

/// Special-case rules, evaluated before the static mapping.
fn special_rule(ty: &FieldType) -> Option<GoType> {
    // error -> string
    if ty.is_error() {
        return Some(GoType::named("string"));
    }
    // time.Time -> timestamp.Timestamp
    if ty.name == "Time" && ty.package.as_ref().is_some_and(|p| p.path == "time") {
        return Some(GoType::qual("timestamp", "Timestamp"));
    }
    // jsonb.JSONB -> string
    if ty.name == "JSONB"
        && ty
            .package
            .as_ref()
            .is_some_and(|p| p.path.ends_with("gorm-jsonb/jsonb"))
    {
        return Some(GoType::named("string"));
    }
    None
}

/// A type is covered when no stub converter is needed for it.
fn is_covered(ty: &FieldType) -> bool {
    if special_rule(ty).is_some() {
        return true;
    }
    if let Some(map) = &ty.map {
        return is_covered(&map.key) && is_covered(&map.value);
    }
    ty.package.is_none() && proto_scalar(&ty.name).is_some()
}

/// Proto-side rendering of an internal type, shape preserved.
fn proto_type(ty: &FieldType) -> GoType {
    let mut base = if let Some(special) = special_rule(ty) {
        special
    } else if let Some(map) = &ty.map {
        GoType::Map {
            key: Box::new(proto_type(&map.key)),
            value: Box::new(proto_type(&map.value)),
        }
    } else if ty.package.is_none() {
        // Unmapped local names keep their spelling; only imported types move
        // into the proto package.
        GoType::named(proto_scalar(&ty.name).unwrap_or(&ty.name))
    } else {
        GoType::qual(PROTO_ALIAS, &ty.name)
    };
    if ty.is_pointer {
        base = GoType::Pointer(Box::new(base));
    }
    if ty.is_array {
        base = GoType::Slice(Box::new(base));
    }
    base
}

/// Base identifier the converter pair is named after.
fn conv_base(ty: &FieldType) -> String {
    let mut base = if let Some(map) = &ty.map {
        format!(
            "{}{}Map",
            to_upper_first(&map.key.name),
            to_upper_first(&map.value.name)
        )
    } else {
        to_upper_first(&ty.name)
    };
    if ty.is_array {
        base.push_str("List");
    }
    base
}

#[derive(Debug)]
pub struct TypeConvGenerator {
    path: String,
    proto_path: Option<String>,
    /// Uncovered fields in first-seen order, deduplicated by proto type.
    pending: Vec<Field>,
}

impl TypeConvGenerator {
    pub fn create(args: &GeneratorArgs) -> Box<dyn Generator> {
        Box::new(TypeConvGenerator {
            path: args
                .get("path")
                .cloned()
                .unwrap_or_else(|| DEFAULT_PATH.to_string()),
            proto_path: args.get("proto-package").cloned(),
            pending: Vec::new(),
        })
    }

    fn stub_pair(&self, field: &Field) -> (GoDecl, GoDecl) {
        let base = conv_base(&field.ty);
        let value_name = to_lower_first(&field.name);
        let proto_name = format!("proto{}", to_upper_first(&field.name));
        let err_name = format!("conv{}Err", to_upper_first(&field.name));
        let internal = super::common::go_type(&field.ty);
        let external = proto_type(&field.ty);
        let body = vec![GoStmt::Expr(GoExpr::call(
            GoExpr::ident("panic"),
            vec![GoExpr::str("type converter not provided")],
        ))];

        let to_proto = GoDecl::Func {
            doc: Vec::new(),
            func: GoFunc {
                name: format!("{base}ToProto"),
                params: vec![GoField::new(&value_name, internal.clone())],
                results: vec![
                    GoField::new(&proto_name, external.clone()),
                    GoField::new(&err_name, GoType::named("error")),
                ],
                body: body.clone(),
            },
        };
        let from_proto = GoDecl::Func {
            doc: Vec::new(),
            func: GoFunc {
                name: format!("ProtoTo{base}"),
                params: vec![GoField::new(&proto_name, external)],
                results: vec![
                    GoField::new(&value_name, internal),
                    GoField::new(&err_name, GoType::named("error")),
                ],
                body,
            },
        };
        (to_proto, from_proto)
    }
}

impl Generator for TypeConvGenerator {
    fn prepare(&mut self, ctx: &GenerationContext) -> Result<(), String> {
        let mut seen: BTreeSet<String> = BTreeSet::new();
        for method in &ctx.ir.methods {
            let fields = method
                .params_sans_context()
                .iter()
                .chain(method.results_sans_error().iter());
            for field in fields {
                if is_covered(&field.ty) {
                    continue;
                }
                if seen.insert(proto_type(&field.ty).emit()) {
                    self.pending.push(field.clone());
                }
            }
        }
        Ok(())
    }

    fn render(&self, ctx: &GenerationContext) -> Result<String, String> {
        let proto_path = self
            .proto_path
            .clone()
            .unwrap_or_else(|| format!("{}/pb", ctx.location.import_path));

        let mut file = GoFile::new("protobuf");
        file.header = vec![FILE_HEADER.to_string()];
        let mut imports = vec![(PROTO_ALIAS, proto_path.as_str())];
        let field_pkgs: Vec<(String, String)> = self
            .pending
            .iter()
            .filter_map(|f| {
                f.ty.package
                    .as_ref()
                    .map(|p| (p.name.clone(), p.path.clone()))
            })
            .collect();
        for (alias, path) in &field_pkgs {
            imports.push((alias.as_str(), path.as_str()));
        }
        file.imports = merged_imports(Vec::new(), &imports);

        for field in &self.pending {
            let (to_proto, from_proto) = self.stub_pair(field);
            file.decls.push(to_proto);
            file.decls.push(from_proto);
        }
        Ok(file.emit())
    }

    fn choose_strategy(
        &self,
        ctx: &GenerationContext,
    ) -> Result<Option<(PathBuf, WriteStrategy)>, String> {
        if self.pending.is_empty() {
            debug!("Every referenced type is covered, no converter stubs needed.");
            return Ok(None);
        }
        Ok(Some((
            ctx.location.output_dir.join(&self.path),
            WriteStrategy::AppendMissingSymbols,
        )))
    }
}
