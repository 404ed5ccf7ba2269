//! Normalized interface representation consumed by every generator.
//!
//! The IR is built once per run from the declaration source, validated, and
//! read-only afterwards: generators consult it, none of them mutate it.

use serde::Deserialize;

/// Reference to the package (namespace) a type is declared in.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PackageRef {
    /// Short package name used in qualified references (e.g. "entity").
    pub name: String,
    /// Full import path (e.g. "gitlab.example.com/visitsvc/entity").
    pub path: String,
}

/// Key/value pair of a map type.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MapType {
    pub key: FieldType,
    pub value: FieldType,
}

/// Semantic description of a parameter or result type.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldType {
    /// Type name without qualification (e.g. "int", "Visit", "Context").
    pub name: String,
    /// Owning package, `None` for builtins and local types.
    #[serde(default)]
    pub package: Option<PackageRef>,
    #[serde(default)]
    pub is_pointer: bool,
    #[serde(default)]
    pub is_array: bool,
    /// Present when the type is a map.
    #[serde(default)]
    pub map: Option<Box<MapType>>,
    /// Inline, unnamed capability contract. Never survives validation.
    #[serde(default)]
    pub is_raw_interface: bool,
}

impl FieldType {
    /// Unqualified type with the given name.
    pub fn plain(name: &str) -> Self {
        FieldType {
            name: name.to_string(),
            package: None,
            is_pointer: false,
            is_array: false,
            map: None,
            is_raw_interface: false,
        }
    }

    /// Type qualified by a package reference.
    pub fn qualified(name: &str, pkg_name: &str, pkg_path: &str) -> Self {
        FieldType {
            package: Some(PackageRef {
                name: pkg_name.to_string(),
                path: pkg_path.to_string(),
            }),
            ..FieldType::plain(name)
        }
    }

    /// The designated context carrier type (`context.Context`).
    pub fn context() -> Self {
        FieldType::qualified("Context", "context", "context")
    }

    /// The designated error kind (builtin `error`).
    pub fn error() -> Self {
        FieldType::plain("error")
    }

    pub fn is_context(&self) -> bool {
        self.name == "Context"
            && self
                .package
                .as_ref()
                .is_some_and(|pkg| pkg.path == "context")
    }

    pub fn is_error(&self) -> bool {
        self.name == "error" && self.package.is_none() && !self.is_pointer && !self.is_array
    }

    /// True when this type, or a nested map key/value, is a raw interface.
    pub fn contains_raw_interface(&self) -> bool {
        if self.is_raw_interface {
            return true;
        }
        self.map.as_ref().is_some_and(|m| {
            m.key.contains_raw_interface() || m.value.contains_raw_interface()
        })
    }

    /// Human-readable rendering used in error messages (e.g. `[]*entity.Visit`).
    pub fn display(&self) -> String {
        let mut out = String::new();
        if self.is_array {
            out.push_str("[]");
        }
        if self.is_pointer {
            out.push('*');
        }
        if let Some(m) = &self.map {
            out.push_str(&format!("map[{}]{}", m.key.display(), m.value.display()));
            return out;
        }
        if let Some(pkg) = &self.package {
            out.push_str(&pkg.name);
            out.push('.');
        }
        out.push_str(&self.name);
        out
    }
}

/// One parameter or result slot. Order is significant and preserved.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Field {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub ty: FieldType,
}

impl Field {
    pub fn new(name: &str, ty: FieldType) -> Self {
        Field {
            name: name.to_string(),
            ty,
        }
    }
}

/// One documentation directive: `key` plus its ordered value list.
///
/// Multiple directives with the same key accumulate as separate entries;
/// consumers gather them with [`values_for`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub key: String,
    pub values: Vec<String>,
}

/// Gather the values of every directive with the given key, in order.
pub fn values_for<'a>(directives: &'a [Directive], key: &str) -> Vec<&'a str> {
    directives
        .iter()
        .filter(|d| d.key == key)
        .flat_map(|d| d.values.iter().map(String::as_str))
        .collect()
}

/// Normalized method signature.
#[derive(Debug, Clone)]
pub struct Method {
    pub name: String,
    pub params: Vec<Field>,
    pub results: Vec<Field>,
    pub directives: Vec<Directive>,
}

impl Method {
    /// Parameters without the leading context carrier.
    pub fn params_sans_context(&self) -> &[Field] {
        match self.params.first() {
            Some(first) if first.ty.is_context() => &self.params[1..],
            _ => &self.params,
        }
    }

    /// Results without the trailing error.
    pub fn results_sans_error(&self) -> &[Field] {
        match self.results.last() {
            Some(last) if last.ty.is_error() => &self.results[..self.results.len() - 1],
            _ => &self.results,
        }
    }

    /// Name of the trailing error result, if present.
    pub fn error_result_name(&self) -> Option<&str> {
        match self.results.last() {
            Some(last) if last.ty.is_error() => Some(&last.name),
            _ => None,
        }
    }
}

/// The selected interface with embedded interfaces already flattened.
#[derive(Debug, Clone)]
pub struct InterfaceIR {
    pub name: String,
    pub methods: Vec<Method>,
    pub directives: Vec<Directive>,
}
