//! Go declaration tree used by the generators.
//!
//! Generators build this neutral tree instead of concatenating source text;
//! the `emit` module renders it to gofmt-shaped Go. The tree covers only the
//! shapes the generators produce: type declarations, functions, methods, and
//! the expressions/statements their bodies need.

/// Go type reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GoType {
    /// Unqualified name: `int`, `error`, `Middleware`
    Named(String),
    /// Package-qualified name: `context.Context`
    Qual { pkg: String, name: String },
    /// `*T`
    Pointer(Box<GoType>),
    /// `[]T`
    Slice(Box<GoType>),
    /// `map[K]V`
    Map { key: Box<GoType>, value: Box<GoType> },
    /// `func(A, B) (C, D)`
    Func {
        params: Vec<GoType>,
        results: Vec<GoType>,
    },
    /// `...T` (variadic parameter)
    Variadic(Box<GoType>),
}

impl GoType {
    pub fn named(name: &str) -> Self {
        GoType::Named(name.to_string())
    }

    pub fn qual(pkg: &str, name: &str) -> Self {
        GoType::Qual {
            pkg: pkg.to_string(),
            name: name.to_string(),
        }
    }
}

/// Struct field or function parameter/result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoField {
    /// Empty for anonymous results.
    pub name: String,
    pub ty: GoType,
    /// Struct tag body, without backticks (e.g. `json:"visit"`).
    pub tag: Option<String>,
}

impl GoField {
    pub fn new(name: &str, ty: GoType) -> Self {
        GoField {
            name: name.to_string(),
            ty,
            tag: None,
        }
    }

    pub fn tagged(name: &str, ty: GoType, tag: &str) -> Self {
        GoField {
            name: name.to_string(),
            ty,
            tag: Some(tag.to_string()),
        }
    }
}

/// Go expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GoExpr {
    Ident(String),
    /// `pkg.Name`
    Qual { pkg: String, name: String },
    /// String literal, quoted and escaped on emission.
    Str(String),
    /// `callee(args...)`
    Call {
        callee: Box<GoExpr>,
        args: Vec<GoExpr>,
    },
    /// `base.field`
    Selector { base: Box<GoExpr>, field: String },
    /// `&expr`
    Ref(Box<GoExpr>),
    /// `Type{Field: value, ...}`
    StructLit {
        ty: String,
        fields: Vec<(String, GoExpr)>,
        multiline: bool,
    },
    /// `Type{key: value, ...}` with expression keys (composite map literals).
    MapLit {
        ty: Box<GoExpr>,
        entries: Vec<(GoExpr, GoExpr)>,
        multiline: bool,
    },
    /// `func(params) (results) { body }`
    FuncLit {
        params: Vec<GoField>,
        results: Vec<GoField>,
        body: Vec<GoStmt>,
    },
    /// `expr...` (variadic call argument)
    Variadic(Box<GoExpr>),
    /// Escape hatch for snippets the tree does not model.
    Raw(String),
}

impl GoExpr {
    pub fn ident(name: &str) -> Self {
        GoExpr::Ident(name.to_string())
    }

    pub fn qual(pkg: &str, name: &str) -> Self {
        GoExpr::Qual {
            pkg: pkg.to_string(),
            name: name.to_string(),
        }
    }

    pub fn str(value: &str) -> Self {
        GoExpr::Str(value.to_string())
    }

    pub fn call(callee: GoExpr, args: Vec<GoExpr>) -> Self {
        GoExpr::Call {
            callee: Box::new(callee),
            args,
        }
    }

    pub fn select(base: GoExpr, field: &str) -> Self {
        GoExpr::Selector {
            base: Box::new(base),
            field: field.to_string(),
        }
    }

    /// `base.method(args...)`
    pub fn method_call(base: GoExpr, method: &str, args: Vec<GoExpr>) -> Self {
        GoExpr::call(GoExpr::select(base, method), args)
    }
}

/// Go statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GoStmt {
    Expr(GoExpr),
    /// `return a, b`
    Return(Vec<GoExpr>),
    /// `lhs := rhs` or `lhs = rhs`
    Assign {
        lhs: Vec<GoExpr>,
        rhs: Vec<GoExpr>,
        define: bool,
    },
    /// `defer call`
    Defer(GoExpr),
    /// Verbatim lines, re-indented on emission.
    Raw(String),
}

/// Top-level function shape shared by functions and methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoFunc {
    pub name: String,
    pub params: Vec<GoField>,
    pub results: Vec<GoField>,
    pub body: Vec<GoStmt>,
}

/// Method receiver: `(s *serviceLogging)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoReceiver {
    pub name: String,
    pub ty: String,
    pub pointer: bool,
}

/// Top-level declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GoDecl {
    Struct {
        doc: Vec<String>,
        name: String,
        fields: Vec<GoField>,
    },
    /// `type Name func(params) results`
    FuncType {
        doc: Vec<String>,
        name: String,
        params: Vec<GoType>,
        results: Vec<GoType>,
    },
    Func {
        doc: Vec<String>,
        func: GoFunc,
    },
    Method {
        doc: Vec<String>,
        recv: GoReceiver,
        func: GoFunc,
    },
}

/// Aliased import: `svc "gitlab.example.com/usersvc"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoImport {
    pub alias: String,
    pub path: String,
}

impl GoImport {
    pub fn new(alias: &str, path: &str) -> Self {
        GoImport {
            alias: alias.to_string(),
            path: path.to_string(),
        }
    }
}

/// Complete Go source file.
#[derive(Debug, Clone)]
pub struct GoFile {
    /// Comment lines above the package clause (without `// `).
    pub header: Vec<String>,
    pub package: String,
    pub imports: Vec<GoImport>,
    pub decls: Vec<GoDecl>,
}

impl GoFile {
    pub fn new(package: &str) -> Self {
        GoFile {
            header: Vec::new(),
            package: package.to_string(),
            imports: Vec::new(),
            decls: Vec::new(),
        }
    }
}
