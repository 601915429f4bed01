//! C++ target tree.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    /// A plain or qualified name: `bool`, `temper::core::Int`.
    Name(String),
    /// `name<args...>`
    Template { name: String, args: Vec<TypeExpr> },
    Pointer(Box<TypeExpr>),
    Auto,
}

impl TypeExpr {
    pub fn name(text: impl Into<String>) -> Self {
        TypeExpr::Name(text.into())
    }

    pub fn core(name: &str) -> Self {
        TypeExpr::Name(format!("temper::core::{name}"))
    }

    pub fn core_template(name: &str, args: Vec<TypeExpr>) -> Self {
        TypeExpr::Template {
            name: format!("temper::core::{name}"),
            args,
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, TypeExpr::Name(n) if n == "void")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Name(String),
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    Null,
    Call(Box<Expr>, Vec<Expr>),
    /// `obj->name`
    Arrow(Box<Expr>, String),
    /// `Scope::name`
    Scoped(String, String),
    /// `callee<T>(args)`
    TemplateCall {
        callee: String,
        ty: TypeExpr,
        args: Vec<Expr>,
    },
    Binary(&'static str, Box<Expr>, Box<Expr>),
    Unary(&'static str, Box<Expr>),
    /// A macro or keyword spelled as is, like `TEMPER_VOID`.
    Raw(String),
    /// `exit(0)` standing in for something the backend cannot express.
    Unsupported(String),
}

impl Expr {
    pub fn name(text: impl Into<String>) -> Self {
        Expr::Name(text.into())
    }

    pub fn call(callee: Expr, args: Vec<Expr>) -> Self {
        Expr::Call(Box::new(callee), args)
    }

    pub fn core(name: &str) -> Self {
        Expr::Scoped("temper::core".to_string(), name.to_string())
    }

    pub fn binary(op: &'static str, left: Expr, right: Expr) -> Self {
        Expr::Binary(op, Box::new(left), Box::new(right))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Expr(Expr),
    Decl {
        ty: TypeExpr,
        name: String,
        init: Option<Expr>,
    },
    Assign {
        target: Expr,
        value: Expr,
    },
    Block(Vec<Stmt>),
    If {
        test: Expr,
        then: Vec<Stmt>,
        otherwise: Option<Vec<Stmt>>,
    },
    While {
        test: Expr,
        body: Vec<Stmt>,
    },
    Return(Option<Expr>),
    Comment(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub ty: TypeExpr,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub ret: TypeExpr,
    pub name: String,
    pub params: Vec<Param>,
    pub is_static: bool,
    /// Absent for declarations without a definition.
    pub body: Option<Vec<Stmt>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructDecl {
    pub name: String,
    pub fields: Vec<Param>,
    pub methods: Vec<FunctionDecl>,
    /// Header-only lines such as static members.
    pub extras: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Decl {
    Function(FunctionDecl),
    Variable {
        ty: TypeExpr,
        name: String,
        init: Option<Expr>,
    },
    Struct(StructDecl),
    Comment(String),
}

/// Everything one module contributes, split into a header and a source file
/// at print time.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationUnit {
    /// Inner namespace under `temper`.
    pub namespace: String,
    pub decls: Vec<Decl>,
}
