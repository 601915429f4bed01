//! Lua syntax tree produced by the translator.
//!
//! Nodes own their children outright; `Clone` is a deep copy and
//! `PartialEq` is structural. [`Node::children`] enumerates the direct
//! children of any node for passes that only care about a few variants.

// =============================================================================
// Chunks and statements
// =============================================================================

/// A block: statements followed by an optional terminator.
///
/// Lua only accepts `return` and `break` as the final statement of a block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Chunk {
    pub body: Vec<Stmt>,
    pub last: Option<LastStmt>,
}

impl Chunk {
    pub fn new(body: Vec<Stmt>, last: Option<LastStmt>) -> Self {
        Chunk { body, last }
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty() && self.last.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LastStmt {
    /// `return a, b`
    Return(Vec<Expr>),
    /// `break`
    Break,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `local a, b = x, y`; no initializers declares only.
    Local { names: Vec<String>, exprs: Vec<Expr> },

    /// `a, b.c = x, y`
    Set {
        targets: Vec<SetTarget>,
        exprs: Vec<Expr>,
    },

    /// A call evaluated for effect. Holds a `Call` or `MethodCall`.
    Call(Expr),

    /// `do ... end`
    Do(Chunk),

    /// `while test do ... end`
    While { test: Expr, body: Chunk },

    /// `if test then ... elseif ... else ... end`
    If {
        test: Expr,
        then: Chunk,
        elseifs: Vec<(Expr, Chunk)>,
        otherwise: Option<Chunk>,
    },

    /// `local function name(...) ... end`
    LocalFunction { name: String, func: Function },

    /// `goto name`
    Goto(String),

    /// `::name::`
    Label(String),

    /// `-- text`
    Comment(String),
}

impl Stmt {
    pub fn local(name: impl Into<String>, expr: Expr) -> Stmt {
        Stmt::Local {
            names: vec![name.into()],
            exprs: vec![expr],
        }
    }

    pub fn set(target: SetTarget, expr: Expr) -> Stmt {
        Stmt::Set {
            targets: vec![target],
            exprs: vec![expr],
        }
    }

    pub fn set_name(name: impl Into<String>, expr: Expr) -> Stmt {
        Stmt::set(SetTarget::Name(name.into()), expr)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SetTarget {
    /// `x = ...`
    Name(String),
    /// `obj.name = ...`
    Dot(Expr, String),
    /// `obj[key] = ...`
    Index(Expr, Expr),
}

// =============================================================================
// Expressions
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Identifiers, including `true`, `false` and `nil`.
    Name(String),

    /// Integer literal: `42`
    Int(i64),

    /// Float literal, always finite: `0.5`
    Float(f64),

    /// String literal: `'hello'`
    Str(String),

    /// `...`
    Vararg,

    /// `obj.name`
    Dot(Box<Expr>, String),

    /// `obj[key]`
    Index(Box<Expr>, Box<Expr>),

    /// `func(args)`
    Call(Box<Expr>, Vec<Expr>),

    /// `obj:method(args)`
    MethodCall(Box<Expr>, String, Vec<Expr>),

    /// `function(params) ... end`
    Function(Function),

    /// `{a, b, key = c}`
    Table(Vec<TableField>),

    /// `(left op right)`
    BinOp(BinOp, Box<Expr>, Box<Expr>),

    /// `not x`, `-x`
    UnOp(UnOp, Box<Expr>),

    /// `(expr)`, which also truncates multiple results to one.
    Paren(Box<Expr>),
}

impl Expr {
    pub fn name(text: impl Into<String>) -> Expr {
        Expr::Name(text.into())
    }

    pub fn nil() -> Expr {
        Expr::Name("nil".to_string())
    }

    pub fn str(text: impl Into<String>) -> Expr {
        Expr::Str(text.into())
    }

    /// `obj.name`
    pub fn dot(obj: Expr, name: impl Into<String>) -> Expr {
        Expr::Dot(Box::new(obj), name.into())
    }

    /// `obj[key]`
    pub fn index(obj: Expr, key: Expr) -> Expr {
        Expr::Index(Box::new(obj), Box::new(key))
    }

    pub fn call(func: Expr, args: Vec<Expr>) -> Expr {
        Expr::Call(Box::new(func), args)
    }

    pub fn binop(op: BinOp, left: Expr, right: Expr) -> Expr {
        Expr::BinOp(op, Box::new(left), Box::new(right))
    }

    pub fn not(operand: Expr) -> Expr {
        Expr::UnOp(UnOp::Not, Box::new(operand))
    }

    pub fn is_call(&self) -> bool {
        matches!(self, Expr::Call(..) | Expr::MethodCall(..))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Function {
    pub params: Vec<String>,
    /// Trailing `...` in the parameter list.
    pub vararg: bool,
    pub body: Chunk,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableField {
    Positional(Expr),
    Named(String, Expr),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    And,
    Or,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Mul,
}

impl BinOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BinOp::And => "and",
            BinOp::Or => "or",
            BinOp::Eq => "==",
            BinOp::Ne => "~=",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnOp {
    Not,
    Neg,
}

// =============================================================================
// Generic traversal
// =============================================================================

/// A borrowed reference to any node.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Chunk(&'a Chunk),
    Stmt(&'a Stmt),
    Last(&'a LastStmt),
    Target(&'a SetTarget),
    Expr(&'a Expr),
    Function(&'a Function),
}

impl<'a> Node<'a> {
    /// Direct children in source order.
    pub fn children(self) -> Vec<Node<'a>> {
        let mut out = Vec::new();
        match self {
            Node::Chunk(chunk) => {
                out.extend(chunk.body.iter().map(Node::Stmt));
                out.extend(chunk.last.iter().map(Node::Last));
            }
            Node::Stmt(stmt) => match stmt {
                Stmt::Local { exprs, .. } => out.extend(exprs.iter().map(Node::Expr)),
                Stmt::Set { targets, exprs } => {
                    out.extend(targets.iter().map(Node::Target));
                    out.extend(exprs.iter().map(Node::Expr));
                }
                Stmt::Call(expr) => out.push(Node::Expr(expr)),
                Stmt::Do(chunk) => out.push(Node::Chunk(chunk)),
                Stmt::While { test, body } => {
                    out.push(Node::Expr(test));
                    out.push(Node::Chunk(body));
                }
                Stmt::If {
                    test,
                    then,
                    elseifs,
                    otherwise,
                } => {
                    out.push(Node::Expr(test));
                    out.push(Node::Chunk(then));
                    for (test, body) in elseifs {
                        out.push(Node::Expr(test));
                        out.push(Node::Chunk(body));
                    }
                    out.extend(otherwise.iter().map(Node::Chunk));
                }
                Stmt::LocalFunction { func, .. } => out.push(Node::Function(func)),
                Stmt::Goto(_) | Stmt::Label(_) | Stmt::Comment(_) => {}
            },
            Node::Last(LastStmt::Return(exprs)) => out.extend(exprs.iter().map(Node::Expr)),
            Node::Last(LastStmt::Break) => {}
            Node::Target(target) => match target {
                SetTarget::Name(_) => {}
                SetTarget::Dot(obj, _) => out.push(Node::Expr(obj)),
                SetTarget::Index(obj, key) => {
                    out.push(Node::Expr(obj));
                    out.push(Node::Expr(key));
                }
            },
            Node::Expr(expr) => match expr {
                Expr::Name(_) | Expr::Int(_) | Expr::Float(_) | Expr::Str(_) | Expr::Vararg => {}
                Expr::Dot(obj, _) | Expr::UnOp(_, obj) | Expr::Paren(obj) => {
                    out.push(Node::Expr(obj))
                }
                Expr::Index(obj, key) | Expr::BinOp(_, obj, key) => {
                    out.push(Node::Expr(obj));
                    out.push(Node::Expr(key));
                }
                Expr::Call(func, args) => {
                    out.push(Node::Expr(func));
                    out.extend(args.iter().map(Node::Expr));
                }
                Expr::MethodCall(obj, _, args) => {
                    out.push(Node::Expr(obj));
                    out.extend(args.iter().map(Node::Expr));
                }
                Expr::Function(func) => out.push(Node::Function(func)),
                Expr::Table(fields) => out.extend(fields.iter().map(|f| match f {
                    TableField::Positional(e) | TableField::Named(_, e) => Node::Expr(e),
                })),
            },
            Node::Function(func) => out.push(Node::Chunk(&func.body)),
        }
        out
    }

    /// Calls `f` on this node and every descendant, parents first.
    pub fn walk(self, f: &mut impl FnMut(Node<'a>)) {
        f(self);
        for child in self.children() {
            child.walk(f);
        }
    }
}

/// Every identifier read or assigned anywhere under `chunk`.
pub fn referenced_names(chunk: &Chunk) -> Vec<&str> {
    let mut names = Vec::new();
    Node::Chunk(chunk).walk(&mut |node| match node {
        Node::Expr(Expr::Name(name)) | Node::Target(SetTarget::Name(name)) => {
            names.push(name.as_str())
        }
        _ => {}
    });
    names
}
