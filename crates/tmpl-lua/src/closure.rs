//! Captured-environment rewriting for protected bodies.
//!
//! Under the table closure modes a `try` body runs as a function that takes
//! one table argument. [`LuaClosure`] rewrites the body so that every name it
//! borrows from an enclosing scope is read from, and written to, a slot of
//! that table. The caller builds the table from [`LuaClosure::externs`] and
//! copies [`LuaClosure::mutated`] slots back after the call.

use crate::ast::{Chunk, Expr, Function, LastStmt, SetTarget, Stmt, TableField};
use crate::chunk::lua_chunk;
use indexmap::IndexSet;

pub struct LuaClosure {
    obj_name: String,
    imported: IndexSet<String>,
    locals: Vec<String>,
    all_externs: IndexSet<String>,
    mut_externs: IndexSet<String>,
}

impl LuaClosure {
    /// `imported` names are globals of the module and are never captured.
    pub fn new(obj_name: impl Into<String>, imported: &[String]) -> Self {
        LuaClosure {
            obj_name: obj_name.into(),
            imported: imported.iter().cloned().collect(),
            locals: Vec::new(),
            all_externs: IndexSet::new(),
            mut_externs: IndexSet::new(),
        }
    }

    pub fn obj_name(&self) -> &str {
        &self.obj_name
    }

    /// Every captured name in slot order. Slot `i` is `obj[i + 1]`.
    pub fn externs(&self) -> impl Iterator<Item = &str> {
        self.all_externs.iter().map(String::as_str)
    }

    /// Captured names assigned by the body, with their 1-based slots.
    pub fn mutated(&self) -> impl Iterator<Item = (&str, i64)> {
        self.mut_externs.iter().filter_map(|name| {
            self.all_externs
                .get_index_of(name)
                .map(|i| (name.as_str(), i as i64 + 1))
        })
    }

    /// `{a, b, ...}` holding the current value of every capture.
    pub fn table(&self) -> Expr {
        Expr::Table(
            self.externs()
                .map(|name| TableField::Positional(Expr::name(name)))
                .collect(),
        )
    }

    /// Assignments copying mutated captures back out of `obj`.
    pub fn write_back(&self) -> Vec<Stmt> {
        self.mutated()
            .map(|(name, slot)| {
                Stmt::set_name(name, Expr::index(Expr::name(&self.obj_name), Expr::Int(slot)))
            })
            .collect()
    }

    /// Rewrites `chunk`, the body of the closure, in place of the original.
    pub fn scan(&mut self, chunk: Chunk) -> Chunk {
        self.scoped(|this| this.chunk(chunk))
    }

    fn scoped<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let mark = self.locals.len();
        let result = f(self);
        self.locals.truncate(mark);
        result
    }

    fn define(&mut self, name: &str) {
        self.locals.push(name.to_string());
    }

    fn is_free(&self, name: &str) -> bool {
        !matches!(name, "true" | "false" | "nil")
            && name != self.obj_name
            && !self.imported.contains(name)
            && !self.locals.iter().any(|l| l == name)
    }

    fn slot(&mut self, name: &str) -> Expr {
        let (index, _) = self.all_externs.insert_full(name.to_string());
        Expr::index(Expr::name(&self.obj_name), Expr::Int(index as i64 + 1))
    }

    fn chunk(&mut self, chunk: Chunk) -> Chunk {
        let body = chunk.body.into_iter().map(|s| self.stmt(s)).collect();
        let last = chunk.last.map(|last| match last {
            LastStmt::Return(exprs) => LastStmt::Return(self.exprs(exprs)),
            LastStmt::Break => LastStmt::Break,
        });
        lua_chunk(body, last)
    }

    fn stmt(&mut self, stmt: Stmt) -> Stmt {
        match stmt {
            Stmt::Local { names, exprs } => {
                let exprs = self.exprs(exprs);
                for name in &names {
                    self.define(name);
                }
                Stmt::Local { names, exprs }
            }
            Stmt::Set { targets, exprs } => {
                let exprs = self.exprs(exprs);
                let targets = targets.into_iter().map(|t| self.target(t)).collect();
                Stmt::Set { targets, exprs }
            }
            Stmt::Call(expr) => Stmt::Call(self.expr(expr)),
            Stmt::Do(chunk) => Stmt::Do(self.scoped(|this| this.chunk(chunk))),
            Stmt::While { test, body } => Stmt::While {
                test: self.expr(test),
                body: self.scoped(|this| this.chunk(body)),
            },
            Stmt::If {
                test,
                then,
                elseifs,
                otherwise,
            } => Stmt::If {
                test: self.expr(test),
                then: self.scoped(|this| this.chunk(then)),
                elseifs: elseifs
                    .into_iter()
                    .map(|(test, body)| (self.expr(test), self.scoped(|this| this.chunk(body))))
                    .collect(),
                otherwise: otherwise.map(|c| self.scoped(|this| this.chunk(c))),
            },
            Stmt::LocalFunction { name, func } => {
                self.define(&name);
                let func = self.function(func);
                Stmt::LocalFunction { name, func }
            }
            other @ (Stmt::Goto(_) | Stmt::Label(_) | Stmt::Comment(_)) => other,
        }
    }

    fn target(&mut self, target: SetTarget) -> SetTarget {
        match target {
            SetTarget::Name(name) if self.is_free(&name) => {
                self.mut_externs.insert(name.clone());
                let (index, _) = self.all_externs.insert_full(name);
                SetTarget::Index(Expr::name(&self.obj_name), Expr::Int(index as i64 + 1))
            }
            SetTarget::Name(name) => SetTarget::Name(name),
            SetTarget::Dot(obj, name) => SetTarget::Dot(self.expr(obj), name),
            SetTarget::Index(obj, key) => SetTarget::Index(self.expr(obj), self.expr(key)),
        }
    }

    fn exprs(&mut self, exprs: Vec<Expr>) -> Vec<Expr> {
        exprs.into_iter().map(|e| self.expr(e)).collect()
    }

    fn expr(&mut self, expr: Expr) -> Expr {
        match expr {
            Expr::Name(name) if self.is_free(&name) => self.slot(&name),
            Expr::Dot(obj, name) => Expr::Dot(Box::new(self.expr(*obj)), name),
            Expr::Index(obj, key) => Expr::index(self.expr(*obj), self.expr(*key)),
            Expr::Call(func, args) => Expr::call(self.expr(*func), self.exprs(args)),
            Expr::MethodCall(obj, method, args) => {
                Expr::MethodCall(Box::new(self.expr(*obj)), method, self.exprs(args))
            }
            Expr::Function(func) => Expr::Function(self.function(func)),
            Expr::Table(fields) => Expr::Table(
                fields
                    .into_iter()
                    .map(|f| match f {
                        TableField::Positional(e) => TableField::Positional(self.expr(e)),
                        TableField::Named(k, e) => TableField::Named(k, self.expr(e)),
                    })
                    .collect(),
            ),
            Expr::BinOp(op, l, r) => Expr::binop(op, self.expr(*l), self.expr(*r)),
            Expr::UnOp(op, e) => Expr::UnOp(op, Box::new(self.expr(*e))),
            Expr::Paren(e) => Expr::Paren(Box::new(self.expr(*e))),
            other @ (Expr::Name(_)
            | Expr::Int(_)
            | Expr::Float(_)
            | Expr::Str(_)
            | Expr::Vararg) => other,
        }
    }

    fn function(&mut self, func: Function) -> Function {
        self.scoped(|this| {
            for param in &func.params {
                this.define(param);
            }
            Function {
                params: func.params,
                vararg: func.vararg,
                body: this.chunk(func.body),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BinOp, Node, referenced_names};

    fn temper() -> Vec<String> {
        vec!["temper".to_string()]
    }

    #[test]
    fn test_reads_and_writes_are_routed_through_obj() {
        // y = x + y; return x
        let body = Chunk::new(
            vec![Stmt::set_name(
                "y",
                Expr::binop(BinOp::Add, Expr::name("x"), Expr::name("y")),
            )],
            Some(LastStmt::Return(vec![Expr::name("x")])),
        );
        let mut closure = LuaClosure::new("obj_0", &temper());
        let scanned = closure.scan(body);

        assert_eq!(closure.externs().collect::<Vec<_>>(), vec!["x", "y"]);
        assert_eq!(closure.mutated().collect::<Vec<_>>(), vec![("y", 2)]);
        let names = referenced_names(&scanned);
        assert!(names.iter().all(|n| *n == "obj_0"), "{names:?}");
        assert_eq!(
            closure.write_back(),
            vec![Stmt::set_name(
                "y",
                Expr::index(Expr::name("obj_0"), Expr::Int(2))
            )]
        );
    }

    #[test]
    fn test_locals_and_keywords_are_not_captured() {
        let body = Chunk::new(
            vec![
                Stmt::local("a", Expr::name("true")),
                Stmt::set_name("a", Expr::name("nil")),
                Stmt::Call(Expr::call(
                    Expr::dot(Expr::name("temper"), "log"),
                    vec![Expr::name("a")],
                )),
            ],
            None,
        );
        let mut closure = LuaClosure::new("obj_0", &temper());
        let scanned = closure.scan(body.clone());
        assert_eq!(closure.externs().count(), 0);
        assert_eq!(scanned, body);
    }

    #[test]
    fn test_local_initializer_sees_outer_name() {
        // local v = v
        let body = Chunk::new(vec![Stmt::local("v", Expr::name("v"))], None);
        let mut closure = LuaClosure::new("obj_0", &[]);
        let scanned = closure.scan(body);
        assert_eq!(closure.externs().collect::<Vec<_>>(), vec!["v"]);
        assert_eq!(
            scanned.body[0],
            Stmt::local("v", Expr::index(Expr::name("obj_0"), Expr::Int(1)))
        );
    }

    #[test]
    fn test_nested_function_params_shadow() {
        let inner = Function {
            params: vec!["p".into()],
            vararg: false,
            body: Chunk::new(vec![], Some(LastStmt::Return(vec![Expr::name("p"), Expr::name("q")]))),
        };
        let body = Chunk::new(vec![Stmt::Call(Expr::call(Expr::Function(inner), vec![]))], None);
        let mut closure = LuaClosure::new("obj_0", &[]);
        closure.scan(body);
        assert_eq!(closure.externs().collect::<Vec<_>>(), vec!["q"]);
    }

    #[test]
    fn test_block_locals_end_with_block() {
        let body = Chunk::new(
            vec![
                Stmt::Do(Chunk::new(
                    vec![
                        Stmt::local("k", Expr::Int(0)),
                        Stmt::Call(Expr::call(Expr::name("f"), vec![Expr::name("k")])),
                    ],
                    None,
                )),
                Stmt::While {
                    test: Expr::name("k"),
                    body: Chunk::default(),
                },
            ],
            None,
        );
        let mut closure = LuaClosure::new("obj_0", &[]);
        let scanned = closure.scan(body);
        assert_eq!(closure.externs().collect::<Vec<_>>(), vec!["f", "k"]);
        let mut goes_through_obj = false;
        Node::Chunk(&scanned).walk(&mut |node| {
            if let Node::Stmt(Stmt::While { test, .. }) = node {
                goes_through_obj = matches!(test, Expr::Index(..));
            }
        });
        assert!(goes_through_obj);
    }
}
