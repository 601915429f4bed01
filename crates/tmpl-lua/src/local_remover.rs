//! Local slot overflow rewriting.
//!
//! Lua caps the number of live locals in one function. This pass counts the
//! locals each lexical chunk (function body, `do` block, loop body, branch
//! body) declares directly; when the count reaches [`MAX_ALLOWABLE_LOCALS`]
//! every local declared directly in that chunk becomes a field of a fresh
//! table, `env_tN`. Nested chunks are judged on their own counts.
//!
//! Chunks below the ceiling keep real locals, but their declarations are
//! hoisted into a single `local a, b;` at the top of the chunk so later
//! statements, and gotos, never see a name come into scope mid-block.

use crate::ast::{Chunk, Expr, Function, LastStmt, SetTarget, Stmt, TableField};
use crate::chunk::lua_chunk;
use indexmap::IndexSet;
use rustc_hash::FxHashMap;
use tmpl_common::limits::MAX_ALLOWABLE_LOCALS;
use tracing::debug;

#[derive(Default)]
pub struct LuaLocalRemover {
    tables: u32,
    /// Table new declarations go into, while the current chunk rewrites.
    env: Option<String>,
    /// Locals living in a table, by name.
    routes: FxHashMap<String, String>,
    /// Real locals declared in the current scope.
    hoisted: IndexSet<String>,
}

impl LuaLocalRemover {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rewrites a function-like chunk and everything nested in it.
    pub fn rewrite(&mut self, chunk: Chunk) -> Chunk {
        self.wrap_locals(chunk, &[])
    }

    fn wrap_locals(&mut self, chunk: Chunk, params: &[String]) -> Chunk {
        let count = count_locals(&chunk);
        self.scoped(|this| {
            for param in params {
                this.routes.remove(param);
            }
            let mut prefix = Vec::new();
            if count >= MAX_ALLOWABLE_LOCALS {
                this.tables += 1;
                let env = format!("env_t{}", this.tables);
                debug!(locals = count, table = %env, "moving locals into a table");
                prefix.push(Stmt::local(env.clone(), Expr::Table(Vec::new())));
                this.env = Some(env);
            } else {
                this.env = None;
            }
            let rewritten = this.block(chunk);
            prefix.extend(rewritten.body);
            lua_chunk(prefix, rewritten.last)
        })
    }

    /// Runs `f` in a nested chunk, then declares whatever it hoisted.
    fn scoped(&mut self, f: impl FnOnce(&mut Self) -> Chunk) -> Chunk {
        let env = self.env.clone();
        let routes = self.routes.clone();
        let outer_hoisted = std::mem::take(&mut self.hoisted);

        let chunk = f(self);

        let hoisted = std::mem::replace(&mut self.hoisted, outer_hoisted);
        self.env = env;
        self.routes = routes;
        if hoisted.is_empty() {
            return chunk;
        }
        let mut body = Vec::with_capacity(chunk.body.len() + 1);
        body.push(Stmt::Local {
            names: hoisted.into_iter().collect(),
            exprs: Vec::new(),
        });
        body.extend(chunk.body);
        lua_chunk(body, chunk.last)
    }

    fn block(&mut self, chunk: Chunk) -> Chunk {
        let body = chunk.body.into_iter().filter_map(|s| self.stmt(s)).collect();
        let last = chunk.last.map(|last| match last {
            LastStmt::Return(exprs) => LastStmt::Return(self.exprs(exprs)),
            LastStmt::Break => LastStmt::Break,
        });
        lua_chunk(body, last)
    }

    fn declare(&mut self, name: String) -> SetTarget {
        match &self.env {
            Some(env) => {
                self.routes.insert(name.clone(), env.clone());
                SetTarget::Dot(Expr::name(env), name)
            }
            None => {
                self.routes.remove(&name);
                self.hoisted.insert(name.clone());
                SetTarget::Name(name)
            }
        }
    }

    fn stmt(&mut self, stmt: Stmt) -> Option<Stmt> {
        Some(match stmt {
            Stmt::Local { names, exprs } => {
                let exprs = self.exprs(exprs);
                if exprs.is_empty() {
                    for name in names {
                        self.declare(name);
                    }
                    return None;
                }
                let targets = names.into_iter().map(|n| self.declare(n)).collect();
                Stmt::Set { targets, exprs }
            }
            Stmt::LocalFunction { name, func } => {
                let target = self.declare(name);
                let func = self.function(func);
                Stmt::set(target, Expr::Function(func))
            }
            Stmt::Set { targets, exprs } => {
                let exprs = self.exprs(exprs);
                let targets = targets.into_iter().map(|t| self.target(t)).collect();
                Stmt::Set { targets, exprs }
            }
            Stmt::Call(expr) => Stmt::Call(self.expr(expr)),
            Stmt::Do(chunk) => Stmt::Do(self.wrap_locals(chunk, &[])),
            Stmt::While { test, body } => Stmt::While {
                test: self.expr(test),
                body: self.wrap_locals(body, &[]),
            },
            Stmt::If {
                test,
                then,
                elseifs,
                otherwise,
            } => Stmt::If {
                test: self.expr(test),
                then: self.wrap_locals(then, &[]),
                elseifs: elseifs
                    .into_iter()
                    .map(|(test, body)| (self.expr(test), self.wrap_locals(body, &[])))
                    .collect(),
                otherwise: otherwise.map(|c| self.wrap_locals(c, &[])),
            },
            other @ (Stmt::Goto(_) | Stmt::Label(_) | Stmt::Comment(_)) => other,
        })
    }

    fn function(&mut self, func: Function) -> Function {
        let body = self.wrap_locals(func.body, &func.params);
        Function {
            params: func.params,
            vararg: func.vararg,
            body,
        }
    }

    fn target(&mut self, target: SetTarget) -> SetTarget {
        match target {
            SetTarget::Name(name) => match self.routes.get(&name) {
                Some(env) => SetTarget::Dot(Expr::name(env), name),
                None => SetTarget::Name(name),
            },
            SetTarget::Dot(obj, name) => SetTarget::Dot(self.expr(obj), name),
            SetTarget::Index(obj, key) => SetTarget::Index(self.expr(obj), self.expr(key)),
        }
    }

    fn exprs(&mut self, exprs: Vec<Expr>) -> Vec<Expr> {
        exprs.into_iter().map(|e| self.expr(e)).collect()
    }

    fn expr(&mut self, expr: Expr) -> Expr {
        match expr {
            Expr::Name(name) => match self.routes.get(&name) {
                Some(env) => Expr::dot(Expr::name(env), name),
                None => Expr::Name(name),
            },
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
            other @ (Expr::Int(_) | Expr::Float(_) | Expr::Str(_) | Expr::Vararg) => other,
        }
    }
}

// =============================================================================
// Slot counting
// =============================================================================

/// Slots a chunk declares directly: one per bound name, plus the arity of
/// each function it creates. A named local function costs its own slot
/// like any other local. Nested chunks and function bodies are counted
/// separately, when they are rewritten.
pub fn count_locals(chunk: &Chunk) -> usize {
    let mut count = 0;
    for stmt in &chunk.body {
        count += match stmt {
            Stmt::Local { names, exprs } => names.len() + literal_params(exprs),
            Stmt::LocalFunction { func, .. } => 1 + func.params.len(),
            Stmt::Set { targets, exprs } => {
                let target_exprs = targets.iter().map(|t| match t {
                    SetTarget::Name(_) => 0,
                    SetTarget::Dot(obj, _) => literal_params_in(obj),
                    SetTarget::Index(obj, key) => literal_params_in(obj) + literal_params_in(key),
                });
                target_exprs.sum::<usize>() + literal_params(exprs)
            }
            Stmt::Call(expr) => literal_params_in(expr),
            Stmt::While { test, .. } => literal_params_in(test),
            Stmt::If { test, elseifs, .. } => {
                literal_params_in(test)
                    + elseifs
                        .iter()
                        .map(|(t, _)| literal_params_in(t))
                        .sum::<usize>()
            }
            Stmt::Do(_) | Stmt::Goto(_) | Stmt::Label(_) | Stmt::Comment(_) => 0,
        };
    }
    if let Some(LastStmt::Return(exprs)) = &chunk.last {
        count += literal_params(exprs);
    }
    count
}

fn literal_params(exprs: &[Expr]) -> usize {
    exprs.iter().map(literal_params_in).sum()
}

fn literal_params_in(expr: &Expr) -> usize {
    match expr {
        Expr::Function(func) => func.params.len(),
        Expr::Name(_) | Expr::Int(_) | Expr::Float(_) | Expr::Str(_) | Expr::Vararg => 0,
        Expr::Dot(obj, _) | Expr::UnOp(_, obj) | Expr::Paren(obj) => literal_params_in(obj),
        Expr::Index(a, b) | Expr::BinOp(_, a, b) => literal_params_in(a) + literal_params_in(b),
        Expr::Call(func, args) => literal_params_in(func) + literal_params(args),
        Expr::MethodCall(obj, _, args) => literal_params_in(obj) + literal_params(args),
        Expr::Table(fields) => fields
            .iter()
            .map(|f| match f {
                TableField::Positional(e) | TableField::Named(_, e) => literal_params_in(e),
            })
            .sum(),
    }
}
