//! Assembly of one output Lua file.
//!
//! A module's top levels are split by dependency category and each category
//! becomes its own file. [`ModuleParts`] collects the pieces of one such file
//! and lays them out:
//!
//! ```text
//! local temper = require('temper-core')
//! <imports> <deferred imports>
//! local <module-scoped names>
//! <functions hoisted out of try bodies>
//! <top levels>
//! exports = {}; exports.x = x ...
//! <test runner>
//! return exports
//! ```

use crate::ast::{Chunk, Expr, LastStmt, SetTarget, Stmt, TableField, referenced_names};
use crate::chunk::lua_chunk;
use crate::local_remover::LuaLocalRemover;
use crate::support::{temper, temper_call};
use crate::translator::{LuaTranslator, Result};
use indexmap::IndexSet;
use tmpl_ir::{DependencyCategory, Import, TopLevel};
use tracing::trace;

/// Imports that resolve to another module under a new name.
const PATH_ALIASES: &[(&str, &str)] = &[("work/regex", "std/regex")];

/// The testing library is the test runner itself.
const SKIPPED_IMPORTS: &[&str] = &["std/testing"];

pub struct ModuleParts {
    category: DependencyCategory,
    imports: Vec<Stmt>,
    predecls: IndexSet<String>,
    global_funcs: Vec<Stmt>,
    top_levels: Vec<Stmt>,
    exported: IndexSet<String>,
    ensured: IndexSet<String>,
    trailer: Vec<Stmt>,
}

impl ModuleParts {
    pub fn new(category: DependencyCategory) -> Self {
        ModuleParts {
            category,
            imports: Vec::new(),
            predecls: IndexSet::new(),
            global_funcs: Vec::new(),
            top_levels: Vec::new(),
            exported: IndexSet::new(),
            ensured: IndexSet::new(),
            trailer: Vec::new(),
        }
    }

    pub fn category(&self) -> DependencyCategory {
        self.category
    }

    /// Binds the module's imports and, for test files, the test harness.
    pub fn init(&mut self, translator: &mut LuaTranslator, imports: &[Import]) {
        for import in imports {
            let Some(path) = &import.path else {
                continue;
            };
            let mut require = path.require_path();
            if SKIPPED_IMPORTS.contains(&require.as_str()) {
                continue;
            }
            if let Some((_, to)) = PATH_ALIASES.iter().find(|(from, _)| *from == require) {
                require = (*to).to_string();
            }
            let external = import.external_name.name.base_text().to_string();
            match &import.local_name {
                Some(local) => {
                    let ident = translator.names().name(local);
                    translator.names().alias(&import.external_name.name, &ident);
                    let external = translator.names().safe_name(&external);
                    self.imports.push(Stmt::local(
                        ident,
                        temper_call("import", vec![Expr::str(require), Expr::str(external)]),
                    ));
                }
                None => {
                    let external = translator.names().safe_name(&external);
                    translator
                        .names()
                        .import_as_needed(&import.external_name.name, &require, &external);
                }
            }
        }

        if self.category == DependencyCategory::Test {
            let unpack = translator.names().gensym("unpack");
            let lu = translator.names().gensym("lu");
            self.imports.push(Stmt::local(
                unpack.clone(),
                Expr::binop(
                    crate::ast::BinOp::Or,
                    Expr::name("unpack"),
                    Expr::dot(Expr::name("table"), "unpack"),
                ),
            ));
            self.imports.push(Stmt::local(
                lu.clone(),
                Expr::call(Expr::name("require"), vec![Expr::str("luaunit")]),
            ));
            self.imports.push(Stmt::set(
                SetTarget::Dot(Expr::name(&lu), "FAILURE_PREFIX".into()),
                temper("test_failure_prefix"),
            ));
            self.imports
                .push(Stmt::set_name("Test_", Expr::Table(Vec::new())));

            let args = Expr::Table(vec![
                TableField::Positional(Expr::str("--pattern")),
                TableField::Positional(Expr::str("^Test_%.")),
                TableField::Positional(Expr::call(
                    Expr::name(&unpack),
                    vec![Expr::name("arg")],
                )),
            ]);
            self.trailer.push(Stmt::Call(Expr::call(
                Expr::dot(Expr::dot(Expr::name(&lu), "LuaUnit"), "run"),
                vec![Expr::call(Expr::name(&unpack), vec![args])],
            )));
        }
    }

    pub fn add_top_level(&mut self, translator: &mut LuaTranslator, top: &TopLevel) -> Result<()> {
        trace!(kind = top.kind_name(), "translating top level");
        let translated = translator.top_level(top)?;
        if let Some(name) = translated.declared {
            let exported = top
                .declared_name()
                .is_some_and(|id| id.name.is_exported());
            if exported {
                self.exported.insert(name.clone());
            }
            self.predecls.insert(name);
        }
        self.top_levels.extend(translated.stmts);
        self.global_funcs.extend(translator.take_global_funcs());
        Ok(())
    }

    /// Binds the lazily resolved imports used since the last call.
    pub fn bind_deferred_imports(&mut self, translator: &mut LuaTranslator) {
        for deferred in translator.names().take_deferred_imports() {
            self.imports.push(Stmt::local(
                deferred.local,
                temper_call(
                    "import",
                    vec![Expr::str(deferred.path), Expr::str(deferred.external)],
                ),
            ));
        }
    }

    /// Adds an import binding ahead of everything the module translated.
    pub fn add_import(&mut self, stmt: Stmt) {
        self.imports.push(stmt);
    }

    /// Exports `name` even though the source did not.
    pub fn ensure_exported(&mut self, name: impl Into<String>) {
        self.ensured.insert(name.into());
    }

    /// Module-scoped names this file declares.
    pub fn declared(&self) -> impl Iterator<Item = &str> {
        self.predecls.iter().map(String::as_str)
    }

    pub fn exported(&self) -> impl Iterator<Item = &str> {
        self.exported.iter().map(String::as_str)
    }

    /// Every identifier the translated statements mention.
    pub fn referenced_names(&self) -> IndexSet<String> {
        let chunk = Chunk::new(
            self.global_funcs
                .iter()
                .chain(&self.top_levels)
                .cloned()
                .collect(),
            None,
        );
        referenced_names(&chunk)
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    pub fn has_content(&self) -> bool {
        !self.top_levels.is_empty() || !self.global_funcs.is_empty()
    }

    /// Lays out the file and moves locals out of the way of Lua's limit.
    pub fn finish(mut self, translator: &mut LuaTranslator) -> Chunk {
        self.bind_deferred_imports(translator);
        let mut body = self.imports;
        if !self.predecls.is_empty() {
            body.push(Stmt::Local {
                names: self.predecls.into_iter().collect(),
                exprs: Vec::new(),
            });
        }
        body.extend(self.global_funcs);
        body.extend(self.top_levels);
        body.push(Stmt::local("exports", Expr::Table(Vec::new())));
        for name in self.exported.iter().chain(self.ensured.difference(&self.exported)) {
            body.push(Stmt::set(
                SetTarget::Dot(Expr::name("exports"), name.clone()),
                Expr::name(name),
            ));
        }
        body.extend(self.trailer);

        let wrapped = Chunk::new(
            vec![Stmt::Do(lua_chunk(
                body,
                Some(LastStmt::Return(vec![Expr::name("exports")])),
            ))],
            None,
        );
        let rewritten = LuaLocalRemover::new().rewrite(wrapped);

        let mut stmts = vec![Stmt::local(
            "temper",
            Expr::call(Expr::name("require"), vec![Expr::str("temper-core")]),
        )];
        stmts.extend(rewritten.body);
        lua_chunk(stmts, rewritten.last)
    }
}
