//! TmpL to Lua tree translation.
//!
//! [`LuaTranslator`] owns everything that must stay consistent across one
//! module: the name table, the control-flow context and the module-level
//! functions that table-mode `try` bodies are hoisted into.
//!
//! - `expr`: expressions, literals, calls
//! - `stmt`: statements and function bodies
//! - `flow`: loops, labels, `return` and `try`/`recover`
//! - `top_level`: module-level declarations

mod expr;
mod flow;
mod stmt;
mod top_level;

pub use flow::Signal;
pub use top_level::TranslatedTopLevel;

use crate::ast::Stmt;
use crate::names::LuaNames;
use crate::options::LuaOptions;
use flow::FlowState;
use tmpl_common::Pos;
use tmpl_common::limits::MAX_TRANSLATION_DEPTH;
use tmpl_ir::TranslateError;

pub type Result<T> = std::result::Result<T, TranslateError>;

pub struct LuaTranslator {
    pub(crate) names: LuaNames,
    options: LuaOptions,
    flow: FlowState,
    global_funcs: Vec<Stmt>,
    /// Module-scoped names closures never capture.
    imported: Vec<String>,
    nesting: u32,
}

impl LuaTranslator {
    pub fn new(options: LuaOptions) -> Self {
        LuaTranslator {
            names: LuaNames::new(),
            options,
            flow: FlowState::default(),
            global_funcs: Vec::new(),
            imported: vec!["temper".to_string()],
            nesting: 0,
        }
    }

    pub fn options(&self) -> &LuaOptions {
        &self.options
    }

    pub fn names(&mut self) -> &mut LuaNames {
        &mut self.names
    }

    /// Functions hoisted out of `try` bodies since the last call.
    pub fn take_global_funcs(&mut self) -> Vec<Stmt> {
        std::mem::take(&mut self.global_funcs)
    }

    /// Bounds recursion on pathological input.
    fn nested<T>(&mut self, pos: &Pos, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.nesting >= MAX_TRANSLATION_DEPTH {
            return Err(TranslateError::invariant(pos, "nesting too deep to translate"));
        }
        self.nesting += 1;
        let result = f(self);
        self.nesting -= 1;
        result
    }
}
