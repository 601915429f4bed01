//! Lua backend for tmplc.
//!
//! Translation runs in three stages:
//! - `translator` lowers TmpL trees onto the Lua tree in [`ast`], rewriting
//!   structured control flow that crosses `try` boundaries
//! - `module_parts` and `local_remover` assemble each output file and keep
//!   it under Lua's local-variable ceiling
//! - `printer` renders source text

pub mod ast;
pub mod backend;
pub mod chunk;
pub mod closure;
pub mod local_remover;
pub mod module_parts;
pub mod names;
pub mod options;
pub mod printer;
pub mod support;
pub mod translator;

pub use backend::{LUA_BACKEND_ID, LuaBackend};
pub use options::{ClosureMode, LuaOptions};
pub use printer::LuaPrinter;
