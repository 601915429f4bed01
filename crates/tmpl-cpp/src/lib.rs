//! C++ backend for tmplc.
//!
//! Covers declarations, straight-line statements and structured `if`/`while`.
//! Everything else is stubbed in the output with a comment so a header can
//! still be produced for a module the backend only partly understands.

pub mod ast;
pub mod backend;
pub mod names;
pub mod printer;
pub mod translator;
pub mod types;

pub use backend::{CPP_BACKEND_ID, CppBackend};
