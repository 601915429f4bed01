//! TmpL: the language-neutral tree the backends consume.
//!
//! The frontend hands us fully type-checked, name-resolved modules as JSON.
//! This crate owns the Rust shape of that contract and the [`Backend`] trait
//! every code generator implements.
//!
//! # Layout
//!
//! - [`names`]: resolved names and identifiers
//! - [`types`]: static types and the implicit type tag classification
//! - [`value`]: literal runtime values
//! - [`support`]: builtin operators and connected support code
//! - [`tree`]: modules, top levels, statements and expressions
//! - [`backend`]: the backend trait and the defect error type
//! - [`decode`]: JSON decoding
//! - [`build`]: terse constructors for tests and fixtures

pub mod backend;
pub mod build;
pub mod decode;
pub mod names;
pub mod support;
pub mod tree;
pub mod types;
pub mod value;

pub use backend::{Backend, TranslateError};
pub use decode::{DecodeError, decode_module, decode_modules};
pub use names::{Id, ResolvedName};
pub use support::{BuiltinOperator, RuntimeTypeOperation, SupportCode};
pub use tree::*;
pub use types::{ImplicitTypeTag, Type, TypeName, WellKnownType};
pub use value::Value;
