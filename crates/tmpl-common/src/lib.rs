//! Common types and utilities for the tmplc TmpL backends.
//!
//! This crate provides foundational types used across all tmpl crates:
//! - Source positions (`Pos`)
//! - Diagnostics (`Diagnostic`, `DiagnosticBag`, `DiagnosticSeverity`)
//! - Backend limits and thresholds
//! - Output files and paths (`OutputFile`, `OutputPath`)
//! - The typed metadata side-channel shared between backends and packaging

// Pos - Source location tracking
pub mod pos;
pub use pos::Pos;

// Diagnostics reported to the operator
pub mod diagnostics;
pub use diagnostics::{Diagnostic, DiagnosticBag, DiagnosticSeverity};

// Centralized limits and thresholds
pub mod limits;

// Files produced by a backend
pub mod output;
pub use output::{MimeType, OutputFile, OutputPath};

// Per-backend metadata registry
pub mod metadata;
pub use metadata::{BackendId, MetadataKey, MetadataRegistry};

// Identifier sanitizing for target languages
pub mod ident;
