//! Library half of the `tmplc` binary: argument parsing, configuration,
//! the compile driver and diagnostic rendering.

pub mod args;
pub mod config;
pub mod driver;
pub mod reporter;
pub mod tracing_config;
