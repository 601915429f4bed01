use clap::{Parser, ValueEnum};
use serde::Deserialize;
use std::path::PathBuf;
use tmpl_lua::ClosureMode;

/// CLI arguments for the tmplc binary.
#[derive(Parser, Debug)]
#[command(
    name = "tmplc",
    version,
    about = "Translate TmpL modules into Lua and C++"
)]
pub struct CliArgs {
    // ==================== Inputs and Outputs ====================
    /// TmpL JSON files, or directories searched for `*.tmpl.json`.
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Directory receiving one subdirectory per backend.
    #[arg(short = 'o', long = "out-dir")]
    pub out_dir: Option<PathBuf>,

    /// Path to a tmplc.json configuration file.
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Print the input files that would be translated and stop.
    #[arg(long = "list-files")]
    pub list_files: bool,

    // ==================== Backends ====================
    /// Backend to run. Repeat to run several.
    #[arg(short = 'b', long = "backend", value_enum)]
    pub backends: Vec<BackendKind>,

    /// Override the library name of every input module.
    #[arg(long = "library-name")]
    pub library_name: Option<String>,

    // ==================== Lua ====================
    /// How Lua `try` bodies capture enclosing locals.
    #[arg(long = "closure-mode")]
    pub closure_mode: Option<ClosureMode>,

    /// Wrap Lua functions in `temper.wrap_func` for named runtime errors.
    #[arg(long = "wrap-funcs")]
    pub wrap_funcs: bool,

    // ==================== Output Formatting ====================
    /// Color diagnostics. Defaults to on when stderr is a terminal.
    #[arg(long)]
    pub pretty: Option<bool>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Lua,
    Cpp,
}

impl BackendKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BackendKind::Lua => tmpl_lua::LUA_BACKEND_ID,
            BackendKind::Cpp => tmpl_cpp::CPP_BACKEND_ID,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_repeated_backends() {
        let args = CliArgs::parse_from([
            "tmplc",
            "in",
            "--backend",
            "lua",
            "--backend",
            "cpp",
            "--closure-mode",
            "global-table",
        ]);
        assert_eq!(args.backends, vec![BackendKind::Lua, BackendKind::Cpp]);
        assert_eq!(args.closure_mode, Some(ClosureMode::GlobalTable));
        assert!(!args.wrap_funcs);
    }

    #[test]
    fn test_rejects_unknown_closure_mode() {
        let result = CliArgs::try_parse_from(["tmplc", "in", "--closure-mode", "upvalues"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_inputs_required() {
        assert!(CliArgs::try_parse_from(["tmplc"]).is_err());
    }
}
