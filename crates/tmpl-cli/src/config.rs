//! `tmplc.json` and how it combines with command line flags.

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tmpl_lua::LuaOptions;

use crate::args::{BackendKind, CliArgs};

/// File looked for in the working directory when `--config` is absent.
pub const CONFIG_FILE_NAME: &str = "tmplc.json";
pub const DEFAULT_OUT_DIR: &str = "tmpl-out";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TmplConfig {
    pub out_dir: Option<PathBuf>,
    pub backends: Vec<BackendKind>,
    pub library_name: Option<String>,
    pub lua: LuaOptions,
}

/// Settings after flags are layered over the config file.
#[derive(Debug, Clone)]
pub struct ResolvedSettings {
    pub out_dir: PathBuf,
    pub backends: Vec<BackendKind>,
    pub library_name: Option<String>,
    pub lua: LuaOptions,
}

pub fn parse_config(source: &str) -> Result<TmplConfig> {
    let config = serde_json::from_str(source).context("failed to parse tmplc config JSON")?;
    Ok(config)
}

pub fn load_config(path: &Path) -> Result<TmplConfig> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    parse_config(&source).with_context(|| format!("in {}", path.display()))
}

/// The explicit `--config`, else `tmplc.json` in `cwd` when it exists.
pub fn find_config(args: &CliArgs, cwd: &Path) -> Result<TmplConfig> {
    if let Some(path) = &args.config {
        if !path.is_file() {
            bail!("config file {} does not exist", path.display());
        }
        return load_config(path);
    }
    let implicit = cwd.join(CONFIG_FILE_NAME);
    if implicit.is_file() {
        return load_config(&implicit);
    }
    Ok(TmplConfig::default())
}

pub fn resolve_settings(args: &CliArgs, config: TmplConfig, cwd: &Path) -> ResolvedSettings {
    let out_dir = args
        .out_dir
        .clone()
        .or(config.out_dir)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUT_DIR));
    let mut backends = if args.backends.is_empty() {
        config.backends
    } else {
        args.backends.clone()
    };
    if backends.is_empty() {
        backends.push(BackendKind::Lua);
    }
    dedup_in_order(&mut backends);

    let mut lua = config.lua;
    if let Some(mode) = args.closure_mode {
        lua.closure_mode = mode;
    }
    if args.wrap_funcs {
        lua.wrap_funcs = true;
    }

    ResolvedSettings {
        out_dir: if out_dir.is_absolute() {
            out_dir
        } else {
            cwd.join(out_dir)
        },
        backends,
        library_name: args.library_name.clone().or(config.library_name),
        lua,
    }
}

fn dedup_in_order(backends: &mut Vec<BackendKind>) {
    let mut seen = Vec::with_capacity(backends.len());
    backends.retain(|b| {
        if seen.contains(b) {
            false
        } else {
            seen.push(*b);
            true
        }
    });
}
