//! Reads TmpL documents, runs the selected backends and writes their files.
//!
//! Modules translate in parallel. A module that fails becomes one diagnostic
//! and the rest of the run carries on; the caller decides the exit status
//! from the returned diagnostics.

use anyhow::{Context, Result, bail};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tmpl_common::diagnostics::{MALFORMED_INPUT, OUTPUT_FAILURE};
use tmpl_common::{DiagnosticBag, MetadataRegistry, OutputFile, Pos};
use tmpl_cpp::CppBackend;
use tmpl_ir::{Backend, Module, decode_modules};
use tmpl_lua::LuaBackend;
use tracing::{debug, info_span};
use walkdir::WalkDir;

use crate::args::BackendKind;
use crate::config::ResolvedSettings;

/// Suffix of TmpL documents found by walking a directory.
pub const INPUT_SUFFIX: &str = ".tmpl.json";

#[derive(Debug, Default)]
pub struct CompilationResult {
    pub diagnostics: DiagnosticBag,
    pub files_read: Vec<PathBuf>,
    pub written: Vec<PathBuf>,
    pub metadata: MetadataRegistry,
}

/// Expands directories into the `*.tmpl.json` files below them, sorted.
/// Files named directly are kept whatever their extension.
pub fn discover_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for input in inputs {
        if input.is_file() {
            found.push(input.clone());
            continue;
        }
        if !input.is_dir() {
            bail!("input {} does not exist", input.display());
        }
        let mut in_dir = Vec::new();
        for entry in WalkDir::new(input).follow_links(true) {
            let entry = entry.with_context(|| format!("failed to walk {}", input.display()))?;
            let is_input = entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.ends_with(INPUT_SUFFIX));
            if entry.file_type().is_file() && is_input {
                in_dir.push(entry.into_path());
            }
        }
        in_dir.sort();
        found.extend(in_dir);
    }
    Ok(found)
}

pub fn make_backend(kind: BackendKind, settings: &ResolvedSettings) -> Box<dyn Backend> {
    match kind {
        BackendKind::Lua => Box::new(LuaBackend::new(settings.lua)),
        BackendKind::Cpp => Box::new(CppBackend::new()),
    }
}

pub fn compile(settings: &ResolvedSettings, inputs: &[PathBuf]) -> Result<CompilationResult> {
    let mut result = CompilationResult::default();
    let mut modules = Vec::new();
    for path in inputs {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        result.files_read.push(path.clone());
        match decode_modules(&text) {
            Ok(decoded) => modules.extend(decoded),
            Err(err) => {
                let pos = Pos::new(path.display().to_string(), 0, 0);
                result
                    .diagnostics
                    .error(pos, err.to_string(), MALFORMED_INPUT);
            }
        }
    }
    if let Some(library_name) = &settings.library_name {
        for module in &mut modules {
            module.library_name = library_name.clone();
        }
    }
    debug!(modules = modules.len(), "decoded inputs");

    for kind in &settings.backends {
        let backend = make_backend(*kind, settings);
        let out_dir = settings.out_dir.join(kind.as_str());
        run_backend(backend.as_ref(), &modules, &out_dir, &mut result);
    }
    Ok(result)
}

fn run_backend(
    backend: &dyn Backend,
    modules: &[Module],
    out_dir: &Path,
    result: &mut CompilationResult,
) {
    let id = backend.id();
    let _span = info_span!("backend", id = %id).entered();

    let translated: Vec<_> = modules
        .par_iter()
        .map(|module| (module.library_name.clone(), backend.translate_module(module)))
        .collect();

    let mut libraries: BTreeMap<String, Vec<OutputFile>> = BTreeMap::new();
    for (library, outcome) in translated {
        let files = libraries.entry(library).or_default();
        match outcome {
            Ok(mut produced) => files.append(&mut produced),
            Err(err) => result.diagnostics.add(err.to_diagnostic()),
        }
    }

    let mut outputs = Vec::new();
    for (library, mut files) in libraries {
        if let Err(err) = backend.finish(&library, &mut files, &mut result.metadata) {
            result.diagnostics.add(err.to_diagnostic());
            continue;
        }
        let library_dir = out_dir.join(&library);
        outputs.extend(files.into_iter().map(|f| (f.path.to_path_under(&library_dir), f)));
    }

    for (path, outcome) in write_outputs(&outputs) {
        match outcome {
            Ok(()) => result.written.push(path),
            Err(err) => result.diagnostics.error(
                Pos::new(path.display().to_string(), 0, 0),
                format!("{err:#}"),
                OUTPUT_FAILURE,
            ),
        }
    }
}

fn write_outputs(outputs: &[(PathBuf, OutputFile)]) -> Vec<(PathBuf, Result<()>)> {
    outputs
        .par_iter()
        .map(|(path, file)| {
            let written = (|| -> Result<()> {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent).with_context(|| {
                        format!("failed to create directory {}", parent.display())
                    })?;
                }
                std::fs::write(path, &file.contents)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                debug!(path = %path.display(), bytes = file.contents.len(), "wrote file");
                Ok(())
            })();
            (path.clone(), written)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discover_walks_directories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("sub");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join("b.tmpl.json"), "[]").unwrap();
        std::fs::write(dir.path().join("a.tmpl.json"), "[]").unwrap();
        std::fs::write(dir.path().join("notes.json"), "{}").unwrap();

        let found = discover_inputs(&[dir.path().to_path_buf()]).unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            names,
            vec![PathBuf::from("a.tmpl.json"), PathBuf::from("sub/b.tmpl.json")]
        );
    }

    #[test]
    fn test_discover_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover_inputs(&[dir.path().join("absent")]).is_err());
    }
}
