//! The Lua [`Backend`].

use crate::ast::{Chunk, Expr, LastStmt, Stmt, TableField};
use crate::module_parts::ModuleParts;
use crate::options::LuaOptions;
use crate::printer::LuaPrinter;
use crate::support::temper_call;
use crate::translator::LuaTranslator;
use tmpl_common::{BackendId, MetadataKey, MetadataRegistry, MimeType, OutputFile, OutputPath};
use tmpl_ir::{Backend, DependencyCategory, Module, TranslateError};
use tracing::debug;

pub const LUA_BACKEND_ID: &str = "lua";

#[derive(Debug, Default, Clone)]
pub struct LuaBackend {
    options: LuaOptions,
}

impl LuaBackend {
    pub fn new(options: LuaOptions) -> Self {
        LuaBackend { options }
    }

    pub fn options(&self) -> &LuaOptions {
        &self.options
    }
}

/// Where one module's files go, relative to the library directory.
struct ModuleLayout {
    stem: Vec<String>,
    library_name: String,
}

impl ModuleLayout {
    fn new(module: &Module) -> Self {
        let mut stem = module.stem_segments();
        if stem.is_empty() {
            stem.push("init".to_string());
        }
        ModuleLayout {
            stem,
            library_name: module.library_name.clone(),
        }
    }

    fn file(&self, suffix: &str) -> OutputPath {
        let mut segments = self.stem.clone();
        if let Some(last) = segments.last_mut() {
            last.push_str(suffix);
            last.push_str(".lua");
        }
        OutputPath::new(segments)
    }

    fn test_file(&self) -> OutputPath {
        OutputPath::new(["tests".to_string()]).join_path(&self.file("-test"))
    }

    fn require_path(&self, suffix: &str) -> String {
        format!("{}/{}{suffix}", self.library_name, self.stem.join("/"))
    }
}

fn lua_file(path: OutputPath, chunk: &Chunk) -> OutputFile {
    OutputFile::new(path, LuaPrinter::print_file(chunk), MimeType::LuaSource)
}

impl Backend for LuaBackend {
    fn id(&self) -> BackendId {
        BackendId::new(LUA_BACKEND_ID)
    }

    #[tracing::instrument(level = "debug", skip_all, fields(module = ?module.name))]
    fn translate_module(&self, module: &Module) -> Result<Vec<OutputFile>, TranslateError> {
        let layout = ModuleLayout::new(module);
        let mut translator = LuaTranslator::new(self.options);

        let mut prod = ModuleParts::new(DependencyCategory::Production);
        prod.init(&mut translator, &module.imports);
        for top in module
            .top_levels
            .iter()
            .filter(|t| t.category() == DependencyCategory::Production)
        {
            prod.add_top_level(&mut translator, top)?;
        }
        prod.bind_deferred_imports(&mut translator);

        let test_tops: Vec<_> = module
            .top_levels
            .iter()
            .filter(|t| t.category() == DependencyCategory::Test)
            .collect();
        let mut test = None;
        if !test_tops.is_empty() {
            let mut parts = ModuleParts::new(DependencyCategory::Test);
            parts.init(&mut translator, &module.imports);
            for top in test_tops {
                parts.add_top_level(&mut translator, top)?;
            }
            test = Some(parts);
        }

        // Test code reads production declarations through the module's
        // exports. Names the source did not export force an internal module
        // that exports everything, behind a shim with the public surface.
        let mut needed = Vec::new();
        if let Some(test) = &test {
            let referenced = test.referenced_names();
            needed.extend(
                prod.declared()
                    .filter(|name| referenced.contains(*name))
                    .map(str::to_string),
            );
        }
        let exported: Vec<String> = prod.exported().map(str::to_string).collect();
        let internal: Vec<&String> = needed.iter().filter(|n| !exported.contains(n)).collect();
        let split = !internal.is_empty();
        for name in &internal {
            prod.ensure_exported(name.as_str());
        }

        let mut files = Vec::new();
        let prod_chunk = prod.finish(&mut translator);
        if split {
            debug!(hidden = internal.len(), "splitting internal module for tests");
            files.push(lua_file(layout.file("-internal"), &prod_chunk));
            files.push(lua_file(
                layout.file(""),
                &export_shim(&layout.require_path("-internal"), &exported),
            ));
        } else {
            files.push(lua_file(layout.file(""), &prod_chunk));
        }

        if let Some(mut test) = test {
            let from = layout.require_path(if split { "-internal" } else { "" });
            for name in &needed {
                test.add_import(Stmt::local(
                    name.clone(),
                    temper_call("import", vec![Expr::str(from.clone()), Expr::str(name.clone())]),
                ));
            }
            let chunk = test.finish(&mut translator);
            files.push(lua_file(layout.test_file(), &chunk));
        }
        Ok(files)
    }

    fn finish(
        &self,
        library_name: &str,
        files: &mut Vec<OutputFile>,
        metadata: &mut MetadataRegistry,
    ) -> Result<(), TranslateError> {
        let init = OutputPath::new(["init.lua"]);
        if !files.iter().any(|f| f.path == init) {
            let mut paths: Vec<&OutputPath> = files
                .iter()
                .filter(|f| f.path.first() != Some("tests"))
                .map(|f| &f.path)
                .collect();
            paths.sort();
            let body = paths
                .into_iter()
                .map(|path| {
                    let module = path.with_extension(None);
                    Stmt::Call(Expr::call(
                        Expr::name("require"),
                        vec![Expr::str(format!("{library_name}/{module}"))],
                    ))
                })
                .collect();
            files.push(lua_file(init, &Chunk::new(body, None)));
        }
        metadata.add(
            library_name,
            &self.id(),
            MetadataKey::MainFilePath,
            format!("{library_name}/init.lua"),
        );
        Ok(())
    }
}

/// `local imports = require(path); return {x = imports.x, ...}`
fn export_shim(require_path: &str, exported: &[String]) -> Chunk {
    let fields = exported
        .iter()
        .map(|name| {
            TableField::Named(name.clone(), Expr::dot(Expr::name("imports"), name.clone()))
        })
        .collect();
    Chunk::new(
        vec![Stmt::local(
            "imports",
            Expr::call(Expr::name("require"), vec![Expr::str(require_path)]),
        )],
        Some(LastStmt::Return(vec![Expr::Table(fields)])),
    )
}
