//! The C++ [`Backend`].

use crate::names::safe_name;
use crate::printer::CppPrinter;
use crate::translator::CppTranslator;
use tmpl_common::{BackendId, MetadataKey, MetadataRegistry, MimeType, OutputFile, OutputPath};
use tmpl_ir::{Backend, DependencyCategory, Module, TranslateError};
use tracing::debug;

pub const CPP_BACKEND_ID: &str = "cpp";

#[derive(Debug, Default, Clone)]
pub struct CppBackend;

impl CppBackend {
    pub fn new() -> Self {
        CppBackend
    }
}

/// `TEMPER_<LIB>_<PATH>_HPP`
fn include_guard(library_name: &str, path: &OutputPath) -> String {
    let mut guard = format!("TEMPER_{}", safe_name(library_name));
    for segment in path.with_extension(None).segments() {
        guard.push('_');
        guard.push_str(&safe_name(segment));
    }
    guard.push_str("_HPP");
    guard.to_ascii_uppercase()
}

fn umbrella_header(library_name: &str) -> OutputPath {
    OutputPath::new([format!("{}.hpp", safe_name(library_name))])
}

impl Backend for CppBackend {
    fn id(&self) -> BackendId {
        BackendId::new(CPP_BACKEND_ID)
    }

    #[tracing::instrument(level = "debug", skip_all, fields(module = ?module.name))]
    fn translate_module(&self, module: &Module) -> Result<Vec<OutputFile>, TranslateError> {
        if module
            .top_levels
            .iter()
            .all(|top| top.category() == DependencyCategory::Test)
        {
            debug!("no production code");
            return Ok(Vec::new());
        }
        let unit = CppTranslator::new().translate_module(module)?;

        let mut stem = module.stem_segments();
        if stem.is_empty() {
            stem.push("main".to_string());
        }
        let base = OutputPath::new(stem);
        let header = base.with_extension(Some(".hpp"));
        let source = base.with_extension(Some(".cpp"));
        let header_name = header.file_name().unwrap_or_default().to_string();

        let guard = include_guard(&module.library_name, &header);
        debug!(header = %header, decls = unit.decls.len(), "translated module");
        Ok(vec![
            OutputFile::new(
                header,
                CppPrinter::print_header(&unit, &guard),
                MimeType::CppHeader,
            ),
            OutputFile::new(
                source,
                CppPrinter::print_source(&unit, &header_name),
                MimeType::CppSource,
            ),
        ])
    }

    /// Adds an umbrella header including every module header, unless a
    /// module already produced one at that path.
    fn finish(
        &self,
        library_name: &str,
        files: &mut Vec<OutputFile>,
        metadata: &mut MetadataRegistry,
    ) -> Result<(), TranslateError> {
        let umbrella = umbrella_header(library_name);
        if !files.iter().any(|f| f.path == umbrella) {
            let mut headers: Vec<String> = files
                .iter()
                .filter(|f| f.mime == MimeType::CppHeader)
                .map(|f| f.path.to_string())
                .collect();
            headers.sort();
            let guard = include_guard(library_name, &umbrella);
            let mut contents = format!("#ifndef {guard}\n#define {guard}\n\n");
            for header in headers {
                contents.push_str(&format!("#include \"{header}\"\n"));
            }
            contents.push_str(&format!("\n#endif // {guard}\n"));
            files.push(OutputFile::new(umbrella.clone(), contents, MimeType::CppHeader));
        }
        metadata.add(
            library_name,
            &self.id(),
            MetadataKey::MainHeaderPath,
            format!("{library_name}/{umbrella}"),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_include_guard() {
        let path = OutputPath::parse("sub/apple.hpp");
        assert_eq!(include_guard("my-lib", &path), "TEMPER_MYX2DLIB_SUB_APPLE_HPP");
    }
}
