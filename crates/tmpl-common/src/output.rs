//! Files produced by a backend.

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Output Path
// =============================================================================

/// A relative, `/`-separated path under a backend's output root.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OutputPath {
    segments: Vec<String>,
}

impl OutputPath {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        OutputPath {
            segments: segments
                .into_iter()
                .map(Into::into)
                .filter(|s: &String| !s.is_empty())
                .collect(),
        }
    }

    /// Parse a `/`-separated relative path.
    pub fn parse(text: &str) -> Self {
        OutputPath::new(text.split('/'))
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn first(&self) -> Option<&str> {
        self.segments.first().map(String::as_str)
    }

    pub fn file_name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// The file name without its last extension.
    pub fn file_stem(&self) -> Option<&str> {
        let name = self.file_name()?;
        Some(match name.rfind('.') {
            Some(0) | None => name,
            Some(dot) => &name[..dot],
        })
    }

    pub fn parent(&self) -> OutputPath {
        let mut segments = self.segments.clone();
        segments.pop();
        OutputPath { segments }
    }

    pub fn join(&self, segment: impl Into<String>) -> OutputPath {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        OutputPath::new(segments)
    }

    pub fn join_path(&self, other: &OutputPath) -> OutputPath {
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        OutputPath { segments }
    }

    /// Replace the last extension of the file name. `None` strips it.
    pub fn with_extension(&self, ext: Option<&str>) -> OutputPath {
        let Some(stem) = self.file_stem() else {
            return self.clone();
        };
        let name = match ext {
            Some(ext) => format!("{stem}{ext}"),
            None => stem.to_string(),
        };
        let mut segments = self.segments.clone();
        segments.pop();
        segments.push(name);
        OutputPath { segments }
    }

    /// Convert to a native path below `root`.
    pub fn to_path_under(&self, root: &std::path::Path) -> std::path::PathBuf {
        let mut out = root.to_path_buf();
        for segment in &self.segments {
            out.push(segment);
        }
        out
    }
}

impl fmt::Display for OutputPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

// =============================================================================
// Output File
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MimeType {
    LuaSource,
    CppHeader,
    CppSource,
}

impl MimeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MimeType::LuaSource => "text/x-lua",
            MimeType::CppHeader => "text/x-c++hdr",
            MimeType::CppSource => "text/x-c++src",
        }
    }
}

/// One generated file, relative to the backend's output root.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputFile {
    pub path: OutputPath,
    pub contents: String,
    pub mime: MimeType,
}

impl OutputFile {
    pub fn new(path: OutputPath, contents: impl Into<String>, mime: MimeType) -> Self {
        OutputFile {
            path,
            contents: contents.into(),
            mime,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_drops_empty_segments() {
        let path = OutputPath::parse("lib//tests/foo-test.lua");
        assert_eq!(path.segments(), &["lib", "tests", "foo-test.lua"]);
        assert_eq!(path.to_string(), "lib/tests/foo-test.lua");
    }

    #[test]
    fn test_with_extension() {
        let path = OutputPath::parse("dir/foo.lua");
        assert_eq!(path.with_extension(None).to_string(), "dir/foo");
        assert_eq!(path.with_extension(Some(".hpp")).to_string(), "dir/foo.hpp");
        assert_eq!(OutputPath::parse(".hidden").file_stem(), Some(".hidden"));
    }

    #[test]
    fn test_parent_and_join() {
        let path = OutputPath::parse("a/b/c.lua");
        assert_eq!(path.parent().join("d.lua").to_string(), "a/b/d.lua");
        assert_eq!(path.first(), Some("a"));
        assert_eq!(path.file_name(), Some("c.lua"));
    }

    #[test]
    fn test_to_path_under() {
        let native = OutputPath::parse("lib/init.lua").to_path_under(std::path::Path::new("out"));
        assert_eq!(native, std::path::Path::new("out").join("lib").join("init.lua"));
    }
}
