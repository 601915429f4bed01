//! Metadata side-channel between backends and the packaging layer.
//!
//! Backends record facts about what they emitted (for example the path of a
//! library's entry file) so that later tooling can find them without
//! re-deriving backend-specific layout rules.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BackendId(pub String);

impl BackendId {
    pub fn new(id: impl Into<String>) -> Self {
        BackendId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BackendId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Keys a backend may record. Values are always text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MetadataKey {
    /// Library-qualified path of the file that loads the whole library.
    MainFilePath,
    /// Library-qualified path of the primary header.
    MainHeaderPath,
}

/// Metadata recorded per `(library, backend, key)`.
#[derive(Clone, Debug, Default)]
pub struct MetadataRegistry {
    entries: FxHashMap<(String, BackendId, MetadataKey), String>,
}

impl MetadataRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a value, replacing any earlier value for the same key.
    pub fn add(
        &mut self,
        library: impl Into<String>,
        backend: &BackendId,
        key: MetadataKey,
        value: impl Into<String>,
    ) {
        self.entries
            .insert((library.into(), backend.clone(), key), value.into());
    }

    pub fn get(&self, library: &str, backend: &BackendId, key: MetadataKey) -> Option<&str> {
        self.entries
            .get(&(library.to_string(), backend.clone(), key))
            .map(String::as_str)
    }

    /// All entries sorted for stable output.
    pub fn entries(&self) -> Vec<(&str, &BackendId, MetadataKey, &str)> {
        let mut out: Vec<_> = self
            .entries
            .iter()
            .map(|((lib, backend, key), value)| (lib.as_str(), backend, *key, value.as_str()))
            .collect();
        out.sort();
        out
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyed_by_backend() {
        let lua = BackendId::new("lua");
        let cpp = BackendId::new("cpp");
        let mut registry = MetadataRegistry::new();
        registry.add("mylib", &lua, MetadataKey::MainFilePath, "mylib/init.lua");
        assert_eq!(
            registry.get("mylib", &lua, MetadataKey::MainFilePath),
            Some("mylib/init.lua")
        );
        assert_eq!(registry.get("mylib", &cpp, MetadataKey::MainFilePath), None);
    }

    #[test]
    fn test_later_value_wins() {
        let lua = BackendId::new("lua");
        let mut registry = MetadataRegistry::new();
        registry.add("l", &lua, MetadataKey::MainFilePath, "a");
        registry.add("l", &lua, MetadataKey::MainFilePath, "b");
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.entries()[0].3, "b");
    }
}
