//! Resolved names.

use serde::{Deserialize, Serialize};
use std::fmt;
use tmpl_common::Pos;

/// A name after frontend resolution.
///
/// Two `ResolvedName`s are the same binding exactly when they are equal.
/// Backends map each one to a target identifier exactly once.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolvedName {
    /// Visible outside the module under its own text.
    Exported { text: String },
    /// A user-written name made unique by `uid`.
    Source { base: String, uid: u32 },
    /// A compiler-introduced name.
    Temporary { base: String, uid: u32 },
    /// A name the target runtime provides.
    BuiltIn { text: String },
}

impl ResolvedName {
    pub fn exported(text: impl Into<String>) -> Self {
        ResolvedName::Exported { text: text.into() }
    }

    pub fn source(base: impl Into<String>, uid: u32) -> Self {
        ResolvedName::Source {
            base: base.into(),
            uid,
        }
    }

    pub fn temporary(base: impl Into<String>, uid: u32) -> Self {
        ResolvedName::Temporary {
            base: base.into(),
            uid,
        }
    }

    pub fn built_in(text: impl Into<String>) -> Self {
        ResolvedName::BuiltIn { text: text.into() }
    }

    /// The user-facing part of the name, without any uniquifier.
    pub fn base_text(&self) -> &str {
        match self {
            ResolvedName::Exported { text } | ResolvedName::BuiltIn { text } => text,
            ResolvedName::Source { base, .. } | ResolvedName::Temporary { base, .. } => base,
        }
    }

    pub fn is_exported(&self) -> bool {
        matches!(self, ResolvedName::Exported { .. })
    }
}

impl fmt::Display for ResolvedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedName::Exported { text } | ResolvedName::BuiltIn { text } => f.write_str(text),
            ResolvedName::Source { base, uid } => write!(f, "{base}__{uid}"),
            ResolvedName::Temporary { base, uid } => write!(f, "{base}#{uid}"),
        }
    }
}

/// A resolved name at a position.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Id {
    pub name: ResolvedName,
    #[serde(default)]
    pub pos: Pos,
}

impl Id {
    pub fn new(name: ResolvedName) -> Self {
        Id {
            name,
            pos: Pos::synthetic(),
        }
    }

    pub fn at(mut self, pos: Pos) -> Self {
        self.pos = pos;
        self
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.name.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_distinguishes_kinds() {
        assert_eq!(ResolvedName::exported("x").to_string(), "x");
        assert_eq!(ResolvedName::source("x", 3).to_string(), "x__3");
        assert_eq!(ResolvedName::temporary("t", 1).to_string(), "t#1");
    }

    #[test]
    fn test_base_text() {
        assert_eq!(ResolvedName::source("count", 9).base_text(), "count");
        assert!(ResolvedName::exported("count").is_exported());
        assert!(!ResolvedName::built_in("print").is_exported());
    }

    #[test]
    fn test_deserialize_tagged() {
        let id: Id = serde_json::from_str(r#"{"name": {"kind": "source", "base": "i", "uid": 2}}"#)
            .unwrap();
        assert_eq!(id.name, ResolvedName::source("i", 2));
        assert!(id.pos.is_synthetic());
    }
}
