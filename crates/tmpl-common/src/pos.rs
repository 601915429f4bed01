//! Source positions carried by IR nodes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A half-open `[left, right)` offset range into a named source file.
///
/// Positions are opaque to the backends. They only surface in diagnostics.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pos {
    #[serde(default)]
    pub file: String,
    #[serde(default)]
    pub left: u32,
    #[serde(default)]
    pub right: u32,
}

impl Pos {
    pub fn new(file: impl Into<String>, left: u32, right: u32) -> Self {
        Pos {
            file: file.into(),
            left,
            right,
        }
    }

    /// Position for nodes the compiler made up.
    pub fn synthetic() -> Self {
        Pos::default()
    }

    pub fn is_synthetic(&self) -> bool {
        self.file.is_empty() && self.left == 0 && self.right == 0
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.file.is_empty() {
            write!(f, "<synthetic>")
        } else {
            write!(f, "{}:{}+{}", self.file, self.left, self.right.saturating_sub(self.left))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Pos::new("a.temper", 4, 9).to_string(), "a.temper:4+5");
        assert_eq!(Pos::synthetic().to_string(), "<synthetic>");
    }

    #[test]
    fn test_missing_fields_deserialize_to_synthetic() {
        let pos: Pos = serde_json::from_str("{}").unwrap();
        assert!(pos.is_synthetic());
    }
}
