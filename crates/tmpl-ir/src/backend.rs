//! The backend contract.

use crate::tree::Module;
use std::fmt;
use tmpl_common::diagnostics as codes;
use tmpl_common::{BackendId, Diagnostic, MetadataRegistry, OutputFile, Pos};

/// A code generator for one target language.
///
/// Modules are translated independently, possibly on different threads.
/// `finish` then sees every file produced for one library.
pub trait Backend: Send + Sync {
    fn id(&self) -> BackendId;

    /// Translates one module into output files. Paths are relative to the
    /// library's output directory.
    fn translate_module(&self, module: &Module) -> Result<Vec<OutputFile>, TranslateError>;

    /// Adds library-level files and records metadata once all modules of
    /// `library_name` are translated.
    fn finish(
        &self,
        library_name: &str,
        files: &mut Vec<OutputFile>,
        metadata: &mut MetadataRegistry,
    ) -> Result<(), TranslateError>;
}

/// Why a translation stopped.
///
/// Both variants are compiler defects: the frontend should never hand a
/// backend something it cannot express.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TranslateError {
    /// A node kind this backend has no rendering for.
    Unsupported {
        pos: Pos,
        kind: String,
        detail: String,
    },
    /// The input broke an invariant the frontend promised.
    Invariant { pos: Pos, detail: String },
}

impl TranslateError {
    pub fn unsupported(pos: &Pos, kind: impl Into<String>, detail: impl Into<String>) -> Self {
        TranslateError::Unsupported {
            pos: pos.clone(),
            kind: kind.into(),
            detail: detail.into(),
        }
    }

    pub fn invariant(pos: &Pos, detail: impl Into<String>) -> Self {
        TranslateError::Invariant {
            pos: pos.clone(),
            detail: detail.into(),
        }
    }

    pub fn pos(&self) -> &Pos {
        match self {
            TranslateError::Unsupported { pos, .. } | TranslateError::Invariant { pos, .. } => pos,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let code = match self {
            TranslateError::Unsupported { .. } => codes::UNSUPPORTED_IR_NODE,
            TranslateError::Invariant { .. } => codes::INTERNAL_INVARIANT,
        };
        Diagnostic::error(self.pos().clone(), self.to_string(), code)
    }
}

impl fmt::Display for TranslateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranslateError::Unsupported { kind, detail, .. } if detail.is_empty() => {
                write!(f, "unsupported {kind}")
            }
            TranslateError::Unsupported { kind, detail, .. } => {
                write!(f, "unsupported {kind}: {detail}")
            }
            TranslateError::Invariant { detail, .. } => write!(f, "internal invariant: {detail}"),
        }
    }
}

impl std::error::Error for TranslateError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let pos = Pos::new("a.temper", 3, 5);
        assert_eq!(
            TranslateError::unsupported(&pos, "ComputedJump", "").to_string(),
            "unsupported ComputedJump"
        );
        assert_eq!(
            TranslateError::unsupported(&pos, "Value", "Class").to_string(),
            "unsupported Value: Class"
        );
        assert_eq!(
            TranslateError::invariant(&pos, "orphan break").to_string(),
            "internal invariant: orphan break"
        );
    }

    #[test]
    fn test_diagnostic_code() {
        let pos = Pos::new("a.temper", 3, 5);
        let diag = TranslateError::unsupported(&pos, "BubbleSentinel", "").to_diagnostic();
        assert_eq!(diag.code, codes::UNSUPPORTED_IR_NODE);
        assert_eq!(diag.pos, pos);
        let diag = TranslateError::invariant(&pos, "x").to_diagnostic();
        assert_eq!(diag.code, codes::INTERNAL_INVARIANT);
    }
}
