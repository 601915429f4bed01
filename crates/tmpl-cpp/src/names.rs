//! Resolved name to C++ identifier mapping.

use rustc_hash::{FxHashMap, FxHashSet};
use tmpl_common::ident::{avoid_keywords, sanitize_identifier};
use tmpl_ir::{Id, ResolvedName};

/// C++ keywords and alternative tokens, plus names generated code relies on.
pub const CPP_KEYWORDS: &[&str] = &[
    "alignas", "alignof", "and", "and_eq", "asm", "auto", "bitand", "bitor", "bool", "break",
    "case", "catch", "char", "class", "compl", "concept", "const", "consteval", "constexpr",
    "const_cast", "continue", "co_await", "co_return", "co_yield", "decltype", "default", "delete",
    "do", "double", "dynamic_cast", "else", "enum", "explicit", "export", "extern", "false",
    "float", "for", "friend", "goto", "if", "inline", "int", "long", "mutable", "namespace", "new",
    "noexcept", "not", "not_eq", "nullptr", "operator", "or", "or_eq", "private", "protected",
    "public", "register", "reinterpret_cast", "requires", "return", "short", "signed", "sizeof",
    "static", "static_assert", "static_cast", "struct", "switch", "template", "this",
    "thread_local", "throw", "true", "try", "typedef", "typeid", "typename", "union", "unsigned",
    "using", "virtual", "void", "volatile", "wchar_t", "while", "xor", "xor_eq", "make", "exit",
    "temper",
];

#[derive(Debug, Default)]
pub struct CppNames {
    assigned: FxHashMap<ResolvedName, String>,
    taken: FxHashSet<String>,
    counters: FxHashMap<(String, &'static str), u32>,
}

impl CppNames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(&mut self, id: &Id) -> String {
        self.resolve(&id.name)
    }

    pub fn resolve(&mut self, name: &ResolvedName) -> String {
        if let Some(existing) = self.assigned.get(name) {
            return existing.clone();
        }
        let ident = match name {
            ResolvedName::Exported { text } | ResolvedName::BuiltIn { text } => {
                let ident = safe_name(text);
                if ident.is_empty() || self.taken.contains(&ident) {
                    self.fresh(text, "_")
                } else {
                    ident
                }
            }
            ResolvedName::Source { base, .. } => self.fresh(base, "__"),
            ResolvedName::Temporary { base, .. } => self.fresh(base, "_"),
        };
        self.taken.insert(ident.clone());
        self.assigned.insert(name.clone(), ident.clone());
        ident
    }

    fn fresh(&mut self, base: &str, separator: &'static str) -> String {
        let base = sanitize_identifier(base);
        let base = if base.is_empty() { "anon".to_string() } else { base };
        let counter = self.counters.entry((base.clone(), separator)).or_insert(0);
        loop {
            let candidate = format!("{base}{separator}{counter}");
            *counter += 1;
            if !self.taken.contains(&candidate) {
                return candidate;
            }
        }
    }
}

/// A member, field or namespace name.
pub fn safe_name(text: &str) -> String {
    avoid_keywords(sanitize_identifier(text), CPP_KEYWORDS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_names_get_double_underscore() {
        let mut names = CppNames::new();
        assert_eq!(names.resolve(&ResolvedName::source("x", 7)), "x__0");
        assert_eq!(names.resolve(&ResolvedName::source("x", 9)), "x__1");
        assert_eq!(names.resolve(&ResolvedName::source("x", 7)), "x__0");
    }

    #[test]
    fn test_exported_keywords_are_escaped() {
        let mut names = CppNames::new();
        assert_eq!(names.resolve(&ResolvedName::exported("class")), "class_");
        assert_eq!(names.resolve(&ResolvedName::exported("size")), "size");
        assert_eq!(names.resolve(&ResolvedName::temporary("t", 1)), "t_0");
    }

    #[test]
    fn test_safe_name() {
        assert_eq!(safe_name("my-lib"), "myx2dlib");
        assert_eq!(safe_name("this"), "this_");
    }
}
