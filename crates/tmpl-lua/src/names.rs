//! Resolved name to Lua identifier mapping.
//!
//! One `LuaNames` lives for the translation of one module, shared by that
//! module's production and test outputs so both agree on every identifier.

use indexmap::IndexSet;
use rustc_hash::{FxHashMap, FxHashSet};
use tmpl_common::ident::{avoid_keywords, sanitize_identifier};
use tmpl_ir::{Id, ResolvedName};

/// Lua reserved words plus the identifiers generated module code relies on.
pub const LUA_KEYWORDS: &[&str] = &[
    "and", "break", "do", "else", "elseif", "end", "false", "for", "function", "goto", "if", "in",
    "local", "nil", "not", "or", "repeat", "return", "then", "true", "until", "while",
];

const RESERVED: &[&str] = &["temper", "exports", "imports", "Test_", "arg", "unpack", "require"];

/// An import bound the first time its local name is used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeferredImport {
    pub local: String,
    pub path: String,
    pub external: String,
}

#[derive(Debug, Default)]
pub struct LuaNames {
    assigned: FxHashMap<ResolvedName, String>,
    taken: FxHashSet<String>,
    source_counters: FxHashMap<String, u32>,
    temp_counters: FxHashMap<String, u32>,
    deferred: FxHashMap<ResolvedName, (String, String)>,
    materialized: IndexSet<ResolvedName>,
}

impl LuaNames {
    pub fn new() -> Self {
        let mut names = LuaNames::default();
        names.taken.extend(RESERVED.iter().map(|s| s.to_string()));
        names
    }

    /// The identifier for `id`, allocating it on first use.
    pub fn name(&mut self, id: &Id) -> String {
        self.resolve(&id.name)
    }

    pub fn resolve(&mut self, name: &ResolvedName) -> String {
        if let Some(existing) = self.assigned.get(name) {
            let existing = existing.clone();
            if self.deferred.contains_key(name) {
                self.materialized.insert(name.clone());
            }
            return existing;
        }
        let ident = match name {
            ResolvedName::Exported { text } | ResolvedName::BuiltIn { text } => {
                let ident = self.safe_name(text);
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
        if self.deferred.contains_key(name) {
            self.materialized.insert(name.clone());
        }
        ident
    }

    /// A new identifier no resolved name maps to.
    pub fn gensym(&mut self, base: &str) -> String {
        let ident = self.fresh(base, "_");
        self.taken.insert(ident.clone());
        ident
    }

    /// A goto label spelled `base` unless something already took it.
    pub fn label(&mut self, base: &str) -> String {
        if self.taken.contains(base) {
            return self.gensym(base);
        }
        self.taken.insert(base.to_string());
        base.to_string()
    }

    /// A member or field name spelled after a dot.
    pub fn safe_name(&self, dot_name: &str) -> String {
        avoid_keywords(sanitize_identifier(dot_name), LUA_KEYWORDS)
    }

    /// Binds `name` to an identifier chosen elsewhere.
    pub fn alias(&mut self, name: &ResolvedName, ident: &str) {
        self.taken.insert(ident.to_string());
        self.assigned.insert(name.clone(), ident.to_string());
    }

    /// Records that `local` comes from `path` and should only be imported if
    /// translated code mentions it.
    pub fn import_as_needed(&mut self, local: &ResolvedName, require_path: &str, external: &str) {
        self.deferred
            .insert(local.clone(), (require_path.to_string(), external.to_string()));
    }

    /// Deferred imports mentioned since the last call, in first-use order.
    pub fn take_deferred_imports(&mut self) -> Vec<DeferredImport> {
        let mut out = Vec::new();
        for name in std::mem::take(&mut self.materialized) {
            let Some((path, external)) = self.deferred.get(&name) else {
                continue;
            };
            let local = self.assigned.get(&name).cloned().unwrap_or_default();
            out.push(DeferredImport {
                local,
                path: path.clone(),
                external: external.clone(),
            });
        }
        out
    }

    pub fn is_taken(&self, ident: &str) -> bool {
        self.taken.contains(ident)
    }

    fn fresh(&mut self, base: &str, separator: &str) -> String {
        let base = sanitize_identifier(base);
        let base = if base.is_empty() { "anon".to_string() } else { base };
        let counters = if separator == "__" {
            &mut self.source_counters
        } else {
            &mut self.temp_counters
        };
        loop {
            let counter = counters.entry(base.clone()).or_insert(0);
            let candidate = format!("{base}{separator}{counter}");
            *counter += 1;
            if !self.taken.contains(&candidate) {
                return candidate;
            }
        }
    }
}

/// Label targeted by `break label`.
pub fn on_break(label: &str) -> String {
    format!("break_{}", sanitize_identifier(label))
}

/// Label targeted by `continue label`.
pub fn on_continue(label: &str) -> String {
    format!("continue_{}", sanitize_identifier(label))
}
