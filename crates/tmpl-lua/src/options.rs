//! Lua backend options.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a protected `try` body reaches the variables of its enclosing scope.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClosureMode {
    /// An inline `function() ... end` closing over upvalues.
    #[default]
    Basic,
    /// An inline function that reads captures from a table argument.
    InlineTable,
    /// A module-level function that reads captures from a table argument.
    GlobalTable,
}

impl ClosureMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ClosureMode::Basic => "basic",
            ClosureMode::InlineTable => "inline-table",
            ClosureMode::GlobalTable => "global-table",
        }
    }
}

impl fmt::Display for ClosureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClosureMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic" => Ok(ClosureMode::Basic),
            "inline-table" => Ok(ClosureMode::InlineTable),
            "global-table" => Ok(ClosureMode::GlobalTable),
            other => Err(format!(
                "unknown closure mode `{other}` (expected basic, inline-table or global-table)"
            )),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LuaOptions {
    pub closure_mode: ClosureMode,
    /// Wrap every function in `temper.wrap_func` so runtime errors name it.
    pub wrap_funcs: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_mode_round_trips_through_text() {
        for mode in [
            ClosureMode::Basic,
            ClosureMode::InlineTable,
            ClosureMode::GlobalTable,
        ] {
            assert_eq!(mode.as_str().parse::<ClosureMode>(), Ok(mode));
        }
        assert!("closures".parse::<ClosureMode>().is_err());
    }

    #[test]
    fn test_options_deserialize_camel_case() {
        let options: LuaOptions =
            serde_json::from_str(r#"{"closureMode": "global-table", "wrapFuncs": true}"#).unwrap();
        assert_eq!(options.closure_mode, ClosureMode::GlobalTable);
        assert!(options.wrap_funcs);
        let options: LuaOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, LuaOptions::default());
    }
}
