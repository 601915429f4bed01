//! Centralized limits and thresholds for the TmpL backends.
//!
//! # Categories
//!
//! - **Target Runtime Limits**: hard caps imposed by the languages we emit
//! - **Recursion Depths**: limits that keep the translators off the stack guard

// =============================================================================
// Target Runtime Limits
// =============================================================================

/// Number of locals in one Lua function or block at which we stop emitting
/// real `local` declarations.
///
/// Lua 5.1 refuses to load a chunk with more than 200 active locals in one
/// function (`LUAI_MAXVARS`). Generated code also needs headroom for the
/// temporaries the translator introduces after counting (try/recover result
/// triples, closure environment tables), so the ceiling sits well below the
/// runtime's own limit.
///
/// When a chunk reaches this count every local declared directly in it is
/// moved into fields of one table:
///
/// ```lua
/// -- 127 locals: left alone, hoisted into `local a, b, ...;`
/// -- 128 locals:
/// local env_t0 = {};
/// env_t0.a = 1;
/// env_t0.b = env_t0.a + 1;
/// ```
pub const MAX_ALLOWABLE_LOCALS: usize = 128;

// =============================================================================
// Recursion Depth Limits
// =============================================================================

/// Maximum nesting depth of IR statements and expressions the translators
/// will follow before reporting an internal-invariant defect.
///
/// IR trees are produced by a trusted frontend, so this is only reached by
/// pathological or corrupted input.
pub const MAX_TRANSLATION_DEPTH: u32 = 2_000;
