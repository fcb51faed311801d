//! Global Constants
//!
//! Centralized limits for extraction and rendering.
//! All magic numbers should be defined here with documentation.

/// Structural (Python) extraction constants
pub mod python {
    /// Maximum same-file call names recorded per function
    pub const MAX_CALLS_PER_FUNCTION: usize = 12;

    /// Longest literal kept for a lightweight module global
    pub const MAX_GLOBAL_VALUE_LEN: usize = 120;
}

/// Lexical scanner constants
pub mod scanner {
    /// Lines above a declaration searched for annotations
    pub const ANNOTATION_LOOKBACK: usize = 6;

    /// Annotations kept before collapsing the rest into `@...`
    pub const MAX_ANNOTATIONS: usize = 4;

    /// Unique call hints kept per innermost scope
    pub const CALL_HINTS_PER_SCOPE: usize = 8;

    /// Call hints kept per file
    pub const CALL_HINTS_PER_FILE: usize = 40;

    /// Indentation at which an unscoped Kotlin `fun` counts as local
    pub const LOCAL_FUN_INDENT: usize = 4;

    /// Longest guard condition kept in a UI guard name
    pub const MAX_GUARD_LEN: usize = 60;
}

/// Lite language sniffing constants
pub mod sniff {
    /// Leading lines inspected for header hints
    pub const HEAD_LINES: usize = 120;

    /// Score gap under which the tie-break rules apply
    pub const TIE_MARGIN: u32 = 2;
}

/// TODO marker constants
pub mod warnings {
    /// Default number of markers reported
    pub const DEFAULT_LIMIT: usize = 12;

    /// Marker text is cut to this many characters plus `...`
    pub const MAX_TEXT_LEN: usize = 160;
}

/// Map rendering constants
pub mod render {
    /// Default declaration cap before the overflow line
    pub const DEFAULT_MAX_DECLARATIONS: usize = 400;

    /// Indentation per nesting level
    pub const INDENT: &str = "    ";

    pub const WARNINGS_HEADING: &str = "## Warnings (TODO/FIXME/HACK/TEMP)";

    /// Python entry points lifted to the top when entry-first ordering is on
    pub const ENTRY_POINT_NAMES: [&str; 1] = ["main"];
    pub const ENTRY_POINT_PREFIXES: [&str; 3] = ["run_", "entry_", "cli_"];

    pub const RULES: [&str; 2] = [
        "Rule: This is a structure map. Do NOT rewrite code.",
        "Rule: Ask for a specific function/class block when needed.",
    ];
}
