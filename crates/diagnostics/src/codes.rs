//! Diagnostic ID constants.
//!
//! Use these instead of string literals to get compile-time typo detection
//! and IDE autocomplete. Every code listed here has an entry in
//! [`EXPLANATIONS`].

/// Text at the start of the input matched no top-level command.
pub const UNKNOWN_COMMAND: &str = "CLUI1001";
/// Text under a resolved command matched no argument or subcommand.
pub const UNMATCHED_TEXT: &str = "CLUI1002";
/// A declared argument of the active command has no value yet.
pub const MISSING_ARGUMENT: &str = "CLUI2001";
/// A key/value argument was typed without its value.
pub const MISSING_VALUE: &str = "CLUI2002";
/// Subcommands at this position must be resolved before matching continues.
pub const PENDING_RESOLUTION: &str = "CLUI3001";

/// Code → explanation table, in code order.
pub const EXPLANATIONS: &[(&str, &str)] = &[
    (
        UNKNOWN_COMMAND,
        "The first word does not name a command in the grammar. Keep typing or pick a suggested command.",
    ),
    (
        UNMATCHED_TEXT,
        "The text after a recognised command is neither a declared --argument nor a subcommand of it. \
         It is kept as free-form remainder text.",
    ),
    (
        MISSING_ARGUMENT,
        "The command declares this argument but it has not been supplied (or its value coerced to a \
         falsy value such as 0 or false).",
    ),
    (
        MISSING_VALUE,
        "A key/value argument name was typed but the value that follows it has not been typed yet.",
    ),
    (
        PENDING_RESOLUTION,
        "The subcommands of this command are loaded on demand. The host must resolve them before the \
         text at this position can be matched.",
    ),
];
