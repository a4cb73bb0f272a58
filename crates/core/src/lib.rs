//! clui core library.
//!
//! Matches a partially typed command line against a command grammar and
//! answers questions about it while the user types. The main entry points
//! are [`parse_str`] for building the AST, [`find`] and [`closest_previous`]
//! for caret queries, [`to_args`] for argument resolution, [`complete`] for
//! suggestions, and [`Session`] for driving all of it from a host that
//! resolves subcommands asynchronously.
//!
//! ```
//! use clui_core::{Grammar, parse_str, to_args};
//!
//! let grammar = Grammar::from_json_str(
//!     r#"{ "seed": { "args": { "count": { "type": "integer" } } } }"#,
//! ).unwrap();
//! let ast = parse_str("seed --count 3", &grammar);
//! let args = to_args(ast.command().unwrap());
//! assert!(args.exhausted);
//! ```

#![warn(missing_docs)]

/// Readiness diagnostics for a command line.
pub mod check;
/// Caret-driven completion.
pub mod complete;
/// Error types.
pub mod error;
/// Host session: text, caret, and subcommand resolution.
pub mod session;
/// Command-line syntax: tokenizer, AST, builder, and queries.
pub mod syntax;

// ── Convenience re-exports ──────────────────────────────────────────────────
// Flat imports for the most common entry points. The full module paths
// remain available for less common types.

// Builder
pub use syntax::builder::{ARG_PREFIX, build, parse_str};
pub use syntax::lexer::tokenize;

// AST
pub use syntax::ast::{
    ArgEntry, ArgFlagNode, ArgId, ArgKeyNode, ArgNode, ArgValueNode, Ast, CmdId, CommandNode,
    NodeKind, NodeRef, PendingNode, RemainderNode, Token,
};

// Queries
pub use syntax::args::{ArgsResult, RemainingArg, command_names, command_path, to_args};
pub use syntax::query::{closest_previous, find};

// Completion, readiness, session
pub use check::{check, is_ready};
pub use complete::{Completion, ResolveHint, Suggestion, SuggestionKind, complete};
pub use error::SessionError;
pub use session::{Invocation, ResolveRequest, Session};

// Diagnostics (re-exported from the diagnostics crate)
pub use syntax::diag::{Diagnostic, Severity, Span, codes};

// Grammar (re-exported from the grammar crate)
pub use clui_grammar::{
    Arg, ArgValue, Command, Commands, Grammar, GrammarError, Resolve, ResolveError, Resolver,
    Subcommands, ValueType,
};

// Serialization helpers
pub use syntax::dump::to_pretty_json;
