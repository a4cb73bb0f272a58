/// Argument resolution: command paths and parsed/remaining arguments.
pub mod args;
/// Command-line abstract syntax tree types.
pub mod ast;
/// AST builder: matches tokens against a command grammar.
pub mod builder;
/// Re-exports from the diagnostics crate.
pub mod diag;
/// JSON serialization helpers for the AST.
pub mod dump;
/// Whitespace tokenizer producing positioned tokens.
pub mod lexer;
/// Position queries: which node sits at a caret index.
pub mod query;
