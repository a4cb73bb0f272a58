use clui_grammar::{GrammarError, ResolveError};

/// Errors raised while a [`crate::Session`] resolves subcommands.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The resolver failed.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// The resolved subcommands could not be merged into the grammar.
    #[error(transparent)]
    Grammar(#[from] GrammarError),
}
