//! Host-side editing session.
//!
//! A [`Session`] owns the grammar together with the text being edited and
//! its caret. Every query rebuilds the AST from scratch; the only state that
//! survives between edits is the grammar (grown by resolved subcommands) and
//! the record of which resolutions were already fetched.
//!
//! Resolution is split so hosts can run it on their own executor:
//! [`Session::pending_request`] describes what to fetch, the host awaits
//! [`ResolveRequest::resolver`], and [`Session::apply`] merges the result,
//! dropping it if the text has moved on in the meantime.

use std::collections::HashSet;

use clui_grammar::{ArgValue, Commands, Grammar, GrammarError, Resolver};
use indexmap::IndexMap;
use serde::Serialize;

use crate::{
    check::{check, is_ready},
    complete::{Completion, complete},
    error::SessionError,
    syntax::{
        args::{command_names, to_args},
        ast::Ast,
        builder::parse_str,
        diag::Diagnostic,
    },
};

/// Subcommands the session wants loaded.
#[derive(Debug, Clone)]
pub struct ResolveRequest {
    /// Command chain owning the lazy subcommand set.
    pub path: Vec<String>,
    /// Text typed where the subcommand goes, if any.
    pub partial: Option<String>,
    /// Resolver of the lazy set.
    pub resolver: Resolver,
    /// Edit generation the request was made at.
    pub generation: u64,
}

impl ResolveRequest {
    /// Run the resolver for this request.
    pub async fn fetch(&self) -> Result<Commands, clui_grammar::ResolveError> {
        self.resolver.resolve(self.partial.as_deref()).await
    }
}

/// A ready-to-run command line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Invocation {
    /// Command names, outermost first.
    pub path: Vec<String>,
    /// Arguments of the innermost command, coerced.
    pub args: IndexMap<String, ArgValue>,
}

/// Text, caret and grammar of one command input.
#[derive(Debug)]
pub struct Session {
    grammar: Grammar,
    value: String,
    index: usize,
    generation: u64,
    fetched: HashSet<(Vec<String>, Option<String>)>,
}

impl Session {
    /// Start an empty session over `grammar`.
    pub fn new(grammar: Grammar) -> Self {
        Self {
            grammar,
            value: String::new(),
            index: 0,
            generation: 0,
            fetched: HashSet::new(),
        }
    }

    /// The grammar, including every subcommand merged so far.
    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// Current text.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Current caret offset.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Edit counter; bumped whenever the text changes.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Replace the text and caret.
    pub fn update(&mut self, value: impl Into<String>, index: usize) {
        let value = value.into();
        if value != self.value {
            self.generation += 1;
            self.value = value;
        }
        self.index = index.min(self.value.len());
    }

    /// Move the caret without editing.
    pub fn set_index(&mut self, index: usize) {
        self.index = index.min(self.value.len());
    }

    /// Build the AST of the current text.
    pub fn ast(&self) -> Ast<'_> {
        parse_str(&self.value, &self.grammar)
    }

    /// Completions at the caret.
    pub fn completion(&self) -> Completion {
        complete(&self.ast(), &self.grammar, self.index)
    }

    /// Readiness diagnostics for the current text.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        check(&self.ast())
    }

    /// What needs resolving before the current text can be fully matched.
    ///
    /// A pending node comes first; otherwise a lazy subcommand set right at
    /// the caret is reported so completion can list its entries. Targets
    /// already fetched are not requested again.
    pub fn pending_request(&self) -> Option<ResolveRequest> {
        let (path, partial) = self.target()?;
        if self.fetched.contains(&(path.clone(), partial.clone())) {
            tracing::trace!(?path, ?partial, "resolution already fetched");
            return None;
        }
        let resolver = self
            .grammar
            .lookup(&path)?
            .commands
            .as_ref()?
            .resolver()?
            .clone();
        Some(ResolveRequest {
            path,
            partial,
            resolver,
            generation: self.generation,
        })
    }

    /// Merge the result of `request` into the grammar.
    ///
    /// Results for an older generation are kept only if the text still waits
    /// on the same path and partial; otherwise they are dropped and `false`
    /// is returned.
    pub fn apply(
        &mut self,
        request: &ResolveRequest,
        resolved: Commands,
    ) -> Result<bool, GrammarError> {
        let key = (request.path.clone(), request.partial.clone());
        if request.generation != self.generation && self.target().as_ref() != Some(&key) {
            tracing::debug!(
                path = ?request.path,
                request_generation = request.generation,
                generation = self.generation,
                "dropping stale resolution"
            );
            return Ok(false);
        }
        self.grammar.merge_resolved(&request.path, resolved)?;
        self.fetched.insert(key);
        Ok(true)
    }

    /// Fetch and merge the current [`Session::pending_request`], if any.
    ///
    /// Returns whether the grammar changed.
    pub async fn resolve_pending(&mut self) -> Result<bool, SessionError> {
        let Some(request) = self.pending_request() else {
            return Ok(false);
        };
        tracing::debug!(path = ?request.path, partial = ?request.partial, "resolving subcommands");
        let resolved = request.fetch().await?;
        Ok(self.apply(&request, resolved)?)
    }

    /// The invocation described by the text, if it is ready to run.
    pub fn run(&self) -> Option<Invocation> {
        let ast = self.ast();
        if !is_ready(&ast) {
            return None;
        }
        let id = ast.innermost()?;
        Some(Invocation {
            path: command_names(&ast, id),
            args: to_args(ast.node(id)).parsed.unwrap_or_default(),
        })
    }

    fn target(&self) -> Option<(Vec<String>, Option<String>)> {
        let ast = self.ast();
        if let Some(pending) = &ast.pending {
            return Some((pending.path.clone(), Some(pending.token.value.clone())));
        }
        self.completion()
            .needs_resolution
            .map(|hint| (hint.path, hint.partial))
    }
}
