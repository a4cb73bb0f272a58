//! Lazy subcommands loaded from JSON files next to the grammar.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use clui_core::{Commands, Grammar, Resolve, ResolveError, Resolver};

/// Loads a subcommand set from a JSON file.
///
/// The file has the same shape as a grammar file. Lazy sources it declares
/// are bound to further `FileResolver`s relative to its own directory.
#[derive(Debug)]
pub(crate) struct FileResolver {
    path: PathBuf,
    source: String,
}

impl FileResolver {
    pub(crate) fn new(base: &Path, source: &str) -> Self {
        Self {
            path: base.join(source),
            source: source.to_string(),
        }
    }

    fn failed(&self, reason: impl ToString) -> ResolveError {
        ResolveError::Failed {
            origin: self.path.display().to_string(),
            reason: reason.to_string(),
        }
    }
}

#[async_trait]
impl Resolve for FileResolver {
    async fn resolve(&self, partial: Option<&str>) -> Result<Commands, ResolveError> {
        let json = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| self.failed(e))?;
        let mut grammar = Grammar::from_json_str(&json).map_err(|e| self.failed(e))?;
        bind_files(&mut grammar, self.path.parent().unwrap_or(Path::new(".")));

        let mut commands = grammar.into_commands();
        if let Some(partial) = partial {
            commands.retain(|name, _| name.starts_with(partial));
        }
        tracing::debug!(
            path = %self.path.display(),
            partial,
            loaded = commands.len(),
            "loaded subcommands from file"
        );
        Ok(commands)
    }

    fn source(&self) -> Option<&str> {
        Some(&self.source)
    }
}

/// Bind every unbound lazy source in `grammar` to a file under `base`.
pub(crate) fn bind_files(grammar: &mut Grammar, base: &Path) -> usize {
    grammar.bind_resolvers(|source| Some(Resolver::new(FileResolver::new(base, source))))
}
