//! Lazy subcommand resolution.
//!
//! A command may declare that its subcommands are only known after an
//! asynchronous lookup (a server round-trip, a directory listing, ...). The
//! builder never awaits such a lookup itself: it emits a pending node carrying
//! a [`Resolver`], and the host decides when to call it and merges the result
//! back into the grammar before the next parse.

use async_trait::async_trait;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::Commands;

/// Errors returned by a [`Resolve`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// The grammar declared a lazy source but the host never bound a resolver to it.
    #[error("no resolver bound for lazy subcommands `{0}`")]
    Unbound(String),

    /// The resolver ran but could not produce subcommands.
    #[error("resolving subcommands from `{origin}` failed: {reason}")]
    Failed {
        /// Where the resolver was loading from.
        origin: String,
        /// A human-readable explanation of the failure.
        reason: String,
    },
}

/// An asynchronous source of subcommands.
#[async_trait]
pub trait Resolve: Send + Sync {
    /// Fetch the subcommands, optionally narrowed by what the user has typed so far.
    async fn resolve(&self, partial: Option<&str>) -> Result<Commands, ResolveError>;

    /// Where this resolver loads from, if it has a name (a file, an endpoint).
    fn source(&self) -> Option<&str> {
        None
    }

    /// Whether this resolver can produce results at all.
    fn is_bound(&self) -> bool {
        true
    }
}

/// Shared handle to a [`Resolve`] implementation.
#[derive(Clone)]
pub struct Resolver(Arc<dyn Resolve>);

impl Resolver {
    /// Wrap a resolver.
    pub fn new(resolve: impl Resolve + 'static) -> Self {
        Self(Arc::new(resolve))
    }

    /// Build a resolver from an async closure.
    pub fn from_fn<F, Fut>(f: F) -> Self
    where
        F: Fn(Option<String>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Commands, ResolveError>> + Send + 'static,
    {
        Self::new(FnResolver(f))
    }

    /// A placeholder for a lazy source declared in a grammar file.
    ///
    /// Resolving it fails with [`ResolveError::Unbound`] until the host
    /// replaces it via [`crate::Grammar::bind_resolvers`].
    pub fn unbound(source: impl Into<String>) -> Self {
        Self::new(Unbound(source.into()))
    }

    /// Run the resolver.
    pub async fn resolve(&self, partial: Option<&str>) -> Result<Commands, ResolveError> {
        self.0.resolve(partial).await
    }

    /// See [`Resolve::source`].
    pub fn source(&self) -> Option<&str> {
        self.0.source()
    }

    /// See [`Resolve::is_bound`].
    pub fn is_bound(&self) -> bool {
        self.0.is_bound()
    }

    /// Whether two handles point at the same resolver.
    pub fn ptr_eq(&self, other: &Resolver) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("source", &self.source())
            .field("bound", &self.is_bound())
            .finish()
    }
}

struct FnResolver<F>(F);

#[async_trait]
impl<F, Fut> Resolve for FnResolver<F>
where
    F: Fn(Option<String>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Commands, ResolveError>> + Send,
{
    async fn resolve(&self, partial: Option<&str>) -> Result<Commands, ResolveError> {
        (self.0)(partial.map(str::to_string)).await
    }
}

struct Unbound(String);

#[async_trait]
impl Resolve for Unbound {
    async fn resolve(&self, _partial: Option<&str>) -> Result<Commands, ResolveError> {
        Err(ResolveError::Unbound(self.0.clone()))
    }

    fn source(&self) -> Option<&str> {
        Some(&self.0)
    }

    fn is_bound(&self) -> bool {
        false
    }
}

/// Resolves from a fixed set of commands, keeping the names that start with
/// the partial text.
#[derive(Debug, Clone)]
pub struct StaticResolver {
    commands: Commands,
}

impl StaticResolver {
    /// Serve `commands`.
    pub fn new(commands: Commands) -> Self {
        Self { commands }
    }
}

#[async_trait]
impl Resolve for StaticResolver {
    async fn resolve(&self, partial: Option<&str>) -> Result<Commands, ResolveError> {
        let prefix = partial.unwrap_or("");
        Ok(self
            .commands
            .iter()
            .filter(|(name, _)| name.starts_with(prefix))
            .map(|(name, cmd)| (name.clone(), cmd.clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Command;

    fn commands(names: &[&str]) -> Commands {
        names
            .iter()
            .map(|n| (n.to_string(), Command::default()))
            .collect()
    }

    #[tokio::test]
    async fn static_resolver_filters_by_prefix() {
        let r = Resolver::new(StaticResolver::new(commands(&["staging", "stable", "prod"])));
        let got = r.resolve(Some("st")).await.unwrap();
        assert_eq!(got.keys().collect::<Vec<_>>(), ["staging", "stable"]);
        let all = r.resolve(None).await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn unbound_resolver_fails() {
        let r = Resolver::unbound("targets.json");
        assert!(!r.is_bound());
        assert_eq!(r.source(), Some("targets.json"));
        assert_eq!(
            r.resolve(None).await.unwrap_err(),
            ResolveError::Unbound("targets.json".into())
        );
    }

    #[tokio::test]
    async fn closure_resolver_sees_partial() {
        let r = Resolver::from_fn(|partial| async move {
            let name = partial.unwrap_or_else(|| "none".to_string());
            Ok(commands(&[name.as_str()]))
        });
        let got = r.resolve(Some("abc")).await.unwrap();
        assert!(got.contains_key("abc"));
        assert!(r.is_bound());
        assert!(r.ptr_eq(&r.clone()));
    }
}
