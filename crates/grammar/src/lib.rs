//! Command grammar for clui.
//!
//! Defines the data structures the AST builder matches input against: a tree
//! of named commands, each declaring flag and key/value arguments and an
//! optional set of subcommands. A subcommand set is either known up front
//! ([`Subcommands::Eager`]) or fetched on demand through a [`Resolver`]
//! ([`Subcommands::Lazy`]).
//!
//! Grammars are usually loaded from JSON:
//!
//! ```
//! let grammar = clui_grammar::Grammar::from_json_str(r#"{
//!     "seed": { "args": { "count": { "type": "integer" } } },
//!     "deploy": { "commands": "targets.json" }
//! }"#).unwrap();
//! assert!(grammar.lookup(&["seed"]).is_some());
//! ```

#![warn(missing_docs)]

/// Lazy subcommand resolution.
pub mod resolve;
/// Argument value types and coercion.
pub mod value;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::path::Path;

pub use resolve::{Resolve, ResolveError, Resolver, StaticResolver};
pub use value::{ArgValue, Coercion, ValueType};

/// Ordered mapping from command name to command descriptor.
pub type Commands = IndexMap<String, Command>;

/// Ordered mapping from argument name to argument descriptor.
pub type Args = IndexMap<String, Arg>;

/// Errors that can occur when loading or updating a grammar.
#[derive(Debug, thiserror::Error)]
pub enum GrammarError {
    /// JSON deserialization failed.
    #[error("invalid grammar JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The grammar file could not be read.
    #[error("failed to read grammar: {0}")]
    Io(#[from] std::io::Error),

    /// A command path does not name a command in the grammar.
    #[error("unknown command path `{0}`")]
    UnknownPath(String),

    /// Resolved subcommands were offered to a command whose subcommands are not lazy.
    #[error("subcommands of `{0}` are not resolved lazily")]
    NotLazy(String),
}

/// The root of a command grammar.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Grammar {
    commands: Commands,
}

/// Descriptor for a single command.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Command {
    /// One-line description shown next to completions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Declared arguments, in declaration order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Args>,
    /// Nested subcommands.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commands: Option<Subcommands>,
}

/// Descriptor for a single argument.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Arg {
    /// A flag is present or absent by name alone; otherwise the argument takes a value.
    #[serde(default)]
    pub flag: bool,
    /// Coercion applied to the raw value text.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub value_type: Option<ValueType>,
    /// One-line description shown next to completions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// The subcommands of a command.
#[derive(Debug, Clone)]
pub enum Subcommands {
    /// Known when the grammar is built.
    Eager(Commands),
    /// Fetched on demand.
    Lazy(LazyCommands),
}

/// A subcommand set that is discovered through a [`Resolver`].
#[derive(Debug, Clone)]
pub struct LazyCommands {
    /// Where to fetch subcommands from.
    pub resolver: Resolver,
    /// Subcommands already fetched and merged in.
    pub loaded: Commands,
}

// ─── Descriptor helpers ─────────────────────────────────────────────────────

impl Command {
    /// Look up a declared argument by name.
    pub fn arg(&self, name: &str) -> Option<&Arg> {
        self.args.as_ref().and_then(|a| a.get(name))
    }

    /// Look up a subcommand that is available without resolution.
    pub fn subcommand(&self, name: &str) -> Option<&Command> {
        self.commands.as_ref().and_then(|s| s.get(name))
    }

    fn subcommand_mut(&mut self, name: &str) -> Option<&mut Command> {
        match self.commands.as_mut()? {
            Subcommands::Eager(map) => map.get_mut(name),
            Subcommands::Lazy(lazy) => lazy.loaded.get_mut(name),
        }
    }
}

impl Arg {
    /// A boolean flag.
    pub fn flag() -> Self {
        Self {
            flag: true,
            ..Self::default()
        }
    }

    /// A key/value argument with an optional value type.
    pub fn value(value_type: Option<ValueType>) -> Self {
        Self {
            flag: false,
            value_type,
            description: None,
        }
    }

    /// Coerce a raw value according to the declared type, keeping the raw
    /// string when no type is declared.
    pub fn coerce(&self, raw: &str) -> ArgValue {
        match &self.value_type {
            Some(t) => t.coerce(raw),
            None => ArgValue::String(raw.to_string()),
        }
    }
}

impl Subcommands {
    /// A lazy set with nothing loaded yet.
    pub fn lazy(resolver: Resolver) -> Self {
        Subcommands::Lazy(LazyCommands {
            resolver,
            loaded: Commands::new(),
        })
    }

    /// Look up a subcommand that is available without resolution.
    pub fn get(&self, name: &str) -> Option<&Command> {
        self.available().get(name)
    }

    /// The subcommands available without resolution.
    pub fn available(&self) -> &Commands {
        match self {
            Subcommands::Eager(map) => map,
            Subcommands::Lazy(lazy) => &lazy.loaded,
        }
    }

    /// The resolver, for a lazy set.
    pub fn resolver(&self) -> Option<&Resolver> {
        match self {
            Subcommands::Eager(_) => None,
            Subcommands::Lazy(lazy) => Some(&lazy.resolver),
        }
    }
}

// Grammar files write an eager set as a JSON object and a lazy set as the
// name of its source.
impl<'de> Deserialize<'de> for Subcommands {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Source(String),
            Commands(Commands),
        }
        Ok(match Repr::deserialize(deserializer)? {
            Repr::Source(source) => Subcommands::lazy(Resolver::unbound(source)),
            Repr::Commands(map) => Subcommands::Eager(map),
        })
    }
}

impl Serialize for Subcommands {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Subcommands::Eager(map) => map.serialize(serializer),
            Subcommands::Lazy(lazy) => match lazy.resolver.source() {
                Some(source) => serializer.serialize_str(source),
                None => serializer.serialize_none(),
            },
        }
    }
}

// ─── Grammar ────────────────────────────────────────────────────────────────

impl Grammar {
    /// Create a grammar from its top-level commands.
    pub fn new(commands: Commands) -> Self {
        Self { commands }
    }

    /// Parse a grammar from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, GrammarError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a grammar file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GrammarError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// The top-level commands.
    pub fn commands(&self) -> &Commands {
        &self.commands
    }

    /// Consume the grammar, returning its top-level commands.
    pub fn into_commands(self) -> Commands {
        self.commands
    }

    /// Look up a command by the names leading to it from the root.
    ///
    /// Lazy sets are searched through the subcommands already loaded.
    pub fn lookup<S: AsRef<str>>(&self, path: &[S]) -> Option<&Command> {
        let (first, rest) = path.split_first()?;
        let mut cmd = self.commands.get(first.as_ref())?;
        for name in rest {
            cmd = cmd.subcommand(name.as_ref())?;
        }
        Some(cmd)
    }

    fn lookup_mut<S: AsRef<str>>(&mut self, path: &[S]) -> Option<&mut Command> {
        let (first, rest) = path.split_first()?;
        let mut cmd = self.commands.get_mut(first.as_ref())?;
        for name in rest {
            cmd = cmd.subcommand_mut(name.as_ref())?;
        }
        Some(cmd)
    }

    /// Merge resolved subcommands into the lazy set at `path`.
    ///
    /// Entries with the same name are replaced; other loaded entries are kept.
    /// The lazy set keeps its resolver so later partials can be fetched too.
    /// Returns the number of subcommands now loaded at `path`.
    pub fn merge_resolved<S: AsRef<str>>(
        &mut self,
        path: &[S],
        resolved: Commands,
    ) -> Result<usize, GrammarError> {
        let joined = join_path(path);
        let cmd = self
            .lookup_mut(path)
            .ok_or_else(|| GrammarError::UnknownPath(joined.clone()))?;
        match cmd.commands.as_mut() {
            Some(Subcommands::Lazy(lazy)) => {
                let added = resolved.len();
                lazy.loaded.extend(resolved);
                tracing::debug!(
                    path = %joined,
                    added,
                    loaded = lazy.loaded.len(),
                    "merged resolved subcommands"
                );
                Ok(lazy.loaded.len())
            }
            _ => Err(GrammarError::NotLazy(joined)),
        }
    }

    /// Replace unbound lazy sources with real resolvers.
    ///
    /// `bind` receives each unbound source name and returns the resolver to
    /// use, or `None` to leave it unbound. Returns how many sources were bound.
    pub fn bind_resolvers(&mut self, mut bind: impl FnMut(&str) -> Option<Resolver>) -> usize {
        fn walk(commands: &mut Commands, bind: &mut dyn FnMut(&str) -> Option<Resolver>) -> usize {
            let mut bound = 0;
            for cmd in commands.values_mut() {
                match cmd.commands.as_mut() {
                    Some(Subcommands::Eager(map)) => bound += walk(map, bind),
                    Some(Subcommands::Lazy(lazy)) => {
                        if !lazy.resolver.is_bound()
                            && let Some(source) = lazy.resolver.source()
                            && let Some(resolver) = bind(source)
                        {
                            lazy.resolver = resolver;
                            bound += 1;
                        }
                        bound += walk(&mut lazy.loaded, bind);
                    }
                    None => {}
                }
            }
            bound
        }
        walk(&mut self.commands, &mut bind)
    }
}

fn join_path<S: AsRef<str>>(path: &[S]) -> String {
    path.iter()
        .map(|s| s.as_ref())
        .collect::<Vec<_>>()
        .join(" ")
}
