use clui_grammar::{Arg, Command, ResolveError, Resolver};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::diag::Span;

/// A positioned lexical token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
    /// The token text.
    pub value: String,
}

impl Token {
    /// Create a token covering `[start, end)`.
    ///
    /// Panics if `end < start`.
    pub fn new(start: usize, end: usize, value: impl Into<String>) -> Self {
        assert!(end >= start, "Token end ({end}) < start ({start})");
        Self {
            start,
            end,
            value: value.into(),
        }
    }

    /// The token's source span.
    pub fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }

    /// Whether `index` lies inside `[start, end)`.
    pub fn contains(&self, index: usize) -> bool {
        self.span().contains(index)
    }
}

/// Discriminant of every node in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeKind {
    /// A matched command or subcommand.
    Command,
    /// A key/value argument (key plus optional value).
    Arg,
    /// A boolean flag argument.
    ArgFlag,
    /// The key half of a key/value argument.
    ArgKey,
    /// The value half of a key/value argument.
    ArgValue,
    /// Trailing text that matched nothing.
    Remainder,
    /// Text waiting on lazily resolved subcommands.
    Pending,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NodeKind::Command => "COMMAND",
            NodeKind::Arg => "ARG",
            NodeKind::ArgFlag => "ARG_FLAG",
            NodeKind::ArgKey => "ARG_KEY",
            NodeKind::ArgValue => "ARG_VALUE",
            NodeKind::Remainder => "REMAINDER",
            NodeKind::Pending => "PENDING",
        };
        f.write_str(s)
    }
}

/// Index of a [`CommandNode`] in its [`Ast`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CmdId(pub(crate) usize);

impl CmdId {
    /// Position of the command in the chain, outermost first.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Address of an argument entry: the owning command and its position in `args`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ArgId {
    /// Owning command.
    pub command: CmdId,
    /// Position in the command's `args`.
    pub index: usize,
}

/// A matched command.
#[derive(Debug, Clone)]
pub struct CommandNode<'g> {
    /// The grammar descriptor this node matched.
    pub def: &'g Command,
    /// Span and text of the command name.
    pub token: Token,
    /// Enclosing command, if this is a subcommand.
    pub parent: Option<CmdId>,
    /// Nested subcommand, if one follows.
    pub command: Option<CmdId>,
    /// Arguments in the order they were typed.
    pub args: Vec<ArgEntry<'g>>,
}

impl CommandNode<'_> {
    /// The command name as typed.
    pub fn name(&self) -> &str {
        &self.token.value
    }
}

/// One argument under a command.
#[derive(Debug, Clone)]
pub enum ArgEntry<'g> {
    /// A boolean flag.
    Flag(ArgFlagNode<'g>),
    /// A key with an optional value.
    Pair(ArgNode<'g>),
}

impl<'g> ArgEntry<'g> {
    /// The argument name without its `--` prefix.
    pub fn name(&self) -> &str {
        match self {
            ArgEntry::Flag(flag) => &flag.name,
            ArgEntry::Pair(arg) => &arg.key.name,
        }
    }

    /// The grammar descriptor this argument matched.
    pub fn def(&self) -> &'g Arg {
        match self {
            ArgEntry::Flag(flag) => flag.def,
            ArgEntry::Pair(arg) => arg.def,
        }
    }
}

/// A boolean flag, e.g. `--verbose`.
#[derive(Debug, Clone)]
pub struct ArgFlagNode<'g> {
    /// The grammar descriptor.
    pub def: &'g Arg,
    /// Owning command.
    pub parent: CmdId,
    /// Span and text of the flag, including `--`.
    pub token: Token,
    /// Flag name without `--`.
    pub name: String,
}

/// A key/value argument, e.g. `--count 3`. Has no span of its own.
#[derive(Debug, Clone)]
pub struct ArgNode<'g> {
    /// The grammar descriptor.
    pub def: &'g Arg,
    /// Owning command.
    pub parent: CmdId,
    /// The key.
    pub key: ArgKeyNode,
    /// The value, absent while it has not been typed yet.
    pub value: Option<ArgValueNode>,
}

/// The key half of a key/value argument.
#[derive(Debug, Clone)]
pub struct ArgKeyNode {
    /// Owning argument.
    pub parent: ArgId,
    /// Span and text of the key, including `--`.
    pub token: Token,
    /// Argument name without `--`.
    pub name: String,
}

/// The value half of a key/value argument.
#[derive(Debug, Clone)]
pub struct ArgValueNode {
    /// Owning argument.
    pub parent: ArgId,
    /// Span and raw text of the value.
    pub token: Token,
}

/// Trailing text that matched no command, argument, or value.
#[derive(Debug, Clone)]
pub struct RemainderNode {
    /// The whole unmatched tail.
    pub token: Token,
    /// Innermost command active when matching stopped.
    pub cmd_ctx: Option<CmdId>,
    /// Key/value argument immediately preceding the unmatched text.
    pub arg_ctx: Option<ArgId>,
}

/// Text that has to be matched against subcommands not loaded yet.
#[derive(Debug, Clone)]
pub struct PendingNode {
    /// Names of the resolved commands leading to the lazy subcommand set.
    pub path: Vec<String>,
    /// The text being matched.
    pub token: Token,
    /// Where to load the subcommands from.
    pub resolver: Resolver,
}

impl PendingNode {
    /// Fetch the subcommands for [`PendingNode::path`].
    ///
    /// The builder never calls this; the host does, and merges the result
    /// into the grammar before reparsing.
    pub async fn resolve(
        &self,
        partial: Option<&str>,
    ) -> Result<clui_grammar::Commands, ResolveError> {
        self.resolver.resolve(partial).await
    }
}

/// A command line matched against a grammar.
///
/// Command nodes are stored in a flat arena in chain order (outermost
/// first); `parent` and `command` links are indices into it.
#[derive(Debug, Clone, Default)]
pub struct Ast<'g> {
    pub(crate) commands: Vec<CommandNode<'g>>,
    /// Unmatched trailing text.
    pub remainder: Option<RemainderNode>,
    /// Text waiting on subcommand resolution.
    pub pending: Option<PendingNode>,
}

impl<'g> Ast<'g> {
    /// The top-level command, if one matched.
    pub fn command(&self) -> Option<&CommandNode<'g>> {
        self.commands.first()
    }

    /// Id of the top-level command.
    pub fn root(&self) -> Option<CmdId> {
        (!self.commands.is_empty()).then_some(CmdId(0))
    }

    /// Id of the innermost (most deeply nested) command.
    pub fn innermost(&self) -> Option<CmdId> {
        self.commands.len().checked_sub(1).map(CmdId)
    }

    /// Look up a command node.
    ///
    /// Panics if `id` does not belong to this tree.
    pub fn node(&self, id: CmdId) -> &CommandNode<'g> {
        &self.commands[id.0]
    }

    /// Look up an argument entry.
    ///
    /// Panics if `id` does not belong to this tree.
    pub fn arg(&self, id: ArgId) -> &ArgEntry<'g> {
        &self.node(id.command).args[id.index]
    }

    /// All command nodes, outermost first.
    pub fn commands(&self) -> impl Iterator<Item = (CmdId, &CommandNode<'g>)> {
        self.commands.iter().enumerate().map(|(i, c)| (CmdId(i), c))
    }

    /// Whether nothing at all was matched or left over.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty() && self.remainder.is_none() && self.pending.is_none()
    }
}

/// A borrowed view of any node in an [`Ast`].
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a, 'g> {
    /// A command node and its id.
    Command(CmdId, &'a CommandNode<'g>),
    /// A key/value argument.
    Arg(&'a ArgNode<'g>),
    /// A flag argument.
    ArgFlag(&'a ArgFlagNode<'g>),
    /// An argument key.
    ArgKey(&'a ArgKeyNode),
    /// An argument value.
    ArgValue(&'a ArgValueNode),
    /// Unmatched text.
    Remainder(&'a RemainderNode),
    /// Text waiting on resolution.
    Pending(&'a PendingNode),
}

impl<'a> NodeRef<'a, '_> {
    /// The node's discriminant.
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeRef::Command(..) => NodeKind::Command,
            NodeRef::Arg(_) => NodeKind::Arg,
            NodeRef::ArgFlag(_) => NodeKind::ArgFlag,
            NodeRef::ArgKey(_) => NodeKind::ArgKey,
            NodeRef::ArgValue(_) => NodeKind::ArgValue,
            NodeRef::Remainder(_) => NodeKind::Remainder,
            NodeRef::Pending(_) => NodeKind::Pending,
        }
    }

    /// The node's token. `ARG` nodes have none; their key and value do.
    pub fn token(&self) -> Option<&'a Token> {
        match self {
            NodeRef::Command(_, cmd) => Some(&cmd.token),
            NodeRef::Arg(_) => None,
            NodeRef::ArgFlag(flag) => Some(&flag.token),
            NodeRef::ArgKey(key) => Some(&key.token),
            NodeRef::ArgValue(value) => Some(&value.token),
            NodeRef::Remainder(rem) => Some(&rem.token),
            NodeRef::Pending(pending) => Some(&pending.token),
        }
    }
}
