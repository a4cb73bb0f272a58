//! Caret-driven completion.
//!
//! Given an AST and a caret index, works out what the user is in the middle
//! of typing and which grammar names could continue it. The result also says
//! when the answer depends on subcommands that have not been resolved yet.

use clui_grammar::{Command, Commands, Grammar, Subcommands};
use serde::Serialize;

use crate::syntax::{
    args::command_names,
    ast::{ArgEntry, Ast, CmdId, CommandNode, NodeRef},
    builder::ARG_PREFIX,
    diag::Span,
    query::{closest_previous, find},
};

/// What a suggestion would insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    /// A command or subcommand name.
    Command,
    /// A `--flag`.
    Flag,
    /// A `--key` that takes a value.
    Arg,
}

/// A single completion candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    /// Text to insert (argument names include `--`).
    pub value: String,
    /// What kind of grammar element this is.
    pub kind: SuggestionKind,
    /// Description from the grammar, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Source range the suggestion replaces.
    pub replace: Span,
}

/// Subcommands that must be resolved before completion is complete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolveHint {
    /// Names of the command chain owning the lazy subcommand set.
    pub path: Vec<String>,
    /// What has been typed so far at the caret, if anything.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partial: Option<String>,
}

/// Completion result for a caret position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Completion {
    /// Candidates, commands before arguments, each in declaration order.
    pub suggestions: Vec<Suggestion>,
    /// Set when the candidates come from a lazy subcommand set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub needs_resolution: Option<ResolveHint>,
}

/// Compute completions at byte offset `index`.
///
/// If the caret touches the end of (or sits inside) a token, that token is
/// what is being typed and candidates are filtered by the text before the
/// caret. Otherwise the caret follows whitespace and candidates continue
/// whatever was typed last.
pub fn complete<'g>(ast: &Ast<'g>, grammar: &'g Grammar, index: usize) -> Completion {
    let typing = index.checked_sub(1).and_then(|i| find(ast, i));
    match typing {
        Some(node) => complete_typing(ast, grammar, node, index),
        None => complete_after(ast, grammar, index),
    }
}

fn complete_typing<'g>(
    ast: &Ast<'g>,
    grammar: &'g Grammar,
    node: NodeRef<'_, 'g>,
    index: usize,
) -> Completion {
    let Some(token) = node.token() else {
        return Completion::default();
    };
    let replace = token.span();
    let prefix = prefix_at(&token.value, token.start, index);

    match node {
        NodeRef::Command(_, cmd) => {
            let siblings = match cmd.parent {
                Some(parent) => ast
                    .node(parent)
                    .def
                    .commands
                    .as_ref()
                    .map(Subcommands::available),
                None => Some(grammar.commands()),
            };
            let mut c = Completion::default();
            if let Some(siblings) = siblings {
                push_commands(&mut c, siblings, prefix, replace);
            }
            c
        }
        NodeRef::ArgFlag(flag) => {
            args_completion(ast.node(flag.parent), Some(flag.name.as_str()), prefix, replace)
        }
        NodeRef::ArgKey(key) => {
            let owner = ast.node(key.parent.command);
            args_completion(owner, Some(key.name.as_str()), prefix, replace)
        }
        NodeRef::Arg(_) | NodeRef::ArgValue(_) => Completion::default(),
        NodeRef::Pending(pending) => {
            let mut c = Completion::default();
            if let Some(subs) = grammar
                .lookup(&pending.path)
                .and_then(|cmd| cmd.commands.as_ref())
            {
                push_commands(&mut c, subs.available(), prefix, replace);
            }
            c.needs_resolution = Some(ResolveHint {
                path: pending.path.clone(),
                partial: Some(prefix.to_string()),
            });
            c
        }
        NodeRef::Remainder(rem) => {
            // Only the first unmatched word is completed; anything after it
            // follows text that already failed to match.
            if prefix.contains(char::is_whitespace) {
                return Completion::default();
            }
            let word_end = rem
                .token
                .value
                .find(char::is_whitespace)
                .map_or(rem.token.end, |i| rem.token.start + i);
            let replace = Span::new(rem.token.start, word_end);
            match rem.cmd_ctx {
                Some(id) => continuations(ast, id, prefix, replace),
                None => {
                    let mut c = Completion::default();
                    push_commands(&mut c, grammar.commands(), prefix, replace);
                    c
                }
            }
        }
    }
}

fn complete_after<'g>(ast: &Ast<'g>, grammar: &'g Grammar, index: usize) -> Completion {
    let replace = Span::empty(index);
    let owner = match closest_previous(ast, index) {
        None => {
            let mut c = Completion::default();
            push_commands(&mut c, grammar.commands(), "", replace);
            return c;
        }
        Some(NodeRef::Command(id, _)) => id,
        Some(NodeRef::ArgFlag(flag)) => flag.parent,
        Some(NodeRef::ArgKey(key)) => {
            // The next token is this key's value.
            if matches!(ast.arg(key.parent), ArgEntry::Pair(arg) if arg.value.is_none()) {
                return Completion::default();
            }
            key.parent.command
        }
        Some(NodeRef::ArgValue(value)) => value.parent.command,
        Some(NodeRef::Pending(pending)) => {
            return Completion {
                suggestions: Vec::new(),
                needs_resolution: Some(ResolveHint {
                    path: pending.path.clone(),
                    partial: Some(pending.token.value.clone()),
                }),
            };
        }
        Some(NodeRef::Arg(_) | NodeRef::Remainder(_)) => return Completion::default(),
    };
    continuations(ast, owner, "", replace)
}

/// Subcommands and unused arguments that may follow command `id`.
fn continuations(ast: &Ast<'_>, id: CmdId, prefix: &str, replace: Span) -> Completion {
    let cmd = ast.node(id);
    let mut c = Completion::default();
    // Subcommand names never start with `--`.
    let subs = cmd
        .def
        .commands
        .as_ref()
        .filter(|_| !prefix.starts_with(ARG_PREFIX));
    if let Some(subs) = subs {
        push_commands(&mut c, subs.available(), prefix, replace);
        if subs.resolver().is_some() {
            c.needs_resolution = Some(ResolveHint {
                path: command_names(ast, id),
                partial: (!prefix.is_empty()).then(|| prefix.to_string()),
            });
        }
    }
    push_args(&mut c, cmd, None, prefix, replace);
    c
}

fn args_completion(
    cmd: &CommandNode<'_>,
    editing: Option<&str>,
    prefix: &str,
    replace: Span,
) -> Completion {
    let mut c = Completion::default();
    push_args(&mut c, cmd, editing, prefix, replace);
    c
}

fn push_commands(c: &mut Completion, commands: &Commands, prefix: &str, replace: Span) {
    c.suggestions.extend(
        commands
            .iter()
            .filter(|(name, _)| name.starts_with(prefix))
            .map(|(name, cmd): (&String, &Command)| Suggestion {
                value: name.clone(),
                kind: SuggestionKind::Command,
                description: cmd.description.clone(),
                replace,
            }),
    );
}

/// Declared arguments of `cmd` not already typed. `editing` names the
/// argument under the caret, which stays eligible.
fn push_args(
    c: &mut Completion,
    cmd: &CommandNode<'_>,
    editing: Option<&str>,
    prefix: &str,
    replace: Span,
) {
    let Some(declared) = cmd.def.args.as_ref() else {
        return;
    };
    for (name, arg) in declared {
        let used = cmd
            .args
            .iter()
            .any(|entry| entry.name() == name && editing != Some(name.as_str()));
        let value = format!("{ARG_PREFIX}{name}");
        if used || !value.starts_with(prefix) {
            continue;
        }
        c.suggestions.push(Suggestion {
            value,
            kind: if arg.flag {
                SuggestionKind::Flag
            } else {
                SuggestionKind::Arg
            },
            description: arg.description.clone(),
            replace,
        });
    }
}

/// Text of a token from its start up to the caret.
fn prefix_at(value: &str, start: usize, index: usize) -> &str {
    let mut end = index.saturating_sub(start).min(value.len());
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    &value[..end]
}
