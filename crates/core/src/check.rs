//! Readiness check.
//!
//! Turns the state of an AST into diagnostics a host can show next to the
//! input. Beyond slot filling nothing is validated: argument values are
//! never rejected here.

use std::collections::BTreeMap;

use crate::syntax::{
    args::{command_names, to_args},
    ast::{ArgEntry, Ast},
    diag::{Diagnostic, codes},
};

/// Shorthand for building a `BTreeMap<String, String>` context from key-value pairs.
macro_rules! ctx {
    ($($k:expr => $v:expr),+ $(,)?) => {
        BTreeMap::from([$(($k.into(), $v.into())),+])
    };
}

/// Report everything that stops `ast` from being run.
///
/// Diagnostics come out in source order: argument problems of the innermost
/// command, then pending resolution, then unmatched text.
pub fn check(ast: &Ast<'_>) -> Vec<Diagnostic> {
    let mut issues = Vec::new();

    if let Some(id) = ast.innermost() {
        let cmd = ast.node(id);
        let path = command_names(ast, id).join(" ");
        let mut typed_without_value = Vec::new();

        for entry in &cmd.args {
            if let ArgEntry::Pair(arg) = entry
                && arg.value.is_none()
            {
                typed_without_value.push(arg.key.name.as_str());
                issues.push(
                    Diagnostic::error(
                        codes::MISSING_VALUE,
                        format!("--{} expects a value", arg.key.name),
                        Some(arg.key.token.span()),
                    )
                    .with_context(ctx!(
                        "command" => path.clone(),
                        "argument" => arg.key.name.clone()
                    )),
                );
            }
        }

        for remaining in to_args(cmd).remaining.unwrap_or_default() {
            if typed_without_value.contains(&remaining.name) {
                continue;
            }
            issues.push(
                Diagnostic::error(
                    codes::MISSING_ARGUMENT,
                    format!("{path}: missing --{}", remaining.name),
                    Some(cmd.token.span()),
                )
                .with_context(ctx!("command" => path.clone(), "argument" => remaining.name)),
            );
        }
    }

    if let Some(pending) = &ast.pending {
        issues.push(
            Diagnostic::info(
                codes::PENDING_RESOLUTION,
                format!(
                    "subcommands of '{}' are not loaded yet",
                    pending.path.join(" ")
                ),
                Some(pending.token.span()),
            )
            .with_context(ctx!(
                "path" => pending.path.join(" "),
                "partial" => pending.token.value.clone()
            )),
        );
    }

    if let Some(rem) = &ast.remainder {
        let diag = match rem.cmd_ctx {
            None => Diagnostic::error(
                codes::UNKNOWN_COMMAND,
                format!("unknown command '{}'", first_word(&rem.token.value)),
                Some(rem.token.span()),
            ),
            Some(id) => Diagnostic::error(
                codes::UNMATCHED_TEXT,
                format!("unexpected '{}'", rem.token.value),
                Some(rem.token.span()),
            )
            .with_context(ctx!("command" => command_names(ast, id).join(" "))),
        };
        issues.push(diag);
    }

    issues
}

/// Whether `ast` describes a complete, runnable invocation.
///
/// True iff a command matched, nothing is left unmatched or pending, and the
/// innermost command has every declared argument filled.
pub fn is_ready(ast: &Ast<'_>) -> bool {
    ast.remainder.is_none()
        && ast.pending.is_none()
        && ast
            .innermost()
            .is_some_and(|id| to_args(ast.node(id)).exhausted)
}

fn first_word(s: &str) -> &str {
    s.split_whitespace().next().unwrap_or(s)
}
