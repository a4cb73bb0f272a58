mod render;
mod resolver;

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use clui_core::{
    Diagnostic, Grammar, NodeKind, NodeRef, Session, Severity, Token, closest_previous, codes,
    command_names, find, to_args,
};
use serde::Serialize;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::render::{
    Format, print_json, print_summary, render_completion_pretty, render_diagnostics_pretty,
};

// ── CLI definition ──────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "clui",
    version,
    about = "Parse, query, and complete command lines against a clui grammar"
)]
struct Cli {
    /// Output mode: "pretty" for terminal output, "json" for machine-readable
    /// JSON. Defaults to "pretty" when stdout is a TTY, "json" otherwise.
    #[arg(long, global = true, value_parser = ["pretty", "json"])]
    output: Option<String>,

    /// Grammar file (JSON). Lazy subcommand sources are resolved relative to
    /// its directory.
    #[arg(long, global = true, env = "CLUI_GRAMMAR")]
    grammar: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Args, Debug)]
struct Input {
    /// The command line text.
    text: String,

    /// Load lazy subcommands the text needs before answering.
    #[arg(long)]
    resolve: bool,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Print the AST of a command line.
    Parse {
        #[command(flatten)]
        input: Input,
    },

    /// Show the node at a caret position.
    Find {
        #[command(flatten)]
        input: Input,
        /// Byte offset of the caret.
        #[arg(long)]
        index: usize,
        /// Look for the nearest node before the caret instead.
        #[arg(long)]
        previous: bool,
    },

    /// Show the command path and the parsed and remaining arguments.
    Args {
        #[command(flatten)]
        input: Input,
    },

    /// List completions at a caret position.
    Complete {
        #[command(flatten)]
        input: Input,
        /// Byte offset of the caret (defaults to the end of the text).
        #[arg(long)]
        index: Option<usize>,
    },

    /// Report what keeps a command line from being run.
    Check {
        #[command(flatten)]
        input: Input,
    },

    /// Explain a diagnostic ID (e.g. CLUI2001).
    Explain { id: String },
}

// ── Main ────────────────────────────────────────────────────────────────

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let format = Format::resolve_or_detect(cli.output.as_deref());
    let grammar = cli.grammar.as_deref();

    match cli.cmd {
        Cmd::Parse { input } => cmd_parse(&open(grammar, &input, None).await?, format)?,
        Cmd::Find {
            input,
            index,
            previous,
        } => cmd_find(&open(grammar, &input, Some(index)).await?, previous, format)?,
        Cmd::Args { input } => cmd_args(&open(grammar, &input, None).await?, format)?,
        Cmd::Complete { input, index } => {
            cmd_complete(&open(grammar, &input, index).await?, format)?;
        }
        Cmd::Check { input } => cmd_check(&open(grammar, &input, None).await?, format)?,
        Cmd::Explain { id } => cmd_explain(&id, format)?,
    }

    Ok(())
}

/// Load the grammar and set up a session on the input text.
async fn open(grammar: Option<&Path>, input: &Input, index: Option<usize>) -> Result<Session> {
    let path = grammar.context("no grammar given; pass --grammar or set CLUI_GRAMMAR")?;
    let mut grammar = Grammar::load(path)
        .with_context(|| format!("failed to load grammar '{}'", path.display()))?;
    let bound = resolver::bind_files(&mut grammar, path.parent().unwrap_or(Path::new(".")));
    tracing::debug!(path = %path.display(), lazy_sources = bound, "loaded grammar");

    let mut session = Session::new(grammar);
    session.update(input.text.as_str(), index.unwrap_or(input.text.len()));

    if input.resolve {
        while session
            .resolve_pending()
            .await
            .context("failed to resolve subcommands")?
        {}
    }
    Ok(session)
}

// ── Commands ────────────────────────────────────────────────────────────

fn cmd_parse(session: &Session, format: Format) -> Result<()> {
    let ast = session.ast();
    let diagnostics = clui_core::check(&ast);

    match format {
        Format::Json => {
            let out = serde_json::json!({
                "ast": clui_core::syntax::dump::to_value(&ast),
                "diagnostics": diagnostics,
            });
            print_json(&out)?;
        }
        Format::Pretty => {
            println!("{}", clui_core::to_pretty_json(&ast));
            render_diagnostics_pretty(session.value(), &diagnostics);
            print_summary(&diagnostics);
        }
    }
    Ok(())
}

/// A node as reported by `find`.
#[derive(Serialize)]
struct FoundNode<'a> {
    kind: NodeKind,
    token: &'a Token,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

fn cmd_find(session: &Session, previous: bool, format: Format) -> Result<()> {
    let ast = session.ast();
    let node = if previous {
        closest_previous(&ast, session.index())
    } else {
        find(&ast, session.index())
    };
    let found = node.and_then(|n| {
        let name = match n {
            NodeRef::Command(_, cmd) => Some(cmd.name()),
            NodeRef::ArgFlag(flag) => Some(flag.name.as_str()),
            NodeRef::ArgKey(key) => Some(key.name.as_str()),
            _ => None,
        };
        Some(FoundNode {
            kind: n.kind(),
            token: n.token()?,
            name,
        })
    });

    match format {
        Format::Json => print_json(&found)?,
        Format::Pretty => match found {
            Some(n) => println!(
                "{} {}..{} {:?}",
                n.kind, n.token.start, n.token.end, n.token.value
            ),
            None => println!("no node at {}", session.index()),
        },
    }
    Ok(())
}

fn cmd_args(session: &Session, format: Format) -> Result<()> {
    let ast = session.ast();
    let innermost = ast.innermost();
    let path = innermost.map(|id| command_names(&ast, id)).unwrap_or_default();
    let args = innermost.map(|id| to_args(ast.node(id)));
    let ready = clui_core::is_ready(&ast);

    match format {
        Format::Json => {
            let out = serde_json::json!({
                "path": path,
                "args": args,
                "ready": ready,
            });
            print_json(&out)?;
        }
        Format::Pretty => {
            let Some(args) = args else {
                println!("no command");
                return Ok(());
            };
            println!("command: {}", path.join(" "));
            for (name, value) in args.parsed.iter().flatten() {
                println!("  --{name} = {value}");
            }
            for remaining in args.remaining.iter().flatten() {
                println!("  --{} (missing)", remaining.name);
            }
            println!("ready: {ready}");
        }
    }
    Ok(())
}

fn cmd_complete(session: &Session, format: Format) -> Result<()> {
    let completion = session.completion();
    match format {
        Format::Json => print_json(&completion)?,
        Format::Pretty => render_completion_pretty(&completion),
    }
    Ok(())
}

fn cmd_check(session: &Session, format: Format) -> Result<()> {
    let diagnostics = session.diagnostics();
    let ready = clui_core::is_ready(&session.ast());

    match format {
        Format::Json => {
            let out = serde_json::json!({
                "ready": ready,
                "diagnostics": diagnostics,
            });
            print_json(&out)?;
        }
        Format::Pretty => {
            render_diagnostics_pretty(session.value(), &diagnostics);
            print_summary(&diagnostics);
            if ready {
                eprintln!("ready");
            }
        }
    }

    exit_on_errors(&diagnostics);
    Ok(())
}

fn cmd_explain(id: &str, format: Format) -> Result<()> {
    let text = clui_diagnostics::explain(id);
    match format {
        Format::Json => {
            let out = serde_json::json!({
                "id": id,
                "explanation": text,
            });
            print_json(&out)?;
        }
        Format::Pretty => {
            use ariadne::Fmt;
            match text {
                Some(text) => println!("{}: {}", id.fg(ariadne::Color::Cyan), text),
                None => {
                    println!("{id}: (no explanation available)");
                    println!("known codes: {}", known_codes().join(", "));
                }
            }
        }
    }
    Ok(())
}

// ── Helpers ─────────────────────────────────────────────────────────────

fn known_codes() -> Vec<&'static str> {
    codes::EXPLANATIONS.iter().map(|(code, _)| *code).collect()
}

/// Exit with code 1 if any diagnostic is an error.
fn exit_on_errors(diagnostics: &[Diagnostic]) {
    if diagnostics
        .iter()
        .any(|d| matches!(d.severity, Severity::Error))
    {
        process::exit(1);
    }
}
