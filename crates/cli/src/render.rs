//! Output rendering.
//!
//! Diagnostics are turned into ariadne [`Report`]s annotating the command
//! line itself. Everything else is printed as JSON, or as short
//! human-readable lines when stdout is a terminal.

use std::io::{self, IsTerminal};

use ariadne::{Color, Config, Fmt, IndexType, Label, Report, ReportKind, Source};
use clui_core::{Completion, Diagnostic, Severity};

/// Name shown for the command line in reports.
const SOURCE_NAME: &str = "<input>";

// ── Output format ───────────────────────────────────────────────────────

/// Output format for all commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Format {
    /// Coloured, source-annotated output (ariadne).
    Pretty,
    /// Machine-readable JSON.
    Json,
}

impl Format {
    /// Use the explicit choice, or pick by whether stdout is a TTY.
    pub(crate) fn resolve_or_detect(explicit: Option<&str>) -> Self {
        match explicit {
            Some("json") => Format::Json,
            Some("pretty") => Format::Pretty,
            _ => {
                if io::stdout().is_terminal() {
                    Format::Pretty
                } else {
                    Format::Json
                }
            }
        }
    }
}

// ── Severity mapping ────────────────────────────────────────────────────

fn report_kind(severity: &Severity) -> ReportKind<'static> {
    match severity {
        Severity::Error => ReportKind::Error,
        Severity::Info => ReportKind::Advice,
        _ => ReportKind::Warning,
    }
}

fn severity_color(severity: &Severity) -> Color {
    match severity {
        Severity::Error => Color::Red,
        Severity::Info => Color::Blue,
        _ => Color::White,
    }
}

// ── Diagnostics ─────────────────────────────────────────────────────────

/// Render diagnostics against the command line to stderr.
pub(crate) fn render_diagnostics_pretty(input: &str, diagnostics: &[Diagnostic]) {
    if diagnostics.is_empty() {
        return;
    }

    // Spans are byte offsets.
    let config = Config::default()
        .with_compact(false)
        .with_index_type(IndexType::Byte);
    let mut cache = (SOURCE_NAME, Source::from(input));

    for diag in diagnostics {
        let (start, end) = match &diag.span {
            Some(span) => {
                let start = span.start.min(input.len());
                (start, span.end.min(input.len()).max(start))
            }
            None => (input.len(), input.len()),
        };

        let mut builder = Report::build(report_kind(&diag.severity), (SOURCE_NAME, start..end))
            .with_code(diag.id.as_ref())
            .with_message(&diag.message)
            .with_config(config)
            .with_label(
                Label::new((SOURCE_NAME, start..end))
                    .with_message(label_message(diag))
                    .with_color(severity_color(&diag.severity)),
            );

        if let Some(explanation) = diag.explain() {
            builder = builder.with_help(explanation);
        }

        builder.finish().eprint(&mut cache).ok();
    }
}

/// Short label text: the structured context when present, else the message.
fn label_message(diag: &Diagnostic) -> String {
    if let Some(ctx) = &diag.context
        && !ctx.is_empty()
    {
        ctx.iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(", ")
    } else {
        diag.message.clone()
    }
}

/// Print a coloured summary line, e.g. `2 errors, 1 info`.
pub(crate) fn print_summary(diagnostics: &[Diagnostic]) {
    let (mut errors, mut infos) = (0usize, 0usize);
    for d in diagnostics {
        match d.severity {
            Severity::Error => errors += 1,
            _ => infos += 1,
        }
    }
    if errors + infos == 0 {
        return;
    }

    let mut parts = Vec::new();
    if errors > 0 {
        let s = if errors == 1 { "" } else { "s" };
        parts.push(format!("{}", format!("{errors} error{s}").fg(Color::Red)));
    }
    if infos > 0 {
        parts.push(format!("{}", format!("{infos} info").fg(Color::Blue)));
    }
    eprintln!("{}", parts.join(", "));
}

// ── Completion ──────────────────────────────────────────────────────────

/// Print one suggestion per line, with its kind and description.
pub(crate) fn render_completion_pretty(completion: &Completion) {
    for s in &completion.suggestions {
        let kind = format!("{:?}", s.kind).to_lowercase();
        match &s.description {
            Some(desc) => println!("{:<20} {:<8} {desc}", s.value, kind.fg(Color::Cyan)),
            None => println!("{:<20} {}", s.value, kind.fg(Color::Cyan)),
        }
    }
    if let Some(hint) = &completion.needs_resolution {
        eprintln!(
            "{}: subcommands of '{}' are not loaded (pass --resolve to load them)",
            "note".fg(Color::Blue),
            hint.path.join(" ")
        );
    }
}

// ── JSON ────────────────────────────────────────────────────────────────

/// Print a value as pretty JSON to stdout.
pub(crate) fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
