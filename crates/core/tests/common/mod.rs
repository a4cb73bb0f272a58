//! Shared test helpers for `clui_core` integration tests.

#![allow(unreachable_pub)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use clui_core::{Ast, Command, Commands, Grammar, NodeKind, ResolveError, Resolver, find};

/// Grammar used across the integration tests.
///
/// `deploy` has lazily resolved subcommands; everything else is eager.
pub const GRAMMAR: &str = r#"{
    "seed": {
        "description": "Seed the database",
        "args": {
            "count": { "type": "integer", "description": "Rows to insert" },
            "force": { "flag": true }
        }
    },
    "fetch": {
        "args": {
            "verbose": { "flag": true },
            "depth": { "type": "integer" }
        },
        "commands": { "remote": { "args": { "name": {} } } }
    },
    "db": {
        "commands": {
            "migrate": {
                "commands": {
                    "up": { "args": { "steps": { "type": "integer" } } },
                    "down": {}
                }
            }
        }
    },
    "deploy": {
        "args": { "name": {} },
        "commands": "targets.json"
    },
    "status": {}
}"#;

/// Parse [`GRAMMAR`].
pub fn grammar() -> Grammar {
    Grammar::from_json_str(GRAMMAR).expect("fixture grammar is valid")
}

/// A resolver returning `names` as empty commands, counting its calls.
#[allow(dead_code)]
pub fn counting_resolver(names: &'static [&'static str]) -> (Resolver, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let resolver = Resolver::from_fn(move |_partial| {
        counter.fetch_add(1, Ordering::SeqCst);
        async move { Ok::<_, ResolveError>(commands(names)) }
    });
    (resolver, calls)
}

/// [`grammar`] with `deploy`'s lazy source bound to [`counting_resolver`].
#[allow(dead_code)]
pub fn bound_grammar(names: &'static [&'static str]) -> (Grammar, Arc<AtomicUsize>) {
    let mut g = grammar();
    let (resolver, calls) = counting_resolver(names);
    let bound = g.bind_resolvers(|source| (source == "targets.json").then(|| resolver.clone()));
    assert_eq!(bound, 1);
    (g, calls)
}

/// Empty command descriptors for `names`.
#[allow(dead_code)]
pub fn commands(names: &[&str]) -> Commands {
    names
        .iter()
        .map(|n| ((*n).to_string(), Command::default()))
        .collect()
}

/// Kind of the node at `index`, if any.
#[allow(dead_code)]
pub fn kind_at(ast: &Ast<'_>, index: usize) -> Option<NodeKind> {
    find(ast, index).map(|n| n.kind())
}
