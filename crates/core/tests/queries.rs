//! Tests for position queries: `find` and `closest_previous`.
//!
//! Fixed cases pin the breadth-first order and boundary behavior; property
//! tests check the containment guarantees over generated command lines.

mod common;

use clui_core::{
    ArgEntry, Ast, NodeKind, NodeRef, Span, closest_previous, find, parse_str, tokenize,
};
use common::{grammar, kind_at};
use proptest::prelude::*;

/// Every span held by a node of `ast`.
fn node_spans(ast: &Ast<'_>) -> Vec<Span> {
    let mut spans = Vec::new();
    for (_, cmd) in ast.commands() {
        spans.push(cmd.token.span());
        for entry in &cmd.args {
            match entry {
                ArgEntry::Flag(flag) => spans.push(flag.token.span()),
                ArgEntry::Pair(arg) => {
                    spans.push(arg.key.token.span());
                    if let Some(value) = &arg.value {
                        spans.push(value.token.span());
                    }
                }
            }
        }
    }
    if let Some(rem) = &ast.remainder {
        spans.push(rem.token.span());
    }
    if let Some(pending) = &ast.pending {
        spans.push(pending.token.span());
    }
    spans
}

// ─── Fixed cases ─────────────────────────────────────────────────────────────

#[test]
fn finds_every_kind_in_one_line() {
    let g = grammar();
    let ast = parse_str("deploy --name web st more", &g);
    assert_eq!(kind_at(&ast, 0), Some(NodeKind::Command));
    assert_eq!(kind_at(&ast, 5), Some(NodeKind::Command));
    assert_eq!(kind_at(&ast, 6), None);
    assert_eq!(kind_at(&ast, 7), Some(NodeKind::ArgKey));
    assert_eq!(kind_at(&ast, 14), Some(NodeKind::ArgValue));
    assert_eq!(kind_at(&ast, 18), Some(NodeKind::Pending));
    assert_eq!(kind_at(&ast, 21), Some(NodeKind::Remainder));
    assert_eq!(kind_at(&ast, 25), None);
}

#[test]
fn end_is_exclusive() {
    let g = grammar();
    let ast = parse_str("status", &g);
    assert_eq!(kind_at(&ast, 5), Some(NodeKind::Command));
    assert_eq!(kind_at(&ast, 6), None);
}

#[test]
fn remainder_covers_inner_whitespace() {
    let g = grammar();
    let ast = parse_str("status a   b", &g);
    assert_eq!(kind_at(&ast, 9), Some(NodeKind::Remainder));
}

#[test]
fn find_never_returns_arg_nodes() {
    let g = grammar();
    let input = "seed --count 3 --force";
    let ast = parse_str(input, &g);
    for i in 0..=input.len() {
        if let Some(node) = find(&ast, i) {
            assert_ne!(node.kind(), NodeKind::Arg);
        }
    }
}

#[test]
fn adjacent_tokens_split_at_boundary() {
    use clui_core::{Token, build};
    let g = grammar();
    // Zero-gap tokens from a host tokenizer: `fetch` ends where `--verbose` starts.
    let tokens = [Token::new(0, 5, "fetch"), Token::new(5, 14, "--verbose")];
    let ast = build(&tokens, &g);
    assert_eq!(kind_at(&ast, 4), Some(NodeKind::Command));
    assert_eq!(kind_at(&ast, 5), Some(NodeKind::ArgFlag));
}

#[test]
fn closest_previous_recovers_last_typed_node() {
    let g = grammar();
    let ast = parse_str("seed --count   ", &g);
    match closest_previous(&ast, 15) {
        Some(NodeRef::ArgKey(key)) => assert_eq!(key.name, "count"),
        other => panic!("expected the count key, got {other:?}"),
    }
    match closest_previous(&ast, 5) {
        Some(NodeRef::Command(_, cmd)) => assert_eq!(cmd.name(), "seed"),
        other => panic!("expected the seed command, got {other:?}"),
    }
    assert!(closest_previous(&ast, 0).is_none());
}

#[test]
fn closest_previous_on_empty_ast() {
    let g = grammar();
    let ast = parse_str("    ", &g);
    assert!(closest_previous(&ast, 4).is_none());
}

// ─── Properties ──────────────────────────────────────────────────────────────

fn arb_word() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("seed".to_string()),
        Just("fetch".to_string()),
        Just("remote".to_string()),
        Just("db".to_string()),
        Just("migrate".to_string()),
        Just("up".to_string()),
        Just("deploy".to_string()),
        Just("--count".to_string()),
        Just("--force".to_string()),
        Just("--verbose".to_string()),
        Just("--depth".to_string()),
        Just("--name".to_string()),
        Just("--steps".to_string()),
        "[a-z0-9]{1,6}",
        "--[a-z]{1,4}",
    ]
}

fn arb_line() -> impl Strategy<Value = String> {
    (
        "[ ]{0,2}",
        prop::collection::vec((arb_word(), "[ \t]{1,3}"), 0..8),
    )
        .prop_map(|(lead, words)| {
            let mut line = lead;
            for (word, gap) in words {
                line.push_str(&word);
                line.push_str(&gap);
            }
            line
        })
}

proptest! {
    /// Every index inside a token is covered by the node `find` returns.
    #[test]
    fn prop_find_covers_every_token(line in arb_line()) {
        let g = grammar();
        let ast = parse_str(&line, &g);
        for tok in tokenize(&line) {
            for i in tok.start..tok.end {
                let node = find(&ast, i);
                prop_assert!(node.is_some(), "nothing found at {} in {:?}", i, line);
                let span = node.and_then(|n| n.token()).map(|t| t.span());
                prop_assert!(span.is_some_and(|s| s.contains(i)));
            }
        }
    }

    /// `find` returns nothing exactly where no node span reaches.
    #[test]
    fn prop_find_none_outside_spans(line in arb_line()) {
        let g = grammar();
        let ast = parse_str(&line, &g);
        let spans = node_spans(&ast);
        for i in 0..=line.len() {
            let covered = spans.iter().any(|s| s.contains(i));
            prop_assert_eq!(find(&ast, i).is_some(), covered, "index {} in {:?}", i, line);
        }
    }

    /// `closest_previous` only ever looks backwards.
    #[test]
    fn prop_closest_previous_starts_before_index(line in arb_line()) {
        let g = grammar();
        let ast = parse_str(&line, &g);
        for i in 0..=line.len() {
            if let Some(node) = closest_previous(&ast, i) {
                let tok = node.token();
                prop_assert!(tok.is_some_and(|t| t.start < i), "index {} in {:?}", i, line);
            } else {
                prop_assert!(node_spans(&ast).iter().all(|s| s.start >= i || s.is_empty()));
            }
        }
    }

    /// Node spans never overlap and follow text order within a command.
    #[test]
    fn prop_spans_are_disjoint(line in arb_line()) {
        let g = grammar();
        let ast = parse_str(&line, &g);
        let mut spans = node_spans(&ast);
        spans.sort_by_key(|s| s.start);
        for pair in spans.windows(2) {
            prop_assert!(pair[0].end <= pair[1].start, "{:?} overlaps {:?}", pair[0], pair[1]);
        }
    }
}
