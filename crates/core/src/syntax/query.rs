use std::collections::VecDeque;

use super::ast::{ArgEntry, Ast, NodeRef};

/// Find the node whose token span contains `index` (`start <= index < end`).
///
/// The search is breadth-first: the top-level command, remainder and
/// pending node first, then each command's arguments followed by its nested
/// command. `ARG` nodes have no span of their own and are never returned;
/// their key and value are searched instead. Spans never overlap, so the
/// visiting order only matters for zero-width tokens and hand-built token
/// streams with shared boundaries: the first node visited wins.
pub fn find<'a, 'g>(ast: &'a Ast<'g>, index: usize) -> Option<NodeRef<'a, 'g>> {
    let mut queue: VecDeque<NodeRef<'a, 'g>> = VecDeque::new();
    if let Some(root) = ast.root() {
        queue.push_back(NodeRef::Command(root, ast.node(root)));
    }
    if let Some(rem) = &ast.remainder {
        queue.push_back(NodeRef::Remainder(rem));
    }
    if let Some(pending) = &ast.pending {
        queue.push_back(NodeRef::Pending(pending));
    }

    while let Some(node) = queue.pop_front() {
        let Some(token) = node.token() else {
            unreachable!("{} nodes are expanded, never queued", node.kind());
        };
        if token.contains(index) {
            return Some(node);
        }

        match node {
            NodeRef::Command(_, cmd) => {
                for entry in &cmd.args {
                    match entry {
                        ArgEntry::Flag(flag) => queue.push_back(NodeRef::ArgFlag(flag)),
                        ArgEntry::Pair(arg) => {
                            queue.push_back(NodeRef::ArgKey(&arg.key));
                            if let Some(value) = &arg.value {
                                queue.push_back(NodeRef::ArgValue(value));
                            }
                        }
                    }
                }
                if let Some(child) = cmd.command {
                    queue.push_back(NodeRef::Command(child, ast.node(child)));
                }
            }
            NodeRef::Arg(_) => unreachable!("ARG nodes are expanded, never queued"),
            NodeRef::ArgFlag(_)
            | NodeRef::ArgKey(_)
            | NodeRef::ArgValue(_)
            | NodeRef::Remainder(_)
            | NodeRef::Pending(_) => {}
        }
    }

    None
}

/// Find the nearest node strictly before `index`.
///
/// Scans `index - 1, index - 2, ..., 0` and returns the first hit of
/// [`find`]. Useful when the caret sits in whitespace right after what was
/// last typed.
pub fn closest_previous<'a, 'g>(ast: &'a Ast<'g>, index: usize) -> Option<NodeRef<'a, 'g>> {
    (0..index).rev().find_map(|i| find(ast, i))
}
