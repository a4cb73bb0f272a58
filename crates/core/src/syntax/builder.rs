use super::{
    ast::{
        ArgEntry, ArgFlagNode, ArgId, ArgKeyNode, ArgNode, ArgValueNode, Ast, CmdId, CommandNode,
        PendingNode, RemainderNode, Token,
    },
    lexer::tokenize,
};
use clui_grammar::{Command, Grammar, Subcommands};

/// Prefix that marks a token as an argument name.
pub const ARG_PREFIX: &str = "--";

// ─── Public API ─────────────────────────────────────────────────────────────

/// Tokenize `input` and build its AST.
pub fn parse_str<'g>(input: &str, grammar: &'g Grammar) -> Ast<'g> {
    build(&tokenize(input), grammar)
}

/// Build an AST from positioned tokens.
///
/// Matching is greedy and never backtracks. Text that matches nothing ends
/// up in [`Ast::remainder`]; a lazy subcommand set that has not loaded the
/// typed name yields [`Ast::pending`] instead of failing.
pub fn build<'g>(tokens: &[Token], grammar: &'g Grammar) -> Ast<'g> {
    Builder::new(tokens, grammar).build()
}

// ─── Builder Implementation ─────────────────────────────────────────────────

/// Outcome of matching one token.
enum Step {
    /// Token consumed; move on to the next one.
    Next,
    /// Matching is over; the rest of the input has been dealt with.
    Done,
}

struct Builder<'t, 'g> {
    tokens: &'t [Token],
    grammar: &'g Grammar,
    pos: usize,
    ast: Ast<'g>,
    /// Innermost command matched so far.
    current: Option<CmdId>,
    /// Names of the matched command chain, outermost first.
    path: Vec<String>,
    /// Key/value argument whose value is the next token.
    awaiting_value: Option<ArgId>,
}

impl<'t, 'g> Builder<'t, 'g> {
    fn new(tokens: &'t [Token], grammar: &'g Grammar) -> Self {
        Self {
            tokens,
            grammar,
            pos: 0,
            ast: Ast::default(),
            current: None,
            path: Vec::new(),
            awaiting_value: None,
        }
    }

    fn build(mut self) -> Ast<'g> {
        let tokens = self.tokens;
        while let Some(tok) = tokens.get(self.pos) {
            let step = match self.current {
                None => self.match_root(tok),
                Some(id) => self.match_under(id, tok),
            };
            match step {
                Step::Next => self.pos += 1,
                Step::Done => break,
            }
        }
        tracing::debug!(
            tokens = self.tokens.len(),
            commands = self.ast.commands.len(),
            remainder = self.ast.remainder.is_some(),
            pending = self.ast.pending.is_some(),
            "built command line ast"
        );
        self.ast
    }

    // ── Matching ────────────────────────────────────────────────────────

    fn match_root(&mut self, tok: &Token) -> Step {
        let grammar = self.grammar;
        match grammar.commands().get(tok.value.as_str()) {
            Some(def) => {
                self.push_command(def, tok);
                Step::Next
            }
            None => {
                tracing::trace!(token = %tok.value, "no top-level command matched");
                self.finish_with_remainder(self.pos);
                Step::Done
            }
        }
    }

    fn match_under(&mut self, id: CmdId, tok: &Token) -> Step {
        if let Some(arg_id) = self.awaiting_value.take() {
            self.set_value(arg_id, tok);
            return Step::Next;
        }

        let def: &'g Command = self.ast.commands[id.0].def;

        if let Some(name) = tok.value.strip_prefix(ARG_PREFIX)
            && let Some(arg) = def.arg(name)
        {
            let name = name.to_string();
            let index = self.ast.commands[id.0].args.len();
            let arg_id = ArgId { command: id, index };
            let entry = if arg.flag {
                tracing::trace!(flag = %name, "matched flag");
                ArgEntry::Flag(ArgFlagNode {
                    def: arg,
                    parent: id,
                    token: tok.clone(),
                    name,
                })
            } else {
                tracing::trace!(key = %name, "matched argument key");
                self.awaiting_value = Some(arg_id);
                ArgEntry::Pair(ArgNode {
                    def: arg,
                    parent: id,
                    key: ArgKeyNode {
                        parent: arg_id,
                        token: tok.clone(),
                        name,
                    },
                    value: None,
                })
            };
            self.ast.commands[id.0].args.push(entry);
            return Step::Next;
        }

        if tok.value.starts_with(ARG_PREFIX) {
            tracing::trace!(token = %tok.value, path = ?self.path, "unknown argument");
            self.finish_with_remainder(self.pos);
            return Step::Done;
        }

        let subs = def.commands.as_ref();
        if let Some(sub) = subs.and_then(|s| s.get(&tok.value)) {
            self.push_command(sub, tok);
            return Step::Next;
        }

        match subs {
            Some(Subcommands::Lazy(lazy)) => {
                tracing::debug!(
                    path = ?self.path,
                    token = %tok.value,
                    "subcommands need resolution"
                );
                self.ast.pending = Some(PendingNode {
                    path: self.path.clone(),
                    token: tok.clone(),
                    resolver: lazy.resolver.clone(),
                });
                self.finish_with_remainder(self.pos + 1);
                Step::Done
            }
            Some(Subcommands::Eager(_)) | None => {
                tracing::trace!(token = %tok.value, path = ?self.path, "unmatched text");
                self.finish_with_remainder(self.pos);
                Step::Done
            }
        }
    }

    // ── Node construction ───────────────────────────────────────────────

    fn push_command(&mut self, def: &'g Command, tok: &Token) {
        let id = CmdId(self.ast.commands.len());
        let parent = self.current;
        if let Some(parent) = parent {
            self.ast.commands[parent.0].command = Some(id);
        }
        self.ast.commands.push(CommandNode {
            def,
            token: tok.clone(),
            parent,
            command: None,
            args: Vec::new(),
        });
        self.path.push(tok.value.clone());
        self.current = Some(id);
        tracing::trace!(command = %tok.value, depth = self.path.len(), "matched command");
    }

    fn set_value(&mut self, arg_id: ArgId, tok: &Token) {
        let entry = &mut self.ast.commands[arg_id.command.0].args[arg_id.index];
        if let ArgEntry::Pair(arg) = entry {
            arg.value = Some(ArgValueNode {
                parent: arg_id,
                token: tok.clone(),
            });
        }
    }

    /// Fold `tokens[from..]` into one remainder node.
    fn finish_with_remainder(&mut self, from: usize) {
        let rest = &self.tokens[from.min(self.tokens.len())..];
        let Some(token) = join_tokens(rest) else {
            return;
        };
        let arg_ctx = self.current.and_then(|id| {
            let args = &self.ast.commands[id.0].args;
            match args.last() {
                Some(ArgEntry::Pair(_)) => Some(ArgId {
                    command: id,
                    index: args.len() - 1,
                }),
                _ => None,
            }
        });
        self.ast.remainder = Some(RemainderNode {
            token,
            cmd_ctx: self.current,
            arg_ctx,
        });
    }
}

/// Merge consecutive tokens into a single token spanning all of them.
///
/// Gaps between tokens are filled with spaces so the value keeps the same
/// width as the span.
fn join_tokens(tokens: &[Token]) -> Option<Token> {
    let first = tokens.first()?;
    let last = tokens.last()?;
    let mut value = String::with_capacity(last.end - first.start);
    let mut cursor = first.start;
    for t in tokens {
        value.extend(std::iter::repeat_n(' ', t.start.saturating_sub(cursor)));
        value.push_str(&t.value);
        cursor = t.end;
    }
    Some(Token::new(first.start, last.end, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tok(start: usize, value: &str) -> Token {
        Token::new(start, start + value.len(), value)
    }

    #[test]
    fn join_tokens_fills_gaps() {
        let joined = join_tokens(&[tok(4, "a"), tok(8, "bc")]).unwrap();
        assert_eq!(joined, Token::new(4, 10, "a   bc"));
        assert!(join_tokens(&[]).is_none());
    }

    #[test]
    fn remainder_value_width_matches_span() {
        let g = Grammar::default();
        let ast = parse_str("no  such   command", &g);
        let rem = ast.remainder.unwrap();
        assert_eq!(rem.token.value, "no  such   command");
        assert_eq!(rem.token.value.len(), rem.token.end - rem.token.start);
    }
}
