use super::ast::Token;

/// Split a command line into positioned tokens.
///
/// Tokens are maximal runs of non-whitespace characters; whitespace itself
/// produces no tokens. `start`/`end` are byte offsets into `input`, and each
/// token's `value` is exactly `&input[start..end]`. There is no quoting or
/// escaping.
pub fn tokenize(input: &str) -> Vec<Token> {
    let mut toks = Vec::new();
    let mut start: Option<usize> = None;
    for (i, c) in input.char_indices() {
        match (c.is_whitespace(), start) {
            (true, Some(s)) => {
                toks.push(Token::new(s, i, &input[s..i]));
                start = None;
            }
            (false, None) => start = Some(i),
            _ => {}
        }
    }
    if let Some(s) = start {
        toks.push(Token::new(s, input.len(), &input[s..]));
    }
    toks
}
