use clui_grammar::{Arg, ArgValue};
use indexmap::IndexMap;
use serde::Serialize;

use super::ast::{ArgEntry, Ast, CmdId, CommandNode};

/// A declared argument that has no usable value yet.
#[derive(Debug, Clone, Serialize)]
pub struct RemainingArg<'g> {
    /// Argument name, without `--`.
    pub name: &'g str,
    /// The grammar descriptor.
    #[serde(skip)]
    pub def: &'g Arg,
}

/// Arguments of a command, split into what was supplied and what is still missing.
#[derive(Debug, Clone, Serialize)]
pub struct ArgsResult<'g> {
    /// Supplied arguments by name, after coercion. Flags map to `true`.
    ///
    /// `None` only when the command declares no arguments.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parsed: Option<IndexMap<String, ArgValue>>,
    /// Declared arguments without a truthy value, in declaration order.
    ///
    /// `None` only when the command declares no arguments.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining: Option<Vec<RemainingArg<'g>>>,
    /// Whether every declared argument is filled.
    pub exhausted: bool,
}

/// The chain of commands from `id` out to the top-level command, innermost first.
pub fn command_path<'a, 'g>(ast: &'a Ast<'g>, id: CmdId) -> Vec<&'a CommandNode<'g>> {
    let mut path = Vec::new();
    let mut next = Some(id);
    while let Some(id) = next {
        let node = ast.node(id);
        path.push(node);
        next = node.parent;
    }
    path
}

/// Names of the command chain ending at `id`, outermost first.
pub fn command_names(ast: &Ast<'_>, id: CmdId) -> Vec<String> {
    let mut names: Vec<String> = command_path(ast, id)
        .into_iter()
        .map(|c| c.name().to_string())
        .collect();
    names.reverse();
    names
}

/// Resolve a command's typed arguments against its declared ones.
///
/// Values are coerced with the argument's declared [`clui_grammar::ValueType`].
/// A value that coerces to something falsy (`0`, `false`, an unparsable
/// number) still appears in `parsed` but also keeps the argument in
/// `remaining`: it is indistinguishable from an unfilled slot.
pub fn to_args<'g>(command: &CommandNode<'g>) -> ArgsResult<'g> {
    let def: &'g clui_grammar::Command = command.def;
    let Some(declared) = def.args.as_ref() else {
        return ArgsResult {
            parsed: None,
            remaining: None,
            exhausted: true,
        };
    };

    let mut parsed = IndexMap::new();
    for entry in &command.args {
        match entry {
            ArgEntry::Flag(flag) => {
                parsed.insert(flag.name.clone(), ArgValue::Bool(true));
            }
            ArgEntry::Pair(arg) => {
                if let Some(value) = &arg.value {
                    parsed.insert(arg.key.name.clone(), arg.def.coerce(&value.token.value));
                }
            }
        }
    }

    let remaining: Vec<RemainingArg<'g>> = declared
        .iter()
        .filter(|(name, _)| !parsed.get(name.as_str()).is_some_and(ArgValue::is_truthy))
        .map(|(name, def)| RemainingArg {
            name: name.as_str(),
            def,
        })
        .collect();

    ArgsResult {
        exhausted: remaining.is_empty(),
        parsed: Some(parsed),
        remaining: Some(remaining),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::builder::parse_str;
    use clui_grammar::Grammar;

    fn grammar() -> Grammar {
        Grammar::from_json_str(
            r#"{
                "seed": { "args": { "count": { "type": "integer" }, "force": { "flag": true } } },
                "status": {},
                "noop": { "args": {} }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn no_declared_args_is_exhausted_without_data() {
        let g = grammar();
        let ast = parse_str("status", &g);
        let res = to_args(ast.command().unwrap());
        assert!(res.exhausted);
        assert!(res.parsed.is_none());
        assert!(res.remaining.is_none());
    }

    #[test]
    fn empty_args_table_is_exhausted() {
        let g = grammar();
        let ast = parse_str("noop", &g);
        let res = to_args(ast.command().unwrap());
        assert!(res.exhausted);
        assert_eq!(res.parsed.unwrap().len(), 0);
        assert!(res.remaining.unwrap().is_empty());
    }

    #[test]
    fn remaining_follows_declaration_order() {
        let g = grammar();
        let ast = parse_str("seed", &g);
        let res = to_args(ast.command().unwrap());
        let names: Vec<_> = res.remaining.unwrap().iter().map(|r| r.name).collect();
        assert_eq!(names, ["count", "force"]);
        assert!(!res.exhausted);
    }

    #[test]
    fn parsed_follows_typing_order() {
        let g = grammar();
        let ast = parse_str("seed --force --count 2", &g);
        let res = to_args(ast.command().unwrap());
        let parsed = res.parsed.unwrap();
        assert_eq!(parsed.keys().collect::<Vec<_>>(), ["force", "count"]);
        assert_eq!(parsed["count"], ArgValue::Integer(2));
        assert!(res.exhausted);
    }

    #[test]
    fn serializes_remaining_names() {
        let g = grammar();
        let ast = parse_str("seed --count 4", &g);
        let json = serde_json::to_value(to_args(ast.command().unwrap())).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "parsed": { "count": 4 },
                "remaining": [{ "name": "force" }],
                "exhausted": false
            })
        );
    }
}
