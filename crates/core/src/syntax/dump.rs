use serde_json::{Value, json};

use super::ast::{ArgEntry, Ast, CmdId, NodeKind, PendingNode, RemainderNode};

/// Render an AST as a JSON tree.
///
/// Nested commands are inlined under their parent's `command` field and
/// every node carries its `kind`. Grammar descriptors and resolvers are left
/// out; context links (`parent`, `cmdNodeCtx`, `argNodeCtx`) are rendered as
/// command indices, outermost command first.
pub fn to_value(ast: &Ast<'_>) -> Value {
    let mut out = serde_json::Map::new();
    if let Some(root) = ast.root() {
        out.insert("command".into(), command_value(ast, root));
    }
    if let Some(rem) = &ast.remainder {
        out.insert("remainder".into(), remainder_value(rem));
    }
    if let Some(pending) = &ast.pending {
        out.insert("pending".into(), pending_value(pending));
    }
    Value::Object(out)
}

/// Serialize an AST to a pretty-printed JSON string.
pub fn to_pretty_json(ast: &Ast<'_>) -> String {
    serde_json::to_string_pretty(&to_value(ast)).expect("Value serialization cannot fail")
}

fn command_value(ast: &Ast<'_>, id: CmdId) -> Value {
    let cmd = ast.node(id);
    let mut obj = serde_json::Map::new();
    obj.insert("kind".into(), json!(NodeKind::Command));
    obj.insert("token".into(), json!(cmd.token));
    if let Some(parent) = cmd.parent {
        obj.insert("parent".into(), json!(parent));
    }
    if !cmd.args.is_empty() {
        let args: Vec<Value> = cmd
            .args
            .iter()
            .map(|entry| match entry {
                ArgEntry::Flag(flag) => json!({
                    "kind": NodeKind::ArgFlag,
                    "name": flag.name,
                    "token": flag.token,
                }),
                ArgEntry::Pair(arg) => {
                    let mut v = json!({
                        "kind": NodeKind::Arg,
                        "key": {
                            "kind": NodeKind::ArgKey,
                            "name": arg.key.name,
                            "token": arg.key.token,
                        },
                    });
                    if let Some(value) = &arg.value {
                        v["value"] = json!({
                            "kind": NodeKind::ArgValue,
                            "token": value.token,
                        });
                    }
                    v
                }
            })
            .collect();
        obj.insert("args".into(), Value::Array(args));
    }
    if let Some(child) = cmd.command {
        obj.insert("command".into(), command_value(ast, child));
    }
    Value::Object(obj)
}

fn remainder_value(rem: &RemainderNode) -> Value {
    let mut v = json!({
        "kind": NodeKind::Remainder,
        "token": rem.token,
    });
    if let Some(cmd) = rem.cmd_ctx {
        v["cmdNodeCtx"] = json!(cmd);
    }
    if let Some(arg) = rem.arg_ctx {
        v["argNodeCtx"] = json!(arg);
    }
    v
}

fn pending_value(pending: &PendingNode) -> Value {
    json!({
        "kind": NodeKind::Pending,
        "path": pending.path,
        "token": pending.token,
    })
}
