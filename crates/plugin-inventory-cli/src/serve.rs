use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use plugin_inventory::{list_inventory, InventoryCache};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
struct ToolCall {
    tool: String,
    #[serde(default)]
    args: Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ListArgs {
    force_refresh: bool,
    limit: Option<usize>,
}

/// Serve one JSON response line for every request line until EOF.
pub fn run(cache: &InventoryCache, input: impl BufRead, mut output: impl Write) -> Result<()> {
    for line in input.lines() {
        let line = line.context("failed to read request")?;
        if line.trim().is_empty() {
            continue;
        }
        let response = dispatch(cache, &line);
        writeln!(output, "{response}").context("failed to write response")?;
        output.flush()?;
    }
    Ok(())
}

pub fn dispatch(cache: &InventoryCache, line: &str) -> Value {
    let call: ToolCall = match serde_json::from_str(line) {
        Ok(call) => call,
        Err(err) => return json!({ "error": format!("invalid request: {err}") }),
    };
    tracing::debug!(tool = %call.tool, "tool call");

    match call.tool.as_str() {
        "list_installed_plugins" => {
            let args: ListArgs = if call.args.is_null() {
                ListArgs::default()
            } else {
                match serde_json::from_value(call.args) {
                    Ok(args) => args,
                    Err(err) => {
                        return json!({ "error": format!("bad arguments for {}: {err}", call.tool) })
                    }
                }
            };
            let listing = list_inventory(cache, args.force_refresh, args.limit);
            serde_json::to_value(listing)
                .unwrap_or_else(|err| json!({ "error": err.to_string() }))
        }
        "refresh_plugins" => {
            let inventory = cache.force_scan();
            json!({ "count": inventory.len(), "scanned_at": inventory.scanned_at })
        }
        other => json!({ "error": format!("unknown tool '{other}'") }),
    }
}
