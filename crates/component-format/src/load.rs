use command_graph::types::{CommandGraph, CommandInstance};
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::document::{ComponentDocument, SimulationDocument};
use crate::errors::LoadError;

/// Parse a component document.
///
/// Commands are hydrated one by one so a bad entry is reported with its
/// position. Missing `hidden` flags, missing reference lists and missing
/// parameters are filled in; dangling references are dropped.
#[instrument(skip_all, fields(bytes = json.len()))]
pub fn load_component(json: &str) -> Result<ComponentDocument, LoadError> {
    let mut root = parse_object(json)?;

    let raw_commands = match root.remove("cad_commands") {
        Some(Value::Array(items)) => items,
        Some(Value::Null) | None => Vec::new(),
        Some(_) => return Err(LoadError::InvalidField { field: "cad_commands" }),
    };
    let commands = raw_commands
        .into_iter()
        .enumerate()
        .map(|(index, raw)| {
            serde_json::from_value::<CommandInstance>(raw).map_err(|e| {
                LoadError::InvalidCommand {
                    index,
                    reason: e.to_string(),
                }
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let before: usize = commands.iter().map(|c| c.references().len()).sum();
    let graph = CommandGraph::from_commands(commands);
    let after: usize = graph.iter().map(|c| c.references().len()).sum();
    if after < before {
        debug!(dropped = before - after, "dropped dangling references on load");
    }

    root.insert("cad_commands".to_string(), Value::Array(Vec::new()));
    let mut doc: ComponentDocument = serde_json::from_value(Value::Object(root))
        .map_err(|e| LoadError::ParseError(e.to_string()))?;
    doc.cad_commands = graph;
    Ok(doc)
}

/// Parse a simulation document.
pub fn load_simulation(json: &str) -> Result<SimulationDocument, LoadError> {
    let root = parse_object(json)?;
    if !matches!(root.get("project_name"), Some(Value::String(_))) {
        return Err(LoadError::InvalidField {
            field: "project_name",
        });
    }
    serde_json::from_value(Value::Object(root)).map_err(|e| LoadError::ParseError(e.to_string()))
}

fn parse_object(json: &str) -> Result<Map<String, Value>, LoadError> {
    match serde_json::from_str(json).map_err(|e| LoadError::ParseError(e.to_string()))? {
        Value::Object(map) => Ok(map),
        _ => Err(LoadError::ParseError("expected a JSON object".to_string())),
    }
}
