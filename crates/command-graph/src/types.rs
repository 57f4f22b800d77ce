use std::collections::BTreeMap;

use cad_schema::{default_params, CommandKind, ParamKind, ParamValue, SchemaError};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::warn;

/// The ordered list of commands. Index order is generation order.
///
/// Operations in [`crate::graph`] never mutate a graph in place; each returns
/// a new value, which is what history snapshots hold.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandGraph {
    commands: Vec<CommandInstance>,
}

impl CommandGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from hydrated commands, normalizing references.
    pub fn from_commands(commands: Vec<CommandInstance>) -> Self {
        crate::resolve::validate(&Self { commands })
    }

    pub(crate) fn from_vec_unchecked(commands: Vec<CommandInstance>) -> Self {
        Self { commands }
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&CommandInstance> {
        self.commands.get(index)
    }

    pub fn commands(&self) -> &[CommandInstance] {
        &self.commands
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CommandInstance> {
        self.commands.iter()
    }

    pub fn into_commands(self) -> Vec<CommandInstance> {
        self.commands
    }

    pub(crate) fn check_index(&self, index: usize) -> Result<(), GraphError> {
        if index < self.commands.len() {
            Ok(())
        } else {
            Err(GraphError::IndexOutOfRange {
                index,
                len: self.commands.len(),
            })
        }
    }
}

impl Serialize for CommandGraph {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.commands.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for CommandGraph {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Vec::<CommandInstance>::deserialize(deserializer).map(CommandGraph::from_commands)
    }
}

/// One step of the build recipe.
///
/// Wire shape: `{"command": "box", "params": {...}, "hidden": false}`, plus
/// `"objectReferences": [..]` for boolean and transform kinds. The reference
/// list is kept identical to the `objects`/`target` entry in `params`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCommand")]
pub struct CommandInstance {
    #[serde(rename = "command")]
    pub kind: CommandKind,
    pub params: BTreeMap<String, ParamValue>,
    pub hidden: bool,
    #[serde(
        rename = "objectReferences",
        skip_serializing_if = "Option::is_none"
    )]
    pub object_references: Option<Vec<usize>>,
}

impl CommandInstance {
    /// A new instance with every parameter at its schema default.
    pub fn with_defaults(kind: CommandKind) -> Self {
        Self {
            kind,
            params: default_params(kind),
            hidden: false,
            object_references: kind.takes_references().then(Vec::new),
        }
    }

    pub fn param(&self, name: &str) -> Option<&ParamValue> {
        self.params.get(name)
    }

    /// Referenced command indices; empty for kinds without references.
    pub fn references(&self) -> &[usize] {
        self.object_references.as_deref().unwrap_or(&[])
    }

    /// Write a reference list to both the top-level mirror and `params`.
    /// No-op for kinds that take no references.
    pub(crate) fn set_references(&mut self, refs: Vec<usize>) {
        if let Some(name) = self.kind.reference_param() {
            self.params
                .insert(name.to_string(), ParamValue::References(refs.clone()));
            self.object_references = Some(refs);
        }
    }
}

/// Loosely-typed command as it arrives from storage or the UI.
#[derive(Debug, Deserialize)]
struct RawCommand {
    #[serde(alias = "kind")]
    command: String,
    #[serde(default)]
    params: Map<String, Value>,
    #[serde(default)]
    hidden: Option<bool>,
    #[serde(default, rename = "objectReferences")]
    object_references: Option<Value>,
}

impl TryFrom<RawCommand> for CommandInstance {
    type Error = SchemaError;

    fn try_from(raw: RawCommand) -> Result<Self, Self::Error> {
        let kind: CommandKind = raw.command.parse()?;
        let spec = kind.spec();

        let mut params = BTreeMap::new();
        for param in spec.params {
            let value = match raw.params.get(param.name) {
                Some(v) => param.coerce(v).unwrap_or_else(|| {
                    warn!(command = %kind, param = param.name, raw = %v, "malformed parameter, using default");
                    param.default_value()
                }),
                None => param.default_value(),
            };
            params.insert(param.name.to_string(), value);
        }
        for name in raw.params.keys() {
            if spec.param(name).is_none() {
                warn!(command = %kind, param = %name, "dropping unknown parameter");
            }
        }

        let mut instance = CommandInstance {
            kind,
            params,
            hidden: raw.hidden.unwrap_or(false),
            object_references: None,
        };

        // The top-level list wins over the params mirror when both are present.
        if let Some(name) = kind.reference_param() {
            let from_top = raw.object_references.as_ref().and_then(|v| {
                spec.param(name)
                    .and_then(|p| p.coerce(v))
                    .and_then(|p| p.as_references().map(<[usize]>::to_vec))
            });
            let refs = match from_top {
                Some(refs) => refs,
                None => instance
                    .params
                    .get(name)
                    .and_then(ParamValue::as_references)
                    .map(<[usize]>::to_vec)
                    .unwrap_or_default(),
            };
            instance.set_references(refs);
        }

        Ok(instance)
    }
}

/// How `reorder` treats stored reference indices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReorderPolicy {
    /// Leave every stored index untouched. A moved command's referrers then
    /// point at whatever now sits at the old index.
    #[default]
    KeepIndices,
    /// Remap references so they follow the commands they pointed at, then
    /// drop any that became forward references.
    Renumber,
}

/// Errors from command graph operations. A failed operation leaves the
/// graph untouched.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GraphError {
    #[error("unknown command kind: {kind}")]
    UnknownKind { kind: String },

    #[error("index {index} out of range (graph has {len} commands)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("unknown parameter '{param}' for command {kind}")]
    UnknownParam { kind: CommandKind, param: String },

    #[error("parameter '{param}' of {kind} expects a {expected:?} value")]
    ParamTypeMismatch {
        kind: CommandKind,
        param: String,
        expected: ParamKind,
    },
}

impl From<SchemaError> for GraphError {
    fn from(e: SchemaError) -> Self {
        match e {
            SchemaError::UnknownKind { kind } => GraphError::UnknownKind { kind },
        }
    }
}
