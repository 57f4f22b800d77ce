use cad_schema::{CommandKind, Rgb};
use command_graph::types::CommandGraph;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A stored component: metadata plus the command list that builds it.
///
/// Only the fields the editor touches are typed. Everything else the
/// document carries (collision settings, custom keys) is kept in `extra`
/// and written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentDocument {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
    /// kg/m³.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub density: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Rgb>,
    pub cad_commands: CommandGraph,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ComponentDocument {
    /// A new aluminum component containing a single default box.
    pub fn new(name: impl Into<String>) -> Self {
        let mut extra = Map::new();
        extra.insert(
            "collision".to_string(),
            serde_json::json!({ "enabled": true, "shape": "box", "params": {} }),
        );
        Self {
            name: name.into(),
            description: Some("New component".to_string()),
            material: Some("aluminum".to_string()),
            density: Some(2700.0),
            color: Some(Rgb::default()),
            cad_commands: CommandGraph::new().append(CommandKind::Box),
            extra,
        }
    }

    /// The stored color, or the default grey.
    pub fn color_or_default(&self) -> Rgb {
        self.color.unwrap_or_default()
    }
}

/// A stored simulation setup.
///
/// The physics configuration is opaque to the editor; only the project
/// name and the component list are read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationDocument {
    pub project_name: String,
    #[serde(default)]
    pub components: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SimulationDocument {
    /// An empty simulation with SI units and standard gravity.
    pub fn new(project_name: impl Into<String>) -> Self {
        let template = serde_json::json!({
            "export": {
                "generate_stl": true,
                "step_interval": 0.02,
                "timestamps": [0.0, 0.5, 1.0]
            },
            "units": {
                "length": "meters",
                "mass": "kilograms",
                "time": "seconds",
                "force": "newtons"
            },
            "environment": {
                "gravity": [0.0, 0.0, -9.81],
                "temperature": 293.15,
                "air_pressure": 101325.0,
                "simulation_time": 1.0,
                "timestep": 0.02
            },
            "loads": [],
            "joints": []
        });
        let extra = match template {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            project_name: project_name.into(),
            components: Vec::new(),
            extra,
        }
    }
}

/// File stem used to store a document: whitespace runs become `_`, the
/// rest is lowercased.
pub fn storage_filename(name: &str) -> String {
    name.trim()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase()
}
