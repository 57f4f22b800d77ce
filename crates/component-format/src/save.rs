use crate::document::{ComponentDocument, SimulationDocument};
use crate::errors::SaveError;

/// Serialize a component to pretty-printed JSON.
pub fn save_component(doc: &ComponentDocument) -> Result<String, SaveError> {
    serde_json::to_string_pretty(doc).map_err(|e| SaveError::SerializeFailed(e.to_string()))
}

/// Serialize a simulation to pretty-printed JSON.
pub fn save_simulation(doc: &SimulationDocument) -> Result<String, SaveError> {
    serde_json::to_string_pretty(doc).map_err(|e| SaveError::SerializeFailed(e.to_string()))
}
