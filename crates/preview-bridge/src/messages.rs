use cad_schema::{Category, CommandKind, Rgb};
use command_graph::types::CommandGraph;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::kernel::{ArtifactFormat, PreviewArtifact};

/// Messages from the UI to the editing session.
/// Serialized as JSON with a `type` tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum UiToEditor {
    // -- Command list --
    /// Append a default command of the given kind.
    AppendCommand {
        kind: String,
    },
    RemoveCommand {
        index: usize,
    },
    /// Move a command and record it as one edit.
    ReorderCommand {
        from: usize,
        to: usize,
    },
    /// Intermediate step of a drag; recorded on `EndDrag`.
    DragCommand {
        from: usize,
        to: usize,
    },
    EndDrag,
    /// Replace a command's kind, resetting its parameters.
    SetKind {
        index: usize,
        kind: String,
    },
    /// Set one parameter. `value` is interpreted through the schema.
    SetParam {
        index: usize,
        name: String,
        value: Value,
    },
    ToggleHidden {
        index: usize,
    },

    // -- History --
    Undo,
    Redo,

    // -- Viewer --
    SelectCommand {
        index: Option<usize>,
    },
    SetColor {
        color: Rgb,
    },
    SetLivePreview {
        enabled: bool,
    },
    /// Generate a preview now, regardless of the live-preview setting.
    RequestPreview,

    // -- Catalog --
    ListCommandKinds,

    // -- Documents --
    LoadDocument {
        data: String,
    },
    SaveDocument,

    /// End the session.
    Close,
}

/// Messages from the editing session to the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EditorToUi {
    /// The command list changed.
    GraphUpdated {
        cad_commands: CommandGraph,
        can_undo: bool,
        can_redo: bool,
        selected_index: Option<usize>,
    },

    SelectionChanged {
        selected_index: Option<usize>,
    },

    /// Color or live-preview setting changed.
    SettingsChanged {
        color: Rgb,
        live_preview: bool,
    },

    /// A preview will be generated on the next timer tick.
    PreviewScheduled,

    /// A new preview is ready for the viewer.
    PreviewUpdated {
        artifact: ArtifactMessage,
        hints: Vec<ViewerHint>,
        selected_index: Option<usize>,
    },

    /// The graph is empty; the viewer should show nothing.
    PreviewCleared,

    CommandCatalog {
        categories: Vec<CatalogGroup>,
    },

    SaveReady {
        json_data: String,
    },

    DocumentLoaded {
        name: String,
        cad_commands: CommandGraph,
        color: Rgb,
    },

    Closed,

    Error {
        message: String,
    },
}

/// A preview as sent to the UI. Binary payloads are base64-encoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMessage {
    pub format: ArtifactFormat,
    pub data: String,
}

impl From<&PreviewArtifact> for ArtifactMessage {
    fn from(artifact: &PreviewArtifact) -> Self {
        Self {
            format: artifact.format,
            data: artifact.payload.to_wire_string(),
        }
    }
}

/// Per-command rendering hint for the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewerHint {
    pub command: CommandKind,
    pub is_2d: bool,
    pub hidden: bool,
}

/// One toolbar group of the command catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogGroup {
    pub category: Category,
    pub label: String,
    pub kinds: Vec<CatalogEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    pub label: String,
    pub is_2d: bool,
}
