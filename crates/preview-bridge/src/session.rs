use cad_schema::{ParamValue, Rgb};
use command_graph::history::HistoryLog;
use command_graph::types::{CommandGraph, GraphError};
use command_graph::Editor;
use component_format::{load_component, save_component, ComponentDocument, LoadError, SaveError};
use serde_json::{Map, Value};
use tokio::time::Instant;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::config::EditorConfig;
use crate::kernel::{KernelError, KernelResponse};
use crate::messages::ViewerHint;
use crate::orchestrator::{
    Completion, Poll, PreviewError, PreviewInput, PreviewOrchestrator, Ticket,
};

/// One user's editing session over a single component.
///
/// Owns the editor (graph + history), the preview orchestrator and the
/// viewer state. All methods are synchronous; time is passed in so the
/// session can be driven by a real clock or by tests.
#[derive(Debug)]
pub struct EditSession {
    id: Uuid,
    config: EditorConfig,
    editor: Editor,
    orchestrator: PreviewOrchestrator,
    /// Document metadata. Its `cad_commands` are replaced on save.
    document: ComponentDocument,
    color: Rgb,
    selected: Option<usize>,
    live_preview: bool,
}

impl EditSession {
    /// A session over an empty, untitled component.
    pub fn new(config: EditorConfig) -> Self {
        let document = ComponentDocument {
            name: "Untitled".to_string(),
            description: None,
            material: None,
            density: None,
            color: None,
            cad_commands: CommandGraph::new(),
            extra: Map::new(),
        };
        Self::from_document(document, config)
    }

    /// A session editing an existing component.
    pub fn from_document(document: ComponentDocument, config: EditorConfig) -> Self {
        let editor = Editor::with_graph(
            document.cad_commands.clone(),
            config.history,
            config.reorder,
        );
        Self {
            id: Uuid::new_v4(),
            orchestrator: PreviewOrchestrator::new(&config.preview),
            color: document.color.unwrap_or(config.preview.default_color),
            live_preview: config.preview.live_preview,
            selected: None,
            editor,
            document,
            config,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn graph(&self) -> &CommandGraph {
        self.editor.graph()
    }

    pub fn history(&self) -> &HistoryLog {
        self.editor.history()
    }

    pub fn can_undo(&self) -> bool {
        self.editor.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.editor.can_redo()
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn live_preview(&self) -> bool {
        self.live_preview
    }

    pub fn orchestrator(&self) -> &PreviewOrchestrator {
        &self.orchestrator
    }

    pub fn is_closed(&self) -> bool {
        self.orchestrator.is_closed()
    }

    // ── Edits ───────────────────────────────────────────────────────────

    /// Append a default command by registry id. Returns its index.
    pub fn append(&mut self, kind: &str, now: Instant) -> Result<usize, BridgeError> {
        let index = self.editor.append_named(kind)?;
        self.changed(now);
        Ok(index)
    }

    pub fn remove(&mut self, index: usize, now: Instant) -> Result<(), BridgeError> {
        self.editor.remove(index)?;
        self.selected = match self.selected {
            Some(s) if s == index => None,
            Some(s) if s > index => Some(s - 1),
            other => other,
        };
        self.changed(now);
        Ok(())
    }

    pub fn reorder(&mut self, from: usize, to: usize, now: Instant) -> Result<(), BridgeError> {
        self.editor.reorder(from, to)?;
        self.follow_move(from, to);
        self.changed(now);
        Ok(())
    }

    /// One step of a drag. History is written by [`EditSession::end_drag`].
    pub fn drag_to(&mut self, from: usize, to: usize, now: Instant) -> Result<(), BridgeError> {
        self.editor.drag_to(from, to)?;
        self.follow_move(from, to);
        self.changed(now);
        Ok(())
    }

    pub fn end_drag(&mut self) -> bool {
        self.editor.end_drag()
    }

    pub fn set_kind(&mut self, index: usize, kind: &str, now: Instant) -> Result<(), BridgeError> {
        self.editor.set_kind_named(index, kind)?;
        self.changed(now);
        Ok(())
    }

    /// Set a parameter from raw UI JSON, interpreted through the schema.
    pub fn set_param_json(
        &mut self,
        index: usize,
        name: &str,
        raw: &Value,
        now: Instant,
    ) -> Result<(), BridgeError> {
        let value = self.coerce_param(index, name, raw)?;
        self.set_param(index, name, value, now)
    }

    pub fn set_param(
        &mut self,
        index: usize,
        name: &str,
        value: ParamValue,
        now: Instant,
    ) -> Result<(), BridgeError> {
        self.editor.set_param(index, name, value)?;
        self.changed(now);
        Ok(())
    }

    pub fn toggle_hidden(&mut self, index: usize, now: Instant) -> Result<(), BridgeError> {
        self.editor.toggle_hidden(index)?;
        self.changed(now);
        Ok(())
    }

    pub fn undo(&mut self, now: Instant) -> bool {
        let moved = self.editor.undo();
        if moved {
            self.clamp_selection();
            self.changed(now);
        }
        moved
    }

    pub fn redo(&mut self, now: Instant) -> bool {
        let moved = self.editor.redo();
        if moved {
            self.clamp_selection();
            self.changed(now);
        }
        moved
    }

    // ── Viewer state ────────────────────────────────────────────────────

    pub fn select(&mut self, index: Option<usize>, now: Instant) -> Result<(), BridgeError> {
        if let Some(i) = index {
            let len = self.editor.graph().len();
            if i >= len {
                return Err(GraphError::IndexOutOfRange { index: i, len }.into());
            }
        }
        self.selected = index;
        if self.config.preview.fingerprint_includes_selection {
            self.changed(now);
        }
        Ok(())
    }

    pub fn set_color(&mut self, color: Rgb, now: Instant) {
        self.color = color;
        self.changed(now);
    }

    /// Turning live preview on schedules a preview of the current state.
    pub fn set_live_preview(&mut self, enabled: bool, now: Instant) {
        self.live_preview = enabled;
        if enabled {
            self.orchestrator.notify_change(now);
        }
    }

    /// Fire a preview on the next poll, even with live preview off.
    pub fn request_preview(&mut self, now: Instant) {
        self.orchestrator.request_now(now);
    }

    /// Rendering hints for each command, in graph order.
    pub fn viewer_hints(&self) -> Vec<ViewerHint> {
        self.editor
            .graph()
            .iter()
            .map(|c| ViewerHint {
                command: c.kind,
                is_2d: c.kind.is_2d(),
                hidden: c.hidden,
            })
            .collect()
    }

    // ── Documents ───────────────────────────────────────────────────────

    /// Replace the session contents with a stored component. History
    /// starts over and any pending preview is abandoned.
    #[instrument(skip_all, fields(session = %self.id))]
    pub fn load_document(&mut self, json: &str, now: Instant) -> Result<(), BridgeError> {
        let document = load_component(json)?;
        self.editor.reset(document.cad_commands.clone());
        self.color = document.color.unwrap_or(self.config.preview.default_color);
        self.selected = None;
        self.orchestrator.cancel();
        info!(name = %document.name, commands = document.cad_commands.len(), "document loaded");
        self.document = document;
        self.changed(now);
        Ok(())
    }

    /// The current state as a storable document.
    pub fn to_document(&self) -> ComponentDocument {
        ComponentDocument {
            cad_commands: self.editor.graph().clone(),
            color: Some(self.color),
            ..self.document.clone()
        }
    }

    pub fn save_document(&self) -> Result<String, BridgeError> {
        Ok(save_component(&self.to_document())?)
    }

    // ── Preview driving ─────────────────────────────────────────────────

    pub fn next_deadline(&self) -> Option<Instant> {
        self.orchestrator.next_deadline()
    }

    pub fn poll(&mut self, now: Instant) -> Poll {
        let input = PreviewInput {
            graph: self.editor.graph(),
            color: self.color,
            selected_index: self.selected,
        };
        self.orchestrator.poll(now, input)
    }

    pub fn complete(
        &mut self,
        ticket: Ticket,
        result: Result<KernelResponse, KernelError>,
        now: Instant,
    ) -> Completion {
        self.orchestrator.complete(ticket, result, now)
    }

    /// Stop previewing. Responses still in flight are ignored.
    pub fn close(&mut self) {
        debug!(session = %self.id, "session closed");
        self.orchestrator.close();
    }

    fn changed(&mut self, now: Instant) {
        if self.live_preview {
            self.orchestrator.notify_change(now);
        }
    }

    fn coerce_param(&self, index: usize, name: &str, raw: &Value) -> Result<ParamValue, GraphError> {
        let graph = self.editor.graph();
        let kind = graph
            .get(index)
            .ok_or(GraphError::IndexOutOfRange {
                index,
                len: graph.len(),
            })?
            .kind;
        let spec = kind.spec().param(name).ok_or_else(|| GraphError::UnknownParam {
            kind,
            param: name.to_string(),
        })?;
        spec.coerce(raw).ok_or_else(|| GraphError::ParamTypeMismatch {
            kind,
            param: name.to_string(),
            expected: spec.kind,
        })
    }

    /// Keep the selection on the same command after a move.
    fn follow_move(&mut self, from: usize, to: usize) {
        self.selected = self.selected.map(|s| {
            if s == from {
                to
            } else if from < s && s <= to {
                s - 1
            } else if to <= s && s < from {
                s + 1
            } else {
                s
            }
        });
    }

    fn clamp_selection(&mut self) {
        if matches!(self.selected, Some(s) if s >= self.editor.graph().len()) {
            self.selected = None;
        }
    }
}

/// Errors from the session layer.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BridgeError {
    #[error("graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("load error: {0}")]
    Load(#[from] LoadError),

    #[error("save error: {0}")]
    Save(#[from] SaveError),

    #[error(transparent)]
    Preview(#[from] PreviewError),

    #[error("session closed")]
    SessionClosed,
}
