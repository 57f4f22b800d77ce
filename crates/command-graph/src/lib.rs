pub mod graph;
pub mod history;
pub mod resolve;
pub mod types;

use cad_schema::{CommandKind, ParamValue};
use tracing::{debug, instrument};

use crate::history::{HistoryConfig, HistoryLog};
use crate::types::{CommandGraph, GraphError, ReorderPolicy};

pub use history::HistorySnapshot;
pub use types::CommandInstance;

/// The editing core of one session.
///
/// Holds the current command graph and its history. Every successful
/// mutation replaces the graph with the operation's result and pushes
/// exactly one snapshot; a failed mutation changes nothing.
#[derive(Debug, Clone)]
pub struct Editor {
    /// The current graph.
    graph: CommandGraph,
    /// Undo/redo snapshots.
    history: HistoryLog,
    /// How reorders treat stored reference indices.
    reorder_policy: ReorderPolicy,
    /// Set while a drag-reorder is in progress and has moved something.
    dragging: bool,
}

impl Editor {
    /// Create an editor over an empty graph.
    pub fn new() -> Self {
        Self::with_graph(CommandGraph::new(), HistoryConfig::default(), ReorderPolicy::default())
    }

    /// Create an editor hydrated from an existing graph.
    pub fn with_graph(
        graph: CommandGraph,
        history: HistoryConfig,
        reorder_policy: ReorderPolicy,
    ) -> Self {
        Self {
            history: HistoryLog::new(graph.clone(), history),
            graph,
            reorder_policy,
            dragging: false,
        }
    }

    pub fn graph(&self) -> &CommandGraph {
        &self.graph
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn reorder_policy(&self) -> ReorderPolicy {
        self.reorder_policy
    }

    /// Append a default instance of `kind`. Returns its index.
    #[instrument(skip(self))]
    pub fn append(&mut self, kind: CommandKind) -> usize {
        let next = self.graph.append(kind);
        self.commit(next);
        self.graph.len() - 1
    }

    /// Append by registry id.
    pub fn append_named(&mut self, kind: &str) -> Result<usize, GraphError> {
        let kind: CommandKind = kind.parse()?;
        Ok(self.append(kind))
    }

    #[instrument(skip(self))]
    pub fn remove(&mut self, index: usize) -> Result<(), GraphError> {
        let next = self.graph.remove(index)?;
        self.commit(next);
        Ok(())
    }

    /// Move one command and record the move as a single edit.
    #[instrument(skip(self))]
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<(), GraphError> {
        let next = self.graph.reorder(from, to, self.reorder_policy)?;
        self.commit(next);
        Ok(())
    }

    /// Move one command as an intermediate step of a drag.
    ///
    /// Nothing is pushed until [`Editor::end_drag`].
    pub fn drag_to(&mut self, from: usize, to: usize) -> Result<(), GraphError> {
        self.graph = self.graph.reorder(from, to, self.reorder_policy)?;
        self.dragging = true;
        Ok(())
    }

    /// Finish a drag, pushing one snapshot for all of its moves.
    ///
    /// Returns `false` when no drag was in progress.
    pub fn end_drag(&mut self) -> bool {
        if !self.dragging {
            return false;
        }
        self.dragging = false;
        if &self.graph == self.history.current().graph() {
            // Dragged back to where it started.
            return false;
        }
        self.history.push(self.graph.clone());
        debug!(snapshots = self.history.len(), "drag committed");
        true
    }

    #[instrument(skip(self))]
    pub fn set_kind(&mut self, index: usize, kind: CommandKind) -> Result<(), GraphError> {
        let next = self.graph.set_kind(index, kind)?;
        self.commit(next);
        Ok(())
    }

    /// Change a command's kind by registry id.
    pub fn set_kind_named(&mut self, index: usize, kind: &str) -> Result<(), GraphError> {
        let kind: CommandKind = kind.parse()?;
        self.set_kind(index, kind)
    }

    #[instrument(skip(self, value))]
    pub fn set_param(
        &mut self,
        index: usize,
        name: &str,
        value: ParamValue,
    ) -> Result<(), GraphError> {
        let next = self.graph.set_param(index, name, value)?;
        self.commit(next);
        Ok(())
    }

    #[instrument(skip(self))]
    pub fn toggle_hidden(&mut self, index: usize) -> Result<(), GraphError> {
        let next = self.graph.toggle_hidden(index)?;
        self.commit(next);
        Ok(())
    }

    /// Restore the previous snapshot. Returns `false` if there is none.
    ///
    /// A drag still in progress is committed first, so undo reverts exactly
    /// that drag and redo can bring it back.
    pub fn undo(&mut self) -> bool {
        self.end_drag();
        match self.history.undo() {
            Some(graph) => {
                self.graph = graph.clone();
                true
            }
            None => false,
        }
    }

    /// Re-apply the next snapshot. Returns `false` if there is none.
    pub fn redo(&mut self) -> bool {
        self.end_drag();
        match self.history.redo() {
            Some(graph) => {
                self.graph = graph.clone();
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Replace the whole graph (e.g. after loading) and start a fresh history.
    pub fn reset(&mut self, graph: CommandGraph) {
        self.history = HistoryLog::new(graph.clone(), self.history.config());
        self.graph = graph;
        self.dragging = false;
    }

    /// Install a new graph state and snapshot it. An in-progress drag is
    /// folded into this snapshot.
    fn commit(&mut self, next: CommandGraph) {
        self.dragging = false;
        self.graph = next;
        self.history.push(self.graph.clone());
        debug!(
            commands = self.graph.len(),
            snapshots = self.history.len(),
            "graph committed"
        );
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}
