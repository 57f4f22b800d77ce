use serde::{Deserialize, Serialize};

use crate::types::CommandGraph;

/// Depth limits for the edit history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum number of snapshots kept. `None` keeps everything.
    pub max_depth: Option<usize>,
}

impl HistoryConfig {
    /// Keep at most `depth` snapshots (at least one).
    pub fn bounded(depth: usize) -> Self {
        Self {
            max_depth: Some(depth.max(1)),
        }
    }
}

/// An immutable copy of the graph at one point of the session.
#[derive(Debug, Clone, PartialEq)]
pub struct HistorySnapshot {
    seq: u64,
    graph: CommandGraph,
}

impl HistorySnapshot {
    /// Monotonic position; never reused within a log.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn graph(&self) -> &CommandGraph {
        &self.graph
    }
}

/// Snapshot-based undo/redo history with a cursor.
///
/// The log always holds at least one snapshot, the state the session
/// started from.
#[derive(Debug, Clone)]
pub struct HistoryLog {
    snapshots: Vec<HistorySnapshot>,
    cursor: usize,
    next_seq: u64,
    config: HistoryConfig,
}

impl HistoryLog {
    pub fn new(initial: CommandGraph, config: HistoryConfig) -> Self {
        Self {
            snapshots: vec![HistorySnapshot {
                seq: 0,
                graph: initial,
            }],
            cursor: 0,
            next_seq: 1,
            config,
        }
    }

    /// Record a new state, discarding anything that was undone.
    pub fn push(&mut self, graph: CommandGraph) {
        self.snapshots.truncate(self.cursor + 1);
        self.snapshots.push(HistorySnapshot {
            seq: self.next_seq,
            graph,
        });
        self.next_seq += 1;
        self.cursor = self.snapshots.len() - 1;

        if let Some(max) = self.config.max_depth {
            let max = max.max(1);
            while self.snapshots.len() > max {
                self.snapshots.remove(0);
                self.cursor -= 1;
            }
        }
    }

    /// Step back one snapshot. `None` at the oldest snapshot.
    pub fn undo(&mut self) -> Option<&CommandGraph> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        Some(&self.snapshots[self.cursor].graph)
    }

    /// Step forward one snapshot. `None` at the newest snapshot.
    pub fn redo(&mut self) -> Option<&CommandGraph> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        Some(&self.snapshots[self.cursor].graph)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }

    /// The snapshot under the cursor.
    pub fn current(&self) -> &HistorySnapshot {
        &self.snapshots[self.cursor]
    }

    pub fn config(&self) -> HistoryConfig {
        self.config
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn snapshots(&self) -> &[HistorySnapshot] {
        &self.snapshots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cad_schema::CommandKind;

    fn graph_with(n: usize) -> CommandGraph {
        (0..n).fold(CommandGraph::new(), |g, _| g.append(CommandKind::Box))
    }

    #[test]
    fn push_after_undo_discards_redo() {
        let mut log = HistoryLog::new(graph_with(0), HistoryConfig::default());
        log.push(graph_with(1));
        log.push(graph_with(2));

        assert_eq!(log.undo().map(CommandGraph::len), Some(1));
        assert!(log.can_redo());

        log.push(graph_with(5));
        assert!(!log.can_redo());
        assert_eq!(log.len(), 3);
        assert_eq!(log.current().graph().len(), 5);
    }

    #[test]
    fn undo_and_redo_stop_at_the_ends() {
        let mut log = HistoryLog::new(graph_with(0), HistoryConfig::default());
        assert!(log.undo().is_none());
        assert!(log.redo().is_none());

        log.push(graph_with(1));
        assert!(log.redo().is_none());
        assert!(log.undo().is_some());
        assert!(log.undo().is_none());
    }

    #[test]
    fn sequence_numbers_are_monotonic() {
        let mut log = HistoryLog::new(graph_with(0), HistoryConfig::default());
        log.push(graph_with(1));
        log.undo();
        log.push(graph_with(2));
        let seqs: Vec<u64> = log.snapshots().iter().map(HistorySnapshot::seq).collect();
        assert_eq!(seqs, vec![0, 2]);
    }

    #[test]
    fn bounded_history_evicts_oldest() {
        let mut log = HistoryLog::new(graph_with(0), HistoryConfig::bounded(3));
        for n in 1..=5 {
            log.push(graph_with(n));
        }
        assert_eq!(log.len(), 3);
        assert_eq!(log.current().graph().len(), 5);
        log.undo();
        log.undo();
        assert!(!log.can_undo());
        assert_eq!(log.current().graph().len(), 3);
    }
}
