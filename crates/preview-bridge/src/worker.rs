//! Async driver for an [`EditSession`].
//!
//! Each session runs as its own tokio task. UI messages arrive over a
//! channel, the debounce timer is a `sleep_until` on the orchestrator's
//! deadline, and kernel calls run in a `JoinSet` so edits keep flowing
//! while a request is in flight.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::{self, JoinHandle, JoinSet};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::dispatch::dispatch;
use crate::kernel::{GeometryKernel, KernelError, KernelResponse};
use crate::messages::{ArtifactMessage, EditorToUi, UiToEditor};
use crate::orchestrator::{Completion, Poll, Ticket};
use crate::session::{BridgeError, EditSession};

const CHANNEL_CAPACITY: usize = 64;

type KernelResult = Result<KernelResponse, KernelError>;

/// Client side of a running session.
///
/// Dropping the handle ends the session: pending timers are cancelled and
/// in-flight kernel calls are aborted.
pub struct SessionHandle {
    id: Uuid,
    commands: mpsc::Sender<UiToEditor>,
    events: mpsc::Receiver<EditorToUi>,
    task: JoinHandle<()>,
}

impl SessionHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub async fn send(&self, msg: UiToEditor) -> Result<(), BridgeError> {
        self.commands
            .send(msg)
            .await
            .map_err(|_| BridgeError::SessionClosed)
    }

    /// Next event from the session; `None` once it has shut down.
    pub async fn recv(&mut self) -> Option<EditorToUi> {
        self.events.recv().await
    }

    /// Ask the session to stop and wait until it has.
    pub async fn close(self) {
        let SessionHandle {
            commands,
            mut events,
            task,
            ..
        } = self;
        if commands.send(UiToEditor::Close).await.is_ok() {
            // Drain so the task is never blocked on a full event channel.
            while events.recv().await.is_some() {}
        }
        drop(commands);
        if let Err(e) = task.await {
            warn!(error = %e, "session task ended abnormally");
        }
    }
}

/// Start `session` on the current tokio runtime.
pub fn spawn_session(session: EditSession, kernel: Arc<dyn GeometryKernel>) -> SessionHandle {
    let id = session.id();
    let (command_tx, command_rx) = mpsc::channel(CHANNEL_CAPACITY);
    let (event_tx, event_rx) = mpsc::channel(CHANNEL_CAPACITY);
    let task = tokio::spawn(run(session, kernel, command_rx, event_tx));
    SessionHandle {
        id,
        commands: command_tx,
        events: event_rx,
        task,
    }
}

async fn run(
    mut session: EditSession,
    kernel: Arc<dyn GeometryKernel>,
    mut commands: mpsc::Receiver<UiToEditor>,
    events: mpsc::Sender<EditorToUi>,
) {
    let mut in_flight: JoinSet<KernelResult> = JoinSet::new();
    let mut tickets: HashMap<task::Id, Ticket> = HashMap::new();
    debug!(session = %session.id(), "session started");

    loop {
        let deadline = session.next_deadline();

        let event = tokio::select! {
            msg = commands.recv() => match msg {
                Some(msg) => {
                    let closing = matches!(msg, UiToEditor::Close);
                    let reply = dispatch(&mut session, msg, Instant::now());
                    if events.send(reply).await.is_err() || closing {
                        break;
                    }
                    continue;
                }
                None => break,
            },

            _ = wait_for(deadline) => match session.poll(Instant::now()) {
                Poll::Dispatch { ticket, request } => {
                    let kernel = Arc::clone(&kernel);
                    let handle = in_flight.spawn(async move { kernel.generate(&request).await });
                    tickets.insert(handle.id(), ticket);
                    None
                }
                Poll::Cleared => Some(EditorToUi::PreviewCleared),
                Poll::Skipped | Poll::Waiting => None,
            },

            Some(joined) = in_flight.join_next_with_id(), if !in_flight.is_empty() => {
                let (id, result) = match joined {
                    Ok((id, result)) => (id, result),
                    Err(e) => {
                        // A panicking kernel still has to release its ticket.
                        warn!(error = %e, "kernel task failed");
                        let message = format!("kernel task failed: {e}");
                        (e.id(), Err(KernelError::Transport { message }))
                    }
                };
                tickets
                    .remove(&id)
                    .and_then(|ticket| completion_event(&mut session, ticket, result))
            },
        };

        if let Some(event) = event {
            if events.send(event).await.is_err() {
                break;
            }
        }
    }

    in_flight.abort_all();
    session.close();
}

fn completion_event(
    session: &mut EditSession,
    ticket: Ticket,
    result: KernelResult,
) -> Option<EditorToUi> {
    match session.complete(ticket, result, Instant::now()) {
        Completion::Updated(artifact) => Some(EditorToUi::PreviewUpdated {
            artifact: ArtifactMessage::from(&artifact),
            hints: session.viewer_hints(),
            selected_index: session.selected_index(),
        }),
        Completion::Failed(e) => Some(EditorToUi::Error {
            message: e.to_string(),
        }),
        Completion::Malformed(_) | Completion::Ignored => None,
    }
}

async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
