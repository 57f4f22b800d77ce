//! Debounced, de-duplicated scheduling of kernel preview requests.
//!
//! The orchestrator does no I/O and reads no clock. Callers pass the current
//! [`Instant`] to every method, act on the returned [`Poll`] and report the
//! kernel's answer through [`PreviewOrchestrator::complete`]. The async
//! driver lives in [`crate::worker`].

use std::time::Duration;

use cad_schema::Rgb;
use command_graph::types::CommandGraph;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::config::PreviewConfig;
use crate::fingerprint::Fingerprint;
use crate::kernel::{KernelError, KernelResponse, PreviewArtifact, PreviewRequest};

/// Identifies one dispatched kernel request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

/// Where the orchestrator is in its request cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum PreviewState {
    Idle,
    Debouncing { deadline: Instant },
    Requesting { ticket: Ticket },
    Error { message: String },
}

/// What a preview would be generated from.
#[derive(Debug, Clone, Copy)]
pub struct PreviewInput<'a> {
    pub graph: &'a CommandGraph,
    pub color: Rgb,
    pub selected_index: Option<usize>,
}

/// Outcome of [`PreviewOrchestrator::poll`].
#[derive(Debug, Clone, PartialEq)]
pub enum Poll {
    /// Nothing to do yet.
    Waiting,
    /// Send `request` to the kernel and report back with `ticket`.
    Dispatch {
        ticket: Ticket,
        request: PreviewRequest,
    },
    /// The content matches the last successful preview.
    Skipped,
    /// The graph is empty; the current preview was dropped.
    Cleared,
}

/// Outcome of [`PreviewOrchestrator::complete`].
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    /// The ticket is stale or the orchestrator is closed.
    Ignored,
    /// A new preview is available.
    Updated(PreviewArtifact),
    /// The kernel request failed. Not retried until the next change.
    Failed(PreviewError),
    /// The kernel answered with an unusable payload. Dropped.
    Malformed(KernelError),
}

/// Errors surfaced to the user from the preview pipeline.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PreviewError {
    #[error("preview request failed: {message}")]
    KernelRequestFailed { message: String },
}

#[derive(Debug)]
pub struct PreviewOrchestrator {
    state: PreviewState,
    debounce: Duration,
    include_selection: bool,
    next_ticket: u64,
    /// Fingerprint of the request currently with the kernel.
    in_flight: Option<Fingerprint>,
    /// Fingerprint of the last request that produced a preview.
    last_success: Option<Fingerprint>,
    /// A change arrived while a request was in flight.
    trailing: bool,
    artifact: Option<PreviewArtifact>,
    closed: bool,
}

impl PreviewOrchestrator {
    pub fn new(config: &PreviewConfig) -> Self {
        Self {
            state: PreviewState::Idle,
            debounce: config.debounce(),
            include_selection: config.fingerprint_includes_selection,
            next_ticket: 1,
            in_flight: None,
            last_success: None,
            trailing: false,
            artifact: None,
            closed: false,
        }
    }

    pub fn state(&self) -> &PreviewState {
        &self.state
    }

    /// The latest successful preview, if any.
    pub fn artifact(&self) -> Option<&PreviewArtifact> {
        self.artifact.as_ref()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// When the pending debounce timer fires.
    pub fn next_deadline(&self) -> Option<Instant> {
        match self.state {
            PreviewState::Debouncing { deadline } => Some(deadline),
            _ => None,
        }
    }

    /// Record an edit. Restarts the debounce timer, or marks a trailing
    /// cycle if a request is in flight.
    pub fn notify_change(&mut self, now: Instant) {
        self.schedule(now + self.debounce);
    }

    /// Fire on the next poll without waiting for the debounce period.
    pub fn request_now(&mut self, now: Instant) {
        self.schedule(now);
    }

    fn schedule(&mut self, deadline: Instant) {
        if self.closed {
            return;
        }
        match self.state {
            PreviewState::Requesting { .. } => {
                self.trailing = true;
                debug!("change during request, trailing cycle queued");
            }
            _ => self.state = PreviewState::Debouncing { deadline },
        }
    }

    /// Advance the timer. Returns what the caller should do now.
    pub fn poll(&mut self, now: Instant, input: PreviewInput<'_>) -> Poll {
        if self.closed {
            return Poll::Waiting;
        }
        let deadline = match self.state {
            PreviewState::Debouncing { deadline } => deadline,
            _ => return Poll::Waiting,
        };
        if now < deadline {
            return Poll::Waiting;
        }

        let request = PreviewRequest::build(input.graph, input.color, input.selected_index);
        let fingerprint = Fingerprint::of(&request, self.include_selection);

        if request.cad_commands.is_empty() {
            self.state = PreviewState::Idle;
            self.artifact = None;
            self.last_success = Some(fingerprint);
            debug!("empty graph, preview cleared");
            return Poll::Cleared;
        }

        if self.last_success == Some(fingerprint) {
            self.state = PreviewState::Idle;
            debug!(?fingerprint, "content unchanged, request skipped");
            return Poll::Skipped;
        }

        let ticket = Ticket(self.next_ticket);
        self.next_ticket += 1;
        self.in_flight = Some(fingerprint);
        self.state = PreviewState::Requesting { ticket };
        debug!(?ticket, ?fingerprint, commands = request.cad_commands.len(), "dispatching preview");
        Poll::Dispatch { ticket, request }
    }

    /// Report the kernel's answer for `ticket`.
    pub fn complete(
        &mut self,
        ticket: Ticket,
        result: Result<KernelResponse, KernelError>,
        now: Instant,
    ) -> Completion {
        if self.closed {
            return Completion::Ignored;
        }
        if self.state != (PreviewState::Requesting { ticket }) {
            debug!(?ticket, "discarding stale preview response");
            return Completion::Ignored;
        }

        let in_flight = self.in_flight.take();
        let completion = match result.and_then(KernelResponse::into_artifact) {
            Ok(artifact) => {
                self.last_success = in_flight;
                self.artifact = Some(artifact.clone());
                self.state = PreviewState::Idle;
                Completion::Updated(artifact)
            }
            Err(e @ KernelError::MalformedPayload { .. }) => {
                warn!(error = %e, "dropping malformed preview");
                self.state = PreviewState::Idle;
                Completion::Malformed(e)
            }
            Err(e) => {
                let message = e.to_string();
                warn!(error = %message, "preview request failed");
                self.state = PreviewState::Error {
                    message: message.clone(),
                };
                Completion::Failed(PreviewError::KernelRequestFailed { message })
            }
        };

        if std::mem::take(&mut self.trailing) {
            self.state = PreviewState::Debouncing {
                deadline: now + self.debounce,
            };
        }
        completion
    }

    /// Abandon the pending timer and any in-flight request. A response for
    /// the abandoned request will be ignored.
    pub fn cancel(&mut self) {
        self.state = PreviewState::Idle;
        self.in_flight = None;
        self.trailing = false;
    }

    /// Stop for good. Later calls are no-ops.
    pub fn close(&mut self) {
        self.cancel();
        self.closed = true;
    }
}
