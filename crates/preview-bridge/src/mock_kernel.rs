//! MockKernel: deterministic test double implementing GeometryKernel.
//!
//! Records every request it receives and answers from a script of queued
//! responses, falling back to a small synthetic glTF document.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use crate::kernel::{ArtifactFormat, GeometryKernel, KernelError, KernelResponse, PreviewRequest};

#[derive(Debug, Default)]
pub struct MockKernel {
    calls: Mutex<Vec<PreviewRequest>>,
    script: Mutex<VecDeque<Result<KernelResponse, KernelError>>>,
    latency: Option<Duration>,
}

impl MockKernel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every request after `latency` (tokio time, so paused-clock
    /// tests advance through it instantly).
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            ..Self::default()
        }
    }

    /// Queue the answer for the next unanswered request.
    pub fn push_response(&self, response: Result<KernelResponse, KernelError>) {
        lock(&self.script).push_back(response);
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Every request received so far, oldest first.
    pub fn calls(&self) -> Vec<PreviewRequest> {
        lock(&self.calls).clone()
    }

    /// Synthetic glTF describing the request, used when nothing is scripted.
    fn synthetic(request: &PreviewRequest) -> KernelResponse {
        let visible = request.cad_commands.iter().filter(|c| !c.hidden).count();
        let doc = serde_json::json!({
            "asset": { "version": "2.0", "generator": "mock-kernel" },
            "extras": { "commands": request.cad_commands.len(), "visible": visible },
        });
        KernelResponse::ok(ArtifactFormat::Gltf, doc.to_string())
    }
}

#[async_trait]
impl GeometryKernel for MockKernel {
    async fn generate(&self, request: &PreviewRequest) -> Result<KernelResponse, KernelError> {
        lock(&self.calls).push(request.clone());
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        let scripted = lock(&self.script).pop_front();
        scripted.unwrap_or_else(|| Ok(Self::synthetic(request)))
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}
