pub mod config;
pub mod dispatch;
pub mod fingerprint;
pub mod kernel;
pub mod messages;
pub mod mock_kernel;
pub mod orchestrator;
pub mod session;
pub mod worker;

pub use config::{ConfigError, EditorConfig, PreviewConfig};
pub use dispatch::dispatch;
pub use kernel::{
    ArtifactFormat, ArtifactPayload, GeometryKernel, KernelError, KernelResponse,
    PreviewArtifact, PreviewRequest,
};
pub use mock_kernel::MockKernel;
pub use orchestrator::{Completion, Poll, PreviewError, PreviewOrchestrator, PreviewState, Ticket};
pub use session::{BridgeError, EditSession};
pub use worker::{spawn_session, SessionHandle};
