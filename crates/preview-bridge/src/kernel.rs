//! Contract with the external geometry kernel.
//!
//! The kernel turns a command list into a previewable mesh. It is reached
//! over the network in production and replaced by
//! [`crate::mock_kernel::MockKernel`] in tests.

use async_trait::async_trait;
use base64::Engine as _;
use cad_schema::{clamp_params, Rgb};
use command_graph::types::{CommandGraph, CommandInstance};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// Body of a preview request. Serializes to the kernel's wire shape
/// `{ "cad_commands": [...], "color": [r, g, b] }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewRequest {
    pub cad_commands: CommandGraph,
    pub color: Rgb,
    /// Forwarded to the viewer for highlighting, not sent to the kernel.
    #[serde(skip)]
    pub selected_index: Option<usize>,
}

impl PreviewRequest {
    /// Build a request with every parameter clamped into its schema bounds.
    pub fn build(graph: &CommandGraph, color: Rgb, selected_index: Option<usize>) -> Self {
        let commands = graph
            .iter()
            .map(|instance| CommandInstance {
                params: clamp_params(instance.kind, &instance.params),
                ..instance.clone()
            })
            .collect();
        Self {
            cad_commands: CommandGraph::from_commands(commands),
            color,
            selected_index,
        }
    }
}

/// Mesh encodings the kernel can return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactFormat {
    Gltf,
    Glb,
    Stl,
}

/// Decoded mesh data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactPayload {
    /// glTF JSON.
    Text(String),
    /// glb or STL bytes.
    Binary(Vec<u8>),
}

impl ArtifactPayload {
    pub fn len(&self) -> usize {
        match self {
            ArtifactPayload::Text(s) => s.len(),
            ArtifactPayload::Binary(b) => b.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Text as-is, bytes base64-encoded.
    pub fn to_wire_string(&self) -> String {
        match self {
            ArtifactPayload::Text(s) => s.clone(),
            ArtifactPayload::Binary(b) => base64::engine::general_purpose::STANDARD.encode(b),
        }
    }
}

impl Serialize for ArtifactPayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_wire_string())
    }
}

/// A renderable preview. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewArtifact {
    pub format: ArtifactFormat,
    pub payload: ArtifactPayload,
}

/// Raw kernel response.
///
/// Current kernels answer `{ success, format, payload }`; older ones put the
/// mesh in `gltf`, `glb_base64` or `stl_base64` and omit `format`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KernelResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<ArtifactFormat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gltf: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glb_base64: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stl_base64: Option<String>,
}

impl KernelResponse {
    /// A successful response in the current shape.
    pub fn ok(format: ArtifactFormat, payload: impl Into<String>) -> Self {
        Self {
            success: true,
            format: Some(format),
            payload: Some(Value::String(payload.into())),
            ..Self::default()
        }
    }

    /// A failed response carrying the kernel's message.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
            ..Self::default()
        }
    }

    /// Check the response and decode its payload.
    pub fn into_artifact(self) -> Result<PreviewArtifact, KernelError> {
        if !self.success {
            return Err(KernelError::Rejected {
                message: self
                    .error
                    .unwrap_or_else(|| "Preview generation failed".to_string()),
            });
        }

        let (format, raw) = match self.payload {
            Some(payload) => {
                let format = self.format.ok_or_else(|| KernelError::MalformedPayload {
                    reason: "payload without format".to_string(),
                })?;
                (format, payload)
            }
            None => {
                if let Some(gltf) = self.gltf {
                    (ArtifactFormat::Gltf, gltf)
                } else if let Some(glb) = self.glb_base64 {
                    (ArtifactFormat::Glb, Value::String(glb))
                } else if let Some(stl) = self.stl_base64 {
                    (ArtifactFormat::Stl, Value::String(stl))
                } else {
                    return Err(KernelError::MalformedPayload {
                        reason: "response carries no mesh".to_string(),
                    });
                }
            }
        };

        let payload = match format {
            ArtifactFormat::Gltf => match raw {
                Value::String(text) => ArtifactPayload::Text(text),
                Value::Object(_) => ArtifactPayload::Text(raw.to_string()),
                other => {
                    return Err(KernelError::MalformedPayload {
                        reason: format!("glTF payload must be text or an object, got {other}"),
                    })
                }
            },
            ArtifactFormat::Glb | ArtifactFormat::Stl => {
                let encoded = raw.as_str().ok_or_else(|| KernelError::MalformedPayload {
                    reason: "binary payload must be a base64 string".to_string(),
                })?;
                let bytes = base64::engine::general_purpose::STANDARD
                    .decode(encoded.trim())
                    .map_err(|e| KernelError::MalformedPayload {
                        reason: format!("invalid base64: {e}"),
                    })?;
                ArtifactPayload::Binary(bytes)
            }
        };

        if payload.is_empty() {
            return Err(KernelError::MalformedPayload {
                reason: "empty payload".to_string(),
            });
        }
        Ok(PreviewArtifact { format, payload })
    }
}

/// Errors from a kernel call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum KernelError {
    #[error("kernel unreachable: {message}")]
    Transport { message: String },

    #[error("preview generation failed: {message}")]
    Rejected { message: String },

    #[error("malformed preview payload: {reason}")]
    MalformedPayload { reason: String },
}

/// The external geometry kernel.
#[async_trait]
pub trait GeometryKernel: Send + Sync {
    /// Generate a preview mesh for `request`.
    ///
    /// Transport failures are `Err`; a kernel-side failure is an `Ok`
    /// response with `success: false`.
    async fn generate(&self, request: &PreviewRequest) -> Result<KernelResponse, KernelError>;
}
