use std::fmt;

use cad_schema::ParamValue;
use sha2::{Digest, Sha256};

use crate::kernel::PreviewRequest;

/// Content hash of what a preview request would render.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Hash the clamped commands and color of `request`, plus the selected
    /// index when `include_selection` is set.
    pub fn of(request: &PreviewRequest, include_selection: bool) -> Self {
        let mut hasher = Sha256::new();

        hasher.update((request.cad_commands.len() as u64).to_le_bytes());
        for instance in request.cad_commands.iter() {
            hasher.update(instance.kind.id().as_bytes());
            hasher.update([0, instance.hidden as u8]);
            hasher.update((instance.params.len() as u64).to_le_bytes());
            for (name, value) in &instance.params {
                hasher.update(name.as_bytes());
                hasher.update([0u8]);
                hash_value(&mut hasher, value);
            }
        }

        for channel in request.color.channels() {
            hasher.update(channel.to_le_bytes());
        }

        if include_selection {
            match request.selected_index {
                Some(i) => {
                    hasher.update([1u8]);
                    hasher.update((i as u64).to_le_bytes());
                }
                None => hasher.update([0u8]),
            }
        }

        let mut digest = [0u8; 32];
        digest.copy_from_slice(&hasher.finalize());
        Fingerprint(digest)
    }

    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", &self.to_hex()[..12])
    }
}

fn hash_value(hasher: &mut Sha256, value: &ParamValue) {
    match value {
        ParamValue::Number(n) => {
            hasher.update([1u8]);
            hasher.update(n.to_le_bytes());
        }
        ParamValue::Boolean(b) => hasher.update([2, *b as u8]),
        ParamValue::Text(s) => {
            hasher.update([3u8]);
            hasher.update((s.len() as u64).to_le_bytes());
            hasher.update(s.as_bytes());
        }
        ParamValue::Vector3(v) => {
            hasher.update([4u8]);
            for c in v {
                hasher.update(c.to_le_bytes());
            }
        }
        ParamValue::References(refs) => {
            hasher.update([5u8]);
            hasher.update((refs.len() as u64).to_le_bytes());
            for r in refs {
                hasher.update((*r as u64).to_le_bytes());
            }
        }
    }
}
