use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};

/// Synthesized speech for one sentence, base64-encoded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioClip {
    pub mime_type: String,
    pub data: String,
}

impl AudioClip {
    pub fn from_bytes(mime_type: &str, bytes: &[u8]) -> Self {
        Self {
            mime_type: mime_type.to_string(),
            data: STANDARD.encode(bytes),
        }
    }

    pub fn from_base64(mime_type: &str, data: String) -> Self {
        Self {
            mime_type: mime_type.to_string(),
            data,
        }
    }
}
