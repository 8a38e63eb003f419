//! Audio format definitions.
//!
//! Every cached artifact and every response body is in one of two formats:
//! the provider's compressed output, or the telephony waveform produced by
//! transcoding it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Format of a stored or returned audio blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioFormat {
    /// Compressed audio as returned by the provider (MPEG).
    Primary,
    /// 16 kHz mono signed 16-bit linear PCM in a WAV container.
    Telephony,
}

impl AudioFormat {
    /// MIME type used for the HTTP `Content-Type` header.
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Primary => "audio/mpeg",
            Self::Telephony => "audio/wav",
        }
    }

    /// File extension of the cached artifact.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Primary => "mp3",
            Self::Telephony => "wav",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Telephony => "telephony",
        }
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
