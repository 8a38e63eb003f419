use parrot_types::ValidationError;
use thiserror::Error;

/// Failure of a call to the speech provider.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SynthesisError {
    /// Overload, rate limiting or a network-level failure. Eligible for retry.
    #[error("transient provider error{}: {message}", fmt_status(.status))]
    Transient {
        status: Option<u16>,
        message: String,
    },

    /// The provider rejected the request; retrying will not help.
    #[error("provider rejected request{}: {message}", fmt_status(.status))]
    Permanent {
        status: Option<u16>,
        message: String,
    },

    #[error("provider call timed out after {0} seconds")]
    Timeout(u64),
}

fn fmt_status(status: &Option<u16>) -> String {
    status.map(|s| format!(" (status {})", s)).unwrap_or_default()
}

impl SynthesisError {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }

    /// Stable label used in logs and error responses.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transient { .. } => "transient_provider_error",
            Self::Permanent { .. } => "permanent_provider_error",
            Self::Timeout(_) => "timeout",
        }
    }
}

/// Failure reading or writing a cached artifact.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure transcoding audio to the telephony format.
#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("failed to spawn transcoder: {0}")]
    Spawn(std::io::Error),

    #[error("transcoder scratch I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("transcoder exited with {0}")]
    Failed(String),

    #[error("transcoder timed out after {0} seconds")]
    TimedOut(u64),

    #[error("transcoder produced no output")]
    MissingOutput,
}

/// Terminal failure of one pipeline run.
///
/// Cache and conversion failures never appear here: the pipeline degrades
/// around them.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("invalid request: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Synthesis(#[from] SynthesisError),

    #[error("internal error: {0}")]
    Internal(String),
}
