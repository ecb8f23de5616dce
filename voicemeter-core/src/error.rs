use std::time::Duration;

use thiserror::Error;

/// All errors produced by voicemeter-core.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("audio payload is empty")]
    EmptyPayload,

    #[error("could not decode audio: {0}")]
    Decode(String),

    #[error("audio too short: {duration_secs:.2}s (at least {min_secs:.1}s of speech required)")]
    AudioTooShort { duration_secs: f64, min_secs: f64 },

    #[error("unknown speaking profile '{0}'")]
    UnknownProfile(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("transcription failed: {0}")]
    Transcription(String),

    #[error("transcription timed out after {0:?}")]
    TranscriptionTimeout(Duration),

    #[error("analysis cancelled")]
    Cancelled,

    #[error("internal computation error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AnalysisError {
    /// Caller-side input problems: the request is rejected as-is, retrying is pointless.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            AnalysisError::EmptyPayload
                | AnalysisError::Decode(_)
                | AnalysisError::AudioTooShort { .. }
                | AnalysisError::UnknownProfile(_)
                | AnalysisError::InvalidConfig(_)
        )
    }

    /// Failures of the transcription collaborator. The pipeline downgrades these
    /// to an acoustic-only result instead of failing the request.
    pub fn is_transcription(&self) -> bool {
        matches!(
            self,
            AnalysisError::Transcription(_) | AnalysisError::TranscriptionTimeout(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
