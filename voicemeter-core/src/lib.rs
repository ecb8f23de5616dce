//! # voicemeter
//!
//! Speech-delivery analysis: how fast, how fluently and how clearly a clip
//! was spoken, judged against a speaking profile.
//!
//! ## Architecture
//!
//! ```text
//! bytes → AudioDecoder → prepare (validate, resample)
//!                               │
//!              ┌────────────────┴────────────────┐
//!       acoustic stages                    Transcriber (optional, timed)
//!   onsets · voice mask · rate               │
//!   pauses · pacing · levels          transcript analysis
//!              └────────────────┬────────────────┘
//!                   scoring + feedback
//!                               │
//!                ComprehensiveAnalysisResult
//! ```
//!
//! Acoustic metrics never depend on the transcript. A failed or slow
//! transcriber downgrades the result to acoustic-only instead of failing it.

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod acoustic;
pub mod audio;
pub mod cancel;
pub mod config;
pub mod engine;
pub mod error;
pub mod report;
pub mod scoring;
pub mod text;
pub mod transcription;

// Convenience re-exports for downstream crates
pub use audio::{AudioDecoder, AudioSignal, WavDecoder};
pub use cancel::CancelFlag;
pub use config::{load_config, AnalysisConfig, ProfileCatalog, SpeakingProfile};
pub use engine::{AnalysisOptions, AnalysisRequest, SpeechAnalyzer};
pub use error::{AnalysisError, Result};
pub use report::{
    AcousticMetrics, ComprehensiveAnalysisResult, FeedbackItem, SpeechAnalysisSummary,
    TextComparisonResult, TranscriptAnalysis,
};
pub use scoring::{ScoringPolicy, ScoringWeights};
pub use text::Language;
pub use transcription::{StubTranscriber, Transcriber, TranscriberHandle, Transcript};
