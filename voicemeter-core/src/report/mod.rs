//! Result records handed back to the caller.
//!
//! All types derive `serde::Serialize` + `serde::Deserialize` with camelCase
//! field names. Optional groups are `Option<T>` and serialize as `null`, so
//! every key is present whether or not a transcript was available.

pub mod acoustic;
pub mod analysis;
pub mod text;

pub use acoustic::{
    AcousticMetrics, LevelMetrics, PacingVariation, PauseMetrics, PauseSegment,
    RateClassification, SpeechRateMetrics,
};
pub use analysis::{
    ComponentScores, ComprehensiveAnalysisResult, FeedbackCategory, FeedbackItem, ProfileSummary,
    Severity, SpeechAnalysisSummary,
};
pub use text::{
    FluencyMetrics, LanguageDetection, MispronouncedWord, TextComparisonResult,
    TranscriptAnalysis, TranscriptRateClass, TranscriptRateMetrics, VocabularyLevel,
    VocabularyMetrics,
};
