//! Transcription collaborator abstraction.
//!
//! The `Transcriber` trait decouples the analysis pipeline from whatever
//! speech-to-text backend the host runs (a local Whisper, a remote API, the
//! stub used in tests).
//!
//! `transcribe` takes `&mut self` because real decoders are stateful. All
//! calls are serialised through `TranscriberHandle`'s `parking_lot::Mutex`.

pub mod stub;

pub use stub::StubTranscriber;

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::audio::AudioSignal;
use crate::error::Result;
use crate::text::Language;

/// Contract for speech-to-text backends.
pub trait Transcriber: Send + 'static {
    /// One-time warm-up (load weights, allocate caches). Called by the host
    /// before the first request.
    ///
    /// # Errors
    /// Returns an error if the backend cannot be brought up.
    fn warm_up(&mut self) -> Result<()>;

    /// Transcribe a whole clip.
    ///
    /// # Errors
    /// Any backend failure, reported as `AnalysisError::Transcription`. The
    /// pipeline turns it into an acoustic-only result.
    fn transcribe(&mut self, signal: &AudioSignal, language: Language) -> Result<Transcript>;
}

/// Thread-safe reference-counted handle to any `Transcriber`.
#[derive(Clone)]
pub struct TranscriberHandle(pub Arc<Mutex<dyn Transcriber>>);

impl TranscriberHandle {
    pub fn new<T: Transcriber>(transcriber: T) -> Self {
        Self(Arc::new(Mutex::new(transcriber)))
    }
}

impl std::fmt::Debug for TranscriberHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranscriberHandle").finish_non_exhaustive()
    }
}

/// A time-stamped piece of transcript, seconds from the clip start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptSegment {
    pub text: String,
    pub start: f64,
    pub end: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transcript {
    pub text: String,
    /// Language reported by the backend, if any.
    pub language: Option<Language>,
    pub segments: Vec<TranscriptSegment>,
}

impl Transcript {
    /// Single-segment transcript spanning `[0, duration]`.
    pub fn from_text(text: impl Into<String>, duration: f64) -> Self {
        let text = text.into();
        Self {
            segments: vec![TranscriptSegment {
                text: text.clone(),
                start: 0.0,
                end: duration,
            }],
            text,
            language: None,
        }
    }

    /// Gaps between consecutive segments that last at least `min_secs`.
    pub fn pause_gaps(&self, min_secs: f64) -> Vec<f64> {
        self.segments
            .windows(2)
            .map(|pair| pair[1].start - pair[0].end)
            .filter(|gap| *gap >= min_secs)
            .collect()
    }

    pub fn total_pause_duration(&self, min_secs: f64) -> f64 {
        self.pause_gaps(min_secs).iter().sum()
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn segment(text: &str, start: f64, end: f64) -> TranscriptSegment {
        TranscriptSegment {
            text: text.into(),
            start,
            end,
        }
    }

    #[test]
    fn gaps_below_floor_are_ignored() {
        let t = Transcript {
            text: "um dois tres quatro".into(),
            language: None,
            segments: vec![
                segment("um", 0.0, 1.0),
                segment("dois", 1.1, 2.0),
                segment("tres", 2.5, 3.0),
                segment("quatro", 5.5, 6.0),
            ],
        };
        let gaps = t.pause_gaps(0.25);
        assert_eq!(gaps.len(), 2);
        assert_relative_eq!(gaps[0], 0.5);
        assert_relative_eq!(gaps[1], 2.5);
        assert_relative_eq!(t.total_pause_duration(0.25), 3.0);
        assert_eq!(t.pause_gaps(2.0).len(), 1);
    }

    #[test]
    fn single_segment_has_no_gaps() {
        let t = Transcript::from_text("olá", 3.0);
        assert!(t.pause_gaps(0.0).is_empty());
        assert_eq!(t.total_pause_duration(0.25), 0.0);
        assert!(!t.is_blank());
        assert!(Transcript::default().is_blank());
    }

    #[test]
    fn serializes_camel_case() {
        let t = Transcript::from_text("oi", 1.0);
        let json = serde_json::to_value(&t).expect("serialize");
        assert_eq!(json["segments"][0]["end"], 1.0);
        assert!(json["language"].is_null());
    }
}
