//! `StubTranscriber`: a canned backend with no real inference.
//!
//! Returns a fixed transcript (or a fixed failure) so the pipeline can be
//! exercised end-to-end without a speech model. An optional delay simulates
//! a slow backend for timeout handling.

use std::time::Duration;

use tracing::debug;

use crate::audio::AudioSignal;
use crate::error::{AnalysisError, Result};
use crate::text::Language;
use crate::transcription::{Transcriber, Transcript};

#[derive(Debug, Clone)]
pub struct StubTranscriber {
    outcome: std::result::Result<Transcript, String>,
    delay: Option<Duration>,
    calls: u32,
}

impl StubTranscriber {
    pub fn new(transcript: Transcript) -> Self {
        Self {
            outcome: Ok(transcript),
            delay: None,
            calls: 0,
        }
    }

    /// One segment covering the whole clip, whatever its length.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self::new(Transcript::from_text(text, f64::NAN))
    }

    /// Every call fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            outcome: Err(message.into()),
            delay: None,
            calls: 0,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> u32 {
        self.calls
    }
}

impl Transcriber for StubTranscriber {
    fn warm_up(&mut self) -> Result<()> {
        debug!("StubTranscriber::warm_up, no-op");
        Ok(())
    }

    fn transcribe(&mut self, signal: &AudioSignal, language: Language) -> Result<Transcript> {
        self.calls += 1;
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        debug!(call = self.calls, %language, "stub transcription");

        let mut transcript = self
            .outcome
            .clone()
            .map_err(AnalysisError::Transcription)?;
        // Open-ended segments stretch to the end of the clip.
        let duration = signal.duration_secs();
        for segment in &mut transcript.segments {
            if segment.end.is_nan() {
                segment.end = duration;
            }
        }
        Ok(transcript)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canned_text_spans_the_clip() {
        let mut stub = StubTranscriber::with_text("bom dia");
        let signal = AudioSignal::new(vec![0.0; 44_100], 22_050);
        let t = stub.transcribe(&signal, Language::PortugueseBr).expect("transcript");
        assert_eq!(t.text, "bom dia");
        assert_eq!(t.segments.len(), 1);
        assert_eq!(t.segments[0].end, 2.0);
        assert_eq!(stub.calls(), 1);
    }

    #[test]
    fn failing_stub_reports_transcription_error() {
        let mut stub = StubTranscriber::failing("backend offline");
        let signal = AudioSignal::new(vec![0.0; 100], 22_050);
        let err = stub
            .transcribe(&signal, Language::PortugueseBr)
            .expect_err("must fail");
        assert!(err.is_transcription());
        assert!(err.to_string().contains("backend offline"));
    }
}
