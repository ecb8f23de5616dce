//! `SpeechAnalyzer`: the analysis service the host constructs once.
//!
//! ## Lifecycle
//!
//! ```text
//! SpeechAnalyzer::new(config, decoder, transcriber)
//!     └─► warm_up()                    → transcriber ready (optional)
//!         └─► analyze(request).await   → one ComprehensiveAnalysisResult per call
//! ```
//!
//! The analyzer holds no per-request state; share it as `Arc<SpeechAnalyzer>`.
//!
//! ## Threading
//!
//! `analyze` runs the acoustic stages and the transcriber concurrently, each
//! on `spawn_blocking`. The transcriber is bounded by a `tokio::time::timeout`;
//! a timeout or failure degrades to an acoustic-only result. Dropping the
//! returned future raises the request's `CancelFlag`, which stops the
//! acoustic stages at the next stage boundary.

pub mod pipeline;

use std::sync::Arc;

use tracing::{info, info_span, warn, Instrument};

use crate::{
    acoustic::{AdaptiveEnergyVad, VoiceActivitySegmenter},
    audio::{self, AudioDecoder, AudioSignal},
    cancel::CancelFlag,
    config::{AnalysisConfig, ProfileCatalog},
    error::{AnalysisError, Result},
    report::ComprehensiveAnalysisResult,
    text::Language,
    transcription::TranscriberHandle,
};

/// Per-request options.
#[derive(Debug, Clone, Default)]
pub struct AnalysisOptions {
    /// Speaking profile key, e.g. `"presentation"`.
    pub profile: String,
    /// Text the speaker meant to say; blank means no comparison.
    pub expected_text: Option<String>,
    /// Language hint such as `"pt-BR"` or `"en"`; overrides configuration.
    pub language_hint: Option<String>,
}

impl AnalysisOptions {
    pub fn new(profile: impl Into<String>) -> Self {
        Self {
            profile: profile.into(),
            ..Self::default()
        }
    }

    pub fn with_expected_text(mut self, text: impl Into<String>) -> Self {
        self.expected_text = Some(text.into());
        self
    }

    pub fn with_language(mut self, hint: impl Into<String>) -> Self {
        self.language_hint = Some(hint.into());
        self
    }
}

/// An uploaded clip plus its options.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub audio: Vec<u8>,
    pub options: AnalysisOptions,
}

impl AnalysisRequest {
    pub fn new(audio: Vec<u8>, options: AnalysisOptions) -> Self {
        Self { audio, options }
    }
}

pub struct SpeechAnalyzer {
    config: AnalysisConfig,
    decoder: Arc<dyn AudioDecoder>,
    segmenter: Arc<dyn VoiceActivitySegmenter>,
    transcriber: Option<TranscriberHandle>,
}

impl SpeechAnalyzer {
    /// Build an analyzer with the default energy-based voice segmenter.
    /// Without a transcriber every result is acoustic-only.
    pub fn new(
        config: AnalysisConfig,
        decoder: Arc<dyn AudioDecoder>,
        transcriber: Option<TranscriberHandle>,
    ) -> Self {
        let segmenter = Arc::new(AdaptiveEnergyVad::new(config.vad.clone()));
        Self {
            config,
            decoder,
            segmenter,
            transcriber,
        }
    }

    /// Replace the voice-activity segmenter.
    pub fn with_segmenter(mut self, segmenter: Arc<dyn VoiceActivitySegmenter>) -> Self {
        self.segmenter = segmenter;
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn profiles(&self) -> &ProfileCatalog {
        &self.config.profiles
    }

    /// Warm up the transcriber, if any.
    pub fn warm_up(&self) -> Result<()> {
        if let Some(handle) = &self.transcriber {
            info!("warming up transcriber");
            handle.0.lock().warm_up()?;
            info!("transcriber ready");
        }
        Ok(())
    }

    /// Decode and analyze on the calling thread. The transcriber is called
    /// without a timeout.
    ///
    /// # Errors
    /// Validation errors (`EmptyPayload`, `Decode`, `AudioTooShort`,
    /// `UnknownProfile`), `Cancelled`, or `Internal`.
    pub fn analyze_bytes(
        &self,
        request: &AnalysisRequest,
        cancel: &CancelFlag,
    ) -> Result<ComprehensiveAnalysisResult> {
        let options = &request.options;
        let span = info_span!("analysis", profile = options.profile.as_str());
        let _guard = span.enter();

        self.config.profiles.get(&options.profile)?;
        let signal = audio::prepare_bytes(&request.audio, self.decoder.as_ref(), &self.config.audio)?;
        self.analyze_prepared(&signal, options, cancel)
    }

    /// Analyze an already decoded clip on the calling thread.
    pub fn analyze_signal(
        &self,
        signal: AudioSignal,
        options: &AnalysisOptions,
        cancel: &CancelFlag,
    ) -> Result<ComprehensiveAnalysisResult> {
        let span = info_span!("analysis", profile = options.profile.as_str());
        let _guard = span.enter();

        self.config.profiles.get(&options.profile)?;
        let signal = audio::prepare_signal(signal, &self.config.audio)?;
        self.analyze_prepared(&signal, options, cancel)
    }

    fn analyze_prepared(
        &self,
        signal: &AudioSignal,
        options: &AnalysisOptions,
        cancel: &CancelFlag,
    ) -> Result<ComprehensiveAnalysisResult> {
        let profile = self.config.profiles.get(&options.profile)?;
        let forced = self.forced_language(options);

        let acoustic = pipeline::analyze_acoustics(signal, &self.context(cancel))?;
        let transcription = self
            .transcriber
            .as_ref()
            .map(|handle| pipeline::transcribe(handle, signal, forced.unwrap_or_default()));
        cancel.check()?;

        Ok(pipeline::assemble(
            &self.config,
            profile,
            acoustic,
            transcription,
            options.expected_text.as_deref(),
            forced,
        ))
    }

    /// Full analysis with concurrent transcription and a transcription
    /// timeout. Dropping the future cancels the acoustic stages.
    ///
    /// # Errors
    /// As `analyze_bytes`. Transcription failures and timeouts never escape;
    /// they are reported in `transcription_error`.
    pub async fn analyze(
        self: Arc<Self>,
        request: AnalysisRequest,
    ) -> Result<ComprehensiveAnalysisResult> {
        let span = info_span!("analysis", profile = request.options.profile.as_str());
        self.run(request).instrument(span).await
    }

    async fn run(
        self: Arc<Self>,
        request: AnalysisRequest,
    ) -> Result<ComprehensiveAnalysisResult> {
        let AnalysisRequest { audio, options } = request;
        self.config.profiles.get(&options.profile)?;

        let cancel = CancelFlag::new();
        let mut guard = CancelOnDrop::new(cancel.clone());

        let analyzer = Arc::clone(&self);
        let signal = tokio::task::spawn_blocking(move || {
            audio::prepare_bytes(&audio, analyzer.decoder.as_ref(), &analyzer.config.audio)
        })
        .await
        .map_err(|e| AnalysisError::Internal(format!("decode task failed: {e}")))??;
        let signal = Arc::new(signal);
        let forced = self.forced_language(&options);

        let acoustic_task = {
            let analyzer = Arc::clone(&self);
            let signal = Arc::clone(&signal);
            let cancel = cancel.clone();
            tokio::task::spawn_blocking(move || {
                pipeline::analyze_acoustics(&signal, &analyzer.context(&cancel))
            })
        };

        let transcription = async {
            let Some(handle) = self.transcriber.clone() else {
                return None;
            };
            let signal = Arc::clone(&signal);
            let language = forced.unwrap_or_default();
            let limit = self.config.transcription.timeout();
            let task = tokio::task::spawn_blocking(move || {
                pipeline::transcribe(&handle, &signal, language)
            });
            let outcome: Result<_> = match tokio::time::timeout(limit, task).await {
                Ok(Ok(result)) => result,
                Ok(Err(e)) => Err(AnalysisError::Transcription(format!(
                    "transcriber task failed: {e}"
                ))),
                Err(_) => {
                    warn!(timeout_secs = limit.as_secs_f64(), "transcription timed out");
                    Err(AnalysisError::TranscriptionTimeout(limit))
                }
            };
            Some(outcome)
        };

        let (acoustic, transcription) = tokio::join!(acoustic_task, transcription);
        let acoustic =
            acoustic.map_err(|e| AnalysisError::Internal(format!("acoustic task failed: {e}")))??;
        cancel.check()?;
        guard.disarm();

        let profile = self.config.profiles.get(&options.profile)?;
        Ok(pipeline::assemble(
            &self.config,
            profile,
            acoustic,
            transcription,
            options.expected_text.as_deref(),
            forced,
        ))
    }

    fn context<'a>(&'a self, cancel: &'a CancelFlag) -> pipeline::PipelineContext<'a> {
        pipeline::PipelineContext {
            config: &self.config,
            segmenter: self.segmenter.as_ref(),
            cancel,
        }
    }

    /// Request hint first, then configuration; `None` means detect.
    fn forced_language(&self, options: &AnalysisOptions) -> Option<Language> {
        options
            .language_hint
            .as_deref()
            .map(str::trim)
            .filter(|h| !h.is_empty() && !h.eq_ignore_ascii_case("auto"))
            .map(Language::from_hint)
            .or(self.config.text.language)
    }
}

impl std::fmt::Debug for SpeechAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechAnalyzer")
            .field("policy", &self.config.scoring.policy)
            .field("has_transcriber", &self.transcriber.is_some())
            .finish_non_exhaustive()
    }
}

/// Raises the flag when the owning future is dropped before completion.
struct CancelOnDrop {
    flag: CancelFlag,
    armed: bool,
}

impl CancelOnDrop {
    fn new(flag: CancelFlag) -> Self {
        Self { flag, armed: true }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        if self.armed {
            self.flag.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::WavDecoder;

    fn analyzer() -> SpeechAnalyzer {
        SpeechAnalyzer::new(AnalysisConfig::default(), Arc::new(WavDecoder), None)
    }

    #[test]
    fn language_hint_beats_configuration() {
        let mut config = AnalysisConfig::default();
        config.text.language = Some(Language::PortugueseBr);
        let a = SpeechAnalyzer::new(config, Arc::new(WavDecoder), None);
        assert_eq!(
            a.forced_language(&AnalysisOptions::new("pitch").with_language("en")),
            Some(Language::EnglishUs)
        );
        assert_eq!(
            a.forced_language(&AnalysisOptions::new("pitch").with_language("auto")),
            Some(Language::PortugueseBr)
        );
        assert_eq!(analyzer().forced_language(&AnalysisOptions::new("pitch")), None);
    }

    #[test]
    fn empty_payload_is_rejected() {
        let request = AnalysisRequest::new(Vec::new(), AnalysisOptions::new("presentation"));
        let err = analyzer()
            .analyze_bytes(&request, &CancelFlag::new())
            .expect_err("must fail");
        assert!(matches!(err, AnalysisError::EmptyPayload));
    }

    #[test]
    fn cancel_guard_only_fires_when_armed() {
        let flag = CancelFlag::new();
        drop(CancelOnDrop::new(flag.clone()));
        assert!(flag.is_cancelled());

        let flag = CancelFlag::new();
        let mut guard = CancelOnDrop::new(flag.clone());
        guard.disarm();
        drop(guard);
        assert!(!flag.is_cancelled());
    }
}
