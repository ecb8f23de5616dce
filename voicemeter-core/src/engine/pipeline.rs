//! Staged analysis pipeline.
//!
//! ## Stages (per request)
//!
//! ```text
//! 1. Onsets        spectral flux over the log-mel spectrogram
//! 2. Voice mask    adaptive energy threshold over frame RMS
//! 3. Metrics       rate, pauses, pacing, levels, intelligibility
//! 4. Transcript    language, transcript rate, vocabulary, fluency
//! 5. Comparison    expected vs. transcribed text (when expected text is given)
//! 6. Scoring       sub-scores, weighted overall score, feedback
//! ```
//!
//! Stages 1–3 are CPU-bound and check the `CancelFlag` between steps.
//! Everything here is synchronous; the async entry point in `engine` runs
//! these functions on `spawn_blocking`.

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::{
    acoustic::{
        intelligibility, level, pacing, pause, rate, SpectralFluxOnsetDetector,
        VoiceActivitySegmenter,
    },
    audio::AudioSignal,
    cancel::CancelFlag,
    config::{AnalysisConfig, SpeakingProfile},
    error::{AnalysisError, Result},
    report::{
        AcousticMetrics, ComprehensiveAnalysisResult, ProfileSummary, TextComparisonResult,
        TranscriptAnalysis,
    },
    scoring::{self, feedback},
    text::{self, compare, fluency, language, vocabulary, Language},
    transcription::{Transcript, TranscriberHandle},
};

/// Everything the acoustic stages need, borrowed from the analyzer.
pub struct PipelineContext<'a> {
    pub config: &'a AnalysisConfig,
    pub segmenter: &'a dyn VoiceActivitySegmenter,
    pub cancel: &'a CancelFlag,
}

/// Stages 1–3.
///
/// # Errors
/// `Cancelled` if the flag is raised between stages.
pub fn analyze_acoustics(
    signal: &AudioSignal,
    ctx: &PipelineContext<'_>,
) -> Result<AcousticMetrics> {
    let cfg = ctx.config;
    let started = Instant::now();

    ctx.cancel.check()?;
    let onsets = SpectralFluxOnsetDetector::new(cfg.onset.clone()).detect(signal);
    debug!(onsets = onsets.len(), "onset detection done");

    ctx.cancel.check()?;
    let mask = ctx.segmenter.segment(signal);
    debug!(
        frames = mask.len(),
        active_ratio = mask.active_ratio(),
        threshold = mask.threshold,
        "voice activity mask built"
    );

    ctx.cancel.check()?;
    let speech_rate = rate::compute(&onsets, &mask, &cfg.rate);
    let pauses = pause::analyze(&mask, &cfg.pauses);
    let pacing = pacing::analyze(&onsets, speech_rate.syllables_per_word, &cfg.pacing);
    let intelligibility_score = intelligibility::estimate(
        speech_rate.articulation_rate,
        pacing.consistency_score,
        pauses.silence_ratio,
        &cfg.intelligibility,
    );
    let levels = level::measure(signal, cfg.vad.frame_length, cfg.vad.hop_length);

    if speech_rate.hybrid_fallback {
        warn!(
            retained = speech_rate.retained_onsets,
            onsets = speech_rate.onset_count,
            "voice mask dropped most onsets, articulation rate uses all of them"
        );
    }
    if !speech_rate.articulation_rate.is_finite() || !intelligibility_score.is_finite() {
        return Err(AnalysisError::Internal(
            "non-finite acoustic metric".to_string(),
        ));
    }

    info!(
        wpm = speech_rate.words_per_minute,
        pauses = pauses.total_pauses,
        consistency = pacing.consistency_score,
        intelligibility = intelligibility_score,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "acoustic analysis done"
    );

    Ok(AcousticMetrics {
        duration_seconds: signal.duration_secs(),
        sample_rate: signal.sample_rate,
        speech_rate,
        pauses,
        pacing,
        intelligibility_score,
        levels,
    })
}

/// Run the transcriber under its lock. Errors other than transcription
/// failures are wrapped so they stay recoverable.
pub fn transcribe(
    handle: &TranscriberHandle,
    signal: &AudioSignal,
    language: Language,
) -> Result<Transcript> {
    let started = Instant::now();
    let result = handle.0.lock().transcribe(signal, language);
    match result {
        Ok(transcript) if transcript.is_blank() => {
            warn!(
                elapsed_ms = started.elapsed().as_millis() as u64,
                "transcriber returned no text"
            );
            Ok(transcript)
        }
        Ok(transcript) => {
            info!(
                segments = transcript.segments.len(),
                chars = transcript.text.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "transcription done"
            );
            Ok(transcript)
        }
        Err(e) if e.is_transcription() => Err(e),
        Err(e) => Err(AnalysisError::Transcription(e.to_string())),
    }
}

/// Stage 4. `forced` is the caller's or the configuration's language. Without
/// it the transcriber's own language is used, then detection from the text.
pub fn analyze_transcript(
    transcript: &Transcript,
    total_duration: f64,
    forced: Option<Language>,
    config: &AnalysisConfig,
) -> TranscriptAnalysis {
    let detection = match forced.or(transcript.language) {
        Some(lang) => language::hinted(lang),
        None => text::detect_language(&transcript.text),
    };
    let lang = detection.language;

    let pause_duration = transcript.total_pause_duration(config.pauses.segment_min_gap_secs);
    let hesitations = transcript
        .pause_gaps(config.pauses.hesitation_gap_secs)
        .len();

    TranscriptAnalysis {
        text: transcript.text.clone(),
        segment_count: transcript.segments.len(),
        rate: text::rate::analyze(&transcript.text, total_duration, pause_duration),
        vocabulary: vocabulary::analyze(&transcript.text, lang, &config.text),
        fluency: fluency::analyze(&transcript.text, hesitations, total_duration, &config.fluency),
        language: detection,
    }
}

/// Stage 5. Skipped for blank expected text or a missing transcript.
pub fn compare_expected(
    expected: Option<&str>,
    transcript: Option<&Transcript>,
    language: Language,
    config: &AnalysisConfig,
) -> Option<TextComparisonResult> {
    let expected = expected.filter(|e| !e.trim().is_empty())?;
    let transcript = transcript?;
    Some(compare::compare_texts(
        expected,
        &transcript.text,
        language,
        &config.text,
    ))
}

/// Stages 4–6: fold the acoustic metrics and the transcription outcome into
/// the final record. `transcription` is `None` when no transcriber is set.
pub fn assemble(
    config: &AnalysisConfig,
    profile: &SpeakingProfile,
    acoustic: AcousticMetrics,
    transcription: Option<Result<Transcript>>,
    expected_text: Option<&str>,
    forced_language: Option<Language>,
) -> ComprehensiveAnalysisResult {
    let (transcript, transcription_error) = match transcription {
        Some(Ok(t)) => (Some(t), None),
        Some(Err(e)) => {
            warn!("transcription unavailable, continuing acoustic-only: {e}");
            (None, Some(e.to_string()))
        }
        None => (None, None),
    };

    let transcript_analysis = transcript
        .as_ref()
        .map(|t| analyze_transcript(t, acoustic.duration_seconds, forced_language, config));
    let language = transcript_analysis
        .as_ref()
        .map(|t| t.language.language)
        .or(forced_language)
        .unwrap_or_default();

    let comparison = compare_expected(expected_text, transcript.as_ref(), language, config);

    let wpm = acoustic.speech_rate.words_per_minute;
    let summary = ProfileSummary::new(profile, wpm);
    let scores = scoring::component_scores(
        wpm,
        &acoustic.pauses,
        config.pauses.max_acceptable_pause_secs,
        profile,
        transcript_analysis.as_ref(),
        comparison.as_ref(),
        &config.scoring,
    );
    let overall_score = scoring::overall(&scores, &config.scoring.weights());

    let fb = feedback::build(&feedback::FeedbackInput {
        language,
        profile: &summary,
        acoustic: &acoustic,
        transcript: transcript_analysis.as_ref(),
        comparison: comparison.as_ref(),
        transcription_failed: transcription_error.is_some(),
        max_acceptable_pause: config.pauses.max_acceptable_pause_secs,
    });

    info!(
        profile = profile.key.as_str(),
        policy = config.scoring.policy.as_str(),
        overall = overall_score,
        has_transcript = transcript_analysis.is_some(),
        has_comparison = comparison.is_some(),
        "analysis scored"
    );

    ComprehensiveAnalysisResult {
        profile: summary,
        language,
        acoustic,
        transcript: transcript_analysis,
        comparison,
        transcription_error,
        scores,
        scoring_policy: config.scoring.policy,
        overall_score,
        feedback: fb.items,
        recommendations: fb.recommendations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acoustic::{onset::tests::rhythmic_signal, AdaptiveEnergyVad};
    use crate::transcription::{StubTranscriber, TranscriptSegment};
    use approx::assert_relative_eq;

    fn acoustic_for(signal: &AudioSignal, config: &AnalysisConfig) -> AcousticMetrics {
        let vad = AdaptiveEnergyVad::new(config.vad.clone());
        let cancel = CancelFlag::new();
        let ctx = PipelineContext {
            config,
            segmenter: &vad,
            cancel: &cancel,
        };
        analyze_acoustics(signal, &ctx).expect("acoustic analysis")
    }

    #[test]
    fn continuous_rhythmic_clip_is_penalized_for_low_silence() {
        let config = AnalysisConfig::default();
        let signal = rhythmic_signal(10.0, 3.0, 22_050);
        let m = acoustic_for(&signal, &config);

        assert!(m.pauses.silence_ratio < 0.05, "{}", m.pauses.silence_ratio);
        assert!(m.pacing.consistency_score > 80.0, "{}", m.pacing.consistency_score);
        assert!(m.speech_rate.onset_count >= 20);
        // × 0.85 for the silence ratio, plus at most small rate/pacing penalties.
        assert!(m.intelligibility_score <= 85.0 + 1e-9, "{}", m.intelligibility_score);
        assert!(m.intelligibility_score > 60.0, "{}", m.intelligibility_score);
    }

    #[test]
    fn silent_clip_has_zero_rates() {
        let config = AnalysisConfig::default();
        let signal = AudioSignal::new(vec![0.0; 22_050 * 2], 22_050);
        let m = acoustic_for(&signal, &config);
        assert_eq!(m.speech_rate.onset_count, 0);
        assert_eq!(m.speech_rate.speaking_rate, 0.0);
        assert_eq!(m.speech_rate.articulation_rate, 0.0);
        assert_eq!(m.pacing.consistency_score, 100.0);
    }

    #[test]
    fn raised_flag_stops_the_pipeline() {
        let config = AnalysisConfig::default();
        let vad = AdaptiveEnergyVad::new(config.vad.clone());
        let cancel = CancelFlag::new();
        cancel.cancel();
        let ctx = PipelineContext {
            config: &config,
            segmenter: &vad,
            cancel: &cancel,
        };
        let signal = AudioSignal::new(vec![0.0; 22_050], 22_050);
        assert!(matches!(
            analyze_acoustics(&signal, &ctx),
            Err(AnalysisError::Cancelled)
        ));
    }

    #[test]
    fn transcript_analysis_uses_segment_gaps() {
        let config = AnalysisConfig::default();
        let transcript = Transcript {
            text: "Bom dia a todos. Hoje vamos falar de voz.".into(),
            language: None,
            segments: vec![
                TranscriptSegment {
                    text: "Bom dia a todos.".into(),
                    start: 0.0,
                    end: 2.0,
                },
                TranscriptSegment {
                    text: "Hoje vamos falar de voz.".into(),
                    start: 4.5,
                    end: 6.0,
                },
            ],
        };
        let t = analyze_transcript(&transcript, 6.0, None, &config);
        assert_eq!(t.segment_count, 2);
        assert_eq!(t.language.language, Language::PortugueseBr);
        assert_relative_eq!(t.rate.pause_duration_seconds, 2.5);
        assert_eq!(t.fluency.hesitation_count, 1);
        assert_relative_eq!(t.fluency.hesitation_rate, 10.0);
    }

    #[test]
    fn transcriber_language_beats_detection() {
        let config = AnalysisConfig::default();
        let mut transcript = Transcript::from_text("bom dia a todos", 2.0);
        transcript.language = Some(Language::EnglishUs);
        let t = analyze_transcript(&transcript, 2.0, None, &config);
        assert_eq!(t.language.language, Language::EnglishUs);

        let t = analyze_transcript(&transcript, 2.0, Some(Language::PortugueseBr), &config);
        assert_eq!(t.language.language, Language::PortugueseBr);
    }

    #[test]
    fn blank_transcript_is_passed_through() {
        let handle = TranscriberHandle::new(StubTranscriber::with_text("   "));
        let signal = AudioSignal::new(vec![0.0; 22_050], 22_050);
        let transcript = transcribe(&handle, &signal, Language::PortugueseBr).expect("transcript");
        assert!(transcript.is_blank());

        let failing = TranscriberHandle::new(StubTranscriber::failing("offline"));
        assert!(matches!(
            transcribe(&failing, &signal, Language::PortugueseBr),
            Err(AnalysisError::Transcription(_))
        ));
    }

    #[test]
    fn blank_expected_text_skips_comparison() {
        let config = AnalysisConfig::default();
        let transcript = Transcript::from_text("olá", 1.0);
        for expected in [None, Some(""), Some("   ")] {
            let result = compare_expected(expected, Some(&transcript), Language::PortugueseBr, &config);
            assert!(result.is_none());
        }
        let pt = Language::PortugueseBr;
        assert!(compare_expected(Some("olá"), None, pt, &config).is_none());
        assert!(compare_expected(Some("olá"), Some(&transcript), pt, &config).is_some());
    }

    #[test]
    fn failed_transcription_yields_acoustic_only_result() {
        let config = AnalysisConfig::default();
        let signal = rhythmic_signal(3.0, 3.0, 22_050);
        let acoustic = acoustic_for(&signal, &config);
        let profile = config.profiles.get("presentation").expect("profile");
        let result = assemble(
            &config,
            profile,
            acoustic,
            Some(Err(AnalysisError::Transcription("offline".into()))),
            Some("texto esperado"),
            None,
        );
        assert!(result.transcript.is_none());
        assert!(result.comparison.is_none());
        assert!(result.transcription_error.as_deref().unwrap_or("").contains("offline"));
        assert!(result.scores.vocabulary.is_none());
        assert!((0.0..=100.0).contains(&result.overall_score));
        assert!(result
            .feedback
            .iter()
            .any(|f| f.category == crate::report::FeedbackCategory::Transcription));
    }
}
