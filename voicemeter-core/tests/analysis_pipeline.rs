use std::f32::consts::PI;
use std::io::Cursor;
use std::sync::Arc;
use std::time::{Duration, Instant};

use voicemeter::{
    AnalysisConfig, AnalysisError, AnalysisOptions, AnalysisRequest, CancelFlag, Language,
    ScoringPolicy, SpeechAnalyzer, StubTranscriber, TranscriberHandle, WavDecoder,
};

const SR: u32 = 22_050;

/// Steady 220 Hz carrier with a short 1.5 kHz burst `rate` times per second.
fn rhythmic_samples(seconds: f32, rate: f32) -> Vec<f32> {
    let n = (seconds * SR as f32) as usize;
    let period = 1.0 / rate;
    (0..n)
        .map(|i| {
            let t = i as f32 / SR as f32;
            let carrier = 0.4 * (2.0 * PI * 220.0 * t).sin();
            let phase = (t - 0.1).rem_euclid(period);
            let burst = if t >= 0.1 && phase < 0.06 {
                0.3 * (2.0 * PI * 1500.0 * t).sin()
            } else {
                0.0
            };
            carrier + burst
        })
        .collect()
}

fn wav(samples: &[f32]) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: SR,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).expect("wav writer");
        for s in samples {
            writer
                .write_sample((s.clamp(-1.0, 1.0) * 32767.0) as i16)
                .expect("write sample");
        }
        writer.finalize().expect("finalize wav");
    }
    cursor.into_inner()
}

fn analyzer_with(config: AnalysisConfig, transcriber: Option<StubTranscriber>) -> Arc<SpeechAnalyzer> {
    Arc::new(SpeechAnalyzer::new(
        config,
        Arc::new(WavDecoder),
        transcriber.map(TranscriberHandle::new),
    ))
}

fn request(seconds: f32, options: AnalysisOptions) -> AnalysisRequest {
    AnalysisRequest::new(wav(&rhythmic_samples(seconds, 3.0)), options)
}

#[tokio::test]
async fn continuous_rhythmic_clip_without_transcriber_is_acoustic_only() {
    let analyzer = analyzer_with(AnalysisConfig::default(), None);
    let result = analyzer
        .analyze(request(10.0, AnalysisOptions::new("presentation")))
        .await
        .expect("analysis");

    let acoustic = &result.acoustic;
    assert!(acoustic.pauses.silence_ratio < 0.05, "{}", acoustic.pauses.silence_ratio);
    assert!(acoustic.pacing.consistency_score > 80.0);
    assert!(acoustic.intelligibility_score <= 85.0 + 1e-9);
    assert!(acoustic.speech_rate.onset_count >= 20);

    assert!(result.transcript.is_none());
    assert!(result.comparison.is_none());
    assert!(result.transcription_error.is_none());
    assert!(result.scores.vocabulary.is_none());
    assert_eq!(result.scoring_policy, ScoringPolicy::BalancedV1);
    assert_eq!(result.profile.key, "presentation");
    assert!((0.0..=100.0).contains(&result.overall_score));
}

#[tokio::test]
async fn expected_text_is_compared_against_the_transcript() {
    let mut config = AnalysisConfig::default();
    config.scoring.policy = ScoringPolicy::PronunciationV2;
    let analyzer = analyzer_with(
        config,
        Some(StubTranscriber::with_text("o rato roeu a ropa do rei de roma")),
    );

    let options = AnalysisOptions::new("conversation")
        .with_expected_text("O rato roeu a roupa do rei de Roma")
        .with_language("pt-BR");
    let result = analyzer.analyze(request(4.0, options)).await.expect("analysis");

    let comparison = result.comparison.as_ref().expect("comparison");
    assert_eq!(comparison.pronunciation_score, 99.0);
    assert_eq!(comparison.mispronounced_words.len(), 1);
    assert_eq!(comparison.mispronounced_words[0].expected, "roupa");
    assert_eq!(comparison.mispronounced_words[0].heard, "ropa");
    assert!(comparison.missing_words.is_empty());
    assert!(comparison.extra_words.is_empty());

    assert_eq!(result.language, Language::PortugueseBr);
    assert_eq!(result.scores.pronunciation, Some(99.0));
    assert!(result.scores.fluency.is_some());
    assert_eq!(result.scoring_policy, ScoringPolicy::PronunciationV2);
    let transcript = result.transcript.as_ref().expect("transcript");
    assert_eq!(transcript.vocabulary.total_words, 9);
}

#[tokio::test]
async fn blank_expected_text_skips_comparison() {
    let analyzer = analyzer_with(
        AnalysisConfig::default(),
        Some(StubTranscriber::with_text("bom dia a todos")),
    );
    let options = AnalysisOptions::new("pitch").with_expected_text("   ");
    let result = analyzer.analyze(request(3.0, options)).await.expect("analysis");

    assert!(result.comparison.is_none());
    assert!(result.scores.pronunciation.is_none());
    assert!(result.transcript.is_some());
    assert!(result.acoustic.duration_seconds > 2.9);
    assert!(result.acoustic.speech_rate.onset_count > 0);
}

#[tokio::test]
async fn failing_transcriber_degrades_to_acoustic_only() {
    let analyzer = analyzer_with(
        AnalysisConfig::default(),
        Some(StubTranscriber::failing("recognizer offline")),
    );
    let options = AnalysisOptions::new("presentation").with_expected_text("bom dia");
    let result = analyzer.analyze(request(3.0, options)).await.expect("analysis");

    let error = result.transcription_error.as_deref().expect("error recorded");
    assert!(error.contains("recognizer offline"), "{error}");
    assert!(result.transcript.is_none());
    assert!(result.comparison.is_none());
    assert!(result.acoustic.speech_rate.onset_count > 0);
}

#[tokio::test]
async fn slow_transcriber_times_out() {
    let mut config = AnalysisConfig::default();
    config.transcription.timeout_secs = 0.3;
    let analyzer = analyzer_with(
        config,
        Some(StubTranscriber::with_text("bom dia").with_delay(Duration::from_secs(2))),
    );

    let started = Instant::now();
    let result = analyzer
        .analyze(request(3.0, AnalysisOptions::new("presentation")))
        .await
        .expect("analysis");

    assert!(started.elapsed() < Duration::from_secs(2));
    let error = result.transcription_error.as_deref().expect("timeout recorded");
    assert!(error.contains("timed out"), "{error}");
    assert!(result.transcript.is_none());
}

#[tokio::test]
async fn validation_errors_reject_the_request() {
    let analyzer = analyzer_with(AnalysisConfig::default(), None);

    let empty = AnalysisRequest::new(Vec::new(), AnalysisOptions::new("presentation"));
    let err = Arc::clone(&analyzer).analyze(empty).await.expect_err("empty");
    assert!(matches!(err, AnalysisError::EmptyPayload));

    let short = request(0.5, AnalysisOptions::new("presentation"));
    let err = Arc::clone(&analyzer).analyze(short).await.expect_err("short");
    assert!(matches!(err, AnalysisError::AudioTooShort { .. }), "{err}");

    let garbage = AnalysisRequest::new(b"not a wav file".to_vec(), AnalysisOptions::new("pitch"));
    let err = Arc::clone(&analyzer).analyze(garbage).await.expect_err("garbage");
    assert!(matches!(err, AnalysisError::Decode(_)), "{err}");

    let unknown = request(2.0, AnalysisOptions::new("keynote"));
    let err = analyzer.analyze(unknown).await.expect_err("profile");
    assert!(matches!(err, AnalysisError::UnknownProfile(ref key) if key == "keynote"));
    assert!(err.is_validation());
}

#[test]
fn sync_entry_point_honours_cancellation() {
    let analyzer = analyzer_with(AnalysisConfig::default(), None);
    let req = request(2.0, AnalysisOptions::new("presentation"));

    let cancel = CancelFlag::new();
    cancel.cancel();
    let err = analyzer.analyze_bytes(&req, &cancel).expect_err("cancelled");
    assert!(matches!(err, AnalysisError::Cancelled));

    let result = analyzer
        .analyze_bytes(&req, &CancelFlag::new())
        .expect("analysis");
    assert!(result.acoustic.speech_rate.onset_count > 0);
}

#[test]
fn result_serializes_with_null_optional_groups() {
    let analyzer = analyzer_with(AnalysisConfig::default(), None);
    let req = request(2.0, AnalysisOptions::new("other"));
    let result = analyzer.analyze_bytes(&req, &CancelFlag::new()).expect("analysis");

    let json = serde_json::to_value(&result).expect("serialize");
    assert!(json["transcript"].is_null());
    assert!(json["comparison"].is_null());
    assert_eq!(json["scoringPolicy"], "balanced_v1");
    assert!(json["acoustic"]["speechRate"]["wordsPerMinute"].is_number());

    let summary = serde_json::to_value(result.summary()).expect("serialize summary");
    assert!(summary["wordsPerMinute"].is_number());
}
