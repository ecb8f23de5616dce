//! Syllable rates measured on the transcript rather than the waveform.

use super::{count_text_syllables, extract_words};
use crate::report::{TranscriptRateClass, TranscriptRateMetrics};

/// Articulation rate (syllables/min) below which speech is slow.
pub const SLOW_BELOW_SPM: f64 = 180.0;
/// Articulation rate (syllables/min) above which speech is fast.
pub const FAST_ABOVE_SPM: f64 = 250.0;

const MIN_SPEECH_SECS: f64 = 0.1;

/// `pause_duration` is the summed segment gaps; a non-positive
/// `total_duration` is treated as one second.
pub fn analyze(text: &str, total_duration: f64, pause_duration: f64) -> TranscriptRateMetrics {
    let words = extract_words(text);
    let total_syllables = count_text_syllables(text);
    let total = if total_duration > 0.0 { total_duration } else { 1.0 };
    let speech = (total - pause_duration).max(MIN_SPEECH_SECS);

    let articulation_rate_spm = total_syllables as f64 / speech * 60.0;
    TranscriptRateMetrics {
        total_words: words.len(),
        total_syllables,
        speaking_rate_spm: total_syllables as f64 / total * 60.0,
        articulation_rate_spm,
        words_per_minute: words.len() as f64 / total * 60.0,
        speech_duration_seconds: speech,
        pause_duration_seconds: pause_duration,
        classification: classify(articulation_rate_spm),
    }
}

pub fn classify(articulation_rate_spm: f64) -> TranscriptRateClass {
    if articulation_rate_spm < SLOW_BELOW_SPM {
        TranscriptRateClass::Slow
    } else if articulation_rate_spm > FAST_ABOVE_SPM {
        TranscriptRateClass::Fast
    } else {
        TranscriptRateClass::Medium
    }
}
